use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use spatialprint::{
    init_logging, read_segments, resolve_config, write_json, Config, ToolpathPlanner,
    BUILD_DATE, BUILD_PROFILE, VERSION,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log as JSON lines instead of pretty text
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Order segments for printing and emit chains and waypoints
    Plan {
        /// JSON array of polylines (`-` for stdin)
        input: PathBuf,
        /// Config file (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Find the longest walk that never repeats a segment
    Trail {
        /// JSON array of polylines (`-` for stdin)
        input: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the search deadline
        #[arg(long)]
        timeout_ms: Option<u64>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the default configuration
    DefaultConfig {
        #[arg(long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ConfigFormat {
    Json,
    Toml,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_json)?;
    tracing::debug!(
        "spatialprint {} ({} build, {})",
        VERSION,
        BUILD_PROFILE,
        BUILD_DATE
    );

    match args.cmd {
        Command::Plan {
            input,
            config,
            output,
        } => {
            let planner = ToolpathPlanner::new(resolve_config(config.as_deref())?)?;
            let segments = read_segments(&input)?;
            let plan = planner.plan(&segments)?;
            if !plan.skipped.is_empty() {
                tracing::warn!("{} input segments were invalid", plan.skipped.len());
            }
            write_json(&plan, output.as_deref())?;
        }
        Command::Trail {
            input,
            config,
            timeout_ms,
            output,
        } => {
            let mut config = resolve_config(config.as_deref())?;
            if let Some(ms) = timeout_ms {
                config.search.timeout_ms = ms;
            }
            let planner = ToolpathPlanner::new(config)?;
            let segments = read_segments(&input)?;
            let trail = planner.longest_trail(&segments)?;
            write_json(&trail, output.as_deref())?;
        }
        Command::DefaultConfig { format } => {
            let config = Config::default();
            match format {
                ConfigFormat::Toml => print!("{}", config.to_toml()?),
                ConfigFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
            }
        }
    }

    Ok(())
}
