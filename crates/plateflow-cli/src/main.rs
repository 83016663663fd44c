use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "plateflow",
    about = "plateflow: lane corrections for multi-lane lab automation runs",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay carrier arrivals against a run plan and show the corrections.
    ///
    /// Carriers arrive lane-interleaved by ordinal (every lane's #1, then
    /// every lane's #2, ...). Exits non-zero if the run was stopped.
    Run {
        /// Run plan (JSON).
        #[arg(short, long)]
        plan: String,
        /// plateflow.toml; built-in defaults when omitted.
        #[arg(short, long)]
        config: Option<String>,
        /// Device resources the simulated host provides (repeatable).
        #[arg(short, long = "resource")]
        resources: Vec<String>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Write the adjusted plan here.
        #[arg(short, long)]
        out: Option<String>,
    },
    /// Generate a plateflow.toml scaffold
    Init {
        #[arg(short, long, default_value = ".")]
        path: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("plateflow=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            plan,
            config,
            resources,
            format,
            out,
        } => commands::run::run(commands::run::RunArgs {
            plan: &plan,
            config: config.as_deref(),
            resources: &resources,
            format: &format,
            out: out.as_deref(),
        }),
        Commands::Init { path } => commands::init::init(&path),
    }
}
