use clap::{Parser, Subcommand, ValueEnum};
use os2cx_core::{
    Error, Project,
    config::SystemConfig,
    evaluator::OpenscadEvaluator,
    project::Progress,
    runner::ProjectRunner,
};
use os2cx_cli::report::ProjectReport;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, default_value = "os2cx.json", global = true)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the directives of a model and print its configuration
    Inventory(ProjectArgs),

    /// Run the model through every stage and print the result
    Run(ProjectArgs),
}

#[derive(Parser)]
struct ProjectArgs {
    /// Path to the OpenSCAD model
    scad: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), Error> {
    let config = load_config(&cli.config)?;
    match &cli.command {
        Commands::Inventory(args) => run_project(args, &config, Progress::InventoryDone, false).await,
        Commands::Run(args) => {
            let target = if config.extract_objects {
                Progress::ALL_DONE
            } else {
                Progress::InventoryDone
            };
            run_project(args, &config, target, true).await
        }
    }
}

// 設定ファイルがなければデフォルト値を使う
fn load_config(path: &Path) -> Result<SystemConfig, Error> {
    if !path.exists() {
        debug!("No config file at {}, using defaults", path.display());
        return Ok(SystemConfig::default());
    }
    SystemConfig::from_file(path)
}

async fn run_project(
    args: &ProjectArgs,
    config: &SystemConfig,
    target: Progress,
    stream_logs: bool,
) -> Result<(), Error> {
    if !args.scad.is_file() {
        return Err(Error::internal(format!(
            "Model file not found: {}",
            args.scad.display()
        )));
    }

    // removed when the run is over
    let temp_dir = config.create_temp_dir()?;
    let project = Project::new(&args.scad, temp_dir.path());
    let evaluator = Arc::new(OpenscadEvaluator::from_config(config));
    info!("Running {} up to {}", args.scad.display(), target);

    let runner = ProjectRunner::spawn(project, evaluator, target);
    while !runner.is_finished() {
        print_logs(&runner, stream_logs).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    print_logs(&runner, stream_logs).await;

    let status = runner.status().await;
    debug!("Runner finished: {}", status);
    let project = runner.join().await?;

    let report = ProjectReport::new(&project);
    let rendered = match args.format {
        Format::Text => report.to_text(),
        Format::Json => report.to_json(),
    }
    .map_err(|e| Error::internal(e.to_string()))?;
    print!("{}", rendered);
    if args.format == Format::Json {
        println!();
    }
    Ok(())
}

async fn print_logs(runner: &ProjectRunner, stream: bool) {
    for line in runner.take_logs().await {
        if stream {
            eprintln!("{}", line);
        }
    }
}
