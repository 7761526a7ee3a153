use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use pluck::config::LoggingConfig;
use pluck::{source, LogPresenter, PluckConfig, PluckOrchestrator, SourceKind};

#[derive(Parser, Debug)]
#[command(name = "pluck")]
#[command(about = "Pull a virtual object towards you with hand gestures")]
#[command(version)]
#[command(long_about = "Turns per-frame hand landmarks into debounced gestures \
(activate, pull, grab, release) and drives a smoothed on-screen object through \
an idle, responding, attracted and grabbed interaction cycle. Landmarks come from \
a recorded JSON-lines replay or a built-in scripted demo.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "pluck.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without starting the session")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Dry run mode - build the session but don't run it
    #[arg(long, help = "Perform dry run - build the pipeline and source but don't run them")]
    dry_run: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Replay a recorded landmark stream instead of the configured source
    #[arg(long, value_name = "FILE", conflicts_with = "demo")]
    replay: Option<String>,

    /// Run the built-in scripted demo
    #[arg(long)]
    demo: bool,

    /// Don't listen for the keyboard quit keys
    #[arg(long)]
    no_keyboard: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle special modes that don't require full initialization
    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    // Logging may write into a configured directory, so load first
    let mut config = match PluckConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Failed to load configuration from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };
    apply_source_overrides(&args, &mut config);

    let log_guard = init_logging(&args, &config.logging)?;

    info!("Starting pluck v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    // Validate configuration if requested
    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                info!("Configuration validation successful");
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                error!("Configuration validation failed: {}", e);
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    let landmark_source = source::from_config(&config.source).await.map_err(|e| {
        error!("Failed to open landmark source: {}", e);
        e
    })?;

    let mut orchestrator =
        PluckOrchestrator::new(config, landmark_source, Box::new(LogPresenter::new())).map_err(
            |e| {
                error!("Failed to create orchestrator: {}", e);
                e
            },
        )?;

    if args.dry_run {
        info!("Dry run mode - session built but not started");
        println!("✓ Dry run completed successfully - configuration and source are usable");
        return Ok(());
    }

    orchestrator.set_keyboard_enabled(!args.no_keyboard && std::io::stdin().is_terminal());

    orchestrator.start().await.map_err(|e| {
        error!("Failed to start session: {}", e);
        e
    })?;

    let reason = orchestrator.run().await.map_err(|e| {
        error!("Session error: {}", e);
        e
    })?;

    let exit_code = reason.exit_code();
    info!("pluck exited ({}) with code: {}", reason, exit_code);

    // Flush buffered file logs before exiting
    drop(log_guard);
    std::process::exit(exit_code);
}

fn apply_source_overrides(args: &Args, config: &mut PluckConfig) {
    if let Some(path) = &args.replay {
        config.source.kind = SourceKind::Replay;
        config.source.replay_path = Some(path.clone());
    } else if args.demo {
        config.source.kind = SourceKind::Demo;
    }
}

fn init_logging(args: &Args, logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Determine log level based on flags
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    // Create environment filter
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pluck={}", log_level)));

    // Configure format based on options
    let stdout_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    let mut layers = vec![stdout_layer];
    let mut guard = None;

    // Daily rolling file alongside stdout
    if let Some(directory) = &logging.directory {
        std::fs::create_dir_all(directory)?;
        let appender = tracing_appender::rolling::daily(directory, &logging.file_prefix);
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        layers.push(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .boxed(),
        );
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();

    Ok(guard)
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    println!("# pluck configuration file");
    println!("# Every option with its default value; PLUCK__<SECTION>__<KEY> overrides any of them");
    println!();
    println!("{}", toml::to_string_pretty(&PluckConfig::default())?);
    Ok(())
}
