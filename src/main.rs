use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use peek::controller::{Display, StateMachine};
use peek::core::action::{Action, Step};
use peek::core::config::{self, CliOverrides, SourceKind};
use peek::source::build_source;
use peek::tui::{self, TuiDisplay};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "peek", about = "Live-tail a component's output in the terminal")]
struct Args {
    /// Where lines come from
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// Server address (for `files`, the directory to tail)
    #[arg(short, long)]
    address: Option<String>,

    /// Auth token sent on connect
    #[arg(long)]
    auth_token: Option<String>,

    /// Connect timeout in seconds
    #[arg(long)]
    connect_timeout: Option<u64>,

    /// Lines kept in the scrollback
    #[arg(long)]
    max_lines: Option<usize>,

    /// Config file (default: ~/.peek/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file (default: peek.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = match config::load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("peek: {e}");
            return ExitCode::FAILURE;
        }
    };
    let overrides = CliOverrides {
        source: args.source,
        address: args.address,
        auth_token: args.auth_token,
        connect_timeout_secs: args.connect_timeout,
        max_output_lines: args.max_lines,
        log_file: args.log_file,
    };
    let resolved = config::resolve(&file_config, &overrides);

    // File logger: the terminal belongs to the UI
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(level, log_config, log_file);
    }

    log::info!(
        "Peek starting: source={} address={}",
        resolved.source,
        resolved.address
    );

    let source = build_source(&resolved);
    let (display, commands) = TuiDisplay::channel();
    let display: Arc<dyn Display> = Arc::new(display);
    let max_lines = resolved.max_output_lines;

    let mut machine = StateMachine::new(resolved, source, display.clone());
    let controller = tokio::spawn(async move {
        let result = machine.run(Action::new(Step::Connect)).await;
        if let Err(e) = &result {
            log::error!("Fatal: {e}");
            display.show_fatal_error(&e.to_string());
        }
        result
    });

    let ui_result = tui::run(commands, max_lines);
    if let Err(e) = &ui_result {
        log::error!("UI failed: {e}");
    }

    // The UI is gone; a controller still waiting on it sees the display close.
    let outcome = match controller.await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(e) => Err(format!("controller task failed: {e}")),
    };

    match (ui_result, outcome) {
        (Ok(()), Ok(())) => {
            log::info!("Peek exiting");
            ExitCode::SUCCESS
        }
        (Err(e), _) => {
            eprintln!("peek: terminal error: {e}");
            ExitCode::FAILURE
        }
        (Ok(()), Err(e)) => {
            eprintln!("peek: {e}");
            ExitCode::FAILURE
        }
    }
}
