//! promptkit CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use promptkit::cli::{Cli, CommandDispatcher};
use promptkit::config::{ConfigResolver, ConfigSources};
use promptkit::ui::{create_ui, hints, is_ci, OutputMode};
use promptkit::PromptkitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Logs go to stderr so stdout carries only command output.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("promptkit=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("promptkit=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("promptkit starting with args: {:?}", cli);

    let output_mode = OutputMode::from_flags(cli.verbose, cli.quiet);

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let is_interactive = !cli.non_interactive && !is_ci();
    let mut ui = create_ui(is_interactive, output_mode);

    let resolver = match ConfigResolver::load(ConfigSources::from_process(cli.config_overrides())) {
        Ok(resolver) => resolver,
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            return ExitCode::from(1);
        }
    };

    let mut dispatcher = CommandDispatcher::new(resolver);

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code.clamp(0, 255) as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            if matches!(e, PromptkitError::UnknownTemplate { .. }) {
                ui.show_hint(hints::unknown_template());
            }
            ExitCode::from(1)
        }
    }
}
