//! wrtc-build CLI entry point.

use std::process::ExitCode;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wrtc_build::cli::{project_root, BuildCommand, Cli};
use wrtc_build::context::{HostEnv, LOG_FILE};
use wrtc_build::pipeline::ErrorReporter;
use wrtc_build::process::SystemRunner;
use wrtc_build::ui::{Output, OutputMode, Theme};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `--verbose` flag sets level to INFO
/// 3. `RUST_LOG` environment variable (if set)
/// 4. Default is WARN
fn init_tracing(debug: bool, verbose: bool) {
    let filter = if debug {
        EnvFilter::new("wrtc_build=debug")
    } else if verbose {
        EnvFilter::new("wrtc_build=info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wrtc_build=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_lenient();
    init_tracing(cli.debug, cli.verbose);

    tracing::debug!("wrtc-build starting with args: {:?}", cli);

    // Verbosity beyond this comes from the resolved build context.
    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    let project_root = match project_root(cli.project.as_deref(), std::env::current_dir()) {
        Ok(root) => root,
        Err(e) => {
            let code = ErrorReporter::new(LOG_FILE, std::io::stderr()).report(&e);
            return ExitCode::from(code);
        }
    };

    let host = HostEnv::detect();
    let mut runner = SystemRunner::new();
    let mut output = Output::stdout(output_mode, Theme::detect());

    let result = BuildCommand::new(&project_root, &cli).execute(
        &host,
        &mut runner,
        &mut output,
        &mut std::io::stderr(),
    );

    ExitCode::from(result.exit_code)
}
