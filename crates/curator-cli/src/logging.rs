//! Diagnostic logging on stderr
//!
//! `RUST_LOG` takes precedence; otherwise only warnings are shown, or
//! everything from `debug` up with `--debug`.

use tracing::metadata::Level;
use tracing_subscriber::EnvFilter;

pub fn setup_logging(debug: bool) {
    let default_level = if debug { Level::DEBUG } else { Level::WARN };
    let default_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy("");

    let env_filter = match std::env::var("RUST_LOG") {
        Ok(directive) if !directive.trim().is_empty() => {
            match EnvFilter::builder().parse(&directive) {
                Ok(filter) => filter,
                Err(err) => {
                    eprintln!("invalid log filter: {err}");
                    eprintln!("falling back to default logging");
                    default_filter
                }
            }
        }
        _ => default_filter,
    };

    let use_color = std::io::IsTerminal::is_terminal(&std::io::stderr());
    let result = tracing_subscriber::fmt()
        .compact()
        .without_time()
        .with_ansi(use_color)
        .with_target(debug)
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(err) = result {
        eprintln!("failed to set up logging: {err}");
    }
}
