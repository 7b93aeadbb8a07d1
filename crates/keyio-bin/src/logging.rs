use anyhow::{Context, Result};

/// Initialize env_logger. `RUST_LOG` overrides the default filter.
///
/// The `verbose` flag switches the workspace crates to debug output.
pub fn init_logging(verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        "keyio=debug,keyio_input=debug,keyio_sprite=debug,warn"
    } else {
        "info"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_target(true)
        .try_init()
        .context("Failed to initialize logging")
}
