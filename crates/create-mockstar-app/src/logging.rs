//! Tracing subscriber initialisation.
//!
//! Only the binary installs a subscriber; `bootstrap-core` only emits events.
//! `--verbose` raises the level from `warn` to `debug`. `RUST_LOG` overrides both.

use std::io::IsTerminal as _;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialise the global tracing subscriber. Must be called once, before any
/// tracing macros fire.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let level = derive_level(verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "create_mockstar_app={level},bootstrap_core={level}"
        ))
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))?;

    Ok(())
}

fn derive_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_default() {
        assert_eq!(derive_level(false), "warn");
    }

    #[test]
    fn level_verbose() {
        assert_eq!(derive_level(true), "debug");
    }
}
