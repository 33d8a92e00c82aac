//! Frame-tree engine facade.
//!
//! Re-exports the engine from `frames-core` and configuration from
//! `frames-config`, and wires configuration into `tracing`.

pub use frames_config::{ConfigError, FramesConfig, LoggingConfig, NumericConfig};
pub use frames_core::*;

use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Install a global `fmt` subscriber filtered by `config.logging.filter`.
///
/// Returns `false` when a subscriber was already installed; an unparsable
/// filter falls back to `warn`.
pub fn init_tracing(config: &FramesConfig) -> bool {
    let (filter, invalid) = match EnvFilter::try_new(&config.logging.filter) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new("warn"), Some(err)),
    };
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok();
    if let Some(err) = invalid {
        warn!(filter = %config.logging.filter, error = %err, "invalid log filter, using warn");
    }
    installed
}

/// Compare two frame trees using the configured tolerance.
pub fn trees_match(a: &Frame, b: &Frame, config: &FramesConfig) -> bool {
    a.approx_eq(b, config.numeric.approx_epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        let config = FramesConfig::default();
        let _ = init_tracing(&config);
        assert!(!init_tracing(&config));
    }

    #[test]
    fn test_trees_match_uses_configured_epsilon() {
        let mut config = FramesConfig::default();
        let a = identity_frame();
        let b = a.translated([1e-6, 0.0], None).unwrap();
        assert!(!trees_match(&a, &b, &config));

        config.numeric.approx_epsilon = 1e-3;
        assert!(trees_match(&a, &b, &config));
    }
}
