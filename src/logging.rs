//! Logging setup for the `keystash` binary

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "KEYSTASH_LOG";

/// Map the `-v` count to a default level
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn build_env_filter(verbosity: u8) -> EnvFilter {
    filter_from(std::env::var(LOG_ENV).ok().as_deref(), verbosity)
}

/// An explicit, valid directive wins over the verbosity count
fn filter_from(directive: Option<&str>, verbosity: u8) -> EnvFilter {
    directive
        .filter(|directive| !directive.trim().is_empty())
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(level_for_verbosity(verbosity)))
}

/// Install the global subscriber, writing to stderr
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init_logging(verbosity: u8) {
    let _ = tracing_subscriber::registry()
        .with(build_env_filter(verbosity))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0), "warn");
        assert_eq!(level_for_verbosity(1), "info");
        assert_eq!(level_for_verbosity(2), "debug");
        assert_eq!(level_for_verbosity(9), "trace");
    }

    fn rendered(filter: EnvFilter) -> String {
        filter.to_string().to_lowercase()
    }

    #[test]
    fn test_filter_follows_verbosity() {
        assert_eq!(rendered(filter_from(None, 0)), "warn");
        assert_eq!(rendered(filter_from(None, 2)), "debug");
        assert_eq!(rendered(filter_from(Some("  "), 1)), "info");
    }

    #[test]
    fn test_filter_prefers_directive() {
        assert_eq!(rendered(filter_from(Some("keystash=trace"), 0)), "keystash=trace");
        // Unparseable directives fall back to the verbosity level
        assert_eq!(rendered(filter_from(Some("keystash=loud"), 1)), "info");
    }
}
