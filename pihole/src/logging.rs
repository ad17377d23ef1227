//! Structured logging setup
//!
//! Stdout belongs to the plugin host, so log lines go to stderr.

use tracing::Level;

/// Install the global subscriber. Returns false if one was already set.
pub fn init_logging(level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_refused() {
        init_logging(Level::DEBUG);
        assert!(!init_logging(Level::DEBUG));
    }
}
