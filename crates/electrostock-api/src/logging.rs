//! Tracing initialization for the desktop process.

use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// Respects `RUST_LOG` when set; defaults to `info` for our crates and
/// `warn` for everything else (sqlx logs every statement at `info`).
/// Calling it twice is harmless — the second call is ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("warn,electrostock_api=info,electrostock_db=info")
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
