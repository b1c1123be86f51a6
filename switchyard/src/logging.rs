//! Wrapper around `tracing_subscriber` for logging.
//!
//! Configures stderr logging at the `INFO` level for hosts that don't
//! bring their own subscriber. If you already initialize `tracing`
//! elsewhere, don't call this.

use once_cell::sync::OnceCell;
use tracing_subscriber::{filter::LevelFilter, fmt, util::SubscriberInitExt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

pub struct Logger;

impl Logger {
    /// Configure logging application-wide.
    ///
    /// Calling this multiple times is safe. Logger will be initialized
    /// only once.
    pub fn init() {
        INITIALIZED.get_or_init(|| {
            setup_logging();
        });
    }
}

fn setup_logging() {
    fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_file(false)
        .with_target(false)
        .finish()
        .init();
}
