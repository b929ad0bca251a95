//! Console modal demo.
//!
//! Plays a scripted session and logs each rendered frame.
//!
//! # Usage
//!
//! ```bash
//! PARLEY_DEBUG=1 PARLEY_LOG_FORMAT=compact parley-demo
//! ```
//!
//! Context options are read from `PARLEY_BASE_Z_INDEX`,
//! `PARLEY_ALLOW_MULTIPLE` and `PARLEY_DEBUG`; a `.env` file is honored.

use example::session;
use parley_diagnostics::{TracingFormat, TracingSetup};
use parley_modal::{ModalContext, ModalOptions};
use tracing::Level;

/// Selects the log output format.
const ENV_LOG_FORMAT: &str = "PARLEY_LOG_FORMAT";

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let options = ModalOptions::from_env();
    let (format, format_error) = match std::env::var(ENV_LOG_FORMAT) {
        Ok(value) => match value.parse::<TracingFormat>() {
            Ok(format) => (format, None),
            Err(error) => (TracingFormat::Pretty, Some(error)),
        },
        Err(_) => (TracingFormat::Pretty, None),
    };
    let level = if options.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    TracingSetup::new()
        .with_level(level)
        .with_format(format)
        .init();
    if let Some(error) = format_error {
        tracing::warn!(%error, "falling back to pretty output");
    }

    let context = ModalContext::new(options);
    let transcript = session::run(&context).await;
    tracing::info!(
        frames = transcript.frames.len(),
        events = transcript.events.len(),
        "session finished"
    );
}
