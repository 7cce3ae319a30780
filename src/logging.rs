//! Process-wide tracing setup.
//!
//! Events go to stderr so command output on stdout stays machine-readable.
//! `RUST_LOG` takes precedence over the configured level. Initialization is
//! idempotent: later calls are no-ops and report the level that is active.

use crate::error::{Error, Result};
use once_cell::sync::OnceCell;
use std::any::Any;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

#[derive(Debug)]
struct LoggingState {
    directive: String,
    /// False when another subscriber already owned the global slot.
    installed: bool,
}

impl LoggingState {
    fn active_filter(&self) -> Option<&str> {
        self.installed.then_some(self.directive.as_str())
    }
}

/// Install the global fmt subscriber and the panic hook.
///
/// Returns the requested filter directive. If a subscriber was already
/// installed elsewhere, that subscriber stays and [`active_filter`] is `None`.
///
/// # Errors
///
/// Returns [`Error::Config`] if `level` is not a valid filter directive.
pub fn init(level: &str) -> Result<String> {
    if let Some(state) = LOGGING_STATE.get() {
        return Ok(state.directive.clone());
    }

    let directive = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| level.trim().to_string());

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState> {
        let filter = EnvFilter::try_new(&directive)
            .map_err(|e| Error::Config(format!("invalid log level '{directive}': {e}")))?;

        let installed = match tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
        {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "global subscriber already set; keeping it");
                false
            }
        };

        install_panic_hook();
        Ok(LoggingState { directive: directive.clone(), installed })
    })?;

    Ok(state.directive.clone())
}

/// The filter directive installed by [`init`], if this module owns the
/// global subscriber.
#[must_use]
pub fn active_filter() -> Option<&'static str> {
    LOGGING_STATE.get().and_then(LoggingState::active_filter)
}

fn install_panic_hook() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = panic_payload_summary(info.payload());
        error!(%location, %payload, "panic captured");
        previous_hook(info);
    }));
}

fn panic_payload_summary(payload: &(dyn Any + Send)) -> String {
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };

    sanitize_message(&message, MAX_PANIC_PAYLOAD_CHARS)
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated: String = normalized.chars().take(max_chars).collect();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
