//! Logging setup for the `voice-prosody` binary.
//!
//! Events go to stderr so stdout stays reserved for command output; analysis
//! results remain pipeable even with logging enabled. `RUST_LOG` controls the
//! filter, `RUST_LOG_FORMAT=json` switches to line-delimited JSON events.

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is absent or unparsable.
const DEFAULT_FILTER: &str = "voice_prosody=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn json_requested() -> bool {
    std::env::var("RUST_LOG_FORMAT").is_ok_and(|value| value.eq_ignore_ascii_case("json"))
}

/// Install the global tracing subscriber. Idempotent: later calls lose the
/// `try_init` race and are ignored, so library tests may call it freely.
pub fn init() {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    if json_requested() {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}
