//! Tracing subscriber setup shared by the binaries.

use tracing_subscriber::EnvFilter;

/// Whether `VCW_LOG_FORMAT` asks for JSON lines.
pub fn json_requested() -> bool {
    std::env::var("VCW_LOG_FORMAT")
        .map(|f| f.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Install the global subscriber. `RUST_LOG` wins over `default_directive`.
pub fn init_tracing(json: bool, default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
