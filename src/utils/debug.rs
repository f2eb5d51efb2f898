//! `--debug` tracing of a harvest run
//!
//! Lines go to stderr with a `[search-harvest]` prefix so they never mix with
//! the report printed on stdout. Each helper is a no-op unless the matching
//! [`DebugOptions`] flag is set.

use crate::types::DebugOptions;

const PREFIX: &str = "[search-harvest]";

fn request_line(label: &str, url: &str) -> String {
    format!("{PREFIX} {label} {url}")
}

/// Run lifecycle line: start, finish, abort
pub fn log(options: &Option<DebugOptions>, message: &str, data: &str) {
    if let Some(debug_opts) = options {
        if debug_opts.enabled {
            eprintln!("{PREFIX} {message}: {data}");
        }
    }
}

/// Full URL of a search API request, primary or re-encoded retry
pub fn log_request(options: &Option<DebugOptions>, label: &str, url: &str) {
    if let Some(debug_opts) = options {
        if debug_opts.enabled && debug_opts.log_requests {
            eprintln!("{}", request_line(label, url));
        }
    }
}

/// Body size of a received response
pub fn log_response(options: &Option<DebugOptions>, message: &str) {
    if let Some(debug_opts) = options {
        if debug_opts.enabled && debug_opts.log_responses {
            eprintln!("{PREFIX} received {message}");
        }
    }
}

/// Request URLs and response sizes both traced
pub fn debug_all() -> DebugOptions {
    DebugOptions {
        enabled: true,
        log_requests: true,
        log_responses: true,
    }
}
