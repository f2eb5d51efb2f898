//! Shared helpers: HTTP transport and debug logging

pub mod debug;
pub mod http;
