//! Newline-delimited JSON host over stdin/stdout.

pub mod contract;
pub mod stdio;

pub use contract::{Command, Request, Response};
pub use stdio::{handle_line, run_stdio_host, serve};
