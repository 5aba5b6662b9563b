// ABOUTME: Configuration and constants for the Scheme interpreter
//! Version/banner constants and the compiled-in startup library.

pub const NAME: &str = "yoshi";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const WELCOME_MESSAGE: &str = "yoshi — a small Scheme";

/// Logical path of the startup library, recorded for error messages and
/// `--no-stdlib` documentation even though the bytes are embedded at
/// compile time rather than read from disk at startup.
pub const STDLIB_PATH: &str = "lib/yoshi/stdlib.scm";

pub const STDLIB_SOURCE: &str = include_str!("../lib/yoshi/stdlib.scm");
