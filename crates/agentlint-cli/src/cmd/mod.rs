pub mod analyze;
pub mod checks;
pub mod config;
pub mod tools;

/// Process exit status for a command that ran to completion.
pub type ExitCode = i32;

/// Environment fallback for `--platform`.
pub const PLATFORM_ENV: &str = "AGENTLINT_PLATFORM";
