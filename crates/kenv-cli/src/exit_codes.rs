//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Parse error - manifest is not valid YAML/JSON or has the wrong shape
pub const PARSE_ERROR: i32 = 2;

/// Unsupported kind - document cannot receive injected variables
pub const UNSUPPORTED_KIND: i32 = 3;

/// Invalid key - a variable key is not a valid ConfigMap/Secret key
pub const INVALID_KEY: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;
