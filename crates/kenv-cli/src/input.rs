//! Manifest input from a file or stdin

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::Path;

use crate::error::{CliError, Result};

/// Read the manifest from `path`, or from stdin when no path is given
///
/// Returns `None` when stdin is an interactive terminal, so the caller can
/// print usage instead of blocking.
pub fn read_manifest(path: Option<&Path>) -> Result<Option<Vec<u8>>> {
    match path {
        Some(path) => fs::read(path).map(Some).map_err(|e| CliError::Io {
            message: format!("{}: {}", path.display(), e),
        }),
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                return Ok(None);
            }
            let mut data = Vec::new();
            stdin.lock().read_to_end(&mut data)?;
            Ok(Some(data))
        }
    }
}
