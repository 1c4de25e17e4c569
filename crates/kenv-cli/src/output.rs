//! Rendering of resulting resources to stdout

use clap::ValueEnum;
use kenv_core::bundle_list;
use serde_json::Value as JsonValue;

use crate::error::{CliError, Result};

/// Output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Render resources in the requested format
///
/// JSON output holding more than one resource is always bundled into a
/// `v1/List`. YAML output is a `---` separated stream unless `list` is set.
pub fn render(items: Vec<JsonValue>, format: OutputFormat, list: bool) -> Result<String> {
    let bundle = list || (format == OutputFormat::Json && items.len() != 1);

    match format {
        OutputFormat::Json => {
            let value = if bundle {
                bundle_list(items)
            } else {
                items.into_iter().next().unwrap_or(JsonValue::Null)
            };
            serde_json::to_string_pretty(&value).map_err(|e| CliError::output(e.to_string()))
        }
        OutputFormat::Yaml if bundle => {
            serde_yaml::to_string(&bundle_list(items)).map_err(|e| CliError::output(e.to_string()))
        }
        OutputFormat::Yaml => {
            let mut out = String::new();
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str("---\n");
                }
                let doc =
                    serde_yaml::to_string(item).map_err(|e| CliError::output(e.to_string()))?;
                out.push_str(&doc);
            }
            Ok(out)
        }
    }
}
