//! Multi-document manifest parsing
//!
//! A manifest stream is split on YAML document markers and each document is
//! probed for its top-level `kind` only. The document bytes are kept as-is
//! so that typed decoding can be deferred to the kinds that are actually
//! injected.
//!
//! # Example
//!
//! ```yaml
//! apiVersion: apps/v1
//! kind: Deployment
//! metadata:
//!   name: web
//! ---
//! apiVersion: v1
//! kind: Service
//! metadata:
//!   name: web
//! ```
//!
//! yields two records, `Deployment` and `Service`, in that order.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{CoreError, Result};

/// Encoding of a single document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Detect the format from the first significant character
    fn detect(document: &str) -> Self {
        let first = document
            .lines()
            .map(str::trim_start)
            .find(|l| !l.is_empty() && !l.starts_with('#'));

        match first {
            Some(line) if line.starts_with('{') => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

#[derive(Deserialize)]
struct KindProbe {
    kind: Option<String>,
}

/// A single resource document tagged with its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    index: usize,
    kind: String,
    format: DocumentFormat,
    payload: Vec<u8>,
}

impl ResourceRecord {
    /// Probe a single document for its `kind`
    pub fn parse(index: usize, document: &str) -> Result<Self> {
        let probe_yaml = |document: &str| -> Result<KindProbe> {
            serde_yaml::from_str(document).map_err(|e| CoreError::parse(index, e))
        };

        // YAML flow mappings also start with `{`
        let (format, probe) = match DocumentFormat::detect(document) {
            DocumentFormat::Json => match serde_json::from_str::<KindProbe>(document) {
                Ok(probe) => (DocumentFormat::Json, probe),
                Err(_) => (DocumentFormat::Yaml, probe_yaml(document)?),
            },
            DocumentFormat::Yaml => (DocumentFormat::Yaml, probe_yaml(document)?),
        };

        let kind = probe
            .kind
            .filter(|k| !k.is_empty())
            .ok_or_else(|| CoreError::parse(index, "document has no top-level `kind` field"))?;

        Ok(Self {
            index,
            kind,
            format,
            payload: document.as_bytes().to_vec(),
        })
    }

    /// Position of the document in its stream, counting from 0
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub(crate) fn with_payload(self, payload: Vec<u8>) -> Self {
        Self { payload, ..self }
    }

    /// Decode the payload into a generic JSON value
    pub fn to_value(&self) -> Result<JsonValue> {
        match self.format {
            DocumentFormat::Json => {
                serde_json::from_slice(&self.payload).map_err(|e| CoreError::decode(&self.kind, e))
            }
            DocumentFormat::Yaml => {
                serde_yaml::from_slice(&self.payload).map_err(|e| CoreError::decode(&self.kind, e))
            }
        }
    }
}

/// Lazy iterator over the documents of a manifest stream
#[derive(Debug, Clone)]
pub struct Documents<'a> {
    rest: &'a str,
    index: usize,
    done: bool,
}

impl<'a> Documents<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            index: 0,
            done: false,
        }
    }

    /// Next raw chunk between document markers
    fn next_chunk(&mut self) -> Option<&'a str> {
        if self.done {
            return None;
        }

        let mut offset = 0;
        for line in self.rest.split_inclusive('\n') {
            if let Some(inline) = document_marker(line) {
                // Content after `--- ` opens the next document
                let chunk = &self.rest[..offset];
                self.rest = &self.rest[offset + line.len() - inline.len()..];
                return Some(chunk);
            }
            offset += line.len();
        }

        self.done = true;
        Some(self.rest)
    }
}

impl Iterator for Documents<'_> {
    type Item = Result<ResourceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let chunk = self.next_chunk()?;
            if is_blank_document(chunk) {
                continue;
            }

            let index = self.index;
            self.index += 1;

            let record = ResourceRecord::parse(index, chunk);
            if record.is_err() {
                // Nothing after a malformed document is trusted
                self.done = true;
            }
            return Some(record);
        }
    }
}

/// Start parsing a UTF-8 manifest stream
pub fn parse_documents(input: &[u8]) -> Result<Documents<'_>> {
    let input = std::str::from_utf8(input).map_err(|e| CoreError::parse(0, e))?;
    Ok(Documents::new(input))
}

/// Wrap resources into a `v1/List`
pub fn bundle_list(items: Vec<JsonValue>) -> JsonValue {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "List",
        "items": items,
    })
}

/// `---` or the `...` end marker
///
/// Returns whatever follows `---` and its separating whitespace on the same
/// line, which may be empty, a comment, or the start of the next document.
fn document_marker(line: &str) -> Option<&str> {
    if line.trim_end_matches(['\n', '\r']) == "..." {
        return Some("");
    }

    let rest = line.strip_prefix("---")?;
    if rest.is_empty() {
        Some(rest)
    } else if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn is_blank_document(chunk: &str) -> bool {
    chunk
        .lines()
        .all(|l| l.trim().is_empty() || l.trim_start().starts_with('#'))
}
