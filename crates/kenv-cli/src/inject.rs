//! Inject command - merge variables into every workload of a manifest

use std::path::PathBuf;

use kenv_core::{DerivedKind, VarStore, WorkloadKind, derived, inject, parse_documents};
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::output::{self, OutputFormat};

/// Generated resource requested on the command line
#[derive(Debug, Clone)]
pub struct DerivedTarget {
    pub kind: DerivedKind,
    pub name: String,
}

/// Everything one invocation needs
#[derive(Debug, Clone)]
pub struct InjectOptions {
    pub vars_files: Vec<PathBuf>,
    pub derived: Option<DerivedTarget>,
    pub namespace: String,
    pub convert: bool,
    pub output: OutputFormat,
    pub list: bool,
    pub skip_unsupported: bool,
}

/// Run the pipeline over `manifest` and return the rendered output
pub fn run(opts: &InjectOptions, manifest: &[u8]) -> Result<String> {
    let store = VarStore::from_files(opts.vars_files.as_slice())?;
    tracing::debug!(count = store.len(), "loaded variables");

    let mut items: Vec<JsonValue> = Vec::new();

    let env_vars = match &opts.derived {
        Some(target) => {
            let (env_vars, resource) = derived::build(
                &store,
                &target.name,
                &opts.namespace,
                target.kind,
                opts.convert,
            )?;
            items.push(resource.to_value()?);
            env_vars
        }
        None => store.to_env_vars(),
    };

    for record in parse_documents(manifest)? {
        let record = record?;

        if opts.skip_unsupported && WorkloadKind::from_kind(record.kind()).is_none() {
            tracing::warn!(
                "Skipping document {} of kind {}; passing it through unchanged",
                record.index(),
                record.kind()
            );
            items.push(record.to_value()?);
            continue;
        }

        let injected = inject(record, &env_vars)?;
        items.push(injected.to_value()?);
    }

    output::render(items, opts.output, opts.list)
}
