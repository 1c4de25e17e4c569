//! Container environment merging

use std::collections::HashSet;

use k8s_openapi::api::core::v1::EnvVar;

/// Merge caller-supplied variables into a container's existing env list
///
/// The result starts with `incoming` in order, followed by every `existing`
/// entry whose name is not already present. Names are compared exactly. An
/// existing entry that shares a name with an incoming one is dropped
/// entirely, including any `valueFrom`.
///
/// Output names are unique: a repeated incoming name keeps its first
/// position with the last definition, a repeated existing name keeps its
/// first definition.
pub fn merge_env(existing: &[EnvVar], incoming: &[EnvVar]) -> Vec<EnvVar> {
    let mut merged: Vec<EnvVar> = Vec::with_capacity(incoming.len() + existing.len());
    let mut seen: HashSet<&str> = HashSet::with_capacity(merged.capacity());

    for var in incoming {
        if seen.insert(var.name.as_str()) {
            merged.push(var.clone());
        } else if let Some(slot) = merged.iter_mut().find(|m| m.name == var.name) {
            *slot = var.clone();
        }
    }

    for var in existing {
        if seen.insert(var.name.as_str()) {
            merged.push(var.clone());
        }
    }

    merged
}
