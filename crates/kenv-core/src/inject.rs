//! Kind dispatch and pod template injection
//!
//! Deployment, DaemonSet, ReplicaSet and ReplicationController all carry a
//! pod template at `spec.template`, with the same shape in every API version
//! that ever served them. A workload document is decoded generically and only
//! its pod template goes through typed decoding, so fields outside the
//! template survive injection whatever the `apiVersion`.

use k8s_openapi::Resource;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet};
use k8s_openapi::api::core::v1::{EnvVar, PodTemplateSpec, ReplicationController};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::document::{DocumentFormat, ResourceRecord};
use crate::env::merge_env;
use crate::error::{CoreError, Result};

const POD_TEMPLATE_POINTER: &str = "/spec/template";

/// Kinds that can receive injected variables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadKind {
    Deployment,
    DaemonSet,
    ReplicaSet,
    ReplicationController,
}

impl WorkloadKind {
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "Deployment" => Some(WorkloadKind::Deployment),
            "DaemonSet" => Some(WorkloadKind::DaemonSet),
            "ReplicaSet" => Some(WorkloadKind::ReplicaSet),
            "ReplicationController" => Some(WorkloadKind::ReplicationController),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => Deployment::KIND,
            WorkloadKind::DaemonSet => DaemonSet::KIND,
            WorkloadKind::ReplicaSet => ReplicaSet::KIND,
            WorkloadKind::ReplicationController => ReplicationController::KIND,
        }
    }
}

/// A workload document with typed access to its pod template
///
/// Everything outside `spec.template` stays an opaque JSON value.
#[derive(Debug, Clone, PartialEq)]
pub struct Workload {
    kind: WorkloadKind,
    document: JsonValue,
}

impl Workload {
    /// Decode a record of one of the workload kinds
    pub fn from_record(record: &ResourceRecord) -> Result<Self> {
        let kind = WorkloadKind::from_kind(record.kind()).ok_or_else(|| CoreError::UnsupportedKind {
            kind: record.kind().to_string(),
        })?;

        Ok(Self {
            kind,
            document: record.to_value()?,
        })
    }

    pub fn kind(&self) -> WorkloadKind {
        self.kind
    }

    pub fn pod_template(&self) -> Result<PodTemplateSpec> {
        let template = self
            .document
            .pointer(POD_TEMPLATE_POINTER)
            .filter(|t| !t.is_null())
            .ok_or_else(|| CoreError::decode(self.kind.as_str(), "missing spec.template"))?;

        PodTemplateSpec::deserialize(template).map_err(|e| CoreError::decode(self.kind.as_str(), e))
    }

    pub fn set_pod_template(&mut self, template: &PodTemplateSpec) -> Result<()> {
        let slot = self
            .document
            .pointer_mut(POD_TEMPLATE_POINTER)
            .ok_or_else(|| CoreError::decode(self.kind.as_str(), "missing spec.template"))?;
        *slot = serde_json::to_value(template)?;
        Ok(())
    }

    fn encode(&self, format: DocumentFormat) -> Result<Vec<u8>> {
        let payload = match format {
            DocumentFormat::Json => serde_json::to_vec_pretty(&self.document)?,
            DocumentFormat::Yaml => serde_yaml::to_string(&self.document)?.into_bytes(),
        };
        Ok(payload)
    }
}

/// Inject `vars` into every container of a workload record
///
/// Returns the record re-encoded in its original format. Kinds other than
/// the four workload kinds fail with [`CoreError::UnsupportedKind`].
pub fn inject(record: ResourceRecord, vars: &[EnvVar]) -> Result<ResourceRecord> {
    let mut workload = Workload::from_record(&record)?;

    tracing::debug!(
        kind = workload.kind().as_str(),
        index = record.index(),
        "injecting variables"
    );

    let mut template = workload.pod_template()?;
    inject_pod_template(&mut template, vars);
    workload.set_pod_template(&template)?;

    let payload = workload.encode(record.format())?;
    Ok(record.with_payload(payload))
}

/// Merge `vars` into the env list of each container in the template
pub fn inject_pod_template(template: &mut PodTemplateSpec, vars: &[EnvVar]) {
    let Some(pod_spec) = template.spec.as_mut() else {
        return;
    };

    for container in &mut pod_spec.containers {
        let existing = container.env.take().unwrap_or_default();
        let merged = merge_env(&existing, vars);
        container.env = (!merged.is_empty()).then_some(merged);
    }
}
