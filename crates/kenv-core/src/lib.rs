//! kenv Core - Environment variable injection for Kubernetes workloads
//!
//! This crate provides the injection engine used by the `kenv` CLI:
//! - `VarStore`: Ordered key/value variables read from env and YAML files
//! - `validate_key`: ConfigMap key and DNS-1123 subdomain validation
//! - `derived::build`: ConfigMap/Secret generation with `valueFrom` references
//! - `merge_env`: Name-keyed merge of container environment lists
//! - `Documents`: Lazy multi-document YAML/JSON manifest parsing
//! - `inject`: Kind dispatch and pod template injection

pub mod derived;
pub mod document;
pub mod env;
pub mod error;
pub mod inject;
pub mod keys;
pub mod vars;

pub use derived::{DerivedKind, DerivedResource};
pub use document::{bundle_list, parse_documents, DocumentFormat, Documents, ResourceRecord};
pub use env::merge_env;
pub use error::{CoreError, Result};
pub use inject::{inject, Workload, WorkloadKind};
pub use keys::validate_key;
pub use vars::{Var, VarStore};

pub use k8s_openapi::api::core::v1::EnvVar;
