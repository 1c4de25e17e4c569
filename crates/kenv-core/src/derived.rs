//! ConfigMap / Secret generation from a variable store
//!
//! The generated resource holds the variable values under validated keys,
//! and every variable becomes an `EnvVar` that references its key through
//! `valueFrom` instead of carrying a literal value.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1::{
    ConfigMap, ConfigMapKeySelector, EnvVar, EnvVarSource, Secret, SecretKeySelector,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::Value as JsonValue;

use crate::error::{CoreError, Result};
use crate::keys::validate_key;
use crate::vars::VarStore;

/// Kind of resource generated to back the variables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedKind {
    ConfigMap,
    Secret,
}

impl DerivedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DerivedKind::ConfigMap => "ConfigMap",
            DerivedKind::Secret => "Secret",
        }
    }

    fn key_ref(&self, resource_name: &str, key: &str) -> EnvVarSource {
        match self {
            DerivedKind::ConfigMap => EnvVarSource {
                config_map_key_ref: Some(ConfigMapKeySelector {
                    name: resource_name.to_string(),
                    key: key.to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            },
            DerivedKind::Secret => EnvVarSource {
                secret_key_ref: Some(SecretKeySelector {
                    name: resource_name.to_string(),
                    key: key.to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            },
        }
    }
}

impl fmt::Display for DerivedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DerivedKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ConfigMap" => Ok(DerivedKind::ConfigMap),
            "Secret" => Ok(DerivedKind::Secret),
            other => Err(CoreError::UnsupportedKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// A generated ConfigMap or Secret
#[derive(Debug, Clone, PartialEq)]
pub enum DerivedResource {
    ConfigMap(ConfigMap),
    Secret(Secret),
}

impl DerivedResource {
    pub fn kind(&self) -> DerivedKind {
        match self {
            DerivedResource::ConfigMap(_) => DerivedKind::ConfigMap,
            DerivedResource::Secret(_) => DerivedKind::Secret,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata().name.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata().namespace.as_deref()
    }

    /// Keys present in the resource's `data`, in sorted order
    pub fn keys(&self) -> Vec<&str> {
        match self {
            DerivedResource::ConfigMap(cm) => cm
                .data
                .iter()
                .flat_map(|d| d.keys())
                .map(String::as_str)
                .collect(),
            DerivedResource::Secret(secret) => secret
                .data
                .iter()
                .flat_map(|d| d.keys())
                .map(String::as_str)
                .collect(),
        }
    }

    /// Serialize to a JSON value, `apiVersion` and `kind` included
    pub fn to_value(&self) -> Result<JsonValue> {
        let value = match self {
            DerivedResource::ConfigMap(cm) => serde_json::to_value(cm)?,
            DerivedResource::Secret(secret) => serde_json::to_value(secret)?,
        };
        Ok(value)
    }

    fn metadata(&self) -> &ObjectMeta {
        match self {
            DerivedResource::ConfigMap(cm) => &cm.metadata,
            DerivedResource::Secret(secret) => &secret.metadata,
        }
    }
}

/// Build a ConfigMap or Secret from `store` plus the env references to it
///
/// Keys are validated (and converted when `convert` is set) in store order.
/// The first invalid key aborts the whole build, as does a key that converts
/// to the same data key as an earlier one. The returned env vars keep the
/// original variable names and always use `valueFrom`.
pub fn build(
    store: &VarStore,
    name: &str,
    namespace: &str,
    kind: DerivedKind,
    convert: bool,
) -> Result<(Vec<EnvVar>, DerivedResource)> {
    let mut env_vars = Vec::with_capacity(store.len());
    let mut entries = Vec::with_capacity(store.len());
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(store.len());

    for (key, value) in store.iter() {
        let data_key = validate_key(key, convert)?;
        if let Some(other) = seen.insert(data_key.clone(), key) {
            return Err(CoreError::InvalidKey {
                key: key.to_string(),
                reasons: vec![format!("collides with '{}' after conversion", other)],
            });
        }

        env_vars.push(EnvVar {
            name: key.to_string(),
            value_from: Some(kind.key_ref(name, &data_key)),
            ..Default::default()
        });
        entries.push((data_key, value));
    }

    let metadata = ObjectMeta {
        name: Some(name.to_string()),
        namespace: (!namespace.is_empty()).then(|| namespace.to_string()),
        ..Default::default()
    };

    let resource = match kind {
        DerivedKind::ConfigMap => {
            let data: BTreeMap<String, String> = entries
                .into_iter()
                .map(|(k, v)| (k, v.to_string()))
                .collect();
            DerivedResource::ConfigMap(ConfigMap {
                metadata,
                data: Some(data),
                ..Default::default()
            })
        }
        DerivedKind::Secret => {
            let data: BTreeMap<String, ByteString> = entries
                .into_iter()
                .map(|(k, v)| (k, ByteString(v.as_bytes().to_vec())))
                .collect();
            DerivedResource::Secret(Secret {
                metadata,
                data: Some(data),
                ..Default::default()
            })
        }
    };

    tracing::debug!(
        kind = %kind,
        name,
        keys = env_vars.len(),
        "built derived resource"
    );

    Ok((env_vars, resource))
}
