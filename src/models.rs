use std::collections::HashMap;

use serde::Deserialize;

/// Metadata block shared by every Kubernetes object we decode
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default)]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Namespace {
    pub metadata: ObjectMeta,
}

impl Namespace {
    /// Build a namespace entry for an explicitly configured scope
    pub fn named(name: &str) -> Self {
        Self {
            metadata: ObjectMeta {
                name: name.to_string(),
                ..ObjectMeta::default()
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct NamespaceList {
    #[serde(default)]
    pub items: Vec<Namespace>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Pod {
    pub metadata: ObjectMeta,
}

impl Pod {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn has_labels(&self) -> bool {
        self.metadata.labels.as_ref().map_or(false, |l| !l.is_empty())
    }

    /// Label value, with a missing label and an empty value treated alike
    pub fn label(&self, key: &str) -> Option<&str> {
        self.metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(key))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PodList {
    #[serde(default)]
    pub items: Vec<Pod>,
}

/// The subset of an operator custom resource that points at credentials
#[derive(Deserialize, Debug, Clone, Default)]
pub struct CredentialReference {
    #[serde(default)]
    pub spec: CredentialSpec,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CredentialSpec {
    #[serde(rename = "secretsName", default)]
    pub secrets_name: Option<String>,
    #[serde(default)]
    pub secrets: SecretsRef,
    #[serde(default)]
    pub users: Vec<UserSecret>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SecretsRef {
    #[serde(default)]
    pub users: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct UserSecret {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "secretName", default)]
    pub secret_name: Option<String>,
}

impl CredentialReference {
    /// Secret holding the MySQL root password: explicit name, then the
    /// per-user entry for root, then none (callers apply the naming fallback).
    pub fn mysql_secret(&self) -> Option<&str> {
        non_empty(self.spec.secrets_name.as_deref()).or_else(|| {
            self.spec
                .users
                .iter()
                .find(|user| user.name.as_deref() == Some(crate::constants::MYSQL_ROOT_USER))
                .and_then(|user| non_empty(user.secret_name.as_deref()))
        })
    }

    /// Secret holding the MongoDB admin user credentials
    pub fn mongodb_users_secret(&self) -> Option<&str> {
        non_empty(self.spec.secrets.users.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
