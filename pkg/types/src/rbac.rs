use pkg_constants::auth::{BOOTSTRAP_LABEL_KEY, BOOTSTRAP_LABEL_VALUE};
use pkg_constants::state::{GLOBAL_ROLES_PREFIX, ROLE_TEMPLATES_PREFIX};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::meta::{LabelSelector, Object, ObjectMeta};

// --- Policy rules ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// API groups this rule applies to (e.g., "" for core, "*" for all)
    #[serde(default)]
    pub api_groups: Vec<String>,
    /// Resource types (e.g., "pods", "services", "*" for all)
    #[serde(default)]
    pub resources: Vec<String>,
    /// Non-resource URLs (e.g., "/healthz", "*" for all)
    #[serde(default)]
    pub non_resource_urls: Vec<String>,
    /// Allowed verbs (e.g., "get", "list", "create", "update", "delete", "*" for all)
    #[serde(default)]
    pub verbs: Vec<String>,
}

// --- Scope / kind ---

/// Where a role applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleScope {
    /// Not tied to a cluster or project.
    #[default]
    #[serde(rename = "")]
    Unscoped,
    Cluster,
    Project,
}

impl fmt::Display for RoleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleScope::Unscoped => write!(f, ""),
            RoleScope::Cluster => write!(f, "cluster"),
            RoleScope::Project => write!(f, "project"),
        }
    }
}

/// The two kinds of stored role objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleKind {
    GlobalRole,
    RoleTemplate,
}

impl RoleKind {
    pub fn registry_prefix(&self) -> &'static str {
        match self {
            RoleKind::GlobalRole => GLOBAL_ROLES_PREFIX,
            RoleKind::RoleTemplate => ROLE_TEMPLATES_PREFIX,
        }
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleKind::GlobalRole => write!(f, "global role"),
            RoleKind::RoleTemplate => write!(f, "role template"),
        }
    }
}

// --- Role ---

/// A stored global role or role template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleObject {
    pub meta: ObjectMeta,
    pub display_name: String,
    #[serde(default)]
    pub scope: RoleScope,
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
    #[serde(default)]
    pub builtin: bool,
    #[serde(default)]
    pub administrative: bool,
    #[serde(default)]
    pub hidden: bool,
    /// Templates whose rules this one inherits. Resolved by consumers, never here.
    #[serde(default)]
    pub role_template_names: Vec<String>,
}

impl Object for RoleObject {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

// --- User ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub meta: ObjectMeta,
    pub display_name: String,
    pub username: String,
    /// Password hash (bcrypt), never the plaintext.
    pub password: String,
    #[serde(default)]
    pub must_change_password: bool,
}

impl Object for User {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

// --- GlobalRoleBinding ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalRoleBinding {
    pub meta: ObjectMeta,
    /// Name of the bound user object (not its username).
    pub user_name: String,
    pub global_role_name: String,
}

impl Object for GlobalRoleBinding {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

/// Selector matching objects created by the admin bootstrap.
pub fn bootstrap_selector() -> LabelSelector {
    LabelSelector::new().with(BOOTSTRAP_LABEL_KEY, BOOTSTRAP_LABEL_VALUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_serializes_like_the_api() {
        assert_eq!(serde_json::to_string(&RoleScope::Unscoped).unwrap(), "\"\"");
        assert_eq!(serde_json::to_string(&RoleScope::Cluster).unwrap(), "\"cluster\"");
        let scope: RoleScope = serde_json::from_str("\"project\"").unwrap();
        assert_eq!(scope, RoleScope::Project);
    }

    #[test]
    fn rule_without_non_resource_urls_deserializes() {
        let rule: PolicyRule =
            serde_json::from_str(r#"{"api_groups":["*"],"resources":["pods"],"verbs":["get"]}"#)
                .unwrap();
        assert!(rule.non_resource_urls.is_empty());
        assert_eq!(rule.verbs, vec!["get".to_string()]);
    }

    #[test]
    fn bootstrap_selector_matches_labelled_meta() {
        let meta = ObjectMeta::generated("user-").with_label(BOOTSTRAP_LABEL_KEY, BOOTSTRAP_LABEL_VALUE);
        assert!(bootstrap_selector().matches(&meta.labels));
        assert!(!bootstrap_selector().matches(&ObjectMeta::named("x").labels));
    }
}
