use indexmap::IndexMap;
use pkg_state::store::RbacStore;
use pkg_types::meta::ObjectMeta;
use pkg_types::rbac::{PolicyRule, RoleKind, RoleObject, RoleScope};

use anyhow::Context;

use crate::reconcile::{CatalogReconciler, ReconcileReport};

/// A declared global role or role template.
///
/// `name` is the identity used to match stored objects; `display_name` is presentation only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDefinition {
    pub display_name: String,
    pub name: String,
    pub scope: RoleScope,
    pub rules: Vec<PolicyRule>,
    pub builtin: bool,
    pub administrative: bool,
    pub hidden: bool,
    /// Templates whose rules this one inherits, by name.
    pub role_template_names: Vec<String>,
}

impl RoleDefinition {
    /// A fresh object ready to be created.
    pub fn to_object(&self) -> RoleObject {
        self.apply_to(RoleObject {
            meta: ObjectMeta::named(self.name.clone()),
            ..Default::default()
        })
    }

    /// Overwrite the declared fields of `stored`, keeping its metadata.
    pub fn apply_to(&self, stored: RoleObject) -> RoleObject {
        RoleObject {
            meta: stored.meta,
            display_name: self.display_name.clone(),
            scope: self.scope,
            rules: self.rules.clone(),
            builtin: self.builtin,
            administrative: self.administrative,
            hidden: self.hidden,
            role_template_names: self.role_template_names.clone(),
        }
    }

    /// True when every declared field already matches `stored`.
    pub fn matches(&self, stored: &RoleObject) -> bool {
        self.display_name == stored.display_name
            && self.scope == stored.scope
            && self.rules == stored.rules
            && self.builtin == stored.builtin
            && self.administrative == stored.administrative
            && self.hidden == stored.hidden
            && self.role_template_names == stored.role_template_names
    }
}

/// The desired set of global roles and role templates, each keyed by internal name in
/// declaration order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub(crate) global_roles: IndexMap<String, RoleDefinition>,
    pub(crate) role_templates: IndexMap<String, RoleDefinition>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn definitions(&self, kind: RoleKind) -> &IndexMap<String, RoleDefinition> {
        match kind {
            RoleKind::GlobalRole => &self.global_roles,
            RoleKind::RoleTemplate => &self.role_templates,
        }
    }

    pub(crate) fn definitions_mut(&mut self, kind: RoleKind) -> &mut IndexMap<String, RoleDefinition> {
        match kind {
            RoleKind::GlobalRole => &mut self.global_roles,
            RoleKind::RoleTemplate => &mut self.role_templates,
        }
    }

    pub fn global_roles(&self) -> impl Iterator<Item = &RoleDefinition> {
        self.global_roles.values()
    }

    pub fn role_templates(&self) -> impl Iterator<Item = &RoleDefinition> {
        self.role_templates.values()
    }

    pub fn global_role(&self, name: &str) -> Option<&RoleDefinition> {
        self.global_roles.get(name)
    }

    pub fn role_template(&self, name: &str) -> Option<&RoleDefinition> {
        self.role_templates.get(name)
    }

    pub async fn reconcile_global_roles<S>(&self, store: &S) -> anyhow::Result<ReconcileReport>
    where
        S: RbacStore + ?Sized,
    {
        CatalogReconciler::new(store)
            .reconcile(self, RoleKind::GlobalRole)
            .await
            .context("problem reconciling global roles")
    }

    pub async fn reconcile_role_templates<S>(&self, store: &S) -> anyhow::Result<ReconcileReport>
    where
        S: RbacStore + ?Sized,
    {
        CatalogReconciler::new(store)
            .reconcile(self, RoleKind::RoleTemplate)
            .await
            .context("problem reconciling role templates")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> RoleDefinition {
        RoleDefinition {
            display_name: "View Nodes".to_string(),
            name: "nodes-view".to_string(),
            scope: RoleScope::Cluster,
            rules: vec![PolicyRule {
                api_groups: vec!["*".to_string()],
                resources: vec!["nodes".to_string()],
                verbs: vec!["get".to_string()],
                ..Default::default()
            }],
            administrative: true,
            ..Default::default()
        }
    }

    #[test]
    fn to_object_carries_identity_and_content() {
        let obj = definition().to_object();
        assert_eq!(obj.meta.name, "nodes-view");
        assert_eq!(obj.meta.resource_version, 0);
        assert!(definition().matches(&obj));
    }

    #[test]
    fn apply_to_keeps_stored_metadata() {
        let mut stored = definition().to_object();
        stored.meta.resource_version = 7;
        stored.meta.labels.insert("owner".to_string(), "ops".to_string());
        stored.rules.clear();

        let applied = definition().apply_to(stored);
        assert_eq!(applied.meta.resource_version, 7);
        assert_eq!(applied.meta.labels.get("owner").map(String::as_str), Some("ops"));
        assert_eq!(applied.rules, definition().rules);
    }

    #[test]
    fn matches_detects_each_declared_field() {
        let def = definition();
        let base = def.to_object();

        let mut renamed = base.clone();
        renamed.display_name = "Nodes".to_string();
        assert!(!def.matches(&renamed));

        let mut unhidden = base.clone();
        unhidden.hidden = true;
        assert!(!def.matches(&unhidden));

        let mut composed = base.clone();
        composed.role_template_names = vec!["view".to_string()];
        assert!(!def.matches(&composed));

        let mut relabelled = base;
        relabelled.meta.labels.insert("x".to_string(), "y".to_string());
        assert!(def.matches(&relabelled));
    }
}
