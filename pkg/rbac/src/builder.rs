//! Chained DSL for declaring roles and their rules.
//!
//! ```ignore
//! let mut rb = RoleBuilder::new();
//! rb.add_role("Manage Catalogs", "catalogs-manage")
//!     .add_rule().api_groups(&["management.cattle.io"]).resources(&["catalogs"]).verbs(&["*"])
//!     .add_rule().api_groups(&[]).non_resource_urls(&["*"]).verbs(&["get"]);
//! let catalog = rb.build();
//! ```
//!
//! Rule setters exist only on the [`RuleBuilder`] returned by `add_rule`, so a rule is always
//! open when they run. Rules are not validated: an empty verb list is stored as-is and grants
//! nothing.

use indexmap::map::Entry;
use pkg_constants::auth::ADMIN_GLOBAL_ROLE;
use pkg_state::store::RbacStore;
use pkg_types::rbac::{PolicyRule, RoleKind, RoleScope};
use tracing::debug;

use crate::definition::{Catalog, RoleDefinition};
use crate::reconcile::ReconcileReport;

/// Accumulates global roles and role templates into a [`Catalog`].
#[derive(Debug, Default)]
pub struct RoleBuilder {
    catalog: Catalog,
}

impl RoleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a global role. Only the "admin" role is administrative.
    pub fn add_role(&mut self, display_name: &str, name: &str) -> RoleCursor<'_> {
        let definition = RoleDefinition {
            display_name: display_name.to_string(),
            name: name.to_string(),
            scope: RoleScope::Unscoped,
            builtin: true,
            administrative: name == ADMIN_GLOBAL_ROLE,
            ..Default::default()
        };
        self.declare(RoleKind::GlobalRole, definition)
    }

    /// Declare a role template with explicit flags.
    pub fn add_role_template(
        &mut self,
        display_name: &str,
        name: &str,
        scope: RoleScope,
        administrative: bool,
        builtin: bool,
        hidden: bool,
    ) -> RoleCursor<'_> {
        let definition = RoleDefinition {
            display_name: display_name.to_string(),
            name: name.to_string(),
            scope,
            builtin,
            administrative,
            hidden,
            ..Default::default()
        };
        self.declare(RoleKind::RoleTemplate, definition)
    }

    /// Redeclaring a name replaces the earlier definition but keeps its position.
    fn declare(&mut self, kind: RoleKind, definition: RoleDefinition) -> RoleCursor<'_> {
        let role = match self
            .catalog
            .definitions_mut(kind)
            .entry(definition.name.clone())
        {
            Entry::Occupied(entry) => {
                let slot = entry.into_mut();
                *slot = definition;
                slot
            }
            Entry::Vacant(entry) => entry.insert(definition),
        };
        RoleCursor { kind, role }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn build(self) -> Catalog {
        self.catalog
    }

    pub async fn reconcile_global_roles<S>(&self, store: &S) -> anyhow::Result<ReconcileReport>
    where
        S: RbacStore + ?Sized,
    {
        self.catalog.reconcile_global_roles(store).await
    }

    pub async fn reconcile_role_templates<S>(&self, store: &S) -> anyhow::Result<ReconcileReport>
    where
        S: RbacStore + ?Sized,
    {
        self.catalog.reconcile_role_templates(store).await
    }
}

/// The role most recently declared on a [`RoleBuilder`].
pub struct RoleCursor<'a> {
    kind: RoleKind,
    role: &'a mut RoleDefinition,
}

impl<'a> RoleCursor<'a> {
    /// Open a new, empty rule on this role.
    pub fn add_rule(self) -> RuleBuilder<'a> {
        self.role.rules.push(PolicyRule::default());
        let rule = self.role.rules.len() - 1;
        RuleBuilder {
            kind: self.kind,
            role: self.role,
            rule,
        }
    }

    /// Inherit the rules of the named templates (resolved by consumers of the catalog).
    /// Only role templates compose; on a global role this is a no-op.
    pub fn set_role_template_names(self, names: &[&str]) -> Self {
        match self.kind {
            RoleKind::RoleTemplate => self.role.role_template_names = to_strings(names),
            RoleKind::GlobalRole => debug!(
                "Ignoring role template names {:?} on global role {}",
                names, self.role.name
            ),
        }
        self
    }
}

/// Fills in the rule most recently opened by `add_rule`.
pub struct RuleBuilder<'a> {
    kind: RoleKind,
    role: &'a mut RoleDefinition,
    /// Index of the open rule; rules only grow while the role is borrowed here.
    rule: usize,
}

impl<'a> RuleBuilder<'a> {
    /// Commit the current rule and open the next one on the same role.
    pub fn add_rule(self) -> Self {
        self.into_cursor().add_rule()
    }

    pub fn api_groups(mut self, groups: &[&str]) -> Self {
        self.current().api_groups = to_strings(groups);
        self
    }

    pub fn resources(mut self, resources: &[&str]) -> Self {
        self.current().resources = to_strings(resources);
        self
    }

    pub fn non_resource_urls(mut self, urls: &[&str]) -> Self {
        self.current().non_resource_urls = to_strings(urls);
        self
    }

    pub fn verbs(mut self, verbs: &[&str]) -> Self {
        self.current().verbs = to_strings(verbs);
        self
    }

    pub fn set_role_template_names(self, names: &[&str]) -> RoleCursor<'a> {
        self.into_cursor().set_role_template_names(names)
    }

    fn into_cursor(self) -> RoleCursor<'a> {
        RoleCursor {
            kind: self.kind,
            role: self.role,
        }
    }

    fn current(&mut self) -> &mut PolicyRule {
        &mut self.role.rules[self.rule]
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
