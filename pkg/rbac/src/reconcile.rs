use anyhow::Context;
use pkg_state::store::RbacStore;
use pkg_types::rbac::{RoleKind, RoleObject};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::definition::Catalog;

/// What a reconciliation pass did, by role name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    /// Stored roles absent from the catalog. Never touched.
    pub unmanaged: Vec<String>,
}

impl ReconcileReport {
    /// Number of write calls issued.
    pub fn writes(&self) -> usize {
        self.created.len() + self.updated.len()
    }
}

/// Converges stored roles of one kind to a [`Catalog`].
///
/// Additive: missing roles are created, drifted roles are updated in place, matching roles are
/// skipped, and roles the catalog does not know about are left alone. Not transactional; the
/// first failing write aborts the pass, and rerunning picks up where it stopped.
pub struct CatalogReconciler<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: RbacStore + ?Sized> CatalogReconciler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn reconcile(&self, catalog: &Catalog, kind: RoleKind) -> anyhow::Result<ReconcileReport> {
        let stored = self
            .store
            .list_roles(kind)
            .await
            .with_context(|| format!("error listing {}s", kind))?;
        let mut index: HashMap<String, RoleObject> = stored
            .into_iter()
            .map(|role| (role.meta.name.clone(), role))
            .collect();

        let mut report = ReconcileReport::default();
        for definition in catalog.definitions(kind).values() {
            let name = definition.name.clone();
            match index.remove(&name) {
                None => {
                    self.store
                        .create_role(kind, definition.to_object())
                        .await
                        .with_context(|| format!("error declaring {} {}", kind, name))?;
                    info!("Created {} {}", kind, name);
                    report.created.push(name);
                }
                Some(existing) if definition.matches(&existing) => {
                    debug!("{} {} is up to date", kind, name);
                    report.unchanged.push(name);
                }
                Some(existing) => {
                    let version = existing.meta.resource_version;
                    self.store
                        .update_role(kind, definition.apply_to(existing))
                        .await
                        .with_context(|| format!("error updating {} {}", kind, name))?;
                    info!("Updated {} {} (was resource version {})", kind, name, version);
                    report.updated.push(name);
                }
            }
        }

        let mut unmanaged: Vec<String> = index.into_keys().collect();
        unmanaged.sort();
        if !unmanaged.is_empty() {
            debug!("Leaving {} unmanaged {}(s) untouched: {:?}", unmanaged.len(), kind, unmanaged);
        }
        report.unmanaged = unmanaged;

        info!(
            "Reconciled {}s via {}: {} created, {} updated, {} unchanged",
            kind,
            self.store.backend_name(),
            report.created.len(),
            report.updated.len(),
            report.unchanged.len()
        );
        Ok(report)
    }
}
