//! Role catalog declaration, reconciliation and default-admin bootstrap.
//!
//! Startup runs [`bootstrap_rbac`]: global roles and role templates are converged to the
//! declared [`Catalog`] first, then the default admin user and its binding are ensured.

pub mod bootstrap;
pub mod builder;
pub mod defaults;
pub mod definition;
pub mod reconcile;

#[cfg(test)]
mod testing;

use pkg_state::store::RbacStore;
use tracing::info;

pub use bootstrap::{AdminBootstrapper, AdminNaming};
pub use builder::RoleBuilder;
pub use definition::{Catalog, RoleDefinition};
pub use reconcile::{CatalogReconciler, ReconcileReport};

/// Admin bootstrap settings.
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    /// Hash stored on a newly created admin (see [`bootstrap::hash_password`]).
    pub password_hash: String,
    pub naming: AdminNaming,
}

/// Reconcile `catalog`, then ensure the default admin. Returns the admin user's object name.
pub async fn bootstrap_rbac<S>(
    store: &S,
    catalog: &Catalog,
    options: &BootstrapOptions,
) -> anyhow::Result<String>
where
    S: RbacStore + ?Sized,
{
    catalog.reconcile_global_roles(store).await?;
    catalog.reconcile_role_templates(store).await?;

    let admin = AdminBootstrapper::new(store, options.password_hash.clone())
        .with_naming(options.naming)
        .ensure_default_admin()
        .await?;
    info!("RBAC bootstrap complete (admin user {})", admin);
    Ok(admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::default_catalog;
    use crate::testing::{RecordingStore, Write};
    use pkg_types::rbac::RoleKind;

    fn options() -> BootstrapOptions {
        BootstrapOptions {
            password_hash: "$2b$04$hash".to_string(),
            naming: AdminNaming::Generated,
        }
    }

    #[tokio::test]
    async fn full_bootstrap_is_idempotent() {
        let store = RecordingStore::new();
        let catalog = default_catalog();

        let admin = bootstrap_rbac(&store, &catalog, &options()).await.unwrap();
        let bindings = store.bindings().await;
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].user_name, admin);
        assert!(
            store
                .roles(RoleKind::GlobalRole)
                .await
                .iter()
                .any(|r| r.meta.name == bindings[0].global_role_name)
        );

        store.clear_writes();
        let again = bootstrap_rbac(&store, &catalog, &options()).await.unwrap();
        assert_eq!(admin, again);
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn role_failure_stops_before_admin() {
        let store = RecordingStore::new();
        store.fail_create_role("create-ns");

        let err = bootstrap_rbac(&store, &default_catalog(), &options())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "problem reconciling role templates");
        assert!(store.users().await.is_empty());
        assert!(
            !store
                .writes()
                .iter()
                .any(|w| matches!(w, Write::CreateUser(_)))
        );
    }
}
