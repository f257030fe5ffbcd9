//! Ensures the default administrator and its global role binding exist.
//!
//! Both objects are found by the bootstrapping label rather than by name, so the steady state
//! (admin already present) is read-only. Creation is list-then-create: two replicas starting
//! together can both see nothing and both create. With generated names the store cannot tell
//! the two apart and a second admin may appear. [`AdminNaming::Fixed`] closes that gap by making
//! the second create collide on identity.

use anyhow::{Context, anyhow};
use pkg_constants::auth::{
    ADMIN_BINDING_GENERATE_NAME, ADMIN_GLOBAL_ROLE, ADMIN_USER_GENERATE_NAME,
    BOOTSTRAP_LABEL_KEY, BOOTSTRAP_LABEL_VALUE, DEFAULT_ADMIN_DISPLAY_NAME,
    DEFAULT_ADMIN_USERNAME, FIXED_ADMIN_BINDING_NAME, FIXED_ADMIN_USER_NAME,
};
use pkg_state::store::RbacStore;
use pkg_types::meta::ObjectMeta;
use pkg_types::rbac::{GlobalRoleBinding, User, bootstrap_selector};
use tracing::{debug, info, warn};

/// How bootstrap objects are named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdminNaming {
    /// Server-generated names (`user-xxxxx`). Racy across replicas.
    #[default]
    Generated,
    /// Deterministic names; a concurrent creator gets `AlreadyExists`.
    Fixed,
}

impl AdminNaming {
    fn meta(&self, generate_prefix: &str, fixed_name: &str) -> ObjectMeta {
        let meta = match self {
            AdminNaming::Generated => ObjectMeta::generated(generate_prefix),
            AdminNaming::Fixed => ObjectMeta::named(fixed_name),
        };
        meta.with_label(BOOTSTRAP_LABEL_KEY, BOOTSTRAP_LABEL_VALUE)
    }
}

/// Hash the initial admin password with bcrypt at the default cost.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    hash_password_with_cost(password, bcrypt::DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> anyhow::Result<String> {
    bcrypt::hash(password, cost).context("failed to hash admin password")
}

pub struct AdminBootstrapper<'a, S: ?Sized> {
    store: &'a S,
    password_hash: String,
    naming: AdminNaming,
}

impl<'a, S: RbacStore + ?Sized> AdminBootstrapper<'a, S> {
    /// `password_hash` is stored verbatim on a newly created admin.
    pub fn new(store: &'a S, password_hash: impl Into<String>) -> Self {
        Self {
            store,
            password_hash: password_hash.into(),
            naming: AdminNaming::default(),
        }
    }

    pub fn with_naming(mut self, naming: AdminNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Returns the name of the admin user object.
    pub async fn ensure_default_admin(&self) -> anyhow::Result<String> {
        let admin = self.ensure_admin_user().await?;
        self.ensure_admin_binding(&admin).await?;
        Ok(admin)
    }

    async fn ensure_admin_user(&self) -> anyhow::Result<String> {
        let selector = bootstrap_selector();
        let admins = self
            .store
            .list_users(&selector)
            .await
            .with_context(|| format!("can not list users matching {}", selector))?;

        match admins.as_slice() {
            [] => {}
            [admin] => {
                debug!("Default admin user {} already exists", admin.meta.name);
                return Ok(admin.meta.name.clone());
            }
            [admin, rest @ ..] => {
                warn!(
                    "Found {} default admin users; using {}",
                    rest.len() + 1,
                    admin.meta.name
                );
                return Ok(admin.meta.name.clone());
            }
        }

        let user = User {
            meta: self.naming.meta(ADMIN_USER_GENERATE_NAME, FIXED_ADMIN_USER_NAME),
            display_name: DEFAULT_ADMIN_DISPLAY_NAME.to_string(),
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password: self.password_hash.clone(),
            must_change_password: true,
        };
        match self.store.create_user(user).await {
            Ok(created) => {
                info!("Created default admin user {}", created.meta.name);
                Ok(created.meta.name)
            }
            Err(e) if e.is_already_exists() => {
                warn!("Default admin user was created concurrently ({}); resolving it", e);
                let admins = self
                    .store
                    .list_users(&selector)
                    .await
                    .with_context(|| format!("can not list users matching {}", selector))?;
                admins
                    .into_iter()
                    .next()
                    .map(|admin| admin.meta.name)
                    .ok_or_else(|| anyhow!("can not ensure admin user exists: {}", e))
            }
            Err(e) => Err(anyhow::Error::new(e).context("can not ensure admin user exists")),
        }
    }

    async fn ensure_admin_binding(&self, admin: &str) -> anyhow::Result<()> {
        let selector = bootstrap_selector();
        let bindings = self
            .store
            .list_global_role_bindings(&selector)
            .await
            .with_context(|| format!("can not list global role bindings matching {}", selector))?;
        if let Some(binding) = bindings.first() {
            debug!("Default admin binding {} already exists", binding.meta.name);
            return Ok(());
        }

        let binding = GlobalRoleBinding {
            meta: self
                .naming
                .meta(ADMIN_BINDING_GENERATE_NAME, FIXED_ADMIN_BINDING_NAME),
            user_name: admin.to_string(),
            global_role_name: ADMIN_GLOBAL_ROLE.to_string(),
        };
        match self.store.create_global_role_binding(binding).await {
            Ok(created) => {
                info!(
                    "Bound {} to global role {} via {}",
                    admin, ADMIN_GLOBAL_ROLE, created.meta.name
                );
                Ok(())
            }
            Err(e) if e.is_already_exists() => {
                warn!("Default admin binding was created concurrently ({})", e);
                Ok(())
            }
            Err(e) => Err(anyhow::Error::new(e).context("can not ensure admin role binding exists")),
        }
    }
}
