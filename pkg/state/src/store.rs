use async_trait::async_trait;
use pkg_types::meta::LabelSelector;
use pkg_types::rbac::{GlobalRoleBinding, RoleKind, RoleObject, User};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// Stale `resource_version` on update.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid: {0}")]
    Invalid(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl StoreError {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operations consumed by the catalog reconciler and the admin bootstrapper.
#[async_trait]
pub trait RbacStore: Send + Sync {
    async fn list_roles(&self, kind: RoleKind) -> StoreResult<Vec<RoleObject>>;
    async fn create_role(&self, kind: RoleKind, role: RoleObject) -> StoreResult<RoleObject>;
    async fn update_role(&self, kind: RoleKind, role: RoleObject) -> StoreResult<RoleObject>;

    async fn list_users(&self, selector: &LabelSelector) -> StoreResult<Vec<User>>;
    async fn create_user(&self, user: User) -> StoreResult<User>;

    async fn list_global_role_bindings(
        &self,
        selector: &LabelSelector,
    ) -> StoreResult<Vec<GlobalRoleBinding>>;
    async fn create_global_role_binding(
        &self,
        binding: GlobalRoleBinding,
    ) -> StoreResult<GlobalRoleBinding>;

    fn backend_name(&self) -> &'static str;
}
