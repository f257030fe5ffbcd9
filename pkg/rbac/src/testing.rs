//! Store double that records writes and injects faults.

use async_trait::async_trait;
use pkg_state::kv::{KeyValue, MemoryKv};
use pkg_state::registry::Registry;
use pkg_state::store::{RbacStore, StoreError, StoreResult};
use pkg_types::meta::LabelSelector;
use pkg_types::rbac::{GlobalRoleBinding, RoleKind, RoleObject, User};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    CreateRole(RoleKind, String),
    UpdateRole(RoleKind, String),
    CreateUser(String),
    CreateBinding(String),
}

#[derive(Debug, Default)]
struct Faults {
    list_roles: bool,
    create_role: Option<String>,
    list_users: bool,
    /// Before the next user create, let a concurrent writer win with this user.
    user_race: Option<User>,
    /// Fail every user create with `AlreadyExists` without storing anything.
    phantom_user_conflict: bool,
    create_user: bool,
    create_binding: bool,
}

pub struct RecordingStore {
    inner: Registry<MemoryKv>,
    writes: Mutex<Vec<Write>>,
    faults: Mutex<Faults>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: Registry::new(MemoryKv::new()),
            writes: Mutex::new(Vec::new()),
            faults: Mutex::new(Faults::default()),
        }
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.lock().unwrap().clear();
    }

    pub fn clear_faults(&self) {
        *self.faults.lock().unwrap() = Faults::default();
    }

    pub fn fail_list_roles(&self) {
        self.faults.lock().unwrap().list_roles = true;
    }

    pub fn fail_create_role(&self, name: &str) {
        self.faults.lock().unwrap().create_role = Some(name.to_string());
    }

    pub fn fail_list_users(&self) {
        self.faults.lock().unwrap().list_users = true;
    }

    pub fn race_user_create(&self, winner: User) {
        self.faults.lock().unwrap().user_race = Some(winner);
    }

    pub fn phantom_user_conflict(&self) {
        self.faults.lock().unwrap().phantom_user_conflict = true;
    }

    pub fn fail_create_user(&self) {
        self.faults.lock().unwrap().create_user = true;
    }

    pub fn fail_create_binding(&self) {
        self.faults.lock().unwrap().create_binding = true;
    }

    pub async fn seed_role(&self, kind: RoleKind, role: RoleObject) {
        self.inner.create_role(kind, role).await.unwrap();
    }

    pub async fn seed_user(&self, user: User) -> User {
        self.inner.create_user(user).await.unwrap()
    }

    pub async fn seed_binding(&self, binding: GlobalRoleBinding) {
        self.inner.create_global_role_binding(binding).await.unwrap();
    }

    /// Write raw bytes under `key`, bypassing the registry.
    pub async fn put_raw(&self, key: &str, value: &[u8]) {
        self.inner.backend().put(key, value).await.unwrap();
    }

    pub async fn roles(&self, kind: RoleKind) -> Vec<RoleObject> {
        self.inner.list_roles(kind).await.unwrap()
    }

    pub async fn users(&self) -> Vec<User> {
        self.inner.list_users(&LabelSelector::new()).await.unwrap()
    }

    pub async fn bindings(&self) -> Vec<GlobalRoleBinding> {
        self.inner
            .list_global_role_bindings(&LabelSelector::new())
            .await
            .unwrap()
    }

    fn record(&self, write: Write) {
        self.writes.lock().unwrap().push(write);
    }

    fn injected(what: &str) -> StoreError {
        StoreError::Unexpected(anyhow::anyhow!("injected {} failure", what))
    }
}

#[async_trait]
impl RbacStore for RecordingStore {
    async fn list_roles(&self, kind: RoleKind) -> StoreResult<Vec<RoleObject>> {
        if self.faults.lock().unwrap().list_roles {
            return Err(Self::injected("list roles"));
        }
        self.inner.list_roles(kind).await
    }

    async fn create_role(&self, kind: RoleKind, role: RoleObject) -> StoreResult<RoleObject> {
        let name = role.meta.name.clone();
        if self.faults.lock().unwrap().create_role.as_deref() == Some(name.as_str()) {
            return Err(Self::injected("create role"));
        }
        let created = self.inner.create_role(kind, role).await?;
        self.record(Write::CreateRole(kind, name));
        Ok(created)
    }

    async fn update_role(&self, kind: RoleKind, role: RoleObject) -> StoreResult<RoleObject> {
        let name = role.meta.name.clone();
        let updated = self.inner.update_role(kind, role).await?;
        self.record(Write::UpdateRole(kind, name));
        Ok(updated)
    }

    async fn list_users(&self, selector: &LabelSelector) -> StoreResult<Vec<User>> {
        if self.faults.lock().unwrap().list_users {
            return Err(Self::injected("list users"));
        }
        self.inner.list_users(selector).await
    }

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let (race, phantom, fail) = {
            let mut faults = self.faults.lock().unwrap();
            (
                faults.user_race.take(),
                faults.phantom_user_conflict,
                faults.create_user,
            )
        };
        if fail {
            return Err(Self::injected("create user"));
        }
        if phantom {
            return Err(StoreError::AlreadyExists("user".to_string()));
        }
        if let Some(winner) = race {
            self.inner.create_user(winner).await?;
            return Err(StoreError::AlreadyExists("user".to_string()));
        }
        let created = self.inner.create_user(user).await?;
        self.record(Write::CreateUser(created.meta.name.clone()));
        Ok(created)
    }

    async fn list_global_role_bindings(
        &self,
        selector: &LabelSelector,
    ) -> StoreResult<Vec<GlobalRoleBinding>> {
        self.inner.list_global_role_bindings(selector).await
    }

    async fn create_global_role_binding(
        &self,
        binding: GlobalRoleBinding,
    ) -> StoreResult<GlobalRoleBinding> {
        if self.faults.lock().unwrap().create_binding {
            return Err(Self::injected("create binding"));
        }
        let created = self.inner.create_global_role_binding(binding).await?;
        self.record(Write::CreateBinding(created.meta.name.clone()));
        Ok(created)
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}
