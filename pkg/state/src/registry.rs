use async_trait::async_trait;
use chrono::Utc;
use pkg_constants::state::{GENERATED_NAME_SUFFIX_LEN, GLOBAL_ROLE_BINDINGS_PREFIX, USERS_PREFIX};
use pkg_types::meta::{LabelSelector, Object};
use pkg_types::rbac::{GlobalRoleBinding, RoleKind, RoleObject, User};
use pkg_types::validate::validate_object_name;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::kv::KeyValue;
use crate::store::{RbacStore, StoreError, StoreResult};

/// Object registry laid out etcd-style (`/registry/<kind>/<name>`) over a key-value backend.
#[derive(Debug, Clone)]
pub struct Registry<B> {
    kv: B,
}

impl<B: KeyValue> Registry<B> {
    pub fn new(kv: B) -> Self {
        Self { kv }
    }

    pub fn backend(&self) -> &B {
        &self.kv
    }

    async fn list_objects<T>(&self, prefix: &str, selector: &LabelSelector) -> StoreResult<Vec<T>>
    where
        T: Object + DeserializeOwned,
    {
        let entries = self.kv.list_prefix(prefix).await?;
        let mut objects = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            // A record we cannot read may be the one a caller is looking for.
            let obj: T = serde_json::from_slice(&value).map_err(|e| {
                StoreError::Unexpected(anyhow::anyhow!("undecodable object at {}: {}", key, e))
            })?;
            if selector.matches(&obj.meta().labels) {
                objects.push(obj);
            }
        }
        Ok(objects)
    }

    async fn create_object<T>(&self, prefix: &str, mut obj: T) -> StoreResult<T>
    where
        T: Object + Serialize,
    {
        let meta = obj.meta_mut();
        if meta.name.is_empty() {
            let Some(generate_name) = meta.generate_name.as_deref() else {
                return Err(StoreError::Invalid(
                    "name or generate_name is required".to_string(),
                ));
            };
            meta.name = format!("{}{}", generate_name, random_suffix());
        }
        validate_object_name(&meta.name).map_err(|e| StoreError::Invalid(e.to_string()))?;
        meta.resource_version = 1;
        meta.created_at = Some(Utc::now());

        let key = format!("{}{}", prefix, obj.name());
        let data = serde_json::to_vec(&obj).map_err(anyhow::Error::from)?;
        if !self.kv.put_if_absent(&key, &data).await? {
            return Err(StoreError::AlreadyExists(key));
        }
        debug!("Created {}", key);
        Ok(obj)
    }

    async fn update_object<T>(&self, prefix: &str, mut obj: T) -> StoreResult<T>
    where
        T: Object + Serialize + DeserializeOwned,
    {
        let key = format!("{}{}", prefix, obj.name());
        let Some(raw) = self.kv.get(&key).await? else {
            return Err(StoreError::NotFound(key));
        };
        let stored: T = serde_json::from_slice(&raw).map_err(anyhow::Error::from)?;
        let stored_version = stored.meta().resource_version;
        if obj.meta().resource_version != stored_version {
            return Err(StoreError::Conflict(format!(
                "{} is at resource version {}, update carries {}",
                key,
                stored_version,
                obj.meta().resource_version
            )));
        }

        let meta = obj.meta_mut();
        meta.resource_version = stored_version + 1;
        meta.created_at = stored.meta().created_at;

        let data = serde_json::to_vec(&obj).map_err(anyhow::Error::from)?;
        self.kv.put(&key, &data).await?;
        debug!("Updated {} to resource version {}", key, stored_version + 1);
        Ok(obj)
    }
}

#[async_trait]
impl<B: KeyValue> RbacStore for Registry<B> {
    async fn list_roles(&self, kind: RoleKind) -> StoreResult<Vec<RoleObject>> {
        self.list_objects(kind.registry_prefix(), &LabelSelector::new())
            .await
    }

    async fn create_role(&self, kind: RoleKind, role: RoleObject) -> StoreResult<RoleObject> {
        self.create_object(kind.registry_prefix(), role).await
    }

    async fn update_role(&self, kind: RoleKind, role: RoleObject) -> StoreResult<RoleObject> {
        self.update_object(kind.registry_prefix(), role).await
    }

    async fn list_users(&self, selector: &LabelSelector) -> StoreResult<Vec<User>> {
        self.list_objects(USERS_PREFIX, selector).await
    }

    async fn create_user(&self, user: User) -> StoreResult<User> {
        self.create_object(USERS_PREFIX, user).await
    }

    async fn list_global_role_bindings(
        &self,
        selector: &LabelSelector,
    ) -> StoreResult<Vec<GlobalRoleBinding>> {
        self.list_objects(GLOBAL_ROLE_BINDINGS_PREFIX, selector)
            .await
    }

    async fn create_global_role_binding(
        &self,
        binding: GlobalRoleBinding,
    ) -> StoreResult<GlobalRoleBinding> {
        self.create_object(GLOBAL_ROLE_BINDINGS_PREFIX, binding)
            .await
    }

    fn backend_name(&self) -> &'static str {
        self.kv.backend_name()
    }
}

/// Lowercase alphanumeric suffix for generated names.
fn random_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..GENERATED_NAME_SUFFIX_LEN].to_string()
}
