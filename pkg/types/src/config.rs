use serde::{Deserialize, Serialize};

/// Bootstrap configuration file (YAML).
///
/// Example `config.yaml`:
/// ```yaml
/// data-dir: /var/lib/rbac-bootstrap/data
/// admin-password: change-me
/// fixed-admin-names: true
/// log-format: json
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootstrapConfigFile {
    #[serde(default, alias = "data-dir")]
    pub data_dir: Option<String>,
    /// Keep state in memory only (nothing survives the process).
    #[serde(default, alias = "in-memory")]
    pub in_memory: Option<bool>,
    /// Initial password for the default admin; hashed before it is stored.
    #[serde(default, alias = "admin-password")]
    pub admin_password: Option<String>,
    /// Use deterministic admin user/binding names so concurrent replicas collide on create.
    #[serde(default, alias = "fixed-admin-names")]
    pub fixed_admin_names: Option<bool>,
    /// `text` (default) or `json`.
    #[serde(default, alias = "log-format")]
    pub log_format: Option<String>,
}

/// Load a YAML config file, returning the default if the file doesn't exist.
pub fn load_config_file<T: serde::de::DeserializeOwned + Default>(path: &str) -> anyhow::Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };
    let config: T = serde_yaml::from_str(&content)?;
    Ok(config)
}
