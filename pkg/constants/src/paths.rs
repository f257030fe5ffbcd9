//! Filesystem path constants.

/// Default config file path for the bootstrap binary.
pub const DEFAULT_CONFIG: &str = "/etc/rbac-bootstrap/config.yaml";

/// Default data directory for the state store.
pub const DEFAULT_DATA_DIR: &str = "/tmp/rbac-bootstrap-data";
