//! Bootstrap identity constants.

/// Label key marking objects created by the one-time admin bootstrap.
pub const BOOTSTRAP_LABEL_KEY: &str = "authz.management.cattle.io/bootstrapping";

/// Label value paired with [`BOOTSTRAP_LABEL_KEY`].
pub const BOOTSTRAP_LABEL_VALUE: &str = "admin-user";

/// Username of the default administrator.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Display name of the default administrator.
pub const DEFAULT_ADMIN_DISPLAY_NAME: &str = "Default Admin";

/// Initial password of the default administrator (must be changed on first login).
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

/// Global role bound to the default administrator.
pub const ADMIN_GLOBAL_ROLE: &str = "admin";

/// `generate_name` prefix for the admin user.
pub const ADMIN_USER_GENERATE_NAME: &str = "user-";

/// `generate_name` prefix for the admin binding.
pub const ADMIN_BINDING_GENERATE_NAME: &str = "globalrolebinding-";

/// Deterministic admin user name used in fixed-name mode.
pub const FIXED_ADMIN_USER_NAME: &str = "user-admin";

/// Deterministic admin binding name used in fixed-name mode.
pub const FIXED_ADMIN_BINDING_NAME: &str = "globalrolebinding-admin";
