//! State store key layout.

/// etcd-style key prefix for global roles.
pub const GLOBAL_ROLES_PREFIX: &str = "/registry/globalroles/";

/// etcd-style key prefix for cluster/project role templates.
pub const ROLE_TEMPLATES_PREFIX: &str = "/registry/roletemplates/";

/// etcd-style key prefix for users.
pub const USERS_PREFIX: &str = "/registry/users/";

/// etcd-style key prefix for global role bindings.
pub const GLOBAL_ROLE_BINDINGS_PREFIX: &str = "/registry/globalrolebindings/";

/// Length of the random suffix appended to a `generate_name` prefix.
pub const GENERATED_NAME_SUFFIX_LEN: usize = 5;
