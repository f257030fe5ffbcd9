//! Data model shared by the state store and the RBAC bootstrap.

pub mod config;
pub mod meta;
pub mod rbac;
pub mod validate;
