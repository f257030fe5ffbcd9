//! Centralized constants for the RBAC bootstrap.
//!
//! All project-wide constant values live here.
//! Change a value in one place and it applies everywhere.

pub mod auth;
pub mod paths;
pub mod state;
