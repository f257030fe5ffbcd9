//! Persistence for RBAC objects.
//!
//! [`store::RbacStore`] is the seam the bootstrap talks to. [`registry::Registry`] implements it
//! over any [`kv::KeyValue`] backend: SlateDB ([`client::StateStore`]) for real deployments and
//! [`kv::MemoryKv`] for tests and throwaway runs.

pub mod client;
pub mod kv;
pub mod registry;
pub mod store;
