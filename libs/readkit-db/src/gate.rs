//! Authorization gate consumed by the translator and relation resolver.
//!
//! The gate is injected explicitly (no ambient lookup). Denial is never
//! surfaced as an error: callers translate it into "not found" so access
//! denial and absence are observably identical on the read path.

use sea_orm::EntityTrait;

/// Action verb presented to the gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessAction {
    Read,
}

/// Allow/deny check over a model instance.
///
/// `instance` is `None` for class-level checks, made before an unresolved
/// source has been fetched.
pub trait AuthGate<E: EntityTrait> {
    fn can_auth(&self, action: AccessAction, instance: Option<&E::Model>) -> bool;
}

/// Gate that allows everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl<E: EntityTrait> AuthGate<E> for AllowAll {
    fn can_auth(&self, _action: AccessAction, _instance: Option<&E::Model>) -> bool {
        true
    }
}
