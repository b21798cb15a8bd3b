/// Router Module Index
///
/// Routing is split by access level so the permission gate is applied at the
/// router layer, never inside a handler.

/// Routes accessible to all callers.
pub mod public;

/// Routes gated by a bearer token carrying a specific permission.
pub mod protected;
