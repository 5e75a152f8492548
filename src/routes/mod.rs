/// Router Module Index
///
/// Splits the routing surface along the access-gate boundary. The split is
/// informational only: the gate middleware is layered over the whole router
/// and decides per request, using its own public allow-list, whether a path
/// bypasses authentication.

/// Routes on the gate's public allow-list: login, self-registration, health.
pub mod public;

/// Routes behind the gate: authenticated, and matrix-authorized where the
/// path matches a protected resource prefix.
pub mod protected;
