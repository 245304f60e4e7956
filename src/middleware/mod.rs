/// Middleware module
///
/// The authentication pipeline is two stages: the access token gate
/// authenticates the request and injects an `AuthenticatedUser`, and the
/// role gate authorizes it against the allowed role set.

mod auth_gate;
mod request_logging;
mod require_role;

pub use auth_gate::{AuthGate, AuthenticatedUser};
pub use request_logging::RequestLogger;
pub use require_role::RequireRole;
