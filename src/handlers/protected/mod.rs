// Console endpoints. Every route here runs behind jwt_auth_middleware and
// resolve_profile_middleware, so handlers receive a ResolvedUser extension.
pub mod admin_requests;
pub mod export;
pub mod inquiries;
pub mod me;
pub mod notices;
pub mod stats;

pub use admin_requests::{decide as decide_admin_request, list as admin_requests};
pub use export::department_export;
pub use inquiries::{mark_read, unread_count, unread_count_stream};
pub use me::me;
pub use notices::notices;
pub use stats::stats;
