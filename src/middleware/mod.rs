pub mod auth;
pub mod resolve_profile;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use resolve_profile::{resolve_profile_middleware, ResolvedUser};
pub use response::{ApiResponse, ApiResult};
