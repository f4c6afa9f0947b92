pub mod auth;
pub mod error_detail;
pub mod json;
pub mod rate_limit;
pub mod response;
pub mod security_headers;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use error_detail::render_error_detail;
pub use json::{parse_json, ValidJson};
pub use rate_limit::{rate_limit_middleware, RateLimiter};
pub use response::{ApiResponse, ApiResult};
pub use security_headers::with_security_headers;
