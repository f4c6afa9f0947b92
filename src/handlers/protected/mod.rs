// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind jwt_auth_middleware, which puts an AuthUser
// into the request extensions before the handler runs.
pub mod expenses;
pub mod goals;
pub mod savings;
pub mod tasks;
pub mod users;
pub mod utils;
