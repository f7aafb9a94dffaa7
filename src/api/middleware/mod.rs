pub mod auth;
pub mod logging;

pub use auth::verify;
pub use logging::logging_middleware;
