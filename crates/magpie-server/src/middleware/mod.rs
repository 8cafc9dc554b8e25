// HTTP middleware implementations

pub mod auth; // Session token validation and login redirects
pub mod rate_limit; // Login attempt limiting
