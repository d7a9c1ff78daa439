// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Route Prefix: /auth/register, /auth/token

pub mod auth;

pub use auth::*;
