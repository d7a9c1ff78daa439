// handlers/protected/mod.rs - Protected handlers (token authentication required)
//
// Security Level: Token (Authorization: Bearer <key> or Token <key>)
// Route Prefix: /auth/whoami, /entries

pub mod auth;
pub mod entries;

pub use auth::*;
pub use entries::*;
