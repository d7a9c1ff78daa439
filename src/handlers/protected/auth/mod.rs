// handlers/protected/auth/mod.rs - Authenticated account handlers

pub mod whoami; // GET /auth/whoami - the caller behind the token

pub use whoami::whoami_get;
