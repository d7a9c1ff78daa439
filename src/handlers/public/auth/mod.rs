// handlers/public/auth/mod.rs - Public authentication handlers
//
// Token acquisition endpoints that do not require authentication.

pub mod register; // POST /auth/register - create account, returns user + token
pub mod token;    // POST /auth/token - exchange credentials for the token

pub use register::register_post;
pub use token::token_post;
