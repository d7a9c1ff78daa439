// handlers/mod.rs - 2-Tier Handler Architecture
//
// Public (no auth) → Protected (token auth)

pub mod public;    // Tier 1: No authentication required (/auth/register, /auth/token)
pub mod protected; // Tier 2: Token authentication required (/auth/whoami, /entries)

pub use public::*;
pub use protected::*;
