//! Wire formats: inbound validation and outbound representations.

pub mod body;
pub mod entry;
pub mod fields;
pub mod user;

pub use body::JsonBody;
pub use entry::{EntryInput, EntryView};
pub use user::{Credentials, RegisterResponse, TokenResponse, UserView};
