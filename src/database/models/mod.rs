pub mod entry;
pub mod token;
pub mod user;

pub use entry::{Entry, EntryChanges, NewEntry};
pub use token::Token;
pub use user::User;
