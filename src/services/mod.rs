pub mod day_query;
pub mod user_service;

pub use user_service::{UserError, UserService};
