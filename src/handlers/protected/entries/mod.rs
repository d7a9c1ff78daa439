// handlers/protected/entries - Journal entry CRUD and the day query
//
// Every handler sees only the caller's entries; someone else's entry is
// indistinguishable from a missing one (404).

pub mod collection;
pub mod day;
pub mod record;

pub use collection::create as entries_post;
pub use collection::list as entries_get;
pub use day::get as entries_day_get;
pub use record::delete as entry_delete;
pub use record::get as entry_get;
pub use record::patch as entry_patch;
pub use record::put as entry_put;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::types::Operation;

/// Entry ids are integers; anything else cannot name an entry
fn parse_entry_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::not_found("Not found."))
}

fn audit(state: &AppState, auth_user: &AuthUser, operation: Operation, entry_id: i64) {
    if state.config.security.enable_audit_logging {
        tracing::info!(
            target: "audit",
            user_id = auth_user.id,
            entry_id,
            ?operation,
            "entry {:?}",
            operation
        );
    }
}
