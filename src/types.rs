//! Shared types used across the codebase

/// Entry operations, as recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}
