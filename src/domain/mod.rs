//! Domain layer types and invariants.

pub mod articles;
pub mod documents;
pub mod error;
pub mod selector;
pub mod slug;
