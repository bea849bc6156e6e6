//! Application services: content loading, rendering and page composition.

pub mod chrome;
pub mod content;
pub mod error;
pub mod feed;
pub mod front_matter;
pub mod legal;
pub mod render;
pub mod site;
