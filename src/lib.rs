//! Quire: a small blog server publishing markdown articles and localized legal pages.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
