//! Presentation layer: view models and Askama templates.

pub mod views;
