//! podshelf core
//!
//! Catalog model, HTTP client, and the three state engines (listing,
//! favorites, audio selection) shared by the podshelf front-end.

pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod favorites;
pub mod format;
pub mod genres;
pub mod listing;
pub mod model;
pub mod platform;
pub mod recommend;
pub mod settings;
pub mod slot;
pub mod storage;
