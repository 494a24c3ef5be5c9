//! PDF Sorter Library
//!
//! Upload PDFs into a private per-browser workspace, view them page by
//! page, and sort pages into new PDFs kept beside the source.
//!
//! # Modules
//!
//! - `session`: signed cookie to session directory resolution
//! - `files`: file operations scoped to a session directory
//! - `pdf`: page counting, rendering and page copying
//! - `sweeper`: removal of idle session directories
//! - `routes`: the HTTP surface

pub mod config;
pub mod error;
pub mod filename;
pub mod files;
pub mod html;
pub mod pdf;
pub mod routes;
pub mod session;
pub mod state;
pub mod sweeper;
