//! Request and response types for the HTTP API.

pub mod catalog;
pub mod scripts;
