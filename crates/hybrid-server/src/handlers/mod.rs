//! HTTP handler modules for the hybrid API.
//!
//! Each sub-module implements thin handlers that parse requests, delegate to
//! the [`hybrid_engine::Engine`], and return JSON responses. No business
//! logic lives in handlers.

pub mod catalog;
pub mod health;
pub mod scripts;
