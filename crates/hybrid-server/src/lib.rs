//! HTTP/JSON host for the hybrid script engine.
//!
//! Exposes the [`hybrid_engine::Engine`] surface as a REST API: installed
//! scripts, runs, and catalog discovery. Handlers are thin; every decision
//! lives in the engine.

pub mod error;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod state;
