//! Portfolio backend core.
//!
//! Reliable domain-event delivery via a transactional outbox, and cached
//! role/permission authorization, for a Users/Tags/Blogs backend.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
