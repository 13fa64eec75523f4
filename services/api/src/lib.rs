//! services/api/src/lib.rs
//!
//! The summarizer gateway: relays documents to the summarization service and
//! stores the results for authenticated users.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
