//! Real-time transit server.
//!
//! Fetches upcoming departures from SIRI stop monitoring providers, behind
//! a response cache and a per-provider circuit breaker, and computes
//! street-network fallback durations to public transport.

pub mod async_value;
pub mod cache;
pub mod circuit_breaker;
pub mod config;
pub mod domain;
pub mod fallback;
pub mod siri;
pub mod web;
