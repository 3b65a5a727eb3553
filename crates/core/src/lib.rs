//! Core types and shared functionality for the contributions API.
//!
//! This crate provides:
//! - Contribution calendar domain types
//! - Year selector resolution, aggregation and response shaping
//! - The result cache capability with memory and SQLite backends
//! - Unified error types
//! - Configuration structures

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod shape;

pub use aggregate::aggregate;
pub use cache::{CACHE_TTL, CacheDb, MemoryCache, NoopCache, ResultCache, compute_cache_key};
pub use config::{AppConfig, CacheBackend, ConfigError};
pub use error::Error;
pub use model::{AggregatedResponse, ContributionLevel, DayRecord, YearResult};
pub use query::{ResolvedQuery, ResponseFormat, YearToken, resolve};
pub use shape::{ShapedResponse, shape};
