//! # Repository Layer
//!
//! One repository per aggregate. Each is a thin, cheap-to-construct wrapper
//! around the shared pool; the [`Database`](crate::Database) accessors hand
//! them out per call.
//!
//! ## Conventions
//! - Single-row writes go straight to the pool.
//! - Every multi-row write opens a transaction and commits once at the end;
//!   any error (including domain errors raised mid-unit) rolls the whole
//!   unit back.
//! - Optional list filters are composed with `sqlx::QueryBuilder`, always
//!   conjunctive, always bound — never concatenated into SQL.

pub mod cash;
pub mod category;
pub mod client;
pub mod config;
pub mod note;
pub mod product;
pub mod purchase;
pub mod report;
pub mod sale;
pub mod supplier;
pub mod user;
