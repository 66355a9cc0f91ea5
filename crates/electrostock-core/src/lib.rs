//! # electrostock-core: Pure Business Logic for ElectroStock
//!
//! This crate is the **heart** of the ElectroStock point-of-sale system.
//! It contains all business rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    ElectroStock Architecture                        │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                 Desktop Shell (JS renderer)                 │   │
//! │  │    POS screen ──► Cash register ──► Reports ──► Settings    │   │
//! │  └────────────────────────────┬────────────────────────────────┘   │
//! │                               │ JSON request/response               │
//! │  ┌────────────────────────────▼────────────────────────────────┐   │
//! │  │                  electrostock-api (dispatcher)              │   │
//! │  │    createSale, getBalance, validateUser, ...                │   │
//! │  └────────────────────────────┬────────────────────────────────┘   │
//! │                               │                                     │
//! │  ┌────────────────────────────▼────────────────────────────────┐   │
//! │  │             ★ electrostock-core (THIS CRATE) ★              │   │
//! │  │                                                             │   │
//! │  │   ┌───────────┐   ┌────────────┐   ┌────────────────────┐  │   │
//! │  │   │   types   │   │ validation │   │       error        │  │   │
//! │  │   │  Product  │   │   rules    │   │ CoreError          │  │   │
//! │  │   │   Sale    │   │   checks   │   │ ValidationError    │  │   │
//! │  │   └───────────┘   └────────────┘   └────────────────────┘  │   │
//! │  │                                                             │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS        │   │
//! │  └────────────────────────────┬────────────────────────────────┘   │
//! │                               │                                     │
//! │  ┌────────────────────────────▼────────────────────────────────┐   │
//! │  │                electrostock-db (Data Layer)                 │   │
//! │  │        SQLite schema, repositories, transactions            │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Purchase, CashEntry, etc.)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Explicit Errors**: All errors are typed, never strings or panics
//! 4. **Float money**: monetary amounts are `f64`, matching the store's data
//!    files; rounding happens only at display time, never mid-calculation

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use electrostock_core::Product` instead of
// `use electrostock_core::types::Product`

pub use error::{CoreError, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Stock level at or below which a product shows up on the dashboard's
/// low-stock list.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Maximum rows returned by product free-text search.
pub const PRODUCT_SEARCH_LIMIT: i64 = 20;

/// Maximum rows returned by client free-text search.
pub const CLIENT_SEARCH_LIMIT: i64 = 20;

/// Maximum rows returned by supplier free-text search.
pub const SUPPLIER_SEARCH_LIMIT: i64 = 50;

/// Tolerance used when re-deriving a sale total from subtotal + surcharge.
///
/// ## Why a tolerance?
/// Amounts travel as `f64` across the process boundary. The renderer computes
/// `total = subtotal + surcharge` in JS doubles; we accept anything within
/// half a cent and reject everything else as a corrupted header.
pub const TOTAL_TOLERANCE: f64 = 0.005;
