//! # electrostock-db: Database Layer for ElectroStock
//!
//! This crate provides database access for the ElectroStock POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     ElectroStock Data Flow                          │
//! │                                                                     │
//! │  Boundary call (createSale, getBalance, ...)                        │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                 electrostock-db (THIS CRATE)                │   │
//! │  │                                                             │   │
//! │  │   ┌──────────────┐   ┌───────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database   │   │ Repositories  │   │    Schema    │  │   │
//! │  │   │  (pool.rs)   │   │ (sale.rs ...) │   │ (schema.rs)  │  │   │
//! │  │   │              │   │               │   │              │  │   │
//! │  │   │ SqlitePool   │◄──│ SaleRepo      │   │ CREATE TABLE │  │   │
//! │  │   │ WAL mode     │   │ PurchaseRepo  │   │ + guarded    │  │   │
//! │  │   │ FKs enabled  │   │ CashRepo ...  │   │   ALTERs     │  │   │
//! │  │   └──────────────┘   └───────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                         │   │
//! │  │         <user data dir>/electrostock.db (WAL)               │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, configuration and startup seeding
//! - [`schema`] - Idempotent schema creation and additive migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (sale, purchase, cash, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use electrostock_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/electrostock.db")).await?;
//!
//! let sale_id = db.sales().create_sale(&header, &items).await?;
//! let balance = db.cash_register().balance(Currency::Ars).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod pool;
pub mod repository;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::cash::CashRegisterRepository;
pub use repository::category::CategoryRepository;
pub use repository::client::ClientRepository;
pub use repository::config::ConfigRepository;
pub use repository::note::NoteRepository;
pub use repository::product::ProductRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
pub use repository::supplier::SupplierRepository;
pub use repository::user::UserRepository;
