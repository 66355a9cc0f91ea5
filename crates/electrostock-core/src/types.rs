//! # Domain Types
//!
//! Core domain types used throughout ElectroStock.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                               │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────────┐     │
//! │  │    Product    │   │     Sale      │   │    CashEntry      │     │
//! │  │  ───────────  │   │  ───────────  │   │  ───────────────  │     │
//! │  │  id           │   │  id           │   │  id               │     │
//! │  │  category_id  │   │  currency     │   │  entry_type       │     │
//! │  │  price, stock │   │  total        │   │  amount, currency │     │
//! │  │  barcode      │   │  client_id?   │   │  sale_id?         │     │
//! │  └───────────────┘   └───────────────┘   └───────────────────┘     │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────────┐     │
//! │  │   Currency    │   │ PaymentStatus │   │   MovementType    │     │
//! │  │  ───────────  │   │  ───────────  │   │  ───────────────  │     │
//! │  │  ARS / USD    │   │  Pending      │   │  Debit / Credit   │     │
//! │  └───────────────┘   │  Partial      │   └───────────────────┘     │
//! │                      │  Paid         │                             │
//! │                      └───────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `SaleItem` carries `product_name` and `category_name` copied at sale time.
//! Historical receipts must not change when a product is renamed or moved to
//! another category, so these fields are denormalized on purpose.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Enumerations
// =============================================================================

/// Currency a sale or cash entry is denominated in.
///
/// The store operates with a dual-currency register; balances are always
/// computed per currency and never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ars,
    Usd,
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Ars
    }
}

/// Direction of a cash register entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Income,
    Expense,
}

/// User role. Admins manage users, settings and reports; sellers run the POS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Seller,
}

impl Default for Role {
    fn default() -> Self {
        Role::Seller
    }
}

/// Kind of client (end consumer vs. registered business).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    Consumer,
    Business,
}

impl Default for ClientType {
    fn default() -> Self {
        ClientType::Consumer
    }
}

/// Direction of a client current-account movement.
///
/// `Debit` increases the client's debt (store credit extended), `Credit`
/// decreases it (client paid something back).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Debit,
    Credit,
}

/// Settlement state of a supplier purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
}

impl PaymentStatus {
    /// Derives the settlement status from a purchase's amounts.
    ///
    /// ## Rule
    /// - `paid >= total` → `Paid`
    /// - `0 < paid < total` → `Partial`
    /// - otherwise → `Pending`
    ///
    /// The status column is never trusted from a caller; every write path
    /// recomputes it from the amounts so it stays a pure function of them.
    pub fn from_amounts(total: f64, paid: f64) -> Self {
        if paid >= total {
            PaymentStatus::Paid
        } else if paid > 0.0 {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Pending
        }
    }
}

/// How an import treats pre-existing cash register rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Insert on top of what is already there.
    Append,
    /// Delete every existing row first, then insert.
    Replace,
}

// =============================================================================
// Inventory
// =============================================================================

/// A product category. Deleting one cascades to its products.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

/// A product in the inventory ledger.
///
/// `stock` is a mutable counter: only the sale transaction and explicit
/// stock edits may change it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub supplier: Option<String>,
    /// Replacement cost in USD (used by the monthly report).
    pub cost_usd: f64,
    /// Replacement cost in ARS (used by the monthly report).
    pub cost_ars: f64,
    pub price: f64,
    pub stock: i64,
    pub description: Option<String>,
    /// Unique, optional. Older stock was labeled with the raw row id before
    /// this column existed, hence the numeric-id lookup fallback.
    pub barcode: Option<String>,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

/// A product joined with its category name, as the POS screen consumes it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductWithCategory {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub supplier: Option<String>,
    pub cost_usd: f64,
    pub cost_ars: f64,
    pub price: f64,
    pub stock: i64,
    pub description: Option<String>,
    pub barcode: Option<String>,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
    pub category_name: Option<String>,
}

/// Payload for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub category_id: i64,
    pub name: String,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub cost_usd: f64,
    #[serde(default)]
    pub cost_ars: f64,
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Payload for updating a product. The category is not changed here; the
/// original UI never re-parents products on edit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    pub name: String,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub cost_usd: f64,
    #[serde(default)]
    pub cost_ars: f64,
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub description: Option<String>,
}

// =============================================================================
// Users
// =============================================================================

/// A user account as exposed to callers — never carries hash or salt.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub name: Option<String>,
    pub active: bool,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

/// Payload for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
}

/// Payload for updating a user.
///
/// `password` is optional: when absent only role/name/active change and the
/// stored hash is left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserUpdate {
    #[serde(default)]
    pub password: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
    pub active: bool,
}

// =============================================================================
// Clients & Current Accounts
// =============================================================================

/// A registered client with a cached current-account balance.
///
/// `debt` is a cache of the signed sum of the client's movements; the two are
/// updated inside the same transaction and must never diverge.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Client {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    #[ts(rename = "type")]
    pub client_type: ClientType,
    pub identifier: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub debt: f64,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

/// One row of a client's append-only movement ledger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ClientMovement {
    pub id: i64,
    pub client_id: i64,
    pub movement_type: MovementType,
    pub amount: f64,
    pub description: Option<String>,
    /// Snapshot of the client's debt right after this movement applied.
    pub balance_after: f64,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

/// Payload for creating or updating a client.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClientInput {
    pub name: String,
    #[serde(default, rename = "type")]
    #[ts(rename = "type")]
    pub client_type: ClientType,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Suppliers & Purchases
// =============================================================================

/// A supplier the store buys from.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub company: Option<String>,
    pub products_sold: Option<String>,
    pub contact_phone: Option<String>,
    pub shipping_methods: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

/// Payload for creating or updating a supplier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierInput {
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub products_sold: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub shipping_methods: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A purchase from a supplier.
///
/// `payment_status` is always a pure function of `(total_amount, paid_amount)`
/// — see [`PaymentStatus::from_amounts`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Purchase {
    pub id: i64,
    pub supplier_id: i64,
    pub description: String,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub payment_status: PaymentStatus,
    #[ts(as = "String")]
    pub purchase_date: NaiveDateTime,
    pub due_date: Option<String>,
    pub notes: Option<String>,
}

/// A purchase joined with its supplier, as the purchases screen consumes it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseWithSupplier {
    pub id: i64,
    pub supplier_id: i64,
    pub description: String,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub payment_status: PaymentStatus,
    #[ts(as = "String")]
    pub purchase_date: NaiveDateTime,
    pub due_date: Option<String>,
    pub notes: Option<String>,
    pub supplier_name: String,
    pub supplier_company: Option<String>,
}

/// A payment recorded against a purchase.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchasePayment {
    pub id: i64,
    pub purchase_id: i64,
    pub amount: f64,
    #[ts(as = "String")]
    pub payment_date: NaiveDateTime,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// Payload for creating a purchase.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPurchase {
    pub supplier_id: i64,
    pub description: String,
    pub total_amount: f64,
    #[serde(default)]
    pub paid_amount: f64,
    /// Currency of the initial cash-register expense, when paid_amount > 0.
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Payload for paying down a purchase.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPurchasePayment {
    pub amount: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Sales
// =============================================================================

/// A committed sale header.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    #[ts(as = "String")]
    pub sale_date: NaiveDateTime,
    pub payment_method: String,
    pub currency: Currency,
    pub subtotal: f64,
    pub surcharge: f64,
    pub total: f64,
    pub installments: i64,
    pub customer_notes: Option<String>,
    pub warranty_enabled: bool,
    /// Warranty length in months; fractions encode weeks (0.25 ≈ one week).
    pub warranty_months: f64,
    pub client_id: Option<i64>,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

/// A sale as the history list consumes it, with concatenated item names.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleSummary {
    pub id: i64,
    #[ts(as = "String")]
    pub sale_date: NaiveDateTime,
    pub payment_method: String,
    pub currency: Currency,
    pub subtotal: f64,
    pub surcharge: f64,
    pub total: f64,
    pub installments: i64,
    pub customer_notes: Option<String>,
    pub warranty_enabled: bool,
    pub warranty_months: f64,
    pub client_id: Option<i64>,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
    /// `GROUP_CONCAT` of the distinct category snapshots on the items.
    pub category_names: Option<String>,
    /// `GROUP_CONCAT` of the product name snapshots on the items.
    pub product_names: Option<String>,
}

/// A line item of a committed sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    /// Product name frozen at sale time.
    pub product_name: String,
    /// Category name frozen at sale time.
    pub category_name: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
}

/// Sale header as submitted by the POS screen.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub payment_method: String,
    pub currency: Currency,
    pub subtotal: f64,
    #[serde(default)]
    pub surcharge: f64,
    pub total: f64,
    #[serde(default = "default_installments")]
    pub installments: i64,
    #[serde(default)]
    pub customer_notes: Option<String>,
    #[serde(default)]
    pub warranty_enabled: bool,
    #[serde(default)]
    pub warranty_months: f64,
    #[serde(default)]
    pub client_id: Option<i64>,
}

fn default_installments() -> i64 {
    1
}

/// Line item as submitted by the POS screen. Name and category snapshots are
/// copied here by the caller; the engine stores them verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSaleItem {
    pub product_id: i64,
    pub product_name: String,
    #[serde(default)]
    pub category_name: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
}

// =============================================================================
// Cash Register
// =============================================================================

/// One income or expense posting in the cash register.
///
/// Append-only from the application's perspective: no update or delete is
/// exposed except the full replace-on-import path.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashEntry {
    pub id: i64,
    #[ts(as = "String")]
    pub entry_date: NaiveDateTime,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    #[ts(rename = "type")]
    pub entry_type: EntryType,
    pub amount: f64,
    pub currency: Currency,
    pub payment_method: Option<String>,
    pub description: Option<String>,
    pub expense_category: Option<String>,
    pub sale_id: Option<i64>,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

/// A cash entry as the register screen consumes it: for sale-linked entries,
/// the sold item names ride along.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashEntrySummary {
    pub id: i64,
    #[ts(as = "String")]
    pub entry_date: NaiveDateTime,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    #[ts(rename = "type")]
    pub entry_type: EntryType,
    pub amount: f64,
    pub currency: Currency,
    pub payment_method: Option<String>,
    pub description: Option<String>,
    pub expense_category: Option<String>,
    pub sale_id: Option<i64>,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
    /// `GROUP_CONCAT` of the distinct category snapshots on the linked sale.
    pub category_names: Option<String>,
    /// `GROUP_CONCAT` of the product name snapshots on the linked sale.
    pub product_names: Option<String>,
}

/// A manual expense posting.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewExpense {
    pub amount: f64,
    pub currency: Currency,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expense_category: Option<String>,
}

/// A manual income posting.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewIncome {
    pub amount: f64,
    pub currency: Currency,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One imported cash register row. Optional columns default when the backup
/// spreadsheet omits them.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportedEntry {
    /// Original entry timestamp; defaults to "now" when the column is blank.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub entry_date: Option<NaiveDateTime>,
    #[serde(rename = "type")]
    #[ts(rename = "type")]
    pub entry_type: EntryType,
    pub amount: f64,
    pub currency: Currency,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expense_category: Option<String>,
    #[serde(default)]
    pub sale_id: Option<i64>,
}

/// Per-currency register balance. Zero-filled when the register is empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Balance {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

// =============================================================================
// Configuration
// =============================================================================

/// Surcharge configuration for one payment method.
///
/// Seeded once on first run; only `surcharge` is editable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PaymentConfig {
    pub id: i64,
    pub method: String,
    /// Percentage added on top of the subtotal for this method.
    pub surcharge: f64,
    pub display_name: String,
}

/// One key/value pair of the store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StoreConfigEntry {
    pub key: String,
    pub value: Option<String>,
}

// =============================================================================
// Notes Board
// =============================================================================

/// A sticky note on the board.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Note {
    pub id: i64,
    pub title: Option<String>,
    pub content: Option<String>,
    pub color: String,
    pub is_completed: bool,
    pub position_order: i64,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

/// Payload for creating a note. New notes land on top of the board.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewNote {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default = "default_note_color")]
    pub color: String,
}

fn default_note_color() -> String {
    "bg-yellow-200".to_string()
}

/// Partial update for a note; absent fields stay untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NoteUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_completed: Option<bool>,
    #[serde(default)]
    pub position_order: Option<i64>,
}

// =============================================================================
// Reports
// =============================================================================

/// Count and summed total of sales inside one period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PeriodSummary {
    pub count: i64,
    pub total: f64,
}

/// Today / this-week / this-month sale summaries. The week starts Sunday.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub today: PeriodSummary,
    pub week: PeriodSummary,
    pub month: PeriodSummary,
}

/// All-time best seller by summed quantity.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TopSeller {
    pub product_name: String,
    pub total_sold: i64,
}

/// Income/expense totals for one calendar day of the dashboard series.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyFlow {
    /// `YYYY-MM-DD`
    pub date: String,
    pub income: f64,
    pub expense: f64,
}

/// Everything the dashboard renders in one round trip.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub sales_summary: SalesSummary,
    pub low_stock: Vec<ProductWithCategory>,
    pub top_products: Vec<TopSeller>,
    pub last7_days: Vec<DailyFlow>,
}

/// Revenue and estimated cost for one currency in the report period.
///
/// Cost is looked up from the products' *current* cost fields, not a
/// historical snapshot — deliberately a "recompute with today's costs"
/// estimate.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct FinancialRow {
    pub currency: Currency,
    pub revenue: f64,
    pub total_cost: f64,
}

/// Revenue/quantity breakdown for one category in the report period.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CategorySalesRow {
    pub category_name: Option<String>,
    pub sales_count: i64,
    pub items_sold: i64,
    pub revenue: f64,
}

/// One of the period's best-selling products.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TopProductRow {
    pub product_name: String,
    pub quantity: i64,
    pub revenue: f64,
}

/// Monthly report payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyReport {
    pub financial: Vec<FinancialRow>,
    pub by_category: Vec<CategorySalesRow>,
    pub top_products: Vec<TopProductRow>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_derivation() {
        assert_eq!(
            PaymentStatus::from_amounts(10000.0, 0.0),
            PaymentStatus::Pending
        );
        assert_eq!(
            PaymentStatus::from_amounts(10000.0, 4000.0),
            PaymentStatus::Partial
        );
        assert_eq!(
            PaymentStatus::from_amounts(10000.0, 10000.0),
            PaymentStatus::Paid
        );
        assert_eq!(
            PaymentStatus::from_amounts(10000.0, 12000.0),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn test_payment_status_property() {
        // status is paid iff paid >= total, pending iff paid == 0, else partial
        for total in [100.0_f64, 2500.0, 99999.5] {
            for frac in [0.0_f64, 0.1, 0.5, 0.99, 1.0] {
                let paid = total * frac;
                let status = PaymentStatus::from_amounts(total, paid);
                if paid >= total {
                    assert_eq!(status, PaymentStatus::Paid);
                } else if paid == 0.0 {
                    assert_eq!(status, PaymentStatus::Pending);
                } else {
                    assert_eq!(status, PaymentStatus::Partial);
                }
            }
        }
    }

    #[test]
    fn test_currency_serde_labels() {
        assert_eq!(serde_json::to_string(&Currency::Ars).unwrap(), "\"ARS\"");
        assert_eq!(serde_json::to_string(&Currency::Usd).unwrap(), "\"USD\"");
        let c: Currency = serde_json::from_str("\"USD\"").unwrap();
        assert_eq!(c, Currency::Usd);
    }

    #[test]
    fn test_new_sale_defaults() {
        let sale: NewSale = serde_json::from_str(
            r#"{
                "payment_method": "cash_ars",
                "currency": "ARS",
                "subtotal": 4500.0,
                "total": 4500.0
            }"#,
        )
        .unwrap();
        assert_eq!(sale.installments, 1);
        assert_eq!(sale.surcharge, 0.0);
        assert!(!sale.warranty_enabled);
        assert!(sale.client_id.is_none());
    }

    #[test]
    fn test_client_type_field_renames_to_type() {
        let json = serde_json::to_value(ClientInput {
            name: "Acme".into(),
            client_type: ClientType::Business,
            identifier: None,
            phone: None,
            email: None,
            address: None,
            notes: None,
        })
        .unwrap();
        assert_eq!(json["type"], "business");
    }
}
