//! # Method Dispatch
//!
//! Routes `{method, args}` requests to repository operations. Method names
//! mirror what the renderer calls over IPC (`createSale`, `getBalance`,
//! ...); argument shapes are the core DTOs, so the renderer's JSON
//! deserializes straight into them.

use electrostock_core::{
    ClientInput, Currency, EntryType, ImportMode, ImportedEntry, NewExpense, NewIncome, NewNote,
    NewProduct, NewPurchase, NewPurchasePayment, NewSale, NewSaleItem, NewUser, NoteUpdate,
    PaymentStatus, ProductUpdate, SupplierInput, UserUpdate,
};
use electrostock_db::repository::cash::CashFilters;
use electrostock_db::repository::purchase::PurchaseFilters;
use electrostock_db::repository::sale::SaleFilters;
use electrostock_db::Database;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApiError, ErrorCode};
use crate::request::{ApiRequest, ApiResponse};

/// Handles one request end to end. Never panics and never returns a raw
/// engine error; every outcome is a well-formed envelope.
pub async fn dispatch(db: &Database, request: ApiRequest) -> ApiResponse {
    let method = request.method.clone();
    debug!(%method, "Dispatching request");

    match handle(db, request).await {
        Ok(data) => ApiResponse::ok(data),
        Err(err) => {
            warn!(%method, code = ?err.code, %err, "Request failed");
            ApiResponse::err(err)
        }
    }
}

async fn handle(db: &Database, request: ApiRequest) -> Result<Value, ApiError> {
    let args = request.args;

    match request.method.as_str() {
        // ---------------------------------------------------------- categories
        "getCategories" => json(db.categories().list().await?),
        "createCategory" => {
            let a: NameArgs = parse(args)?;
            json(db.categories().create(&a.name).await?)
        }
        "updateCategory" => {
            let a: RenameArgs = parse(args)?;
            json(db.categories().update(a.id, &a.name).await?)
        }
        "deleteCategory" => {
            let a: IdArgs = parse(args)?;
            json(db.categories().delete(a.id).await?)
        }

        // ------------------------------------------------------------ products
        "getProducts" => json(db.products().list().await?),
        "getProductsByCategory" => {
            let a: CategoryIdArgs = parse(args)?;
            json(db.products().list_by_category(a.category_id).await?)
        }
        "getProductById" => {
            let a: IdArgs = parse(args)?;
            json(db.products().get_by_id(a.id).await?)
        }
        "getProductByBarcode" => {
            let a: BarcodeLookupArgs = parse(args)?;
            json(db.products().get_by_barcode(&a.barcode).await?)
        }
        "searchProducts" => {
            let a: QueryArgs = parse(args)?;
            json(db.products().search(&a.query).await?)
        }
        "createProduct" => {
            let product: NewProduct = parse(args)?;
            json(db.products().create(&product).await?)
        }
        "updateProduct" => {
            let a: UpdateArgs<ProductUpdate> = parse(args)?;
            json(db.products().update(a.id, &a.data).await?)
        }
        "updateProductBarcode" => {
            let a: BarcodeArgs = parse(args)?;
            json(db.products().update_barcode(a.id, a.barcode.as_deref()).await?)
        }
        "adjustProductStock" => {
            let a: StockArgs = parse(args)?;
            json(db.products().adjust_stock(a.id, a.delta).await?)
        }
        "deleteProduct" => {
            let a: IdArgs = parse(args)?;
            json(db.products().delete(a.id).await?)
        }

        // --------------------------------------------------------------- sales
        "createSale" => {
            let a: CreateSaleArgs = parse(args)?;
            json(db.sales().create_sale(&a.sale, &a.items).await?)
        }
        "getSales" => {
            let a: SaleFilterArgs = parse(args)?;
            json(db.sales().list(&a.into()).await?)
        }
        "getSaleById" => {
            let a: IdArgs = parse(args)?;
            json(db.sales().get_by_id(a.id).await?)
        }
        "getSaleItems" => {
            let a: SaleIdArgs = parse(args)?;
            json(db.sales().items(a.sale_id).await?)
        }

        // ------------------------------------------------------- cash register
        "getCashRegisterEntries" => {
            let a: CashFilterArgs = parse(args)?;
            json(db.cash_register().list(&a.into()).await?)
        }
        "addExpense" => {
            let expense: NewExpense = parse(args)?;
            json(db.cash_register().add_expense(&expense).await?)
        }
        "addIncome" => {
            let income: NewIncome = parse(args)?;
            json(db.cash_register().add_income(&income).await?)
        }
        "getBalance" => {
            let a: CurrencyArgs = parse(args)?;
            json(db.cash_register().balance(a.currency).await?)
        }
        "exportCashRegister" => json(db.cash_register().export_all().await?),
        "importCashRegister" => {
            let a: ImportArgs = parse(args)?;
            json(db.cash_register().import(&a.entries, a.mode).await?)
        }

        // ------------------------------------------------------------- clients
        "getClients" => json(db.clients().list().await?),
        "searchClients" => {
            let a: QueryArgs = parse(args)?;
            json(db.clients().search(&a.query).await?)
        }
        "getClientById" => {
            let a: IdArgs = parse(args)?;
            json(db.clients().get_by_id(a.id).await?)
        }
        "createClient" => {
            let client: ClientInput = parse(args)?;
            json(db.clients().create(&client).await?)
        }
        "updateClient" => {
            let a: UpdateArgs<ClientInput> = parse(args)?;
            json(db.clients().update(a.id, &a.data).await?)
        }
        "deleteClient" => {
            let a: IdArgs = parse(args)?;
            json(db.clients().delete(a.id).await?)
        }
        "addClientCharge" => {
            let a: MovementArgs = parse(args)?;
            json(
                db.clients()
                    .add_charge(a.client_id, a.amount, a.description.as_deref())
                    .await?,
            )
        }
        "registerClientPayment" => {
            let a: MovementArgs = parse(args)?;
            json(
                db.clients()
                    .register_payment(a.client_id, a.amount, a.description.as_deref())
                    .await?,
            )
        }
        "getClientMovements" => {
            let a: ClientIdArgs = parse(args)?;
            json(db.clients().movements(a.client_id).await?)
        }

        // ----------------------------------------------------------- suppliers
        "getSuppliers" => json(db.suppliers().list().await?),
        "searchSuppliers" => {
            let a: QueryArgs = parse(args)?;
            json(db.suppliers().search(&a.query).await?)
        }
        "getSupplierById" => {
            let a: IdArgs = parse(args)?;
            json(db.suppliers().get_by_id(a.id).await?)
        }
        "createSupplier" => {
            let supplier: SupplierInput = parse(args)?;
            json(db.suppliers().create(&supplier).await?)
        }
        "updateSupplier" => {
            let a: UpdateArgs<SupplierInput> = parse(args)?;
            json(db.suppliers().update(a.id, &a.data).await?)
        }
        "deleteSupplier" => {
            let a: IdArgs = parse(args)?;
            json(db.suppliers().delete(a.id).await?)
        }

        // ----------------------------------------------------------- purchases
        "createPurchase" => {
            let purchase: NewPurchase = parse(args)?;
            json(db.purchases().create_purchase(&purchase).await?)
        }
        "getPurchases" => {
            let a: PurchaseFilterArgs = parse(args)?;
            json(db.purchases().list(&a.into()).await?)
        }
        "getPurchaseById" => {
            let a: IdArgs = parse(args)?;
            json(db.purchases().get_by_id(a.id).await?)
        }
        "addPurchasePayment" => {
            let a: PurchasePaymentArgs = parse(args)?;
            json(db.purchases().add_payment(a.purchase_id, &a.payment).await?)
        }
        "getPurchasePayments" => {
            let a: PurchaseIdArgs = parse(args)?;
            json(db.purchases().payments(a.purchase_id).await?)
        }

        // --------------------------------------------------------------- users
        "getUsers" => json(db.users().list().await?),
        "getUserById" => {
            let a: IdArgs = parse(args)?;
            json(db.users().get_by_id(a.id).await?)
        }
        "createUser" => {
            let user: NewUser = parse(args)?;
            json(db.users().create(&user).await?)
        }
        "updateUser" => {
            let a: UpdateArgs<UserUpdate> = parse(args)?;
            json(db.users().update(a.id, &a.data).await?)
        }
        "deleteUser" => {
            let a: IdArgs = parse(args)?;
            json(db.users().delete(a.id).await?)
        }
        "validateUser" => {
            let a: LoginArgs = parse(args)?;
            json(db.users().validate_user(&a.username, &a.password).await?)
        }

        // ------------------------------------------------------- configuration
        "getPaymentConfigs" => json(db.config().payment_configs().await?),
        "updatePaymentConfig" => {
            let a: SurchargeArgs = parse(args)?;
            json(db.config().update_surcharge(&a.method, a.surcharge).await?)
        }
        "getStoreConfig" => json(db.config().store_config().await?),
        "updateStoreConfig" => {
            let a: StoreConfigArgs = parse(args)?;
            json(db.config().set_store_config(&a.key, &a.value).await?)
        }

        // ------------------------------------------------------------- reports
        "getDashboardStats" => json(db.reports().dashboard_stats().await?),
        "getMonthlyReport" => {
            let a: MonthArgs = parse(args)?;
            json(db.reports().monthly_report(a.year, a.month).await?)
        }

        // --------------------------------------------------------------- notes
        "getNotes" => json(db.notes().list().await?),
        "createNote" => {
            let note: NewNote = parse(args)?;
            json(db.notes().create(&note).await?)
        }
        "updateNote" => {
            let a: UpdateArgs<NoteUpdate> = parse(args)?;
            json(db.notes().update(a.id, &a.data).await?)
        }
        "deleteNote" => {
            let a: IdArgs = parse(args)?;
            json(db.notes().delete(a.id).await?)
        }

        unknown => Err(ApiError::bad_request(format!("unknown method: {unknown}"))),
    }
}

// =============================================================================
// Argument Shapes
// =============================================================================

#[derive(Deserialize)]
struct IdArgs {
    id: i64,
}

#[derive(Deserialize)]
struct CategoryIdArgs {
    category_id: i64,
}

#[derive(Deserialize)]
struct SaleIdArgs {
    sale_id: i64,
}

#[derive(Deserialize)]
struct ClientIdArgs {
    client_id: i64,
}

#[derive(Deserialize)]
struct PurchaseIdArgs {
    purchase_id: i64,
}

#[derive(Deserialize)]
struct NameArgs {
    name: String,
}

#[derive(Deserialize)]
struct RenameArgs {
    id: i64,
    name: String,
}

#[derive(Deserialize)]
struct QueryArgs {
    query: String,
}

#[derive(Deserialize)]
struct BarcodeLookupArgs {
    barcode: String,
}

#[derive(Deserialize)]
struct BarcodeArgs {
    id: i64,
    barcode: Option<String>,
}

#[derive(Deserialize)]
struct StockArgs {
    id: i64,
    delta: i64,
}

/// `{id, data: {...}}` wrapper shared by all update methods.
#[derive(Deserialize)]
struct UpdateArgs<T> {
    id: i64,
    data: T,
}

#[derive(Deserialize)]
struct CreateSaleArgs {
    sale: NewSale,
    items: Vec<NewSaleItem>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SaleFilterArgs {
    start_date: Option<String>,
    end_date: Option<String>,
    payment_method: Option<String>,
}

impl From<SaleFilterArgs> for SaleFilters {
    fn from(a: SaleFilterArgs) -> Self {
        SaleFilters {
            start_date: a.start_date,
            end_date: a.end_date,
            payment_method: a.payment_method,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CashFilterArgs {
    start_date: Option<String>,
    end_date: Option<String>,
    #[serde(rename = "type")]
    entry_type: Option<EntryType>,
    currency: Option<Currency>,
}

impl From<CashFilterArgs> for CashFilters {
    fn from(a: CashFilterArgs) -> Self {
        CashFilters {
            start_date: a.start_date,
            end_date: a.end_date,
            entry_type: a.entry_type,
            currency: a.currency,
        }
    }
}

#[derive(Deserialize)]
struct CurrencyArgs {
    currency: Currency,
}

#[derive(Deserialize)]
struct ImportArgs {
    entries: Vec<ImportedEntry>,
    #[serde(default = "default_import_mode")]
    mode: ImportMode,
}

fn default_import_mode() -> ImportMode {
    ImportMode::Append
}

#[derive(Deserialize)]
struct MovementArgs {
    client_id: i64,
    amount: f64,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct PurchaseFilterArgs {
    supplier_id: Option<i64>,
    status: Option<PaymentStatus>,
}

impl From<PurchaseFilterArgs> for PurchaseFilters {
    fn from(a: PurchaseFilterArgs) -> Self {
        PurchaseFilters {
            supplier_id: a.supplier_id,
            status: a.status,
        }
    }
}

#[derive(Deserialize)]
struct PurchasePaymentArgs {
    purchase_id: i64,
    payment: NewPurchasePayment,
}

#[derive(Deserialize)]
struct LoginArgs {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct SurchargeArgs {
    method: String,
    surcharge: f64,
}

#[derive(Deserialize)]
struct StoreConfigArgs {
    key: String,
    value: String,
}

#[derive(Deserialize)]
struct MonthArgs {
    year: i32,
    month: u32,
}

// =============================================================================
// Helpers
// =============================================================================

fn parse<T: DeserializeOwned>(args: Value) -> Result<T, ApiError> {
    serde_json::from_value(args)
        .map_err(|e| ApiError::bad_request(format!("invalid arguments: {e}")))
}

fn json<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::new(ErrorCode::Internal, e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use electrostock_db::DbConfig;
    use serde_json::json;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn request(method: &str, args: Value) -> ApiRequest {
        ApiRequest {
            method: method.to_string(),
            args,
        }
    }

    #[tokio::test]
    async fn test_unknown_method_is_bad_request() {
        let db = test_db().await;
        let response = dispatch(&db, request("fooBar", Value::Null)).await;

        assert!(!response.success);
        assert_eq!(response.error.unwrap().code, ErrorCode::BadRequest);
    }

    #[tokio::test]
    async fn test_malformed_args_are_bad_request() {
        let db = test_db().await;
        let response = dispatch(&db, request("createCategory", json!({"nombre": "x"}))).await;

        assert!(!response.success);
        assert_eq!(response.error.unwrap().code, ErrorCode::BadRequest);
    }

    #[tokio::test]
    async fn test_sale_flow_through_the_boundary() {
        let db = test_db().await;

        let category = dispatch(&db, request("createCategory", json!({"name": "Cables"}))).await;
        let category_id = category.data.unwrap();

        let product = dispatch(
            &db,
            request(
                "createProduct",
                json!({"category_id": category_id, "name": "USB-C 1m", "price": 1500.0, "stock": 10}),
            ),
        )
        .await;
        assert!(product.success);
        let product_id = product.data.unwrap();

        let sale = dispatch(
            &db,
            request(
                "createSale",
                json!({
                    "sale": {
                        "payment_method": "cash_ars",
                        "currency": "ARS",
                        "subtotal": 4500.0,
                        "total": 4500.0
                    },
                    "items": [{
                        "product_id": product_id,
                        "product_name": "USB-C 1m",
                        "category_name": "Cables",
                        "quantity": 3,
                        "unit_price": 1500.0,
                        "subtotal": 4500.0
                    }]
                }),
            ),
        )
        .await;
        assert!(sale.success);

        let balance = dispatch(&db, request("getBalance", json!({"currency": "ARS"}))).await;
        assert_eq!(balance.data.unwrap()["balance"], 4500.0);

        let fetched = dispatch(
            &db,
            request("getProductById", json!({"id": product_id})),
        )
        .await;
        assert_eq!(fetched.data.unwrap()["stock"], 7);
    }

    #[tokio::test]
    async fn test_insufficient_stock_maps_to_its_code() {
        let db = test_db().await;
        dispatch(&db, request("createCategory", json!({"name": "Cables"}))).await;
        let product = dispatch(
            &db,
            request(
                "createProduct",
                json!({"category_id": 1, "name": "USB-C 1m", "price": 1500.0, "stock": 1}),
            ),
        )
        .await;
        let product_id = product.data.unwrap();

        let response = dispatch(
            &db,
            request(
                "createSale",
                json!({
                    "sale": {
                        "payment_method": "cash_ars",
                        "currency": "ARS",
                        "subtotal": 3000.0,
                        "total": 3000.0
                    },
                    "items": [{
                        "product_id": product_id,
                        "product_name": "USB-C 1m",
                        "quantity": 2,
                        "unit_price": 1500.0,
                        "subtotal": 3000.0
                    }]
                }),
            ),
        )
        .await;

        assert!(!response.success);
        assert_eq!(response.error.unwrap().code, ErrorCode::InsufficientStock);
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let db = test_db().await;

        // default admin seeded at startup
        let ok = dispatch(
            &db,
            request("validateUser", json!({"username": "admin", "password": "123"})),
        )
        .await;
        assert!(ok.success);
        assert_eq!(ok.data.unwrap()["username"], "admin");

        let bad = dispatch(
            &db,
            request("validateUser", json!({"username": "admin", "password": "nope"})),
        )
        .await;
        assert!(bad.success);
        assert!(bad.data.unwrap().is_null());
    }

    #[tokio::test]
    async fn test_dashboard_and_report_methods_answer() {
        let db = test_db().await;

        let stats = dispatch(&db, request("getDashboardStats", Value::Null)).await;
        assert!(stats.success);
        assert_eq!(
            stats.data.unwrap()["last7_days"].as_array().unwrap().len(),
            7
        );

        let report = dispatch(
            &db,
            request("getMonthlyReport", json!({"year": 2026, "month": 8})),
        )
        .await;
        assert!(report.success);
    }
}
