//! # electrostock-api: Process-Boundary Dispatcher
//!
//! The JSON boundary between the desktop renderer and the data layer.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Request Lifecycle                             │
//! │                                                                     │
//! │  Renderer                                                           │
//! │    │  {"method": "createSale", "args": {...}}                       │
//! │    ▼                                                                │
//! │  dispatch()                                                         │
//! │    ├── deserialize args for the named method                        │
//! │    ├── call the matching repository operation                       │
//! │    └── wrap the outcome:                                            │
//! │          Ok   → {"success": true,  "data": ...}                     │
//! │          Err  → {"success": false, "error": {code, message}}        │
//! │    │                                                                │
//! │    ▼                                                                │
//! │  Renderer maps error codes to localized messages                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here touches SQL or business rules; this crate only translates
//! between JSON and the typed repository API.

pub mod dispatch;
pub mod error;
pub mod logging;
pub mod request;

pub use dispatch::dispatch;
pub use error::{ApiError, ErrorCode};
pub use logging::init_tracing;
pub use request::{ApiRequest, ApiResponse};
