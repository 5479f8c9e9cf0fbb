//! # stockroom-db
//!
//! SQLite storage for Stockroom.
//!
//! ```text
//!             Settings::load ──► DbConfig ──► Database
//!                                                │
//!   ┌──────────────────┬───────────────────┬─────┴──────────┬───────────────┐
//!   ▼                  ▼                   ▼                ▼               ▼
//! ProductRepository  Sale/Purchase       Customer/Supplier  Expense       Dashboard
//! keyset pages,      Repository          Repository         Repository    Repository
//! barcode lookup,    one transaction:    soft delete        date window   join! of sales
//! stock adjustment   body + stock                                         and expenses
//!                        │ created
//!                        ▼
//!                  NotificationRepository (after commit, failures logged)
//! ```
//!
//! [`editing`] turns a stored document back into builder selections,
//! substituting placeholders for products that were deleted since.
//!
//! ```rust,ignore
//! use stockroom_db::{Database, PageSession, Settings};
//!
//! let settings = Settings::load(None)?;
//! let db = Database::new(settings.db_config()).await?;
//!
//! let mut session = PageSession::new();
//! let first = db.products().list_page(&mut session, None, &settings.page_query()).await?;
//! let next = db
//!     .products()
//!     .list_page(&mut session, first.next_cursor.as_deref(), &settings.page_query())
//!     .await?;
//!
//! let saved = db.sales().save(builder.build_sale(Some(&customer), &terms)?).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod editing;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, Settings};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::counterparty::{CustomerRepository, SupplierRepository};
pub use repository::dashboard::DashboardRepository;
pub use repository::expense::ExpenseRepository;
pub use repository::notification::NotificationRepository;
pub use repository::product::{CatalogFacets, Page, PageQuery, PageSession, ProductRepository};
pub use repository::purchase::PurchaseRepository;
pub use repository::sale::SaleRepository;
