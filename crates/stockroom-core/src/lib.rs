//! # stockroom-core
//!
//! Money, document totals, the selection builder and the dashboard
//! reduction. Nothing here performs I/O; stockroom-db supplies storage.
//!
//! ```text
//!  catalog row ──► SelectionBuilder ──► build_sale / build_purchase
//!                  (qty, unit price)          │
//!                                             ▼
//!                              FinancialDocument::prepare_for_save
//!                              (line totals, subtotal, total, due,
//!                               cost, profit, product_ids)
//!                                             │
//!                                             ▼
//!                              stockroom-db writer ──► stock deltas
//!
//!  stored sales + expenses ──► dashboard::summarize ──► DashboardSummary
//! ```
//!
//! | module           | holds                                          |
//! |------------------|------------------------------------------------|
//! | [`money`]        | `Money`, `line_item_total`, `document_total`   |
//! | [`types`]        | catalog, document and counterparty records     |
//! | [`document`]     | `FinancialDocument`, stock delta rules         |
//! | [`selection`]    | per-session builder and `Selection`            |
//! | [`dashboard`]    | windows, buckets, `summarize`                  |
//! | [`notification`] | records written after a document is created    |
//! | [`validation`]   | field checks                                   |
//! | [`error`]        | `CoreError`, `ValidationError`                 |

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dashboard;
pub mod document;
pub mod error;
pub mod money;
pub mod notification;
pub mod selection;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports
// =============================================================================

pub use document::FinancialDocument;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use notification::{Notification, NotificationKind};
pub use selection::{DocumentTerms, Selection, SelectionBuilder, StoredLine};
pub use types::*;

// =============================================================================
// Catalog Limits
// =============================================================================

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page a single catalog call may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Longest accepted search query, in characters.
pub const MAX_SEARCH_LENGTH: usize = 100;
