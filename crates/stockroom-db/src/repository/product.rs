//! # Product Repository
//!
//! The catalog store: paged listing, point lookups, and stock movement.
//!
//! ## Keyset Pagination
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How a Page Is Served                                 │
//! │                                                                         │
//! │  list_page(session, cursor, query)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cursor == None            → first page                                │
//! │  cursor == session handle  → resume from cached (name, id)             │
//! │  otherwise                 → look the cursor id up, resume after it    │
//! │  lookup misses             → empty page, stale_cursor = true           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT … WHERE brand = ? AND category = ?                             │
//! │           AND (name, id) > (anchor.name, anchor.id)                    │
//! │  ORDER BY name, id LIMIT page_size + 1                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  has_more = fetched > page_size   (decided BEFORE search filtering)    │
//! │  rows     = first page_size rows, then name/code substring filter      │
//! │  cursor   = id of the last row fetched (not the last row returned)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The search filter runs after the bounded fetch, so a page can hold fewer
//! than `page_size` rows while `has_more` is still true.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockroom_core::validation::{validate_page_size, validate_product, validate_search_query};
use stockroom_core::{Product, DEFAULT_PAGE_SIZE};

// =============================================================================
// Pagination Types
// =============================================================================

/// Filters for one listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    /// Exact brand match.
    pub brand: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring of name or product code.
    pub search: Option<String>,
    pub page_size: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        PageQuery {
            brand: None,
            category: None,
            search: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageQuery {
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
}

/// Position of the last row a session fetched.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
struct CursorHandle {
    id: String,
    name: String,
}

/// Pagination state for one listing session.
///
/// Owned by the caller. Two concurrent listings need two sessions.
#[derive(Debug, Clone, Default)]
pub struct PageSession {
    last: Option<CursorHandle>,
}

impl PageSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the cached handle (filter change, pull-to-refresh).
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Id of the last row this session fetched, if any.
    pub fn cursor(&self) -> Option<&str> {
        self.last.as_ref().map(|handle| handle.id.as_str())
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub products: Vec<Product>,
    /// The raw fetch found more rows than `page_size`.
    pub has_more: bool,
    /// Pass back to `list_page` for the next page.
    pub next_cursor: Option<String>,
    /// The cursor pointed at a product that no longer exists.
    pub stale_cursor: bool,
}

/// Distinct filter values present in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFacets {
    pub brands: Vec<String>,
    pub categories: Vec<String>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let mut session = PageSession::new();
///
/// let first = repo.list_page(&mut session, None, &PageQuery::default()).await?;
/// let second = repo
///     .list_page(&mut session, first.next_cursor.as_deref(), &PageQuery::default())
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Serves one page ordered by `(name, id)`.
    ///
    /// ## Arguments
    /// * `session` - Caller-owned cursor cache, updated on success
    /// * `cursor` - `next_cursor` from the previous page, `None` for the first
    /// * `query` - Brand/category equality filters, search text, page size
    pub async fn list_page(
        &self,
        session: &mut PageSession,
        cursor: Option<&str>,
        query: &PageQuery,
    ) -> DbResult<Page> {
        validate_page_size(query.page_size)?;
        let search = match query.search.as_deref() {
            Some(text) => validate_search_query(text)?,
            None => String::new(),
        };

        let anchor = match cursor {
            None => None,
            Some(token) => match self.resolve_cursor(session, token).await? {
                Some(handle) => Some(handle),
                None => {
                    warn!(cursor = %token, "Pagination cursor no longer exists");
                    session.reset();
                    return Ok(Page {
                        stale_cursor: true,
                        ..Page::default()
                    });
                }
            },
        };

        debug!(
            brand = ?query.brand,
            category = ?query.category,
            page_size = query.page_size,
            resumed = anchor.is_some(),
            "Listing products"
        );

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM products WHERE 1 = 1");

        if let Some(brand) = &query.brand {
            builder.push(" AND brand = ").push_bind(brand.clone());
        }
        if let Some(category) = &query.category {
            builder.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(anchor) = &anchor {
            builder
                .push(" AND (name > ")
                .push_bind(anchor.name.clone())
                .push(" OR (name = ")
                .push_bind(anchor.name.clone())
                .push(" AND id > ")
                .push_bind(anchor.id.clone())
                .push("))");
        }
        builder
            .push(" ORDER BY name, id LIMIT ")
            .push_bind(i64::from(query.page_size) + 1);

        let mut rows = builder
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        let page_size = query.page_size as usize;
        let has_more = rows.len() > page_size;
        rows.truncate(page_size);

        session.last = rows.last().map(|p| CursorHandle {
            id: p.id.clone(),
            name: p.name.clone(),
        });
        let next_cursor = session.cursor().map(str::to_string);

        let fetched = rows.len();
        if !search.is_empty() {
            rows.retain(|p| p.matches_search(&search));
        }

        debug!(fetched, returned = rows.len(), has_more, "Page served");

        Ok(Page {
            products: rows,
            has_more,
            next_cursor,
            stale_cursor: false,
        })
    }

    /// Uses the session's cached handle when it matches, else looks up the id.
    async fn resolve_cursor(
        &self,
        session: &PageSession,
        token: &str,
    ) -> DbResult<Option<CursorHandle>> {
        if let Some(handle) = session.last.as_ref().filter(|h| h.id == token) {
            return Ok(Some(handle.clone()));
        }

        let handle = sqlx::query_as::<_, CursorHandle>("SELECT id, name FROM products WHERE id = ?1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(handle)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Scanner lookup: matches either the barcode or the product code.
    pub async fn get_by_barcode(&self, code: &str) -> DbResult<Option<Product>> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }

        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE barcode = ?1 OR product_code = ?1
            ORDER BY name, id
            LIMIT 1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    /// Inserts or updates a product.
    ///
    /// An empty id gets a fresh UUID. Updating an existing product never
    /// overwrites its stock level; stock moves through [`adjust_stock`] and
    /// the document writer only.
    ///
    /// [`adjust_stock`]: ProductRepository::adjust_stock
    pub async fn save(&self, mut product: Product) -> DbResult<Product> {
        validate_product(&product)?;

        let now = Utc::now();
        if product.id.is_empty() {
            product.id = Uuid::new_v4().to_string();
            product.created_at = now;
        }
        product.updated_at = now;

        debug!(id = %product.id, name = %product.name, "Saving product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, brand, category, unit, barcode, product_code, image_url,
                quantity, min_stock_level,
                cost_price_cents, purchase_price_cents, mrp_cents,
                wholesale_price_cents, dealer_price_cents,
                supplier_id, supplier_name, expiry_date, batch_number,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
                ?9, ?10,
                ?11, ?12, ?13,
                ?14, ?15,
                ?16, ?17, ?18, ?19,
                ?20, ?21
            )
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                brand = excluded.brand,
                category = excluded.category,
                unit = excluded.unit,
                barcode = excluded.barcode,
                product_code = excluded.product_code,
                image_url = excluded.image_url,
                min_stock_level = excluded.min_stock_level,
                cost_price_cents = excluded.cost_price_cents,
                purchase_price_cents = excluded.purchase_price_cents,
                mrp_cents = excluded.mrp_cents,
                wholesale_price_cents = excluded.wholesale_price_cents,
                dealer_price_cents = excluded.dealer_price_cents,
                supplier_id = excluded.supplier_id,
                supplier_name = excluded.supplier_name,
                expiry_date = excluded.expiry_date,
                batch_number = excluded.batch_number,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.brand)
        .bind(&product.category)
        .bind(&product.unit)
        .bind(&product.barcode)
        .bind(&product.product_code)
        .bind(&product.image_url)
        .bind(product.quantity)
        .bind(product.min_stock_level)
        .bind(product.cost_price_cents)
        .bind(product.purchase_price_cents)
        .bind(product.mrp_cents)
        .bind(product.wholesale_price_cents)
        .bind(product.dealer_price_cents)
        .bind(&product.supplier_id)
        .bind(&product.supplier_name)
        .bind(product.expiry_date)
        .bind(&product.batch_number)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&product.id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &product.id))
    }

    /// Removes a product permanently.
    ///
    /// Documents that reference it keep their line-item snapshots.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Moves stock by a signed delta outside of any document.
    ///
    /// The result may go negative.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<()> {
        debug!(id = %id, delta, "Adjusting stock");

        if increment_quantity(&self.pool, id, delta).await? == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Number of products in the catalog.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Sorted distinct non-empty brands and categories, for filter pickers.
    pub async fn brands_and_categories(&self) -> DbResult<CatalogFacets> {
        let brands: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT brand FROM products WHERE brand IS NOT NULL AND brand <> '' ORDER BY brand",
        )
        .fetch_all(&self.pool)
        .await?;

        let categories: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT category FROM products WHERE category IS NOT NULL AND category <> '' ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(CatalogFacets { brands, categories })
    }
}

/// `quantity = quantity + delta` for one product.
///
/// Returns the number of rows touched: 0 means the product is missing.
/// Runs on whatever executor it is given, so the writer can call it inside
/// its transaction.
pub(crate) async fn increment_quantity<'e, E>(executor: E, id: &str, delta: i64) -> DbResult<u64>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE products
        SET quantity = quantity + ?2,
            updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(delta)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Unit Tests
// =============================================================================
