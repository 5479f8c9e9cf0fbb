//! # Dashboard Reduction
//!
//! Turns the sales and expenses of one time window into summary figures.
//! The queries live in stockroom-db; this module only folds the rows.
//!
//! ## Bucketing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  window ≤ 30 days  → hourly buckets                                    │
//! │  window > 30 days  → daily buckets                                     │
//! │                                                                         │
//! │  Buckets are aligned in the caller's UTC offset:                       │
//! │                                                                         │
//! │    index = (floor(t) − floor(start)) / bucket_width                    │
//! │                                                                         │
//! │  where floor() truncates to the hour or local midnight. Series are     │
//! │  sparse: a bucket with no documents is not emitted.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Offsets, not zones
//! A window carries one `FixedOffset` for its whole span. Windows that cross
//! a daylight-saving change keep the offset they started with, so local
//! midnights after the change land one hour off. Callers that need zone
//! rules split the window at the transition and summarise each part.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::types::{Expense, Sale};

/// Longest window still reported in hourly buckets.
pub const HOURLY_WINDOW_DAYS: i64 = 30;

/// Length of the top-products list.
pub const TOP_PRODUCTS_LIMIT: usize = 10;

const UNCATEGORIZED: &str = "Uncategorized";

// =============================================================================
// Window
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketGranularity {
    Hour,
    Day,
}

/// A reporting window at the caller's UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub offset: FixedOffset,
}

impl DashboardWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, offset: FixedOffset) -> Self {
        DashboardWindow { start, end, offset }
    }

    pub fn granularity(&self) -> BucketGranularity {
        if self.end - self.start <= Duration::days(HOURLY_WINDOW_DAYS) {
            BucketGranularity::Hour
        } else {
            BucketGranularity::Day
        }
    }

    /// Start of the bucket containing `t`, in the window's offset.
    pub fn bucket_start(&self, t: DateTime<Utc>) -> DateTime<FixedOffset> {
        let local = t.with_timezone(&self.offset);
        let naive = local.naive_local();
        let hour = match self.granularity() {
            BucketGranularity::Hour => naive.hour(),
            BucketGranularity::Day => 0,
        };
        let floored = naive.date().and_hms_opt(hour, 0, 0).unwrap_or(naive);
        // A fixed offset never yields an ambiguous or missing local time.
        self.offset
            .from_local_datetime(&floored)
            .single()
            .unwrap_or(local)
    }

    /// Index of the bucket containing `t`, counted from the window start.
    pub fn bucket_index(&self, t: DateTime<Utc>) -> i64 {
        let elapsed = self.bucket_start(t) - self.bucket_start(self.start);
        match self.granularity() {
            BucketGranularity::Hour => elapsed.num_hours(),
            BucketGranularity::Day => elapsed.num_days(),
        }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t <= self.end
    }
}

// =============================================================================
// Summary
// =============================================================================

/// One non-empty bucket of a time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub index: i64,
    pub bucket_start: DateTime<FixedOffset>,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuantity {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub granularity: BucketGranularity,
    pub total_revenue_cents: i64,
    pub total_profit_cents: i64,
    pub total_expenses_cents: i64,
    /// Profit minus expenses.
    pub net_profit_cents: i64,
    pub transaction_count: usize,
    /// Revenue divided by transaction count, truncated. Zero with no sales.
    pub average_order_value_cents: i64,
    pub revenue_series: Vec<SeriesPoint>,
    pub profit_series: Vec<SeriesPoint>,
    /// Highest quantity first, at most [`TOP_PRODUCTS_LIMIT`].
    pub top_products: Vec<ProductQuantity>,
    /// Highest revenue first.
    pub category_revenue: Vec<CategoryRevenue>,
}

/// Reduces every sale and expense inside `window`.
///
/// Rows outside the window are ignored, so callers may pass a superset.
pub fn summarize(window: &DashboardWindow, sales: &[Sale], expenses: &[Expense]) -> DashboardSummary {
    let mut revenue_by_bucket: BTreeMap<i64, i64> = BTreeMap::new();
    let mut profit_by_bucket: BTreeMap<i64, i64> = BTreeMap::new();
    let mut products: HashMap<String, ProductQuantity> = HashMap::new();
    let mut categories: HashMap<String, i64> = HashMap::new();

    let mut total_revenue = 0i64;
    let mut total_profit = 0i64;
    let mut count = 0usize;

    for sale in sales.iter().filter(|s| window.contains(s.sale_date)) {
        count += 1;
        total_revenue += sale.total_cents;
        total_profit += sale.total_profit_cents;

        let index = window.bucket_index(sale.sale_date);
        *revenue_by_bucket.entry(index).or_insert(0) += sale.total_cents;
        *profit_by_bucket.entry(index).or_insert(0) += sale.total_profit_cents;

        for item in &sale.items {
            let key = if item.product_id.is_empty() {
                item.product_name.clone()
            } else {
                item.product_id.clone()
            };
            products
                .entry(key)
                .or_insert_with(|| ProductQuantity {
                    product_id: item.product_id.clone(),
                    product_name: item.product_name.clone(),
                    quantity: 0,
                })
                .quantity += item.quantity;

            let category = item
                .category
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(UNCATEGORIZED);
            *categories.entry(category.to_string()).or_insert(0) += item.total_price_cents;
        }
    }

    let total_expenses: i64 = expenses
        .iter()
        .filter(|e| window.contains(e.expense_date))
        .map(|e| e.amount_cents)
        .sum();

    let mut top_products: Vec<ProductQuantity> = products.into_values().collect();
    top_products.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    top_products.truncate(TOP_PRODUCTS_LIMIT);

    let mut category_revenue: Vec<CategoryRevenue> = categories
        .into_iter()
        .map(|(category, revenue_cents)| CategoryRevenue {
            category,
            revenue_cents,
        })
        .collect();
    category_revenue.sort_by(|a, b| {
        b.revenue_cents
            .cmp(&a.revenue_cents)
            .then_with(|| a.category.cmp(&b.category))
    });

    DashboardSummary {
        granularity: window.granularity(),
        total_revenue_cents: total_revenue,
        total_profit_cents: total_profit,
        total_expenses_cents: total_expenses,
        net_profit_cents: total_profit - total_expenses,
        transaction_count: count,
        average_order_value_cents: if count == 0 {
            0
        } else {
            total_revenue / count as i64
        },
        revenue_series: to_series(window, revenue_by_bucket),
        profit_series: to_series(window, profit_by_bucket),
        top_products,
        category_revenue,
    }
}

fn to_series(window: &DashboardWindow, buckets: BTreeMap<i64, i64>) -> Vec<SeriesPoint> {
    let origin = window.bucket_start(window.start);
    let width = match window.granularity() {
        BucketGranularity::Hour => Duration::hours(1),
        BucketGranularity::Day => Duration::days(1),
    };
    buckets
        .into_iter()
        .map(|(index, amount_cents)| SeriesPoint {
            index,
            bucket_start: origin + width * index as i32,
            amount_cents,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
