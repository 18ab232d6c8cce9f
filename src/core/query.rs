//! Query engine: price bands, name search and pagination
//!
//! Everything here is a pure function over a collection snapshot. Handlers
//! fetch the snapshot from the store, hand it to these functions and shape the
//! response; nothing in this module touches the store or the request.

use crate::core::error::ValidationError;
use crate::core::record::{self, Record};
use serde::Deserialize;

/// Page used when `_page` is absent or not a positive integer
pub const DEFAULT_PAGE: usize = 1;

/// Page size used by the price band routes and the generic list route
pub const DEFAULT_LIMIT: usize = 10;

/// Page size used by the paged name search
pub const NAME_SEARCH_LIMIT: usize = 5;

// =============================================================================
// Price bands
// =============================================================================

/// One of three disjoint, contiguous ranges of `discounted_price`
///
/// Lower bounds are inclusive and upper bounds exclusive, so 1,000,000 falls in
/// [`PriceBand::Mid`] and 5,000,000 in [`PriceBand::High`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceBand {
    /// [0, 1,000,000)
    Low,
    /// [1,000,000, 5,000,000)
    Mid,
    /// [5,000,000, ∞)
    High,
}

impl PriceBand {
    pub const ALL: [PriceBand; 3] = [PriceBand::Low, PriceBand::Mid, PriceBand::High];

    /// Inclusive lower bound
    pub fn lower(self) -> f64 {
        match self {
            PriceBand::Low => 0.0,
            PriceBand::Mid => 1_000_000.0,
            PriceBand::High => 5_000_000.0,
        }
    }

    /// Exclusive upper bound, `None` when unbounded
    pub fn upper(self) -> Option<f64> {
        match self {
            PriceBand::Low => Some(1_000_000.0),
            PriceBand::Mid => Some(5_000_000.0),
            PriceBand::High => None,
        }
    }

    pub fn contains(self, price: f64) -> bool {
        price >= self.lower() && self.upper().is_none_or(|upper| price < upper)
    }

    /// Short label used in logs
    pub fn label(self) -> &'static str {
        match self {
            PriceBand::Low => "under-1m",
            PriceBand::Mid => "1m-to-5m",
            PriceBand::High => "over-5m",
        }
    }

    /// Whether the paged listing reports `totalPages` and `currentPage`
    pub fn reports_page_count(self) -> bool {
        matches!(self, PriceBand::High)
    }
}

/// Products inside `band`, optionally restricted to a category, sorted by price
///
/// `category` is trimmed here; a blank category means no category filter.
/// Products without a numeric price are in no band. Products without a
/// category are dropped whenever a category filter is active. The sort is
/// stable, so equal prices keep their insertion order.
pub fn filter_by_price_band(
    products: &[Record],
    band: PriceBand,
    category: Option<&str>,
) -> Vec<Record> {
    let wanted = record::non_blank(category).map(str::to_lowercase);

    let mut matched: Vec<(f64, &Record)> = products
        .iter()
        .filter_map(|product| {
            let price = record::discounted_price(product)?;
            band.contains(price).then_some((price, product))
        })
        .filter(|(_, product)| match &wanted {
            Some(wanted) => record::category(product)
                .is_some_and(|category| category.to_lowercase() == *wanted),
            None => true,
        })
        .collect();

    matched.sort_by(|(a, _), (b, _)| a.total_cmp(b));

    tracing::debug!(
        band = band.label(),
        category = wanted.as_deref().unwrap_or("*"),
        matched = matched.len(),
        "filtered products by price band"
    );

    matched.into_iter().map(|(_, product)| product.clone()).collect()
}

// =============================================================================
// Name search
// =============================================================================

/// A validated, lower-cased, non-empty name search term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameQuery(String);

impl NameQuery {
    /// Trim and lower-case the raw `name_like` value
    ///
    /// Absent or blank input is a validation error, not "match all".
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        record::non_blank(raw)
            .map(|term| NameQuery(term.to_lowercase()))
            .ok_or(ValidationError::MissingNameQuery)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Products whose lower-cased name contains the query, in store order
///
/// Records without a string `name` never match.
pub fn filter_by_name(products: &[Record], query: &NameQuery) -> Vec<Record> {
    let matched: Vec<Record> = products
        .iter()
        .filter(|product| {
            record::lowercase_name(product).is_some_and(|name| name.contains(query.as_str()))
        })
        .cloned()
        .collect();

    tracing::debug!(query = query.as_str(), matched = matched.len(), "searched products by name");

    matched
}

// =============================================================================
// Pagination
// =============================================================================

/// Raw `_page` / `_limit` query parameters
///
/// Kept as text so that malformed values fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    #[serde(rename = "_page")]
    pub page: Option<String>,

    #[serde(rename = "_limit")]
    pub limit: Option<String>,
}

impl PageParams {
    /// Page number, defaulting to [`DEFAULT_PAGE`]
    pub fn page(&self) -> usize {
        parse_positive_int(self.page.as_deref()).unwrap_or(DEFAULT_PAGE)
    }

    /// Page size, defaulting to `default`
    pub fn limit_or(&self, default: usize) -> usize {
        parse_positive_int(self.limit.as_deref()).unwrap_or(default)
    }

    /// Whether the request asked for pagination at all
    pub fn is_requested(&self) -> bool {
        self.page.is_some() || self.limit.is_some()
    }
}

/// Parse the leading integer of `raw`, keeping it only when positive
///
/// Leading whitespace and a `+` sign are accepted, trailing garbage is ignored
/// (`"3abc"` is 3). Zero, negative and non-numeric input yield `None`. Values
/// too large for `usize` saturate.
pub fn parse_positive_int(raw: Option<&str>) -> Option<usize> {
    let text = raw?.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let digits = &text[..end];
    if digits.is_empty() {
        return None;
    }

    let value = digits.bytes().fold(0usize, |acc, digit| {
        acc.saturating_mul(10).saturating_add(usize::from(digit - b'0'))
    });
    (value > 0).then_some(value)
}

/// One page of a result list together with its pagination metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items before slicing
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,
}

impl PaginationMeta {
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let limit = limit.max(1);
        Self {
            page: page.max(1),
            limit,
            total,
            total_pages: total.div_ceil(limit),
        }
    }

    /// Index of the first item on this page
    pub fn start(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Slice `list[(page-1)*limit .. page*limit]`
///
/// Out-of-range pages produce an empty page, never an error.
pub fn paginate<T>(list: Vec<T>, page: usize, limit: usize) -> Page<T> {
    let meta = PaginationMeta::new(page, limit, list.len());
    let items = list
        .into_iter()
        .skip(meta.start())
        .take(meta.limit)
        .collect();

    Page { items, meta }
}
