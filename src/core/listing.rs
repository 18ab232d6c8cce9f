//! Query operators for the generic collection listing
//!
//! `GET /{collection}` accepts json-server style operators:
//!
//! ```text
//! GET /products?category=phone&category=tablet     equality (repeat = any of)
//! GET /products?brand_ne=acme                      inequality
//! GET /products?name_like=galaxy                   case-insensitive substring
//! GET /products?discounted_price_gte=1000          numeric range
//! GET /products?_sort=discounted_price&_order=desc sorting
//! GET /products?_page=2&_limit=20                  pagination
//! ```
//!
//! All comparisons render the stored value as text first, so `?id=3` matches
//! both `"id": 3` and `"id": "3"`.

use crate::core::query::{self, DEFAULT_LIMIT, PageParams};
use crate::core::record::{self, Record};
use indexmap::IndexMap;
use serde_json::Value;
use std::cmp::Ordering;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    NotEqual(String, String),
    Like(String, String),
    AtLeast(String, Option<f64>),
    AtMost(String, Option<f64>),
}

impl Condition {
    fn matches(&self, record: &Record) -> bool {
        match self {
            Condition::NotEqual(field, value) => !record::field_equals(record, field, value),
            Condition::Like(field, needle) => text_field(record, field)
                .is_some_and(|text| text.to_lowercase().contains(needle.as_str())),
            Condition::AtLeast(field, bound) => {
                matches!((numeric_field(record, field), bound), (Some(v), Some(b)) if v >= *b)
            }
            Condition::AtMost(field, bound) => {
                matches!((numeric_field(record, field), bound), (Some(v), Some(b)) if v <= *b)
            }
        }
    }
}

fn text_field(record: &Record, field: &str) -> Option<String> {
    record.get(field).and_then(record::scalar_text)
}

fn numeric_field(record: &Record, field: &str) -> Option<f64> {
    match record.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parsed listing parameters
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    equals: IndexMap<String, Vec<String>>,
    conditions: Vec<Condition>,
    sort: Option<(String, SortOrder)>,
    paging: PageParams,
}

/// Result of a listing: the records and, when paginated, the unsliced total
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub records: Vec<Record>,
    pub total: Option<usize>,
}

impl ListQuery {
    /// Build a query from raw query-string pairs, in request order
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut query = ListQuery::default();
        let mut order = SortOrder::Asc;
        let mut sort_field = None;

        for (key, value) in pairs {
            match key.as_str() {
                "_sort" => sort_field = Some(value.clone()),
                "_order" => order = SortOrder::parse(value),
                "_page" => query.paging.page = Some(value.clone()),
                "_limit" => query.paging.limit = Some(value.clone()),
                reserved if reserved.starts_with('_') => {}
                _ => query.push_condition(key, value),
            }
        }

        query.sort = sort_field.map(|field| (field, order));
        query
    }

    fn push_condition(&mut self, key: &str, value: &str) {
        let condition = if let Some(field) = key.strip_suffix("_ne") {
            Condition::NotEqual(field.to_string(), value.to_string())
        } else if let Some(field) = key.strip_suffix("_like") {
            Condition::Like(field.to_string(), value.to_lowercase())
        } else if let Some(field) = key.strip_suffix("_gte") {
            Condition::AtLeast(field.to_string(), value.trim().parse().ok())
        } else if let Some(field) = key.strip_suffix("_lte") {
            Condition::AtMost(field.to_string(), value.trim().parse().ok())
        } else {
            self.equals
                .entry(key.to_string())
                .or_default()
                .push(value.to_string());
            return;
        };
        self.conditions.push(condition);
    }

    fn matches(&self, record: &Record) -> bool {
        self.equals.iter().all(|(field, values)| {
            values
                .iter()
                .any(|value| record::field_equals(record, field, value))
        }) && self.conditions.iter().all(|c| c.matches(record))
    }

    /// Filter, sort and slice a collection snapshot
    pub fn apply(&self, records: Vec<Record>) -> Listing {
        let mut records: Vec<Record> = records.into_iter().filter(|r| self.matches(r)).collect();

        if let Some((field, order)) = &self.sort {
            records.sort_by(|a, b| compare_field(a, b, field, *order));
        }

        if !self.paging.is_requested() {
            return Listing {
                records,
                total: None,
            };
        }

        let page = query::paginate(
            records,
            self.paging.page(),
            self.paging.limit_or(DEFAULT_LIMIT),
        );
        Listing {
            records: page.items,
            total: Some(page.meta.total),
        }
    }
}

/// Compare two records on `field`; records missing the field sort last
fn compare_field(a: &Record, b: &Record, field: &str, order: SortOrder) -> Ordering {
    let (a, b) = (a.get(field), b.get(field));
    let present = |v: Option<&Value>| v.is_some_and(|v| !v.is_null());

    match (present(a), present(b)) {
        (false, false) => Ordering::Equal,
        (false, true) => Ordering::Greater,
        (true, false) => Ordering::Less,
        (true, true) => {
            let ordering = match (a.and_then(Value::as_f64), b.and_then(Value::as_f64)) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => {
                    let x = a.and_then(record::scalar_text).unwrap_or_default();
                    let y = b.and_then(record::scalar_text).unwrap_or_default();
                    x.cmp(&y)
                }
            };
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        }
    }
}
