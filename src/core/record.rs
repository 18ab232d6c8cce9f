//! Records and field normalisation
//!
//! Records are schemaless JSON values owned by the store. The helpers here turn
//! loosely-typed fields into something comparable: the product category may be
//! stored as a string, a number or not at all, and identifiers arrive from the
//! query string as text while the document may hold them as numbers.

use serde_json::{Number, Value};

/// A single stored record (normally a JSON object)
pub type Record = Value;

/// Collection holding the product catalogue
pub const PRODUCTS: &str = "products";

/// Collection holding cart items
pub const CART: &str = "cart";

/// Field carrying the product reference used by the cart and delete routes
pub const PRODUCT_ID: &str = "productId";

/// Field stamped on records created through POST
pub const CREATED_AT: &str = "createdAt";

/// Render a scalar JSON value as text
///
/// Strings are returned as-is, numbers without a trailing `.0` when integral,
/// booleans as `true`/`false`. Null, arrays and objects have no text form.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Whether a field value counts as present
///
/// `null`, `false`, `0` and `""` count as absent, like a falsy field in a
/// loosely-typed client.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Normalise a stored category into its comparable form
///
/// Returns `None` when the record carries no usable category; falsy values
/// (`0`, `false`, `""`) count as no category. The result is trimmed but keeps
/// its case; callers compare case-insensitively.
pub fn to_comparable_category(value: Option<&Value>) -> Option<String> {
    value
        .filter(|value| is_truthy(value))
        .and_then(scalar_text)
        .map(|text| text.trim().to_string())
}

/// Category of a record, normalised
pub fn category(record: &Record) -> Option<String> {
    to_comparable_category(record.get("category"))
}

/// Discounted price of a record
///
/// Only JSON numbers count. A missing, null, string or otherwise non-numeric
/// price yields `None`, which fails every band comparison.
pub fn discounted_price(record: &Record) -> Option<f64> {
    record.get("discounted_price").and_then(Value::as_f64)
}

/// Lower-cased name of a record, if it has a string name
pub fn lowercase_name(record: &Record) -> Option<String> {
    record
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_lowercase)
}

/// Whether `record[field]`, rendered as text, equals `expected`
pub fn field_equals(record: &Record, field: &str, expected: &str) -> bool {
    record
        .get(field)
        .and_then(scalar_text)
        .is_some_and(|text| text == expected)
}

/// Trim a user-supplied query value, mapping blank input to `None`
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // === to_comparable_category() ===

    #[test]
    fn test_category_string_is_trimmed() {
        assert_eq!(
            to_comparable_category(Some(&json!("  Phone "))),
            Some("Phone".to_string())
        );
    }

    #[test]
    fn test_category_number_is_rendered() {
        assert_eq!(to_comparable_category(Some(&json!(42))), Some("42".into()));
        assert_eq!(to_comparable_category(Some(&json!(4.0))), Some("4".into()));
        assert_eq!(to_comparable_category(Some(&json!(2.5))), Some("2.5".into()));
    }

    #[test]
    fn test_category_bool_is_rendered() {
        assert_eq!(to_comparable_category(Some(&json!(true))), Some("true".into()));
    }

    #[test]
    fn test_category_falsy_is_none() {
        assert_eq!(to_comparable_category(Some(&json!(0))), None);
        assert_eq!(to_comparable_category(Some(&json!(false))), None);
        assert_eq!(to_comparable_category(Some(&json!(""))), None);
    }

    #[test]
    fn test_category_absent_or_structured_is_none() {
        assert_eq!(to_comparable_category(None), None);
        assert_eq!(to_comparable_category(Some(&json!(null))), None);
        assert_eq!(to_comparable_category(Some(&json!(["a"]))), None);
        assert_eq!(to_comparable_category(Some(&json!({"a": 1}))), None);
    }

    // === is_truthy() ===

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!(3)));
        assert!(is_truthy(&json!("3")));
        assert!(is_truthy(&json!(" ")));
        assert!(is_truthy(&json!({"n": 1})));
    }

    // === discounted_price() ===

    #[test]
    fn test_price_requires_a_number() {
        assert_eq!(discounted_price(&json!({"discounted_price": 1500})), Some(1500.0));
        assert_eq!(discounted_price(&json!({"discounted_price": "1500"})), None);
        assert_eq!(discounted_price(&json!({"discounted_price": null})), None);
        assert_eq!(discounted_price(&json!({"name": "x"})), None);
    }

    // === field_equals() ===

    #[test]
    fn test_field_equals_matches_numbers_as_text() {
        let record = json!({"productId": 7, "sku": "7"});
        assert!(field_equals(&record, "productId", "7"));
        assert!(field_equals(&record, "sku", "7"));
        assert!(!field_equals(&record, "productId", "07"));
        assert!(!field_equals(&record, "missing", "7"));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  phone ")), Some("phone"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_lowercase_name() {
        assert_eq!(lowercase_name(&json!({"name": "iPhone"})), Some("iphone".into()));
        assert_eq!(lowercase_name(&json!({"name": 5})), None);
    }
}
