//! Order Record Types
//!
//! Typed representation of one order row from the provider table, plus the
//! validating decode that turns the provider's dynamic field map into an
//! [`OrderRecord`] exactly once, at ingestion. Records are immutable after
//! decoding; everything downstream (snapshot, statistics) works on typed
//! fields and never touches raw JSON again.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;

/// Date format used by the provider for `order_placed`.
const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Order was cancelled. Excluded from revenue.
    Cancelled,
    /// Order has shipped.
    Shipped,
    /// Order was placed but not yet in progress.
    Placed,
    /// Order is being worked on.
    InProgress,
}

impl OrderStatus {
    /// Parse a provider status string. Returns `None` for anything outside
    /// the four known statuses.
    #[must_use]
    pub fn from_provider(s: &str) -> Option<Self> {
        match s {
            "cancelled" => Some(Self::Cancelled),
            "shipped" => Some(Self::Shipped),
            "placed" => Some(Self::Placed),
            "in_progress" => Some(Self::InProgress),
            _ => None,
        }
    }

    /// Get the provider's name for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Shipped => "shipped",
            Self::Placed => "placed",
            Self::InProgress => "in_progress",
        }
    }

    /// Check whether this order counts toward revenue.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// =============================================================================
// Order Record
// =============================================================================

/// One order row, fully typed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    /// Provider record identifier.
    pub id: String,
    /// Order lifecycle status.
    pub status: OrderStatus,
    /// Date the order was placed.
    pub placed_on: NaiveDate,
    /// Order price.
    pub price: Decimal,
    /// Product name, matched case-sensitively in the per-product breakdown.
    pub product_name: String,
}

impl OrderRecord {
    /// Decode a record from the provider's dynamic field map.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when a consumed field is missing, has the
    /// wrong JSON type, carries an unknown status, or carries a date that is
    /// not canonical `YYYY-MM-DD`.
    pub fn from_fields(id: &str, fields: &Map<String, Value>) -> Result<Self, ValidationError> {
        let status_raw = require_str(id, fields, "order_status")?;
        let status = OrderStatus::from_provider(status_raw).ok_or_else(|| {
            ValidationError::UnknownStatus {
                record_id: id.to_string(),
                status: status_raw.to_string(),
            }
        })?;

        let placed_raw = require_str(id, fields, "order_placed")?;
        let placed_on = parse_order_date(id, placed_raw)?;

        let price_value = require_field(id, fields, "price")?;
        if !price_value.is_number() {
            return Err(ValidationError::WrongType {
                record_id: id.to_string(),
                field: "price",
                expected: "number",
            });
        }
        let price: Decimal =
            serde_json::from_value(price_value.clone()).map_err(|_| ValidationError::WrongType {
                record_id: id.to_string(),
                field: "price",
                expected: "number",
            })?;

        let product_name = require_str(id, fields, "product_name")?.to_string();

        Ok(Self {
            id: id.to_string(),
            status,
            placed_on,
            price,
            product_name,
        })
    }
}

/// Parse an `order_placed` value, rejecting anything that is not canonical
/// `YYYY-MM-DD` (chrono's `%Y` would otherwise accept short years like `06`).
fn parse_order_date(record_id: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    let invalid = || ValidationError::InvalidDate {
        record_id: record_id.to_string(),
        value: value.to_string(),
    };
    let parsed = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?;
    if parsed.format(DATE_FORMAT).to_string() != value {
        return Err(invalid());
    }
    Ok(parsed)
}

fn require_field<'a>(
    record_id: &str,
    fields: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, ValidationError> {
    fields.get(field).ok_or_else(|| ValidationError::MissingField {
        record_id: record_id.to_string(),
        field,
    })
}

fn require_str<'a>(
    record_id: &str,
    fields: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    require_field(record_id, fields, field)?
        .as_str()
        .ok_or_else(|| ValidationError::WrongType {
            record_id: record_id.to_string(),
            field,
            expected: "string",
        })
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A record failed the validating decode at ingestion.
///
/// Any single invalid record aborts the refresh that fetched it; a snapshot
/// is only ever assembled from fully valid records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A consumed field is absent from the record.
    #[error("record {record_id}: missing field `{field}`")]
    MissingField {
        /// Provider record identifier.
        record_id: String,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A consumed field has the wrong JSON type.
    #[error("record {record_id}: field `{field}` is not a {expected}")]
    WrongType {
        /// Provider record identifier.
        record_id: String,
        /// Name of the offending field.
        field: &'static str,
        /// Expected JSON type.
        expected: &'static str,
    },

    /// `order_status` holds a value outside the known statuses.
    #[error("record {record_id}: unknown order status `{status}`")]
    UnknownStatus {
        /// Provider record identifier.
        record_id: String,
        /// The unrecognized status value.
        status: String,
    },

    /// `order_placed` is not a canonical `YYYY-MM-DD` date.
    #[error("record {record_id}: invalid order date `{value}`, expected YYYY-MM-DD")]
    InvalidDate {
        /// Provider record identifier.
        record_id: String,
        /// The unparseable date value.
        value: String,
    },
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(entries: &[(&str, Value)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn valid_fields() -> Map<String, Value> {
        fields(&[
            ("order_status", Value::from("shipped")),
            ("order_placed", Value::from("2024-03-05")),
            ("price", Value::from(12.5)),
            ("product_name", Value::from("bow")),
        ])
    }

    #[test]
    fn decodes_valid_record() {
        let record = OrderRecord::from_fields("rec1", &valid_fields()).unwrap();
        assert_eq!(record.id, "rec1");
        assert_eq!(record.status, OrderStatus::Shipped);
        assert_eq!(record.placed_on, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(record.price, Decimal::new(125, 1));
        assert_eq!(record.product_name, "bow");
    }

    #[test]
    fn integer_price_is_accepted() {
        let mut f = valid_fields();
        f.insert("price".to_string(), Value::from(42));
        let record = OrderRecord::from_fields("rec1", &f).unwrap();
        assert_eq!(record.price, Decimal::from(42));
    }

    #[test]
    fn missing_field_is_rejected() {
        let mut f = valid_fields();
        f.remove("product_name");
        let err = OrderRecord::from_fields("rec1", &f).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                record_id: "rec1".to_string(),
                field: "product_name",
            }
        );
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        let mut f = valid_fields();
        f.insert("price".to_string(), Value::from("12.50"));
        let err = OrderRecord::from_fields("rec1", &f).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::WrongType { field: "price", .. }
        ));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut f = valid_fields();
        f.insert("order_status".to_string(), Value::from("bad order status"));
        let err = OrderRecord::from_fields("rec1", &f).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownStatus {
                record_id: "rec1".to_string(),
                status: "bad order status".to_string(),
            }
        );
    }

    #[test_case::test_case("06-01-02"; "short year")]
    #[test_case::test_case("2024-3-5"; "unpadded month and day")]
    #[test_case::test_case("2024-13-01"; "month out of range")]
    #[test_case::test_case("02-01-2024"; "day first")]
    #[test_case::test_case(""; "empty")]
    fn non_canonical_date_is_rejected(value: &str) {
        let mut f = valid_fields();
        f.insert("order_placed".to_string(), Value::from(value));
        let err = OrderRecord::from_fields("rec1", &f).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDate { .. }));
    }

    #[test]
    fn status_round_trip() {
        for status in [
            OrderStatus::Cancelled,
            OrderStatus::Shipped,
            OrderStatus::Placed,
            OrderStatus::InProgress,
        ] {
            assert_eq!(OrderStatus::from_provider(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::from_provider("CANCELLED"), None);
    }

    #[test]
    fn only_cancelled_is_cancelled() {
        assert!(OrderStatus::Cancelled.is_cancelled());
        assert!(!OrderStatus::Shipped.is_cancelled());
        assert!(!OrderStatus::Placed.is_cancelled());
        assert!(!OrderStatus::InProgress.is_cancelled());
    }
}
