//! # Validation Module
//!
//! Input validation for ledger requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Host process (CLI / UI)                                      │
//! │  ├── Parses text into numbers and dates                                │
//! │  └── Optional stricter rules (e.g. refuse to oversell)                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Request `validate()` (THIS MODULE)                           │
//! │  └── Runs before any transaction is opened                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── UNIQUE product name                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::{MAX_LINE_QUANTITY, MAX_UNIT_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Date format used for every ledger date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Ring A").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a product category. Empty is allowed.
pub fn validate_category(category: &str) -> ValidationResult<()> {
    max_chars("category", category, 100)
}

/// Validates an expense type tag. Empty is allowed.
pub fn validate_expense_kind(kind: &str) -> ValidationResult<()> {
    max_chars("kind", kind, 100)
}

fn max_chars(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the quantity of a purchase or sale line.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_LINE_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates stock brought in by a product upsert. Zero is allowed.
pub fn validate_incoming_stock(qty: i64) -> ValidationResult<()> {
    if !(0..=MAX_LINE_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "incoming_stock".to_string(),
            min: 0,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price, cost or amount in cents.
///
/// ## Rules
/// - Must not be negative
/// - Must not exceed [`MAX_UNIT_CENTS`]
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_cents;
///
/// assert!(validate_cents("unit_price", 1099).is_ok());
/// assert!(validate_cents("unit_price", 0).is_ok());
/// assert!(validate_cents("unit_price", -100).is_err());
/// assert!(validate_cents("unit_price", i64::MAX / 2).is_err());
/// ```
pub fn validate_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    if cents > MAX_UNIT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_UNIT_CENTS,
        });
    }

    Ok(())
}

/// Adds `delta` to a stored running total, failing instead of wrapping.
///
/// ```rust
/// use stockbook_core::validation::checked_total;
///
/// assert_eq!(checked_total("stock", 10, -3), Ok(7));
/// assert!(checked_total("total_revenue", i64::MAX, 1).is_err());
/// ```
pub fn checked_total(field: &str, current: i64, delta: i64) -> ValidationResult<i64> {
    current
        .checked_add(delta)
        .ok_or_else(|| ValidationError::Overflow {
            field: field.to_string(),
        })
}

// =============================================================================
// Date Validators
// =============================================================================

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(field: &str, input: &str) -> ValidationResult<NaiveDate> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|e| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("expected YYYY-MM-DD ({e})"),
    })
}

/// Rejects a report range whose start is after its end.
///
/// The report engine itself accepts any range; hosts call this first.
pub fn validate_date_range(from: NaiveDate, to: NaiveDate) -> CoreResult<()> {
    if from > to {
        return Err(CoreError::InvertedRange {
            from: from.format(DATE_FORMAT).to_string(),
            to: to.format(DATE_FORMAT).to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
