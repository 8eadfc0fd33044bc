//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`]. Variants are grouped
//! into the families callers care about through [`Error::kind`], which the HTTP
//! layer uses to pick a status code.

use thiserror::Error;

/// Broad classification of an [`Error`], independent of the concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced record does not exist.
    NotFound,
    /// The request collides with current state (duplicate, already paid, ...).
    Conflict,
    /// The request itself is malformed.
    Validation,
    /// Storage, I/O or configuration failure.
    Internal,
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Error reported by the database layer.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem error (backups, config files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure while writing the spreadsheet archive.
    #[error("Export error: {0}")]
    Export(#[from] zip::result::ZipError),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Menu item lookup failed.
    #[error("Menu item {id} not found")]
    MenuItemNotFound {
        /// Requested menu item id
        id: i64,
    },

    /// Order lookup failed.
    #[error("Order {id} not found")]
    OrderNotFound {
        /// Requested order id
        id: i64,
    },

    /// The line item does not exist or belongs to another order.
    #[error("Order item {item_id} not found on order {order_id}")]
    OrderItemNotFound {
        /// Order the item was looked up on
        order_id: i64,
        /// Requested line item id
        item_id: i64,
    },

    /// Cashier lookup failed.
    #[error("Cashier {id} not found")]
    CashierNotFound {
        /// Requested cashier id
        id: i64,
    },

    /// Supervisor lookup failed.
    #[error("Supervisor {id} not found")]
    SupervisorNotFound {
        /// Requested supervisor id
        id: i64,
    },

    /// Menu item names are unique.
    #[error("Menu item name already exists: {name}")]
    DuplicateMenuItem {
        /// The conflicting name
        name: String,
    },

    /// Partial payment recorded against an order that is already settled.
    #[error("Order {order_id} is already paid")]
    AlreadyPaid {
        /// The settled order
        order_id: i64,
    },

    /// Restore requested for an order that was never canceled.
    #[error("Order {order_id} is not canceled")]
    NotCanceled {
        /// The order that is still live
        order_id: i64,
    },

    /// Negative or non-finite money amount.
    #[error("Invalid {field}: {amount}")]
    InvalidAmount {
        /// Name of the offending field
        field: &'static str,
        /// The rejected value
        amount: f64,
    },

    /// Line item quantities must be positive.
    #[error("Invalid quantity: {quantity} (must be at least 1)")]
    InvalidQuantity {
        /// The rejected value
        quantity: i32,
    },

    /// Date string not in `YYYY-MM-DD` form.
    #[error("Invalid date format: '{value}'. Use YYYY-MM-DD.")]
    InvalidDate {
        /// The rejected input
        value: String,
    },

    /// Range whose start lies after its end.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        /// Range start as given
        start: String,
        /// Range end as given
        end: String,
    },

    /// Required text field was blank.
    #[error("{field} cannot be empty")]
    EmptyField {
        /// Name of the offending field
        field: &'static str,
    },
}

impl Error {
    /// Classifies the error for callers that only need the family.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MenuItemNotFound { .. }
            | Self::OrderNotFound { .. }
            | Self::OrderItemNotFound { .. }
            | Self::CashierNotFound { .. }
            | Self::SupervisorNotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateMenuItem { .. }
            | Self::AlreadyPaid { .. }
            | Self::NotCanceled { .. } => ErrorKind::Conflict,
            Self::InvalidAmount { .. }
            | Self::InvalidQuantity { .. }
            | Self::InvalidDate { .. }
            | Self::InvalidDateRange { .. }
            | Self::EmptyField { .. } => ErrorKind::Validation,
            Self::Database(_) | Self::Io(_) | Self::Export(_) | Self::Config { .. } => {
                ErrorKind::Internal
            }
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

/// Rejects negative and non-finite money values.
pub(crate) fn ensure_amount(field: &'static str, amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { field, amount });
    }
    Ok(amount)
}

/// Rejects zero and negative quantities.
pub(crate) const fn ensure_quantity(quantity: i32) -> Result<i32> {
    if quantity < 1 {
        return Err(Error::InvalidQuantity { quantity });
    }
    Ok(quantity)
}

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn ensure_not_blank(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyField { field });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::OrderNotFound { id: 1 }.kind(), ErrorKind::NotFound);
        assert_eq!(Error::AlreadyPaid { order_id: 1 }.kind(), ErrorKind::Conflict);
        assert_eq!(
            Error::InvalidDate {
                value: "x".to_string()
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::Config {
                message: "x".to_string()
            }
            .kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_ensure_amount() {
        assert!(ensure_amount("discount", 0.0).is_ok());
        assert!(ensure_amount("discount", 3.5).is_ok());
        assert!(matches!(
            ensure_amount("discount", -1.0),
            Err(Error::InvalidAmount {
                field: "discount",
                ..
            })
        ));
        assert!(ensure_amount("paid", f64::NAN).is_err());
        assert!(ensure_amount("paid", f64::INFINITY).is_err());
    }

    #[test]
    fn test_ensure_quantity_and_blank() {
        assert!(ensure_quantity(1).is_ok());
        assert!(matches!(
            ensure_quantity(0),
            Err(Error::InvalidQuantity { quantity: 0 })
        ));
        assert_eq!(ensure_not_blank("name", "  Beer ").ok(), Some("Beer".to_string()));
        assert!(matches!(
            ensure_not_blank("name", "   "),
            Err(Error::EmptyField { field: "name" })
        ));
    }
}
