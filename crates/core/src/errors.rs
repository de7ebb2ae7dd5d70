use thiserror::Error;

use crate::domain::product::ProductId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("product `{id}` was not found")]
    NotFound { id: ProductId },
    #[error("invalid product input: {0}")]
    InvalidInput(String),
    #[error("product `{id}` is out of stock")]
    OutOfStock { id: ProductId },
}

impl InventoryError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn class(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::OutOfStock { .. } => "out_of_stock",
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not read product seed `{path}`: {source}")]
    Read { path: std::path::PathBuf, source: std::io::Error },
    #[error("could not parse product seed `{path}`: {source}")]
    Parse { path: std::path::PathBuf, source: serde_json::Error },
    #[error("product seed rejected: {0}")]
    Invalid(#[from] InventoryError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error("operation was cancelled before it was applied")]
    Cancelled,
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl StoreError {
    pub fn class(&self) -> &'static str {
        match self {
            Self::Inventory(error) => error.class(),
            Self::Cancelled => "cancelled",
            Self::Source(_) => "catalog_load",
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String },
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("conflict: {message}")]
    Conflict { message: String },
    #[error("unavailable: {message}")]
    Unavailable { message: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "Some product details are invalid. Check the form and try again."
            }
            Self::NotFound { .. } => "That product is no longer in the catalog.",
            Self::Conflict { .. } => "Sorry, that treat is sold out.",
            Self::Unavailable { .. } => {
                "The catalog is temporarily unavailable. Please retry shortly."
            }
        }
    }
}

impl From<&StoreError> for InterfaceError {
    fn from(value: &StoreError) -> Self {
        let message = value.to_string();
        match value {
            StoreError::Inventory(InventoryError::InvalidInput(_)) => Self::BadRequest { message },
            StoreError::Inventory(InventoryError::NotFound { .. }) => Self::NotFound { message },
            StoreError::Inventory(InventoryError::OutOfStock { .. }) => Self::Conflict { message },
            StoreError::Cancelled | StoreError::Source(_) => Self::Unavailable { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::product::ProductId;
    use crate::errors::{InterfaceError, InventoryError, StoreError};

    #[test]
    fn out_of_stock_maps_to_conflict_with_sold_out_message() {
        let interface = InterfaceError::from(&StoreError::from(InventoryError::OutOfStock {
            id: ProductId::from("3"),
        }));

        assert!(matches!(
            interface,
            InterfaceError::Conflict { ref message } if message.contains("`3`")
        ));
        assert_eq!(interface.user_message(), "Sorry, that treat is sold out.");
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let error = StoreError::from(InventoryError::invalid("price must be positive"));
        let interface = InterfaceError::from(&error);

        assert!(matches!(interface, InterfaceError::BadRequest { .. }));
        assert_eq!(
            interface.user_message(),
            "Some product details are invalid. Check the form and try again."
        );
    }

    #[test]
    fn cancellation_maps_to_unavailable() {
        let interface = InterfaceError::from(&StoreError::Cancelled);

        assert!(matches!(interface, InterfaceError::Unavailable { .. }));
    }

    #[test]
    fn error_classes_are_stable_snake_case() {
        assert_eq!(InventoryError::NotFound { id: ProductId::from("x") }.class(), "not_found");
        assert_eq!(StoreError::Cancelled.class(), "cancelled");
        assert_eq!(StoreError::from(InventoryError::invalid("bad")).class(), "invalid_input");
    }
}
