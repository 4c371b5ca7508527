//! Error handling for the Agri Assistant client core
//!
//! Every failure the UI can act on maps to a stable error code so views can
//! branch on it without parsing messages.

use serde::Serialize;
use thiserror::Error;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    // NPK questionnaire
    #[error("Please select a crop")]
    CropNotSelected,

    #[error("Unknown crop: {0}")]
    UnknownCrop(String),

    // Product ingestion
    #[error("Invalid product: {message}")]
    InvalidProduct { field: String, message: String },

    // Checkout preparation
    #[error("Please login to checkout")]
    LoginRequired,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("{message}")]
    InvalidDeliveryDetails { field: String, message: String },

    #[error("Payment method not available: {0}")]
    PaymentMethodUnavailable(String),

    // Infrastructure
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),
}

/// Error payload handed to the UI layer
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ClientError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::CropNotSelected => "CROP_NOT_SELECTED",
            ClientError::UnknownCrop(_) => "UNKNOWN_CROP",
            ClientError::InvalidProduct { .. } => "INVALID_PRODUCT",
            ClientError::LoginRequired => "LOGIN_REQUIRED",
            ClientError::EmptyCart => "EMPTY_CART",
            ClientError::InvalidDeliveryDetails { .. } => "INVALID_DELIVERY_DETAILS",
            ClientError::PaymentMethodUnavailable(_) => "PAYMENT_METHOD_UNAVAILABLE",
            ClientError::Storage(_) => "STORAGE_ERROR",
            ClientError::Serialization(_) => "SERIALIZATION_ERROR",
            ClientError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    pub fn detail(&self) -> ErrorDetail {
        let field = match self {
            ClientError::InvalidProduct { field, .. }
            | ClientError::InvalidDeliveryDetails { field, .. } => Some(field.clone()),
            _ => None,
        };

        ErrorDetail {
            code: self.code().to_string(),
            message: self.to_string(),
            field,
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
