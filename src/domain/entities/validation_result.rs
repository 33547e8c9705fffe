use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use super::{in_app::InApp, receipt::Receipt, receipt::VerifiedReceipt};
use crate::errors::ReceiptError;

/// Vendor status codes reported in [`ValidationResult::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum Status {
    /// The receipt is authentic and was decoded.
    Valid = 0,
    /// The request body could not be read.
    BadRequest = 21000,
    /// The receipt data is malformed.
    MalformedReceipt = 21002,
    /// The receipt could not be authenticated.
    NotAuthenticated = 21003,
    /// Internal error, e.g. no trust anchor available. Retryable.
    InternalError = 21100,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    /// Indicates that the receipt applies to testing in the sandbox
    /// environment.
    #[default]
    Sandbox,
    /// Indicates that the receipt applies to the production environment.
    Production,
}

/// Response body of a receipt verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Receipt>,
    /// Reserved for auto-renewable subscription flows; never populated by the
    /// offline decoder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_receipt_info: Option<Vec<InApp>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_receipt: Option<String>,
    #[serde(
        rename = "is-retryable",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_retryable: bool,
}

impl ValidationResult {
    /// Success result. The environment is the one the caller attached to the
    /// trust anchor the signer chained to.
    pub fn from_verified(verified: VerifiedReceipt) -> Self {
        Self {
            status: Status::Valid,
            environment: Some(verified.anchor.environment),
            receipt: Some(verified.receipt),
            latest_receipt_info: None,
            latest_receipt: None,
            is_retryable: false,
        }
    }

    pub fn from_error(error: &ReceiptError) -> Self {
        Self {
            status: error.status(),
            environment: None,
            receipt: None,
            latest_receipt_info: None,
            latest_receipt: None,
            is_retryable: error.is_retryable(),
        }
    }
}

impl From<Result<VerifiedReceipt, ReceiptError>> for ValidationResult {
    fn from(outcome: Result<VerifiedReceipt, ReceiptError>) -> Self {
        match outcome {
            Ok(verified) => Self::from_verified(verified),
            Err(error) => Self::from_error(&error),
        }
    }
}
