use std::{fmt, path::PathBuf};

use thiserror::Error;

use crate::{date_codec::DateRepresentation, domain::entities::validation_result::Status};

/// The receipt payload was not valid base64.
#[derive(Debug, Error)]
#[error("receipt data is not valid base64: {0}")]
pub struct InputError(#[from] pub base64::DecodeError);

#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Not a well-formed PKCS#7 signed-data structure, or not exactly one
    /// signer.
    #[error("malformed signed-data envelope: {0}")]
    Malformed(String),
    #[error("envelope signature does not verify: {0}")]
    SignatureInvalid(String),
}

/// Classification of a failed certificate path validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainFailure {
    Expired,
    NotYetValid,
    UntrustedRoot,
    MalformedChain,
}

impl fmt::Display for ChainFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChainFailure::Expired => "expired",
            ChainFailure::NotYetValid => "not yet valid",
            ChainFailure::UntrustedRoot => "untrusted root",
            ChainFailure::MalformedChain => "malformed chain",
        })
    }
}

#[derive(Debug, Error)]
pub enum TrustError {
    #[error("signer certificate does not chain to the trust anchor ({reason}): {detail}")]
    ChainInvalid { reason: ChainFailure, detail: String },
}

impl TrustError {
    pub fn reason(&self) -> ChainFailure {
        match self {
            TrustError::ChainInvalid { reason, .. } => *reason,
        }
    }
}

#[derive(Debug, Error)]
pub enum AttributeError {
    #[error("malformed receipt attribute: {0}")]
    Malformed(String),
    #[error("invalid receipt timestamp: {0}")]
    BadTimestamp(String),
}

#[derive(Debug, Error)]
#[error("{value:?} is not a valid {representation} date")]
pub struct DateFormatError {
    pub representation: DateRepresentation,
    pub value: String,
}

/// Failures while provisioning the trust anchor.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no trust anchor is configured")]
    NoTrustAnchor,
    #[error("environment variable {0} is not set")]
    MissingEnv(String),
    #[error("failed to read certificate file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("trust anchor is not a valid certificate: {0}")]
    Certificate(String),
}

#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
    #[error(transparent)]
    Trust(#[from] TrustError),
    #[error(transparent)]
    Attribute(#[from] AttributeError),
    #[error(transparent)]
    DateFormat(#[from] DateFormatError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("validation request could not be read: {0}")]
    Request(#[from] serde_json::Error),
}

impl ReceiptError {
    /// Vendor status code reported for this failure.
    pub fn status(&self) -> Status {
        match self {
            ReceiptError::Input(_)
            | ReceiptError::Envelope(EnvelopeError::Malformed(_))
            | ReceiptError::Attribute(_)
            | ReceiptError::DateFormat(_) => Status::MalformedReceipt,
            ReceiptError::Envelope(EnvelopeError::SignatureInvalid(_))
            | ReceiptError::Trust(_) => Status::NotAuthenticated,
            ReceiptError::Config(_) => Status::InternalError,
            ReceiptError::Request(_) => Status::BadRequest,
        }
    }

    /// Only a missing trust anchor is worth retrying; everything else is a
    /// property of the receipt itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReceiptError::Config(_))
    }

    pub(crate) fn class(&self) -> &'static str {
        match self {
            ReceiptError::Input(_) => "input",
            ReceiptError::Envelope(EnvelopeError::Malformed(_)) => "envelope_malformed",
            ReceiptError::Envelope(EnvelopeError::SignatureInvalid(_)) => "signature_invalid",
            ReceiptError::Trust(_) => "trust",
            ReceiptError::Attribute(AttributeError::Malformed(_)) => "attribute_malformed",
            ReceiptError::Attribute(AttributeError::BadTimestamp(_)) => "bad_timestamp",
            ReceiptError::DateFormat(_) => "date_format",
            ReceiptError::Config(_) => "config",
            ReceiptError::Request(_) => "request",
        }
    }
}
