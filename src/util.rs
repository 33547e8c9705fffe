use chrono::{DateTime, Utc};

use crate::{
    data::{
        datasources::{
            attribute_datasource::AttributeDatasourceImpl,
            envelope_datasource::EnvelopeDatasourceImpl, trust_verifier::X509TrustVerifier,
        },
        models::validation_request_model::ValidationRequestModel,
        repositories::receipt_repository_impl::ReceiptRepositoryImpl,
    },
    domain::{
        entities::{
            receipt::VerifiedReceipt, trust_anchor::TrustAnchor,
            validation_result::ValidationResult,
        },
        repositories::receipt_repository::ReceiptRepository,
    },
    errors::{ConfigError, ReceiptError},
};

pub struct ReceiptUtil<R: ReceiptRepository> {
    receipt_repository: R,
}

impl<R: ReceiptRepository> ReceiptUtil<R> {
    pub fn with_repository(receipt_repository: R) -> Self {
        Self { receipt_repository }
    }

    /// Authenticates and decodes a base64 receipt.
    ///
    /// anchor:
    ///   The certificate the receipt signer must chain to.
    ///
    /// receipt_data:
    ///   Standard base64 of the DER signed-data envelope. Line breaks are
    ///   ignored.
    ///
    /// now:
    ///   Verification time for certificate validity. Also becomes the
    ///   receipt's request date.
    pub fn decode(
        &self,
        anchor: &TrustAnchor,
        receipt_data: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedReceipt, ReceiptError> {
        self.receipt_repository
            .decode(anchor, receipt_data, now)
            .inspect(|verified| {
                tracing::debug!(
                    bundle_id = %verified.receipt.bundle_id,
                    in_app = verified.receipt.in_app.len(),
                    "receipt decoded"
                )
            })
            .inspect_err(log_rejection)
    }

    /// Like [`Self::decode`], but always produces a result. Failures become
    /// status codes. A missing anchor is reported as retryable.
    pub fn validate(
        &self,
        anchor: Option<&TrustAnchor>,
        receipt_data: &str,
        now: DateTime<Utc>,
    ) -> ValidationResult {
        let Some(anchor) = anchor else {
            let error = ReceiptError::from(ConfigError::NoTrustAnchor);
            log_rejection(&error);
            return ValidationResult::from_error(&error);
        };
        self.decode(anchor, receipt_data, now).into()
    }

    /// Handles a JSON validation request body
    /// (`{"receipt-data": "...", "password": "..."}`). Bodies that cannot be
    /// read yield status 21000.
    pub fn handle_request(
        &self,
        anchor: Option<&TrustAnchor>,
        body: &str,
        now: DateTime<Utc>,
    ) -> ValidationResult {
        match serde_json::from_str::<ValidationRequestModel>(body) {
            Ok(request) => self.validate(anchor, &request.receipt_data, now),
            Err(e) => {
                let error = ReceiptError::from(e);
                log_rejection(&error);
                ValidationResult::from_error(&error)
            }
        }
    }
}

fn log_rejection(error: &ReceiptError) {
    tracing::warn!(class = error.class(), status = ?error.status(), "receipt rejected: {error}");
}

impl ReceiptUtil<ReceiptRepositoryImpl<EnvelopeDatasourceImpl<X509TrustVerifier>, AttributeDatasourceImpl>> {
    pub fn new() -> Self {
        Self {
            receipt_repository: ReceiptRepositoryImpl::new(),
        }
    }
}

impl Default
    for ReceiptUtil<ReceiptRepositoryImpl<EnvelopeDatasourceImpl<X509TrustVerifier>, AttributeDatasourceImpl>>
{
    fn default() -> Self {
        Self::new()
    }
}
