use base64::{prelude::BASE64_STANDARD, Engine as _};
use chrono::{DateTime, Utc};

use crate::{
    data::{
        datasources::{
            attribute_datasource::{AttributeDatasource, AttributeDatasourceImpl},
            envelope_datasource::{EnvelopeDatasource, EnvelopeDatasourceImpl},
            trust_verifier::X509TrustVerifier,
            utils::{decode_integer, decode_string, decode_timestamp},
        },
        models::receipt_attribute_model::{InAppFieldType, ReceiptFieldType},
    },
    domain::{
        entities::{
            date_triad::DateTriad,
            in_app::InApp,
            receipt::{Receipt, VerifiedReceipt},
            trust_anchor::{distinguished_name, TrustAnchor},
        },
        repositories::receipt_repository::ReceiptRepository,
    },
    errors::{AttributeError, InputError, ReceiptError},
};

pub struct ReceiptRepositoryImpl<E: EnvelopeDatasource, A: AttributeDatasource> {
    envelope_datasource: E,
    attribute_datasource: A,
}

impl<E: EnvelopeDatasource, A: AttributeDatasource> ReceiptRepository
    for ReceiptRepositoryImpl<E, A>
{
    fn decode(
        &self,
        anchor: &TrustAnchor,
        receipt_data: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedReceipt, ReceiptError> {
        // Line breaks are tolerated anywhere in the payload.
        let compact: String = receipt_data
            .trim()
            .chars()
            .filter(|c| !matches!(c, '\r' | '\n'))
            .collect();
        let der = BASE64_STANDARD.decode(compact).map_err(InputError)?;

        let envelope = self.envelope_datasource.open(&der, anchor, now)?;
        tracing::debug!(
            signer = %distinguished_name(envelope.signer.subject_name()),
            intermediates = envelope.others.len(),
            anchor = %anchor.identity().fingerprint_sha256,
            "receipt envelope verified"
        );

        let receipt = self.build_receipt(&envelope.content, now)?;
        Ok(VerifiedReceipt {
            receipt,
            anchor: anchor.identity().clone(),
        })
    }
}

impl<E: EnvelopeDatasource, A: AttributeDatasource> ReceiptRepositoryImpl<E, A> {
    fn build_receipt(&self, content: &[u8], now: DateTime<Utc>) -> Result<Receipt, AttributeError> {
        let mut receipt = Receipt::default();
        for attribute in self.attribute_datasource.walk(content)? {
            let Some(field) = ReceiptFieldType::from_tag(attribute.attribute_type) else {
                tracing::trace!(tag = attribute.attribute_type, "skipping receipt attribute");
                continue;
            };
            let value = attribute.value.as_bytes();
            match field {
                ReceiptFieldType::ReceiptType => receipt.receipt_type = decode_string(value)?,
                ReceiptFieldType::BundleId => {
                    receipt.bundle_id = decode_string(value)?;
                    receipt.bundle_id_raw = value.to_vec();
                }
                ReceiptFieldType::ApplicationVersion => {
                    receipt.application_version = decode_string(value)?
                }
                ReceiptFieldType::OpaqueValue => receipt.opaque_value = value.to_vec(),
                ReceiptFieldType::Sha1Hash => receipt.sha1_hash = value.to_vec(),
                ReceiptFieldType::CreationDate => {
                    receipt.creation_date = DateTriad::new(decode_timestamp(value)?)
                }
                ReceiptFieldType::InApp => receipt.in_app.push(self.build_in_app(value)?),
                ReceiptFieldType::OriginalPurchaseDate => {
                    receipt.original_purchase_date = DateTriad::new(decode_timestamp(value)?)
                }
                ReceiptFieldType::OriginalApplicationVersion => {
                    receipt.original_application_version = decode_string(value)?
                }
                ReceiptFieldType::ExpirationDate => {
                    receipt.expiration_date = decode_timestamp(value)?
                }
            }
        }
        receipt.request_date = DateTriad::new(Some(now));
        Ok(receipt)
    }

    fn build_in_app(&self, content: &[u8]) -> Result<InApp, AttributeError> {
        let mut in_app = InApp::default();
        for attribute in self.attribute_datasource.walk(content)? {
            let Some(field) = InAppFieldType::from_tag(attribute.attribute_type) else {
                tracing::trace!(tag = attribute.attribute_type, "skipping in-app attribute");
                continue;
            };
            let value = attribute.value.as_bytes();
            match field {
                InAppFieldType::Quantity => in_app.quantity = decode_integer(value)?,
                InAppFieldType::ProductId => in_app.product_id = decode_string(value)?,
                InAppFieldType::TransactionId => in_app.transaction_id = decode_string(value)?,
                InAppFieldType::PurchaseDate => {
                    in_app.purchase_date = DateTriad::new(decode_timestamp(value)?)
                }
                InAppFieldType::OriginalTransactionId => {
                    in_app.original_transaction_id = decode_string(value)?
                }
                InAppFieldType::OriginalPurchaseDate => {
                    in_app.original_purchase_date = DateTriad::new(decode_timestamp(value)?)
                }
                InAppFieldType::ExpiresDate => in_app.expires_date = decode_timestamp(value)?,
                InAppFieldType::WebOrderLineItemId => {
                    in_app.web_order_line_item_id = Some(decode_integer(value)?)
                }
                InAppFieldType::CancellationDate => {
                    in_app.cancellation_date = decode_timestamp(value)?
                }
                InAppFieldType::IsInIntroPrice => {
                    in_app.is_in_intro_price = decode_integer(value)? != 0
                }
            }
        }
        if in_app.is_trial_period.is_empty() {
            in_app.is_trial_period = "false".to_owned();
        }
        Ok(in_app)
    }
}

impl ReceiptRepositoryImpl<EnvelopeDatasourceImpl<X509TrustVerifier>, AttributeDatasourceImpl> {
    pub(crate) fn new() -> Self {
        Self {
            envelope_datasource: EnvelopeDatasourceImpl::new(X509TrustVerifier::new()),
            attribute_datasource: AttributeDatasourceImpl::new(),
        }
    }
}
