use chrono::{DateTime, Utc};

use crate::{
    domain::entities::{receipt::VerifiedReceipt, trust_anchor::TrustAnchor},
    errors::ReceiptError,
};

pub trait ReceiptRepository {
    /// Decodes a base64 receipt and verifies it against `anchor`.
    ///
    /// `now` is both the instant certificate validity is checked at and the
    /// value stamped into the receipt's request date.
    fn decode(
        &self,
        anchor: &TrustAnchor,
        receipt_data: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedReceipt, ReceiptError>;
}
