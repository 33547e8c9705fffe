use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    date_triad::{CreationDate, OriginalPurchaseDate, RequestDate},
    in_app::InApp,
    trust_anchor::AnchorIdentity,
};

/// Decoded contents of an app receipt.
///
/// Only ever produced after the enclosing envelope passed both the trust
/// chain and signature checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Receipt {
    pub receipt_type: String,
    pub adam_id: i64,
    pub app_item_id: i64,
    /// The app's bundle identifier.
    pub bundle_id: String,
    /// The DER bytes the bundle identifier was decoded from, as needed to
    /// recompute the receipt hash.
    #[serde(skip)]
    pub bundle_id_raw: Vec<u8>,
    /// The app's version number (`CFBundleVersion`).
    pub application_version: String,
    pub download_id: i64,
    pub version_external_identifier: i64,
    /// The version of the app that was originally purchased.
    pub original_application_version: String,
    /// In-app purchase receipts, in envelope order.
    pub in_app: Vec<InApp>,
    /// When the receipt expires, for volume purchase program receipts.
    #[serde(skip)]
    pub expiration_date: Option<DateTime<Utc>>,
    /// Opaque value used together with the bundle identifier and device
    /// identifier to compute the receipt hash.
    #[serde(skip)]
    pub opaque_value: Vec<u8>,
    /// SHA-1 hash of the device identifier, opaque value and bundle
    /// identifier.
    #[serde(skip)]
    pub sha1_hash: Vec<u8>,
    #[serde(flatten)]
    pub creation_date: CreationDate,
    #[serde(flatten)]
    pub request_date: RequestDate,
    #[serde(flatten)]
    pub original_purchase_date: OriginalPurchaseDate,
}

/// A receipt together with the identity of the trust anchor its signer
/// chained to.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedReceipt {
    pub receipt: Receipt,
    pub anchor: AnchorIdentity,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn internal_fields_stay_out_of_json() {
        let expiration = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let receipt = Receipt {
            bundle_id: "com.example.app".into(),
            bundle_id_raw: vec![0x0c, 0x01, 0x61],
            expiration_date: Some(expiration),
            in_app: vec![InApp {
                product_id: "com.example.coins".into(),
                is_in_intro_price: true,
                expires_date: Some(expiration),
                ..InApp::default()
            }],
            ..Receipt::default()
        };

        let value = serde_json::to_value(&receipt).unwrap();
        assert_eq!(value["bundle_id"], "com.example.app");
        for key in ["expiration_date", "bundle_id_raw", "opaque_value", "sha1_hash"] {
            assert!(value.get(key).is_none(), "{key} was serialized");
        }
        let in_app = &value["in_app"][0];
        assert_eq!(in_app["product_id"], "com.example.coins");
        for key in ["is_in_intro_price", "expires_date", "cancellation_date"] {
            assert!(in_app.get(key).is_none(), "{key} was serialized");
        }

        let back: Receipt = serde_json::from_value(value).unwrap();
        assert_eq!(back.expiration_date, None);
        assert!(!back.in_app[0].is_in_intro_price);
        assert_eq!(back.bundle_id, receipt.bundle_id);
    }
}
