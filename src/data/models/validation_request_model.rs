use serde::Deserialize;

/// Body of a receipt validation request, in the vendor's `verifyReceipt`
/// format.
#[derive(Debug, Deserialize)]
pub(crate) struct ValidationRequestModel {
    /// The base64 encoded receipt data.
    #[serde(rename = "receipt-data")]
    pub(crate) receipt_data: String,
    /// The app's shared secret. Accepted for compatibility, not checked.
    #[serde(default)]
    #[allow(dead_code)]
    pub(crate) password: Option<String>,
}
