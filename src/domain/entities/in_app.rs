use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use super::date_triad::{OriginalPurchaseDate, PurchaseDate};

/// One in-app purchase transaction recorded in a receipt.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InApp {
    /// The number of items purchased.
    #[serde_as(as = "DisplayFromStr")]
    pub quantity: i64,
    /// The product identifier of the item that was purchased.
    pub product_id: String,
    /// The transaction identifier of the item that was purchased.
    pub transaction_id: String,
    /// For a transaction that restores a previous transaction, the
    /// transaction identifier of the original transaction. Otherwise the
    /// same as `transaction_id`.
    pub original_transaction_id: String,
    /// Identifies subscription purchase events across devices, including
    /// renewals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_order_line_item_id: Option<i64>,
    /// `"true"` when the subscription period is a free trial.
    pub is_trial_period: String,
    #[serde(flatten)]
    pub purchase_date: PurchaseDate,
    #[serde(flatten)]
    pub original_purchase_date: OriginalPurchaseDate,
    /// Expiration of an auto-renewable subscription.
    #[serde(skip)]
    pub expires_date: Option<DateTime<Utc>>,
    /// When customer support cancelled the transaction.
    #[serde(skip)]
    pub cancellation_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    /// Whether the subscription is in an introductory price period.
    #[serde(skip)]
    pub is_in_intro_price: bool,
}
