use der::{asn1::OctetStringRef, Sequence};

/// One `(type, version, value)` triple of the receipt payload.
///
/// ```text
/// ReceiptAttribute ::= SEQUENCE {
///     type    INTEGER,
///     version INTEGER,
///     value   OCTET STRING
/// }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct ReceiptAttributeModel<'a> {
    pub(crate) attribute_type: i64,
    pub(crate) version: i64,
    pub(crate) value: OctetStringRef<'a>,
}

/// Receipt-level attribute types. Anything else is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReceiptFieldType {
    ReceiptType,
    BundleId,
    ApplicationVersion,
    OpaqueValue,
    Sha1Hash,
    CreationDate,
    InApp,
    OriginalPurchaseDate,
    OriginalApplicationVersion,
    ExpirationDate,
}

impl ReceiptFieldType {
    pub(crate) fn from_tag(tag: i64) -> Option<Self> {
        Some(match tag {
            0 => Self::ReceiptType,
            2 => Self::BundleId,
            3 => Self::ApplicationVersion,
            4 => Self::OpaqueValue,
            5 => Self::Sha1Hash,
            12 => Self::CreationDate,
            17 => Self::InApp,
            18 => Self::OriginalPurchaseDate,
            19 => Self::OriginalApplicationVersion,
            21 => Self::ExpirationDate,
            _ => return None,
        })
    }
}

/// In-app purchase attribute types, a namespace disjoint from
/// [`ReceiptFieldType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InAppFieldType {
    Quantity,
    ProductId,
    TransactionId,
    PurchaseDate,
    OriginalTransactionId,
    OriginalPurchaseDate,
    ExpiresDate,
    WebOrderLineItemId,
    CancellationDate,
    IsInIntroPrice,
}

impl InAppFieldType {
    pub(crate) fn from_tag(tag: i64) -> Option<Self> {
        Some(match tag {
            1701 => Self::Quantity,
            1702 => Self::ProductId,
            1703 => Self::TransactionId,
            1704 => Self::PurchaseDate,
            1705 => Self::OriginalTransactionId,
            1706 => Self::OriginalPurchaseDate,
            1708 => Self::ExpiresDate,
            1711 => Self::WebOrderLineItemId,
            1712 => Self::CancellationDate,
            1719 => Self::IsInIntroPrice,
            _ => return None,
        })
    }
}
