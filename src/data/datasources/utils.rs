use chrono::{DateTime, Utc};
use der::{asn1::AnyRef, Decode, Tag, Tagged};
use openssl::x509::X509Ref;

use crate::errors::AttributeError;

/// Timestamp value the vendor writes for "no date".
const ZERO_TIMESTAMP: &str = "0001-01-01T00:00:00Z";

/// Decodes an attribute value holding a UTF8String, PrintableString or
/// IA5String.
pub(crate) fn decode_string(value: &[u8]) -> Result<String, AttributeError> {
    let any = AnyRef::from_der(value)
        .map_err(|e| AttributeError::Malformed(format!("expected a string value: {e}")))?;
    match any.tag() {
        Tag::Utf8String | Tag::PrintableString | Tag::Ia5String => {
            std::str::from_utf8(any.value())
                .map(str::to_owned)
                .map_err(|e| AttributeError::Malformed(format!("string is not UTF-8: {e}")))
        }
        tag => Err(AttributeError::Malformed(format!(
            "expected a string value, found {tag}"
        ))),
    }
}

pub(crate) fn decode_integer(value: &[u8]) -> Result<i64, AttributeError> {
    i64::from_der(value)
        .map_err(|e| AttributeError::Malformed(format!("expected an integer value: {e}")))
}

/// Decodes an embedded RFC 3339 timestamp. Empty strings and the zero
/// timestamp mean "absent".
pub(crate) fn decode_timestamp(value: &[u8]) -> Result<Option<DateTime<Utc>>, AttributeError> {
    let text = decode_string(value)?;
    if text.is_empty() || text == ZERO_TIMESTAMP {
        return Ok(None);
    }
    let instant = DateTime::parse_from_rfc3339(&text)
        .map_err(|e| AttributeError::BadTimestamp(format!("{text:?}: {e}")))?
        .with_timezone(&Utc);
    // Same zero instant written with a different offset or precision.
    if is_zero_instant(&instant) {
        return Ok(None);
    }
    Ok(Some(instant))
}

fn is_zero_instant(instant: &DateTime<Utc>) -> bool {
    instant.timestamp() == ZERO_INSTANT_SECONDS
}

/// `0001-01-01T00:00:00Z` as seconds from the Unix epoch.
const ZERO_INSTANT_SECONDS: i64 = -62_135_596_800;

/// Compares certificates by their DER encoding.
pub(crate) fn same_certificate(a: &X509Ref, b: &X509Ref) -> bool {
    matches!((a.to_der(), b.to_der()), (Ok(a), Ok(b)) if a == b)
}
