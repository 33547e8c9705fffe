use std::{fmt, marker::PhantomData};

use chrono::{DateTime, Utc};
use serde::{
    de::{IgnoredAny, MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::date_codec::{self, DateRepresentation};

/// JSON key names under which a [`DateTriad`] is flattened into its parent.
pub trait TriadKeys {
    const GMT: &'static str;
    const MILLIS: &'static str;
    const PACIFIC: &'static str;
}

macro_rules! triad_keys {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl TriadKeys for $name {
            const GMT: &'static str = $prefix;
            const MILLIS: &'static str = concat!($prefix, "_ms");
            const PACIFIC: &'static str = concat!($prefix, "_pst");
        }
    };
}

pub mod keys {
    use super::TriadKeys;

    triad_keys!(
        /// When the app receipt was created.
        ReceiptCreation,
        "receipt_creation_date"
    );
    triad_keys!(
        /// When the verification request was processed.
        Request,
        "request_date"
    );
    triad_keys!(
        /// When the app, or the transaction being restored, was first
        /// purchased.
        OriginalPurchase,
        "original_purchase_date"
    );
    triad_keys!(
        /// When the item was charged.
        Purchase,
        "purchase_date"
    );
}

/// One optional instant exposed under three JSON keys: GMT text, millisecond
/// epoch and Pacific text.
///
/// Holding a single instant means the three views can never disagree, and an
/// absent date is `null` under all three keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTriad<K> {
    instant: Option<DateTime<Utc>>,
    keys: PhantomData<K>,
}

pub type CreationDate = DateTriad<keys::ReceiptCreation>;
pub type RequestDate = DateTriad<keys::Request>;
pub type OriginalPurchaseDate = DateTriad<keys::OriginalPurchase>;
pub type PurchaseDate = DateTriad<keys::Purchase>;

impl<K> DateTriad<K> {
    pub fn new(instant: Option<DateTime<Utc>>) -> Self {
        Self {
            instant,
            keys: PhantomData,
        }
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.instant
    }

    pub fn gmt(&self) -> Option<String> {
        date_codec::encode(self.instant, DateRepresentation::Gmt)
    }

    pub fn millis(&self) -> Option<String> {
        date_codec::encode(self.instant, DateRepresentation::Millis)
    }

    pub fn pacific(&self) -> Option<String> {
        date_codec::encode(self.instant, DateRepresentation::Pacific)
    }
}

impl<K> Default for DateTriad<K> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<K> From<Option<DateTime<Utc>>> for DateTriad<K> {
    fn from(instant: Option<DateTime<Utc>>) -> Self {
        Self::new(instant)
    }
}

impl<K: TriadKeys> Serialize for DateTriad<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(K::GMT, &self.gmt())?;
        map.serialize_entry(K::MILLIS, &self.millis())?;
        map.serialize_entry(K::PACIFIC, &self.pacific())?;
        map.end()
    }
}

impl<'de, K: TriadKeys> Deserialize<'de> for DateTriad<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TriadVisitor(PhantomData))
    }
}

struct TriadVisitor<K>(PhantomData<K>);

impl<'de, K: TriadKeys> Visitor<'de> for TriadVisitor<K> {
    type Value = DateTriad<K>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a map containing {}, {} or {}", K::GMT, K::MILLIS, K::PACIFIC)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut gmt = None;
        let mut millis = None;
        let mut pacific = None;
        while let Some(key) = map.next_key::<String>()? {
            let slot = if key == K::GMT {
                &mut gmt
            } else if key == K::MILLIS {
                &mut millis
            } else if key == K::PACIFIC {
                &mut pacific
            } else {
                map.next_value::<IgnoredAny>()?;
                continue;
            };
            *slot = map.next_value::<Option<String>>()?;
        }

        // The GMT view is authoritative; the others only fill in when it is
        // missing.
        let decoded = [
            (gmt, DateRepresentation::Gmt),
            (millis, DateRepresentation::Millis),
            (pacific, DateRepresentation::Pacific),
        ]
        .into_iter()
        .find_map(|(text, representation)| {
            text.map(|text| date_codec::decode(Some(&text), representation))
        })
        .transpose()
        .map_err(serde::de::Error::custom)?
        .flatten();
        Ok(DateTriad::new(decoded))
    }
}
