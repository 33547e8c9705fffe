#![allow(dead_code)]

use base64::{prelude::BASE64_STANDARD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use der::{
    asn1::{AnyRef, OctetStringRef, Utf8StringRef},
    Encode, Sequence, Tag,
};
use openssl::{
    asn1::Asn1Time,
    bn::BigNum,
    hash::MessageDigest,
    pkcs7::{Pkcs7, Pkcs7Flags},
    pkey::{PKey, Private},
    rsa::Rsa,
    stack::Stack,
    x509::{
        extension::{BasicConstraints, KeyUsage},
        X509Builder, X509NameBuilder, X509,
    },
};
use receipt_verify::domain::entities::trust_anchor::TrustAnchor;

pub const FIXTURE_RECEIPT: &str = include_str!("../fixtures/sandbox_receipt.b64");
pub const FIXTURE_ISSUER_PEM: &[u8] = include_bytes!("../fixtures/test_issuer.pem");

pub fn fixture_anchor() -> TrustAnchor {
    TrustAnchor::from_pem(FIXTURE_ISSUER_PEM).unwrap()
}

/// A moment at which the fixture issuer certificate is valid.
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2018, 4, 3, 0, 0, 0).unwrap()
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// A key pair together with the certificate issued for it.
pub struct Identity {
    pub key: PKey<Private>,
    pub cert: X509,
}

impl Identity {
    pub fn anchor(&self) -> TrustAnchor {
        TrustAnchor::new(self.cert.clone()).unwrap()
    }
}

fn name(common_name: &str) -> openssl::x509::X509Name {
    let mut builder = X509NameBuilder::new().unwrap();
    builder.append_entry_by_text("O", "Receipt Tests").unwrap();
    builder.append_entry_by_text("CN", common_name).unwrap();
    builder.build()
}

fn issue(
    common_name: &str,
    issuer: Option<&Identity>,
    ca: bool,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
) -> Identity {
    let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
    let subject = name(common_name);

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(serial_for(common_name)).unwrap();
    builder
        .set_serial_number(&serial.to_asn1_integer().unwrap())
        .unwrap();
    builder.set_subject_name(&subject).unwrap();
    match issuer {
        Some(issuer) => builder.set_issuer_name(issuer.cert.subject_name()).unwrap(),
        None => builder.set_issuer_name(&subject).unwrap(),
    }
    builder.set_pubkey(&key).unwrap();
    builder
        .set_not_before(&Asn1Time::from_unix(not_before.timestamp() as _).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::from_unix(not_after.timestamp() as _).unwrap())
        .unwrap();
    if ca {
        builder
            .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
            .unwrap();
        builder
            .append_extension(KeyUsage::new().critical().key_cert_sign().crl_sign().build().unwrap())
            .unwrap();
    } else {
        builder
            .append_extension(BasicConstraints::new().critical().build().unwrap())
            .unwrap();
        builder
            .append_extension(KeyUsage::new().critical().digital_signature().build().unwrap())
            .unwrap();
    }
    let signing_key = issuer.map(|issuer| &issuer.key).unwrap_or(&key);
    builder.sign(signing_key, MessageDigest::sha256()).unwrap();

    Identity {
        key,
        cert: builder.build(),
    }
}

fn serial_for(seed: &str) -> u32 {
    seed.bytes()
        .fold(17u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32))
        | 1
}

/// A self-signed CA valid from 2020 to 2040.
pub fn root(common_name: &str) -> Identity {
    issue(common_name, None, true, at(2020, 1, 1), at(2040, 1, 1))
}

pub fn intermediate(common_name: &str, issuer: &Identity) -> Identity {
    issue(common_name, Some(issuer), true, at(2020, 1, 1), at(2040, 1, 1))
}

pub fn leaf(
    common_name: &str,
    issuer: &Identity,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
) -> Identity {
    issue(common_name, Some(issuer), false, not_before, not_after)
}

/// Signs `content` into a base64 PKCS#7 signed-data envelope, embedding the
/// signer certificate and `extra` certificates.
pub fn envelope(signer: &Identity, extra: &[&Identity], content: &[u8]) -> String {
    let mut certs = Stack::new().unwrap();
    for identity in extra {
        certs.push(identity.cert.clone()).unwrap();
    }
    let pkcs7 = Pkcs7::sign(&signer.cert, &signer.key, &certs, content, Pkcs7Flags::BINARY).unwrap();
    BASE64_STANDARD.encode(pkcs7.to_der().unwrap())
}

#[derive(Sequence)]
struct Attribute<'a> {
    attribute_type: i64,
    version: i64,
    value: OctetStringRef<'a>,
}

/// Builder for receipt payloads: a SET of attribute sequences, in the order
/// they were added.
#[derive(Default, Clone)]
pub struct Payload {
    attributes: Vec<Vec<u8>>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(mut self, attribute_type: i64, value: &[u8]) -> Self {
        let attribute = Attribute {
            attribute_type,
            version: 1,
            value: OctetStringRef::new(value).unwrap(),
        };
        self.attributes.push(attribute.to_der().unwrap());
        self
    }

    pub fn string(self, attribute_type: i64, text: &str) -> Self {
        let value = Utf8StringRef::new(text).unwrap().to_der().unwrap();
        self.raw(attribute_type, &value)
    }

    pub fn integer(self, attribute_type: i64, value: i64) -> Self {
        self.raw(attribute_type, &value.to_der().unwrap())
    }

    pub fn nested(self, attribute_type: i64, payload: &Payload) -> Self {
        self.raw(attribute_type, &payload.build())
    }

    pub fn build(&self) -> Vec<u8> {
        let body = self.attributes.concat();
        AnyRef::new(Tag::Set, &body).unwrap().to_der().unwrap()
    }
}

/// A minimal receipt with one in-app purchase.
pub fn sample_payload() -> Payload {
    let in_app = Payload::new()
        .integer(1701, 1)
        .string(1702, "com.example.coins")
        .string(1703, "1000000001")
        .string(1704, "2024-03-01T10:00:00Z")
        .string(1705, "1000000001")
        .string(1706, "2024-03-01T10:00:00Z");
    Payload::new()
        .string(0, "ProductionSandbox")
        .string(2, "com.example.app")
        .string(3, "7")
        .string(12, "2024-03-01T10:00:05Z")
        .nested(17, &in_app)
        .string(18, "2023-12-24T08:00:00Z")
        .string(19, "1.0")
}
