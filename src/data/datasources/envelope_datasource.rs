use chrono::{DateTime, Utc};
use openssl::{
    pkcs7::{Pkcs7, Pkcs7Flags},
    stack::Stack,
    x509::{store::X509StoreBuilder, X509},
};

use super::{trust_verifier::TrustVerifier, utils::same_certificate};
use crate::{
    domain::entities::trust_anchor::TrustAnchor,
    errors::{EnvelopeError, ReceiptError},
};

/// The verified parts of a PKCS#7 signed-data envelope.
#[derive(Debug)]
pub struct SignedEnvelope {
    /// The signed content: the DER receipt payload.
    pub(crate) content: Vec<u8>,
    pub(crate) signer: X509,
    /// Every embedded certificate except the signer.
    pub(crate) others: Vec<X509>,
}

pub trait EnvelopeDatasource {
    /// Parses a DER signed-data envelope, checks the signer chains to
    /// `anchor` at `now`, then checks the signature over the content.
    ///
    /// Both checks are mandatory; a trust failure is reported without
    /// attempting the signature check.
    fn open(
        &self,
        der: &[u8],
        anchor: &TrustAnchor,
        now: DateTime<Utc>,
    ) -> Result<SignedEnvelope, ReceiptError>;
}

pub struct EnvelopeDatasourceImpl<T: TrustVerifier> {
    trust_verifier: T,
}

impl<T: TrustVerifier> EnvelopeDatasource for EnvelopeDatasourceImpl<T> {
    fn open(
        &self,
        der: &[u8],
        anchor: &TrustAnchor,
        now: DateTime<Utc>,
    ) -> Result<SignedEnvelope, ReceiptError> {
        let pkcs7 = Pkcs7::from_der(der).map_err(|e| {
            EnvelopeError::Malformed(format!("not a PKCS#7 structure: {e}"))
        })?;
        let signed = pkcs7
            .signed()
            .ok_or_else(|| EnvelopeError::Malformed("content type is not signed-data".into()))?;
        let certificates: Vec<X509> = signed
            .certificates()
            .map(|stack| stack.iter().map(|cert| cert.to_owned()).collect())
            .unwrap_or_default();

        let no_extra_certs = Stack::<X509>::new().map_err(malformed)?;
        let signer = {
            let signers = pkcs7
                .signers(&no_extra_certs, Pkcs7Flags::empty())
                .map_err(|e| EnvelopeError::Malformed(format!("signer not found: {e}")))?;
            if signers.len() != 1 {
                return Err(EnvelopeError::Malformed(format!(
                    "expected exactly one signer, found {}",
                    signers.len()
                ))
                .into());
            }
            signers
                .get(0)
                .map(|cert| cert.to_owned())
                .ok_or_else(|| EnvelopeError::Malformed("signer not found".into()))?
        };
        let others: Vec<X509> = certificates
            .into_iter()
            .filter(|cert| !same_certificate(cert, &signer))
            .collect();
        tracing::debug!(
            certificates = others.len() + 1,
            "parsed signed-data envelope"
        );

        self.trust_verifier.verify(anchor, &signer, &others, now)?;

        // The chain was validated above; here only the signature and the
        // signed message digest are checked.
        let empty_store = X509StoreBuilder::new().map_err(malformed)?.build();
        let mut content = Vec::new();
        pkcs7
            .verify(
                &no_extra_certs,
                &empty_store,
                None,
                Some(&mut content),
                Pkcs7Flags::NOVERIFY | Pkcs7Flags::BINARY,
            )
            .map_err(|e| EnvelopeError::SignatureInvalid(e.to_string()))?;

        Ok(SignedEnvelope {
            content,
            signer,
            others,
        })
    }
}

impl<T: TrustVerifier> EnvelopeDatasourceImpl<T> {
    pub(crate) fn new(trust_verifier: T) -> Self {
        Self { trust_verifier }
    }
}

fn malformed(e: openssl::error::ErrorStack) -> EnvelopeError {
    EnvelopeError::Malformed(e.to_string())
}
