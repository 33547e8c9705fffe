use openssl::{
    hash::MessageDigest,
    x509::{X509NameRef, X509Ref, X509},
};

use super::validation_result::Environment;
use crate::errors::ConfigError;

/// A certificate treated as axiomatically trusted. Signer certificates must
/// chain to it.
#[derive(Clone)]
pub struct TrustAnchor {
    certificate: X509,
    identity: AnchorIdentity,
}

/// Who a receipt's signer chained to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorIdentity {
    /// Subject distinguished name, e.g. `O=Acme Co, CN=Test Issuer`.
    pub subject: String,
    /// Lowercase hex SHA-256 of the anchor's DER encoding.
    pub fingerprint_sha256: String,
    /// The environment the caller associates with this anchor.
    pub environment: Environment,
}

impl TrustAnchor {
    /// Wraps a parsed certificate. The anchor is labelled
    /// [`Environment::Sandbox`] until told otherwise.
    pub fn new(certificate: X509) -> Result<Self, ConfigError> {
        let fingerprint = certificate
            .digest(MessageDigest::sha256())
            .map_err(|e| ConfigError::Certificate(e.to_string()))?;
        let identity = AnchorIdentity {
            subject: distinguished_name(certificate.subject_name()),
            fingerprint_sha256: hex::encode(&*fingerprint),
            environment: Environment::default(),
        };
        Ok(Self {
            certificate,
            identity,
        })
    }

    pub fn from_der(der: &[u8]) -> Result<Self, ConfigError> {
        let certificate =
            X509::from_der(der).map_err(|e| ConfigError::Certificate(e.to_string()))?;
        Self::new(certificate)
    }

    pub fn from_pem(pem: &[u8]) -> Result<Self, ConfigError> {
        let certificate =
            X509::from_pem(pem).map_err(|e| ConfigError::Certificate(e.to_string()))?;
        Self::new(certificate)
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.identity.environment = environment;
        self
    }

    pub fn certificate(&self) -> &X509Ref {
        &self.certificate
    }

    pub fn identity(&self) -> &AnchorIdentity {
        &self.identity
    }

    pub fn environment(&self) -> Environment {
        self.identity.environment
    }
}

impl std::fmt::Debug for TrustAnchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustAnchor")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

pub(crate) fn distinguished_name(name: &X509NameRef) -> String {
    name.entries()
        .map(|entry| {
            let field = entry.object().nid().short_name().unwrap_or("?");
            // Values with no UTF-8 form are written as `#` + hex of the
            // encoded bytes.
            let data = entry.data();
            let value = data
                .to_string()
                .unwrap_or_else(|_| format!("#{}", hex::encode(data.as_slice())));
            format!("{field}={value}")
        })
        .collect::<Vec<_>>()
        .join(", ")
}
