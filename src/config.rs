//! Trust-anchor provisioning.
//!
//! The anchor certificate can come from a file (PEM or DER), from an
//! environment variable holding a PEM, or from DER bytes already in memory.

use std::{env, fs, path::PathBuf};

use once_cell::sync::OnceCell;

use crate::{
    domain::entities::{trust_anchor::TrustAnchor, validation_result::Environment},
    errors::ConfigError,
};

/// Environment variable consulted when no other source is configured.
pub const DEFAULT_CERTIFICATE_ENV: &str = "CERTIFICATE";

const PEM_MARKER: &[u8] = b"-----BEGIN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustAnchorSource {
    /// A certificate file, PEM or DER.
    File(PathBuf),
    /// Name of an environment variable holding a PEM certificate. Line breaks
    /// flattened to spaces by deployment descriptors are restored.
    Env(String),
    Der(Vec<u8>),
}

impl Default for TrustAnchorSource {
    fn default() -> Self {
        TrustAnchorSource::Env(DEFAULT_CERTIFICATE_ENV.to_owned())
    }
}

/// Loads and parses the anchor certificate from `source`. The anchor is
/// labelled [`Environment::Sandbox`]; use
/// [`TrustAnchor::with_environment`] to relabel it.
pub fn load_trust_anchor(source: &TrustAnchorSource) -> Result<TrustAnchor, ConfigError> {
    let anchor = match source {
        TrustAnchorSource::File(path) => {
            let bytes = fs::read(path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            parse_certificate(&bytes)?
        }
        TrustAnchorSource::Env(name) => {
            let value = env::var(name).unwrap_or_default();
            if value.trim().is_empty() {
                return Err(ConfigError::MissingEnv(name.clone()));
            }
            TrustAnchor::from_pem(restore_pem_line_breaks(&value).as_bytes())?
        }
        TrustAnchorSource::Der(der) => TrustAnchor::from_der(der)?,
    };
    tracing::debug!(
        subject = %anchor.identity().subject,
        fingerprint = %anchor.identity().fingerprint_sha256,
        "loaded trust anchor"
    );
    Ok(anchor)
}

fn parse_certificate(bytes: &[u8]) -> Result<TrustAnchor, ConfigError> {
    if bytes.windows(PEM_MARKER.len()).any(|w| w == PEM_MARKER) {
        TrustAnchor::from_pem(bytes)
    } else {
        TrustAnchor::from_der(bytes)
    }
}

/// Undoes a PEM whose line breaks were replaced by single spaces. Values that
/// still contain a line break are returned unchanged.
pub fn restore_pem_line_breaks(value: &str) -> String {
    if value.contains('\n') {
        return value.to_owned();
    }
    value
        .trim()
        .replace(' ', "\n")
        .replace("\nCERTIFICATE", " CERTIFICATE")
}

/// Loads a trust anchor on first use and hands out the same one afterwards.
/// A failed load is not cached; the next call tries again.
#[derive(Debug)]
pub struct CachedTrustAnchor {
    source: TrustAnchorSource,
    environment: Environment,
    anchor: OnceCell<TrustAnchor>,
}

impl CachedTrustAnchor {
    pub fn new(source: TrustAnchorSource) -> Self {
        Self {
            source,
            environment: Environment::default(),
            anchor: OnceCell::new(),
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn get(&self) -> Result<&TrustAnchor, ConfigError> {
        self.anchor.get_or_try_init(|| {
            load_trust_anchor(&self.source).map(|a| a.with_environment(self.environment))
        })
    }
}
