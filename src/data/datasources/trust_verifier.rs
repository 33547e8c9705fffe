use chrono::{DateTime, Utc};
use openssl::{
    error::ErrorStack,
    stack::Stack,
    x509::{
        store::X509StoreBuilder,
        verify::{X509VerifyFlags, X509VerifyParam}, X509Ref, X509StoreContext,
        X509VerifyResult, X509,
    },
};

use super::utils::same_certificate;
use crate::{
    domain::entities::trust_anchor::TrustAnchor,
    errors::{ChainFailure, TrustError},
};

// X509_V_ERR_* codes, see openssl/x509_vfy.h.
const UNABLE_TO_GET_ISSUER_CERT: i32 = 2;
const CERT_NOT_YET_VALID: i32 = 9;
const CERT_HAS_EXPIRED: i32 = 10;
const DEPTH_ZERO_SELF_SIGNED_CERT: i32 = 18;
const SELF_SIGNED_CERT_IN_CHAIN: i32 = 19;
const UNABLE_TO_GET_ISSUER_CERT_LOCALLY: i32 = 20;
const UNABLE_TO_VERIFY_LEAF_SIGNATURE: i32 = 21;
const CERT_UNTRUSTED: i32 = 27;

pub trait TrustVerifier {
    /// Checks that `signer` chains to `anchor`, through any of `others`, with
    /// every certificate on the path valid at `now`.
    fn verify(
        &self,
        anchor: &TrustAnchor,
        signer: &X509Ref,
        others: &[X509],
        now: DateTime<Utc>,
    ) -> Result<(), TrustError>;
}

/// Standard X.509 path validation through OpenSSL. No policy beyond what
/// path validation itself enforces.
pub struct X509TrustVerifier;

impl TrustVerifier for X509TrustVerifier {
    fn verify(
        &self,
        anchor: &TrustAnchor,
        signer: &X509Ref,
        others: &[X509],
        now: DateTime<Utc>,
    ) -> Result<(), TrustError> {
        let (verified, result) =
            Self::run_path_validation(anchor, signer, others, now).map_err(|e| {
                TrustError::ChainInvalid {
                    reason: ChainFailure::MalformedChain,
                    detail: e.to_string(),
                }
            })?;
        if verified {
            return Ok(());
        }
        Err(TrustError::ChainInvalid {
            reason: classify(result.as_raw()),
            detail: result.error_string().to_owned(),
        })
    }
}

impl X509TrustVerifier {
    pub(crate) fn new() -> Self {
        Self
    }

    fn run_path_validation(
        anchor: &TrustAnchor,
        signer: &X509Ref,
        others: &[X509],
        now: DateTime<Utc>,
    ) -> Result<(bool, X509VerifyResult), ErrorStack> {
        // Root pool: the anchor alone. It ends the chain whether or not it is
        // self-signed.
        let mut param = X509VerifyParam::new()?;
        param.set_time(now.timestamp() as _);
        param.set_flags(X509VerifyFlags::PARTIAL_CHAIN)?;
        let mut store_builder = X509StoreBuilder::new()?;
        store_builder.add_cert(anchor.certificate().to_owned())?;
        store_builder.set_param(&param)?;
        let store = store_builder.build();

        // Intermediate pool: every other envelope certificate except copies
        // of the anchor.
        let mut intermediates = Stack::new()?;
        for cert in others {
            if !same_certificate(cert, anchor.certificate()) {
                intermediates.push(cert.clone())?;
            }
        }
        tracing::debug!(
            intermediates = intermediates.len(),
            at = %now,
            "validating signer certificate path"
        );

        let mut store_ctx = X509StoreContext::new()?;
        store_ctx.init(&store, signer, &intermediates, |ctx| {
            let verified = ctx.verify_cert()?;
            Ok((verified, ctx.error()))
        })
    }
}

fn classify(code: i32) -> ChainFailure {
    match code {
        CERT_HAS_EXPIRED => ChainFailure::Expired,
        CERT_NOT_YET_VALID => ChainFailure::NotYetValid,
        UNABLE_TO_GET_ISSUER_CERT
        | DEPTH_ZERO_SELF_SIGNED_CERT
        | SELF_SIGNED_CERT_IN_CHAIN
        | UNABLE_TO_GET_ISSUER_CERT_LOCALLY
        | UNABLE_TO_VERIFY_LEAF_SIGNATURE
        | CERT_UNTRUSTED => ChainFailure::UntrustedRoot,
        _ => ChainFailure::MalformedChain,
    }
}
