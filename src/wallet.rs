//! Wallet loading and message signing.
//!
//! This is the signing-primitive boundary: an Arweave JWK wallet file is
//! turned into a [`Signer`] that produces RSA-PSS signatures over data item
//! deep hashes. Key material is held in memory for the life of the
//! invocation only.

use std::fmt;
use std::path::Path;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rsa::pss::SigningKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::{BigUint, RsaPrivateKey};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::types::{Error, Result};

/// Signs data item deep hashes on behalf of a wallet.
///
/// Implemented by [`JwkSigner`] in production and by the fake signer in
/// [`crate::gateway::mock`] for tests.
pub trait Signer: Send + Sync + fmt::Debug {
    /// Raw public key bytes (the RSA modulus), embedded as the item owner.
    fn owner(&self) -> &[u8];

    /// Native wallet address derived from the owner key.
    fn address(&self) -> &str;

    /// Sign a data item deep hash.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// RSA private key in JWK form, as Arweave wallet files store it.
///
/// Unknown fields (`kid`, `dp`, `dq`, `qi`, ...) are ignored; the key is
/// reconstructed from the minimal components.
#[derive(Debug, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub n: String,
    pub e: String,
    pub d: String,
    pub p: String,
    pub q: String,
}

/// Production signer backed by an Arweave JWK wallet.
pub struct JwkSigner {
    key: SigningKey<Sha256>,
    owner: Vec<u8>,
    address: String,
}

impl JwkSigner {
    /// Load a wallet file and construct a signer from it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let jwk: Jwk = serde_json::from_str(&raw)?;
        Self::from_jwk(&jwk)
    }

    pub fn from_jwk(jwk: &Jwk) -> Result<Self> {
        if jwk.kty != "RSA" {
            return Err(Error::validation(format!(
                "unsupported wallet key type: {}",
                jwk.kty
            )));
        }

        let n = decode_component(&jwk.n, "n")?;
        let e = decode_component(&jwk.e, "e")?;
        let d = decode_component(&jwk.d, "d")?;
        let p = decode_component(&jwk.p, "p")?;
        let q = decode_component(&jwk.q, "q")?;

        let key = RsaPrivateKey::from_components(
            BigUint::from_bytes_be(&n),
            BigUint::from_bytes_be(&e),
            BigUint::from_bytes_be(&d),
            vec![BigUint::from_bytes_be(&p), BigUint::from_bytes_be(&q)],
        )
        .map_err(|err| Error::validation(format!("invalid wallet key: {err}")))?;

        let address = owner_address(&n);
        Ok(Self {
            // Salt length defaults to the digest size (32), matching the
            // arweave-js signature parameters.
            key: SigningKey::new(key),
            owner: n,
            address,
        })
    }
}

impl Signer for JwkSigner {
    fn owner(&self) -> &[u8] {
        &self.owner
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let mut rng = rand::thread_rng();
        let signature = self.key.sign_with_rng(&mut rng, message);
        Ok(signature.to_vec())
    }
}

// Key material must never reach logs.
impl fmt::Debug for JwkSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JwkSigner({})", self.address)
    }
}

/// Derive the native wallet address: base64url(sha256(owner)).
pub fn owner_address(owner: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(owner))
}

fn decode_component(value: &str, field: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|err| Error::validation(format!("wallet component {field} is not base64url: {err}")))
}
