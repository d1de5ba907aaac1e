use bytes::Bytes;

pub use ophelia::{
    Crypto, Error, HashValue, PrivateKey, PublicKey, Signature, SignatureVerify, ToPublicKey,
    UncompressedPublicKey,
};
pub use ophelia_secp256k1::{
    Secp256k1, Secp256k1PrivateKey, Secp256k1PublicKey, Secp256k1Signature,
};

/// Signs a 32-byte digest, returning the 64-byte compact signature.
pub fn sign_digest(key: &Secp256k1PrivateKey, digest: &[u8; 32]) -> Result<Bytes, Error> {
    let msg = HashValue::try_from(digest.as_ref())?;
    Ok(key.sign_message(&msg).to_bytes())
}

/// Checks a compact signature over a 32-byte digest. Any parse failure is a
/// verification failure.
pub fn verify_digest(key: &Secp256k1PublicKey, digest: &[u8; 32], sig: &[u8]) -> bool {
    let msg = match HashValue::try_from(digest.as_ref()) {
        Ok(msg) => msg,
        Err(_) => return false,
    };
    let sig = match Secp256k1Signature::try_from(sig) {
        Ok(sig) => sig,
        Err(_) => return false,
    };
    sig.verify(&msg, key).is_ok()
}
