use crate::{Error, X25519PublicKey, X25519Secret};
use rand::TryRngCore;
use rand::rngs::OsRng;
use x25519_dalek::SharedSecret;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of every AEAD nonce in the protocol.
pub const IV_SIZE: usize = 12;

/// Generates a cryptographically secure random 32-byte seed.
pub(crate) fn generate_random_seed() -> Result<[u8; 32], Error> {
    let mut seed = [0u8; 32];
    OsRng.try_fill_bytes(&mut seed).map_err(|_| Error::Random)?;
    Ok(seed)
}

/// Generates a fresh random AEAD nonce.
pub(crate) fn generate_iv() -> Result<[u8; IV_SIZE], Error> {
    let mut iv = [0u8; IV_SIZE];
    OsRng.try_fill_bytes(&mut iv).map_err(|_| Error::Random)?;
    Ok(iv)
}

/// Long-term X25519 identity key pair.
///
/// Its public half is what the authority certifies; its secret half seeds the
/// root secret of every session this party takes part in.
pub struct IdentityKey {
    dh_key: X25519Secret,
}

impl IdentityKey {
    /// Creates a new identity key from the OS random source.
    pub fn new() -> Result<Self, Error> {
        Ok(Self {
            dh_key: X25519Secret::generate()?,
        })
    }

    /// Returns the public X25519 key for Diffie-Hellman operations.
    pub fn public_key(&self) -> X25519PublicKey {
        self.dh_key.public_key()
    }

    /// Performs Diffie-Hellman key agreement with another party's public key.
    pub fn dh(&self, public_key: &X25519PublicKey) -> SharedSecret {
        self.dh_key.dh(public_key)
    }

    /// Serializes the secret half of the identity key.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.dh_key.to_bytes()
    }
}

impl From<[u8; 32]> for IdentityKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self {
            dh_key: X25519Secret::from(bytes),
        }
    }
}

impl Zeroize for IdentityKey {
    fn zeroize(&mut self) {
        self.dh_key.zeroize();
    }
}

impl ZeroizeOnDrop for IdentityKey {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diffie_hellman() {
        let alice_identity = IdentityKey::new().unwrap();
        let bob_identity = IdentityKey::new().unwrap();

        let alice_shared = alice_identity.dh(&bob_identity.public_key());
        let bob_shared = bob_identity.dh(&alice_identity.public_key());

        assert_eq!(alice_shared.as_bytes(), bob_shared.as_bytes());
    }

    #[test]
    fn test_serialization_deserialization() {
        let original_key = IdentityKey::new().unwrap();
        let restored_key = IdentityKey::from(original_key.to_bytes());

        assert_eq!(original_key.public_key(), restored_key.public_key());
    }

    #[test]
    fn test_random_material_is_fresh() {
        assert_ne!(generate_random_seed().unwrap(), generate_random_seed().unwrap());
        assert_ne!(generate_iv().unwrap(), generate_iv().unwrap());
    }
}
