use crate::Error;
use crate::identity::generate_random_seed;
use base64::Engine;
use x25519_dalek::{PublicKey, SharedSecret, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// An X25519 public key, used for identities, ratchet keys and escrow ephemerals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct X25519PublicKey(PublicKey);

impl X25519PublicKey {
    /// Borrows the raw 32-byte Montgomery encoding.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Copies out the raw 32-byte Montgomery encoding.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Base64 rendering used in log fields.
    pub fn fingerprint(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.as_bytes())
    }
}

impl From<[u8; 32]> for X25519PublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(PublicKey::from(bytes))
    }
}

impl From<PublicKey> for X25519PublicKey {
    fn from(value: PublicKey) -> Self {
        Self(value)
    }
}

impl AsRef<PublicKey> for X25519PublicKey {
    fn as_ref(&self) -> &PublicKey {
        &self.0
    }
}

/// An X25519 secret key. Zeroized on drop.
#[derive(Clone)]
pub struct X25519Secret(StaticSecret);

impl X25519Secret {
    /// Generates a fresh key pair from the OS random source.
    pub(crate) fn generate() -> Result<Self, Error> {
        Ok(Self::from(generate_random_seed()?))
    }

    pub(crate) fn dh(&self, public_key: &X25519PublicKey) -> SharedSecret {
        self.0.diffie_hellman(public_key.as_ref())
    }

    pub(crate) fn public_key(&self) -> X25519PublicKey {
        let pub_key = PublicKey::from(&self.0);
        pub_key.into()
    }

    pub(crate) fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }
}

impl From<[u8; 32]> for X25519Secret {
    fn from(mut bytes: [u8; 32]) -> Self {
        let secret = StaticSecret::from(bytes);
        bytes.zeroize();
        Self(secret)
    }
}

impl Zeroize for X25519Secret {
    fn zeroize(&mut self) {
        self.0.zeroize()
    }
}

// `StaticSecret` wipes itself when dropped.
impl ZeroizeOnDrop for X25519Secret {}
