use crate::Error;
use crate::crypto::hmac_derive;
use zeroize::{Zeroize, ZeroizeOnDrop};

const CHAIN_KEY_LABEL: &[u8] = b"ck-str";
const MESSAGE_KEY_LABEL: &[u8] = b"mk-str";

/// Root key, replaced only by a DH ratchet step.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct RootKey([u8; 32]);

impl RootKey {
    pub(crate) fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Symmetric chain key. Advanced one way per message.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct ChainKey([u8; 32]);

impl ChainKey {
    pub(crate) fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derives the next chain key and the message key of the current position.
    ///
    /// The receiver is left untouched; callers decide whether to commit the
    /// returned chain key.
    pub(crate) fn step(&self) -> Result<(ChainKey, MessageKey), Error> {
        let next = hmac_derive(&self.0, CHAIN_KEY_LABEL)?;
        let message_key = hmac_derive(&self.0, MESSAGE_KEY_LABEL)?;

        Ok((ChainKey(next), MessageKey(message_key)))
    }
}

/// One-time key that encrypts exactly one payload.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MessageKey([u8; 32]);

impl MessageKey {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for MessageKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}
