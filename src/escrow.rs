//! Mandatory escrow of every message key for a fixed third party.
//!
//! Each message carries its own message key encrypted to the escrow
//! authority's X25519 key. Whoever holds the authority secret can read any
//! message, regardless of the two conversing parties.

use crate::crypto::{aead_open, aead_seal, hmac_derive};
use crate::identity::{IV_SIZE, generate_iv};
use crate::message::{ESCROW_CIPHERTEXT_SIZE, Message, MessageHeader};
use crate::{Error, MessageKey, X25519PublicKey, X25519Secret};
use zeroize::Zeroize;

const ESCROW_KEY_LABEL: &[u8] = b"AES-GENERATION";

/// Escrow fields embedded in a message header.
pub(crate) struct EscrowFields {
    pub(crate) ephemeral_key: X25519PublicKey,
    pub(crate) iv: [u8; IV_SIZE],
    pub(crate) ciphertext: [u8; ESCROW_CIPHERTEXT_SIZE],
}

/// Wraps message keys for the escrow authority.
#[derive(Clone)]
pub(crate) struct EscrowEncoder {
    recipient: X25519PublicKey,
}

impl EscrowEncoder {
    pub(crate) fn new(recipient: X25519PublicKey) -> Self {
        Self { recipient }
    }

    /// Encrypts `message_key` under a fresh ephemeral agreement with the authority.
    ///
    /// Every failure is reported as [`Error::Escrow`]; a message must not be
    /// emitted without its escrow copy.
    pub(crate) fn wrap(&self, message_key: &MessageKey) -> Result<EscrowFields, Error> {
        let escrow_err = |err: Error| Error::Escrow(err.to_string());

        let ephemeral = X25519Secret::generate().map_err(escrow_err)?;
        let shared_secret = ephemeral.dh(&self.recipient);
        if !shared_secret.was_contributory() {
            return Err(Error::Escrow(
                "Escrow public key is a low-order point".to_string(),
            ));
        }
        let mut escrow_key =
            hmac_derive(shared_secret.as_bytes(), ESCROW_KEY_LABEL).map_err(escrow_err)?;
        let iv = generate_iv().map_err(escrow_err)?;

        let sealed = aead_seal(&escrow_key, &iv, message_key.as_bytes(), &[]);
        escrow_key.zeroize();

        let ciphertext = sealed
            .map_err(escrow_err)?
            .as_slice()
            .try_into()
            .map_err(|_| Error::Escrow("Unexpected escrow ciphertext length".to_string()))?;

        Ok(EscrowFields {
            ephemeral_key: ephemeral.public_key(),
            iv,
            ciphertext,
        })
    }
}

/// The third party holding the escrow secret key.
pub struct EscrowAuthority {
    secret: X25519Secret,
}

impl EscrowAuthority {
    /// Creates an authority with a random key pair.
    pub fn new() -> Result<Self, Error> {
        Ok(Self {
            secret: X25519Secret::generate()?,
        })
    }

    /// The key every client wraps message keys for.
    pub fn public_key(&self) -> X25519PublicKey {
        self.secret.public_key()
    }

    /// Serializes the authority secret key.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.secret.to_bytes()
    }

    /// Unwraps the message key carried in a header.
    pub fn recover_message_key(&self, header: &MessageHeader) -> Result<MessageKey, Error> {
        let shared_secret = self.secret.dh(&header.escrow_ephemeral_key);
        let mut escrow_key = hmac_derive(shared_secret.as_bytes(), ESCROW_KEY_LABEL)?;

        let opened = aead_open(&escrow_key, &header.escrow_iv, &header.escrow_ciphertext, &[]);
        escrow_key.zeroize();
        let mut key_bytes = opened?;

        let message_key: Result<[u8; 32], Error> = key_bytes
            .as_slice()
            .try_into()
            .map_err(|_| Error::Crypto("Escrowed key has the wrong length".to_string()));
        key_bytes.zeroize();

        Ok(MessageKey::from(message_key?))
    }

    /// Reads a message without being party to the conversation.
    pub fn decrypt(&self, message: &Message) -> Result<Vec<u8>, Error> {
        let message_key = self.recover_message_key(&message.header)?;
        message.open(&message_key)
    }
}

impl From<[u8; 32]> for EscrowAuthority {
    fn from(bytes: [u8; 32]) -> Self {
        Self {
            secret: X25519Secret::from(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_key_is_recoverable() {
        let authority = EscrowAuthority::new().unwrap();
        let encoder = EscrowEncoder::new(authority.public_key());
        let message_key = MessageKey::from([42u8; 32]);

        let fields = encoder.wrap(&message_key).unwrap();
        let header = MessageHeader {
            sender_ratchet_key: X25519PublicKey::from([1u8; 32]),
            escrow_ephemeral_key: fields.ephemeral_key,
            escrow_iv: fields.iv,
            message_iv: [0u8; IV_SIZE],
            escrow_ciphertext: fields.ciphertext,
        };

        assert!(authority.recover_message_key(&header).unwrap() == message_key);
    }

    #[test]
    fn test_every_wrap_uses_a_fresh_ephemeral() {
        let authority = EscrowAuthority::new().unwrap();
        let encoder = EscrowEncoder::new(authority.public_key());
        let message_key = MessageKey::from([42u8; 32]);

        let first = encoder.wrap(&message_key).unwrap();
        let second = encoder.wrap(&message_key).unwrap();
        assert_ne!(first.ephemeral_key, second.ephemeral_key);
        assert_ne!(first.ciphertext, second.ciphertext);
    }

    #[test]
    fn test_low_order_escrow_key_is_refused() {
        let encoder = EscrowEncoder::new(X25519PublicKey::from([0u8; 32]));
        let result = encoder.wrap(&MessageKey::from([42u8; 32]));

        assert!(matches!(result, Err(Error::Escrow(_))));
    }

    #[test]
    fn test_other_authority_cannot_unwrap() {
        let authority = EscrowAuthority::new().unwrap();
        let outsider = EscrowAuthority::from(EscrowAuthority::new().unwrap().to_bytes());
        let encoder = EscrowEncoder::new(authority.public_key());

        let fields = encoder.wrap(&MessageKey::from([42u8; 32])).unwrap();
        let header = MessageHeader {
            sender_ratchet_key: X25519PublicKey::from([1u8; 32]),
            escrow_ephemeral_key: fields.ephemeral_key,
            escrow_iv: fields.iv,
            message_iv: [0u8; IV_SIZE],
            escrow_ciphertext: fields.ciphertext,
        };

        assert!(outsider.recover_message_key(&header).is_err());
    }
}
