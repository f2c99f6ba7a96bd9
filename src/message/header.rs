use crate::identity::IV_SIZE;
use crate::{Error, X25519PublicKey};

/// AES-256 key (32 bytes) plus a 16-byte authentication tag.
pub const ESCROW_CIPHERTEXT_SIZE: usize = 48;

/// Serialized size of a [`MessageHeader`].
pub const HEADER_SIZE: usize = 32 + 32 + IV_SIZE + IV_SIZE + ESCROW_CIPHERTEXT_SIZE;

/// Cleartext header of a message.
///
/// The serialized header is the associated data of the payload ciphertext,
/// so every field, escrow fields included, is authenticated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageHeader {
    /// Sender's current ratchet public key.
    pub sender_ratchet_key: X25519PublicKey,
    /// Ephemeral key of the escrow key agreement.
    pub escrow_ephemeral_key: X25519PublicKey,
    /// Nonce of the escrow ciphertext.
    pub escrow_iv: [u8; IV_SIZE],
    /// Nonce of the payload ciphertext.
    pub message_iv: [u8; IV_SIZE],
    /// Message key encrypted for the escrow authority.
    pub escrow_ciphertext: [u8; ESCROW_CIPHERTEXT_SIZE],
}

impl MessageHeader {
    /// Fixed-layout encoding:
    /// `sender_ratchet_key | escrow_ephemeral_key | escrow_iv | message_iv | escrow_ciphertext`.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..32].copy_from_slice(self.sender_ratchet_key.as_bytes());
        bytes[32..64].copy_from_slice(self.escrow_ephemeral_key.as_bytes());
        bytes[64..76].copy_from_slice(&self.escrow_iv);
        bytes[76..88].copy_from_slice(&self.message_iv);
        bytes[88..HEADER_SIZE].copy_from_slice(&self.escrow_ciphertext);

        bytes
    }
}

impl From<[u8; HEADER_SIZE]> for MessageHeader {
    fn from(bytes: [u8; HEADER_SIZE]) -> Self {
        let mut sender_ratchet_key = [0u8; 32];
        sender_ratchet_key.copy_from_slice(&bytes[0..32]);

        let mut escrow_ephemeral_key = [0u8; 32];
        escrow_ephemeral_key.copy_from_slice(&bytes[32..64]);

        let mut escrow_iv = [0u8; IV_SIZE];
        escrow_iv.copy_from_slice(&bytes[64..76]);

        let mut message_iv = [0u8; IV_SIZE];
        message_iv.copy_from_slice(&bytes[76..88]);

        let mut escrow_ciphertext = [0u8; ESCROW_CIPHERTEXT_SIZE];
        escrow_ciphertext.copy_from_slice(&bytes[88..HEADER_SIZE]);

        Self {
            sender_ratchet_key: X25519PublicKey::from(sender_ratchet_key),
            escrow_ephemeral_key: X25519PublicKey::from(escrow_ephemeral_key),
            escrow_iv,
            message_iv,
            escrow_ciphertext,
        }
    }
}

impl TryFrom<&[u8]> for MessageHeader {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; HEADER_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::Serde(format!("Invalid header length: {}", bytes.len())))?;

        Ok(Self::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_fixed() {
        let header = MessageHeader {
            sender_ratchet_key: X25519PublicKey::from([1u8; 32]),
            escrow_ephemeral_key: X25519PublicKey::from([2u8; 32]),
            escrow_iv: [3u8; IV_SIZE],
            message_iv: [4u8; IV_SIZE],
            escrow_ciphertext: [5u8; ESCROW_CIPHERTEXT_SIZE],
        };

        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), 136);
        assert_eq!(&bytes[0..32], &[1u8; 32]);
        assert_eq!(&bytes[64..76], &[3u8; IV_SIZE]);
        assert_eq!(&bytes[76..88], &[4u8; IV_SIZE]);
        assert_eq!(bytes[HEADER_SIZE - 1], 5);

        assert_eq!(MessageHeader::from(bytes), header);
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let result = MessageHeader::try_from([0u8; HEADER_SIZE - 1].as_slice());
        assert!(matches!(result, Err(Error::Serde(_))));
    }
}
