use crate::crypto::{aead_open, aead_seal};
use crate::message::{Message, MessageHeader};
use crate::{Error, MessageKey};

impl Message {
    /// Encrypts `plaintext` under a one-time message key, authenticating the
    /// whole serialized header as associated data.
    pub(crate) fn seal(
        header: MessageHeader,
        message_key: &MessageKey,
        plaintext: &[u8],
    ) -> Result<Self, Error> {
        let ciphertext = aead_seal(
            message_key.as_bytes(),
            &header.message_iv,
            plaintext,
            &header.to_bytes(),
        )?;

        Ok(Self { header, ciphertext })
    }

    /// Decrypts the payload with a candidate message key.
    ///
    /// Fails with [`Error::DecryptionFailed`] when the key is wrong or any
    /// byte of the header or ciphertext was altered.
    pub fn open(&self, message_key: &MessageKey) -> Result<Vec<u8>, Error> {
        aead_open(
            message_key.as_bytes(),
            &self.header.message_iv,
            &self.ciphertext,
            &self.header.to_bytes(),
        )
        .map_err(|_| Error::DecryptionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::X25519PublicKey;
    use crate::message::ESCROW_CIPHERTEXT_SIZE;

    fn header() -> MessageHeader {
        MessageHeader {
            sender_ratchet_key: X25519PublicKey::from([1u8; 32]),
            escrow_ephemeral_key: X25519PublicKey::from([2u8; 32]),
            escrow_iv: [3u8; 12],
            message_iv: [4u8; 12],
            escrow_ciphertext: [5u8; ESCROW_CIPHERTEXT_SIZE],
        }
    }

    #[test]
    fn test_seal_and_open() {
        let key = MessageKey::from([6u8; 32]);
        let message = Message::seal(header(), &key, b"hi").unwrap();

        assert_eq!(message.open(&key).unwrap(), b"hi");
        assert_eq!(
            message.open(&MessageKey::from([7u8; 32])),
            Err(Error::DecryptionFailed)
        );
    }

    #[test]
    fn test_header_is_authenticated() {
        let key = MessageKey::from([6u8; 32]);
        let mut message = Message::seal(header(), &key, b"hi").unwrap();
        message.header.escrow_ciphertext[0] ^= 0x01;

        assert_eq!(message.open(&key), Err(Error::DecryptionFailed));
    }
}
