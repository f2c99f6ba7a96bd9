mod codec;
mod header;
pub use header::*;

use crate::Error;
use crate::proto::{MESSAGE_VERSION, MessageProto};
use prost::Message as _;

/// A message produced by [`Messenger::send`](crate::Messenger::send).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Cleartext, authenticated header.
    pub header: MessageHeader,
    /// Payload ciphertext, bound to the serialized header.
    pub ciphertext: Vec<u8>,
}

impl Message {
    /// Serializes the message for transport.
    pub fn to_bytes(&self) -> Vec<u8> {
        MessageProto {
            version: MESSAGE_VERSION,
            header: self.header.to_bytes().to_vec(),
            ciphertext: self.ciphertext.clone(),
        }
        .encode_to_vec()
    }

    /// Deserializes a message received from the transport.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let proto = MessageProto::decode(bytes)
            .map_err(|err| Error::Serde(format!("Failed to decode message: {err:?}")))?;

        if proto.version != MESSAGE_VERSION {
            return Err(Error::Serde(format!(
                "Unsupported message version: {}",
                proto.version
            )));
        }

        Ok(Self {
            header: MessageHeader::try_from(proto.header.as_slice())?,
            ciphertext: proto.ciphertext,
        })
    }
}
