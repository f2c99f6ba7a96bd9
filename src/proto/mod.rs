//! Protocol Buffers envelopes for certificates and wire messages.

/// Current schema version of [`MessageProto`].
pub(crate) const MESSAGE_VERSION: u32 = 1;

/// The signed body of a certificate.
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct CertificateProto {
    #[prost(string, tag = "1")]
    pub username: String,
    #[prost(bytes = "vec", tag = "2")]
    pub identity_key: Vec<u8>,
}

/// A message as it travels between peers.
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct MessageProto {
    #[prost(uint32, tag = "1")]
    pub version: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub header: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub ciphertext: Vec<u8>,
}
