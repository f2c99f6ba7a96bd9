/// Errors that can occur while running a pairwise messaging session.
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// A certificate was not signed by the authority or conflicts with one on file.
    #[error("Certificate rejected: {0}")]
    CertificateInvalid(String),

    /// No certificate is on file for the addressed peer.
    #[error("No certificate on file for peer `{0}`")]
    UnknownPeer(String),

    /// The exact same header and ciphertext were already accepted.
    #[error("Message replay detected")]
    ReplayDetected,

    /// The message could not be decrypted with the current chain or any recovery window.
    #[error("Message decryption failed")]
    DecryptionFailed,

    /// The escrow copy of the message key could not be produced.
    #[error("Key escrow failed: {0}")]
    Escrow(String),

    /// A cryptographic operation failed.
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),

    /// The local identity key is missing or unusable.
    #[error("Identity key error: {0}")]
    Identity(String),

    /// Session table is in an invalid state.
    #[error("Session state error")]
    Session,

    /// Random number generation failed.
    #[error("Random number generation failed")]
    Random,

    /// Serialization or deserialization failed.
    #[error("Serialization/deserialization failed: {0}")]
    Serde(String),
}

impl From<aes_gcm_siv::Error> for Error {
    fn from(value: aes_gcm_siv::Error) -> Self {
        Self::Crypto(value.to_string())
    }
}
