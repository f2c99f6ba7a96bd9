mod types;
pub use types::*;

mod identity;
pub use identity::{IV_SIZE, IdentityKey};

mod certificate;
pub use certificate::{Certificate, CertificateAuthority, verify_certificate};

mod crypto;

mod ratchet;
pub use ratchet::MessageKey;

mod message;
pub use message::*;

mod escrow;
pub use escrow::EscrowAuthority;

mod replay;

mod recovery;

mod session;

mod messenger;
pub use messenger::Messenger;

mod error;
pub use error::Error;

mod config;
pub use config::MessengerConfig;

mod proto;

pub use ed25519_dalek::{Signature, VerifyingKey};
