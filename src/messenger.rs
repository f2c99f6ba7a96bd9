use crate::certificate::verify_certificate;
use crate::escrow::EscrowEncoder;
use crate::session::Conversation;
use crate::{Certificate, Error, IdentityKey, Message, MessengerConfig, X25519PublicKey};
use ed25519_dalek::{Signature, VerifyingKey};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};

/// A peer's conversation; `None` until the first send or receive succeeds.
type SessionSlot = Arc<Mutex<Option<Conversation>>>;

struct LocalIdentity {
    username: String,
    key: IdentityKey,
}

/// End-to-end encrypted messaging client for one local user.
///
/// Holds the local identity, the certificates of known peers and one
/// ratcheting conversation per peer. Operations on the same peer are
/// serialized by a per-peer lock; different peers proceed concurrently.
pub struct Messenger {
    authority_key: VerifyingKey,
    escrow: EscrowEncoder,
    config: MessengerConfig,
    identity: Option<LocalIdentity>,
    certificates: RwLock<HashMap<String, Certificate>>,
    sessions: RwLock<HashMap<String, SessionSlot>>,
}

impl Messenger {
    /// Creates a client that trusts certificates signed by `authority_key` and
    /// escrows every message key for `escrow_key`.
    ///
    /// If no configuration is provided, default values are used.
    pub fn new(
        authority_key: VerifyingKey,
        escrow_key: X25519PublicKey,
        config: Option<MessengerConfig>,
    ) -> Self {
        Self {
            authority_key,
            escrow: EscrowEncoder::new(escrow_key),
            config: config.unwrap_or_default(),
            identity: None,
            certificates: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Generates the long-term identity key and returns the certificate to
    /// be signed by the authority.
    ///
    /// Issuing again replaces the identity and drops every conversation
    /// bound to the old one.
    pub fn issue_certificate(&mut self, username: &str) -> Result<Certificate, Error> {
        let key = IdentityKey::new()?;
        let certificate = Certificate::new(username, key.public_key());

        self.sessions.get_mut().map_err(|_| Error::Session)?.clear();
        self.identity = Some(LocalIdentity {
            username: username.to_string(),
            key,
        });

        info!(username, "issued identity certificate");
        Ok(certificate)
    }

    /// Verifies and stores a peer certificate.
    ///
    /// An identical certificate may be accepted again; a different one for
    /// a username already on file is rejected.
    pub fn accept_certificate(
        &self,
        certificate: Certificate,
        signature: &Signature,
    ) -> Result<(), Error> {
        verify_certificate(&self.authority_key, &certificate, signature).inspect_err(|err| {
            warn!(username = certificate.username(), %err, "certificate rejected");
        })?;

        let mut certificates = self.certificates.write().map_err(|_| Error::Session)?;
        match certificates.get(certificate.username()) {
            Some(existing) if existing == &certificate => Ok(()),
            Some(_) => {
                warn!(
                    username = certificate.username(),
                    "conflicting certificate rejected"
                );
                Err(Error::CertificateInvalid(format!(
                    "a different certificate for `{}` is already on file",
                    certificate.username()
                )))
            }
            None => {
                info!(username = certificate.username(), "certificate accepted");
                certificates.insert(certificate.username().to_string(), certificate);
                Ok(())
            }
        }
    }

    /// Encrypts `plaintext` for `peer`, establishing the conversation first if needed.
    pub fn send(&self, peer: &str, plaintext: &[u8]) -> Result<Message, Error> {
        let identity = self.identity()?;
        let slot = self.session_slot(peer)?;
        let mut conversation = slot.lock().map_err(|_| Error::Session)?;

        if let Some(conversation) = conversation.as_mut() {
            return conversation.encrypt(plaintext, &self.escrow);
        }

        let certificate = self.peer_certificate(peer)?;
        let mut established =
            Conversation::initiate(&identity.key, &certificate.identity_key(), &self.config)?;
        let message = established.encrypt(plaintext, &self.escrow)?;
        *conversation = Some(established);

        debug!(peer, "conversation initiated");
        Ok(message)
    }

    /// Decrypts a message from `peer`, establishing the conversation first if needed.
    ///
    /// A failed call leaves the conversation exactly as it was.
    pub fn receive(&self, peer: &str, message: &Message) -> Result<Vec<u8>, Error> {
        let identity = self.identity()?;
        let slot = self.session_slot(peer)?;
        let mut conversation = slot.lock().map_err(|_| Error::Session)?;

        if let Some(conversation) = conversation.as_mut() {
            return conversation.decrypt(message, &self.config);
        }

        let certificate = self.peer_certificate(peer)?;
        let (established, plaintext) = Conversation::accept(
            &identity.key,
            &certificate.identity_key(),
            message,
            &self.config,
        )?;
        *conversation = Some(established);

        debug!(peer, "conversation accepted");
        Ok(plaintext)
    }

    /// The username of the issued identity, if any.
    pub fn username(&self) -> Option<&str> {
        self.identity
            .as_ref()
            .map(|identity| identity.username.as_str())
    }

    /// Returns the accepted certificate of `peer`.
    pub fn certificate(&self, peer: &str) -> Option<Certificate> {
        self.peer_certificate(peer).ok()
    }

    /// Whether a conversation with `peer` has been established.
    pub fn is_established(&self, peer: &str) -> bool {
        let Ok(sessions) = self.sessions.read() else {
            return false;
        };
        sessions
            .get(peer)
            .and_then(|slot| slot.lock().ok().map(|conversation| conversation.is_some()))
            .unwrap_or(false)
    }

    /// The ratchet public key currently advertised to `peer`.
    pub fn ratchet_key(&self, peer: &str) -> Option<X25519PublicKey> {
        let sessions = self.sessions.read().ok()?;
        let slot = sessions.get(peer)?;
        let conversation = slot.lock().ok()?;
        conversation.as_ref().map(Conversation::public_key)
    }

    fn identity(&self) -> Result<&LocalIdentity, Error> {
        self.identity
            .as_ref()
            .ok_or_else(|| Error::Identity("no certificate has been issued".to_string()))
    }

    fn peer_certificate(&self, peer: &str) -> Result<Certificate, Error> {
        self.certificates
            .read()
            .map_err(|_| Error::Session)?
            .get(peer)
            .cloned()
            .ok_or_else(|| Error::UnknownPeer(peer.to_string()))
    }

    /// Returns the slot of `peer`, creating it only if a certificate is on file.
    fn session_slot(&self, peer: &str) -> Result<SessionSlot, Error> {
        if let Some(slot) = self
            .sessions
            .read()
            .map_err(|_| Error::Session)?
            .get(peer)
        {
            return Ok(Arc::clone(slot));
        }

        self.peer_certificate(peer)?;

        let mut sessions = self.sessions.write().map_err(|_| Error::Session)?;
        Ok(Arc::clone(sessions.entry(peer.to_string()).or_default()))
    }
}
