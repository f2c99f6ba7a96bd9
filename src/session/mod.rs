mod establish;

use crate::config::MessengerConfig;
use crate::escrow::EscrowEncoder;
use crate::identity::generate_iv;
use crate::message::{Message, MessageHeader};
use crate::ratchet::RatchetState;
use crate::recovery::{RecoveryDecryptor, RecoveryPath};
use crate::replay::{MessageId, ReplayGuard};
use crate::{Error, IdentityKey, X25519PublicKey};
use establish::{establish_as_receiver, establish_as_sender};
use tracing::{debug, warn};

/// An established conversation with one peer.
///
/// Every mutation is staged on a copy of the ratchet state and committed
/// only once the whole operation succeeded.
pub(crate) struct Conversation {
    ratchet: RatchetState,
    replay_guard: ReplayGuard,
}

impl Conversation {
    /// Starts a conversation by sending to `peer_identity_key`.
    pub(crate) fn initiate(
        identity: &IdentityKey,
        peer_identity_key: &X25519PublicKey,
        config: &MessengerConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            ratchet: establish_as_sender(identity, peer_identity_key, config)?,
            replay_guard: ReplayGuard::new(config.max_seen_messages),
        })
    }

    /// Starts a conversation from the first message received from a peer.
    ///
    /// Nothing is returned unless the message decrypts.
    pub(crate) fn accept(
        identity: &IdentityKey,
        peer_identity_key: &X25519PublicKey,
        message: &Message,
        config: &MessengerConfig,
    ) -> Result<(Self, Vec<u8>), Error> {
        let mut ratchet = establish_as_receiver(
            identity,
            peer_identity_key,
            &message.header.sender_ratchet_key,
            config,
        )?;
        let plaintext = Self::open(&mut ratchet, message, config)?;

        let mut replay_guard = ReplayGuard::new(config.max_seen_messages);
        replay_guard.record(MessageId::of(message));

        Ok((
            Self {
                ratchet,
                replay_guard,
            },
            plaintext,
        ))
    }

    pub(crate) fn public_key(&self) -> X25519PublicKey {
        self.ratchet.ratchet_key.public_key()
    }

    /// Encrypts the next message of the sending chain.
    ///
    /// The escrow copy of the message key is embedded in the header before the
    /// payload is sealed, so it is covered by the payload authentication.
    pub(crate) fn encrypt(
        &mut self,
        plaintext: &[u8],
        escrow: &EscrowEncoder,
    ) -> Result<Message, Error> {
        let (next_chain, message_key) = self.ratchet.sending_chain.step()?;
        let escrow_fields = escrow.wrap(&message_key)?;

        let header = MessageHeader {
            sender_ratchet_key: self.public_key(),
            escrow_ephemeral_key: escrow_fields.ephemeral_key,
            escrow_iv: escrow_fields.iv,
            message_iv: generate_iv()?,
            escrow_ciphertext: escrow_fields.ciphertext,
        };
        let message = Message::seal(header, &message_key, plaintext)?;

        self.ratchet.sending_chain = next_chain;
        Ok(message)
    }

    /// Decrypts a message of an already established conversation.
    pub(crate) fn decrypt(
        &mut self,
        message: &Message,
        config: &MessengerConfig,
    ) -> Result<Vec<u8>, Error> {
        let id = MessageId::of(message);
        self.replay_guard.check(&id).inspect_err(|_| {
            warn!(
                sender_key = %message.header.sender_ratchet_key.fingerprint(),
                "dropping replayed message"
            );
        })?;

        let mut working = self.ratchet.clone();
        let sender_key = &message.header.sender_ratchet_key;
        if !working.has_observed(sender_key) {
            working.ratchet(sender_key, &config.kdf_info)?;
        }

        let plaintext = Self::open(&mut working, message, config)?;

        self.ratchet = working;
        self.replay_guard.record(id);
        Ok(plaintext)
    }

    /// Primary attempt on the current receiving chain, then bounded recovery.
    ///
    /// Only the primary attempt advances `state.receiving_chain`.
    fn open(
        state: &mut RatchetState,
        message: &Message,
        config: &MessengerConfig,
    ) -> Result<Vec<u8>, Error> {
        if let Some(chain) = &state.receiving_chain {
            let (next_chain, message_key) = chain.step()?;
            if let Ok(plaintext) = message.open(&message_key) {
                state.receiving_chain = Some(next_chain);
                return Ok(plaintext);
            }
        }

        let (plaintext, path) = RecoveryDecryptor::new(state, config)
            .decrypt(message)
            .inspect_err(|err| {
                warn!(
                    sender_key = %message.header.sender_ratchet_key.fingerprint(),
                    %err,
                    "message rejected"
                );
            })?;

        match path {
            RecoveryPath::InitialChain(index) => {
                debug!(index, "recovered message from the initial receiving chain")
            }
            RecoveryPath::SupersededChain(index) => {
                debug!(index, "recovered message from a superseded chain")
            }
        }

        Ok(plaintext)
    }
}
