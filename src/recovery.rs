use crate::Error;
use crate::config::MessengerConfig;
use crate::message::Message;
use crate::ratchet::{ChainKey, RatchetState};
use tracing::debug;

/// Where an out-of-order message was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RecoveryPath {
    /// Position in the session's first receiving chain.
    InitialChain(u32),
    /// Position after the snapshot of a superseded sender key.
    SupersededChain(u32),
}

/// Bounded trial decryption against stale chain positions.
///
/// Works on copies of the chain keys; nothing it derives is written back.
pub(crate) struct RecoveryDecryptor<'a> {
    state: &'a RatchetState,
    config: &'a MessengerConfig,
}

impl<'a> RecoveryDecryptor<'a> {
    pub(crate) fn new(state: &'a RatchetState, config: &'a MessengerConfig) -> Self {
        Self { state, config }
    }

    pub(crate) fn decrypt(&self, message: &Message) -> Result<(Vec<u8>, RecoveryPath), Error> {
        if let Some(initial) = &self.state.initial_receiving_chain {
            if let Some((plaintext, index)) =
                Self::trial(initial, self.config.same_chain_window, message)?
            {
                return Ok((plaintext, RecoveryPath::InitialChain(index)));
            }
        }

        let sender_key = &message.header.sender_ratchet_key;
        if let Some(snapshot) = self.state.superseded_chains.get(sender_key) {
            if let Some((plaintext, index)) =
                Self::trial(snapshot, self.config.superseded_chain_window, message)?
            {
                return Ok((plaintext, RecoveryPath::SupersededChain(index)));
            }
        }

        debug!(
            sender_key = %sender_key.fingerprint(),
            "recovery windows exhausted"
        );
        Err(Error::DecryptionFailed)
    }

    fn trial(
        start: &ChainKey,
        window: u32,
        message: &Message,
    ) -> Result<Option<(Vec<u8>, u32)>, Error> {
        let mut chain = start.clone();

        for index in 0..window {
            let (next, message_key) = chain.step()?;
            if let Ok(plaintext) = message.open(&message_key) {
                return Ok(Some((plaintext, index)));
            }
            chain = next;
        }

        Ok(None)
    }
}
