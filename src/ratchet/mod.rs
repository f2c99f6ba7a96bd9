mod chain;
mod state;

pub use crate::ratchet::chain::MessageKey;
pub(crate) use crate::ratchet::chain::{ChainKey, RootKey};
pub(crate) use crate::ratchet::state::RatchetState;

use crate::crypto::kdf;
use crate::{Error, X25519PublicKey, X25519Secret};
use tracing::debug;

/// Root key derivation: `(root, chain) = KDF(input, salt, info)`.
///
/// At session establishment `salt` is the raw identity-to-identity secret;
/// afterwards it is the current root key.
pub(crate) fn derive_root(
    input: &[u8],
    salt: &[u8],
    info: &[u8],
) -> Result<(RootKey, ChainKey), Error> {
    let (root_key, chain_key) = kdf(input, salt, info)?;
    Ok((RootKey::new(root_key), ChainKey::new(chain_key)))
}

/// One Diffie-Hellman ratchet step against the peer's ratchet key.
pub(crate) fn dh_ratchet(
    own_secret: &X25519Secret,
    peer_public: &X25519PublicKey,
    root_key: &RootKey,
    info: &[u8],
) -> Result<(RootKey, ChainKey), Error> {
    let dh_output = own_secret.dh(peer_public);
    derive_root(dh_output.as_bytes(), root_key.as_bytes(), info)
}

impl RatchetState {
    /// Handles a sender ratchet key that has not been observed before.
    ///
    /// Snapshots the current receiving chain under the previous sender key,
    /// ratchets the receiving chain against the new key, replaces the own
    /// ratchet key pair and ratchets the sending chain with it. Both
    /// directions turn once per newly observed key, not per message.
    pub(crate) fn ratchet(&mut self, sender_key: &X25519PublicKey, info: &[u8]) -> Result<(), Error> {
        if let (Some(previous_key), Some(chain)) =
            (self.last_sender_key, self.receiving_chain.clone())
        {
            self.superseded_chains.insert(&previous_key, chain);
        }

        let (root_key, receiving_chain) =
            dh_ratchet(&self.ratchet_key, sender_key, &self.root_key, info)?;

        let ratchet_key = X25519Secret::generate()?;
        let (root_key, sending_chain) = dh_ratchet(&ratchet_key, sender_key, &root_key, info)?;

        if self.initial_receiving_chain.is_none() {
            self.initial_receiving_chain = Some(receiving_chain.clone());
        }

        self.root_key = root_key;
        self.receiving_chain = Some(receiving_chain);
        self.ratchet_key = ratchet_key;
        self.sending_chain = sending_chain;
        self.observe(sender_key);

        debug!(
            sender_key = %sender_key.fingerprint(),
            own_key = %self.ratchet_key.public_key().fingerprint(),
            "DH ratchet step"
        );

        Ok(())
    }
}
