use crate::ratchet::chain::{ChainKey, RootKey};
use crate::{X25519PublicKey, X25519Secret};
use std::collections::{HashSet, VecDeque};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Chain key snapshots of sender ratchet keys that have been superseded.
///
/// Capacity-bounded; inserting past capacity evicts the oldest snapshot.
#[derive(Clone)]
pub(crate) struct SupersededChains {
    entries: VecDeque<([u8; 32], ChainKey)>,
    capacity: usize,
}

impl SupersededChains {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn insert(&mut self, sender_key: &X25519PublicKey, chain: ChainKey) {
        self.entries.retain(|(key, _)| key != sender_key.as_bytes());
        self.entries.push_back((sender_key.to_bytes(), chain));

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub(crate) fn get(&self, sender_key: &X25519PublicKey) -> Option<&ChainKey> {
        self.entries
            .iter()
            .find(|(key, _)| key == sender_key.as_bytes())
            .map(|(_, chain)| chain)
    }
}

/// Cryptographic state of one established conversation.
#[derive(Clone)]
pub(crate) struct RatchetState {
    pub(crate) root_key: RootKey,
    /// Own ratchet key pair currently advertised to the peer.
    pub(crate) ratchet_key: X25519Secret,

    pub(crate) sending_chain: ChainKey,
    pub(crate) receiving_chain: Option<ChainKey>,
    /// First receiving chain of the session, before any step.
    pub(crate) initial_receiving_chain: Option<ChainKey>,

    pub(crate) last_sender_key: Option<X25519PublicKey>,
    /// Every sender key seen in this session. Not bounded: forgetting a key
    /// would let a late message under it trigger a second ratchet.
    pub(crate) observed_sender_keys: HashSet<[u8; 32]>,
    pub(crate) superseded_chains: SupersededChains,
}

impl RatchetState {
    pub(crate) fn new(
        root_key: RootKey,
        ratchet_key: X25519Secret,
        sending_chain: ChainKey,
        receiving_chain: Option<ChainKey>,
        max_superseded_chains: usize,
    ) -> Self {
        Self {
            root_key,
            ratchet_key,
            sending_chain,
            initial_receiving_chain: receiving_chain.clone(),
            receiving_chain,
            last_sender_key: None,
            observed_sender_keys: HashSet::new(),
            superseded_chains: SupersededChains::new(max_superseded_chains),
        }
    }

    pub(crate) fn has_observed(&self, sender_key: &X25519PublicKey) -> bool {
        self.observed_sender_keys.contains(sender_key.as_bytes())
    }

    pub(crate) fn observe(&mut self, sender_key: &X25519PublicKey) {
        self.observed_sender_keys.insert(sender_key.to_bytes());
        self.last_sender_key = Some(*sender_key);
    }
}

impl Zeroize for RatchetState {
    fn zeroize(&mut self) {
        self.root_key.zeroize();
        self.ratchet_key.zeroize();
        self.sending_chain.zeroize();
        self.receiving_chain.as_mut().map(|chain| chain.zeroize());
        self.initial_receiving_chain
            .as_mut()
            .map(|chain| chain.zeroize());
        self.superseded_chains.entries.clear();
    }
}

impl ZeroizeOnDrop for RatchetState {}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> X25519PublicKey {
        X25519PublicKey::from([byte; 32])
    }

    #[test]
    fn test_superseded_chains_evict_oldest() {
        let mut chains = SupersededChains::new(2);
        chains.insert(&key(1), ChainKey::new([1u8; 32]));
        chains.insert(&key(2), ChainKey::new([2u8; 32]));
        chains.insert(&key(3), ChainKey::new([3u8; 32]));

        assert!(chains.get(&key(1)).is_none());
        assert!(chains.get(&key(2)).is_some());
        assert!(chains.get(&key(3)).is_some());
    }

    #[test]
    fn test_superseded_chains_replace_same_key() {
        let mut chains = SupersededChains::new(2);
        chains.insert(&key(1), ChainKey::new([1u8; 32]));
        chains.insert(&key(2), ChainKey::new([2u8; 32]));
        chains.insert(&key(1), ChainKey::new([9u8; 32]));
        chains.insert(&key(3), ChainKey::new([3u8; 32]));

        // Key 1 was refreshed, so key 2 is the oldest entry.
        assert!(chains.get(&key(2)).is_none());
        assert!(chains.get(&key(1)).is_some());
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut chains = SupersededChains::new(0);
        chains.insert(&key(1), ChainKey::new([1u8; 32]));
        assert!(chains.get(&key(1)).is_none());
    }

    #[test]
    fn test_zeroize_wipes_state() {
        fn assert_zeroize_on_drop<T: ZeroizeOnDrop>() {}
        assert_zeroize_on_drop::<RatchetState>();

        let mut state = RatchetState::new(
            RootKey::new([1u8; 32]),
            X25519Secret::generate().unwrap(),
            ChainKey::new([2u8; 32]),
            Some(ChainKey::new([3u8; 32])),
            2,
        );
        state
            .superseded_chains
            .insert(&key(1), ChainKey::new([4u8; 32]));

        state.zeroize();
        assert_eq!(state.root_key.as_bytes(), &[0u8; 32]);
        assert!(state.superseded_chains.entries.is_empty());
    }
}
