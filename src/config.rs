/// Tunables for a [`Messenger`](crate::Messenger) and every session it owns.
#[derive(Clone, Debug)]
pub struct MessengerConfig {
    /// Message keys tried from the initial receiving chain when a message arrives out of order.
    pub same_chain_window: u32,
    /// Message keys tried from a superseded chain snapshot.
    pub superseded_chain_window: u32,
    /// Superseded chain snapshots kept per peer; the oldest is evicted first.
    pub max_superseded_chains: usize,
    /// Accepted message identifiers remembered per peer for replay detection.
    pub max_seen_messages: usize,
    /// Context label of the root key derivation. Both parties must agree on it.
    pub kdf_info: Vec<u8>,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            same_chain_window: 10,
            superseded_chain_window: 5,
            max_superseded_chains: 5,
            max_seen_messages: 4096,
            kdf_info: b"ratchet-salt".to_vec(),
        }
    }
}
