use crate::config::MessengerConfig;
use crate::ratchet::{RatchetState, derive_root, dh_ratchet};
use crate::{Error, IdentityKey, X25519PublicKey, X25519Secret};
use tracing::debug;

/// Bootstraps a session for the party that sends first.
///
/// Only a sending chain exists afterwards; the receiving chain appears with
/// the first DH ratchet triggered by the peer's reply.
pub(crate) fn establish_as_sender(
    identity: &IdentityKey,
    peer_identity_key: &X25519PublicKey,
    config: &MessengerConfig,
) -> Result<RatchetState, Error> {
    let raw_root_secret = identity.dh(peer_identity_key);

    let ratchet_key = X25519Secret::generate()?;
    let kdf_input = ratchet_key.dh(peer_identity_key);
    let (root_key, sending_chain) = derive_root(
        kdf_input.as_bytes(),
        raw_root_secret.as_bytes(),
        &config.kdf_info,
    )?;

    debug!(
        own_key = %ratchet_key.public_key().fingerprint(),
        "session established as sender"
    );

    Ok(RatchetState::new(
        root_key,
        ratchet_key,
        sending_chain,
        None,
        config.max_superseded_chains,
    ))
}

/// Bootstraps a session from the first message of a peer.
///
/// Derives the receiving chain that matches the sender's first chain, then
/// immediately ratchets with a fresh own key pair to obtain an independent
/// sending chain.
pub(crate) fn establish_as_receiver(
    identity: &IdentityKey,
    peer_identity_key: &X25519PublicKey,
    sender_ratchet_key: &X25519PublicKey,
    config: &MessengerConfig,
) -> Result<RatchetState, Error> {
    let raw_root_secret = identity.dh(peer_identity_key);
    let kdf_input = identity.dh(sender_ratchet_key);
    let (root_key, receiving_chain) = derive_root(
        kdf_input.as_bytes(),
        raw_root_secret.as_bytes(),
        &config.kdf_info,
    )?;

    let ratchet_key = X25519Secret::generate()?;
    let (root_key, sending_chain) =
        dh_ratchet(&ratchet_key, sender_ratchet_key, &root_key, &config.kdf_info)?;

    debug!(
        sender_key = %sender_ratchet_key.fingerprint(),
        own_key = %ratchet_key.public_key().fingerprint(),
        "session established as receiver"
    );

    let mut state = RatchetState::new(
        root_key,
        ratchet_key,
        sending_chain,
        Some(receiving_chain),
        config.max_superseded_chains,
    );
    state.observe(sender_ratchet_key);

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receiver_chain_matches_sender_chain() {
        let config = MessengerConfig::default();
        let alice = IdentityKey::new().unwrap();
        let bob = IdentityKey::new().unwrap();

        let alice_state = establish_as_sender(&alice, &bob.public_key(), &config).unwrap();
        let alice_ratchet_key = alice_state.ratchet_key.public_key();
        let bob_state =
            establish_as_receiver(&bob, &alice.public_key(), &alice_ratchet_key, &config).unwrap();

        let (_, sent_key) = alice_state.sending_chain.step().unwrap();
        let (_, received_key) = bob_state
            .receiving_chain
            .as_ref()
            .unwrap()
            .step()
            .unwrap();
        assert!(sent_key == received_key);

        assert!(alice_state.receiving_chain.is_none());
        assert!(bob_state.has_observed(&alice_ratchet_key));
        assert!(!alice_state.has_observed(&bob_state.ratchet_key.public_key()));
    }

    #[test]
    fn test_receiver_sending_chain_matches_sender_ratchet() {
        let config = MessengerConfig::default();
        let alice = IdentityKey::new().unwrap();
        let bob = IdentityKey::new().unwrap();

        let mut alice_state = establish_as_sender(&alice, &bob.public_key(), &config).unwrap();
        let bob_state = establish_as_receiver(
            &bob,
            &alice.public_key(),
            &alice_state.ratchet_key.public_key(),
            &config,
        )
        .unwrap();

        alice_state
            .ratchet(&bob_state.ratchet_key.public_key(), &config.kdf_info)
            .unwrap();

        let (_, bob_sent) = bob_state.sending_chain.step().unwrap();
        let (_, alice_received) = alice_state
            .receiving_chain
            .as_ref()
            .unwrap()
            .step()
            .unwrap();
        assert!(bob_sent == alice_received);
    }

    #[test]
    fn test_different_kdf_info_breaks_agreement() {
        let alice = IdentityKey::new().unwrap();
        let bob = IdentityKey::new().unwrap();
        let other = MessengerConfig {
            kdf_info: b"other-label".to_vec(),
            ..MessengerConfig::default()
        };

        let alice_state =
            establish_as_sender(&alice, &bob.public_key(), &MessengerConfig::default()).unwrap();
        let bob_state = establish_as_receiver(
            &bob,
            &alice.public_key(),
            &alice_state.ratchet_key.public_key(),
            &other,
        )
        .unwrap();

        let (_, sent_key) = alice_state.sending_chain.step().unwrap();
        let (_, received_key) = bob_state
            .receiving_chain
            .as_ref()
            .unwrap()
            .step()
            .unwrap();
        assert!(sent_key != received_key);
    }
}
