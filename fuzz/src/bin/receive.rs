#[macro_use]
extern crate afl;
use escrowed_ratchet::{CertificateAuthority, EscrowAuthority, Message, Messenger};

fn main() {
    let authority = CertificateAuthority::new().unwrap();
    let escrow = EscrowAuthority::new().unwrap();

    let mut alice = Messenger::new(authority.verifying_key(), escrow.public_key(), None);
    let mut bob = Messenger::new(authority.verifying_key(), escrow.public_key(), None);
    let alice_certificate = alice.issue_certificate("alice").unwrap();
    let bob_certificate = bob.issue_certificate("bob").unwrap();
    alice
        .accept_certificate(bob_certificate.clone(), &authority.sign(&bob_certificate))
        .unwrap();
    bob.accept_certificate(alice_certificate.clone(), &authority.sign(&alice_certificate))
        .unwrap();

    let hello = alice.send("bob", b"hello").unwrap();
    bob.receive("alice", &hello).unwrap();

    fuzz!(|data: &[u8]| {
        if let Ok(message) = Message::from_bytes(data) {
            let _ = bob.receive("alice", &message);
        }
    });
}
