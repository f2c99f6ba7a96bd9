#[macro_use]
extern crate afl;
use escrowed_ratchet::{Message, MessageHeader};

fn main() {
    fuzz!(|data: &[u8]| {
        let _ = Message::from_bytes(data);
        let _ = MessageHeader::try_from(data);
    });
}
