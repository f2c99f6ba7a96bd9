//! Stateless primitives shared by the ratchet, the payload codec and escrow.

use crate::Error;
use crate::identity::IV_SIZE;
use aes_gcm_siv::aead::{Aead, Payload};
use aes_gcm_siv::{Aes256GcmSiv, KeyInit, Nonce};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroize;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 of `label` under `key`, used as a fresh 32-byte symmetric key.
pub(crate) fn hmac_derive(key: &[u8], label: &[u8]) -> Result<[u8; 32], Error> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|_| Error::Crypto("HMAC initialization failed".to_string()))?;
    mac.update(label);

    let mut output = [0u8; 32];
    output.copy_from_slice(&mac.finalize().into_bytes());
    Ok(output)
}

/// Two-output HKDF-SHA256: `input` is the key material, `salt` the secret salt.
pub(crate) fn kdf(input: &[u8], salt: &[u8], info: &[u8]) -> Result<([u8; 32], [u8; 32]), Error> {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), input);

    let mut okm = [0u8; 64];
    hkdf.expand(info, &mut okm)
        .map_err(|_| Error::Crypto("HKDF expansion failed".to_string()))?;

    let mut first = [0u8; 32];
    let mut second = [0u8; 32];
    first.copy_from_slice(&okm[0..32]);
    second.copy_from_slice(&okm[32..64]);
    okm.zeroize();

    Ok((first, second))
}

pub(crate) fn aead_seal(
    key: &[u8; 32],
    iv: &[u8; IV_SIZE],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, Error> {
    let cipher = Aes256GcmSiv::new(aes_gcm_siv::Key::<Aes256GcmSiv>::from_slice(key));

    Ok(cipher.encrypt(
        Nonce::from_slice(iv),
        Payload {
            msg: plaintext,
            aad,
        },
    )?)
}

pub(crate) fn aead_open(
    key: &[u8; 32],
    iv: &[u8; IV_SIZE],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, Error> {
    let cipher = Aes256GcmSiv::new(aes_gcm_siv::Key::<Aes256GcmSiv>::from_slice(key));

    Ok(cipher.decrypt(
        Nonce::from_slice(iv),
        Payload {
            msg: ciphertext,
            aad,
        },
    )?)
}
