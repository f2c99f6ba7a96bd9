use crate::identity::generate_random_seed;
use crate::proto::CertificateProto;
use crate::{Error, X25519PublicKey};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use prost::Message as _;
use zeroize::Zeroize;

/// Binds a username to its long-term X25519 identity key.
///
/// A certificate is only trusted once an authority signature over
/// [`Certificate::to_bytes`] has been checked with [`verify_certificate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Certificate {
    username: String,
    identity_key: X25519PublicKey,
}

impl Certificate {
    /// Creates an (unsigned) certificate.
    pub fn new(username: &str, identity_key: X25519PublicKey) -> Self {
        Self {
            username: username.to_string(),
            identity_key,
        }
    }

    /// The certified username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The certified identity public key.
    pub fn identity_key(&self) -> X25519PublicKey {
        self.identity_key
    }

    /// Canonical encoding that the authority signs.
    pub fn to_bytes(&self) -> Vec<u8> {
        CertificateProto {
            username: self.username.clone(),
            identity_key: self.identity_key.to_bytes().to_vec(),
        }
        .encode_to_vec()
    }

    /// Decodes a certificate produced by [`Certificate::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let proto = CertificateProto::decode(bytes)
            .map_err(|err| Error::Serde(format!("Failed to decode certificate: {err:?}")))?;

        let identity_key: [u8; 32] = proto
            .identity_key
            .as_slice()
            .try_into()
            .map_err(|_| Error::Serde("Invalid identity key length".to_string()))?;

        Ok(Self {
            username: proto.username,
            identity_key: X25519PublicKey::from(identity_key),
        })
    }
}

/// Checks an authority signature over a certificate.
pub fn verify_certificate(
    authority_key: &VerifyingKey,
    certificate: &Certificate,
    signature: &Signature,
) -> Result<(), Error> {
    authority_key
        .verify_strict(&certificate.to_bytes(), signature)
        .map_err(|err| Error::CertificateInvalid(err.to_string()))
}

/// Ed25519 signer that vouches for username/identity-key bindings.
///
/// The signing key wipes itself on drop.
pub struct CertificateAuthority {
    signing_key: SigningKey,
}

impl CertificateAuthority {
    /// Creates an authority with a random signing key.
    pub fn new() -> Result<Self, Error> {
        let mut seed = generate_random_seed()?;
        let signing_key = SigningKey::from_bytes(&seed);
        seed.zeroize();

        Ok(Self { signing_key })
    }

    /// The key clients pin to verify certificates.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Signs a certificate.
    pub fn sign(&self, certificate: &Certificate) -> Signature {
        self.signing_key.sign(&certificate.to_bytes())
    }

    /// Serializes the signing key.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl From<[u8; 32]> for CertificateAuthority {
    fn from(bytes: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IdentityKey;

    fn certificate(username: &str) -> Certificate {
        Certificate::new(username, IdentityKey::new().unwrap().public_key())
    }

    #[test]
    fn test_signed_certificate_verifies() {
        let authority = CertificateAuthority::new().unwrap();
        let cert = certificate("alice");
        let signature = authority.sign(&cert);

        assert!(verify_certificate(&authority.verifying_key(), &cert, &signature).is_ok());
    }

    #[test]
    fn test_foreign_authority_is_rejected() {
        let authority = CertificateAuthority::new().unwrap();
        let impostor = CertificateAuthority::new().unwrap();
        let cert = certificate("alice");
        let signature = impostor.sign(&cert);

        let result = verify_certificate(&authority.verifying_key(), &cert, &signature);
        assert!(matches!(result, Err(Error::CertificateInvalid(_))));
    }

    #[test]
    fn test_modified_certificate_is_rejected() {
        let authority = CertificateAuthority::new().unwrap();
        let cert = certificate("alice");
        let signature = authority.sign(&cert);

        let renamed = Certificate::new("mallory", cert.identity_key());
        let result = verify_certificate(&authority.verifying_key(), &renamed, &signature);
        assert!(matches!(result, Err(Error::CertificateInvalid(_))));
    }

    #[test]
    fn test_certificate_bytes_round_trip() {
        let cert = certificate("bob");
        let decoded = Certificate::from_bytes(&cert.to_bytes()).unwrap();

        assert_eq!(decoded, cert);
        assert!(Certificate::from_bytes(&[0x12, 0x01, 0x00]).is_err());
    }

    #[test]
    fn test_authority_restored_from_bytes_signs_identically() {
        let authority = CertificateAuthority::new().unwrap();
        let restored = CertificateAuthority::from(authority.to_bytes());
        let cert = certificate("carol");

        assert_eq!(authority.verifying_key(), restored.verifying_key());
        assert_eq!(authority.sign(&cert), restored.sign(&cert));
    }
}
