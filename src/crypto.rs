use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;

/// Curve prefix used in the textual form of keys.
pub const KEY_PREFIX: &str = "ed25519:";

#[derive(Clone)]
pub struct KeyPair {
    pub signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new Ed25519 keypair
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        KeyPair {
            signing_key: SigningKey::generate(&mut csprng),
        }
    }

    pub fn from_seed(seed: [u8; 32]) -> Self {
        KeyPair {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Restore from the `ed25519:<hex>` form produced by `secret_key_string`
    pub fn from_secret_string(s: &str) -> Result<Self, String> {
        let hex_part = s
            .strip_prefix(KEY_PREFIX)
            .ok_or_else(|| format!("Secret key must start with '{}'", KEY_PREFIX))?;
        let bytes = hex::decode(hex_part).map_err(|e| format!("Invalid secret key: {}", e))?;
        let seed: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| format!("Secret key must be 32 bytes, got {}", bytes.len()))?;
        Ok(Self::from_seed(seed))
    }

    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn public_key_string(&self) -> String {
        format!("{}{}", KEY_PREFIX, hex::encode(self.public_key().to_bytes()))
    }

    pub fn secret_key_string(&self) -> String {
        format!("{}{}", KEY_PREFIX, hex::encode(self.signing_key.to_bytes()))
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key_string())
            .finish_non_exhaustive()
    }
}

/// Source of fresh key pairs for accounts that do not bring their own key.
pub trait KeyPairGenerator: Send + Sync {
    fn generate(&self) -> KeyPair;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OsKeyPairGenerator;

impl KeyPairGenerator for OsKeyPairGenerator {
    fn generate(&self) -> KeyPair {
        KeyPair::generate()
    }
}
