//! Session tokens and their signed cookie form
//!
//! A token is a random UUID. The cookie carries `<token>.<signature>`
//! where the signature is hex HMAC-SHA256 of the token under the server
//! secret, so clients cannot pick or forge another session's directory.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Opaque, unguessable session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(Uuid);

impl SessionToken {
    /// Mint a fresh random token
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the textual form; `None` if it is not well-formed
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }

    /// Directory name under the storage base
    pub fn dir_name(&self) -> String {
        self.0.simple().to_string()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Signs and verifies cookie values
#[derive(Clone)]
pub struct SessionSigner {
    key: Vec<u8>,
}

impl fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}

impl SessionSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length
        HmacSha256::new_from_slice(&self.key).expect("HMAC key of any size")
    }

    /// Cookie value for a token
    pub fn sign(&self, token: &SessionToken) -> String {
        let mut mac = self.mac();
        mac.update(token.to_string().as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        format!("{}.{}", token, signature)
    }

    /// Recover the token from a cookie value if its signature checks out
    pub fn verify(&self, cookie_value: &str) -> Option<SessionToken> {
        let (raw_token, signature) = cookie_value.split_once('.')?;
        let token = SessionToken::parse(raw_token)?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac();
        mac.update(token.to_string().as_bytes());
        mac.verify_slice(&signature).ok()?;

        Some(token)
    }
}
