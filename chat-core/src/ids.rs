//! Identifier newtypes used throughout the chat core.

use uuid::Uuid;

/// A player's persistent identifier. Opaque to the core beyond equality and
/// its 16 raw bytes, which are embedded in every signature preimage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// The 16 raw bytes embedded in signature preimages, big-endian.
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 16] {
        self.0.as_u128().to_be_bytes()
    }
}

impl From<Uuid> for PlayerId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// An ephemeral per-session identifier, generated fresh at session start
/// with a cryptographically strong RNG and stable for the session's
/// lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generates a fresh session id using the OS-backed CSPRNG behind
    /// `Uuid::new_v4`.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The 16 raw bytes embedded in signature preimages, big-endian.
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 16] {
        self.0.as_u128().to_be_bytes()
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
