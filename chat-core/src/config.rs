//! Tunables for the chat core.
//!
//! These are fixed by the wire format's compatibility requirements;
//! [`ChatCoreConfig::default`] returns exactly those values. The struct
//! exists so integrators and tests can exercise non-default bounds without
//! patching constants, not because the wire format is actually configurable
//! in production.

use std::time::Duration;

/// Signature version embedded as the first field of every chat-message
/// preimage. Fixed by the wire format; never changes.
pub const SIGNATURE_VERSION: i32 = 1;

/// Maximum number of entries in a message's `last_seen` list.
pub const LAST_SEEN_CAPACITY: usize = 20;

/// Pending-acknowledgement cap per peer; exceeding it signals a kick.
pub const MAX_PENDING_ACK_PER_PLAYER: usize = 20;

/// Size of the `recent_inbound` sliding window used to populate outbound
/// `last_seen` lists.
pub const RECENT_INBOUND_CAPACITY: usize = 20;

/// Runtime-tunable knobs for a [`crate::chain_store::ChatChainStore`].
#[derive(Clone, Copy, Debug)]
pub struct ChatCoreConfig {
    /// Cap on `last_seen` entries placed on outbound messages.
    pub last_seen_capacity: usize,
    /// Cap on pending acknowledgements tracked per peer before a kick is
    /// signalled.
    pub max_pending_ack_per_player: usize,
    /// Cap on the sliding window of recently accepted inbound messages.
    pub recent_inbound_capacity: usize,
    /// How long a freshly generated session's key is advertised as valid.
    pub session_expiry: Duration,
}

impl Default for ChatCoreConfig {
    fn default() -> Self {
        Self {
            last_seen_capacity: LAST_SEEN_CAPACITY,
            max_pending_ack_per_player: MAX_PENDING_ACK_PER_PLAYER,
            recent_inbound_capacity: RECENT_INBOUND_CAPACITY,
            session_expiry: Duration::from_secs(24 * 60 * 60),
        }
    }
}
