//! Per-peer append-only chat chain store: inbound/outbound logs, last
//! observed signatures, bounded pending-ack queues, and the sliding window
//! of recently accepted inbound messages used to populate outbound
//! `last_seen` lists.
//!
//! The whole store lives behind one [`parking_lot::Mutex`]. Every mutating
//! operation here does one thing and returns quickly, so a single lock
//! costs nothing in practice: "append to the log, update last_signature,
//! evict from the sliding window" happens under one acquisition, so the
//! store is never observed half-updated.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use rsa::RsaPublicKey;

use crate::config::ChatCoreConfig;
use crate::error::ChatError;
use crate::ids::PlayerId;
use crate::message::{MessageRef, SignedMessage};

/// State tracked for a single sender — a remote peer, or the local identity
/// itself (outbound messages update the local identity's own entry so its
/// `previous_signature` linkage can be read back the same way a peer's is).
#[derive(Default)]
struct PeerState {
    public_key: Option<RsaPublicKey>,
    last_signature: Option<Box<[u8]>>,
    pending_acks: VecDeque<MessageRef>,
}

struct ChainState {
    outbound_log: Vec<SignedMessage>,
    inbound_log: Vec<SignedMessage>,
    senders: HashMap<PlayerId, PeerState>,
    recent_inbound: VecDeque<MessageRef>,
}

/// The chain store: single source of truth for message ordering decisions.
/// The signer and verifier are stateless over it.
pub struct ChatChainStore {
    config: ChatCoreConfig,
    state: Mutex<ChainState>,
}

impl ChatChainStore {
    /// Creates an empty store with the given tunables.
    #[must_use]
    pub fn new(config: ChatCoreConfig) -> Self {
        Self {
            config,
            state: Mutex::new(ChainState {
                outbound_log: Vec::new(),
                inbound_log: Vec::new(),
                senders: HashMap::new(),
                recent_inbound: VecDeque::with_capacity(config.recent_inbound_capacity),
            }),
        }
    }

    /// Appends an outbound message to the log and updates the sender's
    /// (our own identity's) `last_signature`.
    pub fn add_outbound(&self, msg: SignedMessage) {
        let mut state = self.state.lock();
        state
            .senders
            .entry(msg.sender)
            .or_default()
            .last_signature = Some(msg.signature.clone());
        log::debug!(
            "add_outbound: sender={} index={} sig_len={}",
            msg.sender,
            msg.index,
            msg.signature.len()
        );
        state.outbound_log.push(msg);
    }

    /// Appends an inbound message to the log, updates
    /// `last_signature[msg.sender]`, and pushes it into the `recent_inbound`
    /// sliding window (evicting the oldest entry once at capacity).
    pub fn add_inbound(&self, msg: SignedMessage) {
        let mut state = self.state.lock();
        let capacity = self.config.recent_inbound_capacity;

        state
            .senders
            .entry(msg.sender)
            .or_default()
            .last_signature = Some(msg.signature.clone());

        if state.recent_inbound.len() >= capacity {
            state.recent_inbound.pop_front();
        }
        state
            .recent_inbound
            .push_back(MessageRef::new(msg.index, msg.signature.clone()));

        log::debug!(
            "add_inbound: sender={} index={} recent_inbound_len={}",
            msg.sender,
            msg.index,
            state.recent_inbound.len()
        );
        state.inbound_log.push(msg);
    }

    /// The tunables this store was built with.
    #[must_use]
    pub fn config(&self) -> ChatCoreConfig {
        self.config
    }

    /// Returns up to `last_seen_capacity` of the most recently accepted
    /// inbound messages, oldest first, suitable for an outbound message's
    /// `last_seen` field.
    #[must_use]
    pub fn recent_inbound(&self) -> Vec<MessageRef> {
        self.state.lock().recent_inbound.iter().cloned().collect()
    }

    /// Enqueues `msg` as pending acknowledgement for `peer`. Always records
    /// the message ("does NOT silently drop"); returns
    /// [`ChatError::OverflowKick`] if the queue now exceeds the configured
    /// cap, signalling that the caller should disconnect `peer`.
    pub fn add_pending_ack(&self, peer: PlayerId, msg: MessageRef) -> Result<(), ChatError> {
        let mut state = self.state.lock();
        let entry = state.senders.entry(peer).or_default();
        entry.pending_acks.push_back(msg);
        let count = entry.pending_acks.len();

        log::debug!("add_pending_ack: peer={peer} pending_count={count}");

        if count > self.config.max_pending_ack_per_player {
            log::warn!(
                "pending-ack overflow for peer {peer}: {count} > {}",
                self.config.max_pending_ack_per_player
            );
            return Err(ChatError::OverflowKick(peer));
        }
        Ok(())
    }

    /// Removes every pending-ack entry for `peer` whose signature appears
    /// in `signatures`. Entries not found are ignored; calling this twice
    /// with the same signatures is a no-op the second time.
    pub fn acknowledge(&self, peer: PlayerId, signatures: &[&[u8]]) {
        let mut state = self.state.lock();
        if let Some(entry) = state.senders.get_mut(&peer) {
            entry
                .pending_acks
                .retain(|pending| !signatures.iter().any(|sig| *sig == &*pending.signature));
        }
    }

    /// Number of pending, unacknowledged messages tracked for `peer`.
    #[must_use]
    pub fn pending_ack_count(&self, peer: PlayerId) -> u32 {
        self.state
            .lock()
            .senders
            .get(&peer)
            .map_or(0, |entry| entry.pending_acks.len() as u32)
    }

    /// `true` once `peer`'s pending-ack queue exceeds the configured cap.
    #[must_use]
    pub fn should_kick_for_pending_acks(&self, peer: PlayerId) -> bool {
        self.pending_ack_count(peer) as usize > self.config.max_pending_ack_per_player
    }

    /// The most recent accepted signature from `peer` (or our own most
    /// recent outbound signature, if `peer` is our own identity), if any.
    #[must_use]
    pub fn last_signature(&self, peer: PlayerId) -> Option<Box<[u8]>> {
        self.state
            .lock()
            .senders
            .get(&peer)
            .and_then(|entry| entry.last_signature.clone())
    }

    /// `peer`'s advertised chat public key, if their session has been
    /// announced.
    #[must_use]
    pub fn player_public_key(&self, peer: PlayerId) -> Option<RsaPublicKey> {
        self.state
            .lock()
            .senders
            .get(&peer)
            .and_then(|entry| entry.public_key.clone())
    }

    /// Records `peer`'s advertised chat public key.
    pub fn set_player_public_key(&self, peer: PlayerId, key: RsaPublicKey) {
        self.state.lock().senders.entry(peer).or_default().public_key = Some(key);
    }

    /// Resets per-session state for a server transfer: clears every peer's
    /// pending-ack queue and last_signature, and clears `recent_inbound`.
    /// Public keys are left in place — they describe the remote peer's
    /// identity, not this session.
    pub fn reset_for_transfer(&self) {
        let mut state = self.state.lock();
        state.outbound_log.clear();
        state.inbound_log.clear();
        state.recent_inbound.clear();
        for entry in state.senders.values_mut() {
            entry.last_signature = None;
            entry.pending_acks.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn peer() -> PlayerId {
        PlayerId(Uuid::new_v4())
    }

    fn msg_ref(index: u32, sig: u8) -> MessageRef {
        MessageRef::new(index, vec![sig; 4])
    }

    #[test]
    fn pending_ack_overflow_kicks_after_21st() {
        let store = ChatChainStore::new(ChatCoreConfig::default());
        let p = peer();

        for i in 0..20 {
            assert!(store.add_pending_ack(p, msg_ref(i, i as u8)).is_ok());
        }
        assert!(!store.should_kick_for_pending_acks(p));

        let result = store.add_pending_ack(p, msg_ref(20, 20));
        assert!(matches!(result, Err(ChatError::OverflowKick(_))));
        assert!(store.should_kick_for_pending_acks(p));
    }

    #[test]
    fn acknowledge_is_idempotent() {
        let store = ChatChainStore::new(ChatCoreConfig::default());
        let p = peer();
        store.add_pending_ack(p, msg_ref(0, 7)).unwrap();
        store.add_pending_ack(p, msg_ref(1, 9)).unwrap();

        store.acknowledge(p, &[&[7u8; 4]]);
        assert_eq!(store.pending_ack_count(p), 1);

        store.acknowledge(p, &[&[7u8; 4]]);
        assert_eq!(store.pending_ack_count(p), 1);
    }

    #[test]
    fn acknowledge_ignores_unknown_signatures() {
        let store = ChatChainStore::new(ChatCoreConfig::default());
        let p = peer();
        store.add_pending_ack(p, msg_ref(0, 1)).unwrap();
        store.acknowledge(p, &[&[0xffu8; 4]]);
        assert_eq!(store.pending_ack_count(p), 1);
    }

    #[test]
    fn recent_inbound_evicts_oldest_at_capacity() {
        let config = ChatCoreConfig {
            recent_inbound_capacity: 2,
            ..ChatCoreConfig::default()
        };
        let store = ChatChainStore::new(config);
        let sender = peer();

        for i in 0..3u32 {
            let msg = SignedMessage {
                sender,
                session_id: crate::ids::SessionId::generate(),
                index: i,
                timestamp: 0,
                salt: 0,
                message_hash: [0; 32],
                signature: vec![i as u8; 4].into_boxed_slice(),
                last_seen: vec![],
                plaintext: "hi".to_string(),
                previous_signature: None,
            };
            store.add_inbound(msg);
        }

        let recent = store.recent_inbound();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].index, 1);
        assert_eq!(recent[1].index, 2);
    }
}
