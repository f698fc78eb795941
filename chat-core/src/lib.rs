//! Core of a Minecraft: Java Edition signed-chat client: identity/session
//! storage, the per-peer chat chain store, signing and verification of
//! chat messages, and the session-data handshake payload.
//!
//! This crate does not dial a server, negotiate encryption, decode packets,
//! or talk to Mojang/Azure — those are external collaborators. It consumes
//! a keypair and a player id, and produces/consumes fully-formed
//! [`message::SignedMessage`] records.

pub mod chain_store;
pub mod config;
pub mod error;
pub mod identity;
pub mod ids;
pub mod message;
pub mod session_data;
pub mod signer;
pub mod verifier;

pub use chain_store::ChatChainStore;
pub use config::ChatCoreConfig;
pub use error::ChatError;
pub use identity::IdentityStore;
pub use ids::{PlayerId, SessionId};
pub use message::{chat_header_digest, create_chat_header, ChatPreimage, MessageRef, SignedMessage};
pub use session_data::{ChatSessionData, SessionDataBuilder};
pub use signer::ChatSigner;
pub use verifier::ChatVerifier;
