//! Client
//!
//! Room-level messaging on top of [`roomseal_crypto`]. A [`RoomSession`]
//! knows who is in the room, seals outgoing text for all of them (and for
//! the local identity, so sent messages stay readable in history), and opens
//! incoming payloads one by one.
//!
//! # Components
//!
//! - [`RoomSession`]: local identity plus current participants
//! - [`ReceivedMessage`]: per-message outcome with a display fallback
//! - [`RoomError`]: failures when sending
//!
//! Transport, persistence of the secret key and membership discovery belong
//! to the caller. The session only ever hands out and accepts
//! [`TransportPayload`] strings.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod message;
mod room;

pub use error::RoomError;
pub use message::{NOT_ADDRESSED_PLACEHOLDER, ReceivedMessage, UNREADABLE_PLACEHOLDER};
pub use room::RoomSession;
pub use roomseal_crypto::{KeyPair, OpenedMessage, PublicKey, TransportPayload};
