//! Wire protocol for Lasermaze.
//!
//! This crate defines the "language" that the timer clients and the server
//! speak over the real-time channel:
//!
//! - **Types** ([`InterruptEvent`], [`ClientCommand`], [`ServerEvent`]):
//!   the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   converted to/from wire text.
//! - **Errors** ([`ProtocolError`]): what can go wrong while encoding or
//!   decoding.
//!
//! The protocol layer sits between the channel (raw frames) and the mission
//! engine (session state). It doesn't know about connections or timers;
//! it only knows message shapes.

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{unix_ms, ClientCommand, InterruptEvent, ServerEvent};
