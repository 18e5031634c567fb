//! kvgrid-store - WebSocket client for the store bridge
//!
//! Consumes the bridge's push channel (batches of `[key, value]` pairs) and
//! provides the fire-and-forget outbound update channel. The socket is owned
//! by a background Tokio task; the rest of the application talks to it only
//! through channels.

pub mod client;
pub mod protocol;

pub use client::{ConnectionState, StoreClient, StoreEvent, UpdateHandle};
pub use protocol::{encode_update, parse_push, RawPair};
