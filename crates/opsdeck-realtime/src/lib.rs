//! # opsdeck-realtime
//!
//! Realtime push hub for Opsdeck. Maintains live WebSocket connections
//! keyed by user identity and fans out count/refresh/message events.
//! Delivery is at-most-once and best effort: send failures are dropped,
//! never escalated to the originating write.

pub mod connection;
pub mod hub;
pub mod message;

pub use connection::handle::{ConnectionHandle, ConnectionId};
pub use connection::pool::ConnectionPool;
pub use hub::PushHub;
pub use message::OutboundMessage;
