//! httpsms: Message bounded context.
//!
//! Accepts outgoing messages from the API, hands them to the owner's phone,
//! and tracks the status the phone reports back (sending, sent, delivered,
//! failed). Inbound SMS received by the phone are stored here too.

pub mod application;
pub mod domain;
