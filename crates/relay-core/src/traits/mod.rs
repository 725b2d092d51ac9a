//! Collaborator traits (ports)
//!
//! The relay engine talks to the chat platform and the health surface only
//! through these traits. The binary provides the real implementations; tests
//! substitute recording fakes.

mod ports;

pub use ports::{ChannelInfo, ChatGateway, GatewayResult, HealthSink, NoopHealth};
