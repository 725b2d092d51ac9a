//! World server protocol definitions
//!
//! One JSON object per line in both directions.

mod frames;

pub use frames::{
    InboundWorldFrame, OutboundWorldFrame, AUTH_CHANNEL, CONTROL_NAME, HEARTBEAT_CHANNEL,
    HEARTBEAT_MESSAGE,
};
