//! Channel routing between the world server and the chat platform

mod router;

pub use router::ChannelRouter;
