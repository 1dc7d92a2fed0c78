//! Channel abstraction for message I/O.

pub mod channel;
pub mod cli;
pub mod http;
pub mod manager;

pub use channel::{Channel, IncomingMessage, MessageStream, OutgoingResponse};
pub use cli::CliChannel;
pub use http::chat_routes;
pub use manager::ChannelManager;
