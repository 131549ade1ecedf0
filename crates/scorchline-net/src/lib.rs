pub mod client;
pub mod transport;

pub use client::NetworkClient;
pub use transport::{ChannelTransport, RelayTransport, TransportError};
