use tokio::sync::mpsc;

#[derive(Debug)]
pub enum TransportError {
    NotConnected,
    SendFailed(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::SendFailed(e) => write!(f, "send failed: {e}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// The wire-level boundary to the relay. Implementations buffer inbound
/// frames until the simulation drains them at the start of a tick; sends
/// are fire-and-forget and never block.
pub trait RelayTransport {
    /// (Re)open the connection. Safe to call repeatedly.
    fn connect(&mut self, url: &str) -> Result<(), TransportError>;

    /// Queue one frame for delivery. Fails fast when disconnected.
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Take every frame that arrived since the last drain.
    fn drain_messages(&mut self) -> Vec<Vec<u8>>;

    fn is_connected(&self) -> bool;
}

/// In-process transport over unbounded channels. Stands in for a WebSocket
/// during tests and local loopback sessions; the far ends of the channels
/// act as the relay.
pub struct ChannelTransport {
    outbound_tx: mpsc::UnboundedSender<Vec<u8>>,
    inbound_rx: mpsc::UnboundedReceiver<Vec<u8>>,
    connected: bool,
}

impl ChannelTransport {
    /// Build a transport plus the relay-side handles: a sender that injects
    /// inbound frames and a receiver observing outbound frames.
    pub fn pair() -> (
        Self,
        mpsc::UnboundedSender<Vec<u8>>,
        mpsc::UnboundedReceiver<Vec<u8>>,
    ) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        (
            Self {
                outbound_tx,
                inbound_rx,
                connected: true,
            },
            inbound_tx,
            outbound_rx,
        )
    }

    /// Simulate a dropped connection.
    pub fn disconnect(&mut self) {
        self.connected = false;
    }
}

impl RelayTransport for ChannelTransport {
    fn connect(&mut self, _url: &str) -> Result<(), TransportError> {
        self.connected = true;
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.outbound_tx
            .send(data.to_vec())
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    fn drain_messages(&mut self) -> Vec<Vec<u8>> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.inbound_rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_flow_both_ways() {
        let (mut transport, inbound_tx, mut outbound_rx) = ChannelTransport::pair();

        inbound_tx.send(b"hello".to_vec()).unwrap();
        inbound_tx.send(b"world".to_vec()).unwrap();
        assert_eq!(transport.drain_messages(), vec![b"hello".to_vec(), b"world".to_vec()]);
        assert!(transport.drain_messages().is_empty(), "drain takes everything");

        transport.send(b"out").unwrap();
        assert_eq!(outbound_rx.try_recv().unwrap(), b"out".to_vec());
    }

    #[test]
    fn send_fails_when_disconnected() {
        let (mut transport, _inbound_tx, _outbound_rx) = ChannelTransport::pair();
        transport.disconnect();
        assert!(!transport.is_connected());
        assert!(matches!(
            transport.send(b"x"),
            Err(TransportError::NotConnected)
        ));
        transport.connect("loopback").unwrap();
        assert!(transport.is_connected());
    }
}
