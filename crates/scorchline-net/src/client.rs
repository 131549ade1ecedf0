use scorchline_core::net::messages::{ClientMessage, ServerMessage};
use scorchline_core::net::protocol::{decode_server_message, encode_client_message};

use crate::transport::RelayTransport;

/// Ticks between reconnect attempts after a drop.
pub const RECONNECT_DELAY_TICKS: u32 = 300;

/// The relay client: owns the transport, the codec, and the reconnect
/// policy. One instance is constructed at startup and passed by reference
/// into the session loop; no ambient connection state.
///
/// All sends are fire-and-forget: failures are logged and skipped, the
/// simulation never blocks on the network.
pub struct NetworkClient<T: RelayTransport> {
    transport: T,
    url: String,
    reconnect_timer: u32,
}

impl<T: RelayTransport> NetworkClient<T> {
    pub fn new(mut transport: T, url: impl Into<String>) -> Self {
        let url = url.into();
        if let Err(e) = transport.connect(&url) {
            tracing::warn!("initial connect to {url} failed: {e}");
        }
        Self {
            transport,
            url,
            reconnect_timer: 0,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Drain and decode everything the transport buffered. Malformed frames
    /// are logged and dropped. Runs the timed reconnect loop when the
    /// connection is down; never blocks.
    pub fn pump(&mut self) -> Vec<ServerMessage> {
        if !self.transport.is_connected() {
            if self.reconnect_timer == 0 {
                self.reconnect_timer = RECONNECT_DELAY_TICKS;
                match self.transport.connect(&self.url) {
                    Ok(()) => tracing::info!("reconnected to {}", self.url),
                    Err(e) => tracing::warn!("reconnect to {} failed: {e}", self.url),
                }
            } else {
                self.reconnect_timer -= 1;
            }
        }

        self.transport
            .drain_messages()
            .into_iter()
            .filter_map(|frame| match decode_server_message(&frame) {
                Ok(msg) => Some(msg),
                Err(e) => {
                    tracing::warn!("dropping malformed relay frame: {e}");
                    None
                },
            })
            .collect()
    }

    /// Encode and send one message. Failures degrade to a logged no-op.
    pub fn send(&mut self, msg: &ClientMessage) {
        let frame = match encode_client_message(msg) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("failed to encode outbound message: {e}");
                return;
            },
        };
        if let Err(e) = self.transport.send(&frame) {
            tracing::debug!("dropping outbound message: {e}");
        }
    }

    /// Send a whole tick's outbound batch.
    pub fn send_all(&mut self, msgs: &[ClientMessage]) {
        for msg in msgs {
            self.send(msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ChannelTransport;
    use scorchline_core::net::messages::PlayerUpdate;
    use scorchline_core::net::protocol::encode_server_message;
    use scorchline_core::test_helpers::make_player_snapshot;
    use scorchline_core::weapon::WeaponKind;

    fn update_msg() -> ClientMessage {
        ClientMessage::Update {
            player: PlayerUpdate {
                x: 1.0,
                y: 2.0,
                speed_x: 0.0,
                speed_y: 0.0,
                gun_angle: 0.0,
                health: 100.0,
                current_weapon: WeaponKind::Rifle,
            },
        }
    }

    #[test]
    fn pump_decodes_inbound_frames() {
        let (transport, inbound_tx, _outbound_rx) = ChannelTransport::pair();
        let mut client = NetworkClient::new(transport, "loopback");

        let msg = ServerMessage::NewPlayer {
            player: make_player_snapshot("p2", 1.0, 2.0),
        };
        inbound_tx.send(encode_server_message(&msg).unwrap()).unwrap();
        let received = client.pump();
        assert_eq!(received, vec![msg]);
    }

    #[test]
    fn pump_skips_malformed_frames() {
        let (transport, inbound_tx, _outbound_rx) = ChannelTransport::pair();
        let mut client = NetworkClient::new(transport, "loopback");

        inbound_tx.send(b"not json at all".to_vec()).unwrap();
        let good = ServerMessage::RemovePlayer { id: "p9".to_string() };
        inbound_tx.send(encode_server_message(&good).unwrap()).unwrap();

        let received = client.pump();
        assert_eq!(received, vec![good], "bad frame dropped, good frame kept");
    }

    #[test]
    fn send_writes_encoded_frame() {
        let (transport, _inbound_tx, mut outbound_rx) = ChannelTransport::pair();
        let mut client = NetworkClient::new(transport, "loopback");

        client.send(&update_msg());
        let frame = outbound_rx.try_recv().unwrap();
        let json = String::from_utf8(frame).unwrap();
        assert!(json.contains("\"type\":\"update\""));
    }

    #[test]
    fn send_on_closed_transport_is_a_logged_no_op() {
        let (mut transport, _inbound_tx, mut outbound_rx) = ChannelTransport::pair();
        transport.disconnect();
        // NetworkClient::new retries connect, which ChannelTransport accepts;
        // drop the link again afterwards to exercise the dead-send path.
        let mut client = NetworkClient::new(transport, "loopback");
        client.send(&update_msg());
        assert!(outbound_rx.try_recv().is_ok(), "reconnected in new()");

        // Now kill the channel's far end entirely.
        drop(outbound_rx);
        client.send(&update_msg());
        // Nothing to assert beyond "no panic": the send degraded to a no-op.
    }

    #[test]
    fn reconnect_waits_out_the_timer() {
        use crate::transport::TransportError;

        struct FlakyTransport {
            connected: bool,
            connect_attempts: u32,
        }
        impl RelayTransport for FlakyTransport {
            fn connect(&mut self, _url: &str) -> Result<(), TransportError> {
                self.connect_attempts += 1;
                // Stays down until the third attempt.
                if self.connect_attempts >= 3 {
                    self.connected = true;
                    Ok(())
                } else {
                    Err(TransportError::NotConnected)
                }
            }
            fn send(&mut self, _data: &[u8]) -> Result<(), TransportError> {
                if self.connected {
                    Ok(())
                } else {
                    Err(TransportError::NotConnected)
                }
            }
            fn drain_messages(&mut self) -> Vec<Vec<u8>> {
                Vec::new()
            }
            fn is_connected(&self) -> bool {
                self.connected
            }
        }

        let transport = FlakyTransport {
            connected: false,
            connect_attempts: 0,
        };
        let mut client = NetworkClient::new(transport, "relay://gone");
        // new() made attempt 1 and failed.
        client.pump(); // arms the timer, attempt 2 fails
        assert!(!client.is_connected());

        // The next RECONNECT_DELAY_TICKS pumps only count down.
        for _ in 0..RECONNECT_DELAY_TICKS {
            client.pump();
        }
        assert!(!client.is_connected(), "no attempt while the timer runs");

        // Timer expired: the next pump retries (attempt 3) and succeeds.
        client.pump();
        assert!(client.is_connected());
    }
}
