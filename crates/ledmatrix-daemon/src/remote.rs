//! UDP listener that turns datagrams into input events.

use crate::cancel::CancelFlag;
use crate::input::InputEvent;
use anyhow::{Context, Result};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Largest datagram accepted; commands are a few bytes.
const MAX_DATAGRAM: usize = 512;

/// Binds the listener socket.
pub async fn bind(listen: &str) -> Result<UdpSocket> {
    let socket = UdpSocket::bind(listen)
        .await
        .with_context(|| format!("Failed to bind remote listener on {}", listen))?;
    info!("Remote listener on udp://{}", socket.local_addr()?);
    Ok(socket)
}

/// Spawns the listener on the current runtime.
///
/// Keys that skip an animation raise `cancel` as they arrive, so a playback in
/// progress stops at its next frame boundary even though the event itself is
/// only read once playback returns.
pub fn spawn_listener(
    socket: UdpSocket,
    tx: mpsc::UnboundedSender<InputEvent>,
    cancel: CancelFlag,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut buf = [0u8; MAX_DATAGRAM];
        loop {
            let (len, peer) = match socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) => {
                    warn!("Remote listener receive error: {}", e);
                    continue;
                }
            };
            let text = String::from_utf8_lossy(&buf[..len]);
            let event: InputEvent = match text.parse() {
                Ok(event) => event,
                Err(e) => {
                    debug!("Ignoring datagram from {}: {}", peer, e);
                    continue;
                }
            };
            debug!("Received {:?} from {}", event, peer);
            if event.skips_animation() {
                cancel.raise();
            }
            if tx.send(event).is_err() {
                debug!("Input receiver dropped, stopping remote listener");
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::RemoteKey;
    use std::time::Duration;

    #[tokio::test]
    async fn test_datagrams_become_events() {
        let socket = bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancelFlag::new();
        let handle = spawn_listener(socket, tx, cancel.clone());

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(b"bogus", addr).await.unwrap();
        client.send_to(b"print_done", addr).await.unwrap();
        client.send_to(b"key 74", addr).await.unwrap();

        let first = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap();
        assert_eq!(first, Some(InputEvent::PrintDone));
        assert!(!cancel.is_raised());

        let second = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap();
        assert_eq!(second, Some(InputEvent::Key(RemoteKey::NextAnimation)));
        assert!(cancel.is_raised());

        handle.abort();
    }
}
