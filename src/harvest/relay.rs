//! Receive-queue to send-queue forwarding

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::info;

use super::models::Player;

/// Pump records from the receive channel to the send channel.
///
/// No transformation happens here; the relay exists to decouple the fetch
/// loop's bursty arrival pattern from the publish loop's steady drain.
/// Records are moved, never cloned, so each is owned by exactly one stage
/// at a time. Waiting on `recv()` replaces the original sleep-poll idle
/// pattern with identical ordering semantics.
///
/// Returns when either side of the relay is closed.
pub async fn forward(mut rx: UnboundedReceiver<Player>, tx: UnboundedSender<Player>) {
    while let Some(player) = rx.recv().await {
        if tx.send(player).is_err() {
            info!("send channel closed, relay exiting");
            return;
        }
    }
    info!("receive channel closed, relay exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn player(id: u64) -> Player {
        Player {
            id,
            name: format!("p{}", id),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_forward_preserves_identity_and_order() {
        let (receive_tx, receive_rx) = mpsc::unbounded_channel();
        let (send_tx, mut send_rx) = mpsc::unbounded_channel();

        for id in [3, 1, 4, 1, 5] {
            receive_tx.send(player(id)).unwrap();
        }
        drop(receive_tx);

        forward(receive_rx, send_tx).await;

        let mut forwarded = Vec::new();
        while let Some(p) = send_rx.recv().await {
            forwarded.push(p.id);
        }
        // no loss, no duplication, FIFO order
        assert_eq!(forwarded, vec![3, 1, 4, 1, 5]);
    }

    #[tokio::test]
    async fn test_forward_exits_when_send_side_closed() {
        let (receive_tx, receive_rx) = mpsc::unbounded_channel();
        let (send_tx, send_rx) = mpsc::unbounded_channel();
        drop(send_rx);

        receive_tx.send(player(1)).unwrap();

        // must terminate rather than spin
        forward(receive_rx, send_tx).await;
    }
}
