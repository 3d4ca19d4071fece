//! UDP camera ingress.

use tokio::net::UdpSocket;
use tracing::{error, info, warn};

use crate::authorizer::AddressAuthorizer;
use crate::codec::MAX_FRAME_SIZE;
use crate::relay::{EdgeRelay, FrameOutcome};

/// Read datagrams forever, dropping unauthorized senders before anything
/// is parsed. Returns only if the upstream queue has gone away.
pub async fn serve(
    socket: UdpSocket,
    authorizer: AddressAuthorizer,
    relay: EdgeRelay,
) -> anyhow::Result<()> {
    let mut buf = vec![0u8; MAX_FRAME_SIZE];
    loop {
        let (len, peer) = match socket.recv_from(&mut buf).await {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "UDP recv_from error");
                continue;
            }
        };

        if !authorizer.admits_addr(&peer) {
            warn!(peer = %peer, "frame from unapproved camera dropped");
            continue;
        }

        if relay.handle_frame(&buf[..len]).await? == FrameOutcome::Forwarded {
            info!(peer = %peer, bytes = len, "detection queued for upstream");
        }
    }
}
