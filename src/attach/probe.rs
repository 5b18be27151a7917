// src/attach/probe.rs

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::types::{BoxFuture, DEBUG_HOST};

/// Checks whether the debug server port accepts connections.
pub trait PortProber: Send + Sync {
    fn is_open(&self, port: u16, within: Duration) -> BoxFuture<'_, bool>;
}

/// Connects to `127.0.0.1:<port>` and immediately closes the socket.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpPortProber;

impl PortProber for TcpPortProber {
    fn is_open(&self, port: u16, within: Duration) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            matches!(
                timeout(within, TcpStream::connect((DEBUG_HOST, port))).await,
                Ok(Ok(_))
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn detects_open_and_closed_ports() {
        let listener = TcpListener::bind((DEBUG_HOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let prober = TcpPortProber;

        assert!(prober.is_open(port, Duration::from_millis(150)).await);

        drop(listener);
        assert!(!prober.is_open(port, Duration::from_millis(150)).await);
    }
}
