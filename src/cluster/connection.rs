//! TCP connection to a single cluster node
//!
//! One request is in flight per connection; concurrent requests queue for
//! it and each round trip gets its own timeout once it holds the socket. A
//! round trip that fails or times out drops the socket; the next request
//! reconnects.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::protocol::{decode_header, encode_request, parse_reply, HEADER_SIZE};
use crate::collector::{is_error_reply, CollectResult, Node, RawReply, CMD_NODE};
use crate::error::CollectorError;

/// Info protocol connection to one node
pub struct TcpNode {
    name: String,
    address: String,
    stream: Mutex<Option<TcpStream>>,
    closed: AtomicBool,
}

impl TcpNode {
    /// Connect to `address` and learn the node's name.
    ///
    /// Falls back to the address as the name when the node does not answer
    /// the `node` command.
    #[instrument(skip(timeout))]
    pub async fn connect(address: &str, timeout: Duration) -> CollectResult<Self> {
        let mut stream = open(address, timeout).await?;

        let reply = tokio::time::timeout(timeout, round_trip(&mut stream, &[CMD_NODE.to_string()]))
            .await
            .map_err(|_| CollectorError::timeout_with_duration(timeout.as_millis() as u64))??;

        let name = match reply.get(CMD_NODE).map(|n| n.trim()) {
            Some(name) if !name.is_empty() && !is_error_reply(name) => name.to_string(),
            _ => {
                warn!(address = %address, "Node did not report its name; using address");
                address.to_string()
            }
        };

        debug!(address = %address, node = %name, "Connected to node");

        Ok(Self {
            name,
            address: address.to_string(),
            stream: Mutex::new(Some(stream)),
            closed: AtomicBool::new(false),
        })
    }

    /// Address this node was reached at
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Drop the connection; later requests fail with `ClusterClosed`
    pub async fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.stream.lock().await.take();
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Node for TcpNode {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn request_info(&self, commands: &[String], timeout: Duration) -> CollectResult<RawReply> {
        if self.is_closed() {
            return Err(CollectorError::ClusterClosed);
        }

        // the timeout covers the round trip only, not the wait for the connection
        let mut guard = self.stream.lock().await;
        if self.is_closed() {
            return Err(CollectorError::ClusterClosed);
        }

        // a cancelled or failed round trip must not return the socket to the slot
        let existing = guard.take();
        let address = self.address.as_str();
        let exchange = async move {
            let mut stream = match existing {
                Some(stream) => stream,
                None => open(address, timeout).await?,
            };

            let reply = round_trip(&mut stream, commands).await?;
            Ok::<(TcpStream, RawReply), CollectorError>((stream, reply))
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok((stream, reply))) => {
                *guard = Some(stream);
                Ok(reply)
            }
            Ok(Err(e)) => {
                debug!(node = %self.name, error = %e, "Dropping connection after failed request");
                Err(e)
            }
            Err(_) => Err(CollectorError::timeout_with_duration(timeout.as_millis() as u64)),
        }
    }
}

async fn open(address: &str, timeout: Duration) -> CollectResult<TcpStream> {
    match tokio::time::timeout(timeout, TcpStream::connect(address)).await {
        Ok(Ok(stream)) => {
            stream.set_nodelay(true)?;
            Ok(stream)
        }
        Ok(Err(e)) => Err(CollectorError::ConnectionFailed {
            address: address.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Err(CollectorError::timeout_with_duration(timeout.as_millis() as u64)),
    }
}

async fn round_trip(stream: &mut TcpStream, commands: &[String]) -> CollectResult<RawReply> {
    stream.write_all(&encode_request(commands)).await?;

    let mut header = [0u8; HEADER_SIZE];
    stream.read_exact(&mut header).await?;
    let len = decode_header(header)?;

    let mut body = vec![0u8; len as usize];
    stream.read_exact(&mut body).await?;

    Ok(parse_reply(&body))
}
