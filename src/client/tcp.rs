//! TCP transport: one persistent framed connection per client.

use std::net::SocketAddr;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use url::Url;

use super::transport::Transport;
use crate::error::HproseError;
use crate::frame::{FrameReader, FrameWriter};

enum Family {
    Any,
    V4,
    V6,
}

type Connection = (SocketAddr, FrameReader<OwnedReadHalf>, FrameWriter<OwnedWriteHalf>);

/// Exchanges frames over a lazily connected TCP stream. The connection is
/// reused across invocations and dropped on any IO error or address change,
/// so the next invocation reconnects.
pub struct TcpTransport {
    family: Family,
    conn: Mutex<Option<Connection>>,
}

impl TcpTransport {
    pub(crate) fn from_uri(uri: &Url) -> Result<Box<dyn Transport>, HproseError> {
        let family = match uri.scheme() {
            "tcp4" => Family::V4,
            "tcp6" => Family::V6,
            _ => Family::Any,
        };
        Ok(Box::new(Self {
            family,
            conn: Mutex::new(None),
        }))
    }

    fn resolve(&self, uri: &Url) -> Result<SocketAddr, HproseError> {
        let addrs = uri.socket_addrs(|| None).map_err(HproseError::Io)?;
        let addr = addrs.into_iter().find(|a| match self.family {
            Family::Any => true,
            Family::V4 => a.is_ipv4(),
            Family::V6 => a.is_ipv6(),
        });
        addr.ok_or_else(|| {
            HproseError::Io(std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                format!("no matching address for {uri}"),
            ))
        })
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn exchange(&self, uri: &Url, request: &[u8]) -> Result<Vec<u8>, HproseError> {
        let addr = self.resolve(uri)?;
        let mut guard = self.conn.lock().await;
        if !matches!(&*guard, Some((connected, _, _)) if *connected == addr) {
            let stream = TcpStream::connect(addr).await?;
            tracing::debug!(%addr, "connected");
            let (read_half, write_half) = stream.into_split();
            *guard = Some((addr, FrameReader::new(read_half), FrameWriter::new(write_half)));
        }

        let (_, reader, writer) = guard.as_mut().unwrap();
        let result = async {
            writer.write_frame(request).await?;
            writer.flush().await?;
            reader.read_frame().await
        }
        .await;

        match result {
            Ok(frame) => Ok(frame.to_vec()),
            Err(e) => {
                // Drop the broken connection; the next exchange redials.
                *guard = None;
                Err(e)
            }
        }
    }
}
