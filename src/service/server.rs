//! TCP hosting for an Hprose service.
//!
//! One spawned task per accepted connection; frames on a single connection
//! are processed sequentially, matching the ordered, un-multiplexed wire
//! grammar.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};

use crate::error::HproseError;
use crate::frame::{FrameReader, FrameWriter};
use crate::service::Service;

/// Hosts a [`Service`] on a TCP listener.
pub struct Server {
    service: Arc<Service>,
    shutdown: Option<Pin<Box<dyn Future<Output = ()> + Send>>>,
}

impl Server {
    pub fn new(service: Service) -> Self {
        Self {
            service: Arc::new(service),
            shutdown: None,
        }
    }

    /// Sets a shutdown signal future.
    pub fn shutdown(mut self, signal: impl Future<Output = ()> + Send + 'static) -> Self {
        self.shutdown = Some(Box::pin(signal));
        self
    }

    /// Binds `addr` and serves until the shutdown signal fires.
    pub async fn serve(self, addr: SocketAddr) -> Result<(), HproseError> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_on(listener).await
    }

    /// Serves on an already-bound listener.
    pub async fn serve_on(self, listener: TcpListener) -> Result<(), HproseError> {
        tracing::info!(addr = %listener.local_addr()?, "Hprose server listening");
        let service = self.service;

        if let Some(shutdown_signal) = self.shutdown {
            tokio::pin!(shutdown_signal);
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, peer_addr)) => {
                                spawn_connection(stream, peer_addr, service.clone());
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "accept error");
                            }
                        }
                    }
                    () = &mut shutdown_signal => {
                        tracing::info!("Hprose server shutting down");
                        break;
                    }
                }
            }
        } else {
            loop {
                match listener.accept().await {
                    Ok((stream, peer_addr)) => {
                        spawn_connection(stream, peer_addr, service.clone());
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "accept error");
                    }
                }
            }
        }

        tracing::info!("Hprose server stopped");
        Ok(())
    }
}

fn spawn_connection(stream: TcpStream, peer_addr: SocketAddr, service: Arc<Service>) {
    tokio::spawn(async move {
        tracing::debug!(%peer_addr, "connection accepted");
        let (read_half, write_half) = stream.into_split();
        let mut reader = FrameReader::new(read_half);
        let mut writer = FrameWriter::new(write_half);

        loop {
            let request = match reader.read_frame().await {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::debug!(%peer_addr, error = %e, "connection closed");
                    break;
                }
            };

            let response = service.handle(&request);

            let sent = match writer.write_frame(&response).await {
                Ok(()) => writer.flush().await,
                Err(e) => Err(e),
            };
            if let Err(e) = sent {
                service.report_send_error(&e);
                tracing::debug!(%peer_addr, error = %e, "response write failed");
                break;
            }
        }
    });
}
