//! Stream upgrade applied to the TCP connection before the handshake.
//!
//! NVDA Remote serves TLS with a self-signed certificate, so the default
//! [`TlsUpgrader`] accepts any certificate and host name.  The connection
//! only ever goes to a local NVDA instance started by the driver.
//!
//! [`PlainUpgrader`] skips TLS entirely and exists for tests that stand up a
//! fake server on a plain `TcpListener`.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::DriverError;

/// A bidirectional byte stream the connection can split and own.
pub trait SessionStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> SessionStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

pub type BoxedStream = Box<dyn SessionStream>;

/// Turns a connected TCP stream into the stream the protocol runs over.
#[async_trait]
pub trait StreamUpgrader: Send + Sync {
    async fn upgrade(&self, tcp: TcpStream) -> Result<BoxedStream, DriverError>;
}

/// TLS client that trusts NVDA Remote's self-signed certificate.
pub struct TlsUpgrader {
    server_name: String,
}

impl TlsUpgrader {
    pub fn new(server_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
        }
    }
}

#[async_trait]
impl StreamUpgrader for TlsUpgrader {
    async fn upgrade(&self, tcp: TcpStream) -> Result<BoxedStream, DriverError> {
        let connector = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true)
            .build()?;
        let connector = tokio_native_tls::TlsConnector::from(connector);

        let stream = connector.connect(&self.server_name, tcp).await?;
        debug!(server_name = %self.server_name, "TLS session established");
        Ok(Box::new(stream))
    }
}

/// Passes the TCP stream through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainUpgrader;

#[async_trait]
impl StreamUpgrader for PlainUpgrader {
    async fn upgrade(&self, tcp: TcpStream) -> Result<BoxedStream, DriverError> {
        tcp.set_nodelay(true)?;
        Ok(Box::new(tcp))
    }
}
