//! Low-level SMTP transport.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use crate::error::Result;

/// Receive buffer size for plaintext connections.
const PLAIN_BUFFER_SIZE: usize = 2048;

/// Transport mode of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportMode {
    /// Plain TCP.
    Plain,
    /// TLS from the first byte (SMTPS).
    ImplicitTls,
}

impl TransportMode {
    /// The only port that selects implicit TLS.
    pub const IMPLICIT_TLS_PORT: u16 = 465;

    /// Selects the mode for a server port.
    #[must_use]
    pub const fn for_port(port: u16) -> Self {
        if port == Self::IMPLICIT_TLS_PORT {
            Self::ImplicitTls
        } else {
            Self::Plain
        }
    }

    /// Returns true for the encrypted mode.
    #[must_use]
    pub const fn is_encrypted(self) -> bool {
        matches!(self, Self::ImplicitTls)
    }

    /// Returns the receive buffer size for this mode.
    #[must_use]
    pub const fn buffer_size(self, tls_buffer_size: usize) -> usize {
        match self {
            Self::Plain => PLAIN_BUFFER_SIZE,
            Self::ImplicitTls => tls_buffer_size,
        }
    }
}

/// Opens transport connections.
pub trait Connector: Send + Sync {
    /// Byte stream produced by this connector.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Connects to `addr` in `mode`. `server` is the name the session was
    /// asked to reach, used as the TLS server name.
    fn connect(
        &self,
        addr: SocketAddr,
        server: &str,
        mode: TransportMode,
    ) -> impl Future<Output = Result<Self::Stream>> + Send;
}

/// SMTP stream (TCP or TLS).
#[derive(Debug)]
pub enum SmtpStream {
    /// Plain TCP connection.
    Tcp(TcpStream),
    /// TLS-encrypted connection.
    Tls(Box<TlsStream<TcpStream>>),
}

impl AsyncRead for SmtpStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(stream) => Pin::new(stream).poll_read(cx, buf),
            Self::Tls(stream) => Pin::new(stream.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for SmtpStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Tcp(stream) => Pin::new(stream).poll_write(cx, buf),
            Self::Tls(stream) => Pin::new(stream.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(stream) => Pin::new(stream).poll_flush(cx),
            Self::Tls(stream) => Pin::new(stream.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(stream) => Pin::new(stream).poll_shutdown(cx),
            Self::Tls(stream) => Pin::new(stream.as_mut()).poll_shutdown(cx),
        }
    }
}

/// Connector for real TCP and TLS connections.
#[derive(Clone)]
pub struct NetConnector {
    tls: TlsConnector,
    tls_buffer_size: usize,
}

impl NetConnector {
    /// Creates a connector whose TLS sessions buffer up to `tls_buffer_size`
    /// bytes.
    #[must_use]
    pub fn new(tls_buffer_size: usize) -> Self {
        Self {
            tls: create_tls_connector(),
            tls_buffer_size,
        }
    }
}

impl std::fmt::Debug for NetConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetConnector")
            .field("tls_buffer_size", &self.tls_buffer_size)
            .finish_non_exhaustive()
    }
}

impl Connector for NetConnector {
    type Stream = SmtpStream;

    async fn connect(
        &self,
        addr: SocketAddr,
        server: &str,
        mode: TransportMode,
    ) -> Result<SmtpStream> {
        tracing::info!(server, %addr, ?mode, "SMTP connecting");
        let tcp_stream = TcpStream::connect(addr).await?;

        match mode {
            TransportMode::Plain => Ok(SmtpStream::Tcp(tcp_stream)),
            TransportMode::ImplicitTls => {
                // Any name works once verification is off; fall back to the
                // address when the configured name is not a valid DNS name.
                let server_name = ServerName::try_from(server.to_owned())
                    .unwrap_or_else(|_| ServerName::IpAddress(addr.ip().into()));
                let limit = self.tls_buffer_size;

                let tls_stream = self
                    .tls
                    .connect_with(server_name, tcp_stream, |conn| {
                        conn.set_buffer_limit(Some(limit));
                    })
                    .await?;
                Ok(SmtpStream::Tls(Box::new(tls_stream)))
            }
        }
    }
}

/// Creates a TLS connector that accepts any server certificate.
fn create_tls_connector() -> TlsConnector {
    let config = ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(NoVerifier))
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}

/// Certificate verifier that accepts every certificate.
#[derive(Debug)]
struct NoVerifier;

impl rustls::client::danger::ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ED25519,
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_port_465_selects_tls() {
        assert_eq!(TransportMode::for_port(465), TransportMode::ImplicitTls);
        assert!(TransportMode::for_port(465).is_encrypted());
    }

    #[test]
    fn test_other_ports_select_plaintext() {
        for port in [25, 587, 0, 65535, 464, 466, 2525] {
            assert_eq!(TransportMode::for_port(port), TransportMode::Plain, "port {port}");
        }
    }

    #[test]
    fn test_buffer_sizes() {
        assert_eq!(TransportMode::ImplicitTls.buffer_size(8192), 8192);
        assert_eq!(TransportMode::Plain.buffer_size(8192), PLAIN_BUFFER_SIZE);
    }

    #[tokio::test]
    async fn test_plain_connect_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"220 ready\r\n").await.unwrap();
            let mut buf = [0u8; 64];
            let n = socket.read(&mut buf).await.unwrap();
            buf[..n].to_vec()
        });

        let connector = NetConnector::new(8192);
        let mut stream = connector
            .connect(addr, "localhost", TransportMode::Plain)
            .await
            .unwrap();
        assert!(matches!(stream, SmtpStream::Tcp(_)));

        let mut greeting = [0u8; 16];
        let n = stream.read(&mut greeting).await.unwrap();
        assert_eq!(&greeting[..n], b"220 ready\r\n");

        stream.write_all(b"HELO localhost\r\n").await.unwrap();
        stream.flush().await.unwrap();
        assert_eq!(server.await.unwrap(), b"HELO localhost\r\n");
    }

    #[tokio::test]
    async fn test_connect_refused_is_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let connector = NetConnector::new(8192);
        let result = connector
            .connect(addr, "localhost", TransportMode::Plain)
            .await;
        assert!(result.is_err());
    }
}
