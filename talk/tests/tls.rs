//! TLS trust behavior against a server presenting a self-signed certificate.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};

use talk::client::{Client, SendError};

const OK_RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";

/// Byte offset just past the header terminator, if the headers are complete.
fn header_end(request: &[u8]) -> Option<usize> {
    request
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

fn content_length(headers: &[u8]) -> usize {
    let headers = String::from_utf8_lossy(headers);
    headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())?
        })
        .unwrap_or(0)
}

/// Starts an HTTPS server with a freshly generated self-signed certificate
/// for `localhost` and answers every request with an empty 200.
async fn spawn_self_signed_server() -> String {
    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let cert_der = certified.cert.der().clone();
    let key_der = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
        certified.key_pair.serialize_der(),
    ));

    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(vec![cert_der], key_der)
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                // The handshake fails here when the client rejects the
                // certificate; nothing to answer in that case.
                let Ok(mut tls) = acceptor.accept(stream).await else {
                    return;
                };

                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    match tls.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                    if let Some(end) = header_end(&request) {
                        if request.len() >= end + content_length(&request[..end]) {
                            break;
                        }
                    }
                }

                let _ = tls.write_all(OK_RESPONSE).await;
                let _ = tls.shutdown().await;
            });
        }
    });

    format!("https://localhost:{port}")
}

#[tokio::test]
async fn insecure_toggle_allows_self_signed_certificates() {
    let base = spawn_self_signed_server().await;

    let client = Client::builder(base, "user", "secret")
        .insecure(true)
        .build()
        .unwrap();

    client.send_message("chat-id", "hi").await.unwrap();
}

#[tokio::test]
async fn verification_stays_on_by_default() {
    let base = spawn_self_signed_server().await;

    let client = Client::builder(base, "user", "secret").build().unwrap();

    let err = client.send_message("chat-id", "hi").await.unwrap_err();
    match err {
        SendError::Transport(source) => {
            let chain = format!("{source:?}").to_lowercase();
            assert!(chain.contains("certificate"), "got {chain}");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}
