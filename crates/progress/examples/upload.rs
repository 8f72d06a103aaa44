use http::HeaderValue;
use http::header::HOST;
use micro_progress::content::{BytesContent, ProgressContent};
use micro_progress::error::{ProgressError, SendError};
use std::net::SocketAddr;
use tokio::io::{self, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

const PAYLOAD_SIZE: usize = 4 * 1024 * 1024;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let tcp_listener = match TcpListener::bind("127.0.0.1:0").await {
        Ok(tcp_listener) => tcp_listener,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };
    let address = tcp_listener.local_addr().expect("listener has a local address");
    info!(%address, "start listening");

    let server = tokio::spawn(async move {
        let (mut tcp_stream, _remote_addr) = match tcp_listener.accept().await {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                return;
            }
        };

        match io::copy(&mut tcp_stream, &mut io::sink()).await {
            Ok(received) => info!(received, "server drained upload"),
            Err(e) => error!(cause = %e, "server read error"),
        }
    });

    let (tx, mut rx) = watch::channel(0u64);
    let watcher = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let transferred = *rx.borrow_and_update();
            info!(transferred, percent = transferred * 100 / PAYLOAD_SIZE as u64, "upload progress");
        }
    });

    match upload(address, tx).await {
        Ok(sent) => info!(sent, "finished upload"),
        Err(e) => error!(cause = %e, "upload failed"),
    }

    let _ = server.await;
    let _ = watcher.await;
}

async fn upload(address: SocketAddr, progress: watch::Sender<u64>) -> Result<u64, ProgressError> {
    let content = BytesContent::from(vec![b'x'; PAYLOAD_SIZE]).with_content_type(&mime::APPLICATION_OCTET_STREAM);
    let mut upload = ProgressContent::builder().content(content).chunk_size(256 * 1024).progress(progress).build()?;

    if let Ok(host) = HeaderValue::from_str(&address.to_string()) {
        upload.headers_mut().insert(HOST, host);
    }

    let mut tcp_stream = TcpStream::connect(address).await.map_err(SendError::io)?;

    let mut head = String::from("POST /upload HTTP/1.1\r\n");
    for (name, value) in upload.headers() {
        head.push_str(&format!("{}: {}\r\n", name, value.to_str().unwrap_or_default()));
    }
    head.push_str("\r\n");
    tcp_stream.write_all(head.as_bytes()).await.map_err(SendError::io)?;

    Ok(upload.write_to(&mut tcp_stream).await?)
}
