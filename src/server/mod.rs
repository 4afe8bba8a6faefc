use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::command::Dispatcher;
use crate::error::ProtocolError;
use crate::resp::{FrameReader, Reply, DEFAULT_MAX_FRAME_BYTES};

/// TCP front end for a [`Dispatcher`].
///
/// Every connection shares the one dispatcher behind a single lock, so the
/// auth gate and all stores are process-wide.
pub struct Server {
    dispatcher: Arc<Mutex<Dispatcher>>,
    max_frame_bytes: usize,
}

impl Server {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(Mutex::new(dispatcher)),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }

    pub fn with_max_frame_bytes(mut self, max_frame_bytes: usize) -> Self {
        self.max_frame_bytes = max_frame_bytes;
        self
    }

    pub fn dispatcher(&self) -> Arc<Mutex<Dispatcher>> {
        Arc::clone(&self.dispatcher)
    }

    pub async fn run(self, addr: &str) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("redmock listening on {}", listener.local_addr()?);
        self.serve(listener).await
    }

    /// Accept connections until SIGINT.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        self.serve_until(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for ctrl-c: {}", e);
            }
        })
        .await
    }

    /// Accept connections until `shutdown` resolves. Connections already
    /// accepted keep running on their own tasks.
    pub async fn serve_until<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (socket, peer_addr) = accepted?;
                    tracing::debug!("Connection from {}", peer_addr);

                    let dispatcher = Arc::clone(&self.dispatcher);
                    let max_frame_bytes = self.max_frame_bytes;
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(socket, dispatcher, max_frame_bytes).await {
                            tracing::error!("Connection error: {}", e);
                        }
                    });
                }
                _ = &mut shutdown => {
                    tracing::info!("shutting down");
                    return Ok(());
                }
            }
        }
    }
}

/// Serve one client until it disconnects, sends QUIT, or breaks framing.
pub async fn handle_connection<S>(
    socket: S,
    dispatcher: Arc<Mutex<Dispatcher>>,
    max_frame_bytes: usize,
) -> Result<(), ProtocolError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = FrameReader::with_limit(reader, max_frame_bytes);

    loop {
        let parts = match reader.read_command().await {
            Ok(Some(parts)) => parts,
            Ok(None) => break, // EOF
            Err(ProtocolError::Io(e)) => return Err(ProtocolError::Io(e)),
            Err(e) => {
                // The stream can't be resynchronized; answer once and hang up.
                tracing::debug!("protocol error: {}", e);
                writer.write_all(&Reply::error("Protocol error").encode()).await?;
                writer.flush().await?;
                break;
            }
        };

        let quit = parts
            .first()
            .is_some_and(|name| name.eq_ignore_ascii_case(b"QUIT"));
        let reply = if quit {
            Reply::ok()
        } else {
            let mut guard = dispatcher.lock().unwrap_or_else(PoisonError::into_inner);
            guard.execute(&parts)
        };

        writer.write_all(&reply.encode()).await?;
        writer.flush().await?;
        if quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn shared() -> Arc<Mutex<Dispatcher>> {
        Arc::new(Mutex::new(Dispatcher::new("hunter2")))
    }

    #[tokio::test]
    async fn test_auth_then_command() {
        let mock = Builder::new()
            .read(b"*1\r\n$4\r\nPING\r\n")
            .write(b"-NOAUTH Authentication required.\r\n")
            .read(b"*2\r\n$4\r\nAUTH\r\n$7\r\nhunter2\r\n")
            .write(b"+OK\r\n")
            .read(b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n*2\r\n$3\r\nGET\r\n$1\r\nk\r\n")
            .write(b"+OK\r\n")
            .write(b"$1\r\nv\r\n")
            .build();
        handle_connection(mock, shared(), DEFAULT_MAX_FRAME_BYTES)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_split_frame_across_reads() {
        let mock = Builder::new()
            .read(b"*2\r\n$4\r\nAU")
            .read(b"TH\r\n$7\r\nhun")
            .read(b"ter2\r\n")
            .write(b"+OK\r\n")
            .build();
        handle_connection(mock, shared(), DEFAULT_MAX_FRAME_BYTES)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_quit_closes() {
        let mock = Builder::new()
            .read(b"*1\r\n$4\r\nquit\r\n")
            .write(b"+OK\r\n")
            .build();
        handle_connection(mock, shared(), DEFAULT_MAX_FRAME_BYTES)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_non_command_frame_is_rejected() {
        let mock = Builder::new()
            .read(b"+PING\r\n")
            .write(b"-ERR Protocol error\r\n")
            .build();
        handle_connection(mock, shared(), DEFAULT_MAX_FRAME_BYTES)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_oversized_frame_is_rejected() {
        let mock = Builder::new()
            .read(b"*1\r\n$100\r\nabc")
            .write(b"-ERR Protocol error\r\n")
            .build();
        handle_connection(mock, shared(), 8).await.unwrap();
    }

    #[tokio::test]
    async fn test_serve_until_shutdown() {
        use tokio::net::TcpStream;
        use tokio::sync::oneshot;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let server = Server::new(Dispatcher::new("hunter2"));
        let handle = tokio::spawn(server.serve_until(listener, async {
            let _ = rx.await;
        }));

        // Several accepts go through the same shutdown future.
        for _ in 0..3 {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream.write_all(b"*1\r\n$4\r\nQUIT\r\n").await.unwrap();
        }

        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_shared_auth_gate() {
        let dispatcher = shared();
        let first = Builder::new()
            .read(b"*2\r\n$4\r\nAUTH\r\n$7\r\nhunter2\r\n")
            .write(b"+OK\r\n")
            .build();
        handle_connection(first, Arc::clone(&dispatcher), DEFAULT_MAX_FRAME_BYTES)
            .await
            .unwrap();

        let second = Builder::new()
            .read(b"*1\r\n$4\r\nPING\r\n")
            .write(b"+PONG\r\n")
            .build();
        handle_connection(second, dispatcher, DEFAULT_MAX_FRAME_BYTES)
            .await
            .unwrap();
    }
}
