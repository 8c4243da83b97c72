//! In-process WebSocket server standing in for the admin event endpoint

use futures_util::{SinkExt, StreamExt};
use paanj_admin::ws::{ConnectionState, EventClient};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

pub const WAIT: Duration = Duration::from_secs(5);

/// How the server treats each accepted connection
#[derive(Debug, Clone, Copy)]
pub enum Mode {
    /// Keep the socket open and hand it to the test
    Hold,
    /// Complete the handshake, then close straight away
    CloseImmediately,
    /// Close the first `n` connections straight after the handshake; accept
    /// later ones over TCP but never answer their handshake
    StallAfter(usize),
}

/// Server side of one accepted connection. Dropping it closes the socket.
pub struct ServerConn {
    outbound: mpsc::UnboundedSender<Message>,
    inbound: mpsc::UnboundedReceiver<String>,
}

impl ServerConn {
    pub fn send_text(&self, text: impl Into<String>) {
        self.outbound.send(Message::Text(text.into())).unwrap();
    }

    pub fn send_binary(&self, data: Vec<u8>) {
        self.outbound.send(Message::Binary(data)).unwrap();
    }

    /// Next text frame from the client, `None` once the socket is gone
    pub async fn recv_text(&mut self) -> Option<String> {
        tokio::time::timeout(WAIT, self.inbound.recv())
            .await
            .expect("timed out waiting for client frame")
    }

    pub fn try_recv_text(&mut self) -> Option<String> {
        self.inbound.try_recv().ok()
    }
}

pub struct MockServer {
    addr: SocketAddr,
    accepted: Arc<AtomicUsize>,
    uris: Arc<Mutex<Vec<String>>>,
    conns: mpsc::UnboundedReceiver<ServerConn>,
}

impl MockServer {
    pub async fn start(mode: Mode) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let uris = Arc::new(Mutex::new(Vec::new()));
        let (conn_tx, conns) = mpsc::unbounded_channel();

        let server_accepted = accepted.clone();
        let server_uris = uris.clone();
        tokio::spawn(async move {
            let mut tcp_accepts = 0usize;
            while let Ok((stream, _peer)) = listener.accept().await {
                tcp_accepts += 1;
                if let Mode::StallAfter(n) = mode {
                    if tcp_accepts > n {
                        tokio::spawn(async move {
                            tokio::time::sleep(Duration::from_secs(30)).await;
                            drop(stream);
                        });
                        continue;
                    }
                }

                let accepted = server_accepted.clone();
                let uris = server_uris.clone();
                let conn_tx = conn_tx.clone();

                tokio::spawn(async move {
                    let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                        uris.lock().unwrap().push(req.uri().to_string());
                        Ok(resp)
                    };
                    let Ok(mut ws) = tokio_tungstenite::accept_hdr_async(stream, callback).await
                    else {
                        return;
                    };
                    accepted.fetch_add(1, Ordering::SeqCst);

                    if let Mode::CloseImmediately | Mode::StallAfter(_) = mode {
                        let _ = ws.close(None).await;
                        return;
                    }

                    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
                    let (in_tx, in_rx) = mpsc::unbounded_channel();
                    let _ = conn_tx.send(ServerConn {
                        outbound: out_tx,
                        inbound: in_rx,
                    });

                    loop {
                        tokio::select! {
                            frame = ws.next() => match frame {
                                Some(Ok(Message::Text(text))) => {
                                    let _ = in_tx.send(text);
                                }
                                Some(Ok(_)) => {}
                                _ => break,
                            },
                            out = out_rx.recv() => match out {
                                Some(msg) => {
                                    if ws.send(msg).await.is_err() {
                                        break;
                                    }
                                }
                                None => {
                                    let _ = ws.close(None).await;
                                    break;
                                }
                            },
                        }
                    }
                });
            }
        });

        Self {
            addr,
            accepted,
            uris,
            conns,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Completed handshakes so far
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Request URIs seen during handshakes
    pub fn uris(&self) -> Vec<String> {
        self.uris.lock().unwrap().clone()
    }

    /// Wait for the next held connection
    pub async fn next_conn(&mut self) -> ServerConn {
        tokio::time::timeout(WAIT, self.conns.recv())
            .await
            .expect("timed out waiting for connection")
            .expect("server stopped")
    }
}

/// Address nothing is listening on
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub async fn wait_for_state(client: &EventClient, target: ConnectionState) {
    let mut rx = client.state_changes();
    tokio::time::timeout(WAIT, rx.wait_for(|state| *state == target))
        .await
        .expect("timed out waiting for state")
        .expect("state channel closed");
}
