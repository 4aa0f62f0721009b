#![allow(dead_code)]
use hickory_proto::op::{Message, MessageType, OpCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::oneshot;

/// Address every UDP answer carries.
pub const UDP_ANSWER: Ipv4Addr = Ipv4Addr::new(192, 0, 2, 53);
/// Address every TCP answer carries, so tests can tell which path answered.
pub const TCP_ANSWER: Ipv4Addr = Ipv4Addr::new(198, 51, 100, 53);

#[derive(Debug, Clone, Copy, Default)]
pub struct MockBehavior {
    /// UDP answers come back empty with the TC bit set.
    pub truncate_udp: bool,
    /// UDP answers carry a transaction ID different from the query's.
    pub wrong_udp_id: bool,
    /// UDP queries are read and never answered.
    pub silent_udp: bool,
    /// The server hangs up after every TCP response.
    pub close_tcp_after_response: bool,
}

#[derive(Debug, Default)]
pub struct ServerStats {
    pub udp_queries: AtomicUsize,
    pub tcp_queries: AtomicUsize,
    pub tcp_connections: AtomicUsize,
}

/// UDP and TCP DNS responder on one loopback port.
pub struct MockDnsServer {
    addr: SocketAddr,
    stats: Arc<ServerStats>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(behavior: MockBehavior) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = socket.local_addr()?;
        let listener = TcpListener::bind(addr).await?;

        let stats = Arc::new(ServerStats::default());
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let task_stats = Arc::clone(&stats);
        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            task_stats.udp_queries.fetch_add(1, Ordering::SeqCst);
                            if behavior.silent_udp {
                                continue;
                            }
                            if let Some(response) = udp_response(&buf[..len], behavior) {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                    accepted = listener.accept() => {
                        if let Ok((stream, _)) = accepted {
                            task_stats.tcp_connections.fetch_add(1, Ordering::SeqCst);
                            let conn_stats = Arc::clone(&task_stats);
                            tokio::spawn(serve_tcp(stream, behavior, conn_stats));
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            stats,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn udp_queries(&self) -> usize {
        self.stats.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_queries(&self) -> usize {
        self.stats.tcp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_connections(&self) -> usize {
        self.stats.tcp_connections.load(Ordering::SeqCst)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve_tcp(mut stream: TcpStream, behavior: MockBehavior, stats: Arc<ServerStats>) {
    loop {
        let mut len_buf = [0u8; 2];
        if stream.read_exact(&mut len_buf).await.is_err() {
            return;
        }
        let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
        if stream.read_exact(&mut query).await.is_err() {
            return;
        }
        stats.tcp_queries.fetch_add(1, Ordering::SeqCst);

        let Some(response) = answer(&query, TCP_ANSWER, false, 0) else {
            return;
        };
        let mut framed = (response.len() as u16).to_be_bytes().to_vec();
        framed.extend_from_slice(&response);
        if stream.write_all(&framed).await.is_err() {
            return;
        }

        if behavior.close_tcp_after_response {
            let _ = stream.shutdown().await;
            return;
        }
    }
}

fn udp_response(query: &[u8], behavior: MockBehavior) -> Option<Vec<u8>> {
    let id_offset = if behavior.wrong_udp_id { 1 } else { 0 };
    answer(query, UDP_ANSWER, behavior.truncate_udp, id_offset)
}

fn answer(query: &[u8], ip: Ipv4Addr, truncated: bool, id_offset: u16) -> Option<Vec<u8>> {
    let request = Message::from_vec(query).ok()?;
    let question = request.queries().first()?.clone();

    let mut response = Message::new(
        request.id().wrapping_add(id_offset),
        MessageType::Response,
        OpCode::Query,
    );
    response.set_recursion_desired(request.recursion_desired());
    response.set_recursion_available(true);
    response.add_query(question.clone());

    if truncated {
        response.set_truncated(true);
    } else {
        response.add_answer(Record::from_rdata(
            question.name().clone(),
            60,
            RData::A(A(ip)),
        ));
    }

    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    response.emit(&mut encoder).ok()?;
    Some(buf)
}
