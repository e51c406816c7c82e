use anyhow::{Context, Result};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};
use tracing::debug;

/// Text-protocol UDP link to a Tello. Commands are single ASCII lines;
/// the drone answers `ok`, `error ...` or a value on the same socket.
#[derive(Debug)]
pub struct TelloLink {
    socket: UdpSocket,
    drone: SocketAddr,
}

impl TelloLink {
    pub fn open(bind: &str, drone: &str) -> Result<Self> {
        let drone = drone
            .to_socket_addrs()
            .with_context(|| format!("resolve drone address {}", drone))?
            .next()
            .with_context(|| format!("no address for {}", drone))?;

        let socket = UdpSocket::bind(bind).with_context(|| format!("bind udp {}", bind))?;
        socket
            .connect(drone)
            .with_context(|| format!("udp connect {}", drone))?;

        Ok(Self { socket, drone })
    }

    pub fn drone_addr(&self) -> SocketAddr {
        self.drone
    }

    pub fn send_line(&self, line: &str) -> Result<()> {
        self.socket
            .send(line.as_bytes())
            .with_context(|| format!("udp send {:?}", line))?;
        debug!(line, "sdk: sent");
        Ok(())
    }

    /// Puts the drone into SDK mode. Must precede any other command.
    pub fn enter_sdk_mode(&self) -> Result<()> {
        self.send_line("command")
    }

    /// Waits up to `timeout` for one reply line. Ok(None) on timeout.
    pub fn wait_reply(&self, timeout: Duration) -> Result<Option<String>> {
        let deadline = Instant::now() + timeout;
        let mut buf = [0u8; 1518];
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Ok(None);
            }
            self.socket.set_read_timeout(Some(left)).context("set read timeout")?;
            match self.socket.recv(&mut buf) {
                Ok(n) => {
                    let reply = String::from_utf8_lossy(&buf[..n]).trim().to_string();
                    if !reply.is_empty() {
                        return Ok(Some(reply));
                    }
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    return Ok(None)
                }
                Err(e) => return Err(e).context("udp recv"),
            }
        }
    }
}
