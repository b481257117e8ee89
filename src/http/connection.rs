use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};

use super::Error;

const READ_CHUNK: usize = 4096;

/// One plaintext TCP connection, used for a single exchange.
///
/// Every operation shares one deadline fixed at open time. The socket is shut
/// down when the value is dropped, so any early return closes it.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: String,
    deadline: Instant,
}

impl Connection {
    pub fn open(host: &str, port: u16, timeout: Duration) -> Result<Self, Error> {
        let peer = format!("{}:{}", host, port);
        let deadline = Instant::now() + timeout;

        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|e| Error::Connect(peer.clone(), e))?;

        let mut last_err = None;
        for addr in addrs {
            let remaining = remaining(deadline).ok_or_else(|| Error::Timeout(peer.clone()))?;
            match TcpStream::connect_timeout(&addr, remaining) {
                Ok(stream) => {
                    log::debug!("connected to {} ({})", peer, addr);
                    return Ok(Self {
                        stream,
                        peer,
                        deadline,
                    });
                }
                Err(e) if is_timeout(&e) => return Err(Error::Timeout(peer)),
                Err(e) => last_err = Some(e),
            }
        }

        let err = last_err
            .unwrap_or_else(|| io::Error::new(ErrorKind::NotFound, "host resolved to no addresses"));
        Err(Error::Connect(peer, err))
    }

    pub fn send(&mut self, data: &[u8]) -> Result<(), Error> {
        let remaining = self.remaining()?;
        self.stream.set_write_timeout(Some(remaining))?;
        self.stream
            .write_all(data)
            .and_then(|_| self.stream.flush())
            .map_err(|e| self.classify(e))
    }

    /// Reads until the peer closes its side of the connection.
    pub fn read_to_close(&mut self) -> Result<Bytes, Error> {
        let mut buf = BytesMut::with_capacity(READ_CHUNK * 2);
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let remaining = self.remaining()?;
            self.stream.set_read_timeout(Some(remaining))?;
            match self.stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.classify(e)),
            }
        }
        log::debug!("read {} bytes from {}", buf.len(), self.peer);
        Ok(buf.freeze())
    }

    fn remaining(&self) -> Result<Duration, Error> {
        remaining(self.deadline).ok_or_else(|| Error::Timeout(self.peer.clone()))
    }

    fn classify(&self, e: io::Error) -> Error {
        if is_timeout(&e) {
            Error::Timeout(self.peer.clone())
        } else {
            Error::Io(e)
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

fn remaining(deadline: Instant) -> Option<Duration> {
    deadline
        .checked_duration_since(Instant::now())
        .filter(|d| !d.is_zero())
}

// Blocking sockets report an expired timeout as WouldBlock on unix, TimedOut on windows.
fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock)
}
