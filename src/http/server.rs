use crate::config::Limits;
use crate::http::handler::HandlerFunc;
use crate::http::method::Method;
use crate::http::not_found;
use crate::http::request::Request;
use crate::http::response::{Response, serialize_response};
use anyhow::Context;
use bytes::BytesMut;
use log::{debug, error, info};
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

pub struct Handler {
    prefix: String,
    pub f: HandlerFunc,
}

/// Sequential HTTP server: one connection is read, answered and closed
/// before the next one is accepted.
pub struct Server {
    listener: TcpListener,
    handlers: Vec<Handler>,
    limits: Limits,
    timeout: Option<Duration>,
}

impl Server {
    fn new(listener: TcpListener, limits: Limits) -> Server {
        Server {
            listener,
            handlers: Vec::new(),
            limits,
            timeout: None,
        }
    }

    pub fn from_tcp_addr(addr: impl ToSocketAddrs, limits: Limits) -> anyhow::Result<Server> {
        let listener = TcpListener::bind(addr).context("Can't bind address")?;
        Ok(Server::new(listener, limits))
    }

    /// Bounds both the request read and the response write.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Server {
        self.timeout = timeout;
        self
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Can't get listener address")
    }

    /// Routes every request whose raw bytes start with `"<METHOD> <path>"`.
    ///
    /// Prefixes are tried in registration order, so a path that is a prefix
    /// of another (`/file` and `/files`) must be registered after it.
    pub fn add_handler(&mut self, m: Method, path: &str, f: HandlerFunc) {
        let method: &'static str = m.into();
        self.handlers.push(Handler {
            prefix: format!("{method} {path}"),
            f,
        })
    }

    pub fn run(self) -> anyhow::Result<()> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(e) = self.process_incoming(stream) {
                        error!("{e:#}");
                    }
                }
                Err(e) => error!("Error accepting connection: {e}"),
            }
        }
        Ok(())
    }

    fn process_incoming(&self, mut stream: TcpStream) -> anyhow::Result<()> {
        stream
            .set_read_timeout(self.timeout)
            .context("Can't set read timeout")?;
        stream
            .set_write_timeout(self.timeout)
            .context("Can't set write timeout")?;

        debug!("accepted new connection: {:?}", stream.peer_addr());

        // The stream is dropped, and the connection closed, on return.
        self.handle_connection(&mut stream)
    }

    /// Reads one request from `stream`, answers it and returns.
    ///
    /// A connection that sends nothing gets no response at all.
    pub fn handle_connection(&self, stream: &mut (impl Read + Write)) -> anyhow::Result<()> {
        let Some(request) = Self::read_request(stream, self.limits.read_buffer_size)? else {
            debug!("connection closed without a request");
            return Ok(());
        };

        debug!("request: {}", String::from_utf8_lossy(request.raw()));

        let response = self.dispatch(&request);
        info!(
            "{} {} -> {}",
            request.method.map(<&str>::from).unwrap_or("?"),
            request.target,
            response.status.code_num
        );

        stream
            .write_all(&serialize_response(&response))
            .context("Error while writing response")?;
        stream.flush().context("Error while flushing response")
    }

    fn dispatch(&self, req: &Request) -> Response {
        self.handlers
            .iter()
            .find(|h| req.raw().starts_with(h.prefix.as_bytes()))
            .map(|h| (h.f)(req))
            .unwrap_or_else(|| not_found("Not Found"))
    }

    /// Takes exactly one read; whatever did not arrive in it is lost.
    fn read_request(
        readable: &mut impl Read,
        buffer_size: usize,
    ) -> anyhow::Result<Option<Request>> {
        let mut buf = BytesMut::zeroed(buffer_size);

        let n = loop {
            match readable.read(&mut buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context("Error while reading request"),
            }
        };

        if n == 0 {
            return Ok(None);
        }

        buf.truncate(n);
        Ok(Some(Request::parse(buf.freeze())))
    }
}

/// In-memory connection: reads come from `input`, writes land in `output`.
#[cfg(test)]
pub(crate) struct MockStream {
    input: std::io::Cursor<Vec<u8>>,
    pub output: Vec<u8>,
}

#[cfg(test)]
impl MockStream {
    pub fn new(input: &[u8]) -> MockStream {
        MockStream {
            input: std::io::Cursor::new(input.to_vec()),
            output: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.input.read(buf)
    }
}

#[cfg(test)]
impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.output.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
