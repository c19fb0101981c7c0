//! Minimal synchronous RESP2 client.
//!
//! Only what the accessors need: request framing as an array of bulk
//! strings, reply parsing, `HSET` / `HMGET`, and the `AUTH` / `SELECT`
//! handshake.

use crate::error::{StoreError, StoreResult};
use crate::store::HashStore;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, trace};

const MAX_DEPTH: usize = 8;
const MAX_BULK_LEN: usize = 512 * 1024 * 1024;
const MAX_LINE_LEN: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespValue {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Option<Vec<u8>>),
    Array(Option<Vec<RespValue>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// `host:port`
    pub address: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<u32>,
    /// Applies to connect, reads and writes.
    pub timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:6379".to_string(),
            username: None,
            password: None,
            database: None,
            timeout: Duration::from_millis(2000),
        }
    }
}

/// One connection to a Redis-compatible server.
///
/// Not safe to share between threads without external locking; each call is
/// a single request followed by a single reply. After an I/O or protocol
/// failure the stream position is unknown and every later command fails.
pub struct RespConnection<T: Read + Write = TcpStream> {
    stream: BufReader<T>,
    broken: bool,
}

impl RespConnection<TcpStream> {
    pub fn connect(options: &ConnectOptions) -> StoreResult<Self> {
        let mut last_err = None;
        let mut tcp = None;
        for addr in options.address.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, options.timeout) {
                Ok(stream) => {
                    tcp = Some(stream);
                    break;
                }
                Err(e) => last_err = Some(e),
            }
        }
        let tcp = match (tcp, last_err) {
            (Some(tcp), _) => tcp,
            (None, Some(e)) => return Err(e.into()),
            (None, None) => {
                return Err(StoreError::Protocol(format!(
                    "address {} did not resolve",
                    options.address
                )))
            }
        };
        tcp.set_read_timeout(Some(options.timeout))?;
        tcp.set_write_timeout(Some(options.timeout))?;
        tcp.set_nodelay(true)?;
        debug!(address = %options.address, "connected to store");

        let mut conn = Self::from_stream(tcp);
        conn.handshake(options)?;
        Ok(conn)
    }
}

impl<T: Read + Write> RespConnection<T> {
    pub fn from_stream(stream: T) -> Self {
        Self {
            stream: BufReader::new(stream),
            broken: false,
        }
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }

    pub fn get_ref(&self) -> &T {
        self.stream.get_ref()
    }

    pub fn into_inner(self) -> T {
        self.stream.into_inner()
    }

    fn handshake(&mut self, options: &ConnectOptions) -> StoreResult<()> {
        if let Some(password) = &options.password {
            let reply = match &options.username {
                Some(user) => self.command(&[b"AUTH", user.as_bytes(), password.as_bytes()])?,
                None => self.command(&[b"AUTH", password.as_bytes()])?,
            };
            expect_ok("AUTH", reply)?;
        }
        if let Some(db) = options.database {
            let db = db.to_string();
            let reply = self.command(&[b"SELECT", db.as_bytes()])?;
            expect_ok("SELECT", reply)?;
        }
        Ok(())
    }

    /// Sends one command and reads its reply.
    ///
    /// Error replies are returned as [`StoreError::Server`].
    pub fn command(&mut self, argv: &[&[u8]]) -> StoreResult<RespValue> {
        if self.broken {
            return Err(StoreError::Protocol("connection is broken".into()));
        }
        let reply = self
            .write_argv(argv)
            .and_then(|()| self.read_value(MAX_DEPTH));
        match reply {
            Ok(RespValue::Error(msg)) => Err(StoreError::Server(msg)),
            Ok(reply) => Ok(reply),
            Err(e) => {
                if matches!(e, StoreError::Io(_) | StoreError::Protocol(_)) {
                    debug!(error = %e, "resp connection marked broken");
                    self.broken = true;
                }
                Err(e)
            }
        }
    }

    fn write_argv(&mut self, argv: &[&[u8]]) -> StoreResult<()> {
        let mut frame = Vec::with_capacity(16 + argv.iter().map(|a| a.len() + 16).sum::<usize>());
        frame.extend_from_slice(format!("*{}\r\n", argv.len()).as_bytes());
        for arg in argv {
            frame.extend_from_slice(format!("${}\r\n", arg.len()).as_bytes());
            frame.extend_from_slice(arg);
            frame.extend_from_slice(b"\r\n");
        }
        trace!(bytes = frame.len(), args = argv.len(), "resp request");
        let out = self.stream.get_mut();
        out.write_all(&frame)?;
        out.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> StoreResult<Vec<u8>> {
        let mut line = Vec::new();
        (&mut self.stream)
            .take(MAX_LINE_LEN as u64 + 2)
            .read_until(b'\n', &mut line)?;
        if line.len() == MAX_LINE_LEN + 2 && !line.ends_with(b"\n") {
            return Err(StoreError::Protocol("reply line too long".into()));
        }
        if !line.ends_with(b"\r\n") {
            return Err(StoreError::Protocol("unterminated reply line".into()));
        }
        line.truncate(line.len() - 2);
        Ok(line)
    }

    fn read_len(&mut self) -> StoreResult<Option<usize>> {
        let line = self.read_line()?;
        let n = parse_int(&line)?;
        if n < 0 {
            return Ok(None);
        }
        usize::try_from(n)
            .ok()
            .filter(|n| *n <= MAX_BULK_LEN)
            .map(Some)
            .ok_or_else(|| StoreError::Protocol(format!("length {} out of range", n)))
    }

    fn read_value(&mut self, depth: usize) -> StoreResult<RespValue> {
        if depth == 0 {
            return Err(StoreError::Protocol("reply nested too deeply".into()));
        }
        let mut prefix = [0u8; 1];
        self.stream.read_exact(&mut prefix)?;
        let value = match prefix[0] {
            b'+' => RespValue::Simple(lossy(self.read_line()?)),
            b'-' => RespValue::Error(lossy(self.read_line()?)),
            b':' => RespValue::Integer(parse_int(&self.read_line()?)?),
            b'$' => match self.read_len()? {
                None => RespValue::Bulk(None),
                Some(len) => {
                    let mut payload = Vec::with_capacity(len.min(MAX_LINE_LEN) + 2);
                    (&mut self.stream)
                        .take(len as u64 + 2)
                        .read_to_end(&mut payload)?;
                    if payload.len() != len + 2 {
                        return Err(StoreError::Protocol(format!(
                            "bulk string truncated at {} of {} bytes",
                            payload.len(),
                            len + 2
                        )));
                    }
                    if !payload.ends_with(b"\r\n") {
                        return Err(StoreError::Protocol("bulk string missing CRLF".into()));
                    }
                    payload.truncate(len);
                    RespValue::Bulk(Some(payload))
                }
            },
            b'*' => match self.read_len()? {
                None => RespValue::Array(None),
                Some(n) => {
                    let mut items = Vec::with_capacity(n.min(1024));
                    for _ in 0..n {
                        items.push(self.read_value(depth - 1)?);
                    }
                    RespValue::Array(Some(items))
                }
            },
            other => {
                return Err(StoreError::Protocol(format!(
                    "unexpected reply type byte 0x{:02x}",
                    other
                )))
            }
        };
        trace!(?value, "resp reply");
        Ok(value)
    }
}

impl<T: Read + Write> HashStore for RespConnection<T> {
    fn multi_set(&mut self, key: &str, pairs: &[(u32, Vec<u8>)]) -> StoreResult<()> {
        let tags: Vec<String> = pairs.iter().map(|(tag, _)| tag.to_string()).collect();
        let mut argv: Vec<&[u8]> = Vec::with_capacity(2 + pairs.len() * 2);
        argv.push(b"HSET");
        argv.push(key.as_bytes());
        for (tag, (_, value)) in tags.iter().zip(pairs) {
            argv.push(tag.as_bytes());
            argv.push(value);
        }
        match self.command(&argv)? {
            RespValue::Integer(_) => Ok(()),
            other => Err(StoreError::Protocol(format!(
                "unexpected HSET reply {:?}",
                other
            ))),
        }
    }

    fn multi_get(&mut self, key: &str, fields: &[u32]) -> StoreResult<Vec<Option<Vec<u8>>>> {
        let tags: Vec<String> = fields.iter().map(u32::to_string).collect();
        let mut argv: Vec<&[u8]> = Vec::with_capacity(2 + fields.len());
        argv.push(b"HMGET");
        argv.push(key.as_bytes());
        argv.extend(tags.iter().map(|t| t.as_bytes()));
        let items = match self.command(&argv)? {
            RespValue::Array(Some(items)) => items,
            other => {
                return Err(StoreError::Protocol(format!(
                    "unexpected HMGET reply {:?}",
                    other
                )))
            }
        };
        if items.len() != fields.len() {
            return Err(StoreError::Protocol(format!(
                "HMGET returned {} values for {} fields",
                items.len(),
                fields.len()
            )));
        }
        items
            .into_iter()
            .map(|item| match item {
                RespValue::Bulk(value) => Ok(value),
                other => Err(StoreError::Protocol(format!(
                    "unexpected HMGET element {:?}",
                    other
                ))),
            })
            .collect()
    }
}

fn expect_ok(command: &str, reply: RespValue) -> StoreResult<()> {
    match reply {
        RespValue::Simple(s) if s == "OK" => Ok(()),
        other => Err(StoreError::Protocol(format!(
            "unexpected {} reply {:?}",
            command, other
        ))),
    }
}

fn parse_int(line: &[u8]) -> StoreResult<i64> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| StoreError::Protocol(format!("invalid integer {:?}", lossy(line.to_vec()))))
}

fn lossy(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    struct FakeStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl FakeStream {
        fn replying(reply: &[u8]) -> Self {
            Self {
                input: Cursor::new(reply.to_vec()),
                output: Vec::new(),
            }
        }
    }

    impl Read for FakeStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for FakeStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn hset_frames_all_pairs_in_one_command() {
        let mut conn = RespConnection::from_stream(FakeStream::replying(b":2\r\n"));
        conn.multi_set("u:1:2", &[(1, b"42".to_vec()), (3, vec![0, 1])])
            .unwrap();
        assert_eq!(
            conn.get_ref().output,
            b"*6\r\n$4\r\nHSET\r\n$5\r\nu:1:2\r\n$1\r\n1\r\n$2\r\n42\r\n$1\r\n3\r\n$2\r\n\x00\x01\r\n"
                .to_vec()
        );
    }

    #[test]
    fn hmget_maps_nil_to_none() {
        let mut conn =
            RespConnection::from_stream(FakeStream::replying(b"*3\r\n$2\r\n42\r\n$-1\r\n$0\r\n\r\n"));
        let values = conn.multi_get("k", &[1, 2, 3]).unwrap();
        assert_eq!(values, vec![Some(b"42".to_vec()), None, Some(Vec::new())]);
        assert_eq!(
            conn.get_ref().output,
            b"*5\r\n$5\r\nHMGET\r\n$1\r\nk\r\n$1\r\n1\r\n$1\r\n2\r\n$1\r\n3\r\n".to_vec()
        );
    }

    #[test]
    fn hmget_length_mismatch_is_protocol_error() {
        let mut conn = RespConnection::from_stream(FakeStream::replying(b"*1\r\n$-1\r\n"));
        assert!(matches!(
            conn.multi_get("k", &[1, 2]),
            Err(StoreError::Protocol(_))
        ));
    }

    #[test]
    fn error_reply_surfaces_as_server_error() {
        let mut conn = RespConnection::from_stream(FakeStream::replying(
            b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n",
        ));
        match conn.multi_set("k", &[(1, b"x".to_vec())]) {
            Err(StoreError::Server(msg)) => assert!(msg.starts_with("WRONGTYPE")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn truncated_reply_is_an_error() {
        let mut conn = RespConnection::from_stream(FakeStream::replying(b"$5\r\nab"));
        assert!(conn.command(&[b"GET", b"k"]).is_err());
        let mut conn = RespConnection::from_stream(FakeStream::replying(b"?\r\n"));
        assert!(matches!(
            conn.command(&[b"PING"]),
            Err(StoreError::Protocol(_))
        ));
    }

    #[test]
    fn handshake_sends_auth_and_select() {
        let mut conn =
            RespConnection::from_stream(FakeStream::replying(b"+OK\r\n+OK\r\n"));
        let options = ConnectOptions {
            username: Some("app".into()),
            password: Some("secret".into()),
            database: Some(3),
            ..ConnectOptions::default()
        };
        conn.handshake(&options).unwrap();
        assert_eq!(
            conn.into_inner().output,
            b"*3\r\n$4\r\nAUTH\r\n$3\r\napp\r\n$6\r\nsecret\r\n*2\r\n$6\r\nSELECT\r\n$1\r\n3\r\n"
                .to_vec()
        );
    }

    /// Fails the first read with a timeout, then reads from `inner`.
    struct StallOnce {
        stalled: bool,
        inner: FakeStream,
    }

    impl Read for StallOnce {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.stalled {
                self.stalled = true;
                return Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"));
            }
            self.inner.read(buf)
        }
    }

    impl Write for StallOnce {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.inner.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn timeout_poisons_the_connection() {
        let mut conn = RespConnection::from_stream(StallOnce {
            stalled: false,
            inner: FakeStream::replying(b"*1\r\n$5\r\nA-old\r\n*1\r\n$5\r\nB-new\r\n"),
        });
        assert!(matches!(
            conn.multi_get("a:1:1", &[1]),
            Err(StoreError::Io(_))
        ));
        assert!(conn.is_broken());
        match conn.multi_get("b:2:2", &[1]) {
            Err(StoreError::Protocol(msg)) => assert_eq!(msg, "connection is broken"),
            other => panic!("stale reply served: {:?}", other),
        }
        let sent = &conn.get_ref().inner.output;
        assert!(!sent.windows(5).any(|w| w == b"b:2:2"));
    }

    #[test]
    fn server_error_keeps_the_connection() {
        let mut conn = RespConnection::from_stream(FakeStream::replying(b"-ERR nope\r\n:1\r\n"));
        assert!(matches!(
            conn.multi_set("k", &[(1, b"x".to_vec())]),
            Err(StoreError::Server(_))
        ));
        assert!(!conn.is_broken());
        conn.multi_set("k", &[(1, b"x".to_vec())]).unwrap();
    }

    #[test]
    fn oversized_line_is_rejected() {
        let mut reply = b"+".to_vec();
        reply.extend(std::iter::repeat(b'a').take(MAX_LINE_LEN + 16));
        reply.extend_from_slice(b"\r\n");
        let mut conn = RespConnection::from_stream(FakeStream::replying(&reply));
        match conn.command(&[b"PING"]) {
            Err(StoreError::Protocol(msg)) => assert!(msg.contains("too long")),
            other => panic!("unexpected result {:?}", other),
        }
        assert!(conn.is_broken());
    }

    #[test]
    fn declared_bulk_length_is_not_trusted() {
        let mut conn =
            RespConnection::from_stream(FakeStream::replying(b"$536870912\r\nshort\r\n"));
        match conn.command(&[b"GET", b"k"]) {
            Err(StoreError::Protocol(msg)) => assert!(msg.contains("truncated")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn nested_arrays_parse() {
        let mut conn = RespConnection::from_stream(FakeStream::replying(
            b"*2\r\n*1\r\n:7\r\n+PONG\r\n",
        ));
        assert_eq!(
            conn.command(&[b"X"]).unwrap(),
            RespValue::Array(Some(vec![
                RespValue::Array(Some(vec![RespValue::Integer(7)])),
                RespValue::Simple("PONG".into()),
            ]))
        );
    }
}
