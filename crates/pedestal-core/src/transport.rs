//! Line-framed transport channel.
//!
//! Provides [`ConnectedChannel`] which carries [`ClientMessage`]s to the
//! device server and [`ServerMessage`]s back over any byte stream. This is a
//! thin layer that only moves messages. Session logic stays in the Sans-IO
//! [`crate::Session`].
//!
//! End-of-stream or a read error closes `from_server`, which the runtime
//! reports to the session as channel loss. A malformed line is logged and
//! skipped, as is one longer than [`codec::MAX_LINE_LEN`]. Reads never buffer
//! more than one line's limit.

use pedestal_proto::{ClientMessage, ProtocolError, ServerMessage, codec};
use serde::{Serialize, de::DeserializeOwned};
use tokio::{
    io::{
        AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf,
        WriteHalf,
    },
    net::TcpStream,
    sync::mpsc,
    task::AbortHandle,
};

use crate::error::TransportError;

/// Capacity of the in-memory queues on either side of the channel.
pub const CHANNEL_CAPACITY: usize = 256;

/// Reads one message per line.
pub struct LineReader<R> {
    reader: BufReader<R>,
    line: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Wrap a byte reader.
    pub fn new(reader: R) -> Self {
        Self { reader: BufReader::new(reader), line: Vec::new() }
    }

    /// Next message. `Ok(None)` at end-of-stream. Blank lines are skipped.
    ///
    /// A malformed line is consumed whole and reported as
    /// [`TransportError::Protocol`], so the next call starts on a fresh line.
    pub async fn recv<T: DeserializeOwned>(&mut self) -> Result<Option<T>, TransportError> {
        loop {
            if !self.read_line().await? {
                return Ok(None);
            }

            if !self.line.ends_with(b"\n") && self.line.len() > codec::MAX_LINE_LEN {
                let len = self.line.len() + self.discard_line().await?;
                return Err(ProtocolError::LineTooLong { len, max: codec::MAX_LINE_LEN }.into());
            }

            // The final line may lack a terminator.
            let body = self.line.strip_suffix(b"\n").unwrap_or(&self.line);
            if body.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return decode_line(body).map(Some);
        }
    }

    /// Read up to one line, capped one byte past the limit. Returns `false` at
    /// end-of-stream.
    async fn read_line(&mut self) -> Result<bool, TransportError> {
        self.line.clear();
        let cap = (codec::MAX_LINE_LEN + 1) as u64;
        let read = (&mut self.reader).take(cap).read_until(b'\n', &mut self.line).await?;
        Ok(read > 0)
    }

    /// Drop the rest of an over-long line. Returns the bytes skipped.
    async fn discard_line(&mut self) -> Result<usize, TransportError> {
        let mut skipped = 0;
        loop {
            if !self.read_line().await? {
                return Ok(skipped);
            }
            skipped += self.line.len();
            if self.line.ends_with(b"\n") {
                return Ok(skipped);
            }
        }
    }
}

fn decode_line<T: DeserializeOwned>(body: &[u8]) -> Result<T, TransportError> {
    let text = std::str::from_utf8(body).map_err(|_| ProtocolError::InvalidUtf8)?;
    Ok(codec::decode(text)?)
}

/// Writes one message per line, flushing after each.
pub struct LineWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> LineWriter<W> {
    /// Wrap a byte writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Encode and write one message.
    pub async fn send<T: Serialize>(&mut self, message: &T) -> Result<(), TransportError> {
        let line = codec::encode(message)?;
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Split a duplex stream into a line reader and writer.
pub fn split<S>(stream: S) -> (LineReader<ReadHalf<S>>, LineWriter<WriteHalf<S>>)
where
    S: AsyncRead + AsyncWrite,
{
    let (reader, writer) = tokio::io::split(stream);
    (LineReader::new(reader), LineWriter::new(writer))
}

/// Handle to a running transport channel.
///
/// Messages are sent/received via the queues, and background tasks handle
/// the stream I/O.
pub struct ConnectedChannel {
    /// Send messages to the server.
    pub to_server: mpsc::Sender<ClientMessage>,
    /// Receive messages from the server. Closes when the channel is lost.
    pub from_server: mpsc::Receiver<ServerMessage>,
    reader: AbortHandle,
    writer: AbortHandle,
}

impl ConnectedChannel {
    /// Stop both I/O tasks. `from_server` closes once buffered messages drain.
    pub fn stop(&self) {
        self.reader.abort();
        self.writer.abort();
    }
}

/// Connect to a device server over TCP.
pub async fn connect(server_addr: &str) -> Result<ConnectedChannel, TransportError> {
    let stream = TcpStream::connect(server_addr)
        .await
        .map_err(|e| TransportError::Connection(format!("{server_addr}: {e}")))?;
    stream.set_nodelay(true)?;

    tracing::info!(%server_addr, "connected to device server");
    Ok(spawn(stream))
}

/// Run a channel over an already established stream.
///
/// Must be called from within a tokio runtime.
pub fn spawn<S>(stream: S) -> ConnectedChannel
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (reader, writer) = split(stream);
    let (to_server_tx, to_server_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (from_server_tx, from_server_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let reader = tokio::spawn(forward_incoming(reader, from_server_tx)).abort_handle();
    let writer =
        tokio::spawn(forward_outgoing(writer, to_server_rx, reader.clone())).abort_handle();

    ConnectedChannel { to_server: to_server_tx, from_server: from_server_rx, reader, writer }
}

async fn forward_incoming<R>(mut reader: LineReader<R>, tx: mpsc::Sender<ServerMessage>)
where
    R: AsyncRead + Unpin,
{
    loop {
        match reader.recv::<ServerMessage>().await {
            Ok(Some(message)) => {
                if tx.send(message).await.is_err() {
                    break;
                }
            },
            Ok(None) => {
                tracing::info!("device server closed the channel");
                break;
            },
            Err(e) if e.is_channel_lost() => {
                tracing::warn!(error = %e, "channel read failed");
                break;
            },
            Err(e) => tracing::warn!(error = %e, "skipping malformed line"),
        }
    }
}

async fn forward_outgoing<W>(
    mut writer: LineWriter<W>,
    mut rx: mpsc::Receiver<ClientMessage>,
    reader: AbortHandle,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = rx.recv().await {
        if let Err(e) = writer.send(&message).await {
            tracing::warn!(error = %e, event = message.event_name(), "channel write failed");
            break;
        }
    }
    reader.abort();
}
