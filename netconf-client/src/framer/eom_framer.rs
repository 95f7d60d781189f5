use crate::error::{NetconfClientError, NetconfClientResult};
use crate::framer::{Framer, NETCONF_1_0_TERMINATOR};
use async_trait::async_trait;
use core::time::Duration;
use log::{debug, warn};
use memmem::{Searcher, TwoWaySearcher};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::select;
use tokio::time::{self, sleep};

const READ_CHUNK_SIZE: usize = 8192;

/// How long the channel must stay idle after a trailing `]]>]]>` with no
/// line ending before the delimiter is taken as the end of the message.
pub const TRAILING_DELIMITER_GRACE: Duration = Duration::from_millis(50);

/// End-of-message framing for NETCONF 1.0.
/// See [RFC6242](https://tools.ietf.org/html/rfc6242#section-4.3)
///
/// Inbound bytes are split into lines; a line equal to `]]>]]>` (or ending
/// with it) closes the message. Buffered bytes and already collected lines
/// belong to the framer, not to a single read, so a read cancelled by its
/// deadline leaves the stream position intact.
///
/// A delimiter that is the last thing received, with no line ending after
/// it, only closes the message once the channel has been idle for
/// [`TRAILING_DELIMITER_GRACE`] or has reached end of stream. Until then it
/// may still turn out to be content in the middle of a line.
pub struct EomFramer<T> {
    read_buffer: Vec<u8>,
    // Prefix of read_buffer known to hold no line ending.
    scanned: usize,
    lines: Vec<String>,
    // The last delimiter was not yet followed by its line ending.
    pending_line_end: bool,

    channel: T,
}

impl<T: AsyncRead + AsyncWrite + Unpin> EomFramer<T> {
    pub fn new(channel: T) -> Self {
        EomFramer {
            read_buffer: Vec::new(),
            scanned: 0,
            lines: Vec::new(),
            pending_line_end: false,
            channel,
        }
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.channel
    }

    pub fn into_inner(self) -> T {
        self.channel
    }

    async fn scan(&mut self) -> NetconfClientResult<String> {
        let mut buffer = [0u8; READ_CHUNK_SIZE];
        loop {
            if let Some(message) = self.take_message() {
                return Ok(message);
            }
            let trailing_delimiter = self.has_trailing_delimiter();
            let read = if trailing_delimiter {
                let next = self.channel.read(&mut buffer);
                match time::timeout(TRAILING_DELIMITER_GRACE, next).await {
                    Ok(read) => read,
                    Err(_) => return Ok(self.take_unterminated_message()),
                }
            } else {
                self.channel.read(&mut buffer).await
            };
            let bytes = read.map_err(NetconfClientError::TransportReadFailed)?;
            if bytes == 0 {
                if trailing_delimiter {
                    return Ok(self.take_unterminated_message());
                }
                return Err(NetconfClientError::TransportReadFailed(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stream closed before NETCONF delimiter",
                )));
            }
            self.read_buffer.extend_from_slice(&buffer[..bytes]);
        }
    }

    /// Moves complete lines into the pending message and returns it once a
    /// delimiter line is seen. Only bytes past `scanned` are searched.
    fn take_message(&mut self) -> Option<String> {
        if self.pending_line_end && !self.skip_line_end() {
            return None;
        }
        let search = TwoWaySearcher::new(b"\n");
        let mut start = 0;
        let mut complete = false;
        while self.scanned < self.read_buffer.len() {
            let Some(pos) = search.search_in(&self.read_buffer[self.scanned..]) else {
                break;
            };
            let end = self.scanned + pos;
            complete = push_line(&mut self.lines, &self.read_buffer[start..end]);
            start = end + 1;
            self.scanned = start;
            if complete {
                break;
            }
        }
        if !complete {
            self.scanned = self.read_buffer.len();
        }
        self.read_buffer.drain(..start);
        self.scanned -= start;
        if complete {
            Some(self.finish())
        } else {
            None
        }
    }

    fn has_trailing_delimiter(&self) -> bool {
        !self.pending_line_end
            && self
                .read_buffer
                .ends_with(NETCONF_1_0_TERMINATOR.as_bytes())
    }

    /// Closes the message on a delimiter that ends the buffered bytes. The
    /// buffer holds no line ending at this point.
    fn take_unterminated_message(&mut self) -> String {
        let line = std::mem::take(&mut self.read_buffer);
        self.scanned = 0;
        push_line(&mut self.lines, &line);
        self.pending_line_end = true;
        self.finish()
    }

    /// Drops the line ending of a delimiter line that completed a previous
    /// message. Returns false while there is not enough input to decide.
    ///
    /// A message that follows an unterminated delimiter therefore loses one
    /// leading blank line: that first `\n` (or `\r\n`) is taken as the
    /// delimiter's own line ending.
    fn skip_line_end(&mut self) -> bool {
        let line_end = match self.read_buffer.as_slice() {
            [] | [b'\r'] => return false,
            [b'\r', b'\n', ..] => 2,
            [b'\n', ..] => 1,
            _ => 0,
        };
        self.read_buffer.drain(..line_end);
        self.pending_line_end = false;
        true
    }

    fn finish(&mut self) -> String {
        std::mem::take(&mut self.lines).join("\n")
    }
}

/// Appends one line to the pending message, returns true when the line
/// terminates it.
fn push_line(lines: &mut Vec<String>, raw: &[u8]) -> bool {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line = String::from_utf8_lossy(raw);
    match line.strip_suffix(NETCONF_1_0_TERMINATOR) {
        Some("") => true,
        Some(content) => {
            lines.push(content.to_string());
            true
        }
        None => {
            lines.push(line.to_string());
            false
        }
    }
}

#[async_trait]
impl<T: AsyncRead + AsyncWrite + Unpin + Send> Framer for EomFramer<T> {
    async fn read_async(&mut self, timeout: Duration) -> NetconfClientResult<String> {
        // Losing the race drops the scan; its progress stays in the buffers.
        let outcome = select! {
            result = self.scan() => Some(result),
            _ = sleep(timeout) => None,
        };
        match outcome {
            Some(result) => {
                let message = result?;
                debug!("Received:\n{}", message);
                Ok(message)
            }
            None => {
                warn!(
                    "No NETCONF delimiter within {:?} ({} lines, {} bytes pending)",
                    timeout,
                    self.lines.len(),
                    self.read_buffer.len()
                );
                Err(NetconfClientError::TimedOut(timeout))
            }
        }
    }

    async fn write_async(&mut self, message: &str) -> NetconfClientResult<()> {
        debug!("Sending:\n{}", message);
        let framed = format!("{}{}", message, NETCONF_1_0_TERMINATOR);
        self.channel
            .write_all(framed.as_bytes())
            .await
            .map_err(NetconfClientError::TransportWriteFailed)?;
        self.channel
            .flush()
            .await
            .map_err(NetconfClientError::TransportWriteFailed)
    }
}
