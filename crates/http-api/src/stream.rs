//! Bridge from blocking [`Write`] producers to an async response body.
//!
//! Exports run on a blocking worker and write into a [`ChannelWriter`];
//! the handler turns the receiving half into a streamed body. When the
//! client goes away the receiver is dropped and the next write fails with
//! [`io::ErrorKind::BrokenPipe`].

use std::io::{self, Write};

use bytes::Bytes;
use tokio::sync::mpsc;

/// Bytes accumulated before a chunk is handed to the body.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Chunks in flight between the worker and the response.
pub const CHANNEL_DEPTH: usize = 8;

pub type BodyChunk = Result<Bytes, io::Error>;

/// Create the channel feeding a streamed response body.
pub fn body_channel() -> (mpsc::Sender<BodyChunk>, mpsc::Receiver<BodyChunk>) {
    mpsc::channel(CHANNEL_DEPTH)
}

/// Blocking writer that forwards buffered chunks over a bounded channel.
///
/// Must only be used from a thread that may block.
pub struct ChannelWriter {
    tx: mpsc::Sender<BodyChunk>,
    buf: Vec<u8>,
}

impl ChannelWriter {
    pub fn new(tx: mpsc::Sender<BodyChunk>) -> Self {
        Self {
            tx,
            buf: Vec::with_capacity(CHUNK_SIZE),
        }
    }

    fn send_buffered(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = Bytes::from(std::mem::replace(
            &mut self.buf,
            Vec::with_capacity(CHUNK_SIZE),
        ));
        self.tx
            .blocking_send(Ok(chunk))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "response body closed"))
    }
}

impl Write for ChannelWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        if self.buf.len() >= CHUNK_SIZE {
            self.send_buffered()?;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.send_buffered()
    }
}

/// Reduce a download name to printable ASCII safe inside a quoted
/// `Content-Disposition` filename.
pub fn header_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '"' && *c != '\\')
        .map(|c| {
            if c.is_ascii_graphic() || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
