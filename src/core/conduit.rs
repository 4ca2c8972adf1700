// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

use super::get::SourceBody;
use crate::error::Error;
use bytes::Bytes;
use futures::{
    stream::{self, BoxStream},
    StreamExt,
};
use std::io;
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;

/// Read half of the conduit, consumed by the upload as an `AsyncRead`.
///
/// A failure on the write side surfaces here as a read error rather
/// than as end of stream.
pub type ConduitReader = StreamReader<BoxStream<'static, io::Result<Bytes>>, Bytes>;

/// Write half of the conduit, fed by the source body
pub struct ConduitWriter {
    sender: mpsc::Sender<io::Result<Bytes>>,
}

/// Creates a pass-through conduit holding at most `capacity` chunks.
///
/// Once it is full, `ConduitWriter::send` waits until the reader
/// drains a chunk, throttling the producer to the consumer's pace.
pub fn conduit(capacity: usize) -> (ConduitWriter, ConduitReader) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));

    let chunks = stream::unfold(receiver, |mut receiver| async move {
        receiver.recv().await.map(|chunk| (chunk, receiver))
    })
    .boxed();

    (ConduitWriter { sender }, StreamReader::new(chunks))
}

impl ConduitWriter {
    pub async fn send(&self, chunk: Bytes) -> Result<(), Error> {
        self.sender
            .send(Ok(chunk))
            .await
            .map_err(|_| Error::internal("conduit reader was dropped"))
    }

    /// Resolves once the reader was dropped
    pub async fn closed(&self) {
        self.sender.closed().await
    }

    /// Hands `message` to the reader as an error and closes the conduit
    pub async fn fail(self, message: String) {
        let _ = self.sender.send(Err(io::Error::other(message))).await;
    }
}

/// Forwards every chunk of `body` into `writer`.
///
/// Returns the number of bytes forwarded. Dropping the writer on success
/// is what signals end of stream to the reader.
///
/// Stops as soon as the reader is dropped, even while waiting on a source
/// that stopped sending.
pub async fn pump(mut body: SourceBody, writer: ConduitWriter) -> Result<u64, Error> {
    let mut forwarded = 0u64;

    loop {
        let chunk = tokio::select! {
            biased;
            chunk = body.next() => chunk,
            _ = writer.closed() => return Err(Error::internal("conduit reader was dropped")),
        };

        let Some(chunk) = chunk else {
            break;
        };

        match chunk {
            Ok(chunk) => {
                let length = chunk.len() as u64;

                writer.send(chunk).await?;
                forwarded += length;
            }
            Err(err) => {
                writer.fail(err.to_string()).await;

                return Err(err);
            }
        }
    }

    Ok(forwarded)
}
