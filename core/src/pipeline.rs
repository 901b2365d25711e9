//! pipeline.rs
//! Drivers that push whole inputs through a transform stream.
//!
//! `run_pipeline` moves bytes between a blocking reader and writer using a
//! producer thread; `transform_all` does the same for in-memory chunks on a
//! single task.

use std::io::{Read, Write};
use std::thread;

use bytes::Bytes;
use futures::StreamExt;
use log::{debug, info, warn};

use crate::compression::DeflateOptions;
use crate::constants::DEFAULT_CHUNK_SIZE;
use crate::stream::{CompressionStream, DecompressionStream, TransformReader, TransformStream, TransformWriter};
use crate::telemetry::TransformSnapshot;
use crate::types::StreamError;
use crate::validate::StreamChunk;

/// Read up to `len` bytes, stopping early only at EOF.
pub fn read_exact_or_eof<R: Read>(r: &mut R, len: usize) -> Result<Bytes, StreamError> {
    let mut buf = vec![0u8; len];
    let mut off = 0;

    while off < len {
        let n = r.read(&mut buf[off..])?;
        if n == 0 {
            break;
        }
        off += n;
    }

    buf.truncate(off);
    Ok(Bytes::from(buf))
}

/// Producer errors take precedence over the `Cancelled` they cause downstream.
fn settle(produced: Result<(), StreamError>, consumed: Result<(), StreamError>) -> Result<(), StreamError> {
    match (produced, consumed) {
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(_)) if e != StreamError::Cancelled => Err(e),
        (_, consumed) => consumed,
    }
}

fn feed<R: Read>(reader: &mut R, tx: &mut TransformWriter, chunk_size: usize) -> Result<(), StreamError> {
    loop {
        let buf = read_exact_or_eof(reader, chunk_size)?;
        if buf.is_empty() {
            break;
        }
        pollster::block_on(tx.write(buf))?;
    }
    pollster::block_on(tx.close())
}

fn drain_into<W: Write>(rx: &mut TransformReader, writer: &mut W) -> Result<(), StreamError> {
    while let Some(chunk) = pollster::block_on(rx.next()) {
        writer.write_all(&chunk?)?;
    }
    Ok(())
}

/// Stream everything from `reader` through `stream` into `writer`.
pub fn run_pipeline<R, W>(
    mut reader: R,
    mut writer: W,
    stream: TransformStream,
    chunk_size: usize,
) -> Result<TransformSnapshot, StreamError>
where
    R: Read + Send,
    W: Write,
{
    let chunk_size = chunk_size.max(1);
    let (mut tx, mut rx) = stream.into_parts();
    let name = tx.name();
    info!("[PIPELINE] {name}: start ({} engine, {chunk_size} byte chunks)", tx.engine_mode());

    let result = thread::scope(|scope| {
        let producer = scope.spawn(move || {
            let result = feed(&mut reader, &mut tx, chunk_size);
            if let Err(e) = &result {
                debug!("[PIPELINE] {name}: producer failed: {e}");
                tx.abort();
            }
            result
        });

        let consumed = drain_into(&mut rx, &mut writer);
        if consumed.is_err() {
            rx.cancel();
        }

        let produced = producer
            .join()
            .unwrap_or_else(|_| Err(StreamError::State("pipeline producer panicked")));
        settle(produced, consumed)
    });

    if let Err(e) = result {
        warn!("[PIPELINE] {name}: failed: {e}");
        return Err(e);
    }
    writer.flush()?;

    let snapshot = rx.snapshot();
    info!(
        "[PIPELINE] {name}: done, {} bytes in, {} bytes out in {:?}",
        snapshot.counters.bytes_in, snapshot.counters.bytes_out, snapshot.elapsed
    );
    Ok(snapshot)
}

async fn feed_all<I>(tx: &mut TransformWriter, chunks: I) -> Result<(), StreamError>
where
    I: IntoIterator,
    I::Item: Into<StreamChunk>,
{
    for chunk in chunks {
        tx.write(chunk).await?;
    }
    tx.close().await
}

/// Write every chunk, close, and collect the output concurrently.
pub async fn transform_all<I>(stream: TransformStream, chunks: I) -> Result<Vec<u8>, StreamError>
where
    I: IntoIterator,
    I::Item: Into<StreamChunk>,
{
    let (mut tx, mut rx) = stream.into_parts();

    let produce = async {
        let result = feed_all(&mut tx, chunks).await;
        if result.is_err() {
            tx.abort();
        }
        result
    };
    let (produced, consumed) = futures::join!(produce, rx.read_all());

    let mut output = Vec::new();
    let consumed = consumed.map(|bytes| output = bytes);
    settle(produced, consumed)?;
    Ok(output)
}

fn chunks_of(data: &[u8]) -> impl Iterator<Item = Bytes> + '_ {
    data.chunks(DEFAULT_CHUNK_SIZE).map(Bytes::copy_from_slice)
}

/// Compress `data` in one call.
pub fn compress(format: &str, data: &[u8]) -> Result<Vec<u8>, StreamError> {
    pollster::block_on(transform_all(CompressionStream::new(format)?, chunks_of(data)))
}

pub fn compress_with(format: &str, options: DeflateOptions, data: &[u8]) -> Result<Vec<u8>, StreamError> {
    pollster::block_on(transform_all(CompressionStream::with_options(format, options)?, chunks_of(data)))
}

/// Decompress `data` in one call.
pub fn decompress(format: &str, data: &[u8]) -> Result<Vec<u8>, StreamError> {
    pollster::block_on(transform_all(DecompressionStream::new(format)?, chunks_of(data)))
}
