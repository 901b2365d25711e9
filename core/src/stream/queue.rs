//! Readable-side chunk queue with byte-length high-water-mark accounting.
//!
//! This is the controller the bridge talks to: `enqueue`, `error` and `close`
//! are the only ways output reaches the consumer.

use std::collections::VecDeque;
use std::task::{Context, Poll, Waker};

use bytes::Bytes;

use crate::types::StreamError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum QueueState {
    Open,
    Closed,
    Errored(StreamError),
    /// The error has been handed to the reader.
    Finished,
}

#[derive(Debug)]
pub struct ReadableQueue {
    chunks: VecDeque<Bytes>,
    size: usize,
    high_water_mark: usize,
    state: QueueState,
    reader: Option<Waker>,
    writer: Option<Waker>,
}

impl ReadableQueue {
    pub fn new(high_water_mark: usize) -> Self {
        Self {
            chunks: VecDeque::new(),
            size: 0,
            high_water_mark,
            state: QueueState::Open,
            reader: None,
            writer: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == QueueState::Open
    }

    pub fn desired_size(&self) -> isize {
        self.high_water_mark as isize - self.size as isize
    }

    pub fn enqueue(&mut self, chunk: Bytes) -> bool {
        if !self.is_open() {
            return false;
        }
        self.size += chunk.len();
        self.chunks.push_back(chunk);
        self.wake_reader();
        true
    }

    /// Error the queue. Unread chunks are discarded.
    pub fn error(&mut self, error: StreamError) -> bool {
        if !self.is_open() {
            return false;
        }
        self.state = QueueState::Errored(error);
        self.chunks.clear();
        self.size = 0;
        self.wake_reader();
        self.wake_writer();
        true
    }

    /// End the stream once the queued chunks have been read.
    pub fn close(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.state = QueueState::Closed;
        self.wake_reader();
        self.wake_writer();
        true
    }

    pub fn poll_next(&mut self, cx: &mut Context<'_>) -> Poll<Option<Result<Bytes, StreamError>>> {
        if let Some(chunk) = self.chunks.pop_front() {
            self.size -= chunk.len();
            if self.size < self.high_water_mark {
                self.wake_writer();
            }
            return Poll::Ready(Some(Ok(chunk)));
        }

        match std::mem::replace(&mut self.state, QueueState::Finished) {
            QueueState::Open => {
                self.state = QueueState::Open;
                self.reader = Some(cx.waker().clone());
                Poll::Pending
            }
            QueueState::Closed => {
                self.state = QueueState::Closed;
                Poll::Ready(None)
            }
            QueueState::Errored(error) => Poll::Ready(Some(Err(error))),
            QueueState::Finished => Poll::Ready(None),
        }
    }

    /// Ready once the queue is below its high-water mark or no longer open.
    pub fn poll_capacity(&mut self, cx: &mut Context<'_>) -> Poll<()> {
        if self.size < self.high_water_mark || !self.is_open() {
            return Poll::Ready(());
        }
        self.writer = Some(cx.waker().clone());
        Poll::Pending
    }

    fn wake_reader(&mut self) {
        if let Some(waker) = self.reader.take() {
            waker.wake();
        }
    }

    fn wake_writer(&mut self) {
        if let Some(waker) = self.writer.take() {
            waker.wake();
        }
    }
}
