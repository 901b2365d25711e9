// Write suspension around the 32 KiB queued-byte threshold.

mod common;

#[cfg(test)]
mod tests {
    use std::task::Poll;

    use futures::{poll, StreamExt};

    use compression_stream::constants::BACKPRESSURE_THRESHOLD;
    use compression_stream::types::StreamError;
    use compression_stream::validate::{ByteView, NOT_A_BUFFER};

    use crate::common::{init_logging, manual_stream};

    #[test]
    fn write_below_threshold_resolves_immediately() {
        init_logging();
        let (stream, engine) = manual_stream();
        let (mut tx, _rx) = stream.into_parts();

        pollster::block_on(tx.write(vec![1u8; 1000])).unwrap();
        assert_eq!(engine.queued(), 1000);
        assert_eq!(engine.pushed().len(), 1);
    }

    #[test]
    fn write_suspends_until_a_drain_sees_the_counter_below_threshold() {
        init_logging();
        let (stream, engine) = manual_stream();
        let (mut tx, _rx) = stream.into_parts();

        pollster::block_on(async {
            let mut write = Box::pin(tx.write(vec![0u8; 40_000]));
            assert!(poll!(write.as_mut()).is_pending());
            assert_eq!(engine.queued(), 40_000);

            // Still above the threshold: stays suspended.
            engine.drain(5_000);
            assert!(poll!(write.as_mut()).is_pending());

            // Counter drops but nobody reports it yet.
            engine.settle_silently(10_000);
            assert!(poll!(write.as_mut()).is_pending());

            engine.notify_drain();
            assert_eq!(poll!(write.as_mut()), Poll::Ready(Ok(())));
        });

        // Further drains with nobody waiting are harmless.
        engine.drain(1_000);
        engine.notify_drain();
        assert_eq!(tx.snapshot().counters.drain_waits, 1);
    }

    #[test]
    fn queued_bytes_accumulate_across_writes() {
        init_logging();
        let (stream, engine) = manual_stream();
        let (mut tx, _rx) = stream.into_parts();

        pollster::block_on(tx.write(vec![0u8; 20_000])).unwrap();

        pollster::block_on(async {
            let mut write = Box::pin(tx.write(vec![0u8; 20_000]));
            assert!(poll!(write.as_mut()).is_pending());
            engine.drain(20_000);
            assert_eq!(poll!(write.as_mut()), Poll::Ready(Ok(())));
        });
        assert_eq!(engine.queued(), 20_000);
    }

    #[test]
    fn exactly_threshold_suspends() {
        init_logging();
        let (stream, engine) = manual_stream();
        let (mut tx, _rx) = stream.into_parts();

        pollster::block_on(async {
            let mut write = Box::pin(tx.write(vec![0u8; BACKPRESSURE_THRESHOLD]));
            assert!(poll!(write.as_mut()).is_pending());
            engine.drain(1);
            assert!(poll!(write.as_mut()).is_ready());
        });
    }

    #[test]
    fn rejected_chunk_leaves_counter_untouched() {
        init_logging();
        let (stream, engine) = manual_stream();
        let (mut tx, _rx) = stream.into_parts();

        let err = pollster::block_on(tx.write("not bytes")).unwrap_err();
        assert_eq!(err, StreamError::Validation(NOT_A_BUFFER.into()));
        assert_eq!(engine.queued(), 0);
        assert!(engine.pushed().is_empty());

        // The stream stays usable.
        pollster::block_on(tx.write(b"ok")).unwrap();
        assert_eq!(engine.queued(), 2);
    }

    #[test]
    fn views_push_only_their_range() {
        init_logging();
        let (stream, engine) = manual_stream();
        let (mut tx, _rx) = stream.into_parts();

        pollster::block_on(tx.write(ByteView::new(b"0123456789".to_vec(), 4, 3))).unwrap();
        assert_eq!(engine.pushed()[0].0.as_ref(), b"456");
        assert_eq!(engine.queued(), 3);
    }

    #[test]
    fn error_releases_a_suspended_write() {
        init_logging();
        let (stream, engine) = manual_stream();
        let (mut tx, mut rx) = stream.into_parts();

        pollster::block_on(async {
            let mut write = Box::pin(tx.write(vec![0u8; 50_000]));
            assert!(poll!(write.as_mut()).is_pending());
            engine.fail("boom");
            match poll!(write.as_mut()) {
                Poll::Ready(Err(StreamError::Engine(_))) => {}
                other => panic!("unexpected {other:?}"),
            }
        });
        assert!(engine.terminated());

        let first = pollster::block_on(rx.next());
        assert!(matches!(first, Some(Err(StreamError::Engine(_)))));
        assert!(pollster::block_on(rx.next()).is_none());
    }

    #[test]
    fn full_readable_queue_holds_writes() {
        init_logging();
        let (stream, engine) = manual_stream();
        let (mut tx, mut rx) = stream.into_parts();

        // Default readable high-water mark is 64 KiB.
        engine.data(&vec![7u8; 70_000], false);
        assert!(tx.desired_size() < 0);

        pollster::block_on(async {
            let mut write = Box::pin(tx.write(b"next"));
            assert!(poll!(write.as_mut()).is_pending());
            assert!(engine.pushed().is_empty());

            let chunk = rx.next().await.unwrap().unwrap();
            assert_eq!(chunk.len(), 70_000);
            assert_eq!(poll!(write.as_mut()), Poll::Ready(Ok(())));
        });
        assert_eq!(engine.pushed().len(), 1);
    }
}
