// Error propagation from codecs and from either end of the stream.

mod common;

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use compression_stream::compression::{CodecError, CompressionFormat};
    use compression_stream::dispatch::DispatchTable;
    use compression_stream::engine::Capability;
    use compression_stream::pipeline::{compress, transform_all};
    use compression_stream::stream::{make_decompression_stream, TransformStream};
    use compression_stream::types::StreamError;

    use crate::common::{init_logging, manual_stream};

    fn decompressor(capability: Capability, format: &str) -> TransformStream {
        make_decompression_stream(&DispatchTable::new(capability)).construct(Some(format)).unwrap()
    }

    /// Drive a decompressor by hand and collect every item the reader yields.
    fn drive(capability: Capability, format: &str, input: &[u8]) -> (Vec<Result<Vec<u8>, StreamError>>, u64) {
        let (mut tx, mut rx) = decompressor(capability, format).into_parts();

        pollster::block_on(async {
            let _ = tx.write(input.to_vec()).await;
            let _ = tx.close().await;
        });

        let mut items = Vec::new();
        while let Some(item) = pollster::block_on(rx.next()) {
            items.push(item.map(|b| b.to_vec()));
        }
        (items, rx.snapshot().counters.errors)
    }

    fn single_error(items: &[Result<Vec<u8>, StreamError>]) -> CodecError {
        let errors: Vec<_> = items.iter().filter_map(|i| i.as_ref().err()).collect();
        assert_eq!(errors.len(), 1, "items: {items:?}");
        assert!(items.last().unwrap().is_err(), "error must be the last item");
        match errors[0] {
            StreamError::Engine(e) => e.clone(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn garbage_gzip_surfaces_one_error() {
        init_logging();
        for capability in [Capability::WORKER, Capability::INLINE] {
            let (items, errors) = drive(capability, "gzip", b"definitely not gzip");
            let err = single_error(&items);
            assert!(matches!(err, CodecError::InvalidHeader { codec: "gzip", .. }));
            assert_eq!(errors, 1);
        }
    }

    #[test]
    fn truncated_input_reports_unexpected_eof() {
        init_logging();
        let data = b"0123456789".repeat(500);
        for format in CompressionFormat::ALL {
            let compressed = compress(format.name(), &data).unwrap();
            let cut = &compressed[..compressed.len() / 2];

            for capability in [Capability::WORKER, Capability::INLINE] {
                let (items, _) = drive(capability, format.name(), cut);
                assert_eq!(single_error(&items), CodecError::UnexpectedEof { codec: format.name() });
            }
        }
    }

    #[test]
    fn trailing_bytes_are_an_error() {
        init_logging();
        let mut compressed = compress("deflate", b"short").unwrap();
        compressed.extend_from_slice(b"extra");

        let (items, _) = drive(Capability::INLINE, "deflate", &compressed);
        assert_eq!(single_error(&items), CodecError::TrailingData { codec: "deflate" });
    }

    #[test]
    fn corrupt_checksum_is_detected() {
        init_logging();
        let mut compressed = compress("gzip", b"checksummed payload").unwrap();
        let crc_at = compressed.len() - 8;
        compressed[crc_at] ^= 0xff;

        let (items, _) = drive(Capability::WORKER, "gzip", &compressed);
        assert!(matches!(single_error(&items), CodecError::ChecksumMismatch { codec: "gzip", .. }));
    }

    #[test]
    fn transform_all_returns_the_engine_error() {
        init_logging();
        let result = pollster::block_on(transform_all(
            decompressor(Capability::INLINE, "deflate-raw"),
            vec![vec![0xffu8; 32]],
        ));
        assert!(matches!(result, Err(StreamError::Engine(CodecError::Corrupt { .. }))));
    }

    #[test]
    fn only_the_first_engine_error_counts() {
        init_logging();
        let (stream, engine) = manual_stream();
        let (mut tx, mut rx) = stream.into_parts();

        engine.data(b"before", false);
        engine.fail("first");
        engine.fail("second");
        engine.data(b"after", false);

        let err = pollster::block_on(tx.write(b"more")).unwrap_err();
        assert_eq!(
            err,
            StreamError::Engine(CodecError::InvalidHeader { codec: "manual", msg: "first" })
        );
        assert!(engine.terminated());
        assert!(engine.pushed().is_empty());

        // Output queued before the error is discarded along with it.
        let first = pollster::block_on(rx.next()).unwrap();
        assert_eq!(first, Err(err.clone()));
        assert!(pollster::block_on(rx.next()).is_none());
        assert_eq!(rx.snapshot().counters.errors, 1);

        assert_eq!(pollster::block_on(tx.close()), Err(err));
    }

    #[test]
    fn abort_errors_the_reader() {
        init_logging();
        let (stream, engine) = manual_stream();
        let (mut tx, mut rx) = stream.into_parts();

        tx.abort();
        assert!(engine.terminated());
        assert_eq!(pollster::block_on(rx.next()), Some(Err(StreamError::Aborted)));
        assert_eq!(pollster::block_on(tx.write(b"x")), Err(StreamError::Aborted));
    }

    #[test]
    fn dropping_the_writer_aborts() {
        init_logging();
        let (stream, engine) = manual_stream();
        let (tx, mut rx) = stream.into_parts();

        drop(tx);
        assert!(engine.terminated());
        assert_eq!(pollster::block_on(rx.next()), Some(Err(StreamError::Aborted)));
    }

    #[test]
    fn cancelling_the_reader_fails_writes() {
        init_logging();
        let (stream, engine) = manual_stream();
        let (mut tx, mut rx) = stream.into_parts();

        rx.cancel();
        assert_eq!(pollster::block_on(tx.write(b"x")), Err(StreamError::Cancelled));
        assert!(engine.terminated());
        assert!(pollster::block_on(rx.next()).is_some());
        assert!(pollster::block_on(rx.next()).is_none());
    }
}
