// Blocking reader -> stream -> writer driver.

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Read, Write};

    use compression_stream::compression::CodecError;
    use compression_stream::dispatch::DispatchTable;
    use compression_stream::engine::Capability;
    use compression_stream::pipeline::{compress, compress_with, decompress, run_pipeline};
    use compression_stream::prelude::DeflateOptions;
    use compression_stream::stream::{make_compression_stream, make_decompression_stream, TransformStream};
    use compression_stream::types::StreamError;

    // ------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------
    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn compressor(capability: Capability, format: &str) -> TransformStream {
        make_compression_stream(&DispatchTable::new(capability), None).construct(Some(format)).unwrap()
    }

    fn decompressor(capability: Capability, format: &str) -> TransformStream {
        make_decompression_stream(&DispatchTable::new(capability)).construct(Some(format)).unwrap()
    }

    fn plaintext(len: usize) -> Vec<u8> {
        b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. "
            .iter()
            .cycle()
            .take(len)
            .copied()
            .collect()
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "source went away"))
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    // ------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------
    #[test]
    fn pipeline_roundtrip_all_formats() {
        init_logging();
        let data = plaintext(300_000);

        for capability in [Capability::WORKER, Capability::INLINE] {
            for format in ["gzip", "deflate", "deflate-raw"] {
                let mut compressed = Vec::new();
                let snapshot = run_pipeline(
                    Cursor::new(data.clone()),
                    &mut compressed,
                    compressor(capability, format),
                    16 * 1024,
                )
                .unwrap();
                assert_eq!(snapshot.counters.bytes_in, data.len() as u64);
                assert_eq!(snapshot.counters.bytes_out, compressed.len() as u64);
                assert!(snapshot.ratio < 1.0);

                let mut restored = Vec::new();
                run_pipeline(Cursor::new(compressed), &mut restored, decompressor(capability, format), 1000)
                    .unwrap();
                assert_eq!(restored, data, "{format} {capability:?}");
            }
        }
    }

    #[test]
    fn pipeline_handles_empty_input() {
        init_logging();
        let mut compressed = Vec::new();
        let snapshot = run_pipeline(Cursor::new(Vec::new()), &mut compressed, compressor(Capability::WORKER, "gzip"), 64)
            .unwrap();
        assert_eq!(snapshot.counters.chunks_in, 0);
        assert!(!compressed.is_empty());
        assert!(decompress("gzip", &compressed).unwrap().is_empty());
    }

    #[test]
    fn pipeline_reports_corrupt_input() {
        init_logging();
        let mut out = Vec::new();
        let err = run_pipeline(
            Cursor::new(b"\x1f\x8b\x09garbage".to_vec()),
            &mut out,
            decompressor(Capability::WORKER, "gzip"),
            4,
        )
        .unwrap_err();
        assert!(matches!(err, StreamError::Engine(CodecError::InvalidHeader { .. })));
    }

    #[test]
    fn reader_failure_wins_over_abort() {
        init_logging();
        let mut out = Vec::new();
        let err = run_pipeline(FailingReader, &mut out, compressor(Capability::INLINE, "deflate"), 64).unwrap_err();
        assert!(matches!(err, StreamError::Io(ref msg) if msg.contains("source went away")), "{err:?}");
    }

    #[test]
    fn writer_failure_cancels_the_stream() {
        init_logging();
        for capability in [Capability::WORKER, Capability::INLINE] {
            let err = run_pipeline(
                Cursor::new(plaintext(500_000)),
                FailingWriter,
                compressor(capability, "deflate-raw"),
                8 * 1024,
            )
            .unwrap_err();
            assert!(matches!(err, StreamError::Io(ref msg) if msg.contains("sink closed")), "{err:?}");
        }
    }

    #[test]
    fn one_shot_helpers() {
        init_logging();
        let data = plaintext(10_000);
        let packed = compress_with("gzip", DeflateOptions::with_level(9), &data).unwrap();
        assert_eq!(decompress("gzip", &packed).unwrap(), data);

        let packed = compress("deflate-raw", &data).unwrap();
        assert_eq!(decompress("deflate-raw", &packed).unwrap(), data);

        assert!(matches!(compress("zstd", &data), Err(StreamError::Construction(_))));
    }
}
