//! Multi-document decoding: the worker pool, the parallel decoder and the
//! async stream must agree with single-document slice decoding.

use bson::doc;
use ibson_decoder::{DecodeError, DecoderConfig, DocumentStream, IterDecoder, ParallelDecoder};
use ibson_pool::{PoolError, WorkerPool};
use ibson_tests::{encode, from_reference, nested};
use ibson_types::Document;

fn corpus(n: i32) -> Vec<Vec<u8>> {
    (0..n)
        .map(|i| {
            encode(&doc! {
                "i": i,
                "name": format!("doc-{i}"),
                "tags": (0..i % 5).map(|t| format!("t{t}")).collect::<Vec<_>>(),
                "nested": { "even": i % 2 == 0, "list": [i, { "sq": i * i }] },
            })
        })
        .collect()
}

fn sequential(buffers: &[Vec<u8>]) -> Vec<Document> {
    buffers
        .iter()
        .map(|b| IterDecoder::decode(b).unwrap())
        .collect()
}

// ── ParallelDecoder ───────────────────────────────────────────────────────────

#[test]
fn parallel_matches_sequential() {
    let buffers = corpus(200);
    let expected = sequential(&buffers);
    let decoder = ParallelDecoder::new(4, DecoderConfig::default()).unwrap();
    let results: Vec<_> = decoder
        .decode_all(buffers)
        .into_iter()
        .map(Result::unwrap)
        .collect();
    assert_eq!(results, expected);
}

#[test]
fn parallel_matches_reference() {
    let reference = doc! { "k": [1, 2, { "x": "y" }] };
    let decoder = ParallelDecoder::new(2, DecoderConfig::default()).unwrap();
    let results = decoder.decode_all(vec![encode(&reference); 8]);
    for result in results {
        assert_eq!(result.unwrap(), from_reference(&reference));
    }
}

#[test]
fn parallel_decodes_deep_documents() {
    let decoder = ParallelDecoder::new(2, DecoderConfig::default()).unwrap();
    let results = decoder.decode_all(vec![nested(5_000, 0x03), nested(5_000, 0x04)]);
    for result in results {
        assert_eq!(ibson_tests::nested_depth(&result.unwrap()), 5_000);
    }
}

#[test]
fn parallel_errors_are_per_document() {
    let mut buffers = corpus(6);
    buffers[3].truncate(10);
    let decoder = ParallelDecoder::new(3, DecoderConfig::default()).unwrap();
    let results = decoder.decode_all(buffers);
    for (i, result) in results.iter().enumerate() {
        if i == 3 {
            assert!(matches!(result, Err(DecodeError::MalformedLength { .. })));
        } else {
            assert!(result.is_ok(), "document {i}");
        }
    }
}

// ── WorkerPool ────────────────────────────────────────────────────────────────

#[test]
fn pool_replaces_panicked_workers() {
    let pool = WorkerPool::new(2, |n: u32| {
        assert!(n != 13, "unlucky input");
        n * 2
    })
    .unwrap();

    let handles: Vec<_> = [1, 13, 2, 13, 3]
        .into_iter()
        .map(|n| pool.submit(n).unwrap())
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.wait()).collect();

    assert_eq!(results[0].as_ref().ok(), Some(&2));
    assert!(matches!(results[1], Err(PoolError::WorkerPanicked { .. })));
    assert_eq!(results[2].as_ref().ok(), Some(&4));
    assert!(matches!(results[3], Err(PoolError::WorkerPanicked { .. })));
    assert_eq!(results[4].as_ref().ok(), Some(&6));

    assert_eq!(pool.replaced(), 2);
    assert_eq!(pool.size(), 2);
    assert_eq!(pool.submit(21).unwrap().wait().unwrap(), 42);
}

#[tokio::test]
async fn pool_results_join_asynchronously() {
    let pool = WorkerPool::new(2, |buf: Vec<u8>| IterDecoder::decode(&buf)).unwrap();
    let buffers = corpus(10);
    let expected = sequential(&buffers);

    let mut decoded = Vec::new();
    for buf in buffers {
        let handle = pool.submit(buf).unwrap();
        decoded.push(handle.join().await.unwrap().unwrap());
    }
    assert_eq!(decoded, expected);
}

// ── DocumentStream ────────────────────────────────────────────────────────────

#[tokio::test]
async fn stream_matches_slice_decoding() {
    let buffers = corpus(25);
    let expected = sequential(&buffers);
    let file = buffers.concat();

    let mut stream = DocumentStream::new(file.as_slice());
    let mut streamed = Vec::new();
    while let Some(doc) = stream.next().await {
        streamed.push(doc.unwrap());
    }
    assert_eq!(streamed, expected);
    assert_eq!(stream.documents(), 25);
}

#[tokio::test]
async fn stream_reports_offset_of_failing_document() {
    let buffers = corpus(3);
    let second = buffers[0].len();
    let mut file = buffers.concat();
    // first type byte of the second document
    file[second + 4] = 0x42;

    let mut stream = DocumentStream::new(file.as_slice());
    assert!(stream.next().await.unwrap().is_ok());
    let err = stream.next().await.unwrap().unwrap_err();
    assert!(matches!(err, DecodeError::UnknownType { offset: 4, tag: 0x42 }));
    assert_eq!(stream.document_offset(), second);
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn stream_over_duplex_pipe() {
    let (mut writer, reader) = tokio::io::duplex(64);
    let buffers = corpus(10);
    let expected = sequential(&buffers);

    let producer = tokio::spawn(async move {
        use tokio::io::AsyncWriteExt;
        for buf in buffers {
            writer.write_all(&buf).await.unwrap();
        }
    });

    let mut stream = DocumentStream::new(reader);
    let mut streamed = Vec::new();
    while let Some(doc) = stream.next().await {
        streamed.push(doc.unwrap());
    }
    producer.await.unwrap();
    assert_eq!(streamed, expected);
}
