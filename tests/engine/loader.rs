// Integration tests for src/engine/loader.rs: Runtime binding.

use std::sync::Arc;

use gzchunk::engine::loader::available;
use gzchunk::engine::{FlateEngine, LoadError, Runtime};
use gzchunk::stream::{DeflateStream, InflateStream};

#[test]
fn registry_lists_builtin_engine() {
    assert_eq!(available(), vec!["flate2"]);
}

#[test]
fn unknown_engine_is_fatal() {
    match Runtime::load_from("zlib-ng") {
        Err(LoadError::UnknownEngine { name }) => assert_eq!(name, "zlib-ng"),
        other => panic!("expected UnknownEngine, got {:?}", other),
    }
}

#[test]
fn streams_share_the_runtime_engine() {
    let rt = Runtime::with_engine(Arc::new(FlateEngine));
    let before = Arc::strong_count(rt.engine());
    let d = DeflateStream::init(&rt, 1).unwrap();
    let i = InflateStream::init(&rt);
    // Streams take their own contexts; the runtime keeps the only engine handle.
    assert_eq!(Arc::strong_count(rt.engine()), before);
    drop((d, i));
}

#[test]
fn runtime_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Runtime>();
}

#[test]
fn streams_on_separate_threads() {
    let rt = Runtime::load_from("flate2").unwrap();
    let handles: Vec<_> = (0..4u8)
        .map(|t| {
            let rt = rt.clone();
            std::thread::spawn(move || {
                let data = vec![t; 10_000];
                let gz = gzchunk::compress_bytes(&rt, &data, 2).unwrap();
                assert_eq!(gzchunk::decompress_bytes(&rt, &gz).unwrap(), data);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}
