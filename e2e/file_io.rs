//! E2E Suite: file I/O
//!
//! GzWriter / GzReader against real files in a temporary directory, plus
//! stream reuse across files with `reset`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};

use gzchunk::engine::Runtime;
use gzchunk::{GzReader, GzWriter};
use tempfile::{tempdir, NamedTempFile};

fn runtime() -> Runtime {
    Runtime::load_from("flate2").expect("built-in engine")
}

fn sample(len: usize) -> Vec<u8> {
    b"file backed gzip member, line by line\n"
        .iter()
        .cycle()
        .take(len)
        .copied()
        .collect()
}

#[test]
fn write_file_then_read_it_back() {
    let rt = runtime();
    let dir = tempdir().unwrap();
    let path = dir.path().join("sample.txt.gz");
    let data = sample(300_000);

    let mut w = GzWriter::with_level(&rt, BufWriter::new(File::create(&path).unwrap()), 2).unwrap();
    w.header_mut().name = Some(b"sample.txt".to_vec());
    w.header_mut().mtime = 1_600_000_000;
    w.write_all(&data).unwrap();
    let sink = w.finish().unwrap();
    drop(sink);

    let on_disk = std::fs::metadata(&path).unwrap().len();
    assert!(on_disk > 0 && on_disk < data.len() as u64);

    let mut r = GzReader::new(&rt, BufReader::new(File::open(&path).unwrap()));
    let mut back = Vec::new();
    r.read_to_end(&mut back).unwrap();
    assert_eq!(back, data);
    let h = r.header().expect("header parsed");
    assert_eq!(h.name.as_deref(), Some(&b"sample.txt"[..]));
    assert_eq!(h.mtime, 1_600_000_000);
    assert_eq!(r.total_in(), on_disk);
}

#[test]
fn gzip_file_is_readable_by_flate2() {
    let rt = runtime();
    let mut tmp = NamedTempFile::new().unwrap();
    let data = sample(10_000);
    {
        let mut w = GzWriter::with_level(&rt, tmp.as_file_mut(), 3).unwrap();
        w.write_all(&data).unwrap();
        w.finish().unwrap();
    }
    tmp.as_file_mut().seek(SeekFrom::Start(0)).unwrap();
    let mut back = Vec::new();
    flate2::read::GzDecoder::new(tmp.as_file()).read_to_end(&mut back).unwrap();
    assert_eq!(back, data);
}

#[test]
fn reader_reset_moves_between_files() {
    let rt = runtime();
    let dir = tempdir().unwrap();
    let names = ["a.gz", "b.gz", "c.gz"];

    for name in names {
        let mut w = GzWriter::with_level(&rt, File::create(dir.path().join(name)).unwrap(), 1).unwrap();
        w.write_all(name.as_bytes()).unwrap();
        w.finish().unwrap();
    }

    let first = File::open(dir.path().join(names[0])).unwrap();
    let mut r = GzReader::new(&rt, first);
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            r.reset(File::open(dir.path().join(name)).unwrap());
        }
        let mut s = String::new();
        r.read_to_string(&mut s).unwrap();
        assert_eq!(&s, name);
    }
}

#[test]
fn writer_reset_starts_a_fresh_member() {
    let rt = runtime();
    let mut w = GzWriter::with_level(&rt, Vec::new(), 0).unwrap();
    w.write_all(b"abandoned").unwrap();
    let abandoned = w.reset(Vec::new());
    assert!(abandoned.len() >= 10);
    assert_eq!(w.total_in(), 0);
    w.write_all(b"kept").unwrap();
    let gz = w.finish().unwrap();
    let mut back = String::new();
    flate2::read::GzDecoder::new(&gz[..]).read_to_string(&mut back).unwrap();
    assert_eq!(back, "kept");
}
