//! Decoder benchmark: Measure escape-sequence decoding throughput.
//!
//! Target: well above typing and paste rates, > 10 MB/s for plain text

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use linewheel::input::{Decoder, SliceSource};

/// Plain ASCII, as typed or pasted without bracketing.
fn plain_input(len: usize) -> Vec<u8> {
    (0..len).map(|i| b'a' + (i % 26) as u8).collect()
}

/// A mix of arrows, function keys, modified keys and mouse reports.
fn sequence_input(repeat: usize) -> Vec<u8> {
    let chunk: &[u8] = b"ab\x1b[A\x1b[1;5C\x1bOP\x1b[15~\x1b[<0;10;20M\x1b[<0;10;20m\x7f\r";
    chunk.repeat(repeat)
}

/// A bracketed paste around multi-byte text.
fn paste_input(len: usize) -> Vec<u8> {
    let mut data = b"\x1b[200~".to_vec();
    for _ in 0..len {
        data.extend_from_slice("héllo 世界 ".as_bytes());
    }
    data.extend_from_slice(b"\x1b[201~");
    data
}

fn decode_all(data: &[u8]) -> usize {
    Decoder::new(SliceSource::new(data)).count()
}

fn decode_plain(c: &mut Criterion) {
    let data = plain_input(64 * 1024);
    let mut group = c.benchmark_group("decode_plain");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("64k", |b| b.iter(|| decode_all(black_box(&data))));
    group.finish();
}

fn decode_sequences(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_sequences");
    for repeat in [100, 1000] {
        let data = sequence_input(repeat);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(repeat), &data, |b, data| {
            b.iter(|| decode_all(black_box(data)));
        });
    }
    group.finish();
}

fn decode_paste(c: &mut Criterion) {
    let data = paste_input(1000);
    let mut group = c.benchmark_group("decode_paste");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("utf8_1000", |b| b.iter(|| decode_all(black_box(&data))));
    group.finish();
}

criterion_group!(benches, decode_plain, decode_sequences, decode_paste);
criterion_main!(benches);
