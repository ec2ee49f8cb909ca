//! Benchmark for the LZW codec and the bit-packing layer.

fn get_pixel_plane(items: usize) -> Vec<u8> {
    let mut input = Vec::new();
    let mut v = 0;
    for i in 0..items {
        v += 3;
        input.push((i ^ v) as u8);
    }
    input
}

fn encode_large_plane() {
    let input = get_pixel_plane(1_000_000);
    let codes = lzw::encode(8, &input).unwrap();
    black_box(codes);
}

fn decode_large_plane(codes: &[u16]) {
    let indices = lzw::decode(codes).unwrap();
    black_box(indices);
}

fn pack_unpack_large_plane(codes: &[u16]) {
    let bytes = lzw::pack(8, codes);
    let unpacked = lzw::unpack(8, &bytes).unwrap();
    black_box(unpacked);
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gifcodec::lzw;

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("encode_large_plane", |b| b.iter(encode_large_plane));

    let codes = lzw::encode(8, &get_pixel_plane(1_000_000)).unwrap();
    c.bench_function("decode_large_plane", |b| {
        b.iter(|| decode_large_plane(&codes))
    });
    c.bench_function("pack_unpack_large_plane", |b| {
        b.iter(|| pack_unpack_large_plane(&codes))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
