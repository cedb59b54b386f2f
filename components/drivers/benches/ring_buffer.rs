use std::hint::black_box;

use avr_drivers::RingBuffer;
use criterion::{criterion_group, criterion_main, Criterion};

fn bench_fill_drain(c: &mut Criterion) {
    let storage = Box::leak(vec![0u8; 64].into_boxed_slice());
    let mut ring = RingBuffer::new(storage);

    c.bench_function("ring_buffer fill+drain 64", |b| {
        b.iter(|| {
            while ring.push(black_box(0xA5)).is_ok() {}
            while let Some(byte) = ring.pop() {
                black_box(byte);
            }
        })
    });
}

criterion_group!(benches, bench_fill_drain);
criterion_main!(benches);
