//! Benchmark – in-place edits through `protoview::Cursor`
#![allow(missing_docs)]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use protoview::{Cursor, Descriptor, FieldDescriptor, Journal, Label, Message, Type, Value, wire};

static ITEM_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::new(1, "id", Type::UInt64, Label::Optional),
    FieldDescriptor::new(2, "label", Type::String, Label::Optional),
];
static ITEM: Descriptor = Descriptor::new("Item", &ITEM_FIELDS);

static LIST_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::new(1, "items", Type::Message, Label::Repeated).nested(&ITEM),
    FieldDescriptor::new(2, "total", Type::UInt64, Label::Optional),
];
static LIST: Descriptor = Descriptor::new("List", &LIST_FIELDS);

/// `count` items of `{ id, label = "item" }` followed by `total`.
fn make_list(count: usize) -> Vec<u8> {
    let mut scratch = [0u8; wire::MAX_VARINT_LEN];
    let mut out = Vec::new();
    for id in 0..count as u64 {
        let mut item = Vec::new();
        item.extend_from_slice(wire::encode_varint(wire::key(1, wire::WireType::Varint), &mut scratch));
        item.extend_from_slice(wire::encode_varint(id, &mut scratch));
        item.extend_from_slice(&[0x12, 0x04]);
        item.extend_from_slice(b"item");

        out.extend_from_slice(wire::encode_varint(wire::key(1, wire::WireType::Length), &mut scratch));
        out.extend_from_slice(wire::encode_varint(item.len() as u64, &mut scratch));
        out.extend_from_slice(&item);
    }
    out.extend_from_slice(&[0x10, 0x00]);
    out
}

/// Sum all ids by walking every submessage.
fn run_read(journal: &Journal) -> u64 {
    let list = Message::new(journal, &LIST);
    let mut cursor = Cursor::new(&list, 1);
    let mut sum = 0;
    while cursor.is_valid() {
        if let Ok(item) = Message::from_cursor(&mut cursor) {
            if let Ok(Value::U64(id)) = item.get(1) {
                sum += id;
            }
        }
        cursor.next();
    }
    sum
}

/// Grow every label, then read `total` through a cursor created up front so
/// that it has to replay every edit.
fn run_rewrite(bytes: &[u8]) -> u64 {
    let journal = Journal::new(bytes.to_vec());
    let list = Message::new(&journal, &LIST);
    let mut total = Cursor::new(&list, 2);
    let mut cursor = Cursor::new(&list, 1);
    while cursor.is_valid() {
        if let Ok(item) = Message::from_cursor(&mut cursor) {
            let _ = Cursor::new(&item, 2).put(&Value::from("a longer label"));
        }
        cursor.next();
    }
    total.put(&Value::U64(journal.len() as u64)).ok();
    match total.get() {
        Ok(Value::U64(v)) => v,
        _ => 0,
    }
}

fn bench_cursor(c: &mut Criterion) {
    let mut group = c.benchmark_group("cursor");

    for &count in &[10usize, 100, 1_000] {
        let bytes = make_list(count);
        let journal = Journal::new(bytes.clone());
        group.bench_with_input(BenchmarkId::new("read", count), &journal, |b, journal| {
            b.iter(|| black_box(run_read(black_box(journal))));
        });
        group.bench_with_input(BenchmarkId::new("rewrite", count), &bytes, |b, bytes| {
            b.iter(|| black_box(run_rewrite(black_box(bytes))));
        });
    }

    group.finish();
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(2))
            .measurement_time(Duration::from_secs(5));
    }
    c
}

criterion_group! { name = benches; config = criterion(); targets = bench_cursor }
criterion_main!(benches);
