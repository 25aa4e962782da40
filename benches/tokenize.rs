//! Tokenizer, normalizer and writer throughput
//!
//! Run with: cargo bench --bench tokenize
//! Allocation report: cargo bench --bench tokenize --features memory_tracking

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use spanxml::writer::Writer;
use spanxml::{Document, TokenKind, Utf16Reader, Utf8Reader};

#[cfg(feature = "memory_tracking")]
#[global_allocator]
static GLOBAL: spanxml::memory::tracking::TrackingAllocator =
    spanxml::memory::tracking::TrackingAllocator;

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// A catalog of `items` entries mixing attributes, references and CDATA
fn catalog(items: usize) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<catalog>\n");
    for i in 0..items {
        xml.push_str(&format!(
            "  <item id=\"{i}\" name=\"part &amp; piece {i}\" kind='plain'>\
             <desc>Item {i} &lt;fast&gt;</desc><raw><![CDATA[<x>{i}</x>]]></raw></item>\n"
        ));
    }
    xml.push_str("</catalog>\n");
    xml
}

fn drain_utf8(input: &[u8]) -> usize {
    let mut reader = Utf8Reader::new(input);
    let mut count = 0;
    while reader.advance().unwrap() {
        count += 1;
    }
    count
}

fn drain_utf16(input: &[u16]) -> usize {
    let mut reader = Utf16Reader::new(input);
    let mut count = 0;
    while reader.advance().unwrap() {
        count += 1;
    }
    count
}

fn resolve_attributes(input: &[u8]) -> usize {
    let mut reader = Utf8Reader::new(input);
    let mut total = 0;
    while reader.advance().unwrap() {
        if reader.token() == TokenKind::Attribute {
            total += reader.attribute(false).unwrap().value.len();
        }
    }
    total
}

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");
    for items in [10, 1_000] {
        let xml = catalog(items);
        let wide: Vec<u16> = xml.encode_utf16().collect();
        group.throughput(Throughput::Bytes(xml.len() as u64));

        group.bench_with_input(BenchmarkId::new("utf8", items), xml.as_bytes(), |b, input| {
            b.iter(|| drain_utf8(black_box(input)))
        });
        group.bench_with_input(BenchmarkId::new("utf16", items), &wide[..], |b, input| {
            b.iter(|| drain_utf16(black_box(input)))
        });
        group.bench_with_input(
            BenchmarkId::new("attributes", items),
            xml.as_bytes(),
            |b, input| b.iter(|| resolve_attributes(black_box(input))),
        );
    }
    group.finish();

    #[cfg(feature = "memory_tracking")]
    {
        use spanxml::memory::tracking;
        let xml = catalog(1_000);
        tracking::reset_stats();
        let before = tracking::allocated();
        resolve_attributes(xml.as_bytes());
        println!(
            "attribute pass: {} bytes live after, {} bytes peak",
            tracking::allocated().saturating_sub(before),
            tracking::peak_allocated().saturating_sub(before)
        );
    }
}

fn bench_round_trip(c: &mut Criterion) {
    let xml = catalog(1_000);
    let doc = Document::from_bytes(xml.as_bytes()).unwrap();

    c.bench_function("tree/parse", |b| {
        b.iter(|| Document::from_bytes(black_box(xml.as_bytes())).unwrap())
    });
    c.bench_function("tree/write", |b| {
        b.iter(|| {
            let mut writer = Writer::new(Vec::<u8>::with_capacity(xml.len()));
            writer.write_document(black_box(&doc)).unwrap();
            writer.into_inner().len()
        })
    });
}

criterion_group!(benches, bench_tokenize, bench_round_trip);
criterion_main!(benches);
