use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fluhep_core::{EventAssembler, VecSink};
use fluhep_io::{
    generator::{generate_records, write_records},
    hepmc::HepMcAsciiWriter,
};

/// Text dump with `events` groups of 20 tracks (deterministic).
fn dump(events: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    write_records(&mut buf, &generate_records(events, 20, 2024)).expect("write dump");
    buf
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_assemble");
    for &events in &[100u32, 1_000u32] {
        let text = dump(events);
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_function(BenchmarkId::new("vec_sink", events), |b| {
            b.iter(|| {
                let mut sink = VecSink::default();
                let _ = EventAssembler::default().run_readers([black_box(&text[..])], &mut sink);
                black_box(sink.events.len());
            });
        });

        group.bench_function(BenchmarkId::new("hepmc_ascii", events), |b| {
            b.iter(|| {
                let mut sink = HepMcAsciiWriter::new(Vec::with_capacity(text.len() * 4));
                let _ = EventAssembler::default().run_readers([black_box(&text[..])], &mut sink);
                black_box(sink.written());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_convert);
criterion_main!(benches);
