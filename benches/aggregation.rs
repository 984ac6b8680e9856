use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use trific::io::srim::classify;
use trific::model::partition::{GroupPair, PartitionScheme};
use trific::model::reporter::{ReportKind, Reporter};
use trific::{Aggregator, AggregatorOptions, Capacity, DetectorGeometry, IsotopeIdx};

fn put(line: &mut [u8], offset: usize, value: &str) {
    line[offset..offset + value.len()].copy_from_slice(value.as_bytes());
}

/// In-memory collision log: one isotope, `n_ions` ions of `n_collisions` rows each
fn synthetic_log(n_ions: u32, n_collisions: u32) -> Vec<u8> {
    let mut out = Vec::new();
    for (label, offset, value) in [
        ("Ion Name", 23, "Sr"),
        ("Ion Mass", 22, " 93.915"),
        ("Ion Energy", 18, "  4.700E+05"),
    ] {
        let mut line = vec![b' '; 60];
        put(&mut line, 6, label);
        put(&mut line, offset, value);
        out.extend_from_slice(&line);
        out.push(b'\n');
    }

    for ion in 1..=n_ions {
        for step in 0..n_collisions {
            let depth_mm = 20.0 + 280.0 * step as f64 / n_collisions as f64;
            let energy_kev = 470000.0 - 1000.0 * step as f64;
            let mut line = vec![b' '; 50];
            put(&mut line, 1, &format!("{:05}", ion));
            put(&mut line, 7, &format!("{:9.3E}", energy_kev));
            put(&mut line, 17, &format!("{:10.4E}", depth_mm * 1.0e7));
            put(&mut line, 39, &format!("{:10.3E}", 0.0));
            out.extend_from_slice(&line);
            out.push(b'\n');
        }
        out.extend_from_slice(b"=====\n");
    }
    out
}

/// Line classification alone
fn bench_classify(c: &mut Criterion) {
    let log = synthetic_log(100, 100);
    let lines: Vec<&[u8]> = log.split(|&b| b == b'\n').collect();

    let mut group = c.benchmark_group("srim_classify");
    group.throughput(Throughput::Elements(lines.len() as u64));
    group.bench_function("lines", |b| {
        b.iter(|| {
            let mut collisions = 0usize;
            for line in &lines {
                if classify(black_box(line)).is_collision() {
                    collisions += 1;
                }
            }
            black_box(collisions)
        })
    });
    group.finish();
}

/// Full stream aggregation for increasing ion counts
fn bench_process_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_stream");
    let aggregator = Aggregator::new(DetectorGeometry::default(), AggregatorOptions::default());

    for n_ions in [100u32, 1000, 5000] {
        let log = synthetic_log(n_ions, 100);
        group.throughput(Throughput::Bytes(log.len() as u64));

        group.bench_with_input(BenchmarkId::new("ions", n_ions), &log, |b, log| {
            b.iter(|| {
                let mut state = aggregator.new_state(Capacity {
                    max_ions: 10_000,
                    max_isotopes: 25,
                });
                let summary = aggregator
                    .process_stream(&mut state, black_box(&log[..]))
                    .unwrap();
                black_box(summary)
            })
        });
    }

    group.finish();
}

/// PID report rows from an aggregated run
fn bench_pid_report(c: &mut Criterion) {
    let aggregator = Aggregator::new(DetectorGeometry::default(), AggregatorOptions::default());
    let mut state = aggregator.new_state(Capacity::default());
    let log = synthetic_log(5000, 100);
    aggregator.process_stream(&mut state, &log[..]).unwrap();

    let reporter = Reporter::new(ReportKind::Pid, PartitionScheme::default(), GroupPair::default());
    c.bench_function("pid_report_5000_ions", |b| {
        b.iter(|| black_box(reporter.report(black_box(&state), IsotopeIdx(0))))
    });
}

criterion_group!(
    benches,
    bench_classify,
    bench_process_stream,
    bench_pid_report,
);
criterion_main!(benches);
