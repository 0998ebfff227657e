use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dashboard_cli_types::TableKind;
use loadtest_dashboard::filter::FilterState;
use loadtest_dashboard::page::TableDescriptor;
use loadtest_dashboard::test_helpers::generated_statistics_dataset;

fn render_statistics(c: &mut Criterion) {
    let descriptor = TableDescriptor::for_kind(TableKind::Statistics);

    let unfiltered = FilterState::default();
    let mut filtered = FilterState::default();
    filtered.set_series_pattern("^(GET|DELETE) Resource");

    let mut group = c.benchmark_group("render_statistics");
    for rows in [100, 1000, 5000].into_iter() {
        let dataset = generated_statistics_dataset(rows);
        group.bench_with_input(BenchmarkId::new("unfiltered", rows), &dataset, |b, d| {
            b.iter(|| descriptor.render(d, &unfiltered).expect("render failed"));
        });
        group.bench_with_input(BenchmarkId::new("series_filter", rows), &dataset, |b, d| {
            b.iter(|| descriptor.render(d, &filtered).expect("render failed"));
        });
        group.bench_with_input(BenchmarkId::new("sorted_rows", rows), &dataset, |b, d| {
            let table = descriptor.render(d, &unfiltered).expect("render failed");
            b.iter(|| table.sorted_rows().len());
        });
    }

    group.finish();
}

criterion_group!(benches, render_statistics);
criterion_main!(benches);
