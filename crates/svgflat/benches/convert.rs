use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use svgflat::{ConvertConfig, Converter};

const FIXTURES: &[(&str, &str)] = &[
    ("use_chain", include_str!("../../../fixtures/use_chain.svg")),
    ("gradients", include_str!("../../../fixtures/gradients.svg")),
    ("icon", include_str!("../../../fixtures/icon.svg")),
    ("clip", include_str!("../../../fixtures/clip.svg")),
];

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    let default = Converter::default();
    let mut cubic_config = ConvertConfig::default();
    cubic_config.set_value("arcs.toCubics", true.into());
    let cubics = Converter::new(cubic_config);

    for &(name, svg) in FIXTURES {
        group.bench_with_input(BenchmarkId::new("default", name), svg, |b, svg| {
            b.iter(|| black_box(default.convert(black_box(svg)).map(|c| c.drawable.paths.len())))
        });
        group.bench_with_input(BenchmarkId::new("arcs_to_cubics", name), svg, |b, svg| {
            b.iter(|| black_box(cubics.convert(black_box(svg)).map(|c| c.drawable.paths.len())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_convert);
criterion_main!(benches);
