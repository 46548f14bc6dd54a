//! Benchmarks for preview composition.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use htmlreader::compose::compose;
use htmlreader::project::export_archive;
use htmlreader::source::SourceSet;
use htmlreader::templates::TEMPLATES;

fn large_sources() -> SourceSet {
    let markup = (0..2_000)
        .map(|i| format!("<section id=\"s{i}\"><h2>Section {i}</h2><p>Body text {i}</p></section>\n"))
        .collect::<String>();
    let styles = (0..500)
        .map(|i| format!("#s{i} h2 {{ color: hsl({} 60% 40%); }}\n", i % 360))
        .collect::<String>();
    let script = (0..200)
        .map(|i| format!("console.log(\"section\", {i});\n"))
        .collect::<String>();
    SourceSet::new(markup, styles, script)
}

fn bench_compose_template(c: &mut Criterion) {
    let sources = TEMPLATES[0].sources();
    c.bench_function("compose_template", |b| {
        b.iter(|| compose(black_box(&sources)))
    });
}

fn bench_compose_large(c: &mut Criterion) {
    let sources = large_sources();
    c.bench_function("compose_large", |b| b.iter(|| compose(black_box(&sources))));
}

fn bench_export_archive(c: &mut Criterion) {
    let sources = large_sources();
    c.bench_function("export_archive", |b| {
        b.iter(|| export_archive(black_box(&sources)))
    });
}

criterion_group!(
    benches,
    bench_compose_template,
    bench_compose_large,
    bench_export_archive
);
criterion_main!(benches);
