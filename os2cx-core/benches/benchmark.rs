use criterion::{Criterion, black_box, criterion_group, criterion_main};
use os2cx_core::Project;
use os2cx_core::directive::apply_directives;
use os2cx_core::parser::parse_diagnostics;

fn evaluator_output(selections: usize) -> String {
    let mut out = String::from(
        "ECHO: \"__openscad2calculix\", \"analysis_directive\", [\"*STATIC\"], [\"mm\", \"kg\", \"s\"]\n\
         ECHO: \"__openscad2calculix\", \"mesh_directive\", \"block\"\n",
    );
    for i in 0..selections {
        out.push_str(&format!(
            "ECHO: \"__openscad2calculix\", \"select_surface_directive\", \"face{}\", [0, 0.5, -1], 12.5\n\
             WARNING: unrelated warning {}\n",
            i, i
        ));
    }
    out
}

fn bench_parse_diagnostics(c: &mut Criterion) {
    let text = evaluator_output(60);
    c.bench_function("parse 60 directives", |b| {
        b.iter(|| parse_diagnostics(black_box(&text)))
    });
}

fn bench_apply_directives(c: &mut Criterion) {
    let statements = parse_diagnostics(&evaluator_output(60))
        .map(|d| d.statements)
        .unwrap_or_default();
    c.bench_function("apply 60 directives", |b| {
        b.iter(|| {
            let mut project = Project::new("bench.scad", "/tmp");
            apply_directives(&mut project, black_box(&statements)).map(|_| project)
        })
    });
}

// ベンチマークグループの定義
criterion_group!(benches, bench_parse_diagnostics, bench_apply_directives);
criterion_main!(benches);
