use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gosh::script::expand::substitute;
use gosh::script::lexer::{tokenize, LINE_CAP};
use gosh::var::VarStore;

fn make_store() -> VarStore {
    let mut vars = VarStore::new();
    for (name, value) in [("x", "120"), ("y", "45"), ("size", "16"), ("color", "4"), ("i", "7")] {
        vars.set(name, value);
    }
    vars
}

fn make_script(loops: usize) -> String {
    let chunk = "\
# draw a row
let size 16
for i 0 9 {
    rect $i 0 size size color
    color++
}
print done
";
    chunk.repeat(loops)
}

fn bench_substitute(c: &mut Criterion) {
    let vars = make_store();
    let mut g = c.benchmark_group("substitute");

    g.bench_function("no_refs", |b| {
        b.iter(|| substitute(black_box("print HELLO WORLD 1 2 3"), black_box(&vars)))
    });
    g.bench_function("dollar_refs", |b| {
        b.iter(|| substitute(black_box("rect $x $y $size $size $color"), black_box(&vars)))
    });
    g.bench_function("bare_refs", |b| {
        b.iter(|| substitute(black_box("rect x y size size color"), black_box(&vars)))
    });
    g.bench_function("assignment", |b| {
        b.iter(|| substitute(black_box("x += size"), black_box(&vars)))
    });

    g.finish();
}

fn bench_tokenize(c: &mut Criterion) {
    let small = make_script(10);
    let large = make_script(1000);
    let mut g = c.benchmark_group("tokenize");

    g.bench_function("small", |b| b.iter(|| tokenize(black_box(&small), LINE_CAP)));
    g.bench_function("large", |b| b.iter(|| tokenize(black_box(&large), LINE_CAP)));

    g.finish();
}

criterion_group!(benches, bench_substitute, bench_tokenize);
criterion_main!(benches);
