use criterion::{criterion_group, criterion_main, Criterion};
use fodot_expand::{
    context::Context,
    solver::{Mode, Solver},
    strategy::Dispatch,
};
use fodot_syntax::syntax::KnowledgeBase;
use std::{fs, io::Read};

fn first_fail_benchmark(c: &mut Criterion) {
    let contexts = &read_contexts("../theories");
    c.bench_function("first_fail", |b| {
        b.iter(|| time_solve(contexts, Dispatch::new_first_fail(), 1))
    });
}

fn linear_benchmark(c: &mut Criterion) {
    let contexts = &read_contexts("../theories");
    c.bench_function("linear", |b| {
        b.iter(|| time_solve(contexts, Dispatch::new_linear(), 1))
    });
}

fn parallel_benchmark(c: &mut Criterion) {
    let contexts = &read_contexts("../theories");
    c.bench_function("parallel", |b| {
        b.iter(|| time_solve(contexts, Dispatch::new_first_fail(), 4))
    });
}

fn time_solve(contexts: &[Context], strategy: Dispatch, workers: usize) {
    for context in contexts {
        let solver = Solver::new(Mode::AllModels)
            .with_strategy(strategy)
            .with_workers(workers);
        let _ = context.expand(&solver);
    }
}

fn read_contexts(dir: &str) -> Vec<Context> {
    fs::read_dir(dir)
        .unwrap()
        .map(|item| read_kb_from_file(item.unwrap().path().display().to_string().as_str()))
        .map(|kb| Context::new(&kb).unwrap())
        .collect()
}

pub fn read_kb_from_file(filename: &str) -> KnowledgeBase {
    let mut f = fs::File::open(filename).expect("file not found");
    let mut contents = String::new();
    f.read_to_string(&mut contents)
        .expect("something went wrong reading the file");

    contents.parse().unwrap()
}

criterion_group!(
    benches,
    first_fail_benchmark,
    linear_benchmark,
    parallel_benchmark
);
criterion_main!(benches);
