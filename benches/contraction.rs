//! Performance benchmarks for ancestry construction and contraction.
//!
//! Run with: `cargo bench --bench contraction`
//!
//! ## Performance Targets
//!
//! | Operation | Target | Notes |
//! |-----------|--------|-------|
//! | Ancestry build | Linear in walked commits | Shared history walked once |
//! | Contraction | Linear in vertices + edges | One pass per run |
//! | DOT render | Linear in vertices + edges | Deterministic order |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ancestry_graph::{
    contract, to_dot, AncestryBuilder, Branch, Commit, CommitId, CommitLabeler, Graph,
    HistorySource, InMemoryHistory, RunFinder,
};

/// Mainline of `mainline_len` commits with `branches` side branches of
/// `branch_len` commits, forking at evenly spaced mainline commits.
fn make_history(mainline_len: u64, branches: u64, branch_len: u64) -> (InMemoryHistory, Vec<Branch>) {
    let mut history = InMemoryHistory::new();
    for n in 1..=mainline_len {
        let parents = if n == 1 { vec![] } else { vec![CommitId::from_u64(n - 1)] };
        history.add_commit(Commit::new(CommitId::from_u64(n), n as i64 * 10, parents));
    }
    history.set_branch("master", CommitId::from_u64(mainline_len));

    let mut next = mainline_len + 1;
    for b in 0..branches {
        let fork = 1 + (b * mainline_len) / branches.max(1);
        let mut parent = fork;
        for step in 0..branch_len {
            let time = fork as i64 * 10 + 1 + step as i64;
            history.add_commit(Commit::new(CommitId::from_u64(next), time, vec![CommitId::from_u64(parent)]));
            parent = next;
            next += 1;
        }
        history.set_branch(format!("feature-{b}"), CommitId::from_u64(parent));
    }

    let tips = history.branches().unwrap_or_default();
    (history, tips)
}

fn build(history: &InMemoryHistory, tips: &[Branch]) -> Graph<Commit> {
    let mainline = tips.iter().find(|b| b.name == "master").unwrap();
    let mut builder = AncestryBuilder::new(history, mainline.tip.clone()).unwrap();
    for branch in tips {
        builder.add_branch(branch).unwrap();
    }
    builder.into_graph()
}

/// Benchmark building the combined ancestry graph.
fn bench_ancestry_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("ancestry_build");

    for branches in [1, 10, 50] {
        let (history, tips) = make_history(1_000, branches, 20);

        group.throughput(Throughput::Elements(branches));
        group.bench_with_input(BenchmarkId::new("branches", branches), &tips, |b, tips| {
            b.iter(|| build(black_box(&history), black_box(tips)))
        });
    }

    group.finish();
}

/// Benchmark contracting a built graph.
fn bench_contraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("contraction");

    for branches in [1, 10, 50] {
        let (history, tips) = make_history(1_000, branches, 20);
        let graph = build(&history, &tips);
        let finder = RunFinder::new(tips.iter().map(|b| b.tip.clone()));

        group.throughput(Throughput::Elements(graph.len() as u64));
        group.bench_with_input(BenchmarkId::new("branches", branches), &graph, |b, graph| {
            b.iter(|| {
                let contraction = contract(black_box(graph), &finder).unwrap();
                assert!(contraction.run_count() <= graph.len());
                contraction
            })
        });
    }

    group.finish();
}

/// Benchmark rendering the contracted graph as DOT.
fn bench_render(c: &mut Criterion) {
    let (history, tips) = make_history(1_000, 50, 20);
    let graph = build(&history, &tips);
    let finder = RunFinder::new(tips.iter().map(|b| b.tip.clone()));
    let contracted = contract(&graph, &finder).unwrap().into_graph();
    let labeler = CommitLabeler::new(&tips).unwrap();

    c.bench_function("render_dot", |b| {
        b.iter(|| to_dot(black_box(&contracted), &labeler, None).unwrap())
    });
}

criterion_group!(benches, bench_ancestry_build, bench_contraction, bench_render);
criterion_main!(benches);
