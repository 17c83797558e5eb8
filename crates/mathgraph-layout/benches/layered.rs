use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use mathgraph_layout::{EdgeLabel, GraphLabel, LayoutGraph, NodeLabel, layout, new_graph};
use std::hint::black_box;

/// Complete `fanout`-ary tree of the given depth, ids in breadth-first order.
fn build_tree(depth: usize, fanout: usize) -> LayoutGraph {
    let mut g = new_graph(GraphLabel::default());
    g.set_node("n0", NodeLabel::sized(30.0, 30.0));
    let mut frontier = vec!["n0".to_string()];
    let mut next_id = 1usize;
    for _ in 0..depth {
        let mut next = Vec::new();
        for parent in &frontier {
            for _ in 0..fanout {
                let id = format!("n{next_id}");
                next_id += 1;
                g.set_node(id.clone(), NodeLabel::sized(30.0, 30.0));
                g.set_edge(parent, &id, EdgeLabel::default());
                next.push(id);
            }
        }
        frontier = next;
    }
    g
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layered_layout");
    for (depth, fanout) in [(4, 3), (6, 2), (5, 4)] {
        let g = build_tree(depth, fanout);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("d{depth}_f{fanout}_n{}", g.node_count())),
            &g,
            |b, g| {
                b.iter_batched(
                    || g.clone(),
                    |mut g| {
                        layout(&mut g);
                        black_box(g)
                    },
                    BatchSize::SmallInput,
                )
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
