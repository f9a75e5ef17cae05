use std::str::FromStr;

use criterion::{criterion_group, criterion_main, Criterion};

use speedsolve::algorithm::Algorithm;
use speedsolve::cube::Cube;
use speedsolve::pieces::PieceGroup;
use speedsolve::search::DeepSearch;
use speedsolve::spin::Spin;

fn bench_apply_moves(c: &mut Criterion) {
    let alg = Algorithm::from_str("R U R' U' M2 E S Rw F2 D' L B2 x y'").unwrap();
    c.bench_function("apply_algorithm", |b| {
        b.iter(|| {
            let mut cube = Cube::new();
            cube.apply_algorithm(&alg);
            cube
        })
    });
}

fn bench_predicates(c: &mut Criterion) {
    let cube = Cube::from_algorithm(&Algorithm::from_str("R U F' L2 D B'").unwrap());
    c.bench_function("first_block_predicate", |b| {
        b.iter(|| cube.is_group_solved_for(PieceGroup::RouxFb, Spin::FD))
    });
}

fn bench_cross_search(c: &mut Criterion) {
    let scramble = Algorithm::from_str("F2 L2 D B2 U").unwrap();
    c.bench_function("cross_search_depth5", |b| {
        b.iter(|| {
            let mut ds = DeepSearch::new(&scramble);
            ds.add_to_mandatory_pieces(PieceGroup::CrossD, Spin::UF);
            ds.add_search_level(speedsolve::search::SearchLevel::with(
                false,
                speedsolve::search::SearchUnit::Double(speedsolve::search::MoveSet::Outer),
            ));
            for _ in 2..5 {
                ds.add_search_level(speedsolve::search::SearchLevel::with(
                    true,
                    speedsolve::search::SearchUnit::Single(speedsolve::search::MoveSet::Outer),
                ));
            }
            ds.update_root_data();
            ds.run(-1);
            ds.get_solves().len()
        })
    });
}

criterion_group!(
    benches,
    bench_apply_moves,
    bench_predicates,
    bench_cross_search
);
criterion_main!(benches);
