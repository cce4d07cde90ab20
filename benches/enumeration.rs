use criterion::{black_box, criterion_group, criterion_main, Criterion};

use peppercorn::complex::{Complex, Strand};
use peppercorn::config::EnumeratorConfig;
use peppercorn::domain::{Domain, Length};
use peppercorn::driver::Enumerator;
use peppercorn::generator::default_generators;
use peppercorn::segmentation::segment_neighborhood;

/// A small toehold-mediated strand-displacement cascade: an incumbent duplex
/// plus a free invader strand sharing a toehold, the same shape as
/// `examples/original_source/peppercornenumerator/tests/test_condense.py`'s
/// `test_condense_simple` network.
fn toehold_system() -> Vec<Complex> {
    let top = Strand::new(vec![
        Domain::new("toehold", Length::Short),
        Domain::new("branch", Length::Long),
    ]);
    let bottom = Strand::new(vec![
        Domain::new("branch", Length::Long).complement(),
        Domain::new("toehold", Length::Short).complement(),
    ]);
    let incumbent = Complex::new(
        vec![top, bottom],
        vec![vec![None, Some((1, 0))], vec![Some((0, 1)), None]],
    )
    .unwrap();

    let invader = Strand::new(vec![
        Domain::new("toehold", Length::Short),
        Domain::new("branch", Length::Long),
    ]);
    let free_invader = Complex::new(vec![invader], vec![vec![None, None]]).unwrap();

    vec![incumbent, free_invader]
}

fn enumerate_benchmark(c: &mut Criterion) {
    c.bench_function("enumerate toehold system", |b| {
        b.iter(|| {
            let config = EnumeratorConfig::default();
            let mut enumerator = Enumerator::new(
                config.clone(),
                default_generators(&config),
                black_box(toehold_system()),
                Vec::new(),
                Vec::new(),
            )
            .unwrap();
            enumerator.enumerate().unwrap();
            black_box(enumerator.resting_macrostates().len());
        })
    });
}

fn segmentation_benchmark(c: &mut Criterion) {
    let mut store = peppercorn::registry::ComplexStore::new();
    let ids: Vec<_> = toehold_system().into_iter().map(|complex| store.intern(complex)).collect();

    c.bench_function("segment a small neighborhood", |b| {
        b.iter(|| {
            black_box(segment_neighborhood(black_box(&ids), &[], &store, &[]));
        })
    });
}

criterion_group!(benches, enumerate_benchmark, segmentation_benchmark);
criterion_main!(benches);
