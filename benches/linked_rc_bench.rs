use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use linked_rc::LinkedRc;
use std::rc::Rc;
use std::time::Duration;

fn bench_clone_drop(c: &mut Criterion) {
    c.bench_function("linked_rc_clone_drop", |b| {
        let h = LinkedRc::new(1u64);
        b.iter(|| {
            let x = h.clone();
            black_box(&x);
            drop(x);
        })
    });

    c.bench_function("std_rc_clone_drop", |b| {
        let h = Rc::new(1u64);
        b.iter(|| {
            let x = h.clone();
            black_box(&x);
            drop(x);
        })
    });
}

fn bench_new_drop(c: &mut Criterion) {
    c.bench_function("linked_rc_new_drop", |b| {
        b.iter(|| {
            let h = LinkedRc::new(black_box(7u64));
            black_box(&h);
        })
    });

    c.bench_function("std_rc_new_drop", |b| {
        b.iter(|| {
            let h = Rc::new(black_box(7u64));
            black_box(&h);
        })
    });
}

fn bench_cross_group_swap(c: &mut Criterion) {
    c.bench_function("linked_rc_cross_group_swap", |b| {
        b.iter_batched(
            || {
                let a = LinkedRc::new(1u64);
                let a2 = a.clone();
                let b = LinkedRc::new(2u64);
                (a, a2, b)
            },
            |(mut a, a2, mut b)| {
                a.swap(&mut b);
                black_box((a, a2, b))
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_group_grow_shrink(c: &mut Criterion) {
    c.bench_function("linked_rc_group_grow_shrink_64", |b| {
        let h = LinkedRc::new(0u64);
        b.iter(|| {
            let mut group = Vec::with_capacity(64);
            for _ in 0..64 {
                group.push(h.clone());
            }
            black_box(&group);
            group.clear();
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_clone_drop, bench_new_drop, bench_cross_group_swap, bench_group_grow_shrink
}
criterion_main!(benches);
