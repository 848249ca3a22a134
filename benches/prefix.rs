use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tsu::regex::Pattern;

fn prefix_not_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("Non-matching path");

    let pattern = Pattern::new(r"^/myapp/users/(?P<user_id>\d+)/$").unwrap();
    let path = "/myapp/not_match/123456/";
    assert_eq!(pattern.prefix(), "/myapp/users/");

    group.bench_function("regex only", |b| {
        b.iter(|| {
            let result = black_box(pattern.captures_unchecked(black_box(path)));
            assert!(result.is_none());
        });
    });

    group.bench_function("prefix check", |b| {
        b.iter(|| {
            let result = black_box(pattern.captures(black_box(path)));
            assert!(result.is_none());
        });
    });

    group.finish();
}

criterion_group!(benches, prefix_not_match);
criterion_main!(benches);
