use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::sync::Arc;
use stmtkit::{BufferedCursor, Connection, Criteria, QbResult, QueryBuilder, SqlParams};

struct NullConn;

impl Connection for NullConn {
    type Cursor = BufferedCursor;

    fn prepare_and_execute(
        &self,
        _sql: &str,
        _params: &SqlParams,
    ) -> impl std::future::Future<Output = QbResult<Self::Cursor>> + Send {
        std::future::ready(Ok(BufferedCursor::default()))
    }
}

/// SELECT with `n` columns, a chain of `n` joins and `n` criteria.
fn build_select(n: usize) -> QueryBuilder<NullConn> {
    let mut qb = QueryBuilder::new(Arc::new(NullConn));
    qb.select((0..n).map(|i| format!("t0.col{i}")))
        .from_as("base", "t0");
    for i in 1..=n {
        let prev = format!("t{}", i - 1);
        let alias = format!("t{i}");
        let on = format!("{alias}.parent_id = {prev}.id");
        qb.left_join(&prev, &format!("table{i}"), &alias, Some(on.as_str()));
    }
    let criteria = (0..n).fold(Criteria::new(), |c, i| c.with(format!("t0.col{i}"), i as i64));
    qb.where_criteria(criteria)
        .order_by("t0.col0", Some("DESC"))
        .set_max_results(Some(50));
    qb
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/render");

    for n in [1, 5, 10, 50] {
        let qb = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| black_box(qb.to_sql()));
        });
    }

    group.finish();
}

fn bench_cached_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/cached_render");

    for n in [1, 5, 10, 50] {
        let mut qb = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(qb.get_sql()));
        });
    }

    group.finish();
}

fn bench_build_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/build_and_render");

    for n in [1, 5, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut qb = build_select(n);
                black_box(qb.get_sql())
            });
        });
    }

    group.finish();
}

fn bench_positional_params(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/positional_params");

    for n in [5, 20, 100, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut qb = QueryBuilder::new(Arc::new(NullConn));
                let placeholders: Vec<String> = (0..n)
                    .map(|i| qb.create_positional_parameter(i as i64))
                    .collect();
                qb.select(["*"])
                    .from("t")
                    .set_where([format!("id IN ({})", placeholders.join(", "))]);
                black_box(qb.get_query_sql_parameters().unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_render,
    bench_cached_render,
    bench_build_and_render,
    bench_positional_params
);
criterion_main!(benches);
