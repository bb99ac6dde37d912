use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rexplay_core::{CancelToken, EvalRequest, MatchPlanner, capture_fragments};

fn bench_scanner(c: &mut Criterion) {
    let pattern = r"((\d{4})-(\d{2})-(\d{2}))T((\d{2}):(\d{2}):(\d{2}))(?:\.(\d+))?";

    c.bench_function("scan_nested_pattern", |b| {
        b.iter(|| black_box(capture_fragments(black_box(pattern))))
    });
}

fn bench_whole_match(c: &mut Criterion) {
    let planner = MatchPlanner::default();
    let token = CancelToken::new();
    let request = EvalRequest::new("2024-08-25T10:30:00", r"(\d{4})-(\d{2})-(\d{2})T(.*)");

    c.bench_function("whole_match_eval", |b| {
        b.iter(|| black_box(planner.evaluate(black_box(&request), &token)))
    });
}

fn bench_iterative_scan(c: &mut Criterion) {
    let planner = MatchPlanner::default();
    let token = CancelToken::new();
    let request = EvalRequest::new(
        "abc 123 def 456 ghi 789 jkl 012 mno 345 pqr 678 stu 901",
        r"(\d+)",
    )
    .with_replacement("[$1]");

    c.bench_function("iterative_scan_replace", |b| {
        b.iter(|| black_box(planner.evaluate(black_box(&request), &token)))
    });
}

criterion_group!(benches, bench_scanner, bench_whole_match, bench_iterative_scan);

criterion_main!(benches);
