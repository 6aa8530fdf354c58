use chrono::DateTime;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use secstudy_core::model::ProgressRecord;
use secstudy_core::recommend::recommend_topics;

fn build_record(topics: usize, attempts: usize) -> ProgressRecord {
    let mut record = ProgressRecord::default();
    for i in 0..attempts {
        let topic = format!("topic-{}", i % topics);
        let correct = (i % 6) as u32;
        record
            .record_quiz_attempt(
                &topic,
                5,
                correct.min(5),
                DateTime::from_timestamp(i as i64, 0).unwrap(),
            )
            .unwrap();
    }
    record
}

fn bench_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend_topics");

    let catalog: Vec<String> = (0..50).map(|i| format!("topic-{i}")).collect();
    let small = build_record(10, 50);
    let large = build_record(40, 2000);

    group.bench_function("50_attempts", |b| {
        b.iter(|| recommend_topics(black_box(&small), black_box(&catalog)).count())
    });

    group.bench_function("2000_attempts", |b| {
        b.iter(|| recommend_topics(black_box(&large), black_box(&catalog)).count())
    });

    group.finish();
}

criterion_group!(benches, bench_recommend);
criterion_main!(benches);
