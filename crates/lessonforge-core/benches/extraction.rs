//! Benchmarks for response extraction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lessonforge_core::extract::{extract_json_object, strip_csv_fence};

fn bench_json_extraction(c: &mut Criterion) {
    let mut questions = String::new();
    for i in 0..50 {
        if i > 0 {
            questions.push(',');
        }
        questions.push_str(&format!(
            r#"{{"question": "Question number {i}?", "options": ["A", "B", "C", "D"]}}"#
        ));
    }
    let response = format!(
        "Certainly! Here is the requested assessment as JSON.\n\n{{\"mcqs\": [{questions}], \"saqs\": []}}\n\nLet me know if you would like any changes."
    );

    c.bench_function("extract_json_object/50_questions", |b| {
        b.iter(|| extract_json_object(black_box(&response)).unwrap())
    });
}

fn bench_fence_stripping(c: &mut Criterion) {
    let mut csv = String::from("```csv\nQuestion,Correct Answer,Incorrect Answer 1,Incorrect Answer 2,Incorrect Answer 3\n");
    for i in 0..50 {
        csv.push_str(&format!("What is {i} plus {i}?,{},1,2,3\n", i * 2));
    }
    csv.push_str("```");

    c.bench_function("strip_csv_fence/50_rows", |b| {
        b.iter(|| strip_csv_fence(black_box(&csv)))
    });
}

criterion_group!(benches, bench_json_extraction, bench_fence_stripping);
criterion_main!(benches);
