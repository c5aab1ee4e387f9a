use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rehearse_core::concepts::ConceptTagger;
use rehearse_core::extract::extract;
use rehearse_core::model::QuestionKind;

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");

    let mcq_small = generate_mcq_block(5);
    let mcq_large = generate_mcq_block(200);
    let theory_large = generate_theory_block(200);

    let malformed = {
        let mut s = String::from("Sure, here are some questions.\n");
        for i in 0..50 {
            s.push_str(&format!("Question: Q{i}\nA) only one option\nCorrect: maybe\n\n"));
        }
        s
    };

    group.bench_function("mcq_5", |b| {
        b.iter(|| extract(black_box(&mcq_small), QuestionKind::Mcq))
    });

    group.bench_function("mcq_200", |b| {
        b.iter(|| extract(black_box(&mcq_large), QuestionKind::Mcq))
    });

    group.bench_function("theory_200", |b| {
        b.iter(|| extract(black_box(&theory_large), QuestionKind::Theory))
    });

    group.bench_function("malformed_50", |b| {
        b.iter(|| extract(black_box(&malformed), QuestionKind::Mcq))
    });

    group.finish();
}

fn bench_tagging(c: &mut Criterion) {
    let tagger = ConceptTagger::default();
    let text = "Explain how a hash index speeds up a database query, and when a tree \
                based index is the better choice for range search over an array of keys?";

    c.bench_function("tag_concepts", |b| b.iter(|| tagger.tag(black_box(text))));
}

fn generate_mcq_block(n: usize) -> String {
    let mut s = String::new();
    for i in 0..n {
        s.push_str(&format!(
            "Question: What does array operation {i} cost?\nA) O(1)\nB) O(n)\nC) O(log n)\nD) O(n^2)\nCorrect: B\n\n"
        ));
    }
    s
}

fn generate_theory_block(n: usize) -> String {
    let mut s = String::new();
    for i in 0..n {
        s.push_str(&format!(
            "Question: Explain recursion case {i}.\nModel Answer: A function that calls itself until case {i} bottoms out.\n\n"
        ));
    }
    s
}

criterion_group!(benches, bench_extract, bench_tagging);
criterion_main!(benches);
