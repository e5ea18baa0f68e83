use criterion::{black_box, criterion_group, criterion_main, Criterion};
use khmer_segmenter::{BuilderConfig, DictionaryBuilder, Segmenter};

fn build_segmenter() -> Segmenter {
    let words = [
        "កងកម្លាំង",
        "រក្សា",
        "សន្តិសុខ",
        "និង",
        "សណ្តាប់ធ្នាប់",
        "សាធារណៈ",
        "សួស្តី",
        "កម្ពុជា",
    ];
    let store = DictionaryBuilder::new(
        words.iter().map(|w| (w.to_string(), Some(100.0))),
        BuilderConfig::default(),
    )
    .into_store();
    Segmenter::new(store)
}

fn benchmark_segmentation(c: &mut Criterion) {
    let segmenter = build_segmenter();

    // "Security and public order forces"
    let text = "កងកម្លាំងរក្សាសន្តិសុខនិងសណ្តាប់ធ្នាប់សាធារណៈ";

    c.bench_function("segment_short_sentence", |b| {
        b.iter(|| {
            segmenter.segment_str(black_box(text));
        })
    });
}

criterion_group!(benches, benchmark_segmentation);
criterion_main!(benches);
