use criterion::{Criterion, black_box, criterion_group, criterion_main};
use dirsync_core::{ContentClassifier, TreeDiffer};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn populate(root: &Path, variant: &str) {
    for i in 0..20 {
        let sub = root.join(format!("dir{i}"));
        fs::create_dir_all(&sub).unwrap();
        for j in 0..10 {
            let contents = if j == 0 { variant } else { "payload" };
            fs::write(sub.join(format!("file{j}.txt")), contents).unwrap();
        }
    }
}

fn compare_benchmark(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let (left, right) = (dir.path().join("left"), dir.path().join("right"));
    populate(&left, "left");
    populate(&right, "right");
    let differ = TreeDiffer::default();

    c.bench_function("TreeDiffer::compare (2x200 files)", |b| {
        b.iter(|| differ.compare(black_box(&left), black_box(&right)).unwrap())
    });
}

fn classifier_benchmark(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let (a, b) = (dir.path().join("a.txt"), dir.path().join("b.txt"));
    let text = "the quick brown fox\n".repeat(10_000);
    fs::write(&a, &text).unwrap();
    fs::write(&b, &text).unwrap();
    let classifier = ContentClassifier::default();

    c.bench_function("ContentClassifier::compare (200 KB text)", |bench| {
        bench.iter(|| classifier.compare(black_box(&a), black_box(&b)).unwrap())
    });
}

criterion_group!(benches, compare_benchmark, classifier_benchmark);
criterion_main!(benches);
