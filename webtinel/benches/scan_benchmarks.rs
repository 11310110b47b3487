use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::io::Write;
use std::num::NonZeroUsize;
use tempfile::tempdir;
use webtinel::{classify, scan, ScanConfig};

fn bench_classify(c: &mut Criterion) {
    let snippets = [
        ">>> system($_GET['cmd']);",
        ">>> eval(base64_decode($payload));",
        ">>> $s = str_rot13($blob);",
        ">>> echo htmlspecialchars($name);",
    ];

    c.bench_function("classify_severity", |b| {
        b.iter(|| {
            for snippet in &snippets {
                black_box(classify(black_box(snippet)));
            }
        })
    });
}

fn bench_scan(c: &mut Criterion) {
    let dir = tempdir().unwrap();

    for i in 0..50 {
        let path = dir.path().join(format!("file_{i}.php"));
        let mut file = std::fs::File::create(&path).unwrap();
        for j in 0..200 {
            writeln!(file, "$line_{j} = process({j});").unwrap();
        }
        if i % 10 == 0 {
            writeln!(file, "eval($_POST['x']);").unwrap();
        }
    }

    let rules_path = dir.path().join("rules.txt");
    std::fs::write(&rules_path, "eval\\(\nbase64_decode\\(\nshell_exec\\(\n").unwrap();

    let mut config = ScanConfig::with_root(dir.path());
    config.rules_path = rules_path;

    let mut group = c.benchmark_group("scan");
    for workers in [1usize, 4] {
        group.bench_function(format!("workers_{workers}"), |b| {
            let mut cfg = config.clone();
            cfg.worker_count = NonZeroUsize::new(workers).unwrap();
            b.iter(|| black_box(scan(&cfg).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_classify, bench_scan);
criterion_main!(benches);
