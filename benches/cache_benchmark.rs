use std::{io, path::Path};

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use elserve::cache::{PageCache, PageSource};

/// 不访问磁盘的页面来源，只测量缓存簿记的开销
struct MemorySource {
    content: Bytes,
}

impl PageSource for MemorySource {
    fn read(&self, _path: &Path) -> io::Result<Bytes> {
        Ok(self.content.clone())
    }
}

fn cache_with(capacity: usize, content_size: usize) -> PageCache {
    PageCache::with_source(
        capacity,
        Box::new(MemorySource {
            content: Bytes::from(vec![0u8; content_size]),
        }),
    )
}

fn cache_hit_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_hit");
    let root = Path::new("sites");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let cache = cache_with(size * 64, 64);
            for i in 0..size {
                cache.get(root, &format!("file{}.html", i)).unwrap();
            }

            b.iter(|| {
                for i in 0..size {
                    let name = format!("file{}.html", i);
                    let _ = cache.get(black_box(root), black_box(&name));
                }
            });
        });
    }

    group.finish();
}

fn cache_disabled_benchmark(c: &mut Criterion) {
    let root = Path::new("sites");
    c.bench_function("cache_disabled", |b| {
        let cache = cache_with(0, 64);
        b.iter(|| {
            let _ = cache.get(black_box(root), black_box("index.html"));
        });
    });
}

fn cache_eviction_benchmark(c: &mut Criterion) {
    let root = Path::new("sites");
    c.bench_function("cache_eviction", |b| {
        b.iter(|| {
            // 容量只够100条记录，插入200条
            let cache = cache_with(100 * 64, 64);
            for i in 0..200 {
                let name = format!("file{}.html", i);
                let _ = cache.get(black_box(root), black_box(&name));
            }
        });
    });
}

fn cache_large_content_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_large_content");
    let root = Path::new("sites");

    for content_size in [1024, 10240, 102400].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(content_size),
            content_size,
            |b, &content_size| {
                b.iter(|| {
                    let cache = cache_with(content_size * 5, content_size);
                    for i in 0..10 {
                        let name = format!("file{}.html", i);
                        let _ = cache.get(black_box(root), black_box(&name));
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    cache_hit_benchmark,
    cache_disabled_benchmark,
    cache_eviction_benchmark,
    cache_large_content_benchmark
);
criterion_main!(benches);
