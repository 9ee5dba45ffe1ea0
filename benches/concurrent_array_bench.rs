//! Benchmarks for the concurrent array family
//!
//! Compares lock strategies (platform rwlock, spinning, no-op) and the
//! striped variant against a globally-locked Vec baseline over the workloads
//! that matter: append throughput, random reads, mixed read/write, and
//! batched insertion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Instant;

use stripevec::sync::NullLock;
use stripevec::{ConcurrentVec, SpinRwLock, StripedVec};

const N: usize = 100_000;
const THREADS: usize = 8;

/// Run `worker` on `threads` barrier-synchronized threads and return the
/// wall-clock duration of the whole sweep.
fn timed_sweep<F>(threads: usize, worker: F) -> std::time::Duration
where
    F: Fn(usize) + Sync,
{
    let barrier = Barrier::new(threads);
    let start = Instant::now();
    thread::scope(|scope| {
        for tid in 0..threads {
            let barrier = &barrier;
            let worker = &worker;
            scope.spawn(move || {
                barrier.wait();
                worker(tid);
            });
        }
    });
    start.elapsed()
}

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push");
    group.throughput(Throughput::Elements(N as u64));

    group.bench_function(BenchmarkId::new("concurrent_vec", "os_rwlock"), |b| {
        b.iter_custom(|iters| {
            let mut total = std::time::Duration::ZERO;
            for _ in 0..iters {
                let vec: ConcurrentVec<usize> = ConcurrentVec::new();
                total += timed_sweep(THREADS, |tid| {
                    for i in 0..N / THREADS {
                        vec.push(tid * N + i);
                    }
                });
            }
            total
        })
    });

    group.bench_function(BenchmarkId::new("concurrent_vec", "spin"), |b| {
        b.iter_custom(|iters| {
            let mut total = std::time::Duration::ZERO;
            for _ in 0..iters {
                let vec: ConcurrentVec<usize, SpinRwLock> = ConcurrentVec::new();
                total += timed_sweep(THREADS, |tid| {
                    for i in 0..N / THREADS {
                        vec.push(tid * N + i);
                    }
                });
            }
            total
        })
    });

    // Single-threaded baseline: no synchronization at all.
    group.bench_function(BenchmarkId::new("concurrent_vec", "null_single_thread"), |b| {
        b.iter(|| {
            let vec: ConcurrentVec<usize, NullLock> = ConcurrentVec::with_capacity(N);
            for i in 0..N {
                vec.push(black_box(i));
            }
            vec.len()
        })
    });

    group.bench_function(BenchmarkId::new("striped_vec", "os_rwlock"), |b| {
        b.iter_custom(|iters| {
            let mut total = std::time::Duration::ZERO;
            for _ in 0..iters {
                let vec: StripedVec<usize> = StripedVec::with_stripes(16).unwrap();
                total += timed_sweep(THREADS, |tid| {
                    for i in 0..N / THREADS {
                        vec.push(tid * N + i);
                    }
                });
            }
            total
        })
    });

    group.bench_function(BenchmarkId::new("vec", "global_mutex"), |b| {
        b.iter_custom(|iters| {
            let mut total = std::time::Duration::ZERO;
            for _ in 0..iters {
                let vec: Mutex<Vec<usize>> = Mutex::new(Vec::new());
                total += timed_sweep(THREADS, |tid| {
                    for i in 0..N / THREADS {
                        vec.lock().unwrap().push(tid * N + i);
                    }
                });
            }
            total
        })
    });

    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");
    group.throughput(Throughput::Elements(N as u64));

    let single: Arc<ConcurrentVec<usize>> = Arc::new(ConcurrentVec::new());
    single.extend(0..N);
    let striped: Arc<StripedVec<usize>> = Arc::new(StripedVec::with_stripes(16).unwrap());
    for i in 0..N {
        striped.push(i);
    }

    group.bench_function("concurrent_vec", |b| {
        let vec = Arc::clone(&single);
        b.iter_custom(|iters| {
            let mut total = std::time::Duration::ZERO;
            for _ in 0..iters {
                total += timed_sweep(THREADS, |tid| {
                    let chunk = N / THREADS;
                    for i in tid * chunk..(tid + 1) * chunk {
                        black_box(vec.get(i).unwrap());
                    }
                });
            }
            total
        })
    });

    group.bench_function("striped_vec", |b| {
        let vec = Arc::clone(&striped);
        b.iter_custom(|iters| {
            let mut total = std::time::Duration::ZERO;
            for _ in 0..iters {
                total += timed_sweep(THREADS, |tid| {
                    let chunk = N / THREADS;
                    for i in tid * chunk..(tid + 1) * chunk {
                        black_box(vec.get(i).unwrap());
                    }
                });
            }
            total
        })
    });

    group.finish();
}

fn bench_batch_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_insert");
    group.throughput(Throughput::Elements(N as u64));
    let batch: Vec<usize> = (0..128).collect();

    group.bench_function("concurrent_vec_extend", |b| {
        let batch = batch.clone();
        b.iter(|| {
            let vec: ConcurrentVec<usize> = ConcurrentVec::new();
            for _ in 0..N / batch.len() {
                vec.extend(batch.iter().copied());
            }
            vec.len()
        })
    });

    group.bench_function("concurrent_vec_repeated_push", |b| {
        b.iter(|| {
            let vec: ConcurrentVec<usize> = ConcurrentVec::new();
            for i in 0..N {
                vec.push(black_box(i));
            }
            vec.len()
        })
    });

    group.bench_function("striped_vec_extend", |b| {
        let batch = batch.clone();
        b.iter(|| {
            let vec: StripedVec<usize> = StripedVec::with_stripes(16).unwrap();
            for _ in 0..N / batch.len() {
                vec.extend(batch.iter().copied());
            }
            vec.len()
        })
    });

    group.finish();
}

fn bench_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_read_write");
    group.throughput(Throughput::Elements(N as u64));
    // 10 reads per write, mirroring a read-heavy workload.
    let read_ratio = 10;

    group.bench_function("concurrent_vec", |b| {
        b.iter_custom(|iters| {
            let mut total = std::time::Duration::ZERO;
            for _ in 0..iters {
                let vec: ConcurrentVec<usize> = ConcurrentVec::new();
                vec.push(0);
                total += timed_sweep(THREADS, |tid| {
                    for i in 0..N / THREADS {
                        if i % (read_ratio + 1) == 0 {
                            vec.push(tid * N + i);
                        } else {
                            let len = vec.len();
                            black_box(vec.get(i % len).ok());
                        }
                    }
                });
            }
            total
        })
    });

    group.bench_function("striped_vec", |b| {
        b.iter_custom(|iters| {
            let mut total = std::time::Duration::ZERO;
            for _ in 0..iters {
                let vec: StripedVec<usize> = StripedVec::with_stripes(16).unwrap();
                vec.push(0);
                total += timed_sweep(THREADS, |tid| {
                    for i in 0..N / THREADS {
                        if i % (read_ratio + 1) == 0 {
                            vec.push(tid * N + i);
                        } else {
                            let len = vec.len();
                            black_box(vec.get(i % len).ok());
                        }
                    }
                });
            }
            total
        })
    });

    group.finish();
}

criterion_group!(benches, bench_push, bench_read, bench_batch_insert, bench_mixed);
criterion_main!(benches);
