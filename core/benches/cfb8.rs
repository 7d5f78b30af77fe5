use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use primitives_core::compression::{compress_all, decompress_all, CompressionSession, Mode};
use primitives_core::crypto::{CipherSession, DigestSession, Direction};
use primitives_core::Backend;

const SIZES: [usize; 3] = [64, 4 * 1024, 64 * 1024];

fn sample(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

fn benchmark_cfb8(c: &mut Criterion) {
    let mut group = c.benchmark_group("cfb8_encrypt");
    for backend in Backend::ALL {
        for size in SIZES {
            let data = sample(size);
            let mut out = vec![0u8; size];
            let mut session = CipherSession::new(backend, Direction::Encrypt, &[0x42; 32], &[0x24; 16]).unwrap();
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(BenchmarkId::new(backend.name(), size), &data, |b, data| {
                b.iter(|| session.process(black_box(data), &mut out));
            });
        }
    }
    group.finish();
}

fn benchmark_sha256(c: &mut Criterion) {
    let mut group = c.benchmark_group("sha256");
    for backend in Backend::ALL {
        for size in SIZES {
            let data = sample(size);
            let mut session = DigestSession::new(backend);
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(BenchmarkId::new(backend.name(), size), &data, |b, data| {
                b.iter(|| {
                    session.update(black_box(data));
                    black_box(session.digest())
                });
            });
        }
    }
    group.finish();
}

fn benchmark_deflate(c: &mut Criterion) {
    let data: Vec<u8> = b"the quick brown fox jumps over the lazy dog. ".repeat(1500);
    let mut group = c.benchmark_group("deflate");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for backend in Backend::ALL {
        let mut comp = CompressionSession::new(backend, Mode::Compress, 6, false).unwrap();
        let mut decomp = CompressionSession::new(backend, Mode::Decompress, 0, false).unwrap();
        let compressed = compress_all(&mut comp, &data, 8192).unwrap();

        group.bench_function(BenchmarkId::new("compress", backend.name()), |b| {
            b.iter(|| black_box(compress_all(&mut comp, black_box(&data), 8192).unwrap()));
        });
        group.bench_function(BenchmarkId::new("decompress", backend.name()), |b| {
            b.iter(|| black_box(decompress_all(&mut decomp, black_box(&compressed), 8192).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_cfb8, benchmark_sha256, benchmark_deflate);
criterion_main!(benches);
