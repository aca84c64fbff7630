use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use digitsvm::preprocessing::normalize;
use digitsvm::{LinearKernel, StandardScaler, ZeroVariance, SVC};
use ndarray::{Array2, ArrayView1};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn create_pixel_data(n_rows: usize, n_pixels: usize) -> (Array2<f64>, Vec<i64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut x = Array2::from_shape_fn((n_rows, n_pixels), |_| rng.gen_range(0..=255u32) as f64);
    normalize(&mut x, 255.0);
    StandardScaler::fit_transform(&mut x, ZeroVariance::Unit).unwrap();
    let y = (0..n_rows).map(|i| (i % 10) as i64).collect();
    (x, y)
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("svc_fit");
    group.sample_size(10); // Fewer samples for training benchmarks

    for n_rows in [100, 200, 400].iter() {
        let (x, y) = create_pixel_data(*n_rows, 784);

        group.bench_with_input(BenchmarkId::new("fit", n_rows), &(x, y), |b, (x, y)| {
            b.iter(|| {
                let mut model = SVC::new();
                model.fit(black_box(x.view()), black_box(y)).unwrap();
                model
            })
        });
    }

    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("svc_predict");

    let (x_train, y_train) = create_pixel_data(200, 784);
    let mut model = SVC::new();
    model.fit(x_train.view(), &y_train).unwrap();

    for n_rows in [100, 1000].iter() {
        let (x, _) = create_pixel_data(*n_rows, 784);
        group.bench_with_input(BenchmarkId::new("predict", n_rows), &x, |b, x| {
            b.iter(|| model.predict(black_box(x.view())).unwrap())
        });
    }

    group.finish();
}

fn bench_kernel(c: &mut Criterion) {
    use digitsvm::Kernel;

    let (x, _) = create_pixel_data(2, 784);
    let kernel = LinearKernel::new();
    let (a, b): (ArrayView1<f64>, ArrayView1<f64>) = (x.row(0), x.row(1));

    c.bench_function("linear_kernel_784", |bencher| {
        bencher.iter(|| kernel.compute(black_box(a), black_box(b)))
    });
}

criterion_group!(benches, bench_fit, bench_predict, bench_kernel);
criterion_main!(benches);
