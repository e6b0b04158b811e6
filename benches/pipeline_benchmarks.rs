use catalog_stamp::{
    compositing::{blend_over, flatten_onto, thumbnail_size},
    Annotator, BorderKeyExtractor, ForegroundExtractor, RgbColor, TextStyle,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

const CANVAS_SIZES: &[(u32, u32)] = &[(320, 240), (640, 480), (1280, 960)];

/// Product block on a white backdrop
fn product_photo(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let inside = x > width / 4 && x < width * 3 / 4 && y > height / 4 && y < height * 3 / 4;
        if inside {
            Rgb([30, 90, 160])
        } else {
            Rgb([255, 255, 255])
        }
    })
}

fn benchmark_border_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("border_key");
    group.sample_size(20);

    for &(width, height) in CANVAS_SIZES {
        let image = DynamicImage::ImageRgb8(product_photo(width, height));
        let mut extractor = BorderKeyExtractor::default();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{height}")),
            &image,
            |b, image| b.iter(|| black_box(extractor.extract(image).unwrap())),
        );
    }

    group.finish();
}

fn benchmark_compositing(c: &mut Criterion) {
    let mut group = c.benchmark_group("compositing");

    for &(width, height) in CANVAS_SIZES {
        let foreground = RgbaImage::from_fn(width, height, |x, _| Rgba([10, 20, 30, (x % 256) as u8]));

        group.bench_with_input(
            BenchmarkId::new("flatten_onto", format!("{width}x{height}")),
            &foreground,
            |b, foreground| b.iter(|| black_box(flatten_onto(foreground, RgbColor::WHITE))),
        );
    }

    let logo = RgbaImage::from_pixel(170, 43, Rgba([220, 20, 20, 200]));
    let base = product_photo(1280, 960);
    group.bench_function("blend_logo", |b| {
        b.iter(|| {
            let mut target = base.clone();
            blend_over(&mut target, black_box(&logo), (0, 0));
            target
        });
    });

    group.bench_function("thumbnail_size", |b| {
        b.iter(|| thumbnail_size(black_box((4000, 1000)), black_box((170, 170))));
    });

    group.finish();
}

fn benchmark_annotation(c: &mut Criterion) {
    let annotator = Annotator::with_bitmap_font(TextStyle::default());
    let base = product_photo(1280, 960);

    c.bench_function("annotate_bitmap", |b| {
        b.iter(|| {
            let mut target = base.clone();
            black_box(annotator.annotate(&mut target, "A4P-25 SIZE-10X14 CODE-BGN"));
            target
        });
    });
}

criterion_group!(
    benches,
    benchmark_border_key,
    benchmark_compositing,
    benchmark_annotation
);
criterion_main!(benches);
