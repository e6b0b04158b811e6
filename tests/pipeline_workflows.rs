//! End-to-end workflows over real files on disk
//!
//! Every test uses the bitmap font so results do not depend on the fonts
//! installed on the machine running them.

mod common;

use catalog_stamp::{
    error::CatalogError, AlphaChannelExtractor, Annotator, BorderKeyExtractor, CatalogProcessor,
    DeadlineExtractor, FnExtractor, ForegroundExtractor, ItemOutcome, LogoOutcome,
    PipelineConfig, TextRendering, PIPELINE_EXTENSIONS,
};
use common::{
    file_names, write_corrupt_image, write_logo, write_product_photo, write_text_file,
};
use image::{GenericImageView, Rgb};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

fn small_canvas_config() -> PipelineConfig {
    PipelineConfig::builder()
        .canvas_size(320, 240)
        .text_position(10, 200)
        .build()
        .unwrap()
}

fn processor_with(
    config: PipelineConfig,
    extractor: Box<dyn ForegroundExtractor>,
) -> CatalogProcessor {
    let annotator = Annotator::with_bitmap_font(config.text.clone());
    CatalogProcessor::with_annotator(config, extractor, annotator).unwrap()
}

fn label(counter: u64) -> String {
    format!("A4P-{counter} SIZE-10X14 CODE-BGN")
}

fn assert_close(actual: &Rgb<u8>, expected: [u8; 3]) {
    for (a, e) in actual.0.iter().zip(expected) {
        assert!(
            a.abs_diff(e) <= 2,
            "pixel {:?} differs from {:?}",
            actual.0,
            expected
        );
    }
}

#[test]
fn test_full_run_over_mixed_directory() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();

    write_product_photo(input.path(), "a.png", 200, 150);
    write_product_photo(input.path(), "b.jpg", 300, 200);
    write_product_photo(input.path(), "c.png", 160, 160);
    write_text_file(input.path(), "notes.txt");
    write_corrupt_image(input.path(), "broken.png");
    let logo = write_logo(assets.path(), "logo.png", 400, 100);

    let mut processor = processor_with(
        small_canvas_config(),
        Box::new(BorderKeyExtractor::default()),
    );
    let run = processor.run(input.path(), output.path(), &logo).unwrap();

    assert_eq!(run.resize.resized_count(), 3);
    assert_eq!(run.resize.failed.len(), 1);
    assert!(run.resize.failed[0].path.ends_with("broken.png"));

    assert_eq!(run.batch.saved_count(), 3);
    assert_eq!(run.batch.labels(), vec![label(25), label(26), label(27)]);
    assert_eq!(file_names(output.path()), vec!["a.png", "b.jpg", "c.png"]);

    let result = image::open(output.path().join("a.png")).unwrap().to_rgb8();
    assert_eq!(result.dimensions(), (320, 240));
    // Logo thumbnail is 170x43 at the origin
    assert_close(result.get_pixel(0, 0), [220, 20, 20]);
    assert_close(result.get_pixel(169, 42), [220, 20, 20]);
    // Keyed-out border becomes the white background
    assert_eq!(result.get_pixel(310, 10), &Rgb([255, 255, 255]));
    // Subject survives
    assert_close(result.get_pixel(160, 120), [30, 90, 160]);

    for item in &run.batch.items {
        match item {
            ItemOutcome::Saved { logo, text, .. } => {
                assert_eq!(logo, &LogoOutcome::Stamped { width: 170, height: 43 });
                assert_eq!(text, &TextRendering::BitmapFallback);
            },
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}

/// Collects the rendered fields of every WARN event
#[derive(Clone, Default)]
struct WarnEvents(Arc<Mutex<Vec<String>>>);

struct FieldText(String);

impl Visit for FieldText {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if !self.0.is_empty() {
            self.0.push(' ');
        }
        if field.name() == "message" {
            self.0.push_str(&format!("{value:?}"));
        } else {
            self.0.push_str(&format!("{}={value:?}", field.name()));
        }
    }
}

impl<S: Subscriber> Layer<S> for WarnEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            let mut text = FieldText(String::new());
            event.record(&mut text);
            self.0.lock().unwrap().push(text.0);
        }
    }
}

#[test]
fn test_unreadable_file_warns_once() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();

    write_product_photo(input.path(), "a.png", 200, 150);
    write_product_photo(input.path(), "b.jpg", 300, 200);
    write_product_photo(input.path(), "c.png", 160, 160);
    write_text_file(input.path(), "notes.txt");
    write_corrupt_image(input.path(), "broken.png");
    let logo = write_logo(assets.path(), "logo.png", 400, 100);

    let warnings = WarnEvents::default();
    let subscriber = tracing_subscriber::registry().with(warnings.clone());
    let mut processor = processor_with(small_canvas_config(), Box::new(AlphaChannelExtractor));
    let run = tracing::subscriber::with_default(subscriber, || {
        processor.run(input.path(), output.path(), &logo)
    })
    .unwrap();

    assert_eq!(run.resize.failed.len(), 1);
    assert_eq!(run.batch.saved_count(), 3);

    let warnings = warnings.0.lock().unwrap();
    let broken: Vec<_> = warnings.iter().filter(|w| w.contains("broken.png")).collect();
    assert_eq!(broken.len(), 1, "{warnings:?}");
    assert!(broken[0].starts_with("Failed to resize"), "{broken:?}");
    assert!(!warnings.iter().any(|w| w.contains("notes.txt")), "{warnings:?}");
}

#[test]
fn test_every_run_restarts_the_counter() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let paths = vec![
        write_product_photo(input.path(), "one.png", 40, 30),
        write_product_photo(input.path(), "two.png", 40, 30),
    ];
    let logo = input.path().join("no_logo.png");

    let mut processor = processor_with(small_canvas_config(), Box::new(AlphaChannelExtractor));
    let first = processor.process_batch(&paths, output.path(), &logo).unwrap();
    let second = processor.process_batch(&paths, output.path(), &logo).unwrap();

    assert_eq!(first.labels(), vec![label(25), label(26)]);
    assert_eq!(second.labels(), first.labels());
}

#[test]
fn test_always_failing_extractor_visits_every_item() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    for name in ["a.png", "b.png", "c.jpg"] {
        write_product_photo(input.path(), name, 32, 32);
    }
    let assets = TempDir::new().unwrap();
    let logo = write_logo(assets.path(), "logo.png", 10, 10);

    let failing = FnExtractor::new(
        "failing",
        |_image: &image::DynamicImage| -> catalog_stamp::Result<image::RgbaImage> {
            Err(CatalogError::extraction("segmentation service unavailable"))
        },
    );
    let mut processor = processor_with(small_canvas_config(), Box::new(failing));
    let report = processor
        .process_directory(input.path(), output.path(), &logo, &["jpg", "jpeg"])
        .unwrap();

    assert_eq!(report.items.len(), 1);
    assert_eq!(report.skipped_count(), 1);
    assert!(report.labels().is_empty());
    assert!(file_names(output.path()).is_empty());

    let report = processor
        .process_directory(input.path(), output.path(), &logo, PIPELINE_EXTENSIONS)
        .unwrap();
    assert_eq!(report.items.len(), 3);
    assert_eq!(report.skipped_count(), 3);
    assert!(file_names(output.path()).is_empty());
}

#[test]
fn test_failed_item_does_not_consume_a_label() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let paths = vec![
        write_product_photo(input.path(), "a.png", 40, 30),
        write_product_photo(input.path(), "b.png", 77, 30),
        write_product_photo(input.path(), "c.png", 40, 30),
    ];

    let picky = FnExtractor::new("picky", |image: &image::DynamicImage| -> catalog_stamp::Result<image::RgbaImage> {
        if image.width() == 77 {
            Err(CatalogError::extraction("no subject found"))
        } else {
            Ok(image.to_rgba8())
        }
    });
    let mut processor = processor_with(small_canvas_config(), Box::new(picky));
    let report = processor
        .process_batch(&paths, output.path(), input.path().join("missing.png"))
        .unwrap();

    assert_eq!(report.labels(), vec![label(25), label(26)]);
    assert_eq!(report.items[1].input(), &paths[1]);
    assert!(matches!(report.items[1], ItemOutcome::Skipped { .. }));
    assert_eq!(report.items[2].label(), Some(label(26).as_str()));
    assert_eq!(file_names(output.path()), vec!["a.png", "c.png"]);
}

#[test]
fn test_missing_logo_leaves_images_otherwise_processed() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let paths = vec![write_product_photo(input.path(), "a.png", 50, 50)];

    let mut processor = processor_with(small_canvas_config(), Box::new(AlphaChannelExtractor));
    let report = processor
        .process_batch(&paths, output.path(), input.path().join("absent.png"))
        .unwrap();

    match &report.items[0] {
        ItemOutcome::Saved { logo, output, .. } => {
            assert!(matches!(logo, LogoOutcome::Unchanged { .. }));
            let saved = image::open(output).unwrap();
            assert_eq!(saved.dimensions(), (50, 50));
            assert_eq!(saved.to_rgb8().get_pixel(0, 0), &Rgb([255, 255, 255]));
        },
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn test_existing_outputs_are_overwritten() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let paths = vec![write_product_photo(input.path(), "a.png", 48, 36)];
    image::RgbImage::new(8, 8)
        .save(output.path().join("a.png"))
        .unwrap();

    let mut processor = processor_with(small_canvas_config(), Box::new(AlphaChannelExtractor));
    let report = processor
        .process_batch(&paths, output.path(), input.path().join("absent.png"))
        .unwrap();

    assert_eq!(report.saved_count(), 1);
    let saved = image::open(output.path().join("a.png")).unwrap();
    assert_eq!(saved.dimensions(), (48, 36));
}

#[test]
fn test_slow_extraction_is_abandoned() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let paths: Vec<PathBuf> = vec![write_product_photo(input.path(), "slow.png", 20, 20)];

    let slow = FnExtractor::new("slow", |image: &image::DynamicImage| -> catalog_stamp::Result<image::RgbaImage> {
        std::thread::sleep(Duration::from_millis(500));
        Ok(image.to_rgba8())
    });
    let extractor = DeadlineExtractor::new(slow, Duration::from_millis(50));
    let mut processor = processor_with(small_canvas_config(), Box::new(extractor));
    let report = processor
        .process_batch(&paths, output.path(), input.path().join("absent.png"))
        .unwrap();

    assert_eq!(report.skipped_count(), 1);
    match &report.items[0] {
        ItemOutcome::Skipped { reason, .. } => assert!(reason.contains("deadline")),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(file_names(output.path()).is_empty());
}
