use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pixbatch::prelude::*;
use std::io::Cursor;

fn source_png(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8, 255])
    });
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode bench source");
    bytes
}

fn full_config() -> FilterConfiguration {
    FilterConfiguration::default()
        .with_brightness(65)
        .with_contrast(70)
        .with_saturation(30)
        .with_blur(20)
        .with_flag(FilterKey::Vintage, true)
        .with_flag(FilterKey::EdgeDetection, true)
        .with_flag(FilterKey::Sharpen, true)
}

fn bench_stages(c: &mut Criterion) {
    let raster = RasterBuffer::decode(&source_png(512, 512)).expect("decode bench source");
    let config = full_config();

    let mut group = c.benchmark_group("stage");
    for key in FilterKey::all() {
        let stage = FilterStage::from_config(*key, &config);
        group.bench_with_input(BenchmarkId::from_parameter(stage), &raster, |b, raster| {
            b.iter(|| stage.apply(black_box(raster.clone())))
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let bytes = source_png(512, 512);
    let config = full_config();
    let pipeline = FilterPipeline::from_config(&config, OutputSpec::png());

    c.bench_function("pipeline_512_png", |b| b.iter(|| pipeline.run_bytes(black_box(&bytes))));
}

fn bench_batch(c: &mut Criterion) {
    let images: Vec<SourceImage> = (0..16u64).map(|i| SourceImage::new(i, source_png(256, 256))).collect();
    let pipeline = FilterPipeline::from_config(&full_config(), OutputSpec::png());

    let mut group = c.benchmark_group("batch_16x256");
    for parallel in [false, true] {
        let processor = BatchProcessor::new(pipeline.clone()).with_options(BatchOptions::new().with_parallel(parallel));
        let label = if parallel { "parallel" } else { "sequential" };
        group.bench_function(label, |b| b.iter(|| processor.run_batch(black_box(&images))));
    }
    group.finish();
}

criterion_group!(benches, bench_stages, bench_pipeline, bench_batch);
criterion_main!(benches);
