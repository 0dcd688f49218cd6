//! pixbatch CLI - Batch Image Filtering
//!
//! This is a demonstration CLI for the pixbatch library.

use anyhow::{bail, Context, Result};
use pixbatch::prelude::*;
use pixbatch::reconcile::{derivative_file_name, params_fingerprint};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

/// Extensions picked up by `batch`.
const INPUT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp", "tif", "tiff"];

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage(&args[0]);
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    match args[1].as_str() {
        "list" => list_filters(),
        "info" => {
            let Some(name) = args.get(2) else {
                bail!("Please specify a filter name");
            };
            filter_info(name)?;
        }
        "process" => {
            if args.len() < 4 {
                bail!("Usage: {} process <input> <output> [options]", args[0]);
            }
            let options = CliOptions::parse(&args[4..])?;
            process_image(Path::new(&args[2]), Path::new(&args[3]), &options)?;
        }
        "batch" => {
            if args.len() < 4 {
                bail!("Usage: {} batch <input-dir> <output-dir> [options]", args[0]);
            }
            let options = CliOptions::parse(&args[4..])?;
            let report = process_directory(Path::new(&args[2]), Path::new(&args[3]), &options)?;
            println!(
                "Batch complete: {} processed, {} failed ({} ms)",
                report.processed, report.failed, report.duration_ms
            );
        }
        "help" | "--help" | "-h" => print_usage(&args[0]),
        other => {
            print_usage(&args[0]);
            bail!("Unknown command: {}", other);
        }
    }
    Ok(())
}

fn print_usage(program: &str) {
    println!("pixbatch v{}", pixbatch::VERSION);
    println!();
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  list                           List all available filters");
    println!("  info <filter>                  Show details about a filter");
    println!("  process <in> <out> [options]   Filter one image");
    println!("  batch <dir> <out-dir> [options] Filter every image under a directory");
    println!("  help                           Show this help message");
    println!();
    println!("Options:");
    println!("  --brightness <0-100>   Brightness (50 = unchanged)");
    println!("  --contrast <0-100>     Contrast (50 = unchanged)");
    println!("  --saturation <0-100>   Saturation (50 = unchanged)");
    println!("  --blur <0-100>         Box blur intensity");
    println!("  --vintage | --edges | --sharpen | --faces");
    println!("  --preset <file>        Load a JSON or TOML filter preset");
    println!("  --format <png|jpg|webp> Output format (default: png)");
    println!("  --quality <1-100>      JPEG quality (default: 90)");
    println!("  --threads <n>          Worker threads for batch (default: all cores)");
    println!("  --sequential           Process batch images one at a time");
    println!();
    println!("Set RUST_LOG=debug to see per-stage timings.");
}

fn list_filters() {
    let catalog = FilterCatalog::builtin();

    println!("Available filters ({} total):", catalog.len());
    println!();

    for (category, filters) in catalog.grouped_by_category() {
        println!("  {}", category.display_name());
        for descriptor in filters {
            println!("      {:<15} {:<16} {}", descriptor.key, descriptor.name, descriptor.description);
        }
        println!();
    }
}

fn filter_info(name: &str) -> Result<()> {
    let catalog = FilterCatalog::builtin();
    let Some(descriptor) = catalog.lookup(name) else {
        bail!("Filter not found: {} (use 'list' to see available filters)", name);
    };

    println!("Filter: {}", descriptor.name);
    println!("Key: {}", descriptor.key);
    println!("Category: {}", descriptor.category.display_name());
    println!();
    println!("Description:");
    println!("  {}", descriptor.description);
    println!();

    match descriptor.key.neutral_intensity() {
        Some(neutral) => println!("Parameter: intensity 0-100, neutral at {}", neutral),
        None => println!("Parameter: on/off"),
    }
    Ok(())
}

/// Parsed filter and output options shared by `process` and `batch`.
#[derive(Debug, Default)]
struct CliOptions {
    config: FilterConfiguration,
    enabled: EnabledFilters,
    format: Option<OutputFormat>,
    quality: Option<u32>,
    threads: usize,
    sequential: bool,
}

impl CliOptions {
    fn parse(args: &[String]) -> Result<Self> {
        let mut options = CliOptions::default();

        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            let value = args.get(i + 1);
            match (flag, value) {
                ("--brightness" | "--contrast" | "--saturation" | "--blur", Some(value)) => {
                    let key = FilterKey::from_str(flag.trim_start_matches("--"))?;
                    let amount: i64 = value
                        .parse()
                        .with_context(|| format!("{} expects a number, got '{}'", flag, value))?;
                    options.config.set(key, amount);
                    options.enabled.insert(key);
                    i += 2;
                }
                ("--preset", Some(path)) => {
                    options.config = load_preset(Path::new(path))?;
                    options.enabled = EnabledFilters::from_config(&options.config);
                    i += 2;
                }
                ("--format", Some(value)) => {
                    options.format = Some(OutputFormat::from_str(value)?);
                    i += 2;
                }
                ("--quality", Some(value)) => {
                    options.quality = Some(value.parse().context("--quality expects a number")?);
                    i += 2;
                }
                ("--threads", Some(value)) => {
                    options.threads = value.parse().context("--threads expects a number")?;
                    i += 2;
                }
                ("--sequential", _) => {
                    options.sequential = true;
                    i += 1;
                }
                ("--vintage" | "--edges" | "--sharpen" | "--faces", _) => {
                    let key = match flag {
                        "--vintage" => FilterKey::Vintage,
                        "--edges" => FilterKey::EdgeDetection,
                        "--sharpen" => FilterKey::Sharpen,
                        _ => FilterKey::FaceDetection,
                    };
                    options.config.set(key, 1);
                    options.enabled.insert(key);
                    i += 1;
                }
                _ => bail!("Unknown or incomplete option: {}", flag),
            }
        }

        Ok(options)
    }

    /// Output spec, falling back to the extension of `output` for the format.
    fn output_spec(&self, output: Option<&Path>) -> OutputSpec {
        let format = self
            .format
            .or_else(|| {
                output
                    .and_then(|p| p.extension())
                    .and_then(|ext| ext.to_str())
                    .and_then(|ext| OutputFormat::from_str(ext).ok())
            })
            .unwrap_or_default();
        let quality = self.quality.map(Quality::new).unwrap_or_default();
        OutputSpec::new(format, quality)
    }

    fn pipeline(&self, output: Option<&Path>) -> FilterPipeline {
        FilterPipeline::new(&self.config, &self.enabled, self.output_spec(output))
    }

    fn batch_options(&self) -> BatchOptions {
        BatchOptions::new()
            .with_parallel(!self.sequential)
            .with_max_threads(self.threads)
            .with_progress(|update| {
                if let ProgressUpdate::Progress { percent, estimated_remaining_ms, .. } = update {
                    log::info!(
                        "{:>5.1}% done, ~{} ms remaining",
                        percent,
                        estimated_remaining_ms.unwrap_or(0)
                    );
                }
            })
    }
}

fn load_preset(path: &Path) -> Result<FilterConfiguration> {
    let source = std::fs::read_to_string(path).with_context(|| format!("Cannot read preset {}", path.display()))?;
    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => FilterConfiguration::from_toml_str(&source)?,
        _ => FilterConfiguration::from_json_str(&source)?,
    };
    Ok(config)
}

fn process_image(input: &Path, output: &Path, options: &CliOptions) -> Result<()> {
    let pipeline = options.pipeline(Some(output));
    let bytes = std::fs::read(input).with_context(|| format!("Cannot read {}", input.display()))?;

    println!("Processing {} -> {}", input.display(), output.display());
    let result = pipeline.run_bytes(&bytes)?;
    std::fs::write(output, &result.bytes).with_context(|| format!("Cannot write {}", output.display()))?;

    println!(
        "Applied [{}], wrote {} bytes of {}",
        result.applied_names().join(", "),
        result.bytes.len(),
        result.mime_type()
    );
    Ok(())
}

/// Filter every image under `input_dir` into `output_dir`.
///
/// Writes one derivative per successful image, named by the derivative
/// convention, plus `report.json` (the batch report) and `derivatives.json`
/// (the derivative records).
fn process_directory(input_dir: &Path, output_dir: &Path, options: &CliOptions) -> Result<BatchReport> {
    let files = collect_images(input_dir)?;
    if files.is_empty() {
        log::warn!("No images found under {}", input_dir.display());
    }

    let mut images = Vec::with_capacity(files.len());
    for (relative, path) in &files {
        let bytes = std::fs::read(path).with_context(|| format!("Cannot read {}", path.display()))?;
        images.push(SourceImage::new(relative.as_str(), bytes));
    }

    let pipeline = options.pipeline(None);
    let processor = BatchProcessor::new(pipeline.clone()).with_options(options.batch_options());
    let (outcomes, report) = processor.run_report(&images);

    std::fs::create_dir_all(output_dir).with_context(|| format!("Cannot create {}", output_dir.display()))?;

    let ledger = DerivativeLedger::new();
    for outcome in &outcomes {
        let file_name = file_name_of(outcome.image_id.as_str());
        let params_hash = params_fingerprint(outcome.image_id.as_str(), &pipeline)?;
        let record = ledger.begin(file_name, pipeline.output().format, Some(params_hash));

        // Mirror the input tree so same-named files in different folders stay apart
        let target_dir = match outcome.image_id.as_str().rsplit_once('/') {
            Some((parent, _)) => output_dir.join(parent),
            None => output_dir.to_path_buf(),
        };
        let target = target_dir.join(derivative_file_name(file_name, pipeline.output().format));
        if let Some(output) = outcome.output() {
            std::fs::create_dir_all(&target_dir)
                .with_context(|| format!("Cannot create {}", target_dir.display()))?;
            std::fs::write(&target, &output.bytes).with_context(|| format!("Cannot write {}", target.display()))?;
        }
        ledger.finish(record.id, &outcome.result, target.display().to_string())?;
    }

    std::fs::write(output_dir.join("report.json"), report.to_json_pretty()?)?;
    std::fs::write(
        output_dir.join("derivatives.json"),
        serde_json::to_string_pretty(&ledger.records())?,
    )?;

    Ok(report)
}

/// Image files under `dir`, sorted, keyed by their path relative to `dir`.
fn collect_images(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Cannot walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| INPUT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !is_image {
            continue;
        }

        let relative = path.strip_prefix(dir).unwrap_or(path).to_string_lossy().replace('\\', "/");
        files.push((relative, path.to_path_buf()));
    }
    Ok(files)
}

fn file_name_of(relative: &str) -> &str {
    relative.rsplit('/').next().unwrap_or(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn write_png(path: &Path, rgba: [u8; 4]) {
        let mut image = image::RgbaImage::new(4, 4);
        for pixel in image.pixels_mut() {
            *pixel = image::Rgba(rgba);
        }
        image.save(path).unwrap();
    }

    #[test]
    fn test_option_parsing() {
        let options = CliOptions::parse(&args(&["--brightness", "140", "--vintage", "--format", "jpg", "--quality", "70"]))
            .unwrap();

        assert_eq!(options.config.brightness, 100);
        assert!(options.enabled.contains(FilterKey::Brightness));
        assert!(options.config.vintage);
        let spec = options.output_spec(None);
        assert_eq!(spec.format, OutputFormat::Jpeg);
        assert_eq!(spec.quality.value(), 70);

        assert!(CliOptions::parse(&args(&["--blur"])).is_err());
        assert!(CliOptions::parse(&args(&["--format", "gif"])).is_err());
    }

    #[test]
    fn test_format_from_output_extension() {
        let options = CliOptions::default();
        assert_eq!(options.output_spec(Some(Path::new("out.webp"))).format, OutputFormat::WebP);
        assert_eq!(options.output_spec(Some(Path::new("out.bin"))).format, OutputFormat::Png);
    }

    #[test]
    fn test_batch_directory_layout() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        std::fs::create_dir(input.path().join("nested")).unwrap();
        write_png(&input.path().join("a.png"), [10, 20, 30, 255]);
        write_png(&input.path().join("nested/b.png"), [200, 100, 0, 255]);
        std::fs::write(input.path().join("broken.jpg"), b"not a jpeg").unwrap();
        std::fs::write(input.path().join("notes.txt"), b"ignored").unwrap();

        let options = CliOptions::parse(&args(&["--brightness", "60", "--sequential"])).unwrap();
        let report = process_directory(input.path(), output.path(), &options).unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.processed, 2);
        assert_eq!(report.failed, 1);

        assert!(output.path().join("filtered_a.png").is_file());
        assert!(output.path().join("nested/filtered_b.png").is_file());
        assert!(!output.path().join("filtered_broken.png").exists());
        assert!(output.path().join("report.json").is_file());

        let records: Vec<DerivativeRecord> =
            serde_json::from_str(&std::fs::read_to_string(output.path().join("derivatives.json")).unwrap()).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.params_hash.is_some()));
        let failed: Vec<_> = records.iter().filter(|r| r.status == DerivativeStatus::Failed).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].original_base_name, "broken");

        let written = RasterBuffer::decode(&std::fs::read(output.path().join("filtered_a.png")).unwrap()).unwrap();
        assert_eq!(written.pixel(0, 0), [20, 30, 40, 255]);
    }

    #[test]
    fn test_batch_keeps_same_named_files_apart() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        std::fs::create_dir(input.path().join("nested")).unwrap();
        write_png(&input.path().join("a.png"), [10, 10, 10, 255]);
        write_png(&input.path().join("nested/a.png"), [90, 90, 90, 255]);

        let options = CliOptions::parse(&args(&["--sequential"])).unwrap();
        let report = process_directory(input.path(), output.path(), &options).unwrap();
        assert_eq!(report.processed, 2);

        let top = RasterBuffer::decode(&std::fs::read(output.path().join("filtered_a.png")).unwrap()).unwrap();
        let nested =
            RasterBuffer::decode(&std::fs::read(output.path().join("nested/filtered_a.png")).unwrap()).unwrap();
        assert_eq!(top.pixel(0, 0), [10, 10, 10, 255]);
        assert_eq!(nested.pixel(0, 0), [90, 90, 90, 255]);

        let records: Vec<DerivativeRecord> =
            serde_json::from_str(&std::fs::read_to_string(output.path().join("derivatives.json")).unwrap()).unwrap();
        assert_eq!(records.len(), 2);
        assert_ne!(records[0].url, records[1].url);
    }

    #[test]
    fn test_process_single_image() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        write_png(&input, [128, 128, 128, 255]);

        let options = CliOptions::parse(&args(&["--brightness", "75"])).unwrap();
        process_image(&input, &output, &options).unwrap();

        let written = RasterBuffer::decode(&std::fs::read(&output).unwrap()).unwrap();
        assert_eq!(written.pixel(3, 3), [153, 153, 153, 255]);
    }
}
