//! bleedmakr - print-bleed preparation for artwork files
//!
//! CLI entry point

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::bail;
use clap::Parser;
use rayon::prelude::*;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use bleedmakr::{
    batch_bar, exit_codes, output_path, should_skip_processing,
    // Cache module
    CacheDigest, CacheInfoArgs, CacheResult, ProcessingCache,
    // CLI
    Cli, Commands, DetectArgs, ProcessArgs,
    // Config
    CliOverrides, Config,
    // Scanner and pipeline
    BorderScanner, OutputMode, Processor, ProgressTracker, ScanOptions,
};

/// Extensions the process command accepts
const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "pdf", "eps"];

fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Process(args) => run_process(&args),
        Commands::CacheInfo(args) => run_cache_info(&args),
        Commands::Info => run_info(),
    };

    std::process::exit(match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_codes::GENERAL_ERROR
        }
    });
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

// ============ Detect Command ============

fn run_detect(args: &DetectArgs) -> anyhow::Result<()> {
    if !args.image.exists() {
        eprintln!("Error: Image does not exist: {}", args.image.display());
        std::process::exit(exit_codes::INPUT_NOT_FOUND);
    }

    let image = image::open(&args.image)?;
    let options = ScanOptions::builder()
        .tolerance(args.tolerance)
        .extra_crop(args.extra_crop)
        .build();
    let detection = BorderScanner::detect_image(&image, &options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&detection)?);
    } else {
        println!(
            "Image: {} ({}x{})",
            args.image.display(),
            image.width(),
            image.height()
        );
        println!(
            "Crop box: left={} top={} right={} bottom={}",
            detection.left, detection.top, detection.right, detection.bottom
        );
        println!(
            "Crop size: {}x{}",
            detection.crop_width(),
            detection.crop_height()
        );
        println!("Area reduction: {:.2}%", detection.area_reduction);
    }

    Ok(())
}

// ============ Process Command ============

fn run_process(args: &ProcessArgs) -> anyhow::Result<()> {
    let start_time = Instant::now();

    if !args.input.exists() {
        eprintln!("Error: Input path does not exist: {}", args.input.display());
        std::process::exit(exit_codes::INPUT_NOT_FOUND);
    }

    let files = collect_supported_files(&args.input)?;
    if files.is_empty() {
        eprintln!("Error: No supported files found in input path");
        std::process::exit(exit_codes::INPUT_NOT_FOUND);
    }

    // Load config file if specified, otherwise use the standard locations
    let file_config = match &args.config {
        Some(config_path) => match Config::load_from_path(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Warning: Failed to load config file: {}", e);
                Config::default()
            }
        },
        None => Config::load().unwrap_or_default(),
    };

    // Merge config file with CLI arguments (CLI takes precedence)
    let cli_overrides = create_cli_overrides(args);
    let config = file_config.merge_with_cli(&cli_overrides);
    let process_options = config.to_process_options();

    if args.dry_run {
        print_execution_plan(args, &files, &config);
        return Ok(());
    }

    std::fs::create_dir_all(&args.output)?;

    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok();
    }

    // Pre-compute options JSON for caching
    let options_json = config.to_json();
    let mode = if args.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::from_verbosity(args.verbose)
    };

    let ok_count = AtomicUsize::new(0);
    let skip_count = AtomicUsize::new(0);
    let error_count = AtomicUsize::new(0);

    let bar = if files.len() > 1 && mode.should_show(OutputMode::Normal) {
        Some(batch_bar(files.len() as u64))
    } else {
        None
    };

    files.par_iter().for_each(|input| {
        let output = output_path(input, &args.output, &args.format);

        // Check cache for smart skipping
        let skip = if args.skip_existing && !args.force {
            output.exists()
        } else if !args.force {
            should_skip_processing(input, &output, &options_json).is_some()
        } else {
            false
        };

        if skip {
            if mode.should_show(OutputMode::Verbose) {
                println!("Skipping (cached): {}", input.display());
            }
            skip_count.fetch_add(1, Ordering::Relaxed);
            if let Some(bar) = &bar {
                bar.inc(1);
            }
            return;
        }

        match Processor::process_file(input, &output, &process_options) {
            Ok(report) => {
                ok_count.fetch_add(1, Ordering::Relaxed);

                // Save cache after successful processing
                if let Ok(digest) = CacheDigest::new(input, &options_json) {
                    let cache = ProcessingCache::new(digest, CacheResult::from_report(&report));
                    let _ = cache.save(&output);
                }

                if mode.should_show(OutputMode::Verbose) {
                    println!(
                        "Completed: {} -> {} ({}x{}, {:.2}% trimmed, {:.2}s)",
                        input.display(),
                        output.display(),
                        report.canvas_size.0,
                        report.canvas_size.1,
                        report.detection.area_reduction,
                        report.elapsed_seconds
                    );
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {}", input.display(), e);
                error_count.fetch_add(1, Ordering::Relaxed);
            }
        }

        if let Some(bar) = &bar {
            bar.inc(1);
        }
    });

    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }

    let ok = ok_count.load(Ordering::Relaxed);
    let skipped = skip_count.load(Ordering::Relaxed);
    let errors = error_count.load(Ordering::Relaxed);

    if mode.should_show(OutputMode::Normal) {
        ProgressTracker::print_summary(files.len(), ok, skipped, errors);
        println!("Total time: {:.2}s", start_time.elapsed().as_secs_f64());
    }

    if errors > 0 {
        bail!("{} file(s) failed to process", errors);
    }

    Ok(())
}

// ============ Helper Functions ============

/// Create CLI overrides from ProcessArgs
///
/// Only override config file values when CLI explicitly sets a non-default
/// value. This allows config files to provide defaults that aren't overridden
/// by clap defaults.
fn create_cli_overrides(args: &ProcessArgs) -> CliOverrides {
    let mut overrides = CliOverrides::new();

    const DEFAULT_BLEED_MM: f64 = 3.0;
    const DEFAULT_TOLERANCE: u8 = 10;
    const DEFAULT_EXTRA_CROP: i32 = 2;
    const DEFAULT_DPI: u32 = 300;
    const DEFAULT_JPEG_QUALITY: u8 = 90;

    if (args.bleed_mm - DEFAULT_BLEED_MM).abs() > f64::EPSILON {
        overrides.bleed_mm = Some(args.bleed_mm);
    }
    if args.tolerance != DEFAULT_TOLERANCE {
        overrides.tolerance = Some(args.tolerance);
    }
    if args.extra_crop != DEFAULT_EXTRA_CROP {
        overrides.extra_crop = Some(args.extra_crop);
    }
    if args.dpi != DEFAULT_DPI {
        overrides.dpi = Some(args.dpi);
    }
    if args.jpeg_quality != DEFAULT_JPEG_QUALITY {
        overrides.jpeg_quality = Some(args.jpeg_quality);
    }

    // Threads: only set if explicitly provided
    overrides.threads = args.threads;

    overrides
}

/// Collect supported files from input path (file or directory)
fn collect_supported_files(input: &PathBuf) -> anyhow::Result<Vec<PathBuf>> {
    let is_supported = |path: &Path| {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
    };

    let mut files = Vec::new();
    if input.is_file() {
        if is_supported(input) {
            files.push(input.clone());
        }
    } else if input.is_dir() {
        for entry in std::fs::read_dir(input)? {
            let path = entry?.path();
            if path.is_file() && is_supported(&path) {
                files.push(path);
            }
        }
        files.sort();
    }

    Ok(files)
}

/// Print execution plan for dry-run mode
fn print_execution_plan(args: &ProcessArgs, files: &[PathBuf], config: &Config) {
    println!("=== Dry Run - Execution Plan ===");
    println!();
    println!("Input: {}", args.input.display());
    println!("Output: {}", args.output.display());
    println!("Files to process: {}", files.len());
    println!();
    println!("Pipeline Configuration:");
    println!("  Bleed: {} mm ({} px at {} DPI)", config.bleed_mm,
        config.to_process_options().bleed_px(), config.dpi);
    println!("  Extra crop: {} px", config.extra_crop_px);
    println!("  Tolerance: {}", config.tolerance);
    println!("  Output format: {}", args.format);
    if args.format == "pdf" {
        println!("  JPEG quality: {}", config.jpeg_quality);
    }
    println!();
    println!("Processing Options:");
    println!("  Threads: {}", config.threads.unwrap_or_else(num_cpus::get));
    println!("  Skip existing: {}", if args.skip_existing { "YES" } else { "NO" });
    println!("  Force re-process: {}", if args.force { "YES" } else { "NO" });
    println!();
    println!("Files:");
    for (i, file) in files.iter().enumerate() {
        println!("  {}. {}", i + 1, file.display());
    }
}

// ============ Info Command ============

fn run_info() -> anyhow::Result<()> {
    println!("bleedmakr v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("System Information:");
    println!("  Platform: {}", std::env::consts::OS);
    println!("  Arch: {}", std::env::consts::ARCH);
    println!("  CPUs: {}", num_cpus::get());

    println!();
    println!("External Tools:");
    check_tool("pdftoppm", "Poppler (PDF rendering)");
    check_tool("gs", "Ghostscript (EPS conversion)");

    println!();
    println!("Config File Locations:");
    for path in Config::standard_paths() {
        let marker = if path.exists() { " (present)" } else { "" };
        println!("  {}{}", path.display(), marker);
    }

    Ok(())
}

fn check_tool(cmd: &str, name: &str) {
    match which::which(cmd) {
        Ok(path) => println!("  {}: {} (found)", name, path.display()),
        Err(_) => println!("  {}: Not found", name),
    }
}

// ============ Cache Info Command ============

fn run_cache_info(args: &CacheInfoArgs) -> anyhow::Result<()> {
    use chrono::{DateTime, Local, TimeZone};

    let output = &args.output;

    if !output.exists() {
        bail!("Output file not found: {}", output.display());
    }

    match ProcessingCache::load(output) {
        Ok(cache) => {
            println!("=== Cache Information ===");
            println!();
            println!("Output file: {}", output.display());
            println!("Cache file:  {}", ProcessingCache::cache_path(output).display());
            println!();
            println!("Cache Version: {}", cache.version);
            let processed_dt: DateTime<Local> = Local
                .timestamp_opt(cache.processed_at, 0)
                .single()
                .unwrap_or_else(Local::now);
            println!("Processed at:  {}", processed_dt.format("%Y-%m-%d %H:%M:%S"));
            println!();
            println!("Source Digest:");
            println!("  Modified: {}", cache.digest.source_modified);
            println!("  Size:     {} bytes", cache.digest.source_size);
            println!("  Options:  {}", cache.digest.options_hash);
            println!();
            println!("Processing Result:");
            println!(
                "  Original size: {}x{}",
                cache.result.original_size.0, cache.result.original_size.1
            );
            println!(
                "  Canvas size:   {}x{}",
                cache.result.canvas_size.0, cache.result.canvas_size.1
            );
            println!("  Trimmed:       {:.2}%", cache.result.area_reduction);
            println!("  Elapsed:       {:.2}s", cache.result.elapsed_seconds);
            println!(
                "  Output size:   {} bytes ({:.2} MB)",
                cache.result.output_size,
                cache.result.output_size as f64 / 1_048_576.0
            );
        }
        Err(e) => {
            println!("No cache found for: {}", output.display());
            println!(
                "Cache file would be: {}",
                ProcessingCache::cache_path(output).display()
            );
            println!();
            println!("Reason: {}", e);
        }
    }

    Ok(())
}
