//! Batch pipeline orchestration
//!
//! Coordinates file discovery, parallel analysis, and export.
//! Edge maps are encoded on a separate thread fed by a bounded channel for backpressure.

use crate::config::Settings;
use crate::discovery::{self, DiscoveredFile};
use crate::error::{Result, TamperError};
use crate::export::{self, ImageReportJson};
use crate::pipeline::fusion::TamperAnalyzer;
use crate::raster;
use crate::types::RasterImage;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Pipeline result summary
#[derive(Debug)]
pub struct PipelineResult {
    pub total_files: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl PipelineResult {
    fn empty(total_files: usize, skipped: usize) -> Self {
        Self {
            total_files,
            successful: 0,
            failed: 0,
            skipped,
        }
    }
}

/// Run the full batch pipeline
pub fn run(settings: &Settings) -> Result<PipelineResult> {
    let pipeline_start = Instant::now();

    settings.analysis.validate()?;
    configure_thread_pool(settings.analysis_threads)?;

    // Phase 1: Discovery
    let discovery_start = Instant::now();
    info!("Scanning for image files...");
    let files = discovery::scan(&settings.input, settings.recursive)?;

    if files.is_empty() {
        return Ok(PipelineResult::empty(0, 0));
    }

    info!(
        "Found {} image files in {:.2}s",
        files.len(),
        discovery_start.elapsed().as_secs_f64()
    );

    if settings.dry_run {
        return run_dry_run(&files, settings);
    }

    // Skip images already present in the report
    let report_path = settings.report_path();
    let existing_paths = if settings.force {
        debug!("Force mode enabled, will re-analyze all files");
        HashSet::new()
    } else {
        export::read_existing_analysis(&report_path)
    };

    let (files_to_analyze, skipped_existing): (Vec<_>, Vec<_>) =
        files.into_iter().partition(|f| {
            let path_str = f.path.to_string_lossy().to_string();
            if existing_paths.contains(&path_str) {
                debug!("Skipping {} (already analyzed)", f.path.display());
                false
            } else {
                true
            }
        });

    let skipped_existing_count = skipped_existing.len();
    if skipped_existing_count > 0 {
        info!(
            "Skipping {} already-analyzed images (use --force to re-analyze)",
            skipped_existing_count
        );
    }

    let total_files = files_to_analyze.len() + skipped_existing_count;

    if files_to_analyze.is_empty() {
        info!("All images already analyzed, nothing to do");
        return Ok(PipelineResult::empty(total_files, skipped_existing_count));
    }

    info!("Analyzing {} images", files_to_analyze.len());

    // Phase 2: Analysis
    let analysis_start = Instant::now();
    let (images, stats) = analyze_files(&files_to_analyze, settings)?;
    let analysis_elapsed = analysis_start.elapsed();
    let images_per_sec = if analysis_elapsed.as_secs_f64() > 0.0 {
        files_to_analyze.len() as f64 / analysis_elapsed.as_secs_f64()
    } else {
        0.0
    };
    info!(
        "Analysis completed in {:.2}s ({:.1} images/sec)",
        analysis_elapsed.as_secs_f64(),
        images_per_sec
    );

    // Phase 3: Export
    if !images.is_empty() {
        let export_start = Instant::now();
        export_results(images, &report_path, settings)?;
        info!(
            "Export completed in {:.2}s",
            export_start.elapsed().as_secs_f64()
        );
    }

    info!(
        "Total pipeline time: {:.2}s",
        pipeline_start.elapsed().as_secs_f64()
    );

    Ok(PipelineResult {
        total_files,
        successful: stats.successful,
        failed: stats.failed,
        skipped: stats.skipped + skipped_existing_count,
    })
}

/// Dry run mode - show files that would be analyzed without processing
fn run_dry_run(files: &[DiscoveredFile], settings: &Settings) -> Result<PipelineResult> {
    println!();
    println!("=== DRY RUN MODE ===");
    println!();

    let mut by_directory: HashMap<PathBuf, Vec<&DiscoveredFile>> = HashMap::new();
    for file in files {
        let dir = file.path.parent().unwrap_or(&file.path).to_path_buf();
        by_directory.entry(dir).or_default().push(file);
    }

    let mut directories: Vec<_> = by_directory.keys().cloned().collect();
    directories.sort();

    let mut by_format: HashMap<&'static str, usize> = HashMap::new();
    for file in files {
        *by_format.entry(file.format.as_str()).or_default() += 1;
    }

    for dir in &directories {
        let dir_files = &by_directory[dir];
        println!("{}/ ({} files)", dir.display(), dir_files.len());
        for file in dir_files {
            let filename = file
                .path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("?");
            println!("  {} ({} KB)", filename, file.size_bytes / 1024);
        }
        println!();
    }

    println!("─────────────────────────────────────────");
    println!();
    println!("Would analyze {} images:", files.len());

    let mut formats: Vec<_> = by_format.into_iter().collect();
    formats.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    for (format, count) in formats {
        println!("  {} {} files", count, format);
    }
    println!();

    if !settings.analysis.perform_spectral_analysis {
        println!("Spectral analysis disabled (spectrum score reported as 0)");
    }
    println!("Edge threshold: {}", settings.analysis.edge_threshold);

    println!();
    println!("Would create:");
    println!("  {}", settings.report_path().display());
    if settings.write_edge_maps {
        println!("  {}/*.png (one edge map per image)", settings.edges_dir().display());
    }
    println!();

    Ok(PipelineResult {
        total_files: files.len(),
        successful: 0,
        failed: 0,
        skipped: files.len(), // All "skipped" in dry run mode
    })
}

/// Configure the Rayon thread pool
fn configure_thread_pool(num_threads: usize) -> Result<()> {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        Ok(()) => {
            debug!("Configured thread pool with {} threads", num_threads);
        }
        Err(e) => {
            // Already initialized (e.g. a second run in the same process)
            if e.to_string().contains("already been initialized") {
                debug!("Thread pool already initialized, using existing pool");
            } else {
                return Err(TamperError::ConfigError(format!(
                    "Failed to configure thread pool: {}",
                    e
                )));
            }
        }
    }
    Ok(())
}

/// Analysis statistics
struct AnalysisStats {
    successful: usize,
    failed: usize,
    skipped: usize,
}

/// Job for the edge-map writer thread
struct EdgeMapJob {
    /// Report key of the source image
    image_path: String,
    image_id: i32,
    edge_map: RasterImage,
    output_path: PathBuf,
}

/// Result from the edge-map writer
struct EdgeMapWritten {
    image_path: String,
    path: Option<PathBuf>,
}

/// Capacity of the edge-map queue; analysis threads block once it is full
const EDGE_CHANNEL_CAPACITY: usize = 8;

/// Give up handing an edge map to the writer after this long
const EDGE_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Analyze files in parallel, optionally rendering edge maps
fn analyze_files(
    files: &[DiscoveredFile],
    settings: &Settings,
) -> Result<(Vec<ImageReportJson>, AnalysisStats)> {
    let analyzer = TamperAnalyzer::new(settings.analysis);

    let edges_dir = settings.edges_dir();
    if settings.write_edge_maps {
        std::fs::create_dir_all(&edges_dir)
            .map_err(|e| TamperError::output_error(&edges_dir, e))?;
    }

    // Result channel is unbounded so the writer never blocks while the
    // main thread waits on join()
    let (job_tx, job_rx): (Option<Sender<EdgeMapJob>>, Option<Receiver<EdgeMapJob>>) =
        if settings.write_edge_maps {
            let (tx, rx) = bounded::<EdgeMapJob>(EDGE_CHANNEL_CAPACITY);
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };

    let (written_tx, written_rx) = unbounded::<EdgeMapWritten>();

    let writer_handle = job_rx.map(|rx| {
        let tx = written_tx.clone();
        thread::spawn(move || edge_map_worker(rx, tx))
    });
    drop(written_tx);

    let progress_bar = if settings.show_progress {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let successful = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);

    let mut images: Vec<ImageReportJson> = files
        .par_iter()
        .filter_map(|file| {
            let outcome = analyze_single_file(file, &analyzer);

            if let Some(ref pb) = progress_bar {
                pb.inc(1);
                pb.set_message(
                    file.path
                        .file_name()
                        .unwrap_or_default()
                        .to_string_lossy()
                        .to_string(),
                );
            }

            match outcome {
                Ok((entry, edge_map)) => {
                    if let Some(ref tx) = job_tx {
                        let job = EdgeMapJob {
                            image_path: entry.path.clone(),
                            image_id: entry.image_id,
                            edge_map,
                            output_path: edges_dir.join(edge_map_file_name(&file.path, entry.image_id)),
                        };
                        match tx.send_timeout(job, EDGE_SEND_TIMEOUT) {
                            Ok(()) => {}
                            Err(crossbeam_channel::SendTimeoutError::Timeout(_)) => {
                                warn!(
                                    "Edge map queue blocked for {}s, skipping edge map for {}",
                                    EDGE_SEND_TIMEOUT.as_secs(),
                                    file.path.display()
                                );
                            }
                            Err(crossbeam_channel::SendTimeoutError::Disconnected(_)) => {
                                debug!("Edge map channel closed, skipping {}", file.path.display());
                            }
                        }
                    }
                    successful.fetch_add(1, Ordering::Relaxed);
                    Some(entry)
                }
                Err(e) => {
                    if e.is_recoverable() {
                        warn!("Skipping {}: {}", file.path.display(), e);
                        skipped.fetch_add(1, Ordering::Relaxed);
                    } else {
                        error!("Failed {}: {}", file.path.display(), e);
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                    None
                }
            }
        })
        .collect();

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Analysis complete");
    }

    // Close the job channel so the writer drains and exits
    drop(job_tx);

    if let Some(handle) = writer_handle {
        match handle.join() {
            Ok(()) => debug!("Edge map writer completed"),
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic".to_string()
                };
                error!(
                    "Edge map writer panicked: {}. Some edge maps may be missing.",
                    panic_msg
                );
            }
        }
    }

    // Ids can collide (paths are hashed case-insensitively), paths cannot
    let index_by_path: HashMap<String, usize> = images
        .iter()
        .enumerate()
        .map(|(i, entry)| (entry.path.clone(), i))
        .collect();
    for written in written_rx {
        if let Some(&i) = index_by_path.get(&written.image_path) {
            images[i].edge_map = written.path.map(|p| p.to_string_lossy().to_string());
        }
    }

    let stats = AnalysisStats {
        successful: successful.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
        skipped: skipped.load(Ordering::Relaxed),
    };

    Ok((images, stats))
}

/// Worker thread encoding edge maps
fn edge_map_worker(rx: Receiver<EdgeMapJob>, tx: Sender<EdgeMapWritten>) {
    for job in rx {
        let path = if job.edge_map.is_empty() {
            debug!("Image {} has no pixels, no edge map written", job.image_id);
            None
        } else {
            match raster::write_png(&job.edge_map, &job.output_path) {
                Ok(()) => {
                    debug!("Edge map written to {}", job.output_path.display());
                    Some(job.output_path)
                }
                Err(e) => {
                    warn!("Edge map for image {} not written: {}", job.image_id, e);
                    None
                }
            }
        };

        let written = EdgeMapWritten {
            image_path: job.image_path,
            path,
        };

        if tx.send(written).is_err() {
            break;
        }
    }
}

/// `<stem>_<id>.png`
fn edge_map_file_name(path: &Path, image_id: i32) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    format!("{}_{}.png", stem, image_id)
}

/// Decode and analyze a single file
fn analyze_single_file(
    file: &DiscoveredFile,
    analyzer: &TamperAnalyzer,
) -> Result<(ImageReportJson, RasterImage)> {
    debug!("Analyzing: {}", file.path.display());

    let image_id = discovery::generate_image_id(&file.path);
    let decoded = raster::decode(&file.path)?;

    let result = analyzer.analyze(&decoded.raster, &decoded.file_bytes);

    debug!(
        "Analyzed {}: threat={} {}",
        file.path.file_name().unwrap_or_default().to_string_lossy(),
        result.threat_level.as_str(),
        result.explanation
    );

    let entry = ImageReportJson::from_analysis(
        image_id,
        &file.path,
        file.format.as_str(),
        file.size_bytes,
        &result,
    );

    Ok((entry, result.edge.edge_map))
}

/// Merge new entries over the existing report and write it
fn export_results(
    images: Vec<ImageReportJson>,
    report_path: &Path,
    settings: &Settings,
) -> Result<()> {
    std::fs::create_dir_all(&settings.output)
        .map_err(|e| TamperError::output_error(&settings.output, e))?;

    let analyzed_count = images.len();
    let fresh: HashSet<String> = images.iter().map(|i| i.path.clone()).collect();
    let mut merged: Vec<ImageReportJson> = export::read_existing_images(report_path)
        .into_iter()
        .filter(|i| !fresh.contains(&i.path))
        .collect();
    merged.extend(images);

    export::write_json(&merged, report_path)?;

    println!();
    println!(
        "✓ Wrote {} analyzed images ({} total) to {}",
        analyzed_count,
        merged.len(),
        report_path.display()
    );

    Ok(())
}
