//! midare: pixel-sorting CLI.
//!
//! Drives the `midare-pipeline` core over one or more image files:
//!
//! - Decodes inputs (PNG, JPEG, BMP, WebP) and encodes results
//! - Loads an optional grayscale mask (white pixels are skipped)
//! - Rotates before and back-rotates after sorting for angled effects
//! - Fans multiple inputs out across a bounded worker pool
//!
//! # Usage
//!
//! ```text
//! midare -i photo.png -o sorted.png -p row -I wave -c lightness
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use clap::{Parser, ValueEnum};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use midare_pipeline::{AlgorithmKind, ComparatorKind, PatternKind, SortConfig, Thresholds};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Organize pixels.
///
/// Sorts the pixels of one or more images along a configurable
/// traversal, writing each result next to where you asked for it.
#[derive(Parser)]
#[command(name = "midare", version)]
struct Cli {
    /// Image(s) to sort, or a single directory full of images.
    #[arg(short, long = "input", required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// File to write the result to. Ignored for multi-image runs,
    /// which write frame0000.<ext> files in the working directory.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Traversal pattern.
    #[arg(short, long, value_enum, default_value_t = Pattern::Row)]
    pattern: Pattern,

    /// Interval algorithm applied to each sortable stretch.
    #[arg(short = 'I', long, value_enum, default_value_t = Interval::None)]
    interval: Interval,

    /// Pixel comparison function.
    #[arg(short, long, value_enum, default_value_t = Compare::Lightness)]
    comparator: Compare,

    /// Grayscale mask; white regions are never sorted. A directory
    /// pairs masks with inputs index-wise (clamping to the last mask).
    #[arg(short, long)]
    mask: Option<PathBuf>,

    /// Pixels with luminance below this threshold won't be sorted.
    #[arg(short = 'l', long, default_value_t = SortConfig::DEFAULT_LOWER_THRESHOLD)]
    lower_threshold: f32,

    /// Pixels with luminance above this threshold won't be sorted.
    #[arg(short = 'u', long, default_value_t = SortConfig::DEFAULT_UPPER_THRESHOLD)]
    upper_threshold: f32,

    /// Rotate the image by this many degrees before sorting.
    #[arg(short, long, default_value_t = SortConfig::DEFAULT_ANGLE)]
    angle: f64,

    /// Base length of each Wave section.
    #[arg(short = 'L', long, default_value_t = SortConfig::DEFAULT_SECTION_LENGTH)]
    section_length: usize,

    /// Reverse the sort direction.
    #[arg(short, long)]
    reverse: bool,

    /// Chunk-selection probability for Random and wave-edge jitter
    /// for Wave, in [0.0, 1.0].
    #[arg(short = 'R', long, default_value_t = SortConfig::DEFAULT_RANDOMNESS)]
    randomness: f32,

    /// Sort images in parallel across this many threads.
    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// Seed for reproducible runs; each frame derives its own stream.
    #[arg(long)]
    seed: Option<u64>,

    /// Full sort config as a JSON string.
    ///
    /// When provided, the individual parameter flags are ignored. The
    /// JSON must be a valid `SortConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Traversal pattern selection.
#[derive(Clone, Copy, ValueEnum)]
enum Pattern {
    /// One seam per image row.
    Row,
    /// Concentric rings from the border inward.
    Spiral,
    /// Seams along a minimum-energy vertical path.
    Seam,
}

/// Interval algorithm selection.
#[derive(Clone, Copy, ValueEnum)]
enum Interval {
    /// Sort each stretch whole.
    None,
    /// Sort randomly chosen chunks, skip the rest.
    Random,
    /// Comparator-gated shuffle.
    Shuffle,
    /// Flood each stretch with its first pixel.
    Smear,
    /// Sort consecutive chunks of roughly --section-length pixels.
    Wave,
}

/// Comparator selection.
#[derive(Clone, Copy, ValueEnum)]
enum Compare {
    /// HSL lightness, brightest last.
    Lightness,
    /// HSL lightness, brightest first.
    Darkness,
    /// HSL hue angle.
    Hue,
    /// HSL saturation.
    Saturation,
    /// Red channel only.
    Red,
    /// Green channel only.
    Green,
    /// Blue channel only.
    Blue,
}

/// Build a [`SortConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. Otherwise a config is
/// assembled from the flags. Either way the result is validated before
/// any image is touched.
fn config_from_cli(cli: &Cli) -> Result<SortConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        SortConfig {
            pattern: match cli.pattern {
                Pattern::Row => PatternKind::Row,
                Pattern::Spiral => PatternKind::Spiral,
                Pattern::Seam => PatternKind::SeamCarve,
            },
            algorithm: match cli.interval {
                Interval::None => AlgorithmKind::None,
                Interval::Random => AlgorithmKind::Random,
                Interval::Shuffle => AlgorithmKind::Shuffle,
                Interval::Smear => AlgorithmKind::Smear,
                Interval::Wave => AlgorithmKind::Wave,
            },
            comparator: match cli.comparator {
                Compare::Lightness => ComparatorKind::Lightness,
                Compare::Darkness => ComparatorKind::Darkness,
                Compare::Hue => ComparatorKind::Hue,
                Compare::Saturation => ComparatorKind::Saturation,
                Compare::Red => ComparatorKind::Red,
                Compare::Green => ComparatorKind::Green,
                Compare::Blue => ComparatorKind::Blue,
            },
            section_length: cli.section_length,
            randomness: cli.randomness,
            reverse: cli.reverse,
            thresholds: Thresholds::new(cli.lower_threshold, cli.upper_threshold),
            angle: cli.angle,
        }
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let inputs = match expand_inputs(cli.input) {
        Ok(paths) => paths,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    let masks = match cli.mask.map(expand_masks).transpose() {
        Ok(paths) => paths.unwrap_or_default(),
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!("Sorting {} image(s) with a config of {config:?}", inputs.len());

    let jobs: Vec<Job> = inputs
        .iter()
        .enumerate()
        .map(|(index, input)| Job {
            input: input.clone(),
            output: output_path(input, cli.output.as_deref(), index, inputs.len()),
            mask: masks
                .get(index.min(masks.len().saturating_sub(1)))
                .cloned(),
            seed: cli.seed.map(|seed| seed.wrapping_add(index as u64)),
        })
        .collect();

    let failed = run_jobs(&jobs, &config, cli.threads.max(1));
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// One image's worth of work: where to read, where to write, which
/// mask to apply, and which seed to derive the random stream from.
struct Job {
    input: PathBuf,
    output: PathBuf,
    mask: Option<PathBuf>,
    seed: Option<u64>,
}

/// Process every job across a bounded pool of worker threads.
///
/// Workers claim jobs through a shared cursor; each image is processed
/// single-threaded start to finish. Returns whether any job failed.
fn run_jobs(jobs: &[Job], config: &SortConfig, threads: usize) -> bool {
    let cursor = AtomicUsize::new(0);
    let any_failed = AtomicBool::new(false);

    std::thread::scope(|scope| {
        for _ in 0..threads.min(jobs.len()) {
            scope.spawn(|| {
                loop {
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(job) = jobs.get(index) else {
                        break;
                    };
                    eprintln!(
                        "Sorting {} -> {}...",
                        job.input.display(),
                        job.output.display(),
                    );
                    if let Err(msg) = process_image(job, config) {
                        eprintln!("Error sorting {}: {msg}", job.input.display());
                        any_failed.store(true, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    any_failed.load(Ordering::Relaxed)
}

/// Decode, optionally rotate, sort, undo the rotation, and encode one
/// image.
fn process_image(job: &Job, config: &SortConfig) -> Result<(), String> {
    let decoded = image::open(&job.input)
        .map_err(|e| format!("could not decode {}: {e}", job.input.display()))?;
    let mut img = decoded.to_rgba8();
    let (original_width, original_height) = img.dimensions();

    let angled = config.angle.rem_euclid(360.0) != 0.0;
    if angled {
        img = rotate_rgba(&img, config.angle);
    }

    let mask = job
        .mask
        .as_deref()
        .map(|path| load_mask(path, config.angle, angled))
        .transpose()?;

    let mut rng = job
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let sorted = midare_pipeline::sort_image_with(&img, mask.as_ref(), config, &mut rng)
        .map_err(|e| e.to_string())?;

    let result = if angled {
        let back = rotate_rgba(&sorted, -config.angle);
        if config.angle.rem_euclid(90.0) == 0.0 {
            back
        } else {
            // Back-rotation re-expands the canvas; crop the transparent
            // padding away to recover the original footprint.
            crop_center(&back, original_width, original_height)
        }
    } else {
        sorted
    };

    write_image(&result, &job.output)
}

/// Load a grayscale mask, rotating it the same way as the image so the
/// two grids stay aligned.
fn load_mask(path: &Path, angle: f64, angled: bool) -> Result<GrayImage, String> {
    let decoded =
        image::open(path).map_err(|e| format!("could not decode mask {}: {e}", path.display()))?;
    let mask = decoded.to_luma8();
    if angled {
        Ok(rotate_gray(&mask, angle))
    } else {
        Ok(mask)
    }
}

/// A single input directory is expanded to the images inside it.
/// Inputs are sorted lexicographically so frame order is stable.
fn expand_inputs(inputs: Vec<PathBuf>) -> Result<Vec<PathBuf>, String> {
    let expand_dir = matches!(inputs.as_slice(), [only] if only.is_dir());
    let mut inputs = if expand_dir {
        read_dir_images(&inputs[0])?
    } else {
        inputs
    };
    if inputs.is_empty() {
        return Err("no input images found".to_owned());
    }
    inputs.sort();
    Ok(inputs)
}

/// A mask argument is either one file or a directory of mask frames.
fn expand_masks(mask: PathBuf) -> Result<Vec<PathBuf>, String> {
    let mut masks = if mask.is_dir() {
        read_dir_images(&mask)?
    } else {
        vec![mask]
    };
    masks.sort();
    Ok(masks)
}

/// Collect the image files (png, jpg, jpeg) directly inside a directory.
fn read_dir_images(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| format!("couldn't read directory {}: {e}", dir.display()))?;

    let mut images = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| format!("couldn't read directory entry: {e}"))?;
        let path = entry.path();
        if path.is_file() && has_image_extension(&path) {
            images.push(path);
        }
    }
    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg")
        })
}

/// Where one frame's output lands: the explicit `--output` for a single
/// image (defaulting to `sorted.<ext>`), numbered frames for batches.
fn output_path(input: &Path, output: Option<&Path>, index: usize, total: usize) -> PathBuf {
    let extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("png");
    if total > 1 {
        PathBuf::from(format!("frame{index:04}.{extension}"))
    } else {
        output.map_or_else(|| PathBuf::from(format!("sorted.{extension}")), Path::to_path_buf)
    }
}

/// Encode the result, preserving the original container: JPEG outputs
/// are written at quality 100, everything else goes through the
/// format's default encoder.
fn write_image(image: &RgbaImage, path: &Path) -> Result<(), String> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    if matches!(extension.as_deref(), Some("jpg" | "jpeg")) {
        let file = std::fs::File::create(path)
            .map_err(|e| format!("could not create {}: {e}", path.display()))?;
        let writer = std::io::BufWriter::new(file);
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, 100);
        // JPEG has no alpha channel; flatten before encoding.
        let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
        rgb.write_with_encoder(encoder)
            .map_err(|e| format!("could not encode {}: {e}", path.display()))
    } else {
        image
            .save(path)
            .map_err(|e| format!("could not write {}: {e}", path.display()))
    }
}

/// The expanded canvas size and the input-to-output projection for a
/// rotation about the image center.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rotation_geometry(width: u32, height: u32, degrees: f64) -> (u32, u32, Projection) {
    let theta = degrees.to_radians();
    let (sin, cos) = theta.sin_cos();
    let w = f64::from(width);
    let h = f64::from(height);
    // The epsilon keeps right-angle rotations from ceiling up a row of
    // padding out of floating-point dust.
    let new_width = (cos.abs().mul_add(w, sin.abs() * h) - 1e-9).ceil().max(1.0) as u32;
    let new_height = (sin.abs().mul_add(w, cos.abs() * h) - 1e-9).ceil().max(1.0) as u32;

    let projection = Projection::translate(new_width as f32 / 2.0, new_height as f32 / 2.0)
        * Projection::rotate(-theta as f32)
        * Projection::translate(-(w as f32) / 2.0, -(h as f32) / 2.0);
    (new_width, new_height, projection)
}

/// Rotate an RGBA image counter-clockwise by `degrees`, expanding the
/// canvas to fit and filling the corners with transparency.
fn rotate_rgba(image: &RgbaImage, degrees: f64) -> RgbaImage {
    let (new_width, new_height, projection) =
        rotation_geometry(image.width(), image.height(), degrees);
    let mut out = RgbaImage::new(new_width, new_height);
    warp_into(
        image,
        &projection,
        Interpolation::Bilinear,
        Rgba([0, 0, 0, 0]),
        &mut out,
    );
    out
}

/// Rotate a grayscale mask the same way, filling corners with zero
/// (unmasked).
fn rotate_gray(image: &GrayImage, degrees: f64) -> GrayImage {
    let (new_width, new_height, projection) =
        rotation_geometry(image.width(), image.height(), degrees);
    let mut out = GrayImage::new(new_width, new_height);
    warp_into(image, &projection, Interpolation::Bilinear, Luma([0]), &mut out);
    out
}

/// Center-crop an image back down to the given footprint.
fn crop_center(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let x = image.width().saturating_sub(width) / 2;
    let y = image.height().saturating_sub(height) / 2;
    image::imageops::crop_imm(image, x, y, width.min(image.width()), height.min(image.height()))
        .to_image()
}
