use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::{GrayImage, Rgb, RgbImage};
use lane_detect::synthetic::StepEdge;
use lane_detect::{
    HoughAccumulator, Image, Lane, LaneConfig, LaneDetection, LaneDetector, LineSegment, Side,
    TimingBreakdown, roi_row_offset,
};
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "ld_gallery")]
#[command(about = "Run the lane-detection pipeline on image files")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect lanes and write `lines.json` plus `overlay.png`.
    #[command(name = "detect")]
    Detect(DetectArgs),
    /// Like `detect`, and also dump every intermediate map.
    #[command(name = "stages")]
    Stages(DetectArgs),
    /// Write a synthetic step-edge fixture and its truth file.
    #[command(name = "synth")]
    Synth(SynthArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    /// JSON lane config; omitted keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "out")]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct DetectArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Truth file written by `synth`; the result is compared against it.
    #[arg(long)]
    truth: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum SideArg {
    Left,
    Right,
}

#[derive(Args, Debug, Clone)]
struct SynthArgs {
    #[arg(long, value_enum, default_value_t = SideArg::Left)]
    side: SideArg,
    #[arg(long, default_value_t = 520)]
    width: usize,
    #[arg(long, default_value_t = 400)]
    height: usize,
    /// Normal angle of the left-side edge, in degrees.
    #[arg(long, default_value_t = 30.0)]
    theta: f64,
    /// Edge distance from the ROI origin, in pixels.
    #[arg(long, default_value_t = 160.0)]
    rho: f64,
    #[arg(long, default_value_t = 200)]
    bright: u8,
    /// Output PNG; the truth file is written next to it with a `.json`
    /// extension.
    #[arg(long, default_value = "out/synth_left.png")]
    out: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TruthDto {
    width: usize,
    height: usize,
    side: String,
    theta_deg: f64,
    rho: f64,
    roi_row_offset: usize,
}

#[derive(Debug, Clone, Serialize)]
struct LineDto {
    side: &'static str,
    rho: f64,
    theta_deg: f64,
    votes: u32,
    p0: [f32; 2],
    p1: [f32; 2],
}

#[derive(Debug, Clone, Serialize)]
struct DetectionDto {
    input: String,
    width: usize,
    height: usize,
    roi_row_offset: usize,
    candidate_count: usize,
    max_votes: u32,
    lines: Vec<LineDto>,
    timing: TimingBreakdown,
    config: LaneConfig,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Detect(args) => run_detect(args, false),
        Command::Stages(args) => run_detect(args, true),
        Command::Synth(args) => run_synth(args),
    }
}

fn run_detect(args: DetectArgs, dump_stages: bool) -> Result<()> {
    let common = &args.common;
    ensure_file_exists(&common.input, "input")?;
    let cfg = load_config(common.config.as_deref())?;
    let img = load_input_u8(&common.input)?;

    let truth = match &args.truth {
        Some(path) => {
            ensure_file_exists(path, "truth")?;
            let truth: TruthDto = read_json(path)?;
            validate_dims(&truth, &img)?;
            Some(truth)
        }
        None => None,
    };

    fs::create_dir_all(&common.out)
        .with_context(|| format!("creating output directory {}", common.out.display()))?;

    let mut detector = LaneDetector::new(&cfg).context("invalid lane config")?;
    let result = if dump_stages {
        let (result, stages) = detector
            .detect_with_stages(&img.as_view())
            .context("running lane detection")?;
        save_u8_image(common.out.join("gray.png"), &stages.gray)?;
        save_u8_image(common.out.join("gradient.png"), &stages.gradient)?;
        save_u8_image(common.out.join("binary.png"), &stages.binary)?;
        save_u8_image(common.out.join("dilated.png"), &stages.dilated)?;
        save_u8_image(
            common.out.join("accumulator.png"),
            &accumulator_vis(&stages.accumulator),
        )?;
        result
    } else {
        detector
            .detect(&img.as_view())
            .context("running lane detection")?
    };

    let overlay = render_overlay(&img, &result)?;
    let overlay_path = common.out.join("overlay.png");
    overlay
        .save(&overlay_path)
        .with_context(|| format!("saving image {}", overlay_path.display()))?;

    let dto = detection_dto(&common.input, &result, cfg);
    write_json(common.out.join("lines.json"), &dto)?;

    for line in &dto.lines {
        info!(
            "{}: rho={:.1} theta={:.1}deg votes={}",
            line.side, line.rho, line.theta_deg, line.votes
        );
    }
    if dto.lines.is_empty() {
        info!("no lane line selected ({} candidates)", dto.candidate_count);
    }
    if let Some(truth) = truth {
        report_truth(&truth, &result);
    }
    info!(
        "wrote results to {} in {:.2} ms",
        common.out.display(),
        result.timing.total_ms
    );

    Ok(())
}

fn run_synth(args: SynthArgs) -> Result<()> {
    if args.width == 0 || args.height == 0 {
        bail!("synthetic frame must be at least 1x1, got {}x{}", args.width, args.height);
    }
    if !(0.0..180.0).contains(&args.theta) {
        bail!("theta must lie in [0, 180) degrees, got {}", args.theta);
    }

    let roi_row = roi_row_offset(args.height, LaneConfig::default().hough.roi_offset_fraction);
    let edge = StepEdge {
        theta_deg: args.theta,
        rho: args.rho,
        row_offset: roi_row,
        dark: 0,
        bright: args.bright,
    };
    let edge = match args.side {
        SideArg::Left => edge,
        SideArg::Right => edge.mirrored(args.width),
    };

    if let Some(dir) = args.out.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }
    save_u8_image(args.out.clone(), &edge.render(args.width, args.height))?;

    let truth = TruthDto {
        width: args.width,
        height: args.height,
        side: format!("{:?}", args.side).to_lowercase(),
        theta_deg: edge.theta_deg,
        rho: edge.rho,
        roi_row_offset: roi_row,
    };
    let truth_path = args.out.with_extension("json");
    write_json(truth_path.clone(), &truth)?;

    info!(
        "wrote {} and {} (theta={:.1}deg rho={:.2})",
        args.out.display(),
        truth_path.display(),
        truth.theta_deg,
        truth.rho
    );
    Ok(())
}

fn report_truth(truth: &TruthDto, result: &LaneDetection) {
    let side = if truth.side == "right" { Side::Right } else { Side::Left };
    match result.lane(side) {
        Some(lane) => info!(
            "truth {}: dtheta={:+.2}deg drho={:+.2}px",
            truth.side,
            lane.line.theta_deg - truth.theta_deg,
            lane.line.rho - truth.rho
        ),
        None => info!("truth {}: no line detected on that side", truth.side),
    }
}

fn detection_dto(input: &Path, result: &LaneDetection, config: LaneConfig) -> DetectionDto {
    let lines = result
        .left
        .iter()
        .chain(result.right.iter())
        .map(line_dto)
        .collect();

    DetectionDto {
        input: input.display().to_string(),
        width: result.frame_shape.0,
        height: result.frame_shape.1,
        roi_row_offset: result.roi_row_offset,
        candidate_count: result.candidate_count,
        max_votes: result.max_votes,
        lines,
        timing: result.timing.clone(),
        config,
    }
}

fn line_dto(lane: &Lane) -> LineDto {
    let (p0, p1) = (lane.segment.p0, lane.segment.p1);
    LineDto {
        side: lane.line.side.as_str(),
        rho: lane.line.rho,
        theta_deg: lane.line.theta_deg,
        votes: lane.line.votes,
        p0: [p0.x, p0.y],
        p1: [p1.x, p1.y],
    }
}

fn load_config(path: Option<&Path>) -> Result<LaneConfig> {
    let Some(path) = path else {
        return Ok(LaneConfig::default());
    };
    ensure_file_exists(path, "config")?;
    let cfg: LaneConfig = read_json(path)?;
    cfg.validate()
        .with_context(|| format!("validating config {}", path.display()))?;
    Ok(cfg)
}

fn load_input_u8(path: &Path) -> Result<Image<u8>> {
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    let luma = dyn_img.to_luma8();
    let (w, h) = luma.dimensions();
    let data = luma.into_raw();

    Image::from_vec(w as usize, h as usize, data)
        .with_context(|| format!("constructing grayscale image from {}", path.display()))
}

fn validate_dims(truth: &TruthDto, img: &Image<u8>) -> Result<()> {
    if truth.width != img.width() || truth.height != img.height() {
        bail!(
            "truth dimensions ({}, {}) do not match input dimensions ({}, {}).",
            truth.width,
            truth.height,
            img.width(),
            img.height()
        );
    }
    Ok(())
}

fn save_u8_image(path: PathBuf, img: &Image<u8>) -> Result<()> {
    let gray = GrayImage::from_raw(img.width() as u32, img.height() as u32, img.data().to_vec())
        .context("constructing GrayImage from raw bytes")?;
    gray.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

/// Accumulator as an image: one column per theta bin, one row per rho bin,
/// votes scaled so the maximum maps to 255.
fn accumulator_vis(acc: &HoughAccumulator) -> Image<u8> {
    let max = u64::from(acc.max_votes().max(1));
    Image::from_fn(acc.num_theta(), acc.num_rho(), |t, r| {
        (u64::from(acc.votes(r, t)) * 255 / max) as u8
    })
}

fn render_overlay(input: &Image<u8>, result: &LaneDetection) -> Result<RgbImage> {
    let gray = GrayImage::from_raw(
        input.width() as u32,
        input.height() as u32,
        input.data().to_vec(),
    )
    .context("constructing GrayImage for overlay")?;
    let mut rgb = image::DynamicImage::ImageLuma8(gray).to_rgb8();

    for lane in result.left.iter().chain(result.right.iter()) {
        let color = match lane.line.side {
            Side::Left => Rgb([0, 0, 255]),
            Side::Right => Rgb([255, 0, 0]),
        };
        draw_segment(&mut rgb, &lane.segment, color);
    }

    Ok(rgb)
}

fn draw_segment(img: &mut RgbImage, seg: &LineSegment, color: Rgb<u8>) {
    let Some(seg) = seg.clipped_to(img.width() as usize, img.height() as usize) else {
        return;
    };
    let steps = seg.length().ceil().max(1.0) as usize;
    for i in 0..=steps {
        let p = seg.point_at(i as f32 / steps as f32);
        draw_dot(img, p.x, p.y, color);
    }
}

fn draw_dot(img: &mut RgbImage, x: f32, y: f32, color: Rgb<u8>) {
    let xi = x.round() as i32;
    let yi = y.round() as i32;

    for dy in -1..=1 {
        for dx in -1..=1 {
            let nx = xi + dx;
            let ny = yi + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            let (ux, uy) = (nx as u32, ny as u32);
            if ux >= img.width() || uy >= img.height() {
                continue;
            }
            img.put_pixel(ux, uy, color);
        }
    }
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
