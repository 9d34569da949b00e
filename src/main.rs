mod canvas;
mod fitness;
mod optimizer;
mod raster;
mod shape;
mod solver;
mod svg;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use rand::Rng;

use canvas::{Canvas, Color};
use optimizer::{Optimizer, SearchParams};
use shape::ShapeKinds;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ShapeKind {
    Triangle,
    Rectangle,
    Ellipse,
}

/// Approximate an image with semi-transparent geometric primitives.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Target image (any format the image crate can decode)
    input: PathBuf,

    /// Output PNG path
    #[arg(short, long, default_value = "primitives.png")]
    output: PathBuf,

    /// Also export the result as an SVG document
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Also dump the committed shape list as JSON
    #[arg(long)]
    shapes_json: Option<PathBuf>,

    /// Number of shapes to add
    #[arg(short, long, default_value_t = 500)]
    steps: u32,

    /// Random candidates sampled per step
    #[arg(short, long, default_value_t = 350)]
    candidates: u32,

    /// Consecutive failed mutations that end refinement of a candidate
    #[arg(short, long, default_value_t = 50)]
    mutations: u32,

    /// Fill opacity for new shapes, in (0, 1]
    #[arg(short, long, default_value_t = 0.5)]
    alpha: f32,

    /// Background color as an RRGGBB hex string
    #[arg(short, long, default_value = "000000")]
    background: String,

    /// Primitive kinds the search may use
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_value = "triangle,rectangle,ellipse"
    )]
    shapes: Vec<ShapeKind>,

    /// Hard cap on the number of committed shapes
    #[arg(long, default_value_t = 1000)]
    max_shapes: usize,

    /// RNG seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Suppress per-step progress output
    #[arg(short, long)]
    quiet: bool,
}

fn parse_hex_color(s: &str) -> Result<Color> {
    let s = s.trim_start_matches('#');
    if s.len() != 6 {
        bail!("expected a 6-digit RRGGBB hex color, got {s:?}");
    }
    let r = u8::from_str_radix(&s[0..2], 16)?;
    let g = u8::from_str_radix(&s[2..4], 16)?;
    let b = u8::from_str_radix(&s[4..6], 16)?;
    Ok(Color::opaque(r, g, b))
}

fn shape_kinds(selected: &[ShapeKind]) -> ShapeKinds {
    ShapeKinds {
        triangles: selected.contains(&ShapeKind::Triangle),
        rectangles: selected.contains(&ShapeKind::Rectangle),
        ellipses: selected.contains(&ShapeKind::Ellipse),
    }
    .normalized()
}

fn main() -> Result<()> {
    let args = Args::parse();

    let background = parse_hex_color(&args.background)
        .with_context(|| format!("invalid --background {:?}", args.background))?;
    let kinds = shape_kinds(&args.shapes);

    let source = image::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?
        .to_rgba8();
    let (width, height) = source.dimensions();
    let target = Canvas::from_rgba(width, height, source.into_raw())?;

    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    let mut optimizer = Optimizer::new(target, background, kinds, args.max_shapes, seed)?;

    if !args.quiet {
        println!(
            "{}x{} target, seed {seed}, initial distance = {:.6}",
            width,
            height,
            optimizer.distance()
        );
    }

    let params = SearchParams {
        steps: args.steps,
        candidates: args.candidates,
        mutations: args.mutations,
        alpha: args.alpha,
    };
    let summary = optimizer.run(&params, |report| {
        if !args.quiet {
            println!(
                "Step {}: distance = {:.6}, similarity = {:.2}%",
                report.step, report.distance, report.similarity
            );
        }
    })?;

    if summary.capacity_reached && summary.steps_run < args.steps {
        eprintln!(
            "shape capacity ({}) reached after {} steps",
            args.max_shapes, summary.steps_run
        );
    }

    let rendered = image::RgbaImage::from_raw(width, height, optimizer.current().data().to_vec())
        .context("rendered canvas has the wrong buffer size")?;
    rendered
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    if let Some(path) = &args.svg {
        let doc = svg::render_document(optimizer.shapes(), background, width, height);
        fs::write(path, doc).with_context(|| format!("failed to write {}", path.display()))?;
    }

    if let Some(path) = &args.shapes_json {
        let json = serde_json::to_string_pretty(optimizer.shapes())?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    }

    println!(
        "Done! {} shapes, distance = {:.6}, similarity = {:.2}% -> {}",
        optimizer.shapes().len(),
        summary.distance,
        summary.similarity,
        args.output.display()
    );
    Ok(())
}
