// The two-phase stochastic search and the step loop that commits shapes.
//
// Each step samples `candidates` random shapes, keeps the one with the best
// (most negative) fitness delta, hill-climbs it until `mutations` consecutive
// non-improving trials, then commits the result to the canvas. The refined
// shape is committed even when no mutation ever improved on the sampled one.

use anyhow::{bail, Result};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::canvas::{similarity, Canvas, Color};
use crate::fitness::compute_fitness_delta;
use crate::raster::{render_to_canvas, MaskBuffer};
use crate::shape::{Shape, ShapeKinds};
use crate::solver::compute_optimal_color;

/// Knobs for one optimization run.
#[derive(Clone, Copy, Debug)]
pub struct SearchParams {
    /// Shapes to commit (outer loop iterations).
    pub steps: u32,
    /// Random shapes sampled per step. Must be at least 1.
    pub candidates: u32,
    /// Consecutive non-improving mutations that end the refinement phase.
    pub mutations: u32,
    /// Fill alpha assigned to sampled shapes, in (0, 1].
    pub alpha: f32,
}

impl SearchParams {
    pub fn validate(&self) -> Result<()> {
        if self.candidates == 0 {
            bail!("candidates must be at least 1");
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            bail!("alpha must be in (0, 1], got {}", self.alpha);
        }
        Ok(())
    }
}

/// Progress emitted after each committed step.
#[derive(Clone, Copy, Debug)]
pub struct StepReport {
    /// 1-based step index.
    pub step: u32,
    pub distance: f64,
    pub similarity: f64,
}

/// Outcome of a full run.
#[derive(Clone, Copy, Debug)]
pub struct RunSummary {
    pub steps_run: u32,
    /// True when the shape list filled up and further steps became no-ops.
    pub capacity_reached: bool,
    pub distance: f64,
    pub similarity: f64,
}

/// Owns the target, the evolving canvas, the committed shape list and the
/// scratch mask. Created once per target image; the mask buffer is
/// request-scoped state here rather than a process-wide global, which keeps
/// the clear-then-write protocol single-owner.
pub struct Optimizer {
    target: Canvas,
    current: Canvas,
    shapes: Vec<Shape>,
    background: Color,
    kinds: ShapeKinds,
    distance: f64,
    mask: MaskBuffer,
    rng: Pcg32,
    max_shapes: usize,
}

impl Optimizer {
    pub fn new(
        target: Canvas,
        background: Color,
        kinds: ShapeKinds,
        max_shapes: usize,
        seed: u64,
    ) -> Result<Self> {
        let width = target.width();
        let height = target.height();
        if width == 0 || height == 0 {
            bail!("target canvas has a zero dimension ({width}x{height})");
        }

        let mut current = Canvas::new(width, height);
        current.fill(background);
        let distance = current.distance_to(&target);

        Ok(Self {
            current,
            shapes: Vec::new(),
            background,
            kinds: kinds.normalized(),
            distance,
            mask: MaskBuffer::new(width, height),
            rng: Pcg32::seed_from_u64(seed),
            max_shapes,
            target,
        })
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn similarity(&self) -> f64 {
        similarity(self.distance)
    }

    pub fn current(&self) -> &Canvas {
        &self.current
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn capacity_reached(&self) -> bool {
        self.shapes.len() >= self.max_shapes
    }

    /// Generate one random candidate with its solved color and fitness delta.
    fn evaluate_candidate(&mut self, alpha: f32) -> (Shape, f64) {
        let mut shape = Shape::random(
            &mut self.rng,
            self.target.width(),
            self.target.height(),
            alpha,
            self.kinds,
        );
        shape.color = compute_optimal_color(&self.current, &self.target, &shape, &mut self.mask);
        let delta =
            compute_fitness_delta(&self.current, &self.target, &shape, shape.color, &mut self.mask);
        (shape, delta)
    }

    /// Sampling phase: best of `candidates` random shapes by fitness delta,
    /// ties broken first-seen.
    fn find_best_shape(&mut self, candidates: u32, alpha: f32) -> Shape {
        profiling::scope!("find_best_shape");
        let (mut best, mut best_delta) = self.evaluate_candidate(alpha);
        for _ in 1..candidates {
            let (shape, delta) = self.evaluate_candidate(alpha);
            if delta < best_delta {
                best = shape;
                best_delta = delta;
            }
        }
        best
    }

    /// Refinement phase: hill-climb by local mutation, accepting strictly
    /// improving mutants. Only consecutive failures bound the loop; a shape
    /// that keeps improving can run arbitrarily long.
    fn refine_shape(&mut self, shape: Shape, mutations: u32) -> Shape {
        profiling::scope!("refine_shape");
        let mut best = shape;
        let mut best_delta =
            compute_fitness_delta(&self.current, &self.target, &best, best.color, &mut self.mask);
        let mut failures = 0;

        while failures < mutations {
            let mut mutated = best.mutated(&mut self.rng);
            mutated.color =
                compute_optimal_color(&self.current, &self.target, &mutated, &mut self.mask);
            let delta = compute_fitness_delta(
                &self.current,
                &self.target,
                &mutated,
                mutated.color,
                &mut self.mask,
            );
            if delta < best_delta {
                best = mutated;
                best_delta = delta;
                failures = 0;
            } else {
                failures += 1;
            }
        }
        best
    }

    /// Append the shape, composite it into the canvas and recompute the
    /// global distance from scratch.
    fn commit(&mut self, shape: Shape) {
        self.shapes.push(shape);
        render_to_canvas(&mut self.current, &shape);
        self.distance = self.current.distance_to(&self.target);
    }

    /// One sample-refine-commit cycle. Returns false when the shape list is
    /// full and nothing was committed.
    pub fn step(&mut self, candidates: u32, mutations: u32, alpha: f32) -> bool {
        profiling::scope!("optimizer_step");
        if self.capacity_reached() {
            return false;
        }
        let sampled = self.find_best_shape(candidates, alpha);
        let refined = self.refine_shape(sampled, mutations);
        self.commit(refined);
        true
    }

    /// The driver loop: run `params.steps` steps, invoking `on_step` after
    /// each commit. Stops early when capacity is reached and says so in the
    /// summary instead of silently saturating.
    pub fn run<F>(&mut self, params: &SearchParams, mut on_step: F) -> Result<RunSummary>
    where
        F: FnMut(&StepReport),
    {
        params.validate()?;

        let mut steps_run = 0;
        for step in 0..params.steps {
            if !self.step(params.candidates, params.mutations, params.alpha) {
                break;
            }
            steps_run += 1;
            on_step(&StepReport {
                step: step + 1,
                distance: self.distance,
                similarity: self.similarity(),
            });
        }

        Ok(RunSummary {
            steps_run,
            capacity_reached: self.capacity_reached(),
            distance: self.distance,
            similarity: self.similarity(),
        })
    }
}
