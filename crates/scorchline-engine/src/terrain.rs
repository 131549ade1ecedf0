use std::collections::HashMap;

use rand::Rng;
use rand::rngs::StdRng;

/// Number of equal-width segments the world is divided into. The sample
/// count stays fixed when the world widens; segments get wider instead.
pub const SEGMENT_COUNT: usize = 400;
/// Slope angle driving the up/down pattern phases.
pub const SLOPE_ANGLE: f32 = 20.0 * std::f32::consts::PI / 180.0;
/// Generated heights stay within this band of the viewport height.
pub const MIN_HEIGHT_FRAC: f32 = 0.6;
pub const MAX_HEIGHT_FRAC: f32 = 0.9;
/// Height the generator starts from, and the height reported for queries
/// outside the sample range.
pub const DEFAULT_HEIGHT_FRAC: f32 = 0.8;
/// The indestructible baseline: no deformation may push a sample below
/// (on-screen) this fraction of the viewport height.
pub const BASELINE_FRAC: f32 = 0.95;
/// Half-distance used when sampling the slope.
const SLOPE_SAMPLE_DIST: f32 = 5.0;
/// Chance per sample of switching the pattern phase.
const PHASE_SWITCH_CHANCE: f64 = 0.1;
/// When a switch happens, how often it picks the upslope phase.
const UPSLOPE_BIAS: f64 = 0.7;
/// Neighbor count on each side used by crater smoothing.
const SMOOTH_NEIGHBORS: usize = 2;
/// Tunnel magnitude fades to zero at this vertical distance from the surface.
pub const TUNNEL_DEPTH_RANGE: f32 = 200.0;
/// Cap on the height delta between adjacent samples after a tunnel write.
pub const TUNNEL_MAX_STEP: f32 = 30.0;

/// One heightfield sample. `y` is the current (possibly deformed) height;
/// `original_y` is the immutable generation baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainSample {
    pub x: f32,
    pub y: f32,
    pub original_y: f32,
}

/// Procedural heightfield plus a sparse deformation overlay. The overlay is
/// authoritative wherever present; `original_y` is the fallback. Overlay
/// keys are quantized to `floor(x)`, so writes are last-write-wins per key.
#[derive(Debug, Clone)]
pub struct TerrainField {
    samples: Vec<TerrainSample>,
    overlay: HashMap<i64, f32>,
    world_width: f32,
    view_width: f32,
    view_height: f32,
}

fn overlay_key(x: f32) -> i64 {
    x.floor() as i64
}

#[derive(Clone, Copy, PartialEq)]
enum SlopePhase {
    Up,
    Flat,
    Down,
}

impl TerrainField {
    pub fn generate(world_width: f32, view_width: f32, view_height: f32, rng: &mut StdRng) -> Self {
        let mut field = Self {
            samples: Vec::with_capacity(SEGMENT_COUNT + 1),
            overlay: HashMap::new(),
            world_width,
            view_width,
            view_height,
        };
        field.build_samples(rng);
        field
    }

    /// Walk the pattern phases across the world, one sample per segment
    /// boundary. Previously deformed heights (overlay) are reapplied to the
    /// fresh samples' current height.
    fn build_samples(&mut self, rng: &mut StdRng) {
        self.samples.clear();
        let segment_width = self.world_width / SEGMENT_COUNT as f32;
        let h = self.view_height;
        let mut current = h * DEFAULT_HEIGHT_FRAC;
        let mut phase = SlopePhase::Up;
        let mut phase_run = 0u32;

        for i in 0..=SEGMENT_COUNT {
            let x = i as f32 * segment_width;

            if rng.random_bool(PHASE_SWITCH_CHANCE) {
                phase = if rng.random_bool(UPSLOPE_BIAS) {
                    SlopePhase::Up
                } else {
                    SlopePhase::Down
                };
            }

            match phase {
                SlopePhase::Up => {
                    current -= SLOPE_ANGLE.tan() * segment_width;
                    if phase_run > 5 {
                        phase = if rng.random_bool(0.3) {
                            SlopePhase::Flat
                        } else {
                            SlopePhase::Down
                        };
                        phase_run = 0;
                    }
                },
                SlopePhase::Flat => {
                    phase_run += 1;
                    if phase_run >= 5 {
                        phase = if rng.random_bool(UPSLOPE_BIAS) {
                            SlopePhase::Up
                        } else {
                            SlopePhase::Down
                        };
                        phase_run = 0;
                    }
                },
                SlopePhase::Down => {
                    // Rounded descent: the slope eases in and out over the run.
                    let progress = (phase_run % 10) as f32 / 10.0;
                    let curve = (progress * std::f32::consts::PI).sin();
                    current += (SLOPE_ANGLE * 0.8).tan() * segment_width * curve;
                    phase_run += 1;
                    if phase_run >= 10 {
                        phase = SlopePhase::Up;
                        phase_run = 0;
                    }
                },
            }

            current = current.clamp(h * MIN_HEIGHT_FRAC, h * MAX_HEIGHT_FRAC);

            let y = self
                .overlay
                .get(&overlay_key(x))
                .copied()
                .unwrap_or(current);
            self.samples.push(TerrainSample {
                x,
                y,
                original_y: current,
            });
        }
    }

    pub fn world_width(&self) -> f32 {
        self.world_width
    }

    pub fn samples(&self) -> &[TerrainSample] {
        &self.samples
    }

    pub fn segment_width(&self) -> f32 {
        self.world_width / SEGMENT_COUNT as f32
    }

    /// Current height of a sample: overlay first, generation baseline as
    /// fallback.
    fn sample_height(&self, sample: &TerrainSample) -> f32 {
        self.overlay
            .get(&overlay_key(sample.x))
            .copied()
            .unwrap_or(sample.original_y)
    }

    /// Ground height at a world x, linearly interpolated between the
    /// bracketing samples. Out-of-range queries return the default height
    /// rather than failing.
    pub fn height_at(&self, x: f32) -> f32 {
        let default = self.view_height * DEFAULT_HEIGHT_FRAC;
        if !x.is_finite() || x < 0.0 || x > self.world_width {
            return default;
        }
        let segment_width = self.segment_width();
        let i = ((x / segment_width) as usize).min(SEGMENT_COUNT - 1);
        let left = &self.samples[i];
        let right = &self.samples[i + 1];
        let ratio = (x - left.x) / (right.x - left.x);
        let left_h = self.sample_height(left);
        let right_h = self.sample_height(right);
        left_h + ratio * (right_h - left_h)
    }

    /// Surface slope at a world x, from heights sampled a short distance to
    /// each side.
    pub fn slope_at(&self, x: f32) -> f32 {
        let left = self.height_at(x - SLOPE_SAMPLE_DIST);
        let right = self.height_at(x + SLOPE_SAMPLE_DIST);
        (right - left).atan2(SLOPE_SAMPLE_DIST * 2.0)
    }

    /// The indestructible floor at a world x: the baseline fraction of the
    /// viewport plus a small deterministic jaggedness. Pure function of x.
    pub fn baseline_at(&self, x: f32) -> f32 {
        let jag = (x * 0.05).sin() * 1.7 + (x * 0.013 + 2.0).sin() * 2.3;
        self.view_height * BASELINE_FRAC + jag
    }

    fn write(&mut self, index: usize, height: f32) {
        let x = self.samples[index].x;
        self.overlay.insert(overlay_key(x), height);
        self.samples[index].y = height;
    }

    /// Carve a crater: radial falloff `depth * (1 - d^2)` inside the
    /// half-width window, clamped to the baseline, then smoothed by
    /// averaging with up to two neighbors per side over a slightly wider
    /// window, each smoothed value re-clamped at its own x.
    pub fn crater(&mut self, x: f32, depth: f32, half_width: f32) {
        if half_width <= 0.0 || depth <= 0.0 {
            return;
        }

        let mut new_heights: Vec<f32> = Vec::with_capacity(self.samples.len());
        for sample in &self.samples {
            let dx = sample.x - x;
            let current = self.sample_height(sample);
            if dx.abs() < half_width {
                let d = dx / half_width;
                let deformation = depth * (1.0 - d * d);
                let dug = (current + deformation).min(self.baseline_at(sample.x));
                new_heights.push(dug);
            } else {
                new_heights.push(current);
            }
        }

        let smooth_window = half_width * 1.2;
        for i in 0..self.samples.len() {
            let dx = self.samples[i].x - x;
            if dx.abs() >= smooth_window {
                continue;
            }
            let lo = i.saturating_sub(SMOOTH_NEIGHBORS);
            let hi = (i + SMOOTH_NEIGHBORS).min(new_heights.len() - 1);
            let sum: f32 = new_heights[lo..=hi].iter().sum();
            let smoothed = sum / (hi - lo + 1) as f32;
            let clamped = smoothed.min(self.baseline_at(self.samples[i].x));
            self.write(i, clamped);
        }
    }

    /// Carve a tunnel band: a vertical offset inside the half-width window
    /// whose magnitude fades with the impact's distance from the current
    /// surface, with an optional directional gradient. The height delta
    /// between adjacent samples is capped to keep the band free of spikes.
    pub fn tunnel(&mut self, x: f32, y: f32, half_width: f32, strength: f32, slope_dir: f32) {
        if half_width <= 0.0 || strength <= 0.0 {
            return;
        }

        let mut prev_height: Option<f32> = None;
        for i in 0..self.samples.len() {
            let sample_x = self.samples[i].x;
            let dx = sample_x - x;
            let current = self.sample_height(&self.samples[i]);
            if dx.abs() >= half_width {
                prev_height = Some(current);
                continue;
            }

            let proximity = 1.0 - ((y - current).abs() / TUNNEL_DEPTH_RANGE).min(1.0);
            let band = strength * proximity * (1.0 - dx.abs() / half_width);
            let gradient = slope_dir * 0.1 * dx;
            let mut new_height = current + band + gradient;

            if let Some(prev) = prev_height {
                new_height = new_height.clamp(prev - TUNNEL_MAX_STEP, prev + TUNNEL_MAX_STEP);
            }
            new_height = new_height.min(self.baseline_at(sample_x));

            self.write(i, new_height);
            prev_height = Some(new_height);
        }
    }

    /// Flatten every sample in [min_x, max_x] down to the baseline floor.
    pub fn flatten(&mut self, min_x: f32, max_x: f32) {
        for i in 0..self.samples.len() {
            let x = self.samples[i].x;
            if x >= min_x && x <= max_x {
                let floor = self.baseline_at(x);
                self.write(i, floor);
            }
        }
    }

    /// Widen the world once the player nears its edge. Samples are
    /// regenerated across the new width (the generation baselines reset);
    /// the deformation overlay is kept and remains authoritative at its
    /// keys. Returns true if an extension happened.
    pub fn extend_if_needed(&mut self, player_x: f32, extension: f32, rng: &mut StdRng) -> bool {
        if player_x <= self.world_width - self.view_width {
            return false;
        }
        self.world_width += extension;
        self.build_samples(rng);
        true
    }

    /// Full reset for a session restart: original width, cleared overlay,
    /// fresh samples.
    pub fn reset(&mut self, world_width: f32, rng: &mut StdRng) {
        self.world_width = world_width;
        self.overlay.clear();
        self.build_samples(rng);
    }

    pub fn deformed_key_count(&self) -> usize {
        self.overlay.len()
    }

    pub fn deformed_height(&self, x: f32) -> Option<f32> {
        self.overlay.get(&overlay_key(x)).copied()
    }
}
