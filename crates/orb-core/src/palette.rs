//! Per-game colour palettes and the shuffled colour bag orbs draw from.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// RGBA colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    /// Complementary colour, fully opaque.
    pub fn inverted(self) -> Self {
        Self::rgb(1.0 - self.r, 1.0 - self.g, 1.0 - self.b)
    }

    /// Converts back to `(hue°, saturation, value)`.
    pub fn to_hsv(self) -> (f32, f32, f32) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let chroma = max - min;

        let hue = if chroma <= f32::EPSILON {
            0.0
        } else if (max - self.r).abs() <= f32::EPSILON {
            60.0 * ((self.g - self.b) / chroma).rem_euclid(6.0)
        } else if (max - self.g).abs() <= f32::EPSILON {
            60.0 * ((self.b - self.r) / chroma + 2.0)
        } else {
            60.0 * ((self.r - self.g) / chroma + 4.0)
        };
        let saturation = if max <= f32::EPSILON { 0.0 } else { chroma / max };
        (hue, saturation, max)
    }
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn rotate_hue(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Converts HSV (hue in degrees, saturation and value in `[0, 1]`) to an
/// opaque RGB colour using the six-sector chroma construction.
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Color {
    let hue = rotate_hue(hue);
    let chroma = value * saturation;
    let x = chroma * (1.0 - ((hue / 60.0).rem_euclid(2.0) - 1.0).abs());

    let (r, g, b) = match hue {
        h if h < 60.0 => (chroma, x, 0.0),
        h if h < 120.0 => (x, chroma, 0.0),
        h if h < 180.0 => (0.0, chroma, x),
        h if h < 240.0 => (0.0, x, chroma),
        h if h < 300.0 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let m = value - chroma;
    Color::rgb(r + m, g + m, b + m)
}

/// A set of evenly spaced colours plus a shuffled bag used to hand them out.
#[derive(Debug, Clone)]
pub struct GamePalette {
    colors: Vec<Color>,
    hue_distance: f32,
    saturation: f32,
    value: f32,
    repetitions: usize,
    /// Palette indices, drawn from the back.
    bag: Vec<usize>,
    rng: ChaCha8Rng,
}

impl GamePalette {
    pub fn new(hue_distance: f32, saturation: f32, value: f32, repetitions: usize, seed: u64) -> Self {
        Self {
            colors: Vec::new(),
            hue_distance,
            saturation,
            value,
            repetitions: repetitions.max(1),
            bag: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Replaces the palette with `count` hues spaced `hue_distance` apart and
    /// centred on `base_hue`. Clears the bag.
    #[allow(clippy::cast_precision_loss)]
    pub fn generate(&mut self, base_hue: f32, count: usize) {
        let start = rotate_hue(base_hue - count as f32 * self.hue_distance / 2.0);
        self.colors = (0..count)
            .map(|i| {
                let hue = rotate_hue(start + i as f32 * self.hue_distance);
                hsv_to_rgb(hue, self.saturation, self.value)
            })
            .collect();
        self.bag.clear();
    }

    /// Replaces the palette with explicit `(hue, saturation, value)` triples. Clears the bag.
    pub fn set_hsv(&mut self, hsv: &[(f32, f32, f32)]) {
        self.colors = hsv.iter().map(|&(h, s, v)| hsv_to_rgb(h, s, v)).collect();
        self.bag.clear();
    }

    /// Generates a palette around a random base hue and returns that hue.
    pub fn generate_random(&mut self, count: usize) -> f32 {
        let base_hue = self.rng.random_range(0.0..360.0);
        self.generate(base_hue, count);
        base_hue
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colour at `index`, or `None` when out of range.
    pub fn color(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied()
    }

    /// Index of `color` in the palette.
    pub fn index_of(&self, color: Color) -> Option<usize> {
        self.colors.iter().position(|&c| c == color)
    }

    /// Draws the next colour from the bag, refilling it when one entry or
    /// fewer remain. Returns `None` for an empty palette.
    pub fn random_color(&mut self) -> Option<Color> {
        if self.colors.is_empty() {
            return None;
        }
        if self.bag.len() <= 1 {
            self.refill();
        }
        let index = self.bag.pop()?;
        self.colors.get(index).copied()
    }

    /// Slides a fresh shuffled batch under the leftover entry, so a full
    /// batch is always drawn before the next one starts.
    fn refill(&mut self) {
        let mut batch: Vec<usize> = (0..self.colors.len())
            .flat_map(|i| std::iter::repeat_n(i, self.repetitions))
            .collect();
        batch.shuffle(&mut self.rng);

        // The leftover is drawn next; give the batch one chance to avoid
        // opening with the same colour.
        if let (Some(&leftover), Some(&first)) = (self.bag.last(), batch.last())
            && leftover == first
        {
            batch.shuffle(&mut self.rng);
        }

        batch.append(&mut self.bag);
        self.bag = batch;
    }
}
