//! Interpreter configuration: size guards and random constant ranges.

use rand::Rng;

/// Default maximum number of points in code built at runtime.
pub const DEFAULT_MAX_POINTS_IN_PROGRAM: usize = 100;

/// Default upper bound for `code.rand`.
pub const DEFAULT_MAX_RANDOM_CODE_SIZE: usize = 100;

/// Integer constant range: values `min + k * resolution` within `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
    pub resolution: i64,
}

impl IntRange {
    /// Draw a value uniformly from the quantized range. A non-positive
    /// resolution or an inverted range yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        if self.resolution <= 0 || self.max <= self.min {
            return self.min;
        }
        let steps = self.max.saturating_sub(self.min) / self.resolution;
        let k = rng.gen_range(0..=steps);
        self.min.saturating_add(k.saturating_mul(self.resolution))
    }
}

impl Default for IntRange {
    fn default() -> Self {
        Self {
            min: -100,
            max: 100,
            resolution: 1,
        }
    }
}

/// Float constant range: values `min + k * resolution` within `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatRange {
    pub min: f64,
    pub max: f64,
    pub resolution: f64,
}

impl FloatRange {
    /// Draw a value uniformly from the quantized range. A non-positive
    /// resolution or an empty range yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if !(self.resolution > 0.0) || !(self.max > self.min) {
            return self.min;
        }
        let steps = ((self.max - self.min) / self.resolution).floor();
        if !steps.is_finite() || steps >= i64::MAX as f64 {
            return self.min;
        }
        let k = rng.gen_range(0..=steps as i64);
        self.min + k as f64 * self.resolution
    }
}

impl Default for FloatRange {
    fn default() -> Self {
        Self {
            min: -10.0,
            max: 10.0,
            resolution: 0.01,
        }
    }
}

/// Tunables for one [`Interpreter`](crate::Interpreter).
#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterConfig {
    /// Largest program, in points, that `exec.s`, `exec.y` and the
    /// `do*` loops may construct. Larger constructions become no-ops.
    pub max_points_in_program: usize,
    /// Clamp for the size requested by `code.rand`.
    pub max_random_code_size: usize,
    /// Range for `integer.erc` and `integer.rand`.
    pub int_erc: IntRange,
    /// Range for `float.erc` and `float.rand`.
    pub float_erc: FloatRange,
    /// Seed for the interpreter's random number generator. `None` seeds
    /// from system entropy.
    pub seed: Option<u64>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_points_in_program: DEFAULT_MAX_POINTS_IN_PROGRAM,
            max_random_code_size: DEFAULT_MAX_RANDOM_CODE_SIZE,
            int_erc: IntRange::default(),
            float_erc: FloatRange::default(),
            seed: None,
        }
    }
}
