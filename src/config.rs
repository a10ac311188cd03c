use num_traits::Float;

use crate::error::ParamsError;

/// Multiplicative update weight. Fixed by the algorithm.
pub const BETA: f64 = 0.5;

pub const DEFAULT_MAX_ITERATIONS: usize = 300;
pub const DEFAULT_EPSILON: f64 = 1e-4;
pub const DEFAULT_SEED: u64 = 1234;

/// Settings for a symNMF run
///
/// - max_iterations: Upper bound on multiplicative updates, default=300
/// - epsilon: Stop once the squared Frobenius delta between two iterates drops below this, default=1e-4
/// - threads: Worker threads for the update loop, default=rayon's current thread count
/// - seed: Seed for the random initial factor, default=1234
#[derive(Debug, Clone, PartialEq)]
pub struct Config<F> {
    pub(crate) max_iterations: usize,
    pub(crate) epsilon: F,
    pub(crate) threads: usize,
    pub(crate) seed: u64,
}

impl<F> Default for Config<F>
where
    F: Float,
{
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            epsilon: F::from(DEFAULT_EPSILON).unwrap_or_else(F::epsilon),
            threads: rayon::current_num_threads(),
            seed: DEFAULT_SEED,
        }
    }
}

impl<F> Config<F>
where
    F: Float,
{
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn epsilon(mut self, epsilon: F) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn get_max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn get_epsilon(&self) -> F {
        self.epsilon
    }

    pub fn get_threads(&self) -> usize {
        self.threads
    }

    pub fn get_seed(&self) -> u64 {
        self.seed
    }

    /// A zero iteration budget is valid and leaves the initial factor untouched
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !self.epsilon.is_finite() || self.epsilon <= F::zero() {
            return Err(ParamsError::Epsilon);
        }
        if self.threads == 0 {
            return Err(ParamsError::Threads);
        }
        Ok(())
    }
}
