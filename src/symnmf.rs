use log::{debug, trace};
use ndarray::{Array2, Zip};
use num_traits::Float;
use rand::distributions::uniform::SampleUniform;

use crate::algebra::{copy, frobenius_delta, multiply, transpose};
use crate::config::{Config, BETA};
use crate::error::{Result, SymNmfError};
use crate::graph::{degree, normalize, similarity};
use crate::init::initialize_h;
use crate::matrix::{Heap, Lease, MatrixAllocator};

/// Outcome of a factorization run
#[derive(Debug, Clone)]
pub struct Factorization<F> {
    h: Array2<F>,
    iterations: usize,
    converged: bool,
    delta: F,
}

impl<F> Factorization<F>
where
    F: Float,
{
    /// Final n x k factor
    pub fn h(&self) -> &Array2<F> {
        &self.h
    }

    pub fn into_h(self) -> Array2<F> {
        self.h
    }

    /// Number of multiplicative updates applied
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether the loop stopped on the epsilon test rather than the iteration budget
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Squared Frobenius delta of the last update, infinite if no update ran
    pub fn delta(&self) -> F {
        self.delta
    }
}

/// Symmetric Non-negative Matrix Factorization: factors W ~ H * H^T with H >= 0.
///
/// Graph construction (`sym`, `ddg`, `norm`) and the multiplicative update
/// loop (`factor`) share one allocator. Every intermediate matrix is returned
/// to that allocator before a call exits, whether it succeeds or fails.
///
///     use ndarray::arr2;
///     use symnmf::{Config, SymNmf};
///
///     let x = arr2(&[[0., 0.], [0., 1.], [5., 5.], [5., 6.]]);
///     let nmf = SymNmf::<f64>::new(Config::default().threads(2));
///     let result = nmf.fit(&x, 2).unwrap();
///     assert_eq!(result.h().dim(), (4, 2));
///     assert!(result.h().iter().all(|v| *v >= 0.));
pub struct SymNmf<F, A = Heap> {
    config: Config<F>,
    alloc: A,
}

impl<F> Default for SymNmf<F, Heap>
where
    F: Float,
{
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<F> SymNmf<F, Heap>
where
    F: Float,
{
    pub fn new(config: Config<F>) -> Self {
        Self {
            config,
            alloc: Heap,
        }
    }
}

impl<F, A> SymNmf<F, A>
where
    F: Float + Send + Sync,
    A: MatrixAllocator<F>,
{
    pub fn with_allocator(config: Config<F>, alloc: A) -> Self {
        Self { config, alloc }
    }

    pub fn config(&self) -> &Config<F> {
        &self.config
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Run `op` on a pool of `Config::threads` workers
    fn install<T, OP>(&self, op: OP) -> Result<T>
    where
        T: Send,
        OP: FnOnce() -> Result<T> + Send,
    {
        self.config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()?;
        pool.install(op)
    }

    /// N x N similarity matrix of the N x d point set
    pub fn sym(&self, points: &Array2<F>) -> Result<Array2<F>> {
        self.install(|| Ok(similarity(points, &self.alloc)?.into_inner()))
    }

    /// N x N diagonal degree matrix of the N x d point set
    pub fn ddg(&self, points: &Array2<F>) -> Result<Array2<F>> {
        self.install(|| Ok(degree(points, &self.alloc)?.into_inner()))
    }

    /// N x N normalized similarity matrix of the N x d point set
    pub fn norm(&self, points: &Array2<F>) -> Result<Array2<F>> {
        self.install(|| Ok(normalize(points, &self.alloc)?.into_inner()))
    }

    /// Run the multiplicative update from `h0` (n x k) against `w` (n x n).
    ///
    /// Stops the first time the squared Frobenius delta between consecutive
    /// iterates drops below epsilon, or once the iteration budget is spent.
    /// A zero entry of `H * H^T * H` divides by zero and leaves NaN or infinite
    /// values in `h`; this is not reported as an error.
    pub fn factor(&self, w: &Array2<F>, h0: &Array2<F>) -> Result<Factorization<F>> {
        if w.nrows() != w.ncols() || h0.nrows() != w.nrows() {
            return Err(SymNmfError::DimensionMismatch {
                op: "factor",
                left: w.dim(),
                right: h0.dim(),
            });
        }
        self.install(|| self.iterate(w, h0))
    }

    fn iterate(&self, w: &Array2<F>, h0: &Array2<F>) -> Result<Factorization<F>> {
        let (n, k) = h0.dim();
        let mut h = Lease::acquire(&self.alloc, n, k)?;
        copy(&mut h, h0)?;
        let mut h_prev = Lease::acquire(&self.alloc, n, k)?;

        let mut iterations = 0;
        let mut converged = false;
        let mut delta = F::infinity();
        while iterations < self.config.max_iterations {
            copy(&mut h_prev, &h)?;
            self.update(w, &mut h)?;
            iterations += 1;
            delta = frobenius_delta(&h, &h_prev)?;
            trace!("iteration={} delta={:e}", iterations, delta.to_f64().unwrap_or(f64::NAN));
            if delta < self.config.epsilon {
                converged = true;
                break;
            }
        }
        debug!(
            "Converged={} iterations={} n={} k={}",
            converged, iterations, n, k
        );
        Ok(Factorization {
            h: h.into_inner(),
            iterations,
            converged,
            delta,
        })
    }

    /// One step: `H <- H * (1 - beta + beta * (W H) / (H H^T H))`, elementwise
    fn update(&self, w: &Array2<F>, h: &mut Array2<F>) -> Result<()> {
        let wh = multiply(w, h, &self.alloc)?;
        let ht = transpose(h, &self.alloc)?;
        let hht = multiply(h, &ht, &self.alloc)?;
        let hhth = multiply(&hht, h, &self.alloc)?;

        let beta = F::from(BETA).unwrap_or_else(|| F::one() / (F::one() + F::one()));
        let keep = F::one() - beta;
        Zip::from(h)
            .and(&*wh)
            .and(&*hhth)
            .par_for_each(|h, &num, &den| *h = *h * (keep + beta * (num / den)));
        Ok(())
    }
}

impl<F, A> SymNmf<F, A>
where
    F: Float + Send + Sync + SampleUniform,
    A: MatrixAllocator<F>,
{
    /// Normalize `points`, draw a seeded k-column initial factor and factor it
    pub fn fit(&self, points: &Array2<F>, k: usize) -> Result<Factorization<F>> {
        self.install(|| {
            let w = normalize(points, &self.alloc)?;
            let h0 = initialize_h(&w, k, self.config.seed)?;
            self.iterate(&w, &h0)
        })
    }
}
