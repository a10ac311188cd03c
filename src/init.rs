use ndarray::{Array1, Array2, ArrayView1, Axis, Zip};
use ndarray_rand::RandomExt;
use num_traits::Float;
use rand::distributions::uniform::SampleUniform;
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Result, SymNmfError};

/// Draw the initial n x k factor for a normalized similarity matrix `w` (n x n).
///
/// Entries are uniform over `[0, 2 * sqrt(mean(w) / k)]`, seeded so that runs repeat.
pub fn initialize_h<F>(w: &Array2<F>, k: usize, seed: u64) -> Result<Array2<F>>
where
    F: Float + SampleUniform,
{
    let n = w.nrows();
    if k == 0 || k >= n {
        return Err(SymNmfError::InvalidClusterCount { k, n });
    }
    let count = F::from(w.len()).ok_or(SymNmfError::NonFiniteMean)?;
    let mean = w.iter().fold(F::zero(), |acc, &v| acc + v) / count;
    let k_f = F::from(k).ok_or(SymNmfError::NonFiniteMean)?;
    let upper = (F::one() + F::one()) * (mean / k_f).sqrt();
    if !upper.is_finite() {
        return Err(SymNmfError::NonFiniteMean);
    }
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(Array2::random_using(
        (n, k),
        Uniform::new_inclusive(F::zero(), upper),
        &mut rng,
    ))
}

fn argmax<F: Float>(row: ArrayView1<F>) -> usize {
    let mut max_pos = 0;
    let mut max = row[0];
    row.iter().enumerate().for_each(|(idx, val)| {
        if *val > max {
            max = *val;
            max_pos = idx;
        }
    });
    max_pos
}

/// Hard cluster label of each point: the column holding the largest value of its row in `h`
pub fn assign_clusters<F>(h: &Array2<F>) -> Array1<usize>
where
    F: Float + Send + Sync,
{
    if h.ncols() == 0 {
        return Array1::zeros(h.nrows());
    }
    Zip::from(h.axis_iter(Axis(0))).par_map_collect(|row| argmax(row))
}
