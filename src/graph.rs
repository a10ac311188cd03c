use ndarray::{Array2, ArrayView1, Axis, Zip};
use num_traits::Float;

use crate::error::{Result, SymNmfError};
use crate::matrix::{Lease, MatrixAllocator};

fn validate_points<F>(points: &Array2<F>) -> Result<()> {
    if points.nrows() == 0 || points.ncols() == 0 {
        return Err(SymNmfError::EmptyInput);
    }
    Ok(())
}

/// Sum in index order
fn row_sum<F: Float>(row: ArrayView1<F>) -> F {
    row.iter().fold(F::zero(), |acc, &v| acc + v)
}

fn squared_distance<F: Float>(a: ArrayView1<F>, b: ArrayView1<F>) -> F {
    a.iter().zip(b.iter()).fold(F::zero(), |acc, (&x, &y)| {
        let diff = x - y;
        acc + diff * diff
    })
}

/// Generate the N x N Gaussian similarity matrix of `points` (N x d):
/// `exp(-|row_i - row_j|^2 / 2)` off the diagonal, zero on it.
///
///     use ndarray::arr2;
///     use symnmf::{similarity, Heap};
///
///     let x = arr2(&[[0., 0.], [0., 1.]]);
///     let s = similarity(&x, &Heap).unwrap();
///     assert_eq!(s[[0, 0]], 0.);
///     assert!((s[[0, 1]] - (-0.5f64).exp()).abs() < 1e-12);
///     assert_eq!(s[[0, 1]], s[[1, 0]]);
pub fn similarity<'a, F, A>(points: &Array2<F>, alloc: &'a A) -> Result<Lease<'a, F, A>>
where
    F: Float + Send + Sync,
    A: MatrixAllocator<F>,
{
    validate_points(points)?;
    let n = points.nrows();
    let two = F::one() + F::one();
    let mut s = Lease::acquire(alloc, n, n)?;
    // Calculate values for upper half of matrix, copy over for remaining
    Zip::indexed(s.axis_iter_mut(Axis(0))).par_for_each(|i, mut row| {
        let p_i = points.row(i);
        (i + 1..n).for_each(|j| {
            row[j] = (-squared_distance(p_i, points.row(j)) / two).exp();
        });
    });
    (0..n).for_each(|i| {
        (0..i).for_each(|j| {
            s[[i, j]] = s[[j, i]];
        });
    });
    Ok(s)
}

/// Diagonal degree matrix: entry (i, i) is the i-th row sum of the similarity matrix
pub fn degree<'a, F, A>(points: &Array2<F>, alloc: &'a A) -> Result<Lease<'a, F, A>>
where
    F: Float + Send + Sync,
    A: MatrixAllocator<F>,
{
    let s = similarity(points, alloc)?;
    let n = s.nrows();
    let mut d = Lease::acquire(alloc, n, n)?;
    Zip::from(d.diag_mut())
        .and(s.axis_iter(Axis(0)))
        .par_for_each(|d, row| *d = row_sum(row));
    Ok(d)
}

/// Normalized similarity `D^-1/2 S D^-1/2`.
///
/// A point with zero degree (only possible for a single point) divides by zero
/// and yields NaN entries; this is not reported as an error.
pub fn normalize<'a, F, A>(points: &Array2<F>, alloc: &'a A) -> Result<Lease<'a, F, A>>
where
    F: Float + Send + Sync,
    A: MatrixAllocator<F>,
{
    let s = similarity(points, alloc)?;
    let n = s.nrows();
    let mut deg = Lease::acquire(alloc, n, 1)?;
    Zip::from(deg.column_mut(0))
        .and(s.axis_iter(Axis(0)))
        .par_for_each(|d, row| *d = row_sum(row));

    let mut w = Lease::acquire(alloc, n, n)?;
    let degrees = deg.column(0);
    Zip::indexed(&mut *w)
        .and(&*s)
        .par_for_each(|(i, j), w, &s| *w = s / (degrees[i] * degrees[j]).sqrt());
    Ok(w)
}
