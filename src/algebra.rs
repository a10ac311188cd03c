use ndarray::{Array2, Axis, Zip};
use num_traits::Float;

use crate::error::{Result, SymNmfError};
use crate::matrix::{Lease, MatrixAllocator};

fn mismatch<F>(op: &'static str, left: &Array2<F>, right: &Array2<F>) -> SymNmfError {
    SymNmfError::DimensionMismatch {
        op,
        left: left.dim(),
        right: right.dim(),
    }
}

/// Product of `a` (n x m) and `b` (m x p), computed row-by-row in parallel
pub fn multiply<'a, F, A>(a: &Array2<F>, b: &Array2<F>, alloc: &'a A) -> Result<Lease<'a, F, A>>
where
    F: Float + Send + Sync,
    A: MatrixAllocator<F>,
{
    if a.ncols() != b.nrows() {
        return Err(mismatch("multiply", a, b));
    }
    let mut c = Lease::acquire(alloc, a.nrows(), b.ncols())?;
    Zip::from(c.axis_iter_mut(Axis(0)))
        .and(a.axis_iter(Axis(0)))
        .par_for_each(|mut c_row, a_row| {
            c_row
                .iter_mut()
                .zip(b.axis_iter(Axis(1)))
                .for_each(|(c, b_col)| {
                    *c = a_row
                        .iter()
                        .zip(b_col.iter())
                        .fold(F::zero(), |acc, (&x, &y)| acc + x * y);
                });
        });
    Ok(c)
}

/// Fresh m x n copy of the n x m matrix `a`, transposed
pub fn transpose<'a, F, A>(a: &Array2<F>, alloc: &'a A) -> Result<Lease<'a, F, A>>
where
    F: Float + Send + Sync,
    A: MatrixAllocator<F>,
{
    let mut t = Lease::acquire(alloc, a.ncols(), a.nrows())?;
    Zip::from(&mut *t).and(a.t()).par_for_each(|t, &v| *t = v);
    Ok(t)
}

/// Sum of squared elementwise differences between `a` and `b`.
///
/// This is the squared Frobenius norm of `a - b`; no square root is taken.
pub fn frobenius_delta<F>(a: &Array2<F>, b: &Array2<F>) -> Result<F>
where
    F: Float,
{
    if a.dim() != b.dim() {
        return Err(mismatch("frobenius_delta", a, b));
    }
    Ok(Zip::from(a).and(b).fold(F::zero(), |acc, &x, &y| {
        let diff = x - y;
        acc + diff * diff
    }))
}

/// Overwrite `dest` with `src`; both must already have the same shape
pub fn copy<F>(dest: &mut Array2<F>, src: &Array2<F>) -> Result<()>
where
    F: Float,
{
    if dest.dim() != src.dim() {
        return Err(mismatch("copy", dest, src));
    }
    dest.assign(src);
    Ok(())
}
