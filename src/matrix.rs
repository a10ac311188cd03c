use std::mem;
use std::ops::{Deref, DerefMut};

use ndarray::Array2;
use num_traits::Float;

use crate::error::{Result, SymNmfError};

/// Source of the dense matrices used by every routine in the crate.
///
/// Each matrix a routine needs is obtained through `acquire` and, unless it is
/// handed to the caller as a result, given back through `release` once the
/// routine no longer needs it. Failing to obtain storage is reported as an
/// error, never as an abort. Allocators are shared with worker threads.
pub trait MatrixAllocator<F>: Sync {
    /// Obtain a zero-filled `rows x cols` matrix
    fn acquire(&self, rows: usize, cols: usize) -> Result<Array2<F>>;

    /// Take back a matrix whose scope has ended
    fn release(&self, _matrix: Array2<F>) {}
}

/// Allocate on the global heap, reporting exhausted memory as `SymNmfError::Allocation`
#[derive(Debug, Default, Clone, Copy)]
pub struct Heap;

impl<F> MatrixAllocator<F> for Heap
where
    F: Float,
{
    fn acquire(&self, rows: usize, cols: usize) -> Result<Array2<F>> {
        let failed = || SymNmfError::Allocation { rows, cols };
        let len = rows.checked_mul(cols).ok_or_else(failed)?;
        let mut data: Vec<F> = Vec::new();
        data.try_reserve_exact(len).map_err(|_| failed())?;
        data.resize(len, F::zero());
        Array2::from_shape_vec((rows, cols), data).map_err(|_| failed())
    }
}

/// Scoped matrix: returned to its allocator when dropped, on every exit path.
///
/// `into_inner` hands the matrix over to the caller instead.
pub struct Lease<'a, F, A>
where
    F: Float,
    A: MatrixAllocator<F>,
{
    matrix: Array2<F>,
    alloc: &'a A,
    held: bool,
}

impl<'a, F, A> Lease<'a, F, A>
where
    F: Float,
    A: MatrixAllocator<F>,
{
    pub fn acquire(alloc: &'a A, rows: usize, cols: usize) -> Result<Self> {
        Ok(Self {
            matrix: alloc.acquire(rows, cols)?,
            alloc,
            held: true,
        })
    }

    /// Give up the lease and keep the matrix
    pub fn into_inner(mut self) -> Array2<F> {
        self.held = false;
        mem::replace(&mut self.matrix, Array2::zeros((0, 0)))
    }
}

impl<'a, F, A> Deref for Lease<'a, F, A>
where
    F: Float,
    A: MatrixAllocator<F>,
{
    type Target = Array2<F>;

    fn deref(&self) -> &Self::Target {
        &self.matrix
    }
}

impl<'a, F, A> DerefMut for Lease<'a, F, A>
where
    F: Float,
    A: MatrixAllocator<F>,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.matrix
    }
}

impl<'a, F, A> Drop for Lease<'a, F, A>
where
    F: Float,
    A: MatrixAllocator<F>,
{
    fn drop(&mut self) {
        if self.held {
            self.held = false;
            let matrix = mem::replace(&mut self.matrix, Array2::zeros((0, 0)));
            self.alloc.release(matrix);
        }
    }
}
