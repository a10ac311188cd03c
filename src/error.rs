use thiserror::Error;

pub type Result<T> = std::result::Result<T, SymNmfError>;

/// An error when a hyperparameter is set to an unusable value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("epsilon must be finite and greater than 0")]
    Epsilon,
    #[error("threads cannot be 0")]
    Threads,
}

/// An error raised by any of the matrix routines
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SymNmfError {
    /// Storage for a matrix could not be obtained
    #[error("unable to allocate a {rows}x{cols} matrix")]
    Allocation { rows: usize, cols: usize },
    #[error("dimension mismatch in {op}: {left:?} and {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
    #[error("point set must contain at least one row and one column")]
    EmptyInput,
    #[error("cluster count {k} must be at least 1 and below the number of points {n}")]
    InvalidClusterCount { k: usize, n: usize },
    #[error("cannot draw an initial factor from a matrix with non-finite mean")]
    NonFiniteMean,
    #[error("at least two distinct cluster labels are needed")]
    SingleCluster,
    #[error("Invalid hyperparameter: {0}")]
    InvalidParams(#[from] ParamsError),
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
