pub use algebra::{copy, frobenius_delta, multiply, transpose};
pub use analysis::{compare, kmeans, nmf_labels, silhouette_score, Comparison, KMeans};
pub use config::{Config, BETA};
pub use error::{ParamsError, Result, SymNmfError};
pub use graph::{degree, normalize, similarity};
pub use init::{assign_clusters, initialize_h};
pub use matrix::{Heap, Lease, MatrixAllocator};
pub use symnmf::{Factorization, SymNmf};

pub mod algebra;
pub mod analysis;
mod config;
pub mod embed;
mod error;
mod graph;
mod init;
mod matrix;
mod symnmf;
