//! Baseline comparison between symNMF and K-means clusterings, scored by silhouette.
use std::collections::HashMap;

use log::debug;
use ndarray::{s, Array1, Array2, ArrayView1, Axis, Zip};
use num_traits::Float;
use rand::distributions::uniform::SampleUniform;

use crate::error::{Result, SymNmfError};
use crate::init::assign_clusters;
use crate::matrix::MatrixAllocator;
use crate::symnmf::SymNmf;

pub const DEFAULT_KMEANS_ITERATIONS: usize = 200;
pub const DEFAULT_KMEANS_TOLERANCE: f64 = 1e-3;

fn distance<F: Float>(a: ArrayView1<F>, b: ArrayView1<F>) -> F {
    a.iter()
        .zip(b.iter())
        .fold(F::zero(), |acc, (&x, &y)| {
            let diff = x - y;
            acc + diff * diff
        })
        .sqrt()
}

/// Fitted K-means model
#[derive(Debug, Clone)]
pub struct KMeans<F> {
    centroids: Array2<F>,
    labels: Array1<usize>,
    iterations: usize,
}

impl<F> KMeans<F> {
    /// k x d matrix, one centroid per row
    pub fn centroids(&self) -> &Array2<F> {
        &self.centroids
    }

    /// Index of the nearest centroid for each point
    pub fn labels(&self) -> &Array1<usize> {
        &self.labels
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

fn nearest<F: Float>(point: ArrayView1<F>, centroids: &Array2<F>) -> usize {
    let mut best = 0;
    let mut best_dist = F::infinity();
    centroids
        .axis_iter(Axis(0))
        .enumerate()
        .for_each(|(idx, centroid)| {
            let dist = distance(point, centroid);
            if dist < best_dist {
                best_dist = dist;
                best = idx;
            }
        });
    best
}

fn assign<F: Float + Send + Sync>(points: &Array2<F>, centroids: &Array2<F>) -> Array1<usize> {
    Zip::from(points.axis_iter(Axis(0))).par_map_collect(|p| nearest(p, centroids))
}

/// Mean of each cluster's members; a cluster left empty keeps its previous centroid
fn update_centroids<F: Float>(
    points: &Array2<F>,
    labels: &Array1<usize>,
    previous: &Array2<F>,
) -> Array2<F> {
    let mut sums = Array2::<F>::zeros(previous.dim());
    let mut counts = vec![0usize; previous.nrows()];
    Zip::from(points.axis_iter(Axis(0)))
        .and(labels)
        .for_each(|p, &label| {
            let mut row = sums.row_mut(label);
            row.zip_mut_with(&p, |s, &v| *s = *s + v);
            counts[label] += 1;
        });
    sums.axis_iter_mut(Axis(0))
        .zip(previous.axis_iter(Axis(0)))
        .zip(counts.iter())
        .for_each(|((mut sum, prev), &count)| match F::from(count) {
            Some(c) if count > 0 => sum.mapv_inplace(|v| v / c),
            _ => sum.assign(&prev),
        });
    sums
}

/// Lloyd's K-means seeded with the first `k` points.
///
/// Stops once every centroid moved less than `tolerance` in one step, or after
/// `max_iterations` steps.
pub fn kmeans<F>(
    points: &Array2<F>,
    k: usize,
    max_iterations: usize,
    tolerance: F,
) -> Result<KMeans<F>>
where
    F: Float + Send + Sync,
{
    let n = points.nrows();
    if n == 0 || points.ncols() == 0 {
        return Err(SymNmfError::EmptyInput);
    }
    if k == 0 || k > n {
        return Err(SymNmfError::InvalidClusterCount { k, n });
    }
    let mut centroids = points.slice(s![..k, ..]).to_owned();
    let mut iterations = 0;
    while iterations < max_iterations {
        let labels = assign(points, &centroids);
        let updated = update_centroids(points, &labels, &centroids);
        iterations += 1;
        let settled = updated
            .axis_iter(Axis(0))
            .zip(centroids.axis_iter(Axis(0)))
            .all(|(a, b)| distance(a, b) < tolerance);
        centroids = updated;
        if settled {
            break;
        }
    }
    debug!("K-means finished after {} iterations", iterations);
    let labels = assign(points, &centroids);
    Ok(KMeans {
        centroids,
        labels,
        iterations,
    })
}

/// Mean silhouette coefficient of a labelled point set under Euclidean distance.
///
/// For each point, `a` is the mean distance to the other members of its
/// cluster and `b` the smallest mean distance to the members of another
/// cluster; the point scores `(b - a) / max(a, b)`. A point alone in its
/// cluster scores 0.
pub fn silhouette_score<F>(points: &Array2<F>, labels: &Array1<usize>) -> Result<F>
where
    F: Float + Send + Sync,
{
    let n = points.nrows();
    if labels.len() != n {
        return Err(SymNmfError::DimensionMismatch {
            op: "silhouette_score",
            left: points.dim(),
            right: (labels.len(), 1),
        });
    }
    // Dense slot per distinct label
    let mut slots: HashMap<usize, usize> = HashMap::new();
    labels.iter().for_each(|label| {
        let next = slots.len();
        slots.entry(*label).or_insert(next);
    });
    if slots.len() < 2 {
        return Err(SymNmfError::SingleCluster);
    }
    let slot_of: Vec<usize> = labels.iter().map(|label| slots[label]).collect();
    let mut sizes = vec![0usize; slots.len()];
    slot_of.iter().for_each(|&slot| sizes[slot] += 1);

    let scores = Zip::indexed(points.axis_iter(Axis(0))).par_map_collect(|i, sample| {
        let own = slot_of[i];
        if sizes[own] == 1 {
            return F::zero();
        }
        let mut totals = vec![F::zero(); sizes.len()];
        points
            .axis_iter(Axis(0))
            .zip(slot_of.iter())
            .for_each(|(other, &slot)| totals[slot] = totals[slot] + distance(sample, other));
        let mean = |slot: usize, count: usize| totals[slot] / F::from(count).unwrap_or_else(F::one);
        let a = mean(own, sizes[own] - 1);
        let b = (0..sizes.len())
            .filter(|&slot| slot != own)
            .map(|slot| mean(slot, sizes[slot]))
            .fold(F::infinity(), F::min);
        let denom = a.max(b);
        if denom > F::zero() {
            (b - a) / denom
        } else {
            F::zero()
        }
    });
    let total = scores.iter().fold(F::zero(), |acc, &v| acc + v);
    Ok(total / F::from(n).unwrap_or_else(F::one))
}

/// Row-argmax labels of `h`, split so that at least two clusters exist.
///
/// When every row picks the same column, the row holding the largest
/// runner-up value moves to that runner-up column.
pub fn nmf_labels<F>(h: &Array2<F>) -> Array1<usize>
where
    F: Float + Send + Sync,
{
    let mut labels = assign_clusters(h);
    if h.nrows() < 2 || h.ncols() < 2 {
        return labels;
    }
    let shared = labels[0];
    if labels.iter().any(|&label| label != shared) {
        return labels;
    }
    let mut moved: Option<(usize, usize, F)> = None;
    h.axis_iter(Axis(0)).enumerate().for_each(|(idx, row)| {
        let runner_up = row
            .iter()
            .enumerate()
            .filter(|(col, _)| *col != shared)
            .fold(None, |best: Option<(usize, F)>, (col, &v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((col, v)),
            });
        if let Some((col, v)) = runner_up {
            if moved.map_or(true, |(_, _, b)| v > b) {
                moved = Some((idx, col, v));
            }
        }
    });
    if let Some((idx, col, _)) = moved {
        debug!("All points share cluster {}, moving point {} to {}", shared, idx, col);
        labels[idx] = col;
    }
    labels
}

/// Silhouette scores of the two clusterings of the same points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison<F> {
    pub nmf: F,
    pub kmeans: F,
}

/// Cluster `points` into `k` groups with symNMF (see `nmf_labels`) and with
/// K-means, and score both with the silhouette coefficient
pub fn compare<F, A>(nmf: &SymNmf<F, A>, points: &Array2<F>, k: usize) -> Result<Comparison<F>>
where
    F: Float + Send + Sync + SampleUniform,
    A: MatrixAllocator<F>,
{
    let factorization = nmf.fit(points, k)?;
    let labels = nmf_labels(factorization.h());
    let tolerance = F::from(DEFAULT_KMEANS_TOLERANCE).unwrap_or_else(F::epsilon);
    let model = kmeans(points, k, DEFAULT_KMEANS_ITERATIONS, tolerance)?;
    Ok(Comparison {
        nmf: silhouette_score(points, &labels)?,
        kmeans: silhouette_score(points, model.labels())?,
    })
}
