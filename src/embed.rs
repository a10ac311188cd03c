//! Entry points for foreign callers that exchange matrices as nested lists.
//!
//! Every function collapses failures (ragged or empty input, dimension
//! mismatch, allocation failure) into `None`; callers must check for it.
use log::debug;
use ndarray::{Array2, Axis};

use crate::config::Config;
use crate::error::{Result, SymNmfError};
use crate::symnmf::SymNmf;

pub type Rows = Vec<Vec<f64>>;

fn to_array(rows: &[Vec<f64>], expected_cols: Option<usize>) -> Result<Array2<f64>> {
    let cols = match (expected_cols, rows.first()) {
        (Some(c), _) => c,
        (None, Some(first)) => first.len(),
        (None, None) => return Err(SymNmfError::EmptyInput),
    };
    let mut out = Array2::<f64>::zeros((rows.len(), cols));
    for (mut dest, row) in out.axis_iter_mut(Axis(0)).zip(rows.iter()) {
        if row.len() != cols {
            return Err(SymNmfError::DimensionMismatch {
                op: "rows",
                left: (rows.len(), cols),
                right: (1, row.len()),
            });
        }
        dest.iter_mut().zip(row.iter()).for_each(|(d, v)| *d = *v);
    }
    Ok(out)
}

fn to_rows(array: &Array2<f64>) -> Rows {
    array.axis_iter(Axis(0)).map(|row| row.to_vec()).collect()
}

fn facade() -> SymNmf<f64> {
    SymNmf::new(Config::default())
}

fn collapse(result: Result<Array2<f64>>) -> Option<Rows> {
    match result {
        Ok(array) => Some(to_rows(&array)),
        Err(e) => {
            debug!("Returning no result: {}", e);
            None
        }
    }
}

/// Similarity matrix of the given points
pub fn sym(points: &[Vec<f64>]) -> Option<Rows> {
    collapse(to_array(points, None).and_then(|x| facade().sym(&x)))
}

/// Diagonal degree matrix of the given points
pub fn ddg(points: &[Vec<f64>]) -> Option<Rows> {
    collapse(to_array(points, None).and_then(|x| facade().ddg(&x)))
}

/// Normalized similarity matrix of the given points
pub fn norm(points: &[Vec<f64>]) -> Option<Rows> {
    collapse(to_array(points, None).and_then(|x| facade().norm(&x)))
}

/// Factor `w` (n x n) starting from `h` (n x k) with the default settings
pub fn symnmf(w: &[Vec<f64>], h: &[Vec<f64>], n: usize, k: usize) -> Option<Rows> {
    let run = || -> Result<Array2<f64>> {
        if w.len() != n || h.len() != n {
            return Err(SymNmfError::DimensionMismatch {
                op: "symnmf",
                left: (w.len(), n),
                right: (h.len(), k),
            });
        }
        let w = to_array(w, Some(n))?;
        let h = to_array(h, Some(k))?;
        Ok(facade().factor(&w, &h)?.into_h())
    };
    collapse(run())
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use crate::embed::{ddg, norm, sym, symnmf};

    fn points() -> Vec<Vec<f64>> {
        vec![vec![0., 0.], vec![0., 1.], vec![5., 5.]]
    }

    #[test]
    fn graph_entry_points() {
        let s = sym(&points()).unwrap();
        assert_eq!(s.len(), 3);
        assert!(s.iter().all(|row| row.len() == 3));
        assert_abs_diff_eq!(s[0][1], (-0.5f64).exp(), epsilon = 1e-12);

        let d = ddg(&points()).unwrap();
        assert_abs_diff_eq!(d[0][0], s[0].iter().sum::<f64>(), epsilon = 1e-12);
        assert_eq!(d[0][1], 0.);

        let w = norm(&points()).unwrap();
        assert_eq!(w[1][1], 0.);
    }

    #[test]
    fn factor_entry_point() {
        let w = norm(&points()).unwrap();
        let h = vec![vec![0.4], vec![0.6], vec![0.5]];
        let result = symnmf(&w, &h, 3, 1).unwrap();
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|row| row.len() == 1 && row[0] >= 0.));
    }

    #[test]
    fn sentinel_on_bad_input() {
        assert!(sym(&[]).is_none());
        assert!(ddg(&[vec![1., 2.], vec![3.]]).is_none());
        assert!(norm(&[vec![]]).is_none());
        let w = norm(&points()).unwrap();
        assert!(symnmf(&w, &[vec![0.5], vec![0.5]], 3, 1).is_none());
        assert!(symnmf(&w, &[vec![0.5], vec![0.5], vec![0.5, 0.1]], 3, 1).is_none());
    }
}
