use std::fs::File;
use std::io::{self, stdout, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use ndarray::{Array2, Axis};
use thiserror::Error;

use symnmf::Comparison;

#[derive(Error, Debug)]
pub(crate) enum FileParseError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Error parsing file at line {0}")]
    Value(usize),
    #[error("Line {0} does not have the same number of values as the first line")]
    Ragged(usize),
    #[error("Data file is empty")]
    Empty,
}

/// Reads in a file formatted as (comma separated):
///     val1,val2,val3
///     val1,val2,val3
///
/// One point per line, dimension taken from the first line
/// Blank lines are skipped
pub(crate) fn from_file(p: &Path) -> Result<Array2<f64>, FileParseError> {
    let reader = BufReader::new(File::open(p)?);
    let mut data: Vec<Vec<f64>> = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut entry = Vec::new();
        for s in line.split(',') {
            match s.trim().parse::<f64>() {
                Ok(v) => entry.push(v),
                Err(_) => return Err(FileParseError::Value(idx + 1)),
            }
        }
        if let Some(first) = data.first() {
            if first.len() != entry.len() {
                return Err(FileParseError::Ragged(idx + 1));
            }
        }
        data.push(entry);
    }
    if data.is_empty() {
        return Err(FileParseError::Empty);
    }
    let mut out = Array2::<f64>::zeros((data.len(), data[0].len()));
    out.axis_iter_mut(Axis(0))
        .enumerate()
        .for_each(|(idx1, mut row)| {
            row.iter_mut().enumerate().for_each(|(idx2, col)| {
                *col = data[idx1][idx2];
            });
        });
    Ok(out)
}

/// `%.4f` as C prints it: NaN is `nan`, or `-nan` with the sign bit set
fn write_value<W: Write>(writer: &mut W, v: f64) -> io::Result<()> {
    match (v.is_nan(), v.is_sign_negative()) {
        (true, true) => writer.write_all(b"-nan"),
        (true, false) => writer.write_all(b"nan"),
        _ => write!(writer, "{:.4}", v),
    }
}

fn write_matrix<W: Write>(writer: &mut W, matrix: &Array2<f64>) -> io::Result<()> {
    for row in matrix.axis_iter(Axis(0)) {
        for (idx, v) in row.iter().enumerate() {
            if idx > 0 {
                writer.write_all(b",")?;
            }
            write_value(writer, *v)?;
        }
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// One row per line, values to 4 decimal places, comma separated
pub(crate) fn display_matrix(matrix: &Array2<f64>) -> io::Result<()> {
    let mut writer = BufWriter::new(stdout());
    write_matrix(&mut writer, matrix)?;
    writer.flush()
}

pub(crate) fn display_comparison(scores: &Comparison<f64>) -> io::Result<()> {
    let mut writer = BufWriter::new(stdout());
    writeln!(writer, "nmf: {:.4}", scores.nmf)?;
    writeln!(writer, "kmeans: {:.4}", scores.kmeans)?;
    writer.flush()
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use ndarray::arr2;
    use tempfile::NamedTempFile;

    use crate::ops::{from_file, write_matrix, FileParseError};

    #[test]
    fn valid_load() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1.0,5.0,1.0").unwrap();
        writeln!(file, "2.0,4.0,2.0").unwrap();
        writeln!(file, "-3.5,3.0,3e1").unwrap();
        writeln!(file).unwrap();
        let data = from_file(file.path()).unwrap();
        let expected = arr2(&[[1., 5., 1.], [2., 4., 2.], [-3.5, 3., 30.]]);
        assert_eq!(data, expected);
    }

    #[test]
    fn single_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1").unwrap();
        writeln!(file, "2").unwrap();
        let data = from_file(file.path()).unwrap();
        assert_eq!(data.dim(), (2, 1));
    }

    #[test]
    fn invalid_load_empty_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(from_file(file.path()), Err(FileParseError::Empty)));
    }

    #[test]
    fn invalid_load_mismatched_data() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1.0,5.0,1.0").unwrap();
        writeln!(file, "2.0,4.0").unwrap();
        assert!(matches!(from_file(file.path()), Err(FileParseError::Ragged(2))));
    }

    #[test]
    fn invalid_load_invalid_data() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1.0,5.0,1.0").unwrap();
        writeln!(file, "a,b,c").unwrap();
        assert!(matches!(from_file(file.path()), Err(FileParseError::Value(2))));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        assert!(matches!(from_file(&missing), Err(FileParseError::Io(_))));
    }

    #[test]
    fn matrix_format() {
        let mut out = Vec::new();
        write_matrix(&mut out, &arr2(&[[0., 0.60653066], [1. / 3., 12.]])).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "0.0000,0.6065\n0.3333,12.0000\n"
        );
    }

    #[test]
    fn non_finite_format() {
        let nan = f64::from_bits(0x7ff8_0000_0000_0000);
        let neg_nan = f64::from_bits(0xfff8_0000_0000_0000);
        let mut out = Vec::new();
        write_matrix(
            &mut out,
            &arr2(&[[nan, neg_nan], [f64::INFINITY, f64::NEG_INFINITY]]),
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "nan,-nan\ninf,-inf\n");
    }
}
