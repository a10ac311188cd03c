use std::io::Write;
use std::process::{Command, Output};

use tempfile::NamedTempFile;

fn write_points(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    rows.iter().for_each(|r| writeln!(file, "{}", r).unwrap());
    file
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_symnmf"))
        .args(args)
        .env_remove("SYMNMF_LOG")
        .output()
        .unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8(out.stdout.clone()).unwrap()
}

fn assert_failed(out: &Output) {
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(out), "An Error Has Occurred\n");
}

#[test]
fn sym_goal() {
    let file = write_points(&["0,0", "0,1", "5,5"]);
    let out = run(&["sym", file.path().to_str().unwrap()]);
    assert!(out.status.success());
    assert_eq!(
        stdout(&out),
        "0.0000,0.6065,0.0000\n0.6065,0.0000,0.0000\n0.0000,0.0000,0.0000\n"
    );
}

#[test]
fn ddg_goal() {
    let file = write_points(&["0,0", "0,1", "5,5"]);
    let out = run(&["ddg", file.path().to_str().unwrap()]);
    assert!(out.status.success());
    assert_eq!(
        stdout(&out),
        "0.6065,0.0000,0.0000\n0.0000,0.6065,0.0000\n0.0000,0.0000,0.0000\n"
    );
}

#[test]
fn norm_goal() {
    let file = write_points(&["0,0", "0,1", "5,5"]);
    let out = run(&["norm", file.path().to_str().unwrap(), "-t", "2"]);
    assert!(out.status.success());
    assert_eq!(
        stdout(&out),
        "0.0000,1.0000,0.0000\n1.0000,0.0000,0.0000\n0.0000,0.0000,0.0000\n"
    );
}

#[test]
fn single_point_norm_prints_nan() {
    let file = write_points(&["1,2"]);
    let out = run(&["norm", file.path().to_str().unwrap()]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text == "nan\n" || text == "-nan\n", "unexpected output {:?}", text);
}

#[test]
fn symnmf_goal() {
    let file = write_points(&["0,0", "0,1", "5,5", "5,4"]);
    let out = run(&["symnmf", file.path().to_str().unwrap(), "-k", "2"]);
    assert!(out.status.success());
    let text = stdout(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    for line in lines {
        let values: Vec<f64> = line.split(',').map(|v| v.parse().unwrap()).collect();
        assert_eq!(values.len(), 2);
        assert!(values.iter().all(|v| *v >= 0.));
    }
}

#[test]
fn symnmf_is_reproducible_for_a_seed() {
    let file = write_points(&["0,0", "0,1", "5,5", "5,4", "1,0"]);
    let path = file.path().to_str().unwrap();
    let first = run(&["symnmf", path, "-k", "2", "-s", "7", "-t", "1"]);
    let second = run(&["symnmf", path, "-k", "2", "-s", "7", "-t", "3"]);
    assert!(first.status.success());
    assert_eq!(stdout(&first), stdout(&second));
}

#[test]
fn analysis_goal() {
    let file = write_points(&["0,0", "0,1", "1,0", "9,9", "9,8", "8,9"]);
    let out = run(&["analysis", file.path().to_str().unwrap(), "-k", "2"]);
    assert!(out.status.success());
    let text = stdout(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("nmf: "));
    assert!(lines[1].starts_with("kmeans: "));
}

#[test]
fn unknown_goal_fails() {
    let file = write_points(&["0,0", "0,1"]);
    assert_failed(&run(&["cluster", file.path().to_str().unwrap()]));
}

#[test]
fn missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    assert_failed(&run(&["sym", missing.to_str().unwrap()]));
}

#[test]
fn wrong_argument_count_fails() {
    assert_failed(&run(&["sym"]));
}

#[test]
fn symnmf_without_clusters_fails() {
    let file = write_points(&["0,0", "0,1", "5,5"]);
    assert_failed(&run(&["symnmf", file.path().to_str().unwrap()]));
}

#[test]
fn too_many_clusters_fails() {
    let file = write_points(&["0,0", "0,1", "5,5"]);
    assert_failed(&run(&["symnmf", file.path().to_str().unwrap(), "-k", "3"]));
}

#[test]
fn malformed_input_fails() {
    let file = write_points(&["0,0", "0,a"]);
    assert_failed(&run(&["sym", file.path().to_str().unwrap()]));
}

#[test]
fn analysis_on_tight_points_scores_both() {
    let file = write_points(&["0,0", "0,0.1", "0.1,0", "0.1,0.1"]);
    let out = run(&["analysis", file.path().to_str().unwrap(), "-k", "2"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.starts_with("nmf: "));
    assert!(text.contains("\nkmeans: "));
}
