#[macro_use]
extern crate clap;

use std::path::Path;
use std::process::exit;
use std::str::FromStr;

use log::{error, info, LevelFilter};

use symnmf::{compare, Config, SymNmf};

use crate::ops::{display_comparison, display_matrix, from_file};

mod ops;

/// The only message a failed run ever prints
const FAILURE: &str = "An Error Has Occurred";

fn fail() -> ! {
    println!("{}", FAILURE);
    exit(1);
}

fn parse_or_fail<T: FromStr>(value: Option<&str>, name: &str) -> Option<T> {
    value.map(|v| {
        v.parse::<T>().unwrap_or_else(|_| {
            error!("Unable to parse {}", name);
            fail()
        })
    })
}

fn main() {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("SYMNMF_LOG", "error"))
        .init();

    let matches = clap_app!(symnmf =>
        (version: "0.1.0")
        (about: "Parallelized Symmetric Non-negative Matrix Factorization clustering")
        (@arg GOAL: +required "One of sym, ddg, norm, symnmf, analysis")
        (@arg INPUT: +required "Path to comma-separated input file")
        (@arg CLUSTERS: -k --clusters +takes_value "Number of clusters, required for symnmf and analysis")
        (@arg MAX_ITER: -m --max_iter +takes_value "Maximum iterations, default=300")
        (@arg EPSILON: -e --epsilon +takes_value "Convergence threshold on the squared update delta, default=1e-4")
        (@arg THREADS: -t --threads +takes_value "Number of worker threads, default=all cores")
        (@arg SEED: -s --seed +takes_value "Seed for the initial factor, default=1234")
    )
    .get_matches_safe()
    .unwrap_or_else(|e| match e.kind {
        clap::ErrorKind::HelpDisplayed | clap::ErrorKind::VersionDisplayed => e.exit(),
        _ => {
            error!("{}", e.message);
            fail()
        }
    });

    let goal = matches.value_of("GOAL").unwrap_or_default();
    let input_file = matches.value_of("INPUT").unwrap_or_default();
    let clusters: Option<usize> = parse_or_fail(matches.value_of("CLUSTERS"), "clusters");

    let mut config = Config::<f64>::default();
    if let Some(max_iterations) = parse_or_fail(matches.value_of("MAX_ITER"), "max_iter") {
        config = config.max_iterations(max_iterations);
    }
    if let Some(epsilon) = parse_or_fail(matches.value_of("EPSILON"), "epsilon") {
        config = config.epsilon(epsilon);
    }
    if let Some(threads) = parse_or_fail(matches.value_of("THREADS"), "threads") {
        config = config.threads(threads);
    }
    if let Some(seed) = parse_or_fail(matches.value_of("SEED"), "seed") {
        config = config.seed(seed);
    }
    // Validate values
    if let Err(e) = config.validate() {
        error!("Improper parameter set: {}", e);
        fail();
    }
    let needs_clusters = match goal {
        "sym" | "ddg" | "norm" => false,
        "symnmf" | "analysis" => true,
        _ => {
            error!("Unknown goal {}", goal);
            fail()
        }
    };
    let k = match (needs_clusters, clusters) {
        (true, None) => {
            error!("Goal {} requires --clusters", goal);
            fail()
        }
        (_, k) => k.unwrap_or_default(),
    };

    let points = from_file(Path::new(input_file)).unwrap_or_else(|e| {
        error!("Unable to load {}: {}", input_file, e);
        fail()
    });
    info!(
        "Loaded {} points of dimension {}",
        points.nrows(),
        points.ncols()
    );

    let nmf = SymNmf::new(config);
    let written = match goal {
        "sym" => nmf.sym(&points).map(|m| display_matrix(&m)),
        "ddg" => nmf.ddg(&points).map(|m| display_matrix(&m)),
        "norm" => nmf.norm(&points).map(|m| display_matrix(&m)),
        "symnmf" => nmf.fit(&points, k).map(|f| {
            info!(
                "Converged={} iterations={}",
                f.converged(),
                f.iterations()
            );
            display_matrix(f.h())
        }),
        _ => compare(&nmf, &points, k).map(|scores| display_comparison(&scores)),
    };
    match written {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!("Unable to write results: {}", e);
            fail()
        }
        Err(e) => {
            error!("{}", e);
            fail()
        }
    }
}
