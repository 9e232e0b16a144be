use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn imagegen() -> Command {
    Command::cargo_bin("fractox-imagegen").unwrap()
}

fn open_luma(path: &Path) -> image::GrayImage {
    image::open(path).unwrap().into_luma8()
}

#[test]
fn renders_png_with_requested_size() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("mandelbrot.png");
    imagegen()
        .args(["mandelbrot", "--n_rows", "40", "--n_columns", "60", "--max_iter", "50"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Elapsed time"))
        .stdout(predicate::str::contains("Saving image to"));
    let img = open_luma(&out);
    assert_eq!(img.dimensions(), (60, 40));
    // the corners escape on the first step
    assert_eq!(img.get_pixel(0, 0).0, [1]);
    assert_eq!(img.get_pixel(59, 39).0, [1]);
}

#[test]
fn thread_count_does_not_change_image() {
    let dir = tempfile::tempdir().unwrap();
    let one = dir.path().join("one.png");
    let four = dir.path().join("four.png");
    for (threads, path) in [("1", &one), ("4", &four)] {
        imagegen()
            .args(["burning_ship", "--n_rows", "37", "--n_columns", "41"])
            .args(["--n_threads", threads, "--strategy", "batched"])
            .arg(path)
            .assert()
            .success();
    }
    assert_eq!(open_luma(&one), open_luma(&four));
}

#[test]
fn julia_accepts_custom_constant() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("julia.png");
    imagegen()
        .args(["julia", "--julia_c=-0.7269,0.1889", "--n_rows", "20", "--n_columns", "20"])
        .args(["--invert", "--stretch"])
        .arg(&out)
        .assert()
        .success();
    assert_eq!(open_luma(&out).dimensions(), (20, 20));
}

#[test]
fn rejects_unknown_fractal() {
    let dir = tempfile::tempdir().unwrap();
    imagegen()
        .arg("newton")
        .arg(dir.path().join("out.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown fractal"));
}

#[test]
fn rejects_oversized_budget() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.png");
    imagegen()
        .args(["mandelbrot", "--max_iter", "300", "--n_rows", "10", "--n_columns", "10"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_iter"));
    assert!(!out.exists());
}

#[test]
fn rejects_degenerate_grid() {
    let dir = tempfile::tempdir().unwrap();
    imagegen()
        .args(["julia", "--n_rows", "1", "--n_columns", "10"])
        .arg(dir.path().join("out.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("degenerate"));
}

#[test]
fn rejects_zero_threads() {
    let dir = tempfile::tempdir().unwrap();
    imagegen()
        .args(["mandelbrot", "--n_threads", "0", "--n_rows", "10", "--n_columns", "10"])
        .arg(dir.path().join("out.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("n_threads"));
}
