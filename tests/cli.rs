use assert_cmd::prelude::*;
use predicates::str::contains;
use std::process::Command;

#[test]
fn describe_prints_sphere_sketch_summary() {
    let mut cmd = Command::cargo_bin("sketch-runtime").expect("binary exists");
    cmd.arg("cube-shader").arg("--describe");
    cmd.assert()
        .success()
        .stdout(contains("sketch: cube-shader"))
        .stdout(contains("camera: fov 50.0 deg"))
        .stdout(contains("meshes: 1"))
        .stdout(contains("sphere: 561 vertices, triangles, shader material"));
}

#[test]
fn describe_prints_geometry_sketch_summary() {
    let mut cmd = Command::cargo_bin("sketch-runtime").expect("binary exists");
    cmd.arg("geometry").arg("--describe");
    cmd.assert()
        .success()
        .stdout(contains("sketch: geometry"))
        .stdout(contains("camera: fov 25.0 deg"))
        .stdout(contains("triangle: 3 vertices, triangles, flat material"))
        .stdout(contains("grid: 40 vertices, lines, flat material"));
}

#[test]
fn unknown_sketch_is_rejected() {
    let mut cmd = Command::cargo_bin("sketch-runtime").expect("binary exists");
    cmd.arg("does-not-exist").arg("--describe");
    cmd.assert()
        .failure()
        .stderr(contains("unknown sketch"))
        .stderr(contains("cube-shader, geometry"));
}

#[test]
fn missing_sketch_prints_usage() {
    let mut cmd = Command::cargo_bin("sketch-runtime").expect("binary exists");
    cmd.assert().failure().stderr(contains("Usage:"));
}
