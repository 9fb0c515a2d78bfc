use assert_cmd::Command;
use predicates::str::contains;
use std::fs;

fn write_scene(dir: &std::path::Path, mtl: &str) -> String {
    fs::write(dir.join("cube.mtl"), mtl).expect("write mtl");
    let obj = dir.join("cube.obj");
    fs::write(
        &obj,
        "mtllib cube.mtl\no Cube\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nusemtl Red\nf 1//1 2//1 3//1\n",
    )
    .expect("write obj");
    obj.to_str().expect("utf-8 path").to_owned()
}

#[test]
fn cli_prints_loaded_model_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let obj = write_scene(dir.path(), "newmtl Red\nKd 1.0 0.0 0.0\n");

    let mut cmd = Command::cargo_bin("app").expect("binary exists");
    cmd.arg("--gpu-backend=cpu").arg(format!("--model={obj}"));
    cmd.assert()
        .success()
        .stdout(contains("1 mesh(es), 1 triangle(s)"))
        .stdout(contains(" - Cube: 1 triangle(s), material Red"));
}

#[test]
fn cli_reports_which_asset_failed_and_why() {
    let dir = tempfile::tempdir().expect("tempdir");
    let obj = write_scene(dir.path(), "newmtl Blue\nKd 0.0 0.0 1.0\n");

    let mut cmd = Command::cargo_bin("app").expect("binary exists");
    cmd.arg("--gpu-backend=cpu").arg(format!("--model={obj}"));
    cmd.assert()
        .failure()
        .stderr(contains("loading model"))
        .stderr(contains("unknown material name `Red`"));
}

#[test]
fn cli_reloads_paths_read_from_stdin() {
    let dir = tempfile::tempdir().expect("tempdir");
    let png = dir.path().join("tile.png");
    image::RgbaImage::new(2, 2).save(&png).expect("write png");
    let png = png.to_str().expect("utf-8 path").to_owned();

    let mut cmd = Command::cargo_bin("app").expect("binary exists");
    cmd.arg("--gpu-backend=cpu")
        .arg("--reload-backoff-ms=0")
        .arg(format!("--texture={png}"))
        .arg("--watch-stdin")
        .write_stdin(format!("{png}\nnot/tracked.png\n"));
    cmd.assert()
        .success()
        .stdout(contains("Texture"))
        .stdout(contains("Reloaded 1 asset(s)"));
}
