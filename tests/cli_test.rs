//! Tests that run the `blitpix` binary.

mod common;

use std::process::{Command, Output};

use blit_engine::CodecVariant;
use common::fixtures;

fn blitpix(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_blitpix"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "blitpix failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_status_without_command() {
    let output = blitpix(&[]);
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("blitpix v"));
    assert!(stdout.contains("convert"));
}

#[test]
fn test_convert_picks_format_from_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixtures::write_png(dir.path(), "in.png", &fixtures::checker(8, 6));
    let input = input.to_str().unwrap();

    let nfp = dir.path().join("out.nfp");
    assert_success(&blitpix(&["convert", input, "-o", nfp.to_str().unwrap()]));
    let text = std::fs::read_to_string(&nfp).unwrap();
    common::assert_paint_grid(&text, 8, 6);

    let table = dir.path().join("out.txt");
    assert_success(&blitpix(&["convert", input, "-o", table.to_str().unwrap()]));
    common::assert_table_rows(&std::fs::read(&table).unwrap(), 2);
}

#[test]
fn test_convert_flags_override_config() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixtures::write_png(dir.path(), "in.png", &fixtures::gradient(12, 6));
    let config = fixtures::write_config(dir.path(), "table:\n  escape: true\n");
    let out = dir.path().join("out.bimg");
    let preview = dir.path().join("preview.png");

    assert_success(&blitpix(&[
        "convert",
        input.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--binary",
        "--compact",
        "--colors",
        "4",
        "--reducer",
        "octree",
        "--dither",
        "ordered",
        "--preview",
        preview.to_str().unwrap(),
    ]));

    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.iter().any(|&b| b >= 128), "--binary writes raw glyph bytes");
    assert!(!bytes.contains(&b'\n'));
    common::assert_png(&std::fs::read(&preview).unwrap());
}

#[test]
fn test_video_command() {
    let dir = tempfile::tempdir().unwrap();
    let base = fixtures::checker(12, 6);
    let a = fixtures::write_png(dir.path(), "a.png", &base);
    let b = fixtures::write_png(dir.path(), "b.png", &fixtures::with_square(&base, 0, 0, 6));
    let out = dir.path().join("clip.bpv");

    assert_success(&blitpix(&[
        "video",
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--codec",
        "ans",
    ]));
    common::assert_video_header(&std::fs::read(&out).unwrap(), CodecVariant::Ans, (6, 2), 2);
}

#[test]
fn test_errors_exit_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.bimg");
    let missing = dir.path().join("missing.png");

    let output = blitpix(&["convert", missing.to_str().unwrap(), "-o", out.to_str().unwrap()]);
    assert!(!output.status.success());

    let input = fixtures::write_png(dir.path(), "in.png", &fixtures::checker(4, 3));
    let output = blitpix(&[
        "convert",
        input.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--reducer",
        "popularity",
    ]);
    assert!(!output.status.success());
    assert!(!out.exists());
}
