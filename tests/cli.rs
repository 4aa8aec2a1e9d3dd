use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use once_cell::sync::Lazy;
use predicates::str::contains;
use tempfile::TempDir;

static SETTINGS_XML: Lazy<String> = Lazy::new(|| {
    r#"<demo>
  <cube>
    <scale>1.5</scale>
    <color>64 160 255</color>
    <rotation>0 0 0</rotation>
    <spin>60</spin>
  </cube>
  <camera>
    <depth>7</depth>
    <fov>50</fov>
  </camera>
  <shaders>
    <vertex>demo.vert.wgsl</vertex>
    <fragment>demo.frag.wgsl</fragment>
  </shaders>
</demo>
"#
    .to_string()
});

const VERTEX_SHADER: &str = r#"
struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) shade: vec3<f32>,
}

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coord: vec2<f32>,
) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(position, 1.0);
    out.shade = normal * tex_coord.x;
    return out;
}
"#;

const FRAGMENT_SHADER: &str = r#"
@fragment
fn fs_main(@location(0) shade: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(shade, 1.0);
}
"#;

fn write_assets() -> TempDir {
    let dir = tempfile::tempdir().expect("temp assets dir");
    fs::write(dir.path().join("settings.xml"), SETTINGS_XML.as_str()).expect("write settings");
    fs::write(dir.path().join("demo.vert.wgsl"), VERTEX_SHADER).expect("write vertex");
    fs::write(dir.path().join("demo.frag.wgsl"), FRAGMENT_SHADER).expect("write fragment");
    dir
}

#[test]
fn cli_summarizes_headless_run() {
    let assets = write_assets();
    let mut cmd = Command::cargo_bin("spincube").expect("binary exists");
    cmd.arg(assets.path().join("settings.xml"))
        .arg("--assets")
        .arg(assets.path())
        .arg("--summary-only")
        .arg("--frames")
        .arg("90");
    cmd.assert()
        .success()
        .stdout(contains("Loaded shaders from directory"))
        .stdout(contains("Program entry points: vs_main / fs_main"))
        .stdout(contains("Cube mesh: 24 vertices, 36 indices"))
        .stdout(contains("Simulated 90 frames"))
        .stdout(contains("Final model-view translation: (0.00, 0.00, -7.00)"));
}

#[test]
fn cli_runs_with_builtin_bundle() {
    let mut cmd = Command::cargo_bin("spincube").expect("binary exists");
    cmd.arg("--summary-only").arg("--frames").arg("0");
    cmd.assert()
        .success()
        .stdout(contains("Loaded shaders from bundle builtin"))
        .stdout(contains("Simulated 0 frames"));
}

#[test]
fn cli_reports_missing_shader_resource() {
    let assets = write_assets();
    fs::remove_file(assets.path().join("demo.frag.wgsl")).expect("drop fragment");

    let mut cmd = Command::cargo_bin("spincube").expect("binary exists");
    cmd.arg(assets.path().join("settings.xml"))
        .arg("--assets")
        .arg(assets.path())
        .arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("resource not found: demo.frag.wgsl"));
}
