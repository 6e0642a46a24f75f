use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_quillmark"))
}

fn run_in(dir: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(bin_path())
        .current_dir(dir)
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn quillmark");
    {
        let mut pipe = child.stdin.take().expect("stdin");
        if let Some(text) = stdin {
            pipe.write_all(text.as_bytes()).expect("write stdin");
        }
    }
    child.wait_with_output().expect("wait")
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn render_wraps_html_with_stylesheet() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "doc.md", "# Hi\n\nParagraph.\n");
    let output = run_in(dir.path(), &["doc.md"], None);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("<!DOCTYPE html>"));
    assert!(stdout.contains("<style>"));
    assert!(stdout.contains("<div class=\"markdown-body\">\n<h1>Hi</h1>\n<p>Paragraph.</p>\n</div>"));
}

#[test]
fn raw_reads_stdin_and_prints_fragment() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_in(dir.path(), &["--raw"], Some("- [x] done\n- [ ] todo\n"));

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "<ul class=\"checklist\"><li data-checked=\"true\"><input type=\"checkbox\" disabled checked /><span>done</span></li><li data-checked=\"false\"><input type=\"checkbox\" disabled /><span>todo</span></li></ul>"
    );
}

#[test]
fn theme_and_class_flags() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_in(
        dir.path(),
        &["--theme", "dark", "--class", "post"],
        Some("text\n"),
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("color-scheme: dark;"));
    assert!(!stdout.contains("@media (prefers-color-scheme: dark)"));
    assert!(stdout.contains("<div class=\"markdown-body post\">"));
}

#[test]
fn output_flag_writes_file() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "doc.md", "**bold**\n");
    let output = run_in(dir.path(), &["--raw", "-o", "out.html", "doc.md"], None);

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let written = fs::read_to_string(dir.path().join("out.html")).expect("read output");
    assert_eq!(written, "<p><strong>bold</strong></p>");
}

#[test]
fn css_dir_links_external_stylesheet() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_in(dir.path(), &["--css-dir", "static"], Some("x\n"));

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("<style>"));
    assert!(stdout.contains("href=\"quillmark.css\""));
    let css = fs::read_to_string(dir.path().join("static/quillmark.css")).expect("read css");
    assert!(css.contains(".code-block"));
}

#[test]
fn missing_input_exits_with_error() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_in(dir.path(), &["missing.md"], None);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read missing.md"), "stderr: {}", stderr);
}

#[test]
fn config_file_in_working_directory_is_used() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "quillmark.toml", "raw = true\n");
    let output = run_in(dir.path(), &[], Some("# Title\n"));

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "<h1>Title</h1>");
}

#[test]
fn flags_override_config_values() {
    let dir = TempDir::new().expect("tempdir");
    write(
        dir.path(),
        "site.toml",
        "theme = \"light\"\nclass_name = \"from-config\"\n\n[vars]\nquillmark-accent = \"#123456\"\n",
    );
    let output = run_in(
        dir.path(),
        &["--config", "site.toml", "--class", "from-flag"],
        Some("x\n"),
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<div class=\"markdown-body from-flag\">"));
    assert!(stdout.contains("color-scheme: light;"));
    assert!(stdout.contains("--quillmark-accent: #123456;"));
}

#[test]
fn invalid_config_exits_with_error() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "quillmark.toml", "theme = [\n");
    let output = run_in(dir.path(), &[], Some("x\n"));

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to parse config file"), "stderr: {}", stderr);
}
