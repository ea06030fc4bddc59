use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn ccmark_cmd() -> Command {
    return Command::new(env!("CARGO_BIN_EXE_ccmark"));
}

fn fixture(name: &str) -> PathBuf {
    return Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
}

fn stderr(output: &Output) -> String {
    return String::from_utf8_lossy(&output.stderr).into_owned();
}

fn render_to(dir: &Path, extra: &[&str]) -> String {
    let output = ccmark_cmd()
        .arg("html")
        .arg(fixture("shapes.cpp"))
        .arg("--outdir")
        .arg(dir)
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success(), "html failed: {}", stderr(&output));
    return std::fs::read_to_string(dir.join("shapes.cpp.html")).unwrap();
}

#[test]
fn html_classifies_every_category() {
    let dir = tempfile::tempdir().unwrap();
    let html = render_to(dir.path(), &[]);

    assert!(html.starts_with("<!DOCTYPE html"));
    assert!(html.contains("<title>shapes.cpp</title>"));
    assert!(html.contains("href=\"style.css\""));
    for expected in [
        "<label class=\"preprocessor\">#include</label>",
        "<label class=\"preprocessor\">#define</label>",
        "<label class=\"string\">vector</label>",
        "<label class=\"string\">&quot;shapes.h&quot;</label>",
        "<label class=\"comment\">//&nbsp;Shapes",
        "<label class=\"string\">&quot;shapes&nbsp;//&nbsp;not&nbsp;a&nbsp;comment&quot;</label>",
        "<label class=\"character\">'&quot;'</label>",
        "<label class=\"user-type\">Color</label>",
        "<label class=\"user-type\">Shape</label>",
        "<label class=\"enum-constant\">RED</label>",
        "<label class=\"macro\">MAX_SHAPES</label>",
        "<label class=\"external-scope\">std</label>",
        "<label class=\"external-type\">size_t</label>",
        "<label class=\"keyword\">return</label>",
        "<label class=\"method\">size</label>",
    ] {
        assert!(html.contains(expected), "missing {expected}");
    }
    assert!(!html.contains("<label class=\"comment\">//&nbsp;not"));
}

#[test]
fn html_layout_flags() {
    let dir = tempfile::tempdir().unwrap();
    let html = render_to(dir.path(), &["--no-header", "--line-numbers", "3", "--css", "dark.css"]);

    assert!(html.starts_with("<label class=\"line-number\">001</label>"));
    assert!(html.contains("<label class=\"line-number\">033</label>"));
    assert!(!html.contains("<!DOCTYPE"));
    assert!(!html.contains("dark.css"));
}

#[test]
fn html_reports_unreadable_file_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let output = ccmark_cmd()
        .arg("html")
        .arg(fixture("shapes.cpp"))
        .arg(dir.path().join("missing.cpp"))
        .arg("--outdir")
        .arg(dir.path().join("out"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("failed to read"), "stderr: {}", stderr(&output));
    assert!(dir.path().join("out/shapes.cpp.html").exists());
    assert!(!dir.path().join("out/missing.cpp.html").exists());
}

#[test]
fn html_walks_directories_and_writes_next_to_sources() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir(&src).unwrap();
    std::fs::copy(fixture("shapes.cpp"), src.join("shapes.cpp")).unwrap();
    std::fs::write(src.join("README.txt"), "not a source").unwrap();

    let output = ccmark_cmd().arg("html").arg(&src).output().unwrap();
    assert!(output.status.success(), "html failed: {}", stderr(&output));
    assert!(src.join("shapes.cpp.html").exists());
    assert!(!src.join("README.txt.html").exists());
}

#[test]
fn index_json_exposes_structure() {
    let output = ccmark_cmd().arg("index").arg(fixture("shapes.cpp")).arg("--json").output().unwrap();
    assert!(output.status.success(), "index failed: {}", stderr(&output));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let color = &json["enums"][0];
    assert_eq!(color["entity"]["name"]["name"], "Color");
    assert_eq!(color["values"].as_array().unwrap().len(), 3);

    let classes: Vec<&str> = json["classes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| return c["entity"]["name"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(classes, ["geometry", "Shape", "Circle"]);

    let includes: Vec<&str> =
        json["includes"].as_array().unwrap().iter().map(|i| return i["name"].as_str().unwrap()).collect();
    assert_eq!(includes, ["vector", "\"shapes.h\""]);
    assert!(json["method_refs"].get("return").is_none());
    assert!(json.get("scrubbed").is_none());
}

#[test]
fn index_summary_for_unterminated_comment() {
    let output = ccmark_cmd().arg("index").arg(fixture("unterminated.c")).output().unwrap();
    assert!(output.status.success(), "index failed: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let comment_line = stdout.lines().find(|l| return l.trim_start().starts_with("comment ")).unwrap();
    assert!(comment_line.trim_end().ends_with(" 0"), "line: {comment_line}");
    let keyword_line = stdout.lines().find(|l| return l.trim_start().starts_with("keyword ")).unwrap();
    assert!(keyword_line.trim_end().ends_with(" 2"), "line: {keyword_line}");
}

#[test]
fn config_file_supplies_known_macros() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".ccmark.toml"), "macros = [\"EXPORT\"]\n").unwrap();
    std::fs::write(dir.path().join("api.h"), "EXPORT int run();\n").unwrap();

    let output = ccmark_cmd().current_dir(dir.path()).args(["index", "api.h", "--json"]).output().unwrap();
    assert!(output.status.success(), "index failed: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["macro_refs"].get("EXPORT").is_some());
    assert!(json["external_type_refs"].get("EXPORT").is_none());
}

#[test]
fn missing_explicit_config_fails() {
    let output = ccmark_cmd()
        .args(["--config", "does-not-exist.toml", "index"])
        .arg(fixture("shapes.cpp"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("config not found"));
}

#[test]
fn zero_tab_size_is_rejected() {
    let output = ccmark_cmd().args(["html", "--tab-size", "0"]).arg(fixture("shapes.cpp")).output().unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("positive integer"));
}
