//! `gshield build-manifest` end to end.

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

#[allow(deprecated)]
fn gshield_cmd() -> Command {
    Command::cargo_bin("gshield").unwrap()
}

const USER: &str = r#"
[loader.env]
PATH = "/app/bin"

[sgx]
enclave_size = "4G"
"#;

const TEMPLATE: &str = r#"
[loader]
entrypoint = "file:/gramine/app_files/entrypoint"

[sgx]
enclave_size = "1G"
"#;

const IMAGE: &str = r#"[{"Config": {"Env": ["PATH=/usr/local/bin:/usr/bin", "LANG=C.UTF-8"]}}]"#;

fn workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("app.manifest"), USER).unwrap();
    std::fs::write(tmp.path().join("entrypoint.manifest"), TEMPLATE).unwrap();
    std::fs::write(tmp.path().join("image.json"), IMAGE).unwrap();
    std::fs::write(
        tmp.path().join("ldconfig.txt"),
        "/usr/local/lib: (from /etc/ld.so.conf.d/libc.conf:2)\n\tlibfoo.so -> libfoo.so.1\n/lib:\n",
    )
    .unwrap();
    tmp
}

fn base_args() -> [&'static str; 9] {
    [
        "build-manifest",
        "--user",
        "app.manifest",
        "--template",
        "entrypoint.manifest",
        "--image-env",
        "image.json",
        "--ldconfig-output",
        "ldconfig.txt",
    ]
}

#[test]
fn writes_merged_manifest() {
    let tmp = workspace();
    gshield_cmd()
        .current_dir(tmp.path())
        .args(base_args())
        .args(["--out", "out/merged.manifest"])
        .assert()
        .success();

    let text = std::fs::read_to_string(tmp.path().join("out/merged.manifest")).unwrap();
    let doc: toml::Table = toml::from_str(&text).unwrap();
    let env = doc
        .get("loader")
        .and_then(|v| v.get("env"))
        .and_then(toml::Value::as_table)
        .unwrap();
    assert_eq!(
        env.get("PATH").and_then(toml::Value::as_str),
        Some("/app/bin:/usr/local/bin:/usr/bin")
    );
    assert_eq!(
        env.get("LD_LIBRARY_PATH").and_then(toml::Value::as_str),
        Some("/usr/local/lib:/lib")
    );
    let size = doc
        .get("sgx")
        .and_then(|v| v.get("enclave_size"))
        .and_then(toml::Value::as_str);
    assert_eq!(size, Some("4G"));
}

#[test]
fn strict_conflict_exits_with_conflict_code() {
    let tmp = workspace();
    gshield_cmd()
        .current_dir(tmp.path())
        .args(base_args())
        .arg("--strict")
        .assert()
        .code(2)
        .stderr(contains("sgx.enclave_size"));
}

#[test]
fn strict_profile_from_config_file() {
    let tmp = workspace();
    std::fs::write(tmp.path().join("gshield.toml"), "profile = \"strict\"\n").unwrap();
    gshield_cmd()
        .current_dir(tmp.path())
        .args(base_args())
        .assert()
        .code(2);
}

#[test]
fn missing_input_is_a_runtime_error() {
    let tmp = workspace();
    gshield_cmd()
        .current_dir(tmp.path())
        .args(["build-manifest", "--user", "nope.manifest", "--template", "entrypoint.manifest"])
        .assert()
        .code(1)
        .stderr(contains("nope.manifest"));
}
