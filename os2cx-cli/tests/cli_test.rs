use assert_cmd::Command;
use predicates::prelude::*;

fn os2cx_cmd() -> Command {
    Command::cargo_bin("os2cx").unwrap()
}

#[test]
fn test_help_lists_commands() {
    os2cx_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("inventory"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_missing_model_file() {
    let dir = tempfile::tempdir().unwrap();
    os2cx_cmd()
        .arg("--config")
        .arg(dir.path().join("absent.json"))
        .arg("inventory")
        .arg(dir.path().join("absent.scad"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Model file not found"));
}

#[test]
fn test_invalid_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("os2cx.json");
    std::fs::write(&config, "{ not json").unwrap();
    std::fs::write(dir.path().join("part.scad"), "").unwrap();
    os2cx_cmd()
        .arg("--config")
        .arg(&config)
        .arg("inventory")
        .arg(dir.path().join("part.scad"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[cfg(unix)]
mod with_fake_openscad {
    use super::*;
    use std::path::{Path, PathBuf};

    const DIRECTIVES: &str = r#"
echo 'ECHO: "__openscad2calculix", "analysis_directive", ["*STATIC"], ["mm", "kg", "s"]' >&2
echo 'ECHO: "__openscad2calculix", "mesh_directive", "block"' >&2
echo 'ECHO: "__openscad2calculix", "select_volume_directive", "core"' >&2
echo 'ECHO: "__openscad2calculix", "load_volume_directive", "gravity", "block", -9.8' >&2
"#;

    /// Writes a model, a stand-in evaluator script and a config pointing at
    /// it. The script answers inventory requests with `inventory` and every
    /// object request with a tetrahedron.
    fn setup(dir: &Path, inventory: &str) -> (PathBuf, PathBuf) {
        let script = dir.join("fake_openscad.sh");
        std::fs::write(
            &script,
            format!(
                r#"case "$4" in
*inventory*)
{}
;;
*)
printf 'OFF\n4 4 0\n0 0 0\n10 0 0\n0 10 0\n0 0 10\n3 0 1 2\n3 0 1 3\n3 0 2 3\n3 1 2 3\n' > "$2"
;;
esac
"#,
                inventory
            ),
        )
        .unwrap();

        let config = dir.join("os2cx.json");
        let json = serde_json::json!({
            "openscad_command": ["sh", script.to_string_lossy()],
            "temp_dir": dir.to_string_lossy(),
        });
        std::fs::write(&config, json.to_string()).unwrap();

        let model = dir.join("part.scad");
        std::fs::write(&model, "include <os2cx.scad>\n").unwrap();
        (config, model)
    }

    #[test]
    fn test_inventory_text() {
        let dir = tempfile::tempdir().unwrap();
        let (config, model) = setup(dir.path(), DIRECTIVES);
        os2cx_cmd()
            .arg("--config")
            .arg(&config)
            .arg("inventory")
            .arg(&model)
            .assert()
            .success()
            .stdout(predicate::str::contains("Units: mm, kg, s"))
            .stdout(predicate::str::contains("  *STATIC"))
            .stdout(predicate::str::contains("   1 volume   core"))
            .stdout(predicate::str::contains("gravity on volume block: (0, 0, -9.8)"));
    }

    #[test]
    fn test_run_json() {
        let dir = tempfile::tempdir().unwrap();
        let (config, model) = setup(dir.path(), DIRECTIVES);
        let output = os2cx_cmd()
            .arg("--config")
            .arg(&config)
            .arg("run")
            .arg(&model)
            .arg("--format")
            .arg("json")
            .output()
            .unwrap();
        assert!(output.status.success());

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Extracting objects..."), "{}", stderr);

        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["progress"], "PolysDone");
        assert_eq!(report["meshes"][0]["solid"]["faces"], 4);
        assert_eq!(report["selections"][0]["mask"]["vertices"], 4);
        assert_eq!(report["approx_scale"], 10.0);
    }

    #[test]
    fn test_run_without_object_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let (config, model) = setup(dir.path(), DIRECTIVES);
        let mut json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&config).unwrap()).unwrap();
        json["extract_objects"] = serde_json::Value::Bool(false);
        std::fs::write(&config, json.to_string()).unwrap();

        os2cx_cmd()
            .arg("--config")
            .arg(&config)
            .arg("run")
            .arg(&model)
            .assert()
            .success()
            .stdout(predicate::str::contains("(InventoryDone)"))
            .stderr(predicate::str::contains("Extracting objects...").not());
    }

    #[test]
    fn test_configuration_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let duplicate = format!(
            "{}echo 'ECHO: \"__openscad2calculix\", \"select_volume_directive\", \"core\"' >&2\n",
            DIRECTIVES
        );
        let (config, model) = setup(dir.path(), &duplicate);
        os2cx_cmd()
            .arg("--config")
            .arg(&config)
            .arg("inventory")
            .arg(&model)
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "Error: Can't declare a new volume named 'core' because there already exists a volume named 'core'.",
            ));
    }

    #[test]
    fn test_malformed_directive_is_reported_with_its_line() {
        let dir = tempfile::tempdir().unwrap();
        let (config, model) = setup(
            dir.path(),
            r#"echo 'ECHO: "__openscad2calculix", "mesh_directive"' >&2"#,
        );
        os2cx_cmd()
            .arg("--config")
            .arg(&config)
            .arg("inventory")
            .arg(&model)
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "Error: in line \"__openscad2calculix\", \"mesh_directive\": wrong number of arguments to mesh",
            ));
    }
}
