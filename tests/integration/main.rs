//! Integration tests for Mason

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Run mason against an isolated (missing) config file
    fn mason(home: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("mason");
        cmd.env("MASON_CONFIG", home.join("config.toml"));
        cmd.env("CI", "1");
        cmd
    }

    #[cfg(unix)]
    fn write_script(buildpack: &Path, name: &str, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        let bin = buildpack.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let path = bin.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    fn fixture_buildpack(root: &Path, compile_exit: i32) -> PathBuf {
        let dir = root.join("buildpack-static");
        write_script(&dir, "detect", "[ -f \"$1/index.html\" ] && echo Static && exit 0\nexit 1");
        write_script(
            &dir,
            "compile",
            &format!(
                "echo '-----> Copying static files'\necho '       done'\nexit {}",
                compile_exit
            ),
        );
        write_script(
            &dir,
            "release",
            "echo 'default_process_types: {web: \"./start\"}'",
        );
        dir
    }

    fn fixture_app(root: &Path) -> PathBuf {
        let app = root.join("site");
        std::fs::create_dir_all(&app).unwrap();
        std::fs::write(app.join("index.html"), "<h1>hi</h1>").unwrap();
        app
    }

    #[test]
    fn help_displays() {
        let home = TempDir::new().unwrap();
        mason(home.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("build applications with buildpacks"));
    }

    #[test]
    fn version_displays() {
        let home = TempDir::new().unwrap();
        mason(home.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("mason"));
    }

    #[test]
    fn config_path_honors_env() {
        let home = TempDir::new().unwrap();
        mason(home.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let home = TempDir::new().unwrap();
        mason(home.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"));
    }

    #[test]
    fn config_set_then_show() {
        let home = TempDir::new().unwrap();
        mason(home.path())
            .args(["config", "set", "compile.cache_root", "/var/cache/mason"])
            .assert()
            .success();

        mason(home.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("/var/cache/mason"));
    }

    #[test]
    fn unknown_buildpack_fails() {
        let home = TempDir::new().unwrap();
        mason(home.path())
            .args(["info", "no-such-buildpack"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Buildpack not found"));
    }

    #[test]
    fn buildpacks_empty() {
        let home = TempDir::new().unwrap();
        let config = home.path().join("config.toml");
        std::fs::write(
            &config,
            format!("[buildpacks]\ndir = {:?}\n", home.path().join("none")),
        )
        .unwrap();

        mason(home.path())
            .args(["buildpacks", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[cfg(unix)]
    #[test]
    fn buildpacks_lists_installed_by_name() {
        let home = TempDir::new().unwrap();
        let installed = home.path().join("buildpacks");
        for name in ["ruby", "go"] {
            std::fs::create_dir_all(installed.join(name)).unwrap();
        }
        std::fs::write(
            home.path().join("config.toml"),
            format!("[buildpacks]\ndir = {:?}\n", installed),
        )
        .unwrap();

        mason(home.path())
            .args(["buildpacks", "--format", "plain"])
            .assert()
            .success()
            .stdout("go\nruby\n");
    }

    #[cfg(unix)]
    #[test]
    fn detect_prints_name() {
        let home = TempDir::new().unwrap();
        let buildpack = fixture_buildpack(home.path(), 0);
        let app = fixture_app(home.path());

        mason(home.path())
            .arg("detect")
            .arg(&buildpack)
            .arg(&app)
            .assert()
            .success()
            .stdout("Static\n");
    }

    #[cfg(unix)]
    #[test]
    fn detect_negative_fails() {
        let home = TempDir::new().unwrap();
        let buildpack = fixture_buildpack(home.path(), 0);
        let app = home.path().join("empty-app");
        std::fs::create_dir_all(&app).unwrap();

        mason(home.path())
            .arg("detect")
            .arg(&buildpack)
            .arg(&app)
            .assert()
            .failure()
            .stderr(predicate::str::contains("does not apply"));
    }

    #[cfg(unix)]
    #[test]
    fn info_json() {
        let home = TempDir::new().unwrap();
        let buildpack = fixture_buildpack(home.path(), 0);

        mason(home.path())
            .arg("info")
            .arg(&buildpack)
            .args(["--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"name\": \"buildpack-static\""));
    }

    #[cfg(unix)]
    #[test]
    fn compile_streams_and_assembles() {
        let home = TempDir::new().unwrap();
        let buildpack = fixture_buildpack(home.path(), 0);
        let app = fixture_app(home.path());
        let cache = home.path().join("cache");

        let output = mason(home.path())
            .arg("compile")
            .arg(&buildpack)
            .arg(&app)
            .arg("--cache")
            .arg(&cache)
            .assert()
            .success()
            .stdout(predicate::str::contains("  + Copying static files"))
            .stdout(predicate::str::contains("\n      done\n"))
            .stdout(predicate::str::contains("caching in"))
            .get_output()
            .stdout
            .clone();

        let stdout = String::from_utf8(output).unwrap();
        let working_copy = stdout
            .lines()
            .find_map(|l| l.split("Compiled to ").nth(1))
            .map(|p| PathBuf::from(p.trim()))
            .expect("working copy path in output");

        assert!(cache.is_dir());
        assert_eq!(
            std::fs::read_to_string(working_copy.join("Procfile")).unwrap(),
            "web: ./start\n"
        );
        assert!(working_copy.join("bin/run-web.sh").is_file());
        assert!(!app.join("Procfile").exists());

        std::fs::remove_dir_all(working_copy).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn compile_failure_is_reported() {
        let home = TempDir::new().unwrap();
        let buildpack = fixture_buildpack(home.path(), 1);
        let app = fixture_app(home.path());

        mason(home.path())
            .arg("compile")
            .arg(&buildpack)
            .arg(&app)
            .arg("--cache")
            .arg(home.path().join("cache"))
            .assert()
            .failure()
            .stdout(predicate::str::contains("  + Copying static files"))
            .stderr(predicate::str::contains("compile failed"));
    }
}
