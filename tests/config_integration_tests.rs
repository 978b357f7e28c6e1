//! Configuration loaded from real files: project config and profile directories.

use clap::Parser;
use gcode2as::config::{Args, Config};
use gcode2as::signal::{ExtrusionSignals, Mode};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CUSTOM_PROFILE: &str = r#"
[profile]
name = "big-nozzle"
description = "0.8 mm nozzle on the second controller"

[mode]
kind = "extrusion"
extrude_signal = 2011
retract_signal = 2012
retract_pulse = 0.25
"#;

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

#[test]
fn test_profile_from_profile_dir() {
    let temp = TempDir::new().expect("temp dir");
    let profiles = temp.path().join("profiles");
    fs::create_dir(&profiles).expect("create dir");
    fs::write(profiles.join("big-nozzle.toml"), CUSTOM_PROFILE).expect("write profile");
    let input = temp.path().join("vase.gcode");

    let args = Args::parse_from([
        "gcode2as",
        path_str(&input),
        "--profile-dir",
        path_str(&profiles),
        "--profile",
        "big-nozzle",
        "--vase",
    ]);
    let config = Config::from_args(args).expect("config");

    assert_eq!(config.profile.as_deref(), Some("big-nozzle"));
    assert_eq!(
        config.options.mode,
        Mode::Extrusion(ExtrusionSignals {
            extrude_signal: 2011,
            retract_signal: 2012,
            retract_pulse: 0.25,
        })
    );
    assert!(config.options.vase_mode);
    assert_eq!(config.output_path(), temp.path().join("vase.pg"));
}

#[test]
fn test_explicit_config_file_with_profile_dirs() {
    let temp = TempDir::new().expect("temp dir");
    let profiles = temp.path().join("shared-profiles");
    fs::create_dir(&profiles).expect("create dir");
    fs::write(profiles.join("big-nozzle.toml"), CUSTOM_PROFILE).expect("write profile");

    let config_path = temp.path().join("cell.toml");
    fs::write(
        &config_path,
        format!(
            "profile = \"big-nozzle\"\nmax_section_size = 500\nverbose = true\n\
             profile_dirs = [{:?}]\n",
            profiles.display().to_string()
        ),
    )
    .expect("write config");

    let input = temp.path().join("bracket.gcode");
    let args = Args::parse_from([
        "gcode2as",
        path_str(&input),
        "--config",
        path_str(&config_path),
        "--max-section-size",
        "250",
    ]);
    let config = Config::from_args(args).expect("config");

    assert_eq!(config.config_path.as_deref(), Some(config_path.as_path()));
    assert_eq!(config.options.max_section_size, 250);
    assert!(config.options.verbose);
    assert_eq!(config.options.mode.signals(), vec![2011, 2012]);
}

#[test]
fn test_malformed_config_file_is_an_error() {
    let temp = TempDir::new().expect("temp dir");
    let config_path = temp.path().join("broken.toml");
    fs::write(&config_path, "profile = [").expect("write config");

    let args = Args::parse_from([
        "gcode2as",
        path_str(&temp.path().join("part.gcode")),
        "--config",
        path_str(&config_path),
    ]);
    let error = Config::from_args(args).expect_err("must fail");
    assert!(format!("{error:#}").contains("Failed to parse config file"));
}
