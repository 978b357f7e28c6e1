//! Configuration management for the converter.
//!
//! Handles:
//! - Command-line argument parsing
//! - Project configuration files (`.gcode2as.toml`)
//! - Profile selection and signal overrides
//!
//! Precedence is CLI > project file > profile > built-in defaults.

use anyhow::{Context, Result, bail, ensure};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::convert::ConversionOptions;
use crate::profile::ProfileRegistry;
use crate::program::sanitize_program_name;
use crate::signal::Mode;

/// Project configuration file name
pub const PROJECT_CONFIG_NAME: &str = ".gcode2as.toml";

/// Process mode selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeKind {
    #[value(alias = "fdm")]
    Extrusion,
    Laser,
    #[value(alias = "metal")]
    Weld,
}

impl ModeKind {
    /// Built-in profile used when only the kind is given
    pub fn default_profile(self) -> &'static str {
        match self {
            ModeKind::Extrusion => "fdm",
            ModeKind::Laser => "laser",
            ModeKind::Weld => "metal",
        }
    }

    fn matches(self, mode: &Mode) -> bool {
        matches!(
            (self, mode),
            (ModeKind::Extrusion, Mode::Extrusion(_))
                | (ModeKind::Laser, Mode::Laser(_))
                | (ModeKind::Weld, Mode::Weld(_))
        )
    }
}

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "gcode2as")]
#[command(about = "Convert G-code toolpaths into Kawasaki AS robot programs")]
#[command(version)]
pub struct Args {
    /// G-code file to convert
    pub input: PathBuf,

    #[arg(long, value_enum, help = "Process mode (extrusion, laser, weld)")]
    pub mode: Option<ModeKind>,

    #[arg(long, help = "Conversion profile (e.g., 'fdm', 'laser-dual', 'metal')")]
    pub profile: Option<String>,

    #[arg(long, help = "Directory containing profile TOML files")]
    pub profile_dir: Option<PathBuf>,

    #[arg(long, help = "Project configuration file (default: search for .gcode2as.toml)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Minimum distance in mm between emitted moves")]
    pub min_distance: Option<f64>,

    #[arg(long, help = "Primary signal number (extrude or laser on)")]
    pub signal: Option<u16>,

    #[arg(long, help = "Secondary signal number (retract or laser off)")]
    pub secondary_signal: Option<u16>,

    #[arg(long, help = "Welding speed for the welding conditions")]
    pub welding_speed: Option<f64>,

    #[arg(long, help = "Constant speed in mm/min replacing all feed rates")]
    pub speed: Option<f64>,

    #[arg(long, help = "Vase mode: z changes alone do not force a move")]
    pub vase: bool,

    #[arg(long, help = "Negate all z coordinates")]
    pub inverted: bool,

    #[arg(long, help = "Maximum statements per program before splitting")]
    pub max_section_size: Option<usize>,

    #[arg(short, long, help = "Output directory (default: next to the input)")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, help = "Program name (default: input file stem)")]
    pub name: Option<String>,

    #[arg(short, long, help = "Annotate moves with their source line")]
    pub verbose: bool,

    #[arg(long, help = "Write a JSON run report to this path")]
    pub report: Option<PathBuf>,

    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Project configuration file contents
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub profile: Option<String>,
    pub mode: Option<Mode>,
    pub min_distance: Option<f64>,
    pub speed: Option<f64>,
    pub vase: Option<bool>,
    pub inverted: Option<bool>,
    pub verbose: Option<bool>,
    pub max_section_size: Option<usize>,
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub profile_dirs: Vec<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Look for a project file next to `input`, then in `cwd`
    pub fn discover(input: &Path, cwd: Option<&Path>) -> Result<Option<(PathBuf, Self)>> {
        let input_dir = input.parent().filter(|dir| !dir.as_os_str().is_empty());
        let candidates = input_dir
            .into_iter()
            .chain(cwd)
            .map(|dir| dir.join(PROJECT_CONFIG_NAME));

        for candidate in candidates {
            if candidate.is_file() {
                let config = Self::load(&candidate)?;
                return Ok(Some((candidate, config)));
            }
        }
        Ok(None)
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Sanitised AS program name
    pub program_name: String,
    pub options: ConversionOptions,
    /// Profile the mode was taken from, if any
    pub profile: Option<String>,
    /// Project file that was applied
    pub config_path: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub log_level: String,
}

impl Config {
    /// Create configuration from explicit arguments, loading the project file
    /// and profile directories they point to
    pub fn from_args(args: Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => Some((path.clone(), FileConfig::load(path)?)),
            None => {
                let cwd = std::env::current_dir().ok();
                FileConfig::discover(&args.input, cwd.as_deref())?
            }
        };

        let mut profile_dirs: Vec<PathBuf> = file
            .as_ref()
            .map(|(_, f)| f.profile_dirs.clone())
            .unwrap_or_default();
        profile_dirs.extend(args.profile_dir.clone());

        let registry = ProfileRegistry::load(&profile_dirs)?;
        Self::resolve(args, file, &registry)
    }

    /// Merge arguments, project file and profiles. Touches no filesystem.
    pub fn resolve(
        args: Args,
        file: Option<(PathBuf, FileConfig)>,
        registry: &ProfileRegistry,
    ) -> Result<Self> {
        let (config_path, file) = match file {
            Some((path, file)) => (Some(path), file),
            None => (None, FileConfig::default()),
        };

        let (profile, mut mode) = Self::select_mode(&args, &file, registry)?;

        if let Some(signal) = args.signal {
            ensure!(
                mode.set_primary_signal(signal),
                "--signal is not used in {} mode",
                mode.name()
            );
        }
        if let Some(signal) = args.secondary_signal {
            ensure!(
                mode.set_secondary_signal(signal),
                "--secondary-signal is not used in {} mode",
                mode.name()
            );
        }
        if let Some(speed) = args.welding_speed {
            let Mode::Weld(settings) = &mut mode else {
                bail!("--welding-speed only applies to weld mode");
            };
            ensure!(speed.is_finite() && speed > 0.0, "welding speed must be positive");
            settings.welding_speed = speed;
        }

        let defaults = ConversionOptions::default();
        let options = ConversionOptions {
            mode,
            min_distance: args
                .min_distance
                .or(file.min_distance)
                .unwrap_or(defaults.min_distance),
            speed_override: args.speed.or(file.speed),
            verbose: args.verbose || file.verbose.unwrap_or(false),
            vase_mode: args.vase || file.vase.unwrap_or(false),
            inverted: args.inverted || file.inverted.unwrap_or(false),
            max_section_size: args
                .max_section_size
                .or(file.max_section_size)
                .unwrap_or(defaults.max_section_size),
        };
        Self::validate(&options)?;

        let output_dir = match args.output_dir.or(file.output_dir) {
            Some(dir) => dir,
            None => args
                .input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };

        let stem = args
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("Input has no file name: {}", args.input.display()))?;
        let program_name = sanitize_program_name(args.name.as_deref().unwrap_or(stem));

        Ok(Config {
            input: args.input,
            output_dir,
            program_name,
            options,
            profile,
            config_path,
            report: args.report,
            log_level: args.log_level,
        })
    }

    fn select_mode(
        args: &Args,
        file: &FileConfig,
        registry: &ProfileRegistry,
    ) -> Result<(Option<String>, Mode)> {
        let lookup = |name: &str| -> Result<Mode> {
            match registry.get(name) {
                Some(profile) => Ok(profile.mode.clone()),
                None => bail!(
                    "Unknown profile '{}' (available: {})",
                    name,
                    registry.list().join(", ")
                ),
            }
        };

        if let Some(name) = args.profile.as_deref() {
            let mode = lookup(name)?;
            if let Some(kind) = args.mode {
                ensure!(
                    kind.matches(&mode),
                    "profile '{}' is a {} profile, not {:?}",
                    name,
                    mode.name(),
                    kind
                );
            }
            return Ok((Some(name.to_string()), mode));
        }

        // A project-level mode or profile is kept unless --mode asks for another kind
        let from_file = match (&file.profile, &file.mode) {
            (Some(name), _) => Some((Some(name.clone()), lookup(name)?)),
            (None, Some(mode)) => Some((None, mode.clone())),
            (None, None) => None,
        };

        match (args.mode, from_file) {
            (Some(kind), Some(selected)) if kind.matches(&selected.1) => Ok(selected),
            (Some(kind), _) => {
                let name = kind.default_profile();
                Ok((Some(name.to_string()), lookup(name)?))
            }
            (None, Some(selected)) => Ok(selected),
            (None, None) => Ok((None, Mode::default())),
        }
    }

    fn validate(options: &ConversionOptions) -> Result<()> {
        ensure!(
            options.min_distance.is_finite() && options.min_distance >= 0.0,
            "minimum distance must be zero or positive, got {}",
            options.min_distance
        );
        ensure!(
            options.max_section_size >= 1,
            "maximum section size must be at least 1"
        );
        if let Some(speed) = options.speed_override {
            ensure!(
                speed.is_finite() && speed > 0.0,
                "speed override must be positive, got {speed}"
            );
        }
        Ok(())
    }

    /// `<output_dir>/<input stem>.pg`
    pub fn output_path(&self) -> PathBuf {
        let stem = self
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program_name.clone());
        self.output_dir.join(format!("{stem}.pg"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{ExtrusionSignals, LaserSignals, WeldSettings};
    use std::fs;
    use tempfile::TempDir;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["gcode2as", "parts/3D benchy.gcode"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    fn resolve(extra: &[&str], file: Option<FileConfig>) -> Result<Config> {
        let file = file.map(|f| (PathBuf::from(PROJECT_CONFIG_NAME), f));
        Config::resolve(args(extra), file, &ProfileRegistry::with_built_ins())
    }

    #[test]
    fn test_defaults() {
        let config = resolve(&[], None).expect("config");
        assert_eq!(config.options, ConversionOptions::default());
        assert_eq!(config.program_name, "p3D_benchy");
        assert_eq!(config.output_path(), PathBuf::from("parts/3D benchy.pg"));
        assert_eq!(config.log_level, "info");
        assert!(config.profile.is_none());
    }

    #[test]
    fn test_mode_alias_selects_builtin_profile() {
        let config = resolve(&["--mode", "metal"], None).expect("config");
        assert_eq!(config.profile.as_deref(), Some("metal"));
        assert_eq!(
            config.options.mode,
            Mode::Weld(WeldSettings {
                welding_speed: 15.0,
                condition: 1,
            })
        );
    }

    #[test]
    fn test_signal_overrides_apply_to_profile() {
        let config = resolve(
            &["--profile", "laser", "--signal", "7", "--secondary-signal", "8"],
            None,
        )
        .expect("config");
        assert_eq!(
            config.options.mode,
            Mode::Laser(LaserSignals {
                signal: 7,
                off_signal: Some(8),
                pulse: 0.1,
            })
        );
    }

    #[test]
    fn test_cli_overrides_project_file() {
        let file = FileConfig {
            min_distance: Some(0.5),
            max_section_size: Some(200),
            speed: Some(900.0),
            ..FileConfig::default()
        };
        let config = resolve(&["--min-distance", "1.5"], Some(file)).expect("config");

        assert_eq!(config.options.min_distance, 1.5);
        assert_eq!(config.options.max_section_size, 200);
        assert_eq!(config.options.speed_override, Some(900.0));
    }

    #[test]
    fn test_project_mode_kept_when_kind_matches() {
        let custom = Mode::Extrusion(ExtrusionSignals {
            extrude_signal: 40,
            retract_signal: 41,
            retract_pulse: 0.3,
        });
        let file = FileConfig {
            mode: Some(custom.clone()),
            ..FileConfig::default()
        };

        let config = resolve(&["--mode", "fdm"], Some(file.clone())).expect("config");
        assert_eq!(config.options.mode, custom);

        let config = resolve(&["--mode", "laser"], Some(file)).expect("config");
        assert_eq!(config.profile.as_deref(), Some("laser"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(resolve(&["--min-distance=-1"], None).is_err());
        assert!(resolve(&["--max-section-size", "0"], None).is_err());
        assert!(resolve(&["--profile", "plasma"], None).is_err());
        assert!(resolve(&["--welding-speed", "10"], None).is_err());
        assert!(resolve(&["--mode", "weld", "--signal", "3"], None).is_err());
        assert!(resolve(&["--profile", "fdm", "--mode", "laser"], None).is_err());
    }

    #[test]
    fn test_output_dir_and_name_override() {
        let config = resolve(&["-o", "out", "--name", "benchy"], None).expect("config");
        assert_eq!(config.program_name, "benchy");
        assert_eq!(config.output_path(), PathBuf::from("out/3D benchy.pg"));
    }

    #[test]
    fn test_discover_project_file_next_to_input() {
        let temp = TempDir::new().expect("temp dir");
        fs::write(
            temp.path().join(PROJECT_CONFIG_NAME),
            "profile = \"metal\"\nmin_distance = 0.8\n",
        )
        .expect("write config");

        let input = temp.path().join("part.gcode");
        let (path, file) = FileConfig::discover(&input, None)
            .expect("discover")
            .expect("project file");

        assert_eq!(path, temp.path().join(PROJECT_CONFIG_NAME));
        assert_eq!(file.profile.as_deref(), Some("metal"));
        assert_eq!(file.min_distance, Some(0.8));
    }

    #[test]
    fn test_unknown_project_key_is_rejected() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join(PROJECT_CONFIG_NAME);
        fs::write(&path, "min_distanse = 1\n").expect("write config");
        assert!(FileConfig::load(&path).is_err());
    }
}
