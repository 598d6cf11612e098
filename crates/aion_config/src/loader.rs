//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// The recognized optimizer pass names, duplicated here rather than
/// depended on from `aion_synth` so this crate stays a leaf in the workspace
/// dependency graph.
const KNOWN_PASSES: &[&str] = &[
    "identity",
    "algebraic",
    "constant_prop",
    "strength_reduce",
    "dead_code",
    "cse",
];

/// Loads and validates an `aion.toml` configuration from a project directory.
///
/// Reads `<project_dir>/aion.toml`, parses it, and validates required fields.
pub fn load_options(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join("aion.toml");
    let content = std::fs::read_to_string(&config_path)?;
    load_options_from_str(&content)
}

/// Parses and validates an `aion.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_options_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and any `optimizer_passes`
/// entries name a recognized pass.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.project.top.is_empty() {
        return Err(ConfigError::MissingField("project.top".to_string()));
    }
    if let Some(passes) = &config.compile.optimizer_passes {
        for pass in passes {
            if !KNOWN_PASSES.contains(&pass.as_str()) {
                return Err(ConfigError::UnknownPass(pass.clone()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[project]
name = "blinky"
version = "0.1.0"
top = "src/top.v"
"#;
        let config = load_options_from_str(toml).unwrap();
        assert_eq!(config.project.name, "blinky");
        assert_eq!(config.project.version, "0.1.0");
        assert_eq!(config.project.top, "src/top.v");
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[project]
name = "blinky"
version = "0.1.0"
top = "src/top.v"

[compile]
top_module = "blinky"
optimizer_passes = ["identity", "constant_prop", "dead_code"]
diagnostic_color = false
"#;
        let config = load_options_from_str(toml).unwrap();
        assert_eq!(config.compile.top_module.as_deref(), Some("blinky"));
        assert_eq!(
            config.compile.optimizer_passes.as_deref(),
            Some(["identity".to_string(), "constant_prop".to_string(), "dead_code".to_string()].as_slice())
        );
        assert!(!config.compile.diagnostic_color);
    }

    #[test]
    fn missing_name_errors() {
        let toml = r#"
[project]
name = ""
version = "0.1.0"
top = "src/top.v"
"#;
        let err = load_options_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn missing_top_errors() {
        let toml = r#"
[project]
name = "test"
version = "0.1.0"
top = ""
"#;
        let err = load_options_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let toml = "this is not valid toml {{{}}}";
        let err = load_options_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn unknown_optimizer_pass_errors() {
        let toml = r#"
[project]
name = "test"
version = "0.1.0"
top = "src/top.v"

[compile]
optimizer_passes = ["frobnicate"]
"#;
        let err = load_options_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPass(p) if p == "frobnicate"));
    }

    #[test]
    fn default_values() {
        let toml = r#"
[project]
name = "test"
version = "0.1.0"
top = "src/top.v"
"#;
        let config = load_options_from_str(toml).unwrap();
        assert!(config.compile.top_module.is_none());
        assert!(config.compile.optimizer_passes.is_none());
        assert!(config.compile.diagnostic_color);
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_options(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
