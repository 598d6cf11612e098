//! Configuration types deserialized from `aion.toml`.

use serde::Deserialize;

/// The top-level project configuration parsed from `aion.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata (name, version, entry source file).
    pub project: ProjectMeta,
    /// Compile-time options governing elaboration and optimization.
    #[serde(default)]
    pub compile: CompileOptions,
}

/// Project metadata.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project's name.
    pub name: String,
    /// The project's version string.
    pub version: String,
    /// The source file elaboration starts from.
    pub top: String,
}

/// Compile-time options: which module elaborates as top, which optimizer
/// passes run and in what order, and how diagnostics render.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
pub struct CompileOptions {
    /// Overrides the top module name inferred from source order —
    /// otherwise takes the first module declared if none is named.
    #[serde(default)]
    pub top_module: Option<String>,
    /// The ordered optimizer pass list to run. `None` runs the
    /// default pass order.
    #[serde(default)]
    pub optimizer_passes: Option<Vec<String>>,
    /// Whether diagnostics render with ANSI color.
    #[serde(default = "default_diagnostic_color")]
    pub diagnostic_color: bool,
}

fn default_diagnostic_color() -> bool {
    true
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            top_module: None,
            optimizer_passes: None,
            diagnostic_color: default_diagnostic_color(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_options_default_enables_color_with_no_overrides() {
        let opts = CompileOptions::default();
        assert!(opts.diagnostic_color);
        assert!(opts.top_module.is_none());
        assert!(opts.optimizer_passes.is_none());
    }
}
