use std::path::Path;

use serde::Deserialize;

use crate::layout::LayoutOptions;
use crate::parser::ParseOptions;
use crate::syntax::Dialect;

/// Configuration loaded from `code-flow.toml` at the working directory.
#[derive(Debug, Deserialize, Default)]
pub struct CodeFlowConfig {
    /// Default grammar dialect: "typescript" (default), "tsx" or "javascript".
    pub dialect: Option<String>,
    /// Names treated as part of the native runtime surface in addition to the
    /// built-in globals (useful for host-injected APIs).
    pub native_globals: Option<Vec<String>>,
    /// Layout spacing overrides.
    #[serde(default)]
    pub layout: LayoutSection,
}

#[derive(Debug, Deserialize, Default)]
pub struct LayoutSection {
    pub node_sep: Option<f64>,
    pub rank_sep: Option<f64>,
    pub margin: Option<f64>,
}

impl CodeFlowConfig {
    /// Load configuration from `code-flow.toml` in the given directory.
    ///
    /// Returns a default (empty) configuration if the file does not exist or
    /// cannot be parsed.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join("code-flow.toml");

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("warning: failed to parse code-flow.toml: {err}. Using defaults.");
                    Self::default()
                }
            },
            Err(err) => {
                eprintln!("warning: failed to read code-flow.toml: {err}. Using defaults.");
                Self::default()
            }
        }
    }

    /// Effective parse options: a CLI dialect flag beats the config value.
    ///
    /// An unrecognized configured dialect falls back to the default with a
    /// warning, same policy as an unreadable config file.
    pub fn parse_options(&self, cli_dialect: Option<Dialect>) -> ParseOptions {
        let dialect = cli_dialect
            .or_else(|| {
                self.dialect.as_deref().and_then(|s| {
                    let parsed = Dialect::from_str_loose(s);
                    if parsed.is_none() {
                        eprintln!("warning: unknown dialect {s:?} in code-flow.toml. Using default.");
                    }
                    parsed
                })
            })
            .unwrap_or_default();
        ParseOptions {
            dialect,
            extra_native_globals: self.native_globals.clone().unwrap_or_default(),
        }
    }

    /// Effective layout spacing.
    pub fn layout_options(&self) -> LayoutOptions {
        let defaults = LayoutOptions::default();
        LayoutOptions {
            node_sep: self.layout.node_sep.unwrap_or(defaults.node_sep),
            rank_sep: self.layout.rank_sep.unwrap_or(defaults.rank_sep),
            margin: self.layout.margin.unwrap_or(defaults.margin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CodeFlowConfig::load(dir.path());
        let options = config.parse_options(None);
        assert_eq!(options.dialect, Dialect::TypeScript);
        assert!(options.extra_native_globals.is_empty());
    }

    #[test]
    fn test_config_values_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("code-flow.toml"),
            "dialect = \"javascript\"\nnative_globals = [\"ipc\"]\n\n[layout]\nrank_sep = 150.0\n",
        )
        .unwrap();
        let config = CodeFlowConfig::load(dir.path());
        let options = config.parse_options(None);
        assert_eq!(options.dialect, Dialect::JavaScript);
        assert_eq!(options.extra_native_globals, vec!["ipc".to_owned()]);
        assert_eq!(config.layout_options().rank_sep, 150.0);
        assert_eq!(config.layout_options().node_sep, LayoutOptions::default().node_sep);
    }

    #[test]
    fn test_cli_dialect_beats_config() {
        let config = CodeFlowConfig {
            dialect: Some("javascript".to_owned()),
            ..CodeFlowConfig::default()
        };
        let options = config.parse_options(Some(Dialect::Tsx));
        assert_eq!(options.dialect, Dialect::Tsx);
    }

    #[test]
    fn test_broken_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("code-flow.toml"), "dialect = [not toml").unwrap();
        let config = CodeFlowConfig::load(dir.path());
        assert!(config.dialect.is_none());
    }
}
