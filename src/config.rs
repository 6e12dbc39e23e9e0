//! Layered configuration of the command-line cleaner.
//!
//! Sources are merged in order, later ones winning: built-in defaults, the
//! optional `rusty_cleaner.toml` file, `RUSTY_CLEANER_*` environment variables
//! and finally the flags given on the command line.
use crate::spreadsheet::IngestOptions;
use figment::providers::Env;
use figment::providers::Format;
use figment::providers::Serialized;
use figment::providers::Toml;
use figment::Figment;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Looked up in the working directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "rusty_cleaner.toml";
pub const ENV_PREFIX: &str = "RUSTY_CLEANER_";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Rows shown in previews
    pub preview_rows: usize,
    /// Where the cleaned CSV is written
    pub output: PathBuf,
    pub log_level: String,
    /// Tokens read as missing in addition to the built-in ones
    pub na_values: Vec<String>,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            output: PathBuf::from(crate::export::EXPORT_FILE_NAME),
            log_level: "info".to_owned(),
            na_values: Vec::new(),
        }
    }
}

impl CleanerConfig {
    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            extra_na_values: self.na_values.clone(),
        }
    }
}

/// Values set explicitly on the command line. Unset fields leave lower layers alone.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Loads the configuration. An explicit `path` must exist; the default file is optional.
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<CleanerConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(CleanerConfig::default()));
    figment = match path {
        Some(path) => figment.merge(Toml::file_exact(path)),
        None => figment.merge(Toml::file(CONFIG_FILE_NAME)),
    };
    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .merge(Serialized::defaults(overrides))
        .extract()
        .map_err(Box::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> figment::error::Result<CleanerConfig> {
        load_config(path, overrides).map_err(|error| *error)
    }

    #[test]
    fn defaults() {
        Jail::expect_with(|_| {
            let config = load(None, &ConfigOverrides::default())?;
            assert_eq!(config, CleanerConfig::default());
            assert_eq!(config.preview_rows, 5);
            assert_eq!(config.output, PathBuf::from("cleaned_data.csv"));
            Ok(())
        });
    }

    #[test]
    fn layers_override_in_order() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE_NAME,
                r#"
                preview_rows = 10
                log_level = "debug"
                na_values = ["missing", "?"]
                "#,
            )?;
            jail.set_env("RUSTY_CLEANER_PREVIEW_ROWS", "20");

            let config = load(None, &ConfigOverrides::default())?;
            assert_eq!(config.preview_rows, 20);
            assert_eq!(config.log_level, "debug");
            assert_eq!(config.ingest_options().extra_na_values, vec!["missing", "?"]);

            let overrides = ConfigOverrides {
                preview_rows: Some(3),
                output: Some(PathBuf::from("out.csv")),
                ..ConfigOverrides::default()
            };
            let config = load(None, &overrides)?;
            assert_eq!(config.preview_rows, 3);
            assert_eq!(config.output, PathBuf::from("out.csv"));
            assert_eq!(config.log_level, "debug");
            Ok(())
        });
    }

    #[test]
    fn explicit_file_must_exist() {
        Jail::expect_with(|jail| {
            assert!(load_config(Some(Path::new("absent.toml")), &ConfigOverrides::default()).is_err());

            jail.create_file("custom.toml", "output = \"custom.csv\"")?;
            let config = load(Some(Path::new("custom.toml")), &ConfigOverrides::default())?;
            assert_eq!(config.output, PathBuf::from("custom.csv"));
            Ok(())
        });
    }

    #[test]
    fn invalid_values_are_reported() {
        Jail::expect_with(|jail| {
            jail.set_env("RUSTY_CLEANER_PREVIEW_ROWS", "many");
            assert!(load_config(None, &ConfigOverrides::default()).is_err());
            Ok(())
        });
    }
}
