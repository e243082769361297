use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tally_core::{ConfigError, Institution, NormalizationTable};
use tally_ingest::Pipeline;

use crate::state::default_credentials_path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Which institution section drives the run (e.g. "capitalOne")
    #[serde(alias = "serviceNameConfigKey")]
    pub institution: String,
    #[serde(default, alias = "sheetId")]
    pub sheet_id: String,
    #[serde(default = "default_sheet_title", alias = "sheetTitle")]
    pub sheet_title: String,
    /// Defaults to ~/.tally/service_account.json
    #[serde(default, alias = "apiCredsPath", skip_serializing_if = "Option::is_none")]
    pub credentials_path: Option<PathBuf>,
    #[serde(default = "default_output_dir", alias = "outputDir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub institutions: BTreeMap<String, InstitutionSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstitutionSection {
    #[serde(default, alias = "csvPath", skip_serializing_if = "Option::is_none")]
    pub csv_path: Option<PathBuf>,
    #[serde(default, alias = "headerNormalization")]
    pub header_normalization: BTreeMap<String, String>,
    #[serde(default)]
    pub categorize: BTreeMap<String, String>,
}

impl InstitutionSection {
    pub fn table(&self) -> NormalizationTable {
        NormalizationTable {
            header_normalization: self.header_normalization.clone(),
            categorize: self.categorize.clone(),
        }
    }
}

fn default_sheet_title() -> String {
    "Transactions".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn owned(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn starter_section(
    csv_path: &str,
    headers: &[(&str, &str)],
    categories: &[(&str, &str)],
) -> InstitutionSection {
    InstitutionSection {
        csv_path: Some(PathBuf::from(csv_path)),
        header_normalization: owned(headers),
        categorize: owned(categories),
    }
}

impl Default for Config {
    fn default() -> Self {
        let capital_one = starter_section(
            "capital_one.csv",
            &[
                ("Transaction Date", "Timestamp"),
                ("Posted Date", "Posted"),
                ("Card No.", "Card"),
                ("Description", "Item"),
                ("Category", "Category"),
                ("Debit", "Debit"),
                ("Credit", "Credit"),
            ],
            &[
                ("Dining", "Food & Drink"),
                ("Grocery", "Groceries"),
                ("Gas/Automotive", "Transportation"),
                ("Merchandise", "Shopping"),
                ("Payment/Credit", "Payment"),
            ],
        );
        let schwab = starter_section(
            "schwab.csv",
            &[
                ("Date", "Timestamp"),
                ("Type", "Type"),
                ("Description", "Item"),
                ("Withdrawal (-)", "Debit"),
                ("Deposit (+)", "Credit"),
                ("RunningBalance", "Category"),
            ],
            &[("Grocery Store", "Groceries")],
        );

        Self {
            institution: Institution::CapitalOne.key().to_string(),
            sheet_id: String::new(),
            sheet_title: default_sheet_title(),
            credentials_path: None,
            output_dir: default_output_dir(),
            institutions: BTreeMap::from([
                (Institution::CapitalOne.key().to_string(), capital_one),
                (Institution::Schwab.key().to_string(), schwab),
            ]),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct SyncOverrides {
    pub institution: Option<String>,
    pub csv: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub no_upload: bool,
}

/// Where the sink appends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTarget {
    pub spreadsheet_id: String,
    pub sheet_title: String,
    pub credentials_path: PathBuf,
}

/// A fully validated run.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub pipeline: Pipeline,
    /// `None` when uploading is disabled
    pub upload: Option<SheetTarget>,
}

impl Config {
    pub fn tables(&self) -> BTreeMap<String, NormalizationTable> {
        self.institutions
            .iter()
            .map(|(k, s)| (k.clone(), s.table()))
            .collect()
    }

    /// Validate everything a sync needs before any row is read.
    pub fn plan(&self, overrides: &SyncOverrides) -> Result<SyncPlan, ConfigError> {
        let key = overrides.institution.as_deref().unwrap_or(&self.institution);
        let institution: Institution = key.parse()?;

        let section = self
            .institutions
            .get(institution.key())
            .ok_or_else(|| ConfigError::MissingTable(institution.key().to_string()))?;

        let csv_path = overrides
            .csv
            .clone()
            .or_else(|| section.csv_path.clone())
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "no csv_path configured for '{}' (pass --csv <path>)",
                    institution
                ))
            })?;
        let output_dir = overrides
            .output_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.clone());

        let pipeline = Pipeline::new(institution.key(), &self.tables(), csv_path, output_dir)?;

        let upload = if overrides.no_upload {
            None
        } else {
            Some(self.sheet_target()?)
        };

        Ok(SyncPlan { pipeline, upload })
    }

    fn sheet_target(&self) -> Result<SheetTarget, ConfigError> {
        if self.sheet_id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "sheet_id is empty (set it in the config or pass --no-upload)".to_string(),
            ));
        }
        if self.sheet_title.trim().is_empty() {
            return Err(ConfigError::Invalid("sheet_title is empty".to_string()));
        }

        let credentials_path = self
            .credentials_path
            .clone()
            .ok_or_else(|| ConfigError::Invalid("credentials_path is not set".to_string()))?;
        if !credentials_path.is_file() {
            return Err(ConfigError::MissingCredentials(credentials_path));
        }

        Ok(SheetTarget {
            spreadsheet_id: self.sheet_id.trim().to_string(),
            sheet_title: self.sheet_title.clone(),
            credentials_path,
        })
    }
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

/// Read the config at `path`, falling back to defaults when the file is missing.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut cfg = if path.exists() {
        let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        parse_config(&s).with_context(|| format!("in {}", path.display()))?
    } else {
        Config::default()
    };

    if cfg.credentials_path.is_none() {
        cfg.credentials_path = Some(default_credentials_path()?);
    }
    Ok(cfg)
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config already exists: {}", path.display());
        return Ok(());
    }
    save_config(path, &Config::default())?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
institution = "schwab"
sheetId = "abc123"
sheet_title = "2023"

[institutions.schwab]
csvPath = "schwab.csv"

[institutions.schwab.headerNormalization]
"Date" = "Timestamp"
"Description" = "Item"

[institutions.schwab.categorize]
"Grocery Store" = "Food"
"#;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let p = dir.join(name);
        fs::write(&p, body).unwrap();
        p
    }

    fn config_in(dir: &Path) -> Config {
        let mut cfg = parse_config(SAMPLE).unwrap();
        cfg.credentials_path = Some(write(dir, "creds.json", "{}"));
        cfg.output_dir = dir.to_path_buf();
        cfg
    }

    #[test]
    fn test_parse_accepts_original_key_names() {
        let cfg = parse_config(SAMPLE).unwrap();
        assert_eq!(cfg.institution, "schwab");
        assert_eq!(cfg.sheet_id, "abc123");
        assert_eq!(cfg.sheet_title, "2023");
        assert_eq!(cfg.output_dir, PathBuf::from("."));

        let tables = cfg.tables();
        let table = &tables["schwab"];
        assert_eq!(table.canonical_key("Description"), Some("Item"));
        assert_eq!(table.category("Grocery Store"), Some("Food"));
    }

    #[test]
    fn test_default_config_survives_toml_round_trip() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        let cfg = parse_config(&s).unwrap();
        assert_eq!(cfg.institution, "capitalOne");
        assert_eq!(cfg.institutions.len(), 2);
        assert_eq!(
            cfg.tables()["schwab"].canonical_key("RunningBalance"),
            Some("Category")
        );
    }

    #[test]
    fn test_plan_resolves_paths_and_target() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        let csv = write(dir.path(), "march.csv", "Date\n");

        let plan = cfg
            .plan(&SyncOverrides {
                csv: Some(csv.clone()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(plan.pipeline.institution(), Institution::Schwab);
        assert_eq!(plan.pipeline.input(), csv.as_path());
        assert_eq!(plan.pipeline.artifact_path(), dir.path().join("march_transformed.csv"));

        let target = plan.upload.unwrap();
        assert_eq!(target.spreadsheet_id, "abc123");
        assert_eq!(target.sheet_title, "2023");
    }

    #[test]
    fn test_plan_rejects_unknown_institution_override() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());

        let err = cfg
            .plan(&SyncOverrides {
                institution: Some("chase".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownInstitution { .. }));
    }

    #[test]
    fn test_plan_requires_table_for_institution() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());

        let err = cfg
            .plan(&SyncOverrides {
                institution: Some("capitalOne".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingTable(_)));
    }

    #[test]
    fn test_missing_credentials_only_matter_when_uploading() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config_in(dir.path());
        cfg.credentials_path = Some(dir.path().join("absent.json"));
        let csv = write(dir.path(), "schwab.csv", "Date\n");

        let overrides = SyncOverrides {
            csv: Some(csv),
            ..Default::default()
        };
        let err = cfg.plan(&overrides).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials(_)));

        let plan = cfg
            .plan(&SyncOverrides {
                no_upload: true,
                ..overrides
            })
            .unwrap();
        assert!(plan.upload.is_none());
    }

    #[test]
    fn test_empty_sheet_id_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config_in(dir.path());
        cfg.sheet_id = "  ".to_string();
        let csv = write(dir.path(), "schwab.csv", "Date\n");

        let err = cfg
            .plan(&SyncOverrides {
                csv: Some(csv),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
