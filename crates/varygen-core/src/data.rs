use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::resources::EconomyConfig;

const ECONOMY_FILE: &str = "economy.toml";

/// Data loader for economy configuration files
pub struct DataLoader;

impl DataLoader {
    /// Load all data from a directory, falling back to defaults for
    /// missing files
    pub fn load_from_directory<P: AsRef<Path>>(data_dir: P) -> Result<EconomyConfig> {
        let economy_path = data_dir.as_ref().join(ECONOMY_FILE);
        if !economy_path.exists() {
            log::info!(
                "No {} in {:?}, using default economy config",
                ECONOMY_FILE,
                data_dir.as_ref()
            );
            return Ok(EconomyConfig::default());
        }

        Self::load_economy(&economy_path)
    }

    pub fn load_economy<P: AsRef<Path>>(path: P) -> Result<EconomyConfig> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: EconomyConfig =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

        config.validate()?;

        log::info!(
            "Loaded economy config: starting money ${:.2}, mediation fee ${:.2}-${:.2}",
            config.starting_money,
            config.mediation_fee_min,
            config.mediation_fee_max
        );
        Ok(config)
    }
}

/// Create default data files for a new project
pub fn create_default_data_files<P: AsRef<Path>>(data_dir: P) -> Result<()> {
    let data_path = data_dir.as_ref();
    fs::create_dir_all(data_path)?;

    let economy_content = toml::to_string_pretty(&EconomyConfig::default())?;
    fs::write(data_path.join(ECONOMY_FILE), economy_content)?;

    log::info!("Created default data files in {:?}", data_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_and_load_default_data() {
        let temp_dir = TempDir::new().unwrap();
        let data_path = temp_dir.path().join("data");

        create_default_data_files(&data_path).unwrap();
        let config = DataLoader::load_from_directory(&data_path).unwrap();

        assert_eq!(config, EconomyConfig::default());
    }

    #[test]
    fn test_missing_directory_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = DataLoader::load_from_directory(temp_dir.path().join("nowhere")).unwrap();
        assert_eq!(config.mediation_fee_max, 500.0);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(ECONOMY_FILE), "starting_money = 2500.0\n").unwrap();

        let config = DataLoader::load_from_directory(temp_dir.path()).unwrap();
        assert_eq!(config.starting_money, 2500.0);
        assert_eq!(config.mediation_fee_min, 100.0);
    }

    #[test]
    fn test_invalid_fee_band_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(ECONOMY_FILE),
            "mediation_fee_min = 800.0\nmediation_fee_max = 200.0\n",
        )
        .unwrap();

        assert!(DataLoader::load_from_directory(temp_dir.path()).is_err());
    }
}
