use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use city_builder_catalog::Catalog;
use city_builder_core::SimulationConfig;
use city_builder_world::{persist, City};
use tracing::info;

/// Save file used when `--save` is not provided.
pub(crate) const DEFAULT_SAVE_PATH: &str = "city_builder_saves/city_save.json";

/// City loaded from disk together with the file it is saved to.
#[derive(Debug)]
pub(crate) struct Session {
    path: PathBuf,
    city: City,
}

impl Session {
    /// Starts a fresh city to be saved at `path`, ignoring any existing save.
    pub(crate) fn fresh(
        path: &Path,
        config_path: Option<&Path>,
        catalog_path: Option<&Path>,
    ) -> Result<Self> {
        let (config, catalog) = load_settings(config_path, catalog_path)?;
        Ok(Self {
            path: path.to_path_buf(),
            city: City::with_catalog(config, catalog),
        })
    }

    /// Loads settings and catalog, then the city stored at `path`.
    ///
    /// A missing save file yields a fresh city.
    pub(crate) fn open(
        path: &Path,
        config_path: Option<&Path>,
        catalog_path: Option<&Path>,
    ) -> Result<Self> {
        let (config, catalog) = load_settings(config_path, catalog_path)?;
        let city = match fs::read_to_string(path) {
            Ok(json) => {
                let report = persist::load(&json, config, catalog)
                    .with_context(|| format!("failed to load save file {}", path.display()))?;
                if !report.skipped.is_empty() {
                    info!(
                        skipped = report.skipped.len(),
                        "save file loaded with skipped buildings"
                    );
                }
                report.city
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no save file found, starting a new city");
                City::with_catalog(config, catalog)
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("failed to read save file {}", path.display()));
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            city,
        })
    }

    pub(crate) fn city(&self) -> &City {
        &self.city
    }

    pub(crate) fn city_mut(&mut self) -> &mut City {
        &mut self.city
    }

    /// Writes the city to the save file, creating parent directories.
    pub(crate) fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create save directory {}", parent.display())
                })?;
            }
        }
        let json = persist::save(&self.city).context("failed to encode city")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write save file {}", self.path.display()))?;
        info!(path = %self.path.display(), "city saved");
        Ok(())
    }
}

fn load_settings(
    config_path: Option<&Path>,
    catalog_path: Option<&Path>,
) -> Result<(SimulationConfig, Arc<Catalog>)> {
    let config = match config_path {
        Some(config_path) => load_config(config_path)?,
        None => SimulationConfig::default(),
    };
    let catalog = match catalog_path {
        Some(catalog_path) => Arc::new(load_catalog(catalog_path)?),
        None => Catalog::standard(),
    };
    Ok((config, catalog))
}

fn load_config(path: &Path) -> Result<SimulationConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog manifest {}", path.display()))?;
    Catalog::from_toml_str(&contents)
        .with_context(|| format!("invalid catalog manifest {}", path.display()))
}
