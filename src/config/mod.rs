use crate::models::{CarouselConfig, CarouselFile};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// File name of the carousel configuration inside the config directory
pub const CONFIG_FILE_NAME: &str = "Carousel.yaml";

/// Prefix of environment variables overriding `carousel:` keys
/// (e.g. `HERO_CAROUSEL_INTERVAL_MS=6000`)
pub const ENV_PREFIX: &str = "HERO_CAROUSEL";

/// Configuration manager for loading and saving `Carousel.yaml`.
///
/// The file holds the behavior options (`carousel:`) and the slide deck
/// (`slides:`). Environment variables can override individual options on top
/// of the file.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing `Carousel.yaml`; created if missing
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load the configuration file.
    ///
    /// # Returns
    /// The loaded file, or defaults plus the default deck if it doesn't exist
    pub fn load(&self) -> Result<CarouselFile> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Carousel config not found at {}, using defaults",
                self.config_path
            );
            return Ok(CarouselFile::default());
        }

        let file_contents = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read carousel config: {}", self.config_path))?;

        let file: CarouselFile = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse carousel config: {}", self.config_path))?;

        tracing::info!(
            "Loaded carousel config from {} ({} slides)",
            self.config_path,
            file.slides.len()
        );
        Ok(file)
    }

    /// Save the configuration file.
    pub fn save(&self, file: &CarouselFile) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(file).context("Failed to serialize carousel config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write carousel config: {}", self.config_path))?;

        tracing::info!("Saved carousel config to {}", self.config_path);
        Ok(())
    }

    /// Load the file, apply `HERO_CAROUSEL_*` environment overrides and validate.
    pub fn load_with_env(&self) -> Result<CarouselFile> {
        self.load_with_overrides(None)
    }

    /// Like [`load_with_env`](Self::load_with_env), reading overrides from `env`
    /// instead of the process environment when given.
    ///
    /// Keys are full variable names, e.g. `HERO_CAROUSEL_AUTOPLAY`.
    pub fn load_with_overrides(
        &self,
        env: Option<config::Map<String, String>>,
    ) -> Result<CarouselFile> {
        let mut file = self.load()?;

        let layered = config::Config::builder()
            .add_source(
                config::Config::try_from(&file.carousel)
                    .context("Failed to convert carousel config")?,
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .context("Failed to apply environment overrides")?;

        let carousel: CarouselConfig = layered
            .try_deserialize()
            .context("Invalid carousel config after environment overrides")?;
        carousel
            .validate()
            .with_context(|| format!("Invalid carousel config in {}", self.config_path))?;

        if carousel != file.carousel {
            tracing::info!("Environment overrides applied to carousel config");
        }
        file.carousel = carousel;
        Ok(file)
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}
