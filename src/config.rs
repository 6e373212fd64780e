use crate::colormap::Colormap;
use crate::rose::check_edges;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Tool configuration.
///
/// Every field has a default, so an empty file (or no file at all) is a
/// valid configuration. See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub rose: RoseOptions,
    pub radial: RadialOptions,
    pub chart: ChartConfig,
}

/// Wind rose parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoseOptions {
    /// Wind speed column name.
    pub speed_col: String,
    /// Wind direction column name (degrees).
    pub dir_col: String,
    /// Speed bin edges. Falls back to the default edges when absent.
    pub bins: Option<Vec<f64>>,
    /// Colour scale used for the speed bins.
    pub colormap: String,
    /// Number of direction sectors.
    pub num_sectors: usize,
}

impl Default for RoseOptions {
    fn default() -> Self {
        Self {
            speed_col: "WS".into(),
            dir_col: "WD".into(),
            bins: None,
            colormap: "coolwarm".into(),
            num_sectors: 16,
        }
    }
}

/// Radial sector-average chart parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RadialOptions {
    pub speed_col: String,
    pub dir_col: String,
    pub num_sectors: usize,
}

impl Default for RadialOptions {
    fn default() -> Self {
        Self {
            speed_col: "WS".into(),
            dir_col: "WD".into(),
            num_sectors: 8,
        }
    }
}

/// Output chart size in pixels.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
        }
    }
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.rose.validate().context("invalid rose options")?;
        self.radial.validate().context("invalid radial options")?;

        check_num(self.chart.width, 200..=4000).context("invalid chart width")?;
        check_num(self.chart.height, 200..=4000).context("invalid chart height")?;

        Ok(())
    }
}

impl RoseOptions {
    pub fn validate(&self) -> Result<()> {
        check_col(&self.speed_col).context("invalid speed column")?;
        check_col(&self.dir_col).context("invalid direction column")?;
        if let Some(bins) = &self.bins {
            check_edges(bins).context("invalid speed bins")?;
        }
        Colormap::from_name(&self.colormap)?;
        check_num(self.num_sectors, 1..=360).context("invalid number of sectors")?;
        Ok(())
    }
}

impl RadialOptions {
    pub fn validate(&self) -> Result<()> {
        check_col(&self.speed_col).context("invalid speed column")?;
        check_col(&self.dir_col).context("invalid direction column")?;
        check_num(self.num_sectors, 1..=360).context("invalid number of sectors")?;
        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_col(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("column name must not be empty");
    }
    Ok(())
}
