use crate::colormap::Colormap;
use crate::config::{ChartConfig, RadialOptions, RoseOptions};
use crate::data::{Dataset, WindSample};
use crate::render;
use crate::rose::{RoseTable, SpeedBins};
use crate::sectors::{RadialProfile, SectorAverage, Sectors, sector_averages};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

/// Wind rose and radial chart helper over a borrowed dataset.
///
/// The dataset is only read; every computation works on its own copy of the
/// selected samples.
pub struct WindAnalysis<'a> {
    data: &'a Dataset,
    chart: ChartConfig,
}

/// Both tables computed without drawing.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub n_rows: usize,
    pub rose: RoseTable,
    pub radial: Vec<SectorAverage>,
}

impl<'a> WindAnalysis<'a> {
    pub fn new(data: &'a Dataset) -> Self {
        Self {
            data,
            chart: ChartConfig::default(),
        }
    }

    pub fn with_chart(mut self, chart: ChartConfig) -> Self {
        self.chart = chart;
        self
    }

    /// Normalised (direction, speed bin) frequency table.
    pub fn wind_rose_table(&self, opts: &RoseOptions) -> Result<RoseTable> {
        let bins = SpeedBins::from_option(opts.bins.as_deref()).context("invalid speed bins")?;
        log::debug!("speed bin edges {:?}", bins.edges());
        let samples = self.samples(&opts.speed_col, &opts.dir_col)?;
        RoseTable::new(&samples, &bins, opts.num_sectors)
    }

    /// Mean speed per direction sector, NaN for empty sectors.
    pub fn sector_averages(&self, opts: &RadialOptions) -> Result<Vec<SectorAverage>> {
        let sectors = Sectors::new(opts.num_sectors)?;
        log::debug!("sector edges {:?}", sectors.edges());
        let samples = self.samples(&opts.speed_col, &opts.dir_col)?;
        Ok(sector_averages(&samples, &sectors))
    }

    /// Closed angle and value sequences for the radial chart.
    pub fn radial_profile(&self, opts: &RadialOptions) -> Result<RadialProfile> {
        let averages = self.sector_averages(opts)?;
        RadialProfile::new(&averages)
    }

    pub fn plot_wind_rose<P: AsRef<Path>>(&self, opts: &RoseOptions, file: P) -> Result<()> {
        let cmap = Colormap::from_name(&opts.colormap)?;
        log::debug!("using colormap {}", cmap.name());
        let table = self
            .wind_rose_table(opts)
            .context("failed to compute wind rose table")?;
        log::info!(
            "binned {} samples into {} sectors and {} speed bins",
            table.n_samples,
            table.n_dir,
            table.speed_labels.len()
        );

        let svg = render::wind_rose_svg(&table, &cmap, &self.chart)
            .context("failed to draw wind rose")?;
        write_file(file, svg)
    }

    pub fn plot_radial_bar<P: AsRef<Path>>(&self, opts: &RadialOptions, file: P) -> Result<()> {
        let profile = self
            .radial_profile(opts)
            .context("failed to compute radial profile")?;

        let svg =
            render::radial_bar_svg(&profile, &self.chart).context("failed to draw radial bar")?;
        write_file(file, svg)
    }

    pub fn summarize(&self, rose: &RoseOptions, radial: &RadialOptions) -> Result<Summary> {
        Ok(Summary {
            n_rows: self.data.n_rows(),
            rose: self
                .wind_rose_table(rose)
                .context("failed to compute wind rose table")?,
            radial: self
                .sector_averages(radial)
                .context("failed to compute sector averages")?,
        })
    }

    fn samples(&self, speed_col: &str, dir_col: &str) -> Result<Vec<WindSample>> {
        let samples = self
            .data
            .wind_samples(speed_col, dir_col)
            .context("failed to select samples")?;
        if samples.is_empty() {
            bail!("no data: no rows with both {speed_col:?} and {dir_col:?}");
        }
        Ok(samples)
    }
}

impl Summary {
    pub fn save<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let writer = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(writer);
        serde_json::to_writer_pretty(&mut writer, self).context("failed to serialize summary")?;
        writer.flush().context("failed to flush writer stream")?;
        log::info!("wrote {file:?}");
        Ok(())
    }
}

fn write_file<P: AsRef<Path>>(file: P, contents: String) -> Result<()> {
    let file = file.as_ref();
    fs::write(file, contents).with_context(|| format!("failed to write {file:?}"))?;
    log::info!("wrote {file:?}");
    Ok(())
}
