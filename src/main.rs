mod analysis;
mod colormap;
mod config;
mod data;
mod render;
mod rose;
mod sectors;
mod stats;

use crate::analysis::WindAnalysis;
use crate::config::Config;
use crate::data::Dataset;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// CSV file with one observation per row.
    #[arg(long)]
    data: PathBuf,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct Columns {
    #[arg(long)]
    speed_col: Option<String>,

    #[arg(long)]
    dir_col: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Draw a wind rose.
    Rose {
        #[arg(long)]
        output: PathBuf,

        #[command(flatten)]
        columns: Columns,

        /// Speed bin edges, e.g. `0,2,4,8`.
        #[arg(long, value_delimiter = ',')]
        bins: Option<Vec<f64>>,

        #[arg(long)]
        colormap: Option<String>,

        #[arg(long)]
        num_sectors: Option<usize>,
    },

    /// Draw the mean wind speed per direction sector.
    Radial {
        #[arg(long)]
        output: PathBuf,

        #[command(flatten)]
        columns: Columns,

        #[arg(long)]
        num_sectors: Option<usize>,
    },

    /// Write both tables as JSON.
    Summary {
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mut cfg = match &args.config {
        Some(file) => Config::from_file(file).context("failed to construct cfg")?,
        None => Config::default(),
    };

    let dataset = Dataset::from_csv_file(&args.data).context("failed to load dataset")?;
    log::info!(
        "loaded {} rows with columns {:?}",
        dataset.n_rows(),
        dataset.column_names()
    );
    let analysis = WindAnalysis::new(&dataset).with_chart(cfg.chart);

    match args.command {
        Command::Rose {
            output,
            columns,
            bins,
            colormap,
            num_sectors,
        } => {
            let opts = &mut cfg.rose;
            override_columns(&mut opts.speed_col, &mut opts.dir_col, columns);
            if bins.is_some() {
                opts.bins = bins;
            }
            if let Some(colormap) = colormap {
                opts.colormap = colormap;
            }
            if let Some(num_sectors) = num_sectors {
                opts.num_sectors = num_sectors;
            }
            opts.validate().context("invalid rose options")?;
            log::info!("{opts:#?}");

            analysis
                .plot_wind_rose(opts, output)
                .context("failed to plot wind rose")?;
        }
        Command::Radial {
            output,
            columns,
            num_sectors,
        } => {
            let opts = &mut cfg.radial;
            override_columns(&mut opts.speed_col, &mut opts.dir_col, columns);
            if let Some(num_sectors) = num_sectors {
                opts.num_sectors = num_sectors;
            }
            opts.validate().context("invalid radial options")?;
            log::info!("{opts:#?}");

            analysis
                .plot_radial_bar(opts, output)
                .context("failed to plot radial bar")?;
        }
        Command::Summary { output } => {
            analysis
                .summarize(&cfg.rose, &cfg.radial)
                .context("failed to summarize")?
                .save(output)
                .context("failed to save summary")?;
        }
    }

    Ok(())
}

fn override_columns(speed_col: &mut String, dir_col: &mut String, columns: Columns) {
    if let Some(col) = columns.speed_col {
        *speed_col = col;
    }
    if let Some(col) = columns.dir_col {
        *dir_col = col;
    }
}
