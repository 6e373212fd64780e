use anyhow::{Context, Result, anyhow, bail};
use std::{collections::HashMap, fs::File, io::Read, path::Path};

/// Cell spellings treated as a missing value.
const MISSING_TOKENS: [&str; 6] = ["", "nan", "na", "n/a", "null", "none"];

/// Table of named columns.
///
/// Missing cells are stored as NaN. The table is never modified once built;
/// every operation on it works on copies of the selected columns.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    names: Vec<String>,
    columns: HashMap<String, Column>,
    n_rows: usize,
}

#[derive(Debug, Clone)]
enum Column {
    Numeric(Vec<f64>),
    /// First cell that is not a number. The rest of the column is not kept.
    Text { cell: String, line: usize },
}

/// A single observation with both speed and direction present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSample {
    pub speed: f64,
    pub direction: f64,
}

impl Dataset {
    /// Build a dataset from `(name, values)` pairs of equal length.
    pub fn from_columns<S, I>(columns: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Vec<f64>)>,
    {
        let mut dataset = Self::default();
        for (name, vals) in columns {
            let name = name.into();
            if dataset.columns.is_empty() {
                dataset.n_rows = vals.len();
            } else if vals.len() != dataset.n_rows {
                bail!(
                    "column {name:?} has {} rows, but the dataset has {}",
                    vals.len(),
                    dataset.n_rows
                );
            }
            dataset.insert(name, Column::Numeric(vals))?;
        }
        Ok(dataset)
    }

    /// Load a dataset from a CSV file with a header row.
    pub fn from_csv_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let reader = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        Self::from_csv_reader(reader).with_context(|| format!("failed to parse {file:?}"))
    }

    /// Load a dataset from any CSV source with a header row.
    ///
    /// Cells that are empty or spell a missing value (`NaN`, `NA`, `null`, ...)
    /// become NaN. Columns holding other text (timestamps, comments) load
    /// fine; requesting one of them is an error naming its first bad cell.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let names: Vec<String> = reader
            .headers()
            .context("failed to read CSV headers")?
            .iter()
            .map(str::to_owned)
            .collect();

        let mut col_vec = vec![Column::Numeric(Vec::new()); names.len()];
        let mut n_rows = 0;
        for (idx, record) in reader.records().enumerate() {
            // Header is line 1.
            let line = idx + 2;
            let record = record.with_context(|| format!("failed to read line {line}"))?;
            for (i_col, column) in col_vec.iter_mut().enumerate() {
                let Column::Numeric(vals) = column else {
                    continue;
                };
                let cell = record.get(i_col).unwrap_or("");
                match parse_cell(cell) {
                    Ok(val) => vals.push(val),
                    Err(_) => {
                        log::debug!("column {:?} is not numeric (line {line})", names[i_col]);
                        *column = Column::Text {
                            cell: cell.to_owned(),
                            line,
                        };
                    }
                }
            }
            n_rows += 1;
        }

        let mut dataset = Self {
            n_rows,
            ..Self::default()
        };
        for (name, column) in names.into_iter().zip(col_vec) {
            dataset.insert(name, column)?;
        }
        Ok(dataset)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Values of the named column, NaN where missing.
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        match self.columns.get(name) {
            Some(Column::Numeric(vals)) => Ok(vals),
            Some(Column::Text { cell, line }) => Err(anyhow!("{cell:?} is not a number")
                .context(format!("invalid value in column {name:?} at line {line}"))),
            None => bail!(
                "column {name:?} not found (available columns: {:?})",
                self.names
            ),
        }
    }

    /// Pair up the speed and direction columns, dropping rows where either
    /// value is missing.
    pub fn wind_samples(&self, speed_col: &str, dir_col: &str) -> Result<Vec<WindSample>> {
        let speeds = self.column(speed_col)?;
        let directions = self.column(dir_col)?;
        let samples: Vec<_> = speeds
            .iter()
            .zip(directions)
            .filter(|(speed, direction)| speed.is_finite() && direction.is_finite())
            .map(|(&speed, &direction)| WindSample { speed, direction })
            .collect();
        log::debug!(
            "kept {} of {} rows with both {speed_col:?} and {dir_col:?}",
            samples.len(),
            self.n_rows
        );
        Ok(samples)
    }

    fn insert(&mut self, name: String, column: Column) -> Result<()> {
        if self.columns.insert(name.clone(), column).is_some() {
            bail!("duplicate column {name:?}");
        }
        self.names.push(name);
        Ok(())
    }
}

fn parse_cell(cell: &str) -> Result<f64> {
    if MISSING_TOKENS
        .iter()
        .any(|token| cell.eq_ignore_ascii_case(token))
    {
        return Ok(f64::NAN);
    }
    cell.parse()
        .with_context(|| format!("{cell:?} is not a number"))
}
