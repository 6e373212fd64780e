//! Wind rose frequency table.

use crate::data::WindSample;
use crate::sectors::FULL_CIRCLE;
use anyhow::{Result, bail};
use serde::Serialize;

pub const DEFAULT_SPEED_BINS: [f64; 8] = [0.0, 1.0, 2.0, 3.0, 5.0, 10.0, 15.0, 20.0];

/// Speed bin edges. Bin `i` is `[edges[i], edges[i + 1])` and the last bin
/// is open-ended.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedBins {
    edges: Vec<f64>,
}

impl Default for SpeedBins {
    fn default() -> Self {
        Self {
            edges: DEFAULT_SPEED_BINS.to_vec(),
        }
    }
}

impl SpeedBins {
    pub fn new(edges: Vec<f64>) -> Result<Self> {
        check_edges(&edges)?;
        Ok(Self { edges })
    }

    /// Use the given edges, or the default ones if none are supplied.
    pub fn from_option(edges: Option<&[f64]>) -> Result<Self> {
        match edges {
            Some(edges) => Self::new(edges.to_vec()),
            None => Ok(Self::default()),
        }
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Index of the bin containing `speed`, none if below the first edge.
    pub fn index_of(&self, speed: f64) -> Option<usize> {
        let i_edge = self.edges.partition_point(|&edge| edge <= speed);
        i_edge.checked_sub(1)
    }

    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<_> = self
            .edges
            .windows(2)
            .map(|pair| format!("[{} : {})", pair[0], pair[1]))
            .collect();
        if let Some(last) = self.edges.last() {
            labels.push(format!("[{last} : inf)"));
        }
        labels
    }
}

pub fn check_edges(edges: &[f64]) -> Result<()> {
    if edges.is_empty() {
        bail!("speed bins must have at least one edge");
    }
    if edges.iter().any(|edge| !edge.is_finite()) {
        bail!("speed bins must be finite");
    }
    if edges.windows(2).any(|pair| pair[0] >= pair[1]) {
        bail!("speed bins must be strictly increasing, but are {edges:?}");
    }
    Ok(())
}

/// Percentage of observations per (direction sector, speed bin) cell.
///
/// Direction sectors are centred on `360 * k / n`, so sector 0 straddles
/// north.
#[derive(Debug, Clone, Serialize)]
pub struct RoseTable {
    pub n_dir: usize,
    pub speed_labels: Vec<String>,
    /// `freqs[i_dir][i_speed]`, in percent of all binned samples.
    pub freqs: Vec<Vec<f64>>,
    pub n_samples: usize,
}

impl RoseTable {
    pub fn new(samples: &[WindSample], bins: &SpeedBins, n_dir: usize) -> Result<Self> {
        if n_dir == 0 {
            bail!("number of rose sectors must be at least 1");
        }

        let width = FULL_CIRCLE / n_dir as f64;
        let mut counts = vec![vec![0usize; bins.len()]; n_dir];
        let mut n_samples = 0;
        let mut n_dropped = 0;
        for sample in samples {
            let Some(i_dir) = centred_sector(sample.direction, width, n_dir) else {
                n_dropped += 1;
                continue;
            };
            let Some(i_speed) = bins.index_of(sample.speed) else {
                continue;
            };
            counts[i_dir][i_speed] += 1;
            n_samples += 1;
        }
        if n_dropped > 0 {
            log::warn!("dropped {n_dropped} samples with a direction outside [0, 360]");
        }
        if n_samples == 0 {
            bail!("no data: no observation falls in any speed bin");
        }

        let freqs = counts
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&count| 100.0 * count as f64 / n_samples as f64)
                    .collect()
            })
            .collect();

        Ok(Self {
            n_dir,
            speed_labels: bins.labels(),
            freqs,
            n_samples,
        })
    }

    /// Centre angle of a direction sector in degrees.
    pub fn dir_centre(&self, i_dir: usize) -> f64 {
        FULL_CIRCLE * i_dir as f64 / self.n_dir as f64
    }

    pub fn dir_width(&self) -> f64 {
        FULL_CIRCLE / self.n_dir as f64
    }

    /// Total percentage per direction sector.
    pub fn dir_totals(&self) -> Vec<f64> {
        self.freqs.iter().map(|row| row.iter().sum()).collect()
    }
}

fn centred_sector(direction: f64, width: f64, n_dir: usize) -> Option<usize> {
    if !(0.0..=FULL_CIRCLE).contains(&direction) {
        return None;
    }
    let shifted = (direction + width / 2.0).rem_euclid(FULL_CIRCLE);
    Some(((shifted / width) as usize).min(n_dir - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(speed: f64, direction: f64) -> WindSample {
        WindSample { speed, direction }
    }

    #[test]
    fn default_bins() {
        let bins = SpeedBins::from_option(None).unwrap();
        assert_eq!(bins.edges(), [0.0, 1.0, 2.0, 3.0, 5.0, 10.0, 15.0, 20.0]);
    }

    #[test]
    fn custom_bins_are_validated() {
        assert!(SpeedBins::from_option(Some(&[0.0, 4.0, 8.0])).is_ok());
        assert!(SpeedBins::new(vec![0.0, 4.0, 4.0]).is_err());
        assert!(SpeedBins::new(vec![]).is_err());
        assert!(SpeedBins::new(vec![0.0, f64::NAN]).is_err());
    }

    #[test]
    fn speed_bin_lookup() {
        let bins = SpeedBins::new(vec![1.0, 2.0, 5.0]).unwrap();
        assert_eq!(bins.index_of(0.5), None);
        assert_eq!(bins.index_of(1.0), Some(0));
        assert_eq!(bins.index_of(4.99), Some(1));
        assert_eq!(bins.index_of(5.0), Some(2));
        assert_eq!(bins.index_of(50.0), Some(2));
        assert_eq!(bins.labels(), ["[1 : 2)", "[2 : 5)", "[5 : inf)"]);
    }

    #[test]
    fn table_sums_to_one_hundred() {
        let samples = [
            sample(0.5, 0.0),
            sample(4.0, 10.0),
            sample(12.0, 95.0),
            sample(25.0, 350.0),
            sample(2.5, 181.0),
        ];
        let table = RoseTable::new(&samples, &SpeedBins::default(), 16).unwrap();
        let total: f64 = table.dir_totals().iter().sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(table.n_samples, 5);
        assert_eq!(table.freqs.len(), 16);
        assert_eq!(table.freqs[0].len(), 8);
    }

    #[test]
    fn north_sector_straddles_zero() {
        let samples = [
            sample(1.5, 355.0),
            sample(1.5, 5.0),
            sample(1.5, 360.0),
            sample(1.5, 90.0),
        ];
        let table = RoseTable::new(&samples, &SpeedBins::default(), 4).unwrap();
        assert_eq!(table.freqs[0][1], 75.0);
        assert_eq!(table.freqs[1][1], 25.0);
        assert_eq!(table.dir_centre(1), 90.0);
    }

    #[test]
    fn out_of_range_directions_are_not_counted() {
        let samples = [sample(1.5, 400.0), sample(1.5, -5.0), sample(1.5, 90.0)];
        let table = RoseTable::new(&samples, &SpeedBins::default(), 4).unwrap();
        assert_eq!(table.n_samples, 1);
        assert_eq!(table.freqs[1][1], 100.0);
        let total: f64 = table.dir_totals().iter().sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn speeds_below_first_edge_are_not_counted() {
        let samples = [sample(0.5, 0.0), sample(3.0, 0.0)];
        let bins = SpeedBins::new(vec![1.0, 2.0]).unwrap();
        let table = RoseTable::new(&samples, &bins, 8).unwrap();
        assert_eq!(table.n_samples, 1);
        assert_eq!(table.freqs[0], [0.0, 100.0]);
    }

    #[test]
    fn table_without_data_is_an_error() {
        let error = RoseTable::new(&[], &SpeedBins::default(), 16).unwrap_err();
        assert!(error.to_string().contains("no data"));
    }
}
