//! Fixed-width direction sectors and per-sector speed averages.

use crate::data::WindSample;
use crate::stats::{Accumulator, AccumulatorReport};
use anyhow::{Result, bail};
use serde::Serialize;
use std::f64::consts::TAU;

pub const FULL_CIRCLE: f64 = 360.0;

/// Half-open direction interval `[low, high)` in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub low: f64,
    pub high: f64,
    pub label: String,
}

/// Contiguous partition of `[0, 360)` into equal-width sectors.
#[derive(Debug, Clone)]
pub struct Sectors {
    edges: Vec<f64>,
    sectors: Vec<Sector>,
}

impl Sectors {
    pub fn new(num_sectors: usize) -> Result<Self> {
        if num_sectors == 0 {
            bail!("number of sectors must be at least 1");
        }
        let edges: Vec<f64> = (0..=num_sectors)
            .map(|i| FULL_CIRCLE * i as f64 / num_sectors as f64)
            .collect();
        let sectors = edges
            .windows(2)
            .map(|pair| Sector {
                low: pair[0],
                high: pair[1],
                label: format!("{}-{}", pair[0].trunc() as i64, pair[1].trunc() as i64),
            })
            .collect();
        Ok(Self { edges, sectors })
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sector> {
        self.sectors.iter()
    }

    /// Index of the sector containing `direction`.
    ///
    /// Exactly 360 wraps to the first sector. Anything else outside
    /// `[0, 360)` belongs to no sector.
    pub fn index_of(&self, direction: f64) -> Option<usize> {
        if direction == FULL_CIRCLE {
            return Some(0);
        }
        if !(0.0..FULL_CIRCLE).contains(&direction) {
            return None;
        }
        // edges[0] == 0 <= direction, so the partition point is at least 1.
        let i_edge = self.edges.partition_point(|&edge| edge <= direction);
        Some((i_edge - 1).min(self.len() - 1))
    }
}

/// Speed statistics of one direction sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorAverage {
    pub label: String,
    #[serde(flatten)]
    pub stats: AccumulatorReport,
}

impl SectorAverage {
    pub fn mean(&self) -> f64 {
        self.stats.mean
    }
}

/// Per-sector mean speed. Sectors without observations get a NaN mean.
pub fn sector_averages(samples: &[WindSample], sectors: &Sectors) -> Vec<SectorAverage> {
    let mut acc_vec = vec![Accumulator::new(); sectors.len()];
    let mut n_dropped = 0;
    for sample in samples {
        match sectors.index_of(sample.direction) {
            Some(i_sector) => acc_vec[i_sector].add(sample.speed),
            None => n_dropped += 1,
        }
    }
    if n_dropped > 0 {
        log::warn!("dropped {n_dropped} samples with a direction outside [0, 360]");
    }

    sectors
        .iter()
        .zip(&acc_vec)
        .map(|(sector, acc)| {
            log::debug!("sector {}: {} samples", sector.label, acc.count());
            SectorAverage {
                label: sector.label.clone(),
                stats: acc.report(),
            }
        })
        .collect()
}

/// Closed polar sequences for the radial chart.
///
/// `angles` and `values` have one more element than there are sectors, the
/// last repeating the first.
#[derive(Debug, Clone)]
pub struct RadialProfile {
    pub angles: Vec<f64>,
    pub values: Vec<f64>,
    pub labels: Vec<String>,
}

impl RadialProfile {
    pub fn new(averages: &[SectorAverage]) -> Result<Self> {
        if averages.is_empty() {
            bail!("no sectors to plot");
        }
        if averages.iter().all(|avg| avg.mean().is_nan()) {
            bail!("no data: every direction sector is empty");
        }

        let n_sectors = averages.len();
        let mut angles: Vec<f64> = (0..n_sectors)
            .map(|i| TAU * i as f64 / n_sectors as f64)
            .collect();
        let mut values: Vec<f64> = averages.iter().map(SectorAverage::mean).collect();

        angles.push(angles[0]);
        values.push(values[0]);

        Ok(Self {
            angles,
            values,
            labels: averages.iter().map(|avg| avg.label.clone()).collect(),
        })
    }

    pub fn n_sectors(&self) -> usize {
        self.labels.len()
    }

    /// Largest finite value, used to scale the chart.
    pub fn max_value(&self) -> f64 {
        self.values
            .iter()
            .copied()
            .filter(|val| val.is_finite())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(speed: f64, direction: f64) -> WindSample {
        WindSample { speed, direction }
    }

    #[test]
    fn eight_sector_boundaries() {
        let sectors = Sectors::new(8).unwrap();
        assert_eq!(
            sectors.edges(),
            [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0, 360.0]
        );
        let labels: Vec<_> = sectors.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "0-45", "45-90", "90-135", "135-180", "180-225", "225-270", "270-315", "315-360"
            ]
        );
    }

    #[test]
    fn sectors_are_contiguous() {
        let sectors = Sectors::new(7).unwrap();
        let all: Vec<_> = sectors.iter().collect();
        assert_eq!(all[0].low, 0.0);
        assert_eq!(all[6].high, 360.0);
        for pair in all.windows(2) {
            assert_eq!(pair[0].high, pair[1].low);
        }
        assert_eq!(all[1].label, "51-102");
    }

    #[test]
    fn zero_sectors_is_an_error() {
        assert!(Sectors::new(0).is_err());
    }

    #[test]
    fn sector_index_is_half_open() {
        let sectors = Sectors::new(4).unwrap();
        assert_eq!(sectors.index_of(0.0), Some(0));
        assert_eq!(sectors.index_of(89.999), Some(0));
        assert_eq!(sectors.index_of(90.0), Some(1));
        assert_eq!(sectors.index_of(359.9), Some(3));
        assert_eq!(sectors.index_of(360.0), Some(0));
        assert_eq!(sectors.index_of(-1.0), None);
        assert_eq!(sectors.index_of(400.0), None);
    }

    #[test]
    fn four_cardinal_means() {
        let samples = [
            sample(1.0, 0.0),
            sample(2.0, 90.0),
            sample(3.0, 180.0),
            sample(4.0, 270.0),
        ];
        let averages = sector_averages(&samples, &Sectors::new(4).unwrap());
        let pairs: Vec<_> = averages
            .iter()
            .map(|avg| (avg.label.as_str(), avg.mean()))
            .collect();
        assert_eq!(
            pairs,
            [
                ("0-90", 1.0),
                ("90-180", 2.0),
                ("180-270", 3.0),
                ("270-360", 4.0)
            ]
        );
    }

    #[test]
    fn empty_sector_mean_is_nan() {
        let samples = [sample(5.0, 10.0), sample(7.0, 20.0)];
        let averages = sector_averages(&samples, &Sectors::new(8).unwrap());
        assert_eq!(averages[0].mean(), 6.0);
        assert_eq!(averages[0].stats.count, 2);
        for avg in &averages[1..] {
            assert!(avg.mean().is_nan(), "{} should be NaN", avg.label);
            assert_eq!(avg.stats.count, 0);
        }
    }

    #[test]
    fn profile_is_closed() {
        let samples = [sample(1.0, 0.0), sample(2.0, 100.0), sample(3.0, 200.0)];
        let averages = sector_averages(&samples, &Sectors::new(6).unwrap());
        let profile = RadialProfile::new(&averages).unwrap();

        assert_eq!(profile.angles.len(), 7);
        assert_eq!(profile.values.len(), 7);
        assert_eq!(profile.angles[0], profile.angles[6]);
        assert_eq!(profile.values[0], profile.values[6]);
        assert_eq!(profile.n_sectors(), 6);
        assert!((profile.angles[1] - TAU / 6.0).abs() < 1e-12);
        assert_eq!(profile.max_value(), 3.0);
    }

    #[test]
    fn profile_without_data_is_an_error() {
        let averages = sector_averages(&[], &Sectors::new(8).unwrap());
        let error = RadialProfile::new(&averages).unwrap_err();
        assert!(error.to_string().contains("no data"));
    }
}
