use serde::Serialize;

/// Running mean and variance (Welford's algorithm).
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccumulatorReport {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    pub fn count(&self) -> usize {
        self.n_vals
    }

    /// Mean of the added values, NaN if nothing was added.
    pub fn mean(&self) -> f64 {
        if self.n_vals == 0 {
            f64::NAN
        } else {
            self.mean
        }
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            count: self.n_vals,
            mean: self.mean(),
            std_dev: if self.n_vals > 1 {
                (self.diff_2_sum / (self.n_vals as f64 - 1.0)).sqrt()
            } else {
                f64::NAN
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_accumulator_is_nan() {
        let acc = Accumulator::new();
        let report = acc.report();
        assert_eq!(report.count, 0);
        assert!(report.mean.is_nan());
        assert!(report.std_dev.is_nan());
    }

    #[test]
    fn mean_and_std_dev() {
        let mut acc = Accumulator::new();
        for val in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            acc.add(val);
        }
        let report = acc.report();
        assert_eq!(report.count, 8);
        assert!((report.mean - 5.0).abs() < 1e-12);
        assert!((report.std_dev - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn single_value_has_no_std_dev() {
        let mut acc = Accumulator::new();
        acc.add(3.5);
        assert_eq!(acc.mean(), 3.5);
        assert!(acc.report().std_dev.is_nan());
    }
}
