//! Fixed-width histogram of a per-particle scalar
//!
//! Companion chart data for the 3D view: `bin_extents` holds bin centers,
//! `bin_values` the counts.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::data::MassRange;
use super::error::{MapError, MapResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub range: [f64; 2],
    pub bin_extents: Vec<f64>,
    pub bin_values: Vec<u64>,
}

impl Histogram {
    /// Bin `values` into `bins` equal buckets over `range`
    ///
    /// Without a custom range the data min/max is used. Values outside a
    /// custom range are dropped; the upper bound falls into the last bin.
    pub fn build<I>(values: I, bins: usize, range: Option<[f64; 2]>) -> MapResult<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        if bins == 0 {
            return Err(MapError::InvalidParameter(
                "histogram needs at least one bin".to_string(),
            ));
        }

        let values: Vec<f64> = values.into_iter().collect();

        let [lo, hi] = match range {
            Some([lo, hi]) if lo.is_finite() && hi.is_finite() && lo <= hi => [lo, hi],
            Some([lo, hi]) => {
                return Err(MapError::InvalidParameter(format!(
                    "histogram range [{}, {}] is not a finite ascending interval",
                    lo, hi
                )))
            }
            None => MassRange::from_values(values.iter().copied())
                .map(|r| [r.min, r.max])
                .unwrap_or([0.0, 0.0]),
        };

        let width = (hi - lo) / bins as f64;
        let bin_extents = (0..bins)
            .map(|i| lo + width * (i as f64 + 0.5))
            .collect();

        let mut bin_values = vec![0u64; bins];
        let mut dropped = 0usize;
        for v in values {
            if v < lo || v > hi {
                dropped += 1;
                continue;
            }
            let idx = if width > 0.0 {
                (((v - lo) / width) as usize).min(bins - 1)
            } else {
                0
            };
            bin_values[idx] += 1;
        }

        trace!(bins, lo, hi, dropped, "Histogram built");

        Ok(Self {
            range: [lo, hi],
            bin_extents,
            bin_values,
        })
    }

    pub fn total(&self) -> u64 {
        self.bin_values.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_range_bins() {
        let h = Histogram::build([0.0, 1.0, 2.0, 3.0, 4.0], 4, None).unwrap();
        assert_eq!(h.range, [0.0, 4.0]);
        assert_eq!(h.bin_extents, vec![0.5, 1.5, 2.5, 3.5]);
        // 4.0 is the upper bound and lands in the last bin
        assert_eq!(h.bin_values, vec![1, 1, 1, 2]);
        assert_eq!(h.total(), 5);
    }

    #[test]
    fn test_custom_range_drops_outliers() {
        let values = [-1.0, 0.0, 52.5, 105.0, 200.0];
        let h = Histogram::build(values, 2, Some([0.0, 105.0])).unwrap();
        assert_eq!(h.bin_values, vec![1, 2]);
        assert_eq!(h.total(), 3);
    }

    #[test]
    fn test_uniform_values_single_bin() {
        let h = Histogram::build([7.0, 7.0, 7.0], 3, None).unwrap();
        assert_eq!(h.bin_values, vec![3, 0, 0]);
        assert_eq!(h.bin_extents, vec![7.0, 7.0, 7.0]);
    }

    #[test]
    fn test_empty_values() {
        let h = Histogram::build(Vec::new(), 2, None).unwrap();
        assert_eq!(h.total(), 0);
        assert_eq!(h.bin_values.len(), 2);
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(matches!(
            Histogram::build([1.0], 0, None),
            Err(MapError::InvalidParameter(_))
        ));
        assert!(matches!(
            Histogram::build([1.0], 2, Some([5.0, 1.0])),
            Err(MapError::InvalidParameter(_))
        ));
    }
}
