//! Band normalization to 8-bit grayscale.

use rayon::prelude::*;

/// Minimum samples to benefit from a parallel min/max pass
const PARALLEL_THRESHOLD: usize = 65_536; // 256x256 or larger

/// Rescale a band of samples to 8-bit grayscale.
///
/// Linear min/max stretch: the minimum sample maps to 0, the maximum to
/// 255, values in between scale proportionally. A constant band (or one
/// with no finite samples) produces an all-zero grid. NaN samples are
/// excluded from the range and map to 0.
///
/// Pure and deterministic: identical input yields identical output.
pub fn normalize_band(samples: &[f64]) -> Vec<u8> {
    let (min, max) = if samples.len() >= PARALLEL_THRESHOLD {
        sample_range_parallel(samples)
    } else {
        sample_range(samples)
    };

    if !min.is_finite() || !max.is_finite() || max <= min {
        return vec![0u8; samples.len()];
    }

    let span = max - min;
    samples
        .iter()
        .map(|&v| {
            if v.is_nan() {
                0
            } else {
                (((v - min) / span * 255.0).round()).clamp(0.0, 255.0) as u8
            }
        })
        .collect()
}

fn sample_range(samples: &[f64]) -> (f64, f64) {
    samples
        .iter()
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
            (min.min(v), max.max(v))
        })
}

fn sample_range_parallel(samples: &[f64]) -> (f64, f64) {
    samples
        .par_iter()
        .filter(|v| !v.is_nan())
        .fold(
            || (f64::INFINITY, f64::NEG_INFINITY),
            |(min, max), &v| (min.min(v), max.max(v)),
        )
        .reduce(
            || (f64::INFINITY, f64::NEG_INFINITY),
            |(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_band_is_all_zero() {
        let out = normalize_band(&[7.5; 100]);
        assert_eq!(out, vec![0u8; 100]);
    }

    #[test]
    fn test_min_maps_to_zero_max_to_255() {
        let out = normalize_band(&[10.0, 60.0, 110.0]);
        assert_eq!(out[0], 0);
        assert_eq!(out[1], 128); // round(0.5 * 255)
        assert_eq!(out[2], 255);
    }

    #[test]
    fn test_monotonic_in_sample_value() {
        let samples: Vec<f64> = (0..1000).map(|i| (i as f64).sqrt()).collect();
        let out = normalize_band(&samples);
        for w in out.windows(2) {
            assert!(w[1] >= w[0]);
        }
        assert_eq!(out[0], 0);
        assert_eq!(*out.last().unwrap(), 255);
    }

    #[test]
    fn test_negative_range() {
        let out = normalize_band(&[-50.0, 0.0, 50.0]);
        assert_eq!(out, vec![0, 128, 255]);
    }

    #[test]
    fn test_nan_samples_map_to_zero() {
        let out = normalize_band(&[f64::NAN, 1.0, 2.0]);
        assert_eq!(out, vec![0, 0, 255]);
    }

    #[test]
    fn test_all_nan_is_all_zero() {
        let out = normalize_band(&[f64::NAN; 8]);
        assert_eq!(out, vec![0u8; 8]);
    }

    #[test]
    fn test_empty_band() {
        assert!(normalize_band(&[]).is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let samples: Vec<f64> = (0..PARALLEL_THRESHOLD + 17)
            .map(|i| ((i * 31) % 977) as f64 - 100.0)
            .collect();
        let parallel = normalize_band(&samples);
        let sequential: Vec<u8> = {
            let (min, max) = sample_range(&samples);
            let span = max - min;
            samples
                .iter()
                .map(|&v| (((v - min) / span * 255.0).round()).clamp(0.0, 255.0) as u8)
                .collect()
        };
        assert_eq!(parallel, sequential);
    }
}
