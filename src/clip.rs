//! Percentile-based clipping of per-vertex data.
//!
//! Morphometry data often contains a few extreme values, e.g., at the medial wall. These have a large
//! impact on the color map, making all values of interest look very similar. Clipping them to
//! percentile values before colorization keeps the plot readable.

use ndarray::Array1;
use ndarray_stats::{interpolate::Linear, Quantile1dExt};
use noisy_float::types::{n64, N64};
use tracing::debug;

use crate::error::{BrainviewError, Result};
use crate::util::ensure_finite;

pub const DEFAULT_CLIP_LOWER: f32 = 5.0;
pub const DEFAULT_CLIP_UPPER: f32 = 95.0;


fn check_percentile(q: f32) -> Result<()> {
    if !(0.0..=100.0).contains(&q) {
        return Err(BrainviewError::invalid_argument(format!(
            "Percentile must be in range [0, 100], but is {}.",
            q
        )));
    }
    Ok(())
}


fn quantile_of(arr: &mut Array1<N64>, q: f32) -> Result<f32> {
    let value = arr
        .quantile_mut(n64(f64::from(q) / 100.0), &Linear)
        .map_err(|e| BrainviewError::invalid_argument(format!("Cannot compute percentile {}: {:?}", q, e)))?;
    Ok(value.raw() as f32)
}


fn to_noisy_array(data: &[f32]) -> Result<Array1<N64>> {
    if data.is_empty() {
        return Err(BrainviewError::invalid_argument("Percentile is undefined for empty data."));
    }
    ensure_finite(data, "data")?;
    Ok(data.iter().map(|&v| n64(f64::from(v))).collect())
}


/// Compute the value at the given percentile `q` (in range `[0, 100]`) of the data, using linear interpolation between
/// the closest ranks.
///
/// # Examples
///
/// ```
/// let p = brainview::percentile(&[1.0, 2.0, 3.0, 4.0, 5.0], 50.0).unwrap();
/// assert_eq!(3.0, p);
/// ```
pub fn percentile(data: &[f32], q: f32) -> Result<f32> {
    check_percentile(q)?;
    let mut arr = to_noisy_array(data)?;
    quantile_of(&mut arr, q)
}


/// Clip data at given percentiles.
///
/// Computes the values at the `lower` and `upper` percentiles, then sets all values which are more extreme to
/// the respective percentile value. Values in between are returned unchanged. The input is not modified.
///
/// # Errors
///
/// An InvalidArgument error is returned if the data is empty or not finite, if a percentile is outside of `[0, 100]`
/// or if `lower > upper`.
///
/// # Examples
///
/// ```
/// let clipped = brainview::clip_data_at_percentiles(&[1.0, 50.0, 50.0, 50.0, 100.0], 25.0, 75.0).unwrap();
/// assert_eq!(vec![50.0; 5], clipped);
/// ```
pub fn clip_data_at_percentiles(data: &[f32], lower: f32, upper: f32) -> Result<Vec<f32>> {
    check_percentile(lower)?;
    check_percentile(upper)?;
    if lower > upper {
        return Err(BrainviewError::invalid_argument(format!(
            "Lower percentile must not be greater than upper percentile, but got lower={} and upper={}.",
            lower, upper
        )));
    }

    let mut arr = to_noisy_array(data)?;
    let lower_value = quantile_of(&mut arr, lower)?;
    let upper_value = quantile_of(&mut arr, upper)?;
    debug!(lower, upper, lower_value, upper_value, "Clipping {} data values at percentiles.", data.len());

    Ok(data.iter().map(|&v| v.max(lower_value).min(upper_value)).collect())
}


/// Clip data at the default 5th and 95th percentiles, see [`clip_data_at_percentiles`].
pub fn clip_data(data: &[f32]) -> Result<Vec<f32>> {
    clip_data_at_percentiles(data, DEFAULT_CLIP_LOWER, DEFAULT_CLIP_UPPER)
}


#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn data_with_outliers() -> Vec<f32> {
        let mut data: Vec<f32> = vec![
            50.0, 51.0, 48.0, 49.0, 50.0, 48.0, 50.0, 50.0, 48.0, 48.0, 50.0, 53.0, 52.0, 48.0, 50.0, 49.0, 51.0,
            50.0, 52.0, 49.0, 50.0, 51.0, 48.0, 53.0, 50.0, 49.0, 50.0, 52.0, 51.0, 50.0, 48.0, 49.0, 50.0, 51.0,
            50.0, 52.0, 49.0, 50.0,
        ];
        data.push(1.0);
        data.push(100.0);
        data
    }

    #[test]
    fn percentiles_use_linear_interpolation() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_abs_diff_eq!(2.5_f32, percentile(&data, 50.0).unwrap());
        assert_abs_diff_eq!(1.0_f32, percentile(&data, 0.0).unwrap());
        assert_abs_diff_eq!(4.0_f32, percentile(&data, 100.0).unwrap());
        assert_abs_diff_eq!(1.3_f32, percentile(&data, 10.0).unwrap(), epsilon = 1e-6);
    }

    #[test]
    fn outliers_are_pulled_in_by_default_clipping() {
        let data = data_with_outliers();
        let clipped = clip_data(&data).unwrap();

        assert_eq!(data.len(), clipped.len());
        let min = clipped.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = clipped.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!(min > 20.0);
        assert!(max < 80.0);
        // the bulk of the values is not affected
        assert_eq!(data[11], clipped[11]);
        assert_eq!(data[0], clipped[0]);
    }

    #[test]
    fn clipped_values_stay_within_the_percentile_range() {
        let data: Vec<f32> = (0..100).map(|i| ((i * 37) % 101) as f32 - 20.0).collect();
        let lower_value = percentile(&data, 10.0).unwrap();
        let upper_value = percentile(&data, 80.0).unwrap();
        let clipped = clip_data_at_percentiles(&data, 10.0, 80.0).unwrap();

        assert_eq!(data.len(), clipped.len());
        assert!(clipped.iter().all(|&v| v >= lower_value && v <= upper_value));
        for (orig, clip) in data.iter().zip(clipped.iter()) {
            if *orig >= lower_value && *orig <= upper_value {
                assert_eq!(orig, clip);
            }
        }
    }

    #[test]
    fn clipping_data_with_tied_bounds_is_idempotent() {
        let clipped = clip_data(&data_with_outliers()).unwrap();
        let clipped_twice = clip_data(&clipped).unwrap();
        assert_eq!(clipped, clipped_twice);
    }

    #[test]
    fn identical_percentiles_collapse_the_data() {
        let clipped = clip_data_at_percentiles(&[1.0, 2.0, 3.0, 4.0, 5.0], 50.0, 50.0).unwrap();
        assert_eq!(vec![3.0; 5], clipped);
    }

    #[test]
    fn the_input_is_not_modified() {
        let data = vec![5.0, 1.0, 3.0];
        let _ = clip_data_at_percentiles(&data, 40.0, 60.0).unwrap();
        assert_eq!(vec![5.0, 1.0, 3.0], data);
    }

    #[test]
    fn invalid_clip_arguments_are_rejected() {
        let data = [1.0, 2.0, 3.0];
        assert!(matches!(clip_data_at_percentiles(&data, 95.0, 5.0), Err(BrainviewError::InvalidArgument(_))));
        assert!(matches!(clip_data_at_percentiles(&[], 5.0, 95.0), Err(BrainviewError::InvalidArgument(_))));
        assert!(matches!(clip_data_at_percentiles(&data, -1.0, 95.0), Err(BrainviewError::InvalidArgument(_))));
        assert!(matches!(clip_data_at_percentiles(&data, 5.0, 100.5), Err(BrainviewError::InvalidArgument(_))));
        assert!(matches!(clip_data_at_percentiles(&[1.0, f32::NAN], 5.0, 95.0), Err(BrainviewError::InvalidArgument(_))));
    }
}
