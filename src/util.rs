//! Utility functions used in all other brainview modules.

use std::path::Path;

use crate::error::{BrainviewError, Result};

/// Check whether the file name ends with the given suffix, e.g. ".ply". The check is case-sensitive.
pub fn has_suffix<P>(path: P, suffix: &str) -> bool
where
    P: AsRef<Path>,
{
    path.as_ref().to_string_lossy().ends_with(suffix)
}


/// Fail with an InvalidArgument error if the slice contains NaN or infinite values.
pub fn ensure_finite(data: &[f32], what: &str) -> Result<()> {
    match data.iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(BrainviewError::invalid_argument(format!(
            "{} must only contain finite values, but value at index {} is {}.",
            what, idx, data[idx]
        ))),
        None => Ok(()),
    }
}


/// Compute the minimum and maximum of a slice of finite values. Returns `None` for empty input.
pub fn vec32minmax(data: &[f32]) -> Option<(f32, f32)> {
    let mut iter = data.iter().copied();
    let first = iter.next()?;
    Some(iter.fold((first, first), |(min, max), v| (min.min(v), max.max(v))))
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn suffix_matching_is_case_sensitive() {
        assert!(has_suffix("/tmp/brain.ply", ".ply"));
        assert!(!has_suffix("/tmp/brain.PLY", ".ply"));
        assert!(!has_suffix("brain", ".ply"));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(ensure_finite(&[1.0, 2.0], "data").is_ok());
        let err = ensure_finite(&[1.0, f32::NAN], "data").unwrap_err();
        assert!(err.to_string().contains("index 1"));
        assert!(ensure_finite(&[f32::INFINITY], "data").is_err());
    }

    #[test]
    fn minmax_of_slice() {
        assert_eq!(Some((-2.0, 7.5)), vec32minmax(&[3.0, -2.0, 7.5, 0.0]));
        assert_eq!(Some((4.0, 4.0)), vec32minmax(&[4.0]));
        assert_eq!(None, vec32minmax(&[]));
    }
}
