use serde::Serialize;

/// Summary of a population's fitness distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitnessStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub median: f32,
    pub std_dev: f32,
}

impl FitnessStats {
    /// Computes statistics from unsorted values.
    ///
    /// Returns `None` if there are no values.
    ///
    /// ```
    /// use flapevo_training::stats::FitnessStats;
    ///
    /// let stats = FitnessStats::new([5.0, 2.0, 4.0, 1.0, 3.0]).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f32::total_cmp);

        let min = *values.first()?;
        let max = *values.last()?;
        #[expect(clippy::cast_precision_loss)]
        let n = values.len() as f32;
        let mean = values.iter().sum::<f32>() / n;
        let median = values[values.len() / 2];
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;

        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

#[cfg(test)]
#[expect(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(FitnessStats::new([]), None);
    }

    #[test]
    fn test_single_value() {
        let stats = FitnessStats::new([2.5]).unwrap();
        assert_eq!(stats.min, 2.5);
        assert_eq!(stats.max, 2.5);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_std_dev() {
        let stats = FitnessStats::new([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.std_dev, 2.0);
    }
}
