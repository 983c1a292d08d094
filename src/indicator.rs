// Copyright 2026 Hypermesh Foundation. All rights reserved.
// $HIT Coin Trader Engine - Indicator Logic

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Simple moving average
// ---------------------------------------------------------------------------

/// Simple moving average of `series` over `period` points.
///
/// The output always has `series.len()` entries. The first `period - 1`
/// are `None` (window not yet full); when `period` is zero or the series
/// is shorter than one window, every entry is `None`.
///
/// The window is slid with a running sum, so the whole series costs one
/// pass regardless of `period`.
pub fn sma<I>(series: I, period: usize) -> Vec<Option<f64>>
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: ExactSizeIterator + Clone,
{
    let values = series.into_iter();
    let len = values.len();
    if period == 0 || len < period {
        return vec![None; len];
    }

    let mut out = Vec::with_capacity(len);
    out.resize(period - 1, None);

    let mut sum = 0.0;
    let mut trailing = values.clone();
    for (i, value) in values.enumerate() {
        sum += value;
        if i >= period {
            // `trailing` lags `values` by exactly `period` elements
            if let Some(old) = trailing.next() {
                sum -= old;
            }
        }
        if i + 1 >= period {
            out.push(Some(sum / period as f64));
        }
    }
    out
}

/// Latest SMA value only, i.e. `sma(series, period).last()` without
/// materialising the full series.
pub fn latest_sma<I>(series: I, period: usize) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: ExactSizeIterator + DoubleEndedIterator,
{
    let values = series.into_iter();
    if period == 0 || values.len() < period {
        return None;
    }
    Some(values.rev().take(period).sum::<f64>() / period as f64)
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

/// Where the price sits relative to its moving average.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Trend {
    Above,
    Below,
    Flat,
    /// Not enough history for a full window.
    Unknown,
}

impl Trend {
    pub fn classify(price: f64, sma: Option<f64>) -> Self {
        match sma {
            None => Self::Unknown,
            Some(avg) if price > avg => Self::Above,
            Some(avg) if price < avg => Self::Below,
            Some(_) => Self::Flat,
        }
    }

    /// Chart colouring: the price line is drawn "up" at or above the SMA.
    pub fn is_bullish(&self) -> bool {
        matches!(self, Self::Above | Self::Flat)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_mean(window: &[f64]) -> f64 {
        window.iter().sum::<f64>() / window.len() as f64
    }

    #[test]
    fn test_output_length_matches_input() {
        let series: Vec<f64> = (0..57).map(|i| i as f64).collect();
        for period in [1, 5, 20, 57, 58, 100] {
            assert_eq!(sma(series.iter().copied(), period).len(), series.len());
        }
    }

    #[test]
    fn test_leading_entries_absent() {
        let series: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let out = sma(series.iter().copied(), 4);
        assert!(out[..3].iter().all(Option::is_none));
        assert!(out[3..].iter().all(Option::is_some));
    }

    #[test]
    fn test_short_series_all_absent() {
        let out = sma([1.0, 2.0, 3.0], 4);
        assert_eq!(out, vec![None, None, None]);
    }

    #[test]
    fn test_zero_period_all_absent() {
        let out = sma([1.0, 2.0, 3.0], 0);
        assert_eq!(out, vec![None, None, None]);
    }

    #[test]
    fn test_empty_series() {
        assert!(sma(std::iter::empty::<f64>().collect::<Vec<_>>(), 3).is_empty());
    }

    #[test]
    fn test_constant_series_equals_constant() {
        let out = sma(vec![7.25; 30], 8);
        for value in out.into_iter().flatten() {
            assert!((value - 7.25).abs() < 1e-12);
        }
    }

    #[test]
    fn test_matches_naive_window_mean() {
        let series: Vec<f64> = (0..50).map(|i| ((i * 37) % 11) as f64 * 1.5 + 0.3).collect();
        let period = 6;
        let out = sma(series.iter().copied(), period);
        for i in (period - 1)..series.len() {
            let expected = naive_mean(&series[i + 1 - period..=i]);
            let got = out[i].unwrap();
            assert!((got - expected).abs() < 1e-9, "index {}: {} vs {}", i, got, expected);
        }
    }

    #[test]
    fn test_period_one_is_identity() {
        let series = [3.0, 1.0, 4.0, 1.0, 5.0];
        let out = sma(series, 1);
        assert_eq!(out, series.iter().map(|v| Some(*v)).collect::<Vec<_>>());
    }

    #[test]
    fn test_works_over_vecdeque() {
        let mut deque = std::collections::VecDeque::new();
        deque.extend([2.0, 4.0, 6.0, 8.0]);
        let out = sma(deque.iter().copied(), 2);
        assert_eq!(out, vec![None, Some(3.0), Some(5.0), Some(7.0)]);
    }

    #[test]
    fn test_latest_sma_agrees_with_series() {
        let series: Vec<f64> = (0..40).map(|i| (i as f64).sin() + 2.0).collect();
        let full = sma(series.iter().copied(), 20);
        let latest = latest_sma(series.iter().copied(), 20).unwrap();
        assert!((full.last().unwrap().unwrap() - latest).abs() < 1e-12);
        assert_eq!(latest_sma(series[..10].iter().copied(), 20), None);
        assert_eq!(latest_sma(series.iter().copied(), 0), None);
    }

    #[test]
    fn test_trend_classification() {
        assert_eq!(Trend::classify(10.0, Some(9.0)), Trend::Above);
        assert_eq!(Trend::classify(8.0, Some(9.0)), Trend::Below);
        assert_eq!(Trend::classify(9.0, Some(9.0)), Trend::Flat);
        assert_eq!(Trend::classify(9.0, None), Trend::Unknown);
        assert!(Trend::Flat.is_bullish());
        assert!(!Trend::Below.is_bullish());
        assert!(!Trend::Unknown.is_bullish());
    }
}
