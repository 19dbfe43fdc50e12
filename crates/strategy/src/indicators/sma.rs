use common::PriceBar;

/// Short/long trailing means for one bar. `None` while fewer bars than the
/// window exist (warm-up).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SmaPoint {
    pub short: Option<f64>,
    pub long: Option<f64>,
}

/// Paired simple moving averages over closing prices.
#[derive(Debug, Clone, Copy)]
pub struct SmaCross {
    pub short_window: usize,
    pub long_window: usize,
}

impl SmaCross {
    pub const DEFAULT_SHORT: usize = 5;
    pub const DEFAULT_LONG: usize = 20;

    pub fn new(short_window: usize, long_window: usize) -> Self {
        assert!(
            short_window >= 1 && short_window < long_window,
            "SMA short window must be >= 1 and less than the long window"
        );
        Self {
            short_window,
            long_window,
        }
    }

    /// Trailing-window means for every bar, aligned 1:1 with the input.
    pub fn compute(&self, bars: &[PriceBar]) -> Vec<SmaPoint> {
        bars.iter()
            .enumerate()
            .map(|(i, _)| SmaPoint {
                short: trailing_mean(bars, i, self.short_window),
                long: trailing_mean(bars, i, self.long_window),
            })
            .collect()
    }
}

impl Default for SmaCross {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SHORT, Self::DEFAULT_LONG)
    }
}

/// Mean of the `window` closes ending at index `i`, or `None` inside warm-up.
fn trailing_mean(bars: &[PriceBar], i: usize, window: usize) -> Option<f64> {
    if i + 1 < window {
        return None;
    }
    let sum: f64 = bars[i + 1 - window..=i].iter().map(|b| b.close).sum();
    Some(sum / window as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn closes(values: &[f64]) -> Vec<PriceBar> {
        values
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar {
                begins_at: Utc.timestamp_opt(i as i64 * 86_400, 0).unwrap(),
                open: c,
                high: c,
                low: c,
                close: c,
            })
            .collect()
    }

    #[test]
    fn output_length_matches_input() {
        let sma = SmaCross::new(2, 4);
        assert_eq!(sma.compute(&closes(&[1.0; 10])).len(), 10);
        assert!(sma.compute(&[]).is_empty());
    }

    #[test]
    fn warm_up_entries_are_undefined() {
        let sma = SmaCross::new(3, 5);
        let points = sma.compute(&closes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        assert_eq!(points[0].short, None);
        assert_eq!(points[1].short, None);
        assert!(points[2].short.is_some());
        assert_eq!(points[3].long, None);
        assert!(points[4].long.is_some());
    }

    #[test]
    fn trailing_means_on_known_series() {
        let sma = SmaCross::new(2, 3);
        let points = sma.compute(&closes(&[10.0, 20.0, 30.0, 40.0]));
        assert_eq!(points[1].short, Some(15.0));
        assert_eq!(points[2].short, Some(25.0));
        assert_eq!(points[2].long, Some(20.0));
        assert_eq!(points[3].long, Some(30.0));
    }

    #[test]
    #[should_panic]
    fn short_window_must_be_smaller() {
        SmaCross::new(20, 20);
    }
}
