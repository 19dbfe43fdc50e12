use common::PriceBar;

/// One smoothed candle produced by the Heikin-Ashi transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HaBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Heikin-Ashi smoothing of a raw OHLC series.
///
/// For bar i: close = mean(open, high, low, close); open = mean of the raw
/// previous bar's open and close (for the first bar, of its own open and
/// close); high/low clamp the raw extremes against the smoothed open/close.
/// Output length always equals input length.
pub fn heikin_ashi(bars: &[PriceBar]) -> Vec<HaBar> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let close = (bar.open + bar.high + bar.low + bar.close) / 4.0;
            let open = if i == 0 {
                (bar.open + bar.close) / 2.0
            } else {
                let prev = &bars[i - 1];
                (prev.open + prev.close) / 2.0
            };
            HaBar {
                open,
                high: bar.high.max(open).max(close),
                low: bar.low.min(open).min(close),
                close,
            }
        })
        .collect()
}
