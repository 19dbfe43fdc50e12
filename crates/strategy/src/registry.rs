use std::collections::HashMap;

use tracing::info;

use common::{Error, Result, TradeSignal};

use crate::config::StrategySpec;
use crate::indicators::{heikin_ashi, HaBar, SmaCross, SmaPoint};
use crate::sentiment::mean_sentiment;
use crate::{DataRequirement, Strategy, SymbolSnapshot};

/// Build the configured strategy. An unknown type is a configuration error
/// at startup, never a runtime fault during polling.
pub fn build_strategy(spec: &StrategySpec) -> Result<Box<dyn Strategy>> {
    let strategy = build_inner(spec)?;
    info!(strategy = %strategy.name(), "Strategy selected");
    Ok(strategy)
}

fn build_inner(spec: &StrategySpec) -> Result<Box<dyn Strategy>> {
    match spec.strategy_type.as_str() {
        "heikin_ashi" => Ok(Box::new(HeikinAshiStrategy)),
        "sma_crossover" => {
            let short = param_usize(&spec.params, "short_window", SmaCross::DEFAULT_SHORT);
            let long = param_usize(&spec.params, "long_window", SmaCross::DEFAULT_LONG);
            if short < 1 || short >= long {
                return Err(Error::Config(format!(
                    "sma_crossover windows invalid: short_window {short} must be >= 1 and less than long_window {long}"
                )));
            }
            Ok(Box::new(SmaCrossoverStrategy {
                sma: SmaCross::new(short, long),
            }))
        }
        "news_sentiment" => Ok(Box::new(NewsSentimentStrategy {
            bullish_threshold: param_f64(&spec.params, "bullish_threshold", 0.1),
            bearish_threshold: param_f64(&spec.params, "bearish_threshold", -0.1),
        })),
        other => Err(Error::Config(format!("unknown strategy type '{other}'"))),
    }
}

fn param_f64(params: &HashMap<String, toml::Value>, key: &str, default: f64) -> f64 {
    params.get(key).and_then(|v| v.as_float()).unwrap_or(default)
}

fn param_usize(params: &HashMap<String, toml::Value>, key: &str, default: usize) -> usize {
    params
        .get(key)
        .and_then(|v| v.as_integer())
        .map(|v| v as usize)
        .unwrap_or(default)
}

// ─── Concrete strategy types ──────────────────────────────────────────────────

/// Buys when a bullish smoothed candle follows a bearish or neutral one,
/// sells on the mirror case.
struct HeikinAshiStrategy;

impl Strategy for HeikinAshiStrategy {
    fn name(&self) -> &str {
        "heikin_ashi"
    }

    fn evaluate(&self, snapshot: &SymbolSnapshot) -> TradeSignal {
        decide_heikin_ashi(&heikin_ashi(&snapshot.bars))
    }
}

/// Trades golden/death crosses of two trailing means of the close.
struct SmaCrossoverStrategy {
    sma: SmaCross,
}

impl Strategy for SmaCrossoverStrategy {
    fn name(&self) -> &str {
        "sma_crossover"
    }

    fn evaluate(&self, snapshot: &SymbolSnapshot) -> TradeSignal {
        decide_sma(&self.sma.compute(&snapshot.bars))
    }
}

/// Trades on the mean sentiment score of the symbol's news feed.
struct NewsSentimentStrategy {
    bullish_threshold: f64,
    bearish_threshold: f64,
}

impl Strategy for NewsSentimentStrategy {
    fn name(&self) -> &str {
        "news_sentiment"
    }

    fn requirement(&self) -> DataRequirement {
        DataRequirement::NewsFeed
    }

    fn evaluate(&self, snapshot: &SymbolSnapshot) -> TradeSignal {
        match mean_sentiment(&snapshot.news) {
            Some(score) if score > self.bullish_threshold => TradeSignal::Buy,
            Some(score) if score < self.bearish_threshold => TradeSignal::Sell,
            _ => TradeSignal::Hold,
        }
    }
}

// ─── Decision rules ───────────────────────────────────────────────────────────

/// Signal on the last two smoothed candles.
///
/// With a single candle the absent previous bar satisfies both preconditions;
/// buy is checked first and wins when the candle is bullish. That evaluation
/// order is deliberate and load-bearing.
fn decide_heikin_ashi(derived: &[HaBar]) -> TradeSignal {
    let Some(latest) = derived.last() else {
        return TradeSignal::Hold;
    };
    let previous = derived.len().checked_sub(2).map(|i| &derived[i]);

    if latest.close > latest.open && previous.map_or(true, |p| p.close <= p.open) {
        TradeSignal::Buy
    } else if latest.close < latest.open && previous.map_or(true, |p| p.close >= p.open) {
        TradeSignal::Sell
    } else {
        TradeSignal::Hold
    }
}

/// Signal on the last two rows of the paired-means series.
///
/// Holds while either mean on the latest row is still warming up, and with
/// fewer than two rows. A previous-row mean still inside its warm-up window
/// counts as "not yet above" (resp. "not yet below"), so the first row with
/// both means defined can itself register a cross.
fn decide_sma(points: &[SmaPoint]) -> TradeSignal {
    if points.len() < 2 {
        return TradeSignal::Hold;
    }
    let latest = points[points.len() - 1];
    let previous = points[points.len() - 2];

    let (Some(short), Some(long)) = (latest.short, latest.long) else {
        return TradeSignal::Hold;
    };
    let prev_above = matches!((previous.short, previous.long), (Some(s), Some(l)) if s > l);
    let prev_below = matches!((previous.short, previous.long), (Some(s), Some(l)) if s < l);

    if short > long && !prev_above {
        TradeSignal::Buy
    } else if short < long && !prev_below {
        TradeSignal::Sell
    } else {
        TradeSignal::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use common::{NewsItem, PriceBar};

    fn bar(i: i64, open: f64, high: f64, low: f64, close: f64) -> PriceBar {
        PriceBar {
            begins_at: Utc.timestamp_opt(i * 300, 0).unwrap(),
            open,
            high,
            low,
            close,
        }
    }

    fn close_bars(values: &[f64]) -> Vec<PriceBar> {
        values
            .iter()
            .enumerate()
            .map(|(i, &c)| bar(i as i64, c, c, c, c))
            .collect()
    }

    fn spec(strategy_type: &str) -> StrategySpec {
        StrategySpec {
            strategy_type: strategy_type.to_string(),
            params: Default::default(),
        }
    }

    fn news(scores: &[f64]) -> Vec<NewsItem> {
        scores
            .iter()
            .map(|&s| NewsItem {
                headline: "headline".to_string(),
                sentiment: Some(s),
                published_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn unknown_strategy_type_is_a_config_error() {
        let err = build_strategy(&spec("momentum")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn invalid_sma_windows_are_a_config_error() {
        let mut s = spec("sma_crossover");
        s.params
            .insert("short_window".into(), toml::Value::Integer(20));
        s.params
            .insert("long_window".into(), toml::Value::Integer(5));
        assert!(matches!(build_strategy(&s).unwrap_err(), Error::Config(_)));
    }

    #[test]
    fn heikin_ashi_buys_on_bearish_to_bullish_flip() {
        // Candle 2 smooths bearish, candle 3 smooths bullish
        let bars = vec![
            bar(0, 112.0, 115.0, 110.0, 112.0),
            bar(1, 110.0, 110.0, 95.0, 100.0),
            bar(2, 100.0, 122.0, 99.0, 120.0),
        ];
        let strategy = build_strategy(&spec("heikin_ashi")).unwrap();
        let snapshot = SymbolSnapshot::from_bars("AAPL", bars);
        assert_eq!(strategy.evaluate(&snapshot), TradeSignal::Buy);
    }

    #[test]
    fn heikin_ashi_sells_on_bullish_to_bearish_flip() {
        let bars = vec![
            bar(0, 100.0, 102.0, 98.0, 100.0),
            bar(1, 100.0, 112.0, 100.0, 112.0),
            bar(2, 112.0, 113.0, 90.0, 92.0),
        ];
        let strategy = build_strategy(&spec("heikin_ashi")).unwrap();
        let snapshot = SymbolSnapshot::from_bars("AAPL", bars);
        assert_eq!(strategy.evaluate(&snapshot), TradeSignal::Sell);
    }

    #[test]
    fn heikin_ashi_holds_while_trend_continues() {
        // Two bullish smoothed candles in a row: no fresh flip
        let bars = vec![
            bar(0, 100.0, 110.0, 100.0, 110.0),
            bar(1, 110.0, 120.0, 110.0, 120.0),
            bar(2, 120.0, 130.0, 120.0, 130.0),
        ];
        let strategy = build_strategy(&spec("heikin_ashi")).unwrap();
        let snapshot = SymbolSnapshot::from_bars("AAPL", bars);
        assert_eq!(strategy.evaluate(&snapshot), TradeSignal::Hold);
    }

    #[test]
    fn heikin_ashi_single_bullish_bar_buys_before_sell_is_considered() {
        // One bar, no previous: the wildcard branch satisfies both
        // preconditions and buy is evaluated first.
        let bars = vec![bar(0, 100.0, 120.0, 100.0, 110.0)];
        let strategy = build_strategy(&spec("heikin_ashi")).unwrap();
        let snapshot = SymbolSnapshot::from_bars("AAPL", bars);
        assert_eq!(strategy.evaluate(&snapshot), TradeSignal::Buy);
    }

    #[test]
    fn heikin_ashi_holds_on_empty_series() {
        let strategy = build_strategy(&spec("heikin_ashi")).unwrap();
        let snapshot = SymbolSnapshot::from_bars("AAPL", Vec::new());
        assert_eq!(strategy.evaluate(&snapshot), TradeSignal::Hold);
    }

    #[test]
    fn sma_monotonic_rise_signals_buy_exactly_once() {
        // 25 daily closes 100..=124: the short mean first exceeds the long
        // mean on the bar where the long window fills (index 19).
        let closes: Vec<f64> = (100..125).map(|c| c as f64).collect();
        let strategy = build_strategy(&spec("sma_crossover")).unwrap();

        let mut buys = Vec::new();
        for end in 1..=closes.len() {
            let snapshot = SymbolSnapshot::from_bars("AAPL", close_bars(&closes[..end]));
            match strategy.evaluate(&snapshot) {
                TradeSignal::Buy => buys.push(end - 1),
                TradeSignal::Sell => panic!("unexpected sell at bar {}", end - 1),
                TradeSignal::Hold => {}
            }
        }
        assert_eq!(buys, vec![19]);
    }

    #[test]
    fn sma_holds_through_warm_up() {
        let closes: Vec<f64> = (0..19).map(|c| 100.0 + c as f64).collect();
        let strategy = build_strategy(&spec("sma_crossover")).unwrap();
        let snapshot = SymbolSnapshot::from_bars("AAPL", close_bars(&closes));
        assert_eq!(strategy.evaluate(&snapshot), TradeSignal::Hold);
    }

    #[test]
    fn sma_death_cross_signals_sell() {
        let sma = SmaCross::new(2, 3);
        // Rising then falling closes: short crosses below long at the end
        let bars = close_bars(&[10.0, 11.0, 12.0, 13.0, 12.0, 5.0]);
        assert_eq!(decide_sma(&sma.compute(&bars)), TradeSignal::Sell);
    }

    #[test]
    fn sma_holds_with_fewer_than_two_rows() {
        let sma = SmaCross::new(2, 3);
        assert_eq!(decide_sma(&sma.compute(&close_bars(&[10.0]))), TradeSignal::Hold);
        assert_eq!(decide_sma(&[]), TradeSignal::Hold);
    }

    #[test]
    fn news_sentiment_mean_above_threshold_buys() {
        let strategy = build_strategy(&spec("news_sentiment")).unwrap();
        assert_eq!(strategy.requirement(), DataRequirement::NewsFeed);
        // mean of [0.3, 0.2, -0.1] = 0.133… > 0.1
        let snapshot = SymbolSnapshot::from_news("AAPL", news(&[0.3, 0.2, -0.1]));
        assert_eq!(strategy.evaluate(&snapshot), TradeSignal::Buy);
    }

    #[test]
    fn news_sentiment_mean_below_threshold_sells() {
        let strategy = build_strategy(&spec("news_sentiment")).unwrap();
        let snapshot = SymbolSnapshot::from_news("AAPL", news(&[-0.5, -0.2, 0.1]));
        assert_eq!(strategy.evaluate(&snapshot), TradeSignal::Sell);
    }

    #[test]
    fn news_sentiment_neutral_or_unscored_holds() {
        let strategy = build_strategy(&spec("news_sentiment")).unwrap();
        let neutral = SymbolSnapshot::from_news("AAPL", news(&[0.05, -0.05]));
        assert_eq!(strategy.evaluate(&neutral), TradeSignal::Hold);
        let empty = SymbolSnapshot::from_news("AAPL", Vec::new());
        assert_eq!(strategy.evaluate(&empty), TradeSignal::Hold);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let closes: Vec<f64> = (100..125).map(|c| c as f64).collect();
        let snapshot = SymbolSnapshot::from_bars("AAPL", close_bars(&closes[..20]));
        for name in ["heikin_ashi", "sma_crossover"] {
            let strategy = build_strategy(&spec(name)).unwrap();
            assert_eq!(strategy.evaluate(&snapshot), strategy.evaluate(&snapshot));
        }
    }
}
