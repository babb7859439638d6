use super::{
    frame::IndicatorFrame,
    signals::{above, below, has_volume, Conditions},
    Strategy, StrategyMeta,
};
use crate::config::GridSettings;
use crate::indicators::{
    bollinger_on_typical_price, calculate_ema, calculate_macd_default, calculate_rsi, calculate_sma,
};
use crate::ladder::{LadderConfig, PositionLadder};
use crate::models::{Candle, IndicatorSeries, SignalFlags};
use crate::Result;

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;

/// Grid bot, long and short
///
/// Opens the first tranche on Bollinger/RSI extremes. The position ladder
/// from [`GridTrendStrategy::ladder`] then adds a tranche every
/// `grid_buy_pct` (long) or `grid_sell_pct` (short) against the position,
/// and exits once the profit target is reached.
///
/// Entry conditions (ALL must be true):
/// - Long: close below the lower band, RSI < 30, volume > 0
/// - Short: close above the upper band, RSI > 70, volume > 0
#[derive(Debug, Clone, Default)]
pub struct GridTrendStrategy {
    settings: GridSettings,
}

impl GridTrendStrategy {
    pub fn new(settings: GridSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    /// Position ladder anchored on the trade's filled entry orders
    pub fn ladder(&self) -> PositionLadder {
        PositionLadder::new(LadderConfig::grid(&self.settings))
    }
}

/// 1.0 where `predicate` holds, 0.0 where it does not, undefined on gaps
fn trend_flag(
    closes: &[f64],
    ema: &IndicatorSeries,
    sma: &IndicatorSeries,
    predicate: impl Fn(f64, f64, f64) -> bool,
) -> IndicatorSeries {
    closes
        .iter()
        .zip(ema.iter().zip(sma))
        .map(|(&close, (ema, sma))| {
            let (ema, sma) = ((*ema)?, (*sma)?);
            Some(if predicate(close, ema, sma) { 1.0 } else { 0.0 })
        })
        .collect()
}

impl Strategy for GridTrendStrategy {
    fn name(&self) -> &str {
        "GridTradingBot"
    }

    fn meta(&self) -> StrategyMeta {
        StrategyMeta {
            timeframe: "5m",
            startup_candle_count: 30,
            can_long: true,
            can_short: true,
            stoploss: self.settings.stoploss,
            minimal_roi: 100.0, // Exits belong to the ladder
        }
    }

    fn populate_indicators(&self, candles: &[Candle]) -> Result<IndicatorFrame> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let sma_200 = calculate_sma(&closes, 200);
        let ema_50 = calculate_ema(&closes, 50);
        let macd = calculate_macd_default(&closes);
        let bands = bollinger_on_typical_price(candles, 20, 2.0);

        let uptrend = trend_flag(&closes, &ema_50, &sma_200, |c, e, s| c > e && e > s);
        let downtrend = trend_flag(&closes, &ema_50, &sma_200, |c, e, s| c < e && e < s);

        Ok(IndicatorFrame::new(candles.len())
            .with("rsi", calculate_rsi(&closes, 14))
            .with("macd", macd.macd)
            .with("macdsignal", macd.signal)
            .with("macdhist", macd.hist)
            .with("bb_lowerband", bands.lower)
            .with("bb_middleband", bands.mid)
            .with("bb_upperband", bands.upper)
            .with("uptrend", uptrend)
            .with("downtrend", downtrend)
            .with("sma_200", sma_200)
            .with("ema_50", ema_50))
    }

    fn populate_signals(&self, candles: &[Candle], frame: &IndicatorFrame) -> Vec<SignalFlags> {
        let close = |i: usize| candles[i].close;
        let rsi = |i: usize| frame.value("rsi", i);

        let enter_long = Conditions::new()
            .with("close < bb_lower", |i| below(close(i), frame.value("bb_lowerband", i)))
            .with("rsi < 30", |i| rsi(i).is_some_and(|r| r < RSI_OVERSOLD))
            .with("volume > 0", |i| has_volume(candles, i));

        let enter_short = Conditions::new()
            .with("close > bb_upper", |i| above(close(i), frame.value("bb_upperband", i)))
            .with("rsi > 70", |i| rsi(i).is_some_and(|r| r > RSI_OVERBOUGHT))
            .with("volume > 0", |i| has_volume(candles, i));

        let exit_long = Conditions::new()
            .with("close > bb_upper", |i| above(close(i), frame.value("bb_upperband", i)))
            .with("rsi > 70", |i| rsi(i).is_some_and(|r| r > RSI_OVERBOUGHT));

        let exit_short = Conditions::new()
            .with("close < bb_lower", |i| below(close(i), frame.value("bb_lowerband", i)))
            .with("rsi < 30", |i| rsi(i).is_some_and(|r| r < RSI_OVERSOLD));

        (0..candles.len())
            .map(|i| SignalFlags {
                enter_long: enter_long.holds(i),
                enter_short: enter_short.holds(i),
                exit_long: exit_long.holds(i),
                exit_short: exit_short.holds(i),
            })
            .collect()
    }
}
