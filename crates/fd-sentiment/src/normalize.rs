//! Score normalization and BUY/HOLD/SELL labelling.
//!
//! Two policies exist. [`NormalizationPolicy::Rescaled`] is the one the
//! stored history uses and the default; [`NormalizationPolicy::Direct`] is
//! the older variant kept for deployments whose history was written with it.
//! The two are not numerically compatible and must never be mixed in one
//! series. Labels are always derived from the normalized score.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lower edge of the raw band mapped onto `[0, 1]` by the rescaled policy.
pub const RESCALE_LOW: f64 = 0.55;
/// Upper edge of the raw band mapped onto `[0, 1]` by the rescaled policy.
pub const RESCALE_HIGH: f64 = 0.8;
/// Rescaled value emitted instead of an exact 0.
pub const RESCALE_FLOOR: f64 = 0.03;
/// Rescaled value emitted instead of an exact 1.
pub const RESCALE_CEILING: f64 = 0.97;

/// Discrete recommendation derived from a score.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    /// Score above the upper threshold
    #[display("BUY")]
    Buy,
    /// Score between the thresholds
    #[display("HOLD")]
    Hold,
    /// Score below the lower threshold
    #[display("SELL")]
    Sell,
}

impl SentimentLabel {
    /// Stored form of the label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
            Self::Sell => "SELL",
        }
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(Self::Buy),
            "HOLD" => Ok(Self::Hold),
            "SELL" => Ok(Self::Sell),
            other => Err(format!("unknown sentiment label '{}'", other)),
        }
    }
}

/// How a raw mean probability becomes a stored score.
#[derive(
    Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationPolicy {
    /// Map raw `[0.55, 0.80]` onto `[0, 1]`, clamp, pull exact extremes in to
    /// 0.03 / 0.97. BUY above 0.6, SELL below 0.3.
    #[default]
    #[display("rescaled")]
    Rescaled,
    /// Raw score rounded to two decimals. BUY above 0.6, SELL below 0.45.
    #[display("direct")]
    Direct,
}

/// Normalized score with its label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedScore {
    /// Score on the policy's scale, within `[0, 1]`
    pub score: f64,
    /// Label derived from `score`
    pub label: SentimentLabel,
}

impl NormalizationPolicy {
    /// Normalize `raw` and label the result.
    pub fn normalize(self, raw: f64) -> NormalizedScore {
        let score = match self {
            Self::Rescaled => rescale(raw),
            Self::Direct => round_2dp(raw),
        };
        NormalizedScore {
            score,
            label: self.label(score),
        }
    }

    /// Label an already normalized score.
    pub fn label(self, score: f64) -> SentimentLabel {
        let (sell_below, buy_above) = match self {
            Self::Rescaled => (0.3, 0.6),
            Self::Direct => (0.45, 0.6),
        };
        if score > buy_above {
            SentimentLabel::Buy
        } else if score < sell_below {
            SentimentLabel::Sell
        } else {
            SentimentLabel::Hold
        }
    }

    /// Stored form of the policy.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rescaled => "rescaled",
            Self::Direct => "direct",
        }
    }
}

impl FromStr for NormalizationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rescaled" => Ok(Self::Rescaled),
            "direct" => Ok(Self::Direct),
            other => Err(format!("unknown normalization policy '{}'", other)),
        }
    }
}

/// Linear map of `[RESCALE_LOW, RESCALE_HIGH]` onto `[0, 1]`.
///
/// Values outside the band clamp to the edges, and the edges themselves are
/// replaced by [`RESCALE_FLOOR`] and [`RESCALE_CEILING`].
pub fn rescale(raw: f64) -> f64 {
    let scaled = if raw >= RESCALE_HIGH {
        1.0
    } else if raw <= RESCALE_LOW {
        0.0
    } else {
        (raw - RESCALE_LOW) / (RESCALE_HIGH - RESCALE_LOW)
    };

    let clamped = scaled.clamp(0.0, 1.0);
    if clamped == 0.0 {
        RESCALE_FLOOR
    } else if clamped == 1.0 {
        RESCALE_CEILING
    } else {
        clamped
    }
}

/// Round to two decimals, ties to even on the exact binary value.
pub fn round_2dp(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}
