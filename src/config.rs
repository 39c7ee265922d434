use std::env;
use std::str::FromStr;

use chrono::FixedOffset;
use thiserror::Error;

use crate::models::GlyphStyle;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("Invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub cg_key: Option<String>,
    pub coin_id: String,
    pub vs_currency: String,
    pub ohlc_days: String,
    /// Leading candles dropped from each fetched series
    pub ohlc_skip: usize,
    pub scale_factor: f64,
    pub glyph_style: GlyphStyle,
    pub candle_width: f64,
    pub utc_offset: FixedOffset,
    pub website_url: Option<String>,
    pub buy_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any name -> value lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let discord_token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let scale_factor: f64 = parse_or("SCALE_FACTOR", get("SCALE_FACTOR"), 1_000_000_000.0)?;
        if !(scale_factor.is_finite() && scale_factor > 0.0) {
            return Err(ConfigError::Invalid {
                name: "SCALE_FACTOR",
                value: scale_factor.to_string(),
            });
        }

        let candle_width: f64 = parse_or("CANDLE_WIDTH", get("CANDLE_WIDTH"), 0.4)?;
        if !(candle_width.is_finite() && candle_width > 0.0) {
            return Err(ConfigError::Invalid {
                name: "CANDLE_WIDTH",
                value: candle_width.to_string(),
            });
        }

        let offset_hours: i32 = parse_or("CHART_UTC_OFFSET", get("CHART_UTC_OFFSET"), 0)?;
        let utc_offset = FixedOffset::east_opt(offset_hours * 3600).ok_or(ConfigError::Invalid {
            name: "CHART_UTC_OFFSET",
            value: offset_hours.to_string(),
        })?;

        Ok(Self {
            discord_token,
            cg_key: get("CG_KEY"),
            coin_id: get("COIN_ID").unwrap_or_else(|| "degenerative-sitcom".to_string()),
            vs_currency: get("VS_CURRENCY").unwrap_or_else(|| "usd".to_string()),
            ohlc_days: get("OHLC_DAYS").unwrap_or_else(|| "1".to_string()),
            ohlc_skip: parse_or("OHLC_SKIP", get("OHLC_SKIP"), 24)?,
            scale_factor,
            glyph_style: parse_or("GLYPH_STYLE", get("GLYPH_STYLE"), GlyphStyle::Rocket)?,
            candle_width,
            utc_offset,
            website_url: get("WEBSITE_URL"),
            buy_url: get("BUY_URL"),
        })
    }
}

fn parse_or<T: FromStr>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DISCORD_TOKEN", "token")]).unwrap();
        assert_eq!(config.coin_id, "degenerative-sitcom");
        assert_eq!(config.vs_currency, "usd");
        assert_eq!(config.ohlc_days, "1");
        assert_eq!(config.ohlc_skip, 24);
        assert_eq!(config.scale_factor, 1_000_000_000.0);
        assert_eq!(config.utc_offset.local_minus_utc(), 0);
        assert_eq!(config.glyph_style, GlyphStyle::Rocket);
        assert_eq!(config.candle_width, 0.4);
        assert!(config.cg_key.is_none());
        assert!(config.buy_url.is_none());
    }

    #[test]
    fn test_missing_token() {
        assert!(matches!(config_from(&[]), Err(ConfigError::Missing("DISCORD_TOKEN"))));
        assert!(matches!(
            config_from(&[("DISCORD_TOKEN", "  ")]),
            Err(ConfigError::Missing("DISCORD_TOKEN"))
        ));
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let config = config_from(&[
            ("DISCORD_TOKEN", "token"),
            ("SCALE_FACTOR", "1000"),
            ("CHART_UTC_OFFSET", "-5"),
            ("OHLC_SKIP", "0"),
            ("CG_KEY", "demo"),
        ])
        .unwrap();
        assert_eq!(config.scale_factor, 1000.0);
        assert_eq!(config.utc_offset.local_minus_utc(), -5 * 3600);
        assert_eq!(config.ohlc_skip, 0);
        assert_eq!(config.cg_key.as_deref(), Some("demo"));

        assert!(config_from(&[("DISCORD_TOKEN", "t"), ("SCALE_FACTOR", "-1")]).is_err());
        assert!(config_from(&[("DISCORD_TOKEN", "t"), ("SCALE_FACTOR", "abc")]).is_err());
        assert!(config_from(&[("DISCORD_TOKEN", "t"), ("CHART_UTC_OFFSET", "30")]).is_err());
        assert!(config_from(&[("DISCORD_TOKEN", "t"), ("CANDLE_WIDTH", "0")]).is_err());
        assert!(config_from(&[("DISCORD_TOKEN", "t"), ("GLYPH_STYLE", "hollow")]).is_err());
        assert!(config_from(&[("DISCORD_TOKEN", "t"), ("GLYPH_STYLE", "triangle")]).is_ok());
    }
}
