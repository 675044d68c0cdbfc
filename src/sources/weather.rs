use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::provider::WeatherSource;
use crate::db::models::{ParkFactor, WeatherSnapshot, WindDirection};

pub const DEFAULT_BASE_URL: &str = "https://wttr.in";

/// Start times this close to now use the current observation
const CURRENT_WINDOW_HOURS: i64 = 3;

/// Weather from wttr.in's JSON format. No key required.
pub struct WttrWeather {
    http: Client,
    /// Base URL for overriding in tests
    base_url: Url,
}

impl WttrWeather {
    pub fn new(base_url: Option<&str>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        let raw = base_url.unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(raw).with_context(|| format!("Invalid weather URL: {}", raw))?;
        Ok(WttrWeather { http, base_url })
    }

    pub fn url_for(&self, park: &ParkFactor) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Weather URL cannot take a path: {}", self.base_url))?
            .pop_if_empty()
            .push(&park.city);
        url.query_pairs_mut().append_pair("format", "j1");
        Ok(url)
    }
}

#[async_trait]
impl WeatherSource for WttrWeather {
    fn name(&self) -> &str {
        "wttr.in"
    }

    async fn weather(&self, park: &ParkFactor, at: DateTime<Utc>) -> Result<WeatherSnapshot> {
        let url = self.url_for(park)?;
        debug!("Fetching weather for {} from {}", park.stadium, url);

        let resp = self.http.get(url).send().await
            .context("Weather request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("Weather service error: {}", resp.status());
        }

        let raw: serde_json::Value = resp.json().await
            .context("Failed to parse weather response")?;

        parse_wttr_response(&raw, at, Utc::now())
    }
}

/// wttr.in sends most numbers as strings
fn number(v: &serde_json::Value) -> Option<f64> {
    v.as_str()
        .and_then(|s| s.trim().parse().ok())
        .or_else(|| v.as_f64())
}

fn reading(block: &serde_json::Value, temp_key: &str) -> Result<WeatherSnapshot> {
    let field = |key: &str| {
        number(&block[key]).ok_or_else(|| anyhow!("Weather response missing {}", key))
    };
    Ok(WeatherSnapshot {
        temperature_f: field(temp_key)?,
        wind_speed_mph: field("windspeedMiles")?,
        wind_direction: WindDirection::from_compass(block["winddir16Point"].as_str().unwrap_or("")),
        humidity_pct: field("humidity")?,
        precipitation: number(&block["precipMM"]).unwrap_or(0.0) > 0.0,
        condition: block["weatherDesc"][0]["value"]
            .as_str()
            .unwrap_or("Unknown")
            .trim()
            .to_string(),
    })
}

/// Pick the reading closest to `at`: the current observation when `at` is
/// within three hours of `now`, otherwise the nearest hourly forecast slot.
/// Slot times are local to the park and compared as if they were UTC.
pub fn parse_wttr_response(
    raw: &serde_json::Value,
    at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<WeatherSnapshot> {
    let current = &raw["current_condition"][0];
    let near_now = (at - now).num_minutes().abs() <= Duration::hours(CURRENT_WINDOW_HOURS).num_minutes();
    if near_now && current.is_object() {
        return reading(current, "temp_F");
    }

    let slot = raw["weather"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|day| {
            let date = NaiveDate::parse_from_str(day["date"].as_str()?, "%Y-%m-%d").ok()?;
            Some(day["hourly"].as_array()?.iter().filter_map(move |hour| {
                let hhmm = number(&hour["time"])? as u32;
                let time = NaiveTime::from_hms_opt(hhmm / 100, hhmm % 100, 0)?;
                Some((date.and_time(time).and_utc(), hour))
            }))
        })
        .flatten()
        .min_by_key(|(slot_at, _)| (*slot_at - at).num_minutes().abs());

    match slot {
        Some((_, hour)) => reading(hour, "tempF"),
        None if current.is_object() => reading(current, "temp_F"),
        None => anyhow::bail!("Weather response has no usable conditions"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::RoofType;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "current_condition": [{
                "temp_F": "78", "windspeedMiles": "14", "winddir16Point": "SSW",
                "humidity": "65", "precipMM": "0.0",
                "weatherDesc": [{"value": "Partly cloudy "}]
            }],
            "weather": [{
                "date": "2024-06-02",
                "hourly": [
                    {"time": "1200", "tempF": "70", "windspeedMiles": "5", "winddir16Point": "N",
                     "humidity": "50", "precipMM": "0.0", "weatherDesc": [{"value": "Sunny"}]},
                    {"time": "1800", "tempF": "62", "windspeedMiles": "22", "winddir16Point": "NNE",
                     "humidity": "80", "precipMM": "1.2", "weatherDesc": [{"value": "Light rain"}]}
                ]
            }]
        })
    }

    #[test]
    fn near_start_uses_current_conditions() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 17, 0, 0).unwrap();
        let w = parse_wttr_response(&sample(), now + Duration::hours(2), now).unwrap();
        assert_eq!(w.temperature_f, 78.0);
        assert_eq!(w.wind_direction, WindDirection::Out);
        assert_eq!(w.condition, "Partly cloudy");
        assert!(!w.precipitation);
    }

    #[test]
    fn later_start_uses_nearest_hourly_slot() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 17, 0, 0).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 6, 2, 19, 10, 0).unwrap();
        let w = parse_wttr_response(&sample(), at, now).unwrap();
        assert_eq!(w.temperature_f, 62.0);
        assert_eq!(w.wind_speed_mph, 22.0);
        assert_eq!(w.wind_direction, WindDirection::In);
        assert!(w.precipitation);
    }

    #[test]
    fn empty_response_is_an_error() {
        let now = Utc::now();
        assert!(parse_wttr_response(&json!({}), now, now).is_err());
    }

    #[test]
    fn url_escapes_city() {
        let source = WttrWeather::new(Some("http://localhost:8080")).unwrap();
        let park = ParkFactor {
            team: "Tampa Bay Rays".into(),
            stadium: "Tropicana Field".into(),
            city: "St. Petersburg,FL".into(),
            run_factor: 96.0,
            hr_factor: 97.0,
            altitude_ft: 12,
            roof: RoofType::Dome,
        };
        let url = source.url_for(&park).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/St.%20Petersburg,FL?format=j1");
    }
}
