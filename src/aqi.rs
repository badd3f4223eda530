//! US EPA Air Quality Index computation from PM2.5 concentrations.
//!
//! Maps a PM2.5 concentration (µg/m³) onto the 0-500 US AQI scale using
//! piecewise-linear interpolation across the standard breakpoints, then
//! classifies the index into one of six health bands with a fixed
//! recommendation sentence each.

use serde::Serialize;

/// Conservative substitutes used when a provider omits a pollutant field.
/// Kept together so every fallback in the service agrees on the same values.
pub const DEFAULT_AQI: u32 = 50;
pub const DEFAULT_PM25: f64 = 12.0;
pub const DEFAULT_PM10: f64 = 20.0;

/// PM2.5 breakpoint segments as `(c_low, c_high, aqi_low, aqi_high)`.
///
/// The last segment keeps its slope for concentrations above 350 µg/m³, so
/// the index is unbounded at the top.
const BREAKPOINTS: [(f64, f64, f64, f64); 6] = [
    (0.0, 12.0, 0.0, 50.0),
    (12.0, 35.4, 50.0, 100.0),
    (35.4, 55.4, 100.0, 150.0),
    (55.4, 150.4, 150.0, 200.0),
    (150.4, 250.4, 200.0, 300.0),
    (250.4, 350.0, 300.0, 500.0),
];

/// Converts a PM2.5 concentration to the US AQI, rounded to the nearest integer.
///
/// A value sitting exactly on a breakpoint belongs to the lower segment.
/// Negative, NaN, or otherwise unusable input is treated as a concentration
/// of zero rather than an error, since upstream providers sometimes omit or
/// garble pollutant fields.
pub fn pm25_to_aqi(pm25: f64) -> u32 {
    if !pm25.is_finite() || pm25 <= 0.0 {
        return 0;
    }

    let (c_low, c_high, aqi_low, aqi_high) = BREAKPOINTS
        .iter()
        .copied()
        .find(|&(_, c_high, _, _)| pm25 <= c_high)
        .unwrap_or(BREAKPOINTS[BREAKPOINTS.len() - 1]);

    let aqi = aqi_low + (pm25 - c_low) / (c_high - c_low) * (aqi_high - aqi_low);
    aqi.round() as u32
}

/// The six US AQI health bands.
///
/// Serializes to the display label used by the frontend ("Unhealthy for
/// Sensitive Groups", not the variant name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AqiLevel {
    Good,
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitive,
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    Hazardous,
}

impl AqiLevel {
    pub fn label(&self) -> &'static str {
        match self {
            AqiLevel::Good => "Good",
            AqiLevel::Moderate => "Moderate",
            AqiLevel::UnhealthyForSensitive => "Unhealthy for Sensitive Groups",
            AqiLevel::Unhealthy => "Unhealthy",
            AqiLevel::VeryUnhealthy => "Very Unhealthy",
            AqiLevel::Hazardous => "Hazardous",
        }
    }

    /// The fixed health recommendation sentence for this band.
    pub fn recommendation(&self) -> &'static str {
        match self {
            AqiLevel::Good => "Air quality is good. Perfect for outdoor activities!",
            AqiLevel::Moderate => {
                "Air quality is acceptable. Unusually sensitive people should consider \
                 limiting prolonged outdoor exertion."
            },
            AqiLevel::UnhealthyForSensitive => {
                "Members of sensitive groups may experience health effects. The general \
                 public is less likely to be affected."
            },
            AqiLevel::Unhealthy => {
                "Everyone may begin to experience health effects. Limit prolonged outdoor \
                 exertion."
            },
            AqiLevel::VeryUnhealthy => {
                "Health alert: everyone may experience more serious health effects. Avoid \
                 outdoor activities."
            },
            AqiLevel::Hazardous => {
                "Health warnings of emergency conditions. Everyone should avoid outdoor \
                 activities."
            },
        }
    }
}

/// Classifies an AQI value into its health band. Each band is closed at its
/// upper threshold; everything above 300 is hazardous.
pub fn classify(aqi: u32) -> AqiLevel {
    match aqi {
        0..=50 => AqiLevel::Good,
        51..=100 => AqiLevel::Moderate,
        101..=150 => AqiLevel::UnhealthyForSensitive,
        151..=200 => AqiLevel::Unhealthy,
        201..=300 => AqiLevel::VeryUnhealthy,
        _ => AqiLevel::Hazardous,
    }
}

/// An AQI value with its health classification, as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct AqiReport {
    pub aqi: u32,
    pub level: AqiLevel,
    pub recommendation: &'static str,
}

impl AqiReport {
    pub fn from_aqi(aqi: u32) -> Self {
        let level = classify(aqi);
        Self {
            aqi,
            level,
            recommendation: level.recommendation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0)]
    #[case(12.0, 50)]
    #[case(35.4, 100)]
    #[case(55.4, 150)]
    #[case(150.4, 200)]
    #[case(250.4, 300)]
    #[case(350.0, 500)]
    fn breakpoints_are_exact(#[case] pm25: f64, #[case] expected: u32) {
        assert_eq!(pm25_to_aqi(pm25), expected);
    }

    #[test]
    fn negative_and_nan_coerce_to_zero() {
        assert_eq!(pm25_to_aqi(-5.0), 0);
        assert_eq!(pm25_to_aqi(f64::NAN), 0);
        assert_eq!(pm25_to_aqi(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn linear_within_first_segment() {
        // Midpoint of 0-12 maps to the midpoint of 0-50.
        assert_eq!(pm25_to_aqi(6.0), 25);
        assert_eq!(pm25_to_aqi(3.0), 13); // 12.5 rounds up
    }

    #[test]
    fn monotonically_non_decreasing() {
        let mut previous = 0;
        for step in 0..4000 {
            let pm25 = step as f64 * 0.1;
            let aqi = pm25_to_aqi(pm25);
            assert!(
                aqi >= previous,
                "AQI decreased at pm2.5={}: {} -> {}",
                pm25,
                previous,
                aqi
            );
            previous = aqi;
        }
    }

    #[test]
    fn no_upper_clamp() {
        // Slope of the open last segment continues past 500.
        assert_eq!(pm25_to_aqi(500.0), 801);
        assert!(pm25_to_aqi(1000.0) > 500);
    }

    #[rstest]
    #[case(0, AqiLevel::Good)]
    #[case(50, AqiLevel::Good)]
    #[case(51, AqiLevel::Moderate)]
    #[case(100, AqiLevel::Moderate)]
    #[case(101, AqiLevel::UnhealthyForSensitive)]
    #[case(150, AqiLevel::UnhealthyForSensitive)]
    #[case(151, AqiLevel::Unhealthy)]
    #[case(200, AqiLevel::Unhealthy)]
    #[case(201, AqiLevel::VeryUnhealthy)]
    #[case(300, AqiLevel::VeryUnhealthy)]
    #[case(301, AqiLevel::Hazardous)]
    #[case(999, AqiLevel::Hazardous)]
    fn classification_band_edges(#[case] aqi: u32, #[case] expected: AqiLevel) {
        assert_eq!(classify(aqi), expected);
    }

    #[test]
    fn level_serializes_to_display_label() {
        let json = serde_json::to_string(&AqiLevel::UnhealthyForSensitive).unwrap();
        assert_eq!(json, r#""Unhealthy for Sensitive Groups""#);
        let json = serde_json::to_string(&AqiLevel::VeryUnhealthy).unwrap();
        assert_eq!(json, r#""Very Unhealthy""#);
    }

    #[test]
    fn report_pairs_level_and_recommendation() {
        let report = AqiReport::from_aqi(pm25_to_aqi(55.4));
        assert_eq!(report.aqi, 150);
        assert_eq!(report.level, AqiLevel::UnhealthyForSensitive);
        assert!(report.recommendation.starts_with("Members of sensitive groups"));

        let report = AqiReport::from_aqi(40);
        assert_eq!(report.level, AqiLevel::Good);
        assert_eq!(
            report.recommendation,
            "Air quality is good. Perfect for outdoor activities!"
        );
    }
}
