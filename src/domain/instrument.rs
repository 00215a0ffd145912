//! Raw catalogue records and normalized instruments.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A catalogue record as delivered by the data-retrieval side.
///
/// Every numeric field is optional: missing keys, `null`, empty CSV cells,
/// non-finite numbers and non-numeric strings all read as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInstrument {
    pub ticker: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub subsector: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub market_cap: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub liq_2m: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub p_l: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub p_vp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub net_margin: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub roe: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub roic: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub dy: Option<f64>,
}

/// A normalized, deduplicated instrument. Ratios default to 0 when unknown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instrument {
    pub ticker: String,
    pub sector: String,
    pub subsector: String,
    pub market_cap: f64,
    pub liquidity: f64,
    pub p_l: f64,
    pub net_margin: f64,
    pub roe: f64,
    pub roic: f64,
    pub dy: f64,
}

/// The ratio fields shared by instruments and hierarchy nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatioField {
    PL,
    NetMargin,
    Roe,
    Roic,
    Dy,
}

impl RatioField {
    pub fn of(self, inst: &Instrument) -> f64 {
        match self {
            RatioField::PL => inst.p_l,
            RatioField::NetMargin => inst.net_margin,
            RatioField::Roe => inst.roe,
            RatioField::Roic => inst.roic,
            RatioField::Dy => inst.dy,
        }
    }

    /// Whether range bounds for this field are expressed in percent.
    pub fn is_percent(self) -> bool {
        !matches!(self, RatioField::PL)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RatioField::PL => "p_l",
            RatioField::NetMargin => "net_margin",
            RatioField::Roe => "roe",
            RatioField::Roic => "roic",
            RatioField::Dy => "dy",
        }
    }
}

impl fmt::Display for RatioField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RatioField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "p_l" | "pl" => Ok(RatioField::PL),
            "net_margin" | "margin" => Ok(RatioField::NetMargin),
            "roe" => Ok(RatioField::Roe),
            "roic" => Ok(RatioField::Roic),
            "dy" => Ok(RatioField::Dy),
            other => Err(format!("unknown ratio field '{}'", other)),
        }
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientF64;

    impl<'de> Visitor<'de> for LenientF64 {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number, a numeric string or null")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(v.is_finite().then_some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.trim().parse::<f64>().ok().filter(|x| x.is_finite()))
        }

        fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(LenientF64)
        }
    }

    deserializer.deserialize_any(LenientF64)
}
