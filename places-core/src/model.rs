use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, convert::TryFrom};

use crate::coords::{Coordinates, extract_coordinates};

/// A place as returned by `GET /place`, before coordinates are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
}

/// A place augmented with the coordinates encoded in its address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Place {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

impl From<PlaceRecord> for Place {
    fn from(record: PlaceRecord) -> Self {
        let Coordinates {
            latitude,
            longitude,
        } = extract_coordinates(&record.address);

        Self {
            id: record.id,
            name: record.name,
            kind: record.kind,
            address: record.address,
            latitude,
            longitude,
        }
    }
}

/// Flat `{field name -> value}` body sent by `POST /place`.
pub type PlacePayload = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceType {
    Restaurant,
    Hotel,
    Park,
}

impl PlaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceType::Restaurant => "Restaurant",
            PlaceType::Hotel => "Hotel",
            PlaceType::Park => "Park",
        }
    }

    pub const fn all() -> &'static [PlaceType] {
        &[PlaceType::Restaurant, PlaceType::Hotel, PlaceType::Park]
    }
}

impl std::fmt::Display for PlaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PlaceType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        match lower.as_str() {
            "restaurant" => Ok(PlaceType::Restaurant),
            "hotel" => Ok(PlaceType::Hotel),
            "park" => Ok(PlaceType::Park),
            _ => Err(anyhow::anyhow!(
                "Unknown place type '{value}'. Supported types: Restaurant, Hotel, Park."
            )),
        }
    }
}

/// Current conditions as returned by `GET /weather`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub main: WeatherMain,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherMain {
    /// Kelvin.
    pub temp: f64,
    pub pressure: f64,
}

impl WeatherSample {
    pub fn temperature_celsius(&self) -> f64 {
        self.main.temp - 273.15
    }

    pub fn pressure(&self) -> f64 {
        self.main.pressure
    }
}
