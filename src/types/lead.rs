//! Lead types

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PlannerError;

pub const UNKNOWN_NAME: &str = "Unknown Name";
pub const ADDRESS_UNAVAILABLE: &str = "Address not available";
pub const NOT_AVAILABLE: &str = "Not available";
pub const NOT_RATED: &str = "Not rated";

/// Coordinates
///
/// `(0, 0)` stands for "location unknown" and is never treated as a real
/// place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const UNKNOWN: Coordinates = Coordinates { lat: 0.0, lng: 0.0 };

    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_unknown(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }

    /// Check latitude/longitude ranges (NaN is rejected)
    pub fn validate(&self) -> Result<(), PlannerError> {
        let lat_ok = (-90.0..=90.0).contains(&self.lat);
        let lng_ok = (-180.0..=180.0).contains(&self.lng);
        if lat_ok && lng_ok {
            Ok(())
        } else {
            Err(PlannerError::InvalidCoordinates {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }

    /// Known and in range, i.e. usable as a route stop
    pub fn is_routable(&self) -> bool {
        !self.is_unknown() && self.validate().is_ok()
    }
}

/// Anything that sits at a point on the map
pub trait Located {
    fn location(&self) -> Coordinates;
}

impl Located for Coordinates {
    fn location(&self) -> Coordinates {
        *self
    }
}

impl<T: Located + ?Sized> Located for &T {
    fn location(&self) -> Coordinates {
        (**self).location()
    }
}

/// Star rating of a lead
///
/// On the wire a rated lead carries the number, an unrated one the string
/// "Not rated".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Rating {
    /// 0-5
    Rated(f64),
    #[default]
    Unrated,
}

impl From<Option<f64>> for Rating {
    /// Values outside 0-5 (or NaN) count as unrated
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(rating) if (0.0..=5.0).contains(&rating) => Rating::Rated(rating),
            _ => Rating::Unrated,
        }
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rating::Rated(value) => serializer.serialize_f64(*value),
            Rating::Unrated => serializer.serialize_str(NOT_RATED),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRating {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawRating>::deserialize(deserializer)?;
        Ok(match raw {
            Some(RawRating::Number(value)) => Rating::from(Some(value)),
            Some(RawRating::Text(_)) | None => Rating::Unrated,
        })
    }
}

/// Raw place record as returned by the search collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRecord {
    pub id: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub place_type: Option<String>,
    #[serde(default)]
    pub hours: Vec<String>,
    pub location: Option<Coordinates>,
}

/// A discovered business, immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    #[serde(default)]
    pub rating: Rating,
    pub review_count: Option<u32>,
    /// Tag supplied by the search request
    pub category: String,
    #[serde(default)]
    pub hours: Vec<String>,
    #[serde(default)]
    pub location: Coordinates,
}

impl Lead {
    /// Build a lead from a place record, filling display sentinels
    pub fn from_place(record: PlaceRecord, category: &str) -> Self {
        let location = record
            .location
            .filter(|c| c.validate().is_ok())
            .unwrap_or(Coordinates::UNKNOWN);

        Self {
            id: record.id,
            name: non_blank(record.name).unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            address: non_blank(record.address).unwrap_or_else(|| ADDRESS_UNAVAILABLE.to_string()),
            phone: non_blank(record.phone).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            website: non_blank(record.website).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            rating: Rating::from(record.rating),
            review_count: record.review_count,
            category: category.to_string(),
            hours: record.hours,
            location,
        }
    }

    pub fn has_name(&self) -> bool {
        !self.name.is_empty() && self.name != UNKNOWN_NAME
    }

    pub fn has_address(&self) -> bool {
        !self.address.is_empty() && self.address != ADDRESS_UNAVAILABLE
    }
}

impl Located for Lead {
    fn location(&self) -> Coordinates {
        self.location
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
