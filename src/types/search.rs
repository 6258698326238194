//! Search request types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// Cities covered by the sales team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    Surat,
    Vadodara,
    Ahmedabad,
}

impl City {
    pub const ALL: [City; 3] = [City::Surat, City::Vadodara, City::Ahmedabad];

    pub const fn as_str(self) -> &'static str {
        match self {
            City::Surat => "Surat",
            City::Vadodara => "Vadodara",
            City::Ahmedabad => "Ahmedabad",
        }
    }

    pub const fn areas(self) -> &'static [&'static str] {
        match self {
            City::Surat => &[
                "Adajan",
                "Athwa",
                "Vesu",
                "Katargam",
                "Piplod",
                "Pal",
                "Althan",
                "Varachha",
                "Sarthana",
                "Mota Varachha",
            ],
            City::Vadodara => &[
                "Alkapuri",
                "Gotri",
                "Fatehgunj",
                "Akota",
                "Manjalpur",
                "Tandalja",
                "Waghodia Road",
                "Subhanpura",
                "Karelibaug",
                "Harni",
            ],
            City::Ahmedabad => &[
                "Satellite",
                "Vastrapur",
                "Navrangpura",
                "Paldi",
                "Bopal",
                "Ghatlodia",
                "Thaltej",
                "Bodakdev",
                "Sola",
                "S.G. Highway",
            ],
        }
    }

    /// Canonical spelling of `area` if it belongs to this city
    pub fn find_area(self, area: &str) -> Option<&'static str> {
        let area = area.trim();
        self.areas()
            .iter()
            .copied()
            .find(|known| known.eq_ignore_ascii_case(area))
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for City {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        City::ALL
            .into_iter()
            .find(|city| city.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PlannerError::InvalidSearch(format!("unknown city '{}'", s)))
    }
}

/// Search form input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub city: String,
    pub category: String,
    pub area: String,
}

/// Search request after validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSearch {
    pub city: City,
    pub area: &'static str,
    pub category: String,
}

impl SearchRequest {
    /// All three fields are required and the area must belong to the city
    pub fn validate(&self) -> Result<ValidatedSearch, PlannerError> {
        let category = self.category.trim();
        if category.is_empty() {
            return Err(PlannerError::InvalidSearch("category is required".into()));
        }

        let city: City = self.city.parse()?;
        let area = city.find_area(&self.area).ok_or_else(|| {
            PlannerError::InvalidSearch(format!("area '{}' is not part of {}", self.area.trim(), city))
        })?;

        Ok(ValidatedSearch {
            city,
            area,
            category: category.to_string(),
        })
    }
}

impl ValidatedSearch {
    /// Free-text query sent to the places collaborator
    pub fn query(&self, region: &str) -> String {
        let query = format!("{} in {} {}", self.category, self.area, self.city);
        match region.trim() {
            "" => query,
            region => format!("{} {}", query, region),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(city: &str, category: &str, area: &str) -> SearchRequest {
        SearchRequest {
            city: city.into(),
            category: category.into(),
            area: area.into(),
        }
    }

    #[test]
    fn test_validate_builds_query() {
        let search = request("Surat", "cafe", "Adajan").validate().unwrap();
        assert_eq!(search.city, City::Surat);
        assert_eq!(search.query("Gujarat"), "cafe in Adajan Surat Gujarat");
        assert_eq!(search.query(""), "cafe in Adajan Surat");
    }

    #[test]
    fn test_validate_is_case_insensitive() {
        let search = request("ahmedabad", "school", "s.g. highway").validate().unwrap();
        assert_eq!(search.city, City::Ahmedabad);
        assert_eq!(search.area, "S.G. Highway");
    }

    #[test]
    fn test_validate_rejects_area_of_other_city() {
        let err = request("Vadodara", "cafe", "Adajan").validate().unwrap_err();
        assert!(matches!(err, PlannerError::InvalidSearch(_)));
    }

    #[test]
    fn test_validate_rejects_blank_category() {
        assert!(request("Surat", "  ", "Adajan").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_city() {
        let err = request("Mumbai", "cafe", "Bandra").validate().unwrap_err();
        assert!(err.to_string().contains("Mumbai"));
    }

    #[test]
    fn test_every_city_has_ten_areas() {
        for city in City::ALL {
            assert_eq!(city.areas().len(), 10, "{}", city);
        }
    }
}
