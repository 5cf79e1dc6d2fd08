use serde::Serialize;

/// The nine filterable record attributes, in the order the backend
/// documents them and the sidebar displays them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterField {
    EndYear,
    Topic,
    Sector,
    Region,
    Pest,
    Source,
    Swot,
    Country,
    City,
}

impl FilterField {
    pub const ALL: [Self; 9] = [
        Self::EndYear,
        Self::Topic,
        Self::Sector,
        Self::Region,
        Self::Pest,
        Self::Source,
        Self::Swot,
        Self::Country,
        Self::City,
    ];

    /// Wire name, used both as the query parameter key and the JSON key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EndYear => "endYear",
            Self::Topic => "topic",
            Self::Sector => "sector",
            Self::Region => "region",
            Self::Pest => "pest",
            Self::Source => "source",
            Self::Swot => "swot",
            Self::Country => "country",
            Self::City => "city",
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::EndYear),
            1 => Some(Self::Topic),
            2 => Some(Self::Sector),
            3 => Some(Self::Region),
            4 => Some(Self::Pest),
            5 => Some(Self::Source),
            6 => Some(Self::Swot),
            7 => Some(Self::Country),
            8 => Some(Self::City),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "endyear" | "end_year" => Some(Self::EndYear),
            "topic" => Some(Self::Topic),
            "sector" => Some(Self::Sector),
            "region" => Some(Self::Region),
            "pest" | "pestle" => Some(Self::Pest),
            "source" => Some(Self::Source),
            "swot" => Some(Self::Swot),
            "country" => Some(Self::Country),
            "city" => Some(Self::City),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EndYear => "End Year",
            Self::Topic => "Topic",
            Self::Sector => "Sector",
            Self::Region => "Region",
            Self::Pest => "PEST",
            Self::Source => "Source",
            Self::Swot => "SWOT",
            Self::Country => "Country",
            Self::City => "City",
        }
    }
}

/// The current filter selection. An empty string means "All" on that
/// dimension; the full state is sent with every fetch, empties included,
/// which the backend treats as unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub end_year: String,
    pub topic: String,
    pub sector: String,
    pub region: String,
    pub pest: String,
    pub source: String,
    pub swot: String,
    pub country: String,
    pub city: String,
}

impl FilterState {
    pub fn get(&self, field: FilterField) -> &str {
        match field {
            FilterField::EndYear => &self.end_year,
            FilterField::Topic => &self.topic,
            FilterField::Sector => &self.sector,
            FilterField::Region => &self.region,
            FilterField::Pest => &self.pest,
            FilterField::Source => &self.source,
            FilterField::Swot => &self.swot,
            FilterField::Country => &self.country,
            FilterField::City => &self.city,
        }
    }

    /// Replaces exactly one entry, leaving the other eight untouched.
    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let slot = match field {
            FilterField::EndYear => &mut self.end_year,
            FilterField::Topic => &mut self.topic,
            FilterField::Sector => &mut self.sector,
            FilterField::Region => &mut self.region,
            FilterField::Pest => &mut self.pest,
            FilterField::Source => &mut self.source,
            FilterField::Swot => &mut self.swot,
            FilterField::Country => &mut self.country,
            FilterField::City => &mut self.city,
        };
        *slot = value.into();
    }

    /// All nine entries as query parameters, in declaration order.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        FilterField::ALL
            .iter()
            .map(|field| (field.as_str(), self.get(*field).to_string()))
            .collect()
    }

    pub fn is_unfiltered(&self) -> bool {
        FilterField::ALL
            .iter()
            .all(|field| self.get(*field).is_empty())
    }

    /// Count of dimensions with an active constraint.
    pub fn active_count(&self) -> usize {
        FilterField::ALL
            .iter()
            .filter(|field| !self.get(**field).is_empty())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for field in FilterField::ALL {
            assert_eq!(FilterField::parse(field.as_str()), Some(field));
        }
        assert_eq!(FilterField::parse("pestle"), Some(FilterField::Pest));
        assert_eq!(FilterField::parse("bogus"), None);
    }

    #[test]
    fn set_replaces_single_entry() {
        let mut filters = FilterState::default();
        filters.set(FilterField::Region, "Asia");

        assert_eq!(filters.get(FilterField::Region), "Asia");
        assert_eq!(filters.active_count(), 1);
        for field in FilterField::ALL {
            if field != FilterField::Region {
                assert_eq!(filters.get(field), "");
            }
        }
    }

    #[test]
    fn query_params_cover_all_nine_dimensions() {
        let mut filters = FilterState::default();
        filters.set(FilterField::Region, "Asia");

        let params = filters.query_params();
        assert_eq!(params.len(), 9);
        assert!(params.contains(&("region", "Asia".to_string())));
        // Unconstrained dimensions are still sent, as empty values.
        assert!(params.contains(&("topic", String::new())));
        assert_eq!(params[0].0, "endYear");
    }

    #[test]
    fn unfiltered_detection() {
        let mut filters = FilterState::default();
        assert!(filters.is_unfiltered());
        filters.set(FilterField::City, "Lagos");
        assert!(!filters.is_unfiltered());
        filters.set(FilterField::City, "");
        assert!(filters.is_unfiltered());
    }
}
