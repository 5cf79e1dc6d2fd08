use serde::{Deserialize, Serialize};

use crate::domain::FilterField;

/// One survey/report data point as the backend returns it. Every
/// classification field may be null or absent; scores may be missing and
/// count as 0 during aggregation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Record {
    #[serde(rename = "endYear")]
    pub end_year: Option<String>,
    pub topic: Option<String>,
    pub sector: Option<String>,
    pub region: Option<String>,
    pub pest: Option<String>,
    pub source: Option<String>,
    pub swot: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub intensity: Option<f64>,
    pub likelihood: Option<f64>,
    pub relevance: Option<f64>,
    pub published: Option<String>,
}

impl Record {
    /// The value of one of the nine filterable attributes, empty when the
    /// backend sent nothing.
    pub fn field(&self, field: FilterField) -> &str {
        let value = match field {
            FilterField::EndYear => &self.end_year,
            FilterField::Topic => &self.topic,
            FilterField::Sector => &self.sector,
            FilterField::Region => &self.region,
            FilterField::Pest => &self.pest,
            FilterField::Source => &self.source,
            FilterField::Swot => &self.swot,
            FilterField::Country => &self.country,
            FilterField::City => &self.city,
        };
        value.as_deref().unwrap_or("")
    }

    pub fn published(&self) -> &str {
        self.published.as_deref().unwrap_or("")
    }

    /// Year token of the `published` date string: split on `", "`, take
    /// the second segment. This is the only date parsing performed.
    pub fn published_year(&self) -> &str {
        self.published().split(", ").nth(1).unwrap_or("")
    }

    pub fn intensity(&self) -> f64 {
        self.intensity.unwrap_or(0.0)
    }

    pub fn likelihood(&self) -> f64 {
        self.likelihood.unwrap_or(0.0)
    }

    pub fn relevance(&self) -> f64 {
        self.relevance.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_year_splits_on_comma_space() {
        let record = Record {
            published: Some("January, 20 2017 03:51:25".to_string()),
            ..Record::default()
        };
        assert_eq!(record.published_year(), "20 2017 03:51:25");

        let record = Record {
            published: Some("1, 2015".to_string()),
            ..Record::default()
        };
        assert_eq!(record.published_year(), "2015");
    }

    #[test]
    fn published_year_is_empty_without_second_segment() {
        let record = Record {
            published: Some("2015".to_string()),
            ..Record::default()
        };
        assert_eq!(record.published_year(), "");
        assert_eq!(Record::default().published_year(), "");
    }

    #[test]
    fn missing_scores_read_as_zero() {
        let record = Record::default();
        assert_eq!(record.intensity(), 0.0);
        assert_eq!(record.likelihood(), 0.0);
        assert_eq!(record.relevance(), 0.0);
    }

    #[test]
    fn deserializes_sparse_payloads() {
        let record: Record = serde_json::from_str(
            r#"{"endYear":"2027","sector":"Energy","intensity":6,"published":"2, 2015"}"#,
        )
        .unwrap();
        assert_eq!(record.field(FilterField::EndYear), "2027");
        assert_eq!(record.field(FilterField::Sector), "Energy");
        assert_eq!(record.field(FilterField::City), "");
        assert_eq!(record.intensity(), 6.0);

        let record: Record = serde_json::from_str(r#"{"topic":null,"region":"EU"}"#).unwrap();
        assert_eq!(record.field(FilterField::Topic), "");
        assert_eq!(record.field(FilterField::Region), "EU");
    }
}
