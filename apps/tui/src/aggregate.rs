//! Pure derivation of filter options and chart payloads from a record
//! list. Nothing here touches the network or the UI; every function is
//! total on the empty list and re-runs in full on each invocation.

use serde::Serialize;

use crate::api::models::Record;
use crate::domain::FilterField;

/// Distinct non-empty values observed per filterable attribute in the
/// most recent fetch result. Recomputed wholesale on every data arrival,
/// never merged with earlier values, so options narrow as the server-side
/// result set narrows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub end_years: Vec<String>,
    pub topics: Vec<String>,
    pub sectors: Vec<String>,
    pub regions: Vec<String>,
    pub pests: Vec<String>,
    pub sources: Vec<String>,
    pub swots: Vec<String>,
    pub countries: Vec<String>,
    pub cities: Vec<String>,
}

impl FilterOptions {
    pub fn for_field(&self, field: FilterField) -> &[String] {
        match field {
            FilterField::EndYear => &self.end_years,
            FilterField::Topic => &self.topics,
            FilterField::Sector => &self.sectors,
            FilterField::Region => &self.regions,
            FilterField::Pest => &self.pests,
            FilterField::Source => &self.sources,
            FilterField::Swot => &self.swots,
            FilterField::Country => &self.countries,
            FilterField::City => &self.cities,
        }
    }
}

/// Three score series kept positionally parallel to a label array.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreSeries {
    pub intensity: Vec<f64>,
    pub likelihood: Vec<f64>,
    pub relevance: Vec<f64>,
}

impl ScoreSeries {
    fn from_records(records: &[Record]) -> Self {
        Self {
            intensity: records.iter().map(Record::intensity).collect(),
            likelihood: records.iter().map(Record::likelihood).collect(),
            relevance: records.iter().map(Record::relevance).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.intensity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intensity.is_empty()
    }
}

/// One label per record (topic, duplicates retained) with the three score
/// series taken positionally from the same record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryChart {
    pub labels: Vec<String>,
    pub series: ScoreSeries,
}

/// Distinct sectors in first-seen order (the empty sector is a bucket of
/// its own here) with the record count per sector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DistributionChart {
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
}

/// Year token per record, positional, unsorted and undeduplicated: the
/// axis repeats and may run non-monotonic exactly as the records do.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendChart {
    pub labels: Vec<String>,
    pub series: ScoreSeries,
}

/// Region (columns) by publication-year token (rows) intensity sums.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Heatmap {
    pub rows: Vec<String>,
    pub cols: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
}

impl Heatmap {
    pub fn max_value(&self) -> f64 {
        self.matrix
            .iter()
            .flatten()
            .copied()
            .fold(0.0_f64, f64::max)
    }
}

/// Distinct values in first-seen order; duplicates collapse to the first
/// occurrence. Empty strings are kept.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|existing| existing == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

fn distinct_non_empty<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut options = distinct(values);
    options.retain(|value| !value.is_empty());
    options
}

pub fn derive_options(records: &[Record]) -> FilterOptions {
    let column =
        |field: FilterField| distinct_non_empty(records.iter().map(move |r| r.field(field)));

    FilterOptions {
        end_years: column(FilterField::EndYear),
        topics: column(FilterField::Topic),
        sectors: column(FilterField::Sector),
        regions: column(FilterField::Region),
        pests: column(FilterField::Pest),
        sources: column(FilterField::Source),
        swots: column(FilterField::Swot),
        countries: column(FilterField::Country),
        cities: column(FilterField::City),
    }
}

pub fn build_category_chart(records: &[Record]) -> CategoryChart {
    CategoryChart {
        labels: records
            .iter()
            .map(|r| r.field(FilterField::Topic).to_string())
            .collect(),
        series: ScoreSeries::from_records(records),
    }
}

pub fn build_distribution_chart(records: &[Record]) -> DistributionChart {
    let labels = distinct(records.iter().map(|r| r.field(FilterField::Sector)));
    let counts = labels
        .iter()
        .map(|label| {
            records
                .iter()
                .filter(|r| r.field(FilterField::Sector) == label)
                .count() as u64
        })
        .collect();

    DistributionChart { labels, counts }
}

pub fn build_trend_chart(records: &[Record]) -> TrendChart {
    TrendChart {
        labels: records
            .iter()
            .map(|r| r.published_year().to_string())
            .collect(),
        series: ScoreSeries::from_records(records),
    }
}

/// Cell (r, c) sums intensity over records whose region equals `cols[c]`
/// and whose `published` string contains `rows[r]` as a substring. The
/// substring match is intentional legacy behavior: a token that is a
/// prefix of another year's token counts both cells.
pub fn build_heatmap(records: &[Record]) -> Heatmap {
    let cols = distinct(records.iter().map(|r| r.field(FilterField::Region)));
    let rows = distinct(records.iter().map(Record::published_year));

    let matrix = rows
        .iter()
        .map(|year| {
            cols.iter()
                .map(|region| {
                    records
                        .iter()
                        .filter(|r| {
                            r.field(FilterField::Region) == region
                                && r.published().contains(year.as_str())
                        })
                        .map(Record::intensity)
                        .sum()
                })
                .collect()
        })
        .collect();

    Heatmap { rows, cols, matrix }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(FilterField, &str)], published: &str, intensity: f64) -> Record {
        let mut record = Record {
            intensity: Some(intensity),
            likelihood: Some(1.0),
            relevance: Some(2.0),
            ..Record::default()
        };
        if !published.is_empty() {
            record.published = Some(published.to_string());
        }
        for (field, value) in fields {
            let slot = Some((*value).to_string());
            match field {
                FilterField::EndYear => record.end_year = slot,
                FilterField::Topic => record.topic = slot,
                FilterField::Sector => record.sector = slot,
                FilterField::Region => record.region = slot,
                FilterField::Pest => record.pest = slot,
                FilterField::Source => record.source = slot,
                FilterField::Swot => record.swot = slot,
                FilterField::Country => record.country = slot,
                FilterField::City => record.city = slot,
            }
        }
        record
    }

    #[test]
    fn options_drop_empties_and_duplicates() {
        let records = vec![
            record(&[(FilterField::Topic, "gas"), (FilterField::Region, "Asia")], "", 1.0),
            record(&[(FilterField::Topic, "oil")], "", 1.0),
            record(&[(FilterField::Topic, "gas")], "", 1.0),
            record(&[], "", 1.0),
        ];

        let options = derive_options(&records);
        assert_eq!(options.topics, vec!["gas", "oil"]);
        assert_eq!(options.regions, vec!["Asia"]);
        assert!(options.cities.is_empty());
        for field in FilterField::ALL {
            let values = options.for_field(field);
            assert!(!values.iter().any(String::is_empty));
            let deduped = distinct(values.iter().map(String::as_str));
            assert_eq!(values, deduped.as_slice());
        }
    }

    #[test]
    fn category_chart_is_positional() {
        let records = vec![
            record(&[(FilterField::Topic, "gas")], "", 3.0),
            record(&[(FilterField::Topic, "gas")], "", 5.0),
            record(&[], "", 0.0),
        ];

        let chart = build_category_chart(&records);
        // Duplicates and empties are retained, one label per record.
        assert_eq!(chart.labels, vec!["gas", "gas", ""]);
        assert_eq!(chart.series.len(), records.len());
        assert_eq!(chart.series.intensity, vec![3.0, 5.0, 0.0]);
        assert_eq!(chart.series.likelihood.len(), chart.labels.len());
        assert_eq!(chart.series.relevance.len(), chart.labels.len());
    }

    #[test]
    fn distribution_counts_conserve_record_count() {
        let records = vec![
            record(&[(FilterField::Sector, "Energy")], "", 1.0),
            record(&[(FilterField::Sector, "Energy")], "", 1.0),
            record(&[(FilterField::Sector, "Health")], "", 1.0),
        ];

        let chart = build_distribution_chart(&records);
        assert_eq!(chart.labels, vec!["Energy", "Health"]);
        assert_eq!(chart.counts, vec![2, 1]);
        assert_eq!(chart.counts.iter().sum::<u64>(), records.len() as u64);
    }

    #[test]
    fn distribution_keeps_the_empty_sector_bucket() {
        let records = vec![
            record(&[], "", 1.0),
            record(&[(FilterField::Sector, "Retail")], "", 1.0),
        ];

        let chart = build_distribution_chart(&records);
        assert_eq!(chart.labels, vec!["", "Retail"]);
        assert_eq!(chart.counts.iter().sum::<u64>(), 2);
    }

    #[test]
    fn trend_labels_follow_record_order_unsorted() {
        let records = vec![
            record(&[], "1, 2017", 1.0),
            record(&[], "1, 2015", 2.0),
            record(&[], "2, 2017", 3.0),
        ];

        let chart = build_trend_chart(&records);
        assert_eq!(chart.labels, vec!["2017", "2015", "2017"]);
        assert_eq!(chart.series.intensity, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn heatmap_sums_intensity_by_region_and_year() {
        let records = vec![
            record(&[(FilterField::Region, "Asia")], "1, 2015", 5.0),
            record(&[(FilterField::Region, "Asia")], "2, 2015", 3.0),
            record(&[(FilterField::Region, "EU")], "1, 2016", 2.0),
        ];

        let heatmap = build_heatmap(&records);
        assert_eq!(heatmap.cols, vec!["Asia", "EU"]);
        assert_eq!(heatmap.rows, vec!["2015", "2016"]);
        assert_eq!(heatmap.matrix, vec![vec![8.0, 0.0], vec![0.0, 2.0]]);
        assert_eq!(heatmap.max_value(), 8.0);
        assert!(heatmap.matrix.iter().flatten().all(|cell| *cell >= 0.0));
    }

    #[test]
    fn heatmap_year_match_is_substring_containment() {
        // "201" is a prefix of "2015": the truncated token's row picks up
        // the full year's records too. Legacy behavior, kept on purpose.
        let records = vec![
            record(&[(FilterField::Region, "Asia")], "1, 201", 1.0),
            record(&[(FilterField::Region, "Asia")], "1, 2015", 4.0),
        ];

        let heatmap = build_heatmap(&records);
        assert_eq!(heatmap.rows, vec!["201", "2015"]);
        assert_eq!(heatmap.matrix, vec![vec![5.0], vec![4.0]]);
    }

    #[test]
    fn builders_are_total_on_the_empty_list() {
        let records: Vec<Record> = Vec::new();

        assert_eq!(derive_options(&records), FilterOptions::default());
        let category = build_category_chart(&records);
        assert!(category.labels.is_empty() && category.series.is_empty());
        let distribution = build_distribution_chart(&records);
        assert!(distribution.labels.is_empty() && distribution.counts.is_empty());
        assert!(build_trend_chart(&records).labels.is_empty());
        let heatmap = build_heatmap(&records);
        assert!(heatmap.rows.is_empty() && heatmap.cols.is_empty() && heatmap.matrix.is_empty());
        assert_eq!(heatmap.max_value(), 0.0);
    }

    #[test]
    fn builders_are_idempotent() {
        let records = vec![
            record(&[(FilterField::Region, "Asia"), (FilterField::Sector, "Energy")], "1, 2015", 5.0),
            record(&[(FilterField::Region, "EU")], "1, 2016", 2.0),
        ];

        assert_eq!(derive_options(&records), derive_options(&records));
        assert_eq!(build_category_chart(&records), build_category_chart(&records));
        assert_eq!(
            build_distribution_chart(&records),
            build_distribution_chart(&records)
        );
        assert_eq!(build_trend_chart(&records), build_trend_chart(&records));
        assert_eq!(build_heatmap(&records), build_heatmap(&records));
    }
}
