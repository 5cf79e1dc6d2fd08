use clap::Parser;
use color_eyre::eyre::eyre;

use crate::domain::{FilterField, FilterState};

#[derive(Debug, Parser)]
#[command(name = "insight_dash", version, about = "Market Insight Dashboard")]
pub struct CliArgs {
    /// Fetch once, print an aggregated snapshot, and exit
    #[arg(long)]
    pub headless: bool,

    /// Print the headless snapshot as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Override the backend endpoint
    #[arg(long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,

    /// Seed a filter before the first fetch, e.g. --filter region=Asia
    /// (repeatable; unlisted attributes stay on "All")
    #[arg(long = "filter", value_name = "NAME=VALUE")]
    pub filters: Vec<String>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(url) = &self.api_url {
            std::env::set_var("DASH_API_URL", url);
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }

    /// The initial filter selection from the repeated --filter flags.
    pub fn initial_filters(&self) -> color_eyre::Result<FilterState> {
        let mut state = FilterState::default();
        for entry in &self.filters {
            let (name, value) = entry
                .split_once('=')
                .ok_or_else(|| eyre!("invalid --filter '{entry}', expected NAME=VALUE"))?;
            let field = FilterField::parse(name)
                .ok_or_else(|| eyre!("unknown filter attribute '{name}'"))?;
            state.set(field, value);
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_flags_seed_the_initial_state() {
        let args = CliArgs::try_parse_from([
            "insight_dash",
            "--filter",
            "region=Asia",
            "--filter",
            "pest=Economic",
        ])
        .unwrap();

        let filters = args.initial_filters().unwrap();
        assert_eq!(filters.get(FilterField::Region), "Asia");
        assert_eq!(filters.get(FilterField::Pest), "Economic");
        assert_eq!(filters.get(FilterField::Topic), "");
        assert_eq!(filters.active_count(), 2);
    }

    #[test]
    fn malformed_filter_flags_are_rejected() {
        let args = CliArgs::try_parse_from(["insight_dash", "--filter", "region"]).unwrap();
        assert!(args.initial_filters().is_err());

        let args = CliArgs::try_parse_from(["insight_dash", "--filter", "flavor=sour"]).unwrap();
        assert!(args.initial_filters().is_err());
    }

    #[test]
    fn values_may_contain_equals_signs() {
        let args =
            CliArgs::try_parse_from(["insight_dash", "--filter", "topic=a=b"]).unwrap();
        let filters = args.initial_filters().unwrap();
        assert_eq!(filters.get(FilterField::Topic), "a=b");
    }
}
