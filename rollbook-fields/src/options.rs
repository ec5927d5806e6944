//! Fixed option lists (status enums, months, weeks).

use async_trait::async_trait;
use rollbook_common::{ApiError, EnumOption};
use serde_json::Value;

use crate::types::{Enriched, EnrichmentSource};

/// An in-memory option list.
///
/// As an [`EnrichmentSource`] it returns every option and lets the badge
/// renderer pick the match. [`StaticOptions::search`] filters by name or
/// label, case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticOptions {
    options: Vec<EnumOption>,
}

impl StaticOptions {
    pub fn new(options: Vec<EnumOption>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &[EnumOption] {
        &self.options
    }

    /// Options whose name or label contains `search`.
    pub fn search(&self, search: &str) -> Vec<EnumOption> {
        self.options
            .iter()
            .filter(|o| o.matches_search(search))
            .cloned()
            .collect()
    }

    /// January through December, valued 1-12.
    pub fn months() -> Self {
        const NAMES: [&str; 12] = [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ];
        Self::new(
            NAMES
                .iter()
                .zip(1..)
                .map(|(name, n): (&&str, i64)| EnumOption::new(n, *name))
                .collect(),
        )
    }

    /// "All weeks" (0) followed by weeks 1 to `count`.
    pub fn weeks(count: i64) -> Self {
        let all = std::iter::once(EnumOption::new(0, "All weeks"));
        let weeks = (1..=count).map(|n| EnumOption::new(n, format!("Week {n}")));
        Self::new(all.chain(weeks).collect())
    }
}

impl FromIterator<EnumOption> for StaticOptions {
    fn from_iter<I: IntoIterator<Item = EnumOption>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[async_trait]
impl EnrichmentSource for StaticOptions {
    async fn lookup(&self, _value: &Value) -> Result<Enriched, ApiError> {
        Ok(Enriched::Many(self.options.clone()))
    }
}
