use strum::IntoEnumIterator;
use tracing::instrument;

use super::PaletteService;
use crate::{engine::UsageRanker, errors::Result, model::Catalog, storage::GlyphUsage};

/// A catalog entry along with its persisted usage
#[derive(Clone, Debug, PartialEq)]
pub struct UsageEntry {
    pub catalog: Catalog,
    pub glyph: Option<&'static str>,
    pub usage: GlyphUsage,
}

impl PaletteService {
    /// Loads the usage counters of every catalog into a ranker
    #[instrument(skip_all)]
    pub async fn load_usage(&self) -> Result<UsageRanker> {
        let mut ranker = UsageRanker::default();
        for catalog in Catalog::iter() {
            let usage = self.storage.load_usage(catalog).await?;
            tracing::debug!("Loaded {} usage counters for {catalog}", usage.len());
            ranker.load(catalog, usage.into_iter().map(|u| (u.name, u.usage_count)));
        }
        Ok(ranker)
    }

    /// Lists the usage of the given catalog, or every catalog, most used first
    #[instrument(skip_all)]
    pub async fn usage_report(&self, catalog: Option<Catalog>) -> Result<Vec<UsageEntry>> {
        let mut entries = Vec::new();
        for catalog in Catalog::iter().filter(|c| catalog.is_none_or(|only| only == *c)) {
            let mut usage = self.storage.load_usage(catalog).await?;
            usage.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
            entries.extend(usage.into_iter().map(|usage| UsageEntry {
                catalog,
                glyph: catalog.glyph(&usage.name),
                usage,
            }));
        }
        Ok(entries)
    }

    /// Resets the usage counters of the given catalog, or every catalog
    #[instrument(skip_all)]
    pub async fn reset_usage(&self, catalog: Option<Catalog>) -> Result<usize> {
        self.storage.reset_usage(catalog).await
    }
}
