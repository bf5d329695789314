//! Query executor for property searches
//!
//! Turns raw query items into a [`SearchPlan`], runs the page fetch and the
//! count against the store, then resolves image references for the whole
//! page with one batched upload lookup.
//!
//! The fetch and the count are independent store calls. Under concurrent
//! writes `total` may disagree with the returned page.

use homestead_query::{
    plan, ListingQuery, NormalizerOptions, PagePlan, SearchPlan, SearchVariant,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{PropertyStore, UploadStore},
    metrics::{SEARCH_RESULTS, SEARCH_TOTAL},
    models::{PropertyRecord, PropertyView},
    Result,
};

/// One page of search results plus what the envelope needs.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub items: Vec<PropertyView>,
    pub total: u64,
    pub page: PagePlan,
}

pub struct SearchService {
    properties: Arc<dyn PropertyStore>,
    uploads: Arc<dyn UploadStore>,
    options: NormalizerOptions,
    featured_page_size: u64,
}

impl SearchService {
    pub fn new(
        properties: Arc<dyn PropertyStore>,
        uploads: Arc<dyn UploadStore>,
        options: NormalizerOptions,
        featured_page_size: u64,
    ) -> Self {
        Self {
            properties,
            uploads,
            options,
            featured_page_size,
        }
    }

    /// Normalizes `query_items`, compiles them for `variant` and executes
    /// the resulting plan.
    pub async fn search(
        &self,
        variant: SearchVariant,
        query_items: &[(String, String)],
    ) -> Result<SearchPage> {
        let mut query = ListingQuery::from_items_with(query_items, &self.options);

        // The featured strip is always a single page; its size defaults
        // separately from regular listings.
        if matches!(variant, SearchVariant::Featured) {
            let limit = match query.requested_limit {
                Some(_) => query.page.limit(),
                None => self.featured_page_size,
            };
            query.page = PagePlan::new(1, limit);
        }

        let search_plan = match plan(&variant, &query) {
            Ok(p) => p,
            Err(e) => {
                SEARCH_TOTAL
                    .with_label_values(&[variant.name(), "rejected"])
                    .inc();
                return Err(e.into());
            }
        };

        self.execute(&variant, search_plan).await
    }

    #[tracing::instrument(skip_all, fields(variant = variant.name()))]
    pub async fn execute(&self, variant: &SearchVariant, plan: SearchPlan) -> Result<SearchPage> {
        tracing::debug!(
            filter = %plan.filter.to_document(),
            sort = %plan.sort.to_document(),
            skip = plan.page.skip(),
            limit = plan.page.limit(),
            "Executing property search"
        );

        let result = tokio::try_join!(
            self.properties.find_properties(&plan),
            self.properties.count_properties(&plan.filter),
        );

        let (records, total) = match result {
            Ok(found) => found,
            Err(e) => {
                SEARCH_TOTAL
                    .with_label_values(&[variant.name(), "error"])
                    .inc();
                return Err(e);
            }
        };

        let items = resolve_views(self.uploads.as_ref(), records).await?;

        SEARCH_TOTAL
            .with_label_values(&[variant.name(), "success"])
            .inc();
        SEARCH_RESULTS
            .with_label_values(&[variant.name()])
            .observe(total as f64);

        Ok(SearchPage {
            items,
            total,
            page: plan.page,
        })
    }
}

/// Replaces image ids with upload records, loading every referenced upload
/// of `records` in one batch.
pub async fn resolve_views(
    uploads: &dyn UploadStore,
    records: Vec<PropertyRecord>,
) -> Result<Vec<PropertyView>> {
    let mut seen = HashSet::new();
    let ids: Vec<Uuid> = records
        .iter()
        .flat_map(|r| r.images.iter().chain(r.featured_image.iter()))
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    let lookup: HashMap<Uuid, _> = uploads
        .load_uploads_batch(&ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(records
        .into_iter()
        .map(|record| PropertyView::resolve(record, &lookup))
        .collect())
}
