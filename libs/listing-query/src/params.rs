//! Query-string normalization.
//!
//! Every parameter arrives as a string (or not at all). Normalization never
//! fails: unparseable numbers, unknown buckets and empty values are treated
//! as absent, and paging falls back to defaults.

use crate::pagination::PagePlan;
use crate::price::PriceBucket;
use crate::sort::SortSpec;

/// Page size used when the request does not specify `limit`.
pub const DEFAULT_PAGE_SIZE: u64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizerOptions {
    pub default_limit: u64,
    /// Upper bound for `limit`. `None` accepts any page size.
    pub max_limit: Option<u64>,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_SIZE,
            max_limit: None,
        }
    }
}

impl NormalizerOptions {
    /// Applies defaults and the optional cap to already parsed paging values.
    pub fn page_plan(&self, page: Option<u64>, limit: Option<u64>) -> PagePlan {
        let mut limit = limit.unwrap_or(self.default_limit);
        if let Some(max) = self.max_limit {
            limit = limit.min(max);
        }
        PagePlan::new(page.unwrap_or(1), limit)
    }

    /// Reads only `page` and `limit` from raw query items, for listings
    /// that share the paging rules but none of the property filters.
    pub fn page_from_items(&self, items: &[(String, String)]) -> PagePlan {
        let mut page = None;
        let mut limit = None;
        for (name, raw) in items {
            let value = raw.trim();
            match name.as_str() {
                "page" if !value.is_empty() => page = parse_count(name, value),
                "limit" if !value.is_empty() => limit = parse_count(name, value),
                _ => {}
            }
        }
        self.page_plan(page, limit)
    }
}

/// Typed view of a property search request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery {
    pub page: PagePlan,
    /// `limit` as sent by the client, when it parsed.
    pub requested_limit: Option<u64>,
    pub sort: SortSpec,

    /// Lower-cased property type.
    pub property_type: Option<String>,
    pub status: Option<String>,

    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub price_range: Option<PriceBucket>,

    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub floors: Option<i64>,
    pub parking: Option<i64>,
    pub min_year_built: Option<i64>,
    pub max_year_built: Option<i64>,

    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,

    pub amenities: Vec<String>,
    pub featured: Option<bool>,

    /// General free-text term (`search`).
    pub search: Option<String>,
    /// Place-scoped free-text term (`location`).
    pub location: Option<String>,
    /// Quick-search term (`q`).
    pub term: Option<String>,
}

impl ListingQuery {
    pub fn from_items(items: &[(String, String)]) -> Self {
        Self::from_items_with(items, &NormalizerOptions::default())
    }

    /// Normalizes raw query items. For repeated scalar parameters the last
    /// occurrence wins; `amenities` accumulates across occurrences.
    pub fn from_items_with(items: &[(String, String)], options: &NormalizerOptions) -> Self {
        let mut query = ListingQuery::default();
        let mut page = None;
        let mut limit = None;
        let mut sort_by = None;
        let mut sort_order = None;

        for (name, raw) in items {
            let value = raw.trim();
            if value.is_empty() {
                continue;
            }

            match name.as_str() {
                "page" => page = parse_count(name, value),
                "limit" => limit = parse_count(name, value),
                "sortBy" => sort_by = Some(value),
                "sortOrder" => sort_order = Some(value),
                "type" => query.property_type = Some(value.to_lowercase()),
                "status" => query.status = Some(value.to_string()),
                "minPrice" => query.min_price = parse_number(name, value),
                "maxPrice" => query.max_price = parse_number(name, value),
                "priceRange" => query.price_range = PriceBucket::parse(value),
                "bedrooms" => query.bedrooms = parse_integer(name, value),
                "bathrooms" => query.bathrooms = parse_integer(name, value),
                "floors" => query.floors = parse_integer(name, value),
                "parking" => query.parking = parse_integer(name, value),
                "minYearBuilt" => query.min_year_built = parse_integer(name, value),
                "maxYearBuilt" => query.max_year_built = parse_integer(name, value),
                "city" => query.city = Some(value.to_string()),
                "state" => query.state = Some(value.to_string()),
                "country" => query.country = Some(value.to_string()),
                "zipCode" => query.zip_code = Some(value.to_string()),
                "amenities" => query.amenities.extend(split_list(value)),
                "featured" => query.featured = Some(value == "true"),
                "search" => query.search = Some(value.to_string()),
                "location" => query.location = Some(value.to_string()),
                "q" => query.term = Some(value.to_string()),
                _ => {}
            }
        }

        query.page = options.page_plan(page, limit);
        query.requested_limit = limit;
        query.sort = SortSpec::from_params(sort_by, sort_order);
        query
    }
}

fn parse_count(name: &str, value: &str) -> Option<u64> {
    let parsed = value.parse::<u64>().ok();
    if parsed.is_none() {
        tracing::debug!(param = name, value, "ignoring unparseable paging parameter");
    }
    parsed
}

fn parse_integer(name: &str, value: &str) -> Option<i64> {
    let parsed = value.parse::<i64>().ok();
    if parsed.is_none() {
        tracing::debug!(param = name, value, "ignoring unparseable integer parameter");
    }
    parsed
}

fn parse_number(name: &str, value: &str) -> Option<f64> {
    let parsed = value.parse::<f64>().ok().filter(|n| n.is_finite());
    if parsed.is_none() {
        tracing::debug!(param = name, value, "ignoring unparseable numeric parameter");
    }
    parsed
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
