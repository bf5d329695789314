//! Filter compilation.
//!
//! [`FilterBuilder`] accumulates top-level conditions (one per field) and
//! free-text OR-groups. Groups are the only place where the shape of the
//! tree matters: a single group is attached as one `Or`, several groups are
//! attached as an `And` of `Or`s so that each group has to match on its own.

use crate::error::{QueryError, Result};
use crate::field::Field;
use crate::pagination::PagePlan;
use crate::params::ListingQuery;
use crate::predicate::{Condition, Op, Predicate, Range, Scalar, TextPattern};
use crate::sort::SortSpec;

/// Bedroom counts at or above this value mean "this many or more".
const BEDROOMS_OPEN_BUCKET: i64 = 5;

/// Fields searched by the general `search` term.
const TEXT_FIELDS: [Field; 3] = [Field::Title, Field::Description, Field::Address];

/// Fields searched by the `location` term.
const PLACE_FIELDS: [Field; 4] = [Field::Address, Field::City, Field::State, Field::Country];

/// Fields searched by the quick-search `q` term.
const QUICK_FIELDS: [Field; 5] = [
    Field::Title,
    Field::Description,
    Field::Address,
    Field::City,
    Field::State,
];

/// Endpoint flavours sharing the same normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchVariant {
    /// Basic listing with the common filters.
    List,
    /// Single free-text term over text and place fields.
    Quick,
    /// Every supported filter, including free text.
    Advanced,
    /// Every supported filter except free text.
    FilterOnly,
    /// Promoted listings only.
    Featured,
    /// Listings created by the given subject, active or not.
    Owner(String),
}

impl SearchVariant {
    pub fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Quick => "quick",
            Self::Advanced => "advanced",
            Self::FilterOnly => "filter",
            Self::Featured => "featured",
            Self::Owner(_) => "owner",
        }
    }
}

#[derive(Debug, Default)]
pub struct FilterBuilder {
    conditions: Vec<Condition>,
    groups: Vec<Vec<Condition>>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the condition for `field`, replacing any previous one.
    pub fn set(&mut self, field: Field, op: Op) -> &mut Self {
        match self.conditions.iter_mut().find(|c| c.field == field) {
            Some(existing) => existing.op = op,
            None => self.conditions.push(Condition::new(field, op)),
        }
        self
    }

    pub fn eq(&mut self, field: Field, value: impl Into<Scalar>) -> &mut Self {
        self.set(field, Op::Eq(value.into()))
    }

    pub fn matches(&mut self, field: Field, text: &str) -> &mut Self {
        self.set(field, Op::Matches(TextPattern::literal(text)))
    }

    /// Merges `range` into the range already set for `field`, bound by
    /// bound. Unbounded ranges are ignored.
    pub fn merge_range(&mut self, field: Field, range: Range) -> &mut Self {
        if range.is_unbounded() {
            return self;
        }
        let merged = match self.conditions.iter().find(|c| c.field == field) {
            Some(Condition {
                op: Op::Range(existing),
                ..
            }) => existing.merged_with(range),
            _ => range,
        };
        self.set(field, Op::Range(merged))
    }

    pub fn contains_all(&mut self, field: Field, values: &[String]) -> &mut Self {
        if values.is_empty() {
            return self;
        }
        self.set(field, Op::ContainsAll(values.to_vec()))
    }

    /// Adds an OR-group matching `text` against each of `fields`.
    pub fn any_field_matches(&mut self, fields: &[Field], text: &str) -> &mut Self {
        let group: Vec<Condition> = fields
            .iter()
            .map(|&field| Condition::new(field, Op::Matches(TextPattern::literal(text))))
            .collect();
        if !group.is_empty() {
            self.groups.push(group);
        }
        self
    }

    pub fn build(self) -> Predicate {
        let mut children: Vec<Predicate> =
            self.conditions.into_iter().map(Predicate::Cond).collect();

        let mut groups: Vec<Predicate> = self
            .groups
            .into_iter()
            .map(|group| Predicate::Or(group.into_iter().map(Predicate::Cond).collect()))
            .collect();

        match groups.len() {
            0 => {}
            1 => children.append(&mut groups),
            _ => children.push(Predicate::And(groups)),
        }

        Predicate::And(children)
    }
}

/// Everything a store needs to run one search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub filter: Predicate,
    pub sort: SortSpec,
    pub page: PagePlan,
}

pub fn plan(variant: &SearchVariant, query: &ListingQuery) -> Result<SearchPlan> {
    Ok(SearchPlan {
        filter: compile(variant, query)?,
        sort: query.sort,
        page: query.page,
    })
}

pub fn compile(variant: &SearchVariant, query: &ListingQuery) -> Result<Predicate> {
    let mut filter = FilterBuilder::new();

    match variant {
        SearchVariant::List => {
            filter.eq(Field::IsActive, true);
            apply_common(&mut filter, query);
            if let Some(city) = &query.city {
                filter.matches(Field::City, city);
            }
            apply_featured(&mut filter, query);
            apply_free_text(&mut filter, query);
        }
        SearchVariant::Quick => {
            let term = query.term.as_deref().ok_or(QueryError::MissingSearchTerm)?;
            filter.eq(Field::IsActive, true);
            filter.any_field_matches(&QUICK_FIELDS, term);
        }
        SearchVariant::Advanced => {
            filter.eq(Field::IsActive, true);
            apply_detailed(&mut filter, query);
            apply_free_text(&mut filter, query);
        }
        SearchVariant::FilterOnly => {
            filter.eq(Field::IsActive, true);
            apply_detailed(&mut filter, query);
        }
        SearchVariant::Featured => {
            filter.eq(Field::IsActive, true);
            filter.eq(Field::Featured, true);
        }
        SearchVariant::Owner(subject) => {
            if subject.trim().is_empty() {
                return Err(QueryError::MissingOwner);
            }
            filter.eq(Field::CreatedBy, subject.as_str());
            if let Some(property_type) = &query.property_type {
                filter.eq(Field::Type, property_type.as_str());
            }
            if let Some(status) = &query.status {
                filter.eq(Field::Status, status.as_str());
            }
        }
    }

    Ok(filter.build())
}

/// type, status, explicit price bounds, bedrooms and bathrooms.
fn apply_common(filter: &mut FilterBuilder, query: &ListingQuery) {
    if let Some(property_type) = &query.property_type {
        filter.eq(Field::Type, property_type.as_str());
    }
    if let Some(status) = &query.status {
        filter.eq(Field::Status, status.as_str());
    }

    filter.merge_range(Field::Price, Range::new(query.min_price, query.max_price));

    if let Some(bedrooms) = query.bedrooms {
        if bedrooms >= BEDROOMS_OPEN_BUCKET {
            filter.merge_range(Field::Bedrooms, Range::at_least(BEDROOMS_OPEN_BUCKET as f64));
        } else {
            filter.eq(Field::Bedrooms, bedrooms);
        }
    }
    if let Some(bathrooms) = query.bathrooms {
        filter.eq(Field::Bathrooms, bathrooms);
    }
}

fn apply_detailed(filter: &mut FilterBuilder, query: &ListingQuery) {
    apply_common(filter, query);

    if let Some(bucket) = query.price_range {
        filter.merge_range(Field::Price, bucket.range());
    }

    if let Some(city) = &query.city {
        filter.matches(Field::City, city);
    }
    if let Some(state) = &query.state {
        filter.matches(Field::State, state);
    }
    if let Some(country) = &query.country {
        filter.matches(Field::Country, country);
    }
    if let Some(zip_code) = &query.zip_code {
        filter.eq(Field::ZipCode, zip_code.as_str());
    }

    filter.contains_all(Field::Amenities, &query.amenities);

    filter.merge_range(
        Field::YearBuilt,
        Range::new(
            query.min_year_built.map(|y| y as f64),
            query.max_year_built.map(|y| y as f64),
        ),
    );
    if let Some(floors) = query.floors {
        filter.eq(Field::Floors, floors);
    }
    if let Some(parking) = query.parking {
        filter.eq(Field::Parking, parking);
    }

    apply_featured(filter, query);
}

fn apply_featured(filter: &mut FilterBuilder, query: &ListingQuery) {
    if let Some(featured) = query.featured {
        filter.eq(Field::Featured, featured);
    }
}

fn apply_free_text(filter: &mut FilterBuilder, query: &ListingQuery) {
    if let Some(search) = &query.search {
        filter.any_field_matches(&TEXT_FIELDS, search);
    }
    if let Some(location) = &query.location {
        filter.any_field_matches(&PLACE_FIELDS, location);
    }
}
