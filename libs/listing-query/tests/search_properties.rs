use homestead_query::{
    compile, plan, ListingQuery, Op, PagePlan, Predicate, Range, SearchVariant,
};
use serde_json::json;

fn query(pairs: &[(&str, &str)]) -> ListingQuery {
    let items: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ListingQuery::from_items(&items)
}

#[test]
fn house_with_five_bedrooms_compiles_to_open_bucket() {
    let plan = plan(
        &SearchVariant::List,
        &query(&[("type", "HOUSE"), ("bedrooms", "5")]),
    )
    .unwrap();

    assert_eq!(
        plan.filter.to_document(),
        json!({
            "isActive": true,
            "type": "house",
            "specifications.bedrooms": { "$gte": 5 }
        })
    );
}

#[test]
fn bedrooms_at_or_above_five_never_compile_to_exact_match() {
    for bedrooms in ["5", "6", "12"] {
        let filter = compile(&SearchVariant::Advanced, &query(&[("bedrooms", bedrooms)])).unwrap();
        assert_eq!(
            filter.to_document()["specifications.bedrooms"],
            json!({ "$gte": 5 }),
            "bedrooms={bedrooms}"
        );

        let six = json!({ "isActive": true, "specifications": { "bedrooms": 6 } });
        assert!(filter.matches(&six), "bedrooms={bedrooms} should match 6");
    }
}

#[test]
fn bedrooms_below_five_compile_to_exact_match() {
    for bedrooms in [0i64, 1, 4] {
        let value = bedrooms.to_string();
        let filter = compile(&SearchVariant::List, &query(&[("bedrooms", value.as_str())])).unwrap();
        assert_eq!(
            filter.to_document()["specifications.bedrooms"],
            json!(bedrooms)
        );

        let bigger = json!({ "isActive": true, "specifications": { "bedrooms": bedrooms + 1 } });
        assert!(!filter.matches(&bigger));
    }
}

#[test]
fn bathrooms_stay_exact_even_above_five() {
    let filter = compile(&SearchVariant::List, &query(&[("bathrooms", "6")])).unwrap();
    assert_eq!(filter.to_document()["specifications.bathrooms"], json!(6));
}

#[test]
fn search_and_location_nest_as_and_of_two_ors() {
    let filter = compile(
        &SearchVariant::List,
        &query(&[("search", "loft"), ("location", "Austin")]),
    )
    .unwrap();

    let Predicate::And(children) = &filter else {
        panic!("expected top-level And, got {filter:?}");
    };
    let nested = children
        .iter()
        .find_map(|child| match child {
            Predicate::And(groups) => Some(groups),
            _ => None,
        })
        .expect("search and location should be nested under an And");
    assert_eq!(nested.len(), 2);
    assert!(nested.iter().all(|g| matches!(g, Predicate::Or(_))));
    assert!(
        !children.iter().any(|c| matches!(c, Predicate::Or(_))),
        "groups must not be flattened into a single $or"
    );

    let loft_in_dallas = json!({
        "isActive": true,
        "title": "Industrial Loft",
        "location": { "address": "1 Elm St", "city": "Dallas", "state": "TX", "country": "USA" }
    });
    let house_in_austin = json!({
        "isActive": true,
        "title": "Family House",
        "location": { "address": "2 Oak St", "city": "Austin", "state": "TX", "country": "USA" }
    });
    let loft_in_austin = json!({
        "isActive": true,
        "title": "Industrial Loft",
        "location": { "address": "3 Pine St", "city": "Austin", "state": "TX", "country": "USA" }
    });

    assert!(!filter.matches(&loft_in_dallas));
    assert!(!filter.matches(&house_in_austin));
    assert!(filter.matches(&loft_in_austin));
}

#[test]
fn price_bucket_is_merged_over_explicit_bounds() {
    let filter = compile(
        &SearchVariant::Advanced,
        &query(&[("priceRange", "100k-200k"), ("minPrice", "150000")]),
    )
    .unwrap();
    assert_eq!(
        filter.to_document()["price"],
        json!({ "$gte": 100000, "$lte": 200000 })
    );

    let open = compile(
        &SearchVariant::Advanced,
        &query(&[("priceRange", "over-500k"), ("maxPrice", "900000")]),
    )
    .unwrap();
    let price = open
        .conditions()
        .into_iter()
        .find(|c| c.field == homestead_query::Field::Price)
        .map(|c| c.op.clone());
    assert_eq!(
        price,
        Some(Op::Range(Range::new(Some(500_000.0), Some(900_000.0))))
    );
}

#[test]
fn explicit_price_bounds_form_closed_interval() {
    let filter = compile(
        &SearchVariant::List,
        &query(&[("minPrice", "100000"), ("maxPrice", "250000.5")]),
    )
    .unwrap();
    assert_eq!(
        filter.to_document()["price"],
        json!({ "$gte": 100000, "$lte": 250000.5 })
    );
}

#[test]
fn amenities_use_and_semantics() {
    let filter = compile(&SearchVariant::Advanced, &query(&[("amenities", "pool,gym")])).unwrap();
    let pool_only = json!({ "isActive": true, "amenities": ["pool"] });
    let both = json!({ "isActive": true, "amenities": ["gym", "pool", "garden"] });
    assert!(!filter.matches(&pool_only));
    assert!(filter.matches(&both));
}

#[test]
fn pages_for_twenty_five_results_of_twelve() {
    assert_eq!(PagePlan::new(1, 12).pages(25), 3);
    assert_eq!(PagePlan::new(3, 12).skip(), 24);
}
