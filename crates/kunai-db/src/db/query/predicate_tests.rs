use super::predicate::{Condition, MATCH_ALL, Predicate, SearchRequest, like_pattern};
use crate::model::IndexValue;

#[test]
fn empty_request_matches_all() {
    let predicate = Predicate::translate(&SearchRequest::new());

    assert_eq!(predicate.clause(), MATCH_ALL);
    assert!(predicate.params().is_empty());
    assert!(predicate.is_match_all());
}

#[test]
fn range_bounds_use_overlap_legs() {
    let request = SearchRequest::new().range_start(100).range_end(200);
    let predicate = Predicate::translate(&request);

    assert_eq!(
        predicate.clause(),
        "(? <= \"dtend\" OR recurrent) AND (? >= \"dtstart\")"
    );
    assert_eq!(
        predicate.params(),
        [IndexValue::Instant(100), IndexValue::Instant(200)]
    );
}

#[test]
fn contains_leg_escapes_pattern() {
    let request = SearchRequest::new().contains("summary", "50%_off");
    let predicate = Predicate::translate(&request);

    assert_eq!(predicate.clause(), "(\"summary\" LIKE ? ESCAPE '\\')");
    assert_eq!(
        predicate.params(),
        [IndexValue::Text("%50\\%\\_off%".to_owned())]
    );
}

#[test]
fn negation_leg_admits_nulls() {
    let request = SearchRequest::new().not_contains("summary", "Event4");
    let predicate = Predicate::translate(&request);

    assert_eq!(
        predicate.clause(),
        "(\"summary\" IS NULL OR \"summary\" NOT LIKE ? ESCAPE '\\')"
    );
    assert_eq!(predicate.params(), [IndexValue::Text("%Event4%".to_owned())]);
}

#[test]
fn instant_on_text_field_is_equality() {
    let request = SearchRequest::new().with("sequence", Condition::Instant(3));
    let predicate = Predicate::translate(&request);

    assert_eq!(predicate.clause(), "(\"sequence\" = ?)");
    assert_eq!(predicate.params(), [IndexValue::Instant(3)]);
}

#[test]
fn text_bound_on_range_field_keeps_range_leg() {
    let request = SearchRequest::new().contains("dtend", "20130901");
    let predicate = Predicate::translate(&request);

    assert_eq!(predicate.clause(), "(? >= \"dtstart\")");
    assert_eq!(predicate.params(), [IndexValue::Text("20130901".to_owned())]);
}

#[test]
fn set_replaces_in_place() {
    let request = SearchRequest::new()
        .contains("uid", "event")
        .range_start(1)
        .not_contains("uid", "event4");

    let fields: Vec<&str> = request.entries().map(|(f, _)| f).collect();
    assert_eq!(fields, ["uid", "dtstart"]);
    assert_eq!(
        request.get("uid"),
        Some(&Condition::NotContains("event4".to_owned()))
    );
    assert_eq!(request.len(), 2);
}

#[test]
fn legs_follow_request_order() {
    let request = SearchRequest::new()
        .contains("uid", "event")
        .not_contains("summary", "Event4");
    let predicate = Predicate::translate(&request);

    assert_eq!(
        predicate.clause(),
        "(\"uid\" LIKE ? ESCAPE '\\') AND \
         (\"summary\" IS NULL OR \"summary\" NOT LIKE ? ESCAPE '\\')"
    );
}

#[test]
fn identifiers_are_quoted() {
    let request = SearchRequest::new().contains("bad\"name", "x");
    let predicate = Predicate::translate(&request);

    assert_eq!(predicate.clause(), "(\"bad\"\"name\" LIKE ? ESCAPE '\\')");
}

#[test]
fn like_pattern_escapes_backslash() {
    assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    assert_eq!(like_pattern(""), "%%");
}
