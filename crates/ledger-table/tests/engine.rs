//! End-to-end behavior of the table engine over JSON and record rows.

use chrono::{TimeZone, Utc};
use ledger_model::{CellValue, ColumnDefinition, PropertyLookup, Record, SortSpec};
use ledger_table::{ColumnVisibility, TableState, apply, sort_rows};
use proptest::prelude::*;
use serde_json::json;

fn two_rows() -> Vec<serde_json::Value> {
    vec![
        json!({"name": "Bob", "amount": 50}),
        json!({"name": "ann", "amount": null}),
    ]
}

fn names(rows: &[&serde_json::Value]) -> Vec<String> {
    rows.iter()
        .map(|row| row["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn name_sort_is_case_insensitive() {
    let rows = two_rows();
    let view = apply(&rows, "", &SortSpec::asc("name"));
    assert_eq!(names(&view), ["ann", "Bob"]);
}

#[test]
fn null_amount_sorts_last() {
    let rows = two_rows();
    let asc = apply(&rows, "", &SortSpec::asc("amount"));
    assert_eq!(names(&asc), ["Bob", "ann"]);
    let desc = apply(&rows, "", &SortSpec::desc("amount"));
    assert_eq!(names(&desc), ["Bob", "ann"]);
}

#[test]
fn search_matches_partial_name() {
    let rows = two_rows();
    let view = apply(&rows, "bo", &SortSpec::none());
    assert_eq!(names(&view), ["Bob"]);
}

#[test]
fn accented_names_sort_beside_their_base_letter() {
    let rows = vec![
        json!({"name": "Zeta"}),
        json!({"name": "Ōsaka"}),
        json!({"name": "Mumbai"}),
        json!({"name": "Őrs"}),
    ];
    let view = apply(&rows, "", &SortSpec::asc("name"));
    assert_eq!(names(&view), ["Mumbai", "Őrs", "Ōsaka", "Zeta"]);
}

#[test]
fn search_for_null_finds_rows_with_null_fields() {
    let rows = vec![json!({"name": "Bob", "note": null}), json!({"name": "ann", "note": "ok"})];
    let view = apply(&rows, "NULL", &SortSpec::none());
    assert_eq!(names(&view), ["Bob"]);
}

#[test]
fn unsorted_view_keeps_input_order() {
    let rows = two_rows();
    let view = apply(&rows, "", &SortSpec::none());
    assert_eq!(names(&view), ["Bob", "ann"]);
}

#[test]
fn header_clicks_cycle_through_directions() {
    let rows = two_rows();
    let mut state = TableState::new(vec![
        ColumnDefinition::new("name", "Name"),
        ColumnDefinition::new("amount", "Amount"),
    ]);
    state.click_header("name");
    assert_eq!(names(&state.visible_rows(&rows)), ["ann", "Bob"]);
    state.click_header("name");
    assert_eq!(names(&state.visible_rows(&rows)), ["Bob", "ann"]);
    state.click_header("name");
    assert_eq!(state.sort(), &SortSpec::none());
    assert_eq!(names(&state.visible_rows(&rows)), ["Bob", "ann"]);
}

fn ledger_row(id: usize, amount: Option<i8>) -> Record {
    let mut record = Record::new();
    record.insert("id".to_string(), CellValue::from(id as i64));
    record.insert(
        "amount".to_string(),
        amount.map_or(CellValue::Null, |a| CellValue::from(i64::from(a))),
    );
    record
}

fn id_of(record: &Record) -> f64 {
    record["id"].as_number().unwrap_or(f64::NAN)
}

fn arb_cell() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::Null),
        any::<f64>().prop_map(CellValue::Number),
        "[a-zA-Zé ]{0,8}".prop_map(CellValue::Text),
        any::<bool>().prop_map(CellValue::Bool),
        (0i64..2_000_000_000).prop_map(|secs| {
            Utc.timestamp_opt(secs, 0)
                .single()
                .map_or(CellValue::Null, CellValue::Date)
        }),
    ]
}

proptest! {
    #[test]
    fn sort_is_stable_with_nulls_last(
        amounts in prop::collection::vec(prop::option::of(-3i8..3), 0..40),
        descending in any::<bool>(),
    ) {
        let rows: Vec<Record> = amounts
            .iter()
            .enumerate()
            .map(|(id, amount)| ledger_row(id, *amount))
            .collect();
        let spec = if descending { SortSpec::desc("amount") } else { SortSpec::asc("amount") };
        let sorted = sort_rows(&rows, &spec, &PropertyLookup);
        prop_assert_eq!(sorted.len(), rows.len());

        for pair in sorted.windows(2) {
            let (a, b) = (pair[0]["amount"].as_number(), pair[1]["amount"].as_number());
            match (a, b) {
                (None, Some(_)) => prop_assert!(false, "null sorted before a value"),
                (Some(_), None) => {}
                (Some(x), Some(y)) if x != y => {
                    let ordered = if descending { x > y } else { x < y };
                    prop_assert!(ordered, "{} then {} out of order", x, y);
                }
                _ => prop_assert!(id_of(pair[0]) < id_of(pair[1]), "ties keep input order"),
            }
        }
    }

    #[test]
    fn search_result_is_an_ordered_subset(
        names in prop::collection::vec("[a-cA-C]{1,4}", 0..20),
        term in "[a-c]{0,2}",
    ) {
        let rows: Vec<serde_json::Value> = names.iter().map(|n| json!({"name": n})).collect();
        let view = apply(&rows, &term, &SortSpec::none());
        let mut cursor = rows.iter();
        for row in &view {
            prop_assert!(cursor.any(|candidate| std::ptr::eq(candidate, *row)));
            let name = row["name"].as_str().unwrap_or_default().to_lowercase();
            prop_assert!(name.contains(&term));
        }
        let expected = names.iter().filter(|n| n.to_lowercase().contains(&term)).count();
        prop_assert_eq!(view.len(), expected);
    }

    #[test]
    fn heterogeneous_cells_never_panic(
        cells in prop::collection::vec(arb_cell(), 0..60),
        descending in any::<bool>(),
    ) {
        let rows: Vec<Record> = cells
            .into_iter()
            .map(|cell| {
                let mut record = Record::new();
                record.insert("mixed".to_string(), cell);
                record
            })
            .collect();
        let spec = if descending { SortSpec::desc("mixed") } else { SortSpec::asc("mixed") };
        let sorted = sort_rows(&rows, &spec, &PropertyLookup);
        prop_assert_eq!(sorted.len(), rows.len());
        if let Some(first_null) = sorted.iter().position(|r| r["mixed"].is_null()) {
            prop_assert!(sorted[first_null..].iter().all(|r| r["mixed"].is_null()));
        }
    }

    #[test]
    fn double_toggle_restores_visibility(
        hidden in prop::collection::btree_set("[a-e]", 0..5),
        key in "[a-g]",
    ) {
        let visibility = ColumnVisibility::from_keys(hidden);
        prop_assert_eq!(visibility.toggled(&key).toggled(&key), visibility);
    }

    #[test]
    fn projection_keeps_declaration_order(toggles in prop::collection::vec(0usize..5, 0..12)) {
        let keys = ["date", "party", "voucher", "amount", "balance"];
        let columns: Vec<ColumnDefinition> =
            keys.iter().map(|k| ColumnDefinition::new(*k, *k)).collect();
        let mut visibility = ColumnVisibility::initialize(&columns);
        for idx in toggles {
            visibility.toggle(keys[idx]);
        }
        let projected: Vec<&str> = visibility
            .project(&columns)
            .iter()
            .map(|c| c.key.as_str())
            .collect();
        let expected: Vec<&str> = keys
            .iter()
            .copied()
            .filter(|k| visibility.is_visible(k))
            .collect();
        prop_assert_eq!(projected, expected);
    }
}
