//! `vcl.list -j` resolution tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use varnish_exporter_core::vcl::{parse_vcl_list, resolve_active_revision, VclStatus};

fn load(name: &str) -> String {
    fs::read_to_string(format!("tests/vectors/{name}")).unwrap()
}

#[test]
fn resolves_active_from_fixture() {
    let active = resolve_active_revision(&load("vcl_list.json")).unwrap();
    assert_eq!(active, "reload_20240301_101500");
}

#[test]
fn record_at_index_three_is_first_considered() {
    let input = r#"[2, ["vcl.list","-j"], 1.0, {"status":"active","name":"boot"}]"#;
    assert_eq!(resolve_active_revision(input).unwrap(), "boot");
}

#[test]
fn header_entries_are_never_records() {
    // An "active" object inside the header must not be picked up.
    let input = r#"[{"status":"active","name":"hdr"}, 0, 0, {"status":"available","name":"boot"}]"#;
    let err = resolve_active_revision(input).expect_err("no active record");
    assert_eq!(err.code().as_str(), "NO_ACTIVE_REVISION");
}

#[test]
fn first_active_wins() {
    let input = r#"[2, [], 1.0,
        {"status":"active","name":"one"},
        {"status":"active","name":"two"}]"#;
    assert_eq!(resolve_active_revision(input).unwrap(), "one");
}

#[test]
fn no_active_entry_fails() {
    let err = resolve_active_revision(&load("vcl_list_no_active.json")).expect_err("must fail");
    assert_eq!(err.code().as_str(), "NO_ACTIVE_REVISION");
    assert_eq!(err.to_string(), "no active vcl found");
}

#[test]
fn statuses_are_decoded_in_order() {
    let records = parse_vcl_list(&load("vcl_list_no_active.json")).unwrap();
    let got: Vec<(&str, VclStatus)> = records.iter().map(|r| (r.name.as_str(), r.status)).collect();
    assert_eq!(
        got,
        vec![("boot", VclStatus::Available), ("reload_1", VclStatus::Discarded)]
    );
}

#[test]
fn malformed_input_is_reported() {
    for bad in ["", "{}", "{\"status\":\"active\"}", "[2, [], 1.0, \"boot\"]"] {
        let err = resolve_active_revision(bad).expect_err("must fail");
        assert_eq!(err.code().as_str(), "MALFORMED_INPUT", "input={bad}");
    }
}
