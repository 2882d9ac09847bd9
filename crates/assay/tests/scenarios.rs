//! End-to-end scenarios against the scripted driver.
//!
//! Every test runs on a `FakeClock`, so waits advance simulated time only
//! and elapsed values are exact.

use assay::prelude::*;
use assay::Clock;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn setup(name: &str) -> (Arc<FakeClock>, MockDriver, TestRun) {
    let clock = FakeClock::shared();
    let driver = MockDriver::new(clock.clone());
    let run = TestRun::with_clock(name, AssayConfig::default(), clock.clone()).unwrap();
    (clock, driver, run)
}

fn id(value: &str) -> Element {
    Element::id(value).unwrap()
}

// ============================================================================
// Waiting
// ============================================================================

#[test]
fn present_text_passes_without_waiting() {
    let (clock, mut driver, mut run) = setup("immediate");
    driver.add_element(Locator::Id("greeting".into()), MockElement::new().with_text("Hello"));

    let text = run.wait_for(&driver, &id("greeting")).equals().text("Hello").unwrap();

    assert_eq!(text, "Hello");
    let entry = &run.report().entries()[0];
    assert_eq!(entry.status, Status::Pass);
    assert_eq!(entry.elapsed_seconds, 0.0);
    assert_eq!(clock.now(), Duration::ZERO);
}

#[test]
fn late_element_reports_actual_wait_and_leaves_rest_of_budget() {
    let (clock, mut driver, mut run) = setup("late");
    driver.add_element(
        Locator::Id("toast".into()),
        MockElement::new()
            .appearing_at(Duration::from_secs(2))
            .hidden(),
    );
    let toast = id("toast");

    assert!(run.wait_for(&driver, &toast).state().present().unwrap());
    let present = &run.report().entries()[0];
    assert!((present.elapsed_seconds - 2.0).abs() < 1e-9);

    let before = clock.now();
    assert!(!run.wait_for(&driver, &toast).state().displayed().unwrap());
    let displayed = &run.report().entries()[1];
    assert_eq!(displayed.elapsed_seconds, 5.0);
    // presence holds from the start, so the displayed stage gets the whole budget
    assert_eq!(clock.now() - before, Duration::from_secs(5));
}

#[test]
fn chained_wait_splits_one_budget() {
    let (clock, mut driver, mut run) = setup("chained");
    driver.add_element(
        Locator::Id("panel".into()),
        MockElement::new()
            .appearing_at(Duration::from_secs(2))
            .hidden(),
    );

    assert!(!run.wait_for(&driver, &id("panel")).state().displayed().unwrap());

    let entry = &run.report().entries()[0];
    assert_eq!(entry.elapsed_seconds, 5.0);
    assert_eq!(clock.now(), Duration::from_secs(5));
    assert!(entry.actual.ends_with("is not displayed"));
}

#[test]
fn missing_element_short_circuits_dependent_wait() {
    let (clock, driver, mut run) = setup("missing");
    let ghost = id("ghost");

    assert!(!run.wait_for(&driver, &ghost).state().present().unwrap());
    assert_eq!(run.report().entries()[0].elapsed_seconds, 5.0);

    driver.clear_history();
    let before = clock.now();
    assert!(!run.wait_for(&driver, &ghost).state().displayed().unwrap());

    let entry = &run.report().entries()[1];
    assert_eq!(entry.status, Status::Fail);
    assert_eq!(entry.elapsed_seconds, 5.0);
    assert_eq!(clock.now() - before, Duration::from_secs(5));
    assert_eq!(driver.call_count("is_displayed"), 0);
    assert_eq!(
        entry.actual,
        "After waiting for 5 seconds, element with id <i>ghost</i> is not present on the page"
    );
    assert_eq!(run.error_count(), 2);
}

#[test]
fn transient_driver_errors_count_as_not_yet() {
    let (_clock, mut driver, mut run) = setup("stale");
    driver.add_element(
        Locator::Css("#row".into()),
        MockElement::new().with_transient_failures(3),
    );
    let row = Element::css("#row").unwrap();

    assert!(run.wait_for(&driver, &row).state().present().unwrap());
    let entry = &run.report().entries()[0];
    assert!((entry.elapsed_seconds - 0.3).abs() < 1e-9);
    assert!(driver.is_present(&row).unwrap());
}

#[test]
fn element_default_wait_shadows_session_default() {
    let (clock, driver, mut run) = setup("override");
    let quick = id("never").with_default_wait(1.5).unwrap();

    run.wait_for(&driver, &quick).state().present().unwrap();
    assert_eq!(clock.now(), Duration::from_millis(1_500));
    assert_eq!(
        run.report().entries()[0].action.as_deref(),
        Some("Waiting up to 1.5 seconds to find element with id <i>never</i> present on the page")
    );

    run.set_default_wait(0.5).unwrap();
    run.wait_for(&driver, &id("never")).state().present().unwrap();
    assert_eq!(clock.now(), Duration::from_secs(2));
}

#[test]
fn later_match_is_addressed_by_index() {
    let (_clock, mut driver, mut run) = setup("index");
    driver.add_element(Locator::ClassName("item".into()), MockElement::new().with_text("first"));
    driver.add_element(Locator::ClassName("item".into()), MockElement::new().with_text("second"));
    let second = Element::new(Locator::ClassName("item".into()))
        .unwrap()
        .with_match(1)
        .with_name("Second item");

    run.check(&driver, &second).equals().text("second").unwrap();
    run.check(&driver, &second).equals().text("first").unwrap();

    let entry = &run.report().entries()[1];
    assert_eq!(
        entry.actual,
        "<b>Second item</b> (class name <i>item</i>) (match 2) has text of <b>second</b>"
    );
    assert_eq!(run.error_count(), 1);
}

// ============================================================================
// Selects and tables
// ============================================================================

#[test]
fn select_value_membership_lists_actual_values() {
    let (_clock, mut driver, mut run) = setup("select");
    driver.add_element(
        Locator::Name("letter".into()),
        MockElement::select([("Alpha", "a"), ("Bravo", "b"), ("Charlie", "c")]),
    );
    let letter = Element::name("letter").unwrap();

    let values = run.check(&driver, &letter).contains().select_value("b").unwrap();
    assert_eq!(values, vec!["a", "b", "c"]);
    assert_eq!(run.error_count(), 0);

    run.check(&driver, &letter).contains().select_value("z").unwrap();
    let entry = &run.report().entries()[1];
    assert_eq!(entry.status, Status::Fail);
    assert!(entry.actual.contains("<b>[a, b, c]</b>"));
    assert_eq!(run.error_count(), 1);
}

#[test]
fn table_cell_checks() {
    let (_clock, mut driver, mut run) = setup("table");
    driver.add_element(
        Locator::Id("scores".into()),
        MockElement::table(vec![vec!["name", "team", "points"], vec!["ada", "red", "42"]]),
    );
    let scores = id("scores");

    let text = run.check(&driver, &scores).equals().cell_text(2, 3, "42").unwrap();
    assert_eq!(text, "42");
    assert_eq!(run.error_count(), 0);

    driver.clear_history();
    let missing = run.check(&driver, &scores).equals().cell_text(2, 4, "42").unwrap();
    assert_eq!(missing, "");
    assert_eq!(
        run.report().entries()[1].actual,
        "Cell not found at row 2 and column 4 within element with id <i>scores</i>"
    );
    // one existence query, no value fetch
    assert_eq!(driver.call_count("cell_text"), 1);
    assert_eq!(run.error_count(), 1);
}

// ============================================================================
// Responses
// ============================================================================

#[test]
fn response_failures_record_both_sides() {
    let (_clock, _driver, mut run) = setup("api");
    let not_found = Response::from_raw(404, "Not Found");
    assert_eq!(run.response(&not_found).equals().code(200).unwrap(), 404);

    let body = Response::new(200).with_json(json!({"data": {"items": [1, 2], "total": 2}}));
    let items = JsonPath::new(["data", "items"]).unwrap();
    assert_eq!(
        run.response(&body).equals().nested_array_size(&items, 3).unwrap(),
        Some(2)
    );

    let through_number = JsonPath::parse("data.total.items").unwrap();
    assert_eq!(
        run.response(&body).equals().nested_array_size(&through_number, 3).unwrap(),
        None
    );

    let entries = run.report().entries();
    assert!(entries[0].expected.contains("<b>200</b>"));
    assert!(entries[0].actual.contains("<b>404</b>"));
    assert!(entries[1].actual.ends_with("which has a size of <i>2</i>"));
    assert!(entries[2].actual.ends_with("which isn't an array"));
    assert_eq!(run.error_count(), 3);
}

// ============================================================================
// Aggregation and reports
// ============================================================================

#[test]
fn negative_test_expects_its_failures() {
    let (_clock, mut driver, mut run) = setup("negative");
    driver.set_title("Login");

    run.page(&driver).title_equals("Dashboard").unwrap();
    run.page(&driver).url_equals("https://app.test/dashboard").unwrap();

    assert_eq!(run.error_count(), 2);
    assert!(run.finish(0).is_err());
    assert!(run.finish(2).is_ok());
    match run.finish(1) {
        Err(AssayError::ErrorCountMismatch { expected, actual, .. }) => {
            assert_eq!((expected, actual), (1, 2));
        }
        other => panic!("unexpected verdict: {other:?}"),
    }
}

#[test]
fn absorbed_sub_flow_carries_its_failures() {
    let (_clock, mut driver, mut run) = setup("outer");
    driver.set_title("Checkout");
    run.page(&driver).title_equals("Checkout").unwrap();

    let (_c, sub_driver, mut sub) = setup("login step");
    sub.check(&sub_driver, &id("user")).state().present().unwrap();
    sub.check(&sub_driver, &id("pass")).state().present().unwrap();

    run.absorb(sub.into_report());

    assert_eq!(run.error_count(), 2);
    let sequences: Vec<usize> = run.report().entries().iter().map(|e| e.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3]);
}

#[test]
fn reports_are_written_in_every_configured_format() {
    let dir = tempfile::tempdir().unwrap();
    let clock = FakeClock::shared();
    let mut driver = MockDriver::new(clock.clone());
    driver.set_screenshot(vec![0x89, b'P', b'N', b'G']);
    let config = AssayConfig::default().with_output_dir(dir.path());
    let mut run = TestRun::with_clock("report & <escape>", config, clock).unwrap();

    run.check(&driver, &id("missing")).state().present().unwrap();

    let written = run.write_reports().unwrap();
    assert_eq!(written.len(), 3);
    for path in &written {
        assert!(path.exists(), "{} not written", path.display());
    }

    let html = written
        .iter()
        .find(|p| p.extension().is_some_and(|e| e == "html"))
        .unwrap();
    let html = std::fs::read_to_string(html).unwrap();
    assert!(html.contains("data:image/png;base64,"));
    assert!(!html.contains("<escape>"));

    let json = written
        .iter()
        .find(|p| p.extension().is_some_and(|e| e == "json"))
        .unwrap();
    let parsed: Report = serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
    assert_eq!(parsed.failed_count(), 1);
}

#[test]
fn config_from_yaml_drives_the_run() {
    let config = AssayConfig::from_yaml_str(
        "default_wait_secs: 1.0\npoll_interval_ms: 250\nscreenshots: never\n",
    )
    .unwrap();
    let clock = FakeClock::shared();
    let driver = MockDriver::new(clock.clone());
    let mut run = TestRun::with_clock("yaml", config, clock.clone()).unwrap();

    run.wait_for(&driver, &id("x")).state().present().unwrap();

    assert_eq!(clock.now(), Duration::from_secs(1));
    assert_eq!(clock.sleep_count(), 4);
    assert!(run.report().entries()[0].screenshot.is_none());
}
