//! Property-based tests for the wait and record invariants

use assay::prelude::*;
use assay::{format_seconds, Clock, Poller, WaitBudget};
use proptest::prelude::*;
use std::time::Duration;

// === Poller ===

proptest! {
    #[test]
    fn prop_elapsed_never_exceeds_budget(appear_ms in 0u64..3_000, budget_ms in 0u64..2_000) {
        let clock = FakeClock::shared();
        let poller = Poller::new(clock.clone());
        let budget = WaitBudget::new(budget_ms as f64 / 1000.0).unwrap();
        let appear = Duration::from_millis(appear_ms);

        let outcome = poller.await_condition(budget, || clock.now() >= appear);

        prop_assert!(outcome.elapsed_seconds <= budget.seconds());
        prop_assert!(outcome.elapsed_seconds >= 0.0);
        if appear_ms + 100 <= budget_ms {
            prop_assert!(outcome.satisfied);
        }
        if appear_ms > budget_ms + 100 {
            prop_assert!(!outcome.satisfied);
            prop_assert_eq!(outcome.elapsed_seconds, budget.seconds());
        }
    }

    #[test]
    fn prop_remaining_budget_stays_in_range(budget in 0.0f64..60.0, spent in 0.0f64..120.0) {
        let remaining = WaitBudget::new(budget).unwrap().remaining_after(spent);
        prop_assert!(remaining.seconds() >= 0.0);
        prop_assert!(remaining.seconds() <= budget);
    }

    #[test]
    fn prop_missing_prerequisite_skips_dependent(budget_ms in 1u64..5_000) {
        let clock = FakeClock::shared();
        let driver = MockDriver::new(clock.clone());
        let config = AssayConfig::default();
        let mut run = TestRun::with_clock("prop", config, clock.clone()).unwrap();
        let seconds = budget_ms as f64 / 1000.0;
        let ghost = Element::id("ghost").unwrap();

        let displayed = run.wait_for(&driver, &ghost).within(seconds).state().displayed().unwrap();

        prop_assert!(!displayed);
        prop_assert_eq!(driver.call_count("is_displayed"), 0);
        prop_assert_eq!(run.report().entries()[0].elapsed_seconds, seconds);
    }
}

// === Error counting ===

proptest! {
    #[test]
    fn prop_error_count_matches_failed_checks(
        outcomes in prop::collection::vec(any::<bool>(), 0..20)
    ) {
        let clock = FakeClock::shared();
        let mut driver = MockDriver::new(clock.clone());
        driver.set_title("Home");
        let mut run = TestRun::with_clock("prop", AssayConfig::default(), clock).unwrap();

        for pass in &outcomes {
            let expected = if *pass { "Home" } else { "Away" };
            run.page(&driver).title_equals(expected).unwrap();
        }

        let failures = outcomes.iter().filter(|pass| !**pass).count();
        prop_assert_eq!(run.error_count() as usize, failures);
        prop_assert_eq!(run.report().total_count(), outcomes.len());
        prop_assert!(run.finish(u32::try_from(failures).unwrap()).is_ok());
    }
}

// === Formatting ===

proptest! {
    #[test]
    fn prop_formatted_seconds_have_no_trailing_zeros(millis in 0u64..1_000_000) {
        let text = format_seconds(millis as f64 / 1000.0);
        if text.contains('.') {
            prop_assert!(!text.ends_with('0'));
        }
        prop_assert!(!text.ends_with('.'));
        prop_assert!(!text.is_empty());
    }
}
