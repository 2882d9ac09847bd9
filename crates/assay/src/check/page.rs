//! Page checks: url, title, source, visible text, dialogs and cookies

use super::compare::{self, Pattern};
use super::{Probe, TestRun};
use crate::driver::{DialogKind, PageResolver};
use crate::markup::{bold, bold_list, capitalize, italic};
use crate::recorder::Expectation;
use crate::result::{AssayError, AssayResult};
use crate::wait::WaitBudget;
use tracing::warn;

/// One or more pending checks against the current page
#[derive(Debug)]
pub struct PageCheck<'r, D: ?Sized> {
    run: &'r mut TestRun,
    driver: &'r D,
    seconds: f64,
}

impl<'r, D: PageResolver + ?Sized> PageCheck<'r, D> {
    pub(crate) fn new(run: &'r mut TestRun, driver: &'r D, seconds: f64) -> Self {
        Self {
            run,
            driver,
            seconds,
        }
    }

    /// Wait up to `seconds` instead of the default
    #[must_use]
    pub fn within(mut self, seconds: f64) -> Self {
        self.seconds = seconds;
        self
    }

    // =========================================================================
    // URL AND TITLE
    // =========================================================================

    /// Current URL equals `expected`
    pub fn url_equals(mut self, expected: &str) -> AssayResult<String> {
        let check = format!("to find the page url {}", bold(expected));
        self.evaluate(check, |driver| {
            let url = driver.url()?;
            let passed = compare::equals(&url, expected);
            let actual = format!("Found the page url {}", bold(&url));
            Ok(Probe::new(url, passed, actual))
        })
    }

    /// Current URL matches `pattern`
    pub fn url_matches(mut self, pattern: &str) -> AssayResult<String> {
        let pattern = Pattern::new(pattern)?;
        let check = format!("to find a page url matching {}", bold(pattern.as_str()));
        self.evaluate(check, |driver| {
            let url = driver.url()?;
            let passed = pattern.matches(&url);
            let actual = format!("Found the page url {}", bold(&url));
            Ok(Probe::new(url, passed, actual))
        })
    }

    /// Page title equals `expected`
    pub fn title_equals(mut self, expected: &str) -> AssayResult<String> {
        let check = format!("to find the page title {}", bold(expected));
        self.evaluate(check, |driver| {
            let title = driver.title()?;
            let passed = compare::equals(&title, expected);
            let actual = format!("Found the page title {}", bold(&title));
            Ok(Probe::new(title, passed, actual))
        })
    }

    /// Page title matches `pattern`
    pub fn title_matches(mut self, pattern: &str) -> AssayResult<String> {
        let pattern = Pattern::new(pattern)?;
        let check = format!("to find a page title matching {}", bold(pattern.as_str()));
        self.evaluate(check, |driver| {
            let title = driver.title()?;
            let passed = pattern.matches(&title);
            let actual = format!("Found the page title {}", bold(&title));
            Ok(Probe::new(title, passed, actual))
        })
    }

    // =========================================================================
    // TEXT
    // =========================================================================

    /// Page source contains `text`
    pub fn text_present(mut self, text: &str) -> AssayResult<bool> {
        let check = format!("to find the text {} present in the page source", bold(text));
        self.evaluate(check, |driver| {
            let found = compare::contains(&driver.page_source()?, text);
            Ok(Probe::new(found, found, source_presence(text, found)))
        })
    }

    /// Page source does not contain `text`
    pub fn text_not_present(mut self, text: &str) -> AssayResult<bool> {
        let check = format!("to not find the text {} present in the page source", bold(text));
        self.evaluate(check, |driver| {
            let found = compare::contains(&driver.page_source()?, text);
            Ok(Probe::new(!found, !found, source_presence(text, found)))
        })
    }

    /// Every one of `texts` is visible; records one result per text
    ///
    /// Returns how many of them were not visible. Each text waits out the
    /// full budget on its own, so N missing texts take N budgets.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `texts` is empty
    pub fn text_visible(mut self, texts: &[&str]) -> AssayResult<usize> {
        if texts.is_empty() {
            return Err(AssayError::invalid_argument("texts", "at least one text is required"));
        }
        let mut misses = 0;
        for text in texts {
            let check = format!("to find the text {} visible on the page", bold(text));
            let visible = self.evaluate(check, |driver| {
                let visible = driver.is_text_visible(text)?;
                Ok(Probe::new(visible, visible, visibility(text, visible)))
            })?;
            if !visible {
                misses += 1;
            }
        }
        Ok(misses)
    }

    /// `text` is not visible
    pub fn text_not_visible(mut self, text: &str) -> AssayResult<bool> {
        let check = format!("to not find the text {} visible on the page", bold(text));
        self.evaluate(check, |driver| {
            let visible = driver.is_text_visible(text)?;
            Ok(Probe::new(!visible, !visible, visibility(text, visible)))
        })
    }

    /// At least one of `texts` is visible; returns the first that is
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `texts` is empty
    pub fn text_visible_any(mut self, texts: &[&str]) -> AssayResult<Option<String>> {
        if texts.is_empty() {
            return Err(AssayError::invalid_argument("texts", "at least one text is required"));
        }
        let check = format!("to find any of the texts {} visible on the page", bold_list(texts));
        self.evaluate(check, |driver| {
            let mut shown = None;
            for text in texts {
                if driver.is_text_visible(text)? {
                    shown = Some((*text).to_string());
                    break;
                }
            }
            let actual = match &shown {
                Some(text) => visibility(text, true),
                None => format!("None of the texts {} are visible on the page", bold_list(texts)),
            };
            let passed = shown.is_some();
            Ok(Probe::new(shown, passed, actual))
        })
    }

    // =========================================================================
    // DIALOGS
    // =========================================================================

    /// A dialog of `kind` is open
    pub fn dialog_present(mut self, kind: DialogKind) -> AssayResult<bool> {
        let check = format!("to find {} present on the page", kind.with_article());
        self.evaluate(check, |driver| {
            let text = driver.dialog_text(kind)?;
            let open = text.is_some();
            Ok(Probe::new(open, open, dialog_state(kind, text.as_deref())))
        })
    }

    /// No dialog of `kind` is open
    pub fn dialog_not_present(mut self, kind: DialogKind) -> AssayResult<bool> {
        let check = format!("to not find {} present on the page", kind.with_article());
        self.evaluate(check, |driver| {
            let text = driver.dialog_text(kind)?;
            let closed = text.is_none();
            Ok(Probe::new(closed, closed, dialog_state(kind, text.as_deref())))
        })
    }

    /// Text of the open `kind` dialog equals `expected`
    pub fn dialog_equals(mut self, kind: DialogKind, expected: &str) -> AssayResult<String> {
        let check = format!(
            "to find {} with text {} present on the page",
            kind.with_article(),
            bold(expected)
        );
        self.gated(
            check,
            |driver| driver.is_dialog_present(kind),
            &dialog_state(kind, None),
            String::new(),
            |driver| {
                let text = driver.dialog_text(kind)?;
                let passed = text.as_deref() == Some(expected);
                let actual = dialog_state(kind, text.as_deref());
                Ok(Probe::new(text.unwrap_or_default(), passed, actual))
            },
        )
    }

    /// Text of the open `kind` dialog matches `pattern`
    pub fn dialog_matches(mut self, kind: DialogKind, pattern: &str) -> AssayResult<String> {
        let pattern = Pattern::new(pattern)?;
        let check = format!(
            "to find {} with text matching {} present on the page",
            kind.with_article(),
            bold(pattern.as_str())
        );
        self.gated(
            check,
            |driver| driver.is_dialog_present(kind),
            &dialog_state(kind, None),
            String::new(),
            |driver| {
                let text = driver.dialog_text(kind)?;
                let passed = text.as_deref().is_some_and(|t| pattern.matches(t));
                let actual = dialog_state(kind, text.as_deref());
                Ok(Probe::new(text.unwrap_or_default(), passed, actual))
            },
        )
    }

    // =========================================================================
    // COOKIES
    // =========================================================================

    /// A cookie called `name` is stored
    pub fn cookie_exists(mut self, name: &str) -> AssayResult<bool> {
        let check = format!("to find a cookie with the name {} stored for the page", bold(name));
        self.evaluate(check, |driver| {
            let value = driver.cookie(name)?;
            let stored = value.is_some();
            Ok(Probe::new(stored, stored, cookie_state(name, value.as_deref())))
        })
    }

    /// No cookie called `name` is stored
    pub fn cookie_not_exists(mut self, name: &str) -> AssayResult<bool> {
        let check = format!(
            "to not find a cookie with the name {} stored for the page",
            bold(name)
        );
        self.evaluate(check, |driver| {
            let value = driver.cookie(name)?;
            let absent = value.is_none();
            Ok(Probe::new(absent, absent, cookie_state(name, value.as_deref())))
        })
    }

    /// Value of cookie `name` equals `expected`
    pub fn cookie_equals(mut self, name: &str, expected: &str) -> AssayResult<String> {
        let check = format!(
            "to find a cookie with the name {} and a value of {} stored for the page",
            bold(name),
            bold(expected)
        );
        self.gated(
            check,
            |driver| Ok(driver.cookie(name)?.is_some()),
            &cookie_state(name, None),
            String::new(),
            |driver| {
                let value = driver.cookie(name)?.unwrap_or_default();
                let passed = compare::equals(&value, expected);
                Ok(Probe::new(value.clone(), passed, cookie_value(name, &value, passed)))
            },
        )
    }

    /// Value of cookie `name` matches `pattern`
    pub fn cookie_matches(mut self, name: &str, pattern: &str) -> AssayResult<String> {
        let pattern = Pattern::new(pattern)?;
        let check = format!(
            "to find a cookie with the name {} and a value matching {} stored for the page",
            bold(name),
            bold(pattern.as_str())
        );
        self.gated(
            check,
            |driver| Ok(driver.cookie(name)?.is_some()),
            &cookie_state(name, None),
            String::new(),
            |driver| {
                let value = driver.cookie(name)?.unwrap_or_default();
                let passed = pattern.matches(&value);
                Ok(Probe::new(value.clone(), passed, cookie_value(name, &value, passed)))
            },
        )
    }

    // =========================================================================
    // EVALUATION
    // =========================================================================

    fn evaluate<T, F>(&mut self, check: String, probe: F) -> AssayResult<T>
    where
        T: Default,
        F: Fn(&D) -> AssayResult<Probe<T>>,
    {
        let budget = self.run.budget(self.seconds)?;
        let expectation = self.run.expect(check, &budget);
        self.settle(budget, expectation, 0.0, T::default(), probe)
    }

    fn gated<T, G, F>(
        &mut self,
        check: String,
        gate: G,
        missing: &str,
        sentinel: T,
        probe: F,
    ) -> AssayResult<T>
    where
        G: Fn(&D) -> AssayResult<bool>,
        F: Fn(&D) -> AssayResult<Probe<T>>,
    {
        let budget = self.run.budget(self.seconds)?;
        let expectation = self.run.expect(check, &budget);
        let driver = self.driver;

        let ready = self.run.poller().await_fallible(budget, || gate(driver));
        if !ready.satisfied {
            self.run
                .record_captured(driver, expectation, missing, false, ready.elapsed_seconds);
            return Ok(sentinel);
        }
        self.settle(budget, expectation, ready.elapsed_seconds, sentinel, probe)
    }

    fn settle<T, F>(
        &mut self,
        budget: WaitBudget,
        expectation: Expectation,
        mut spent: f64,
        sentinel: T,
        probe: F,
    ) -> AssayResult<T>
    where
        F: Fn(&D) -> AssayResult<Probe<T>>,
    {
        let driver = self.driver;
        if !budget.is_immediate() {
            let settled = self
                .run
                .poller()
                .await_after(budget, spent, || probe(driver).map(|p| p.passed));
            spent = settled.map_or(budget.seconds(), |o| spent + o.elapsed_seconds);
        }

        let elapsed = spent.min(budget.seconds());
        match probe(driver) {
            Ok(observed) => {
                self.run.record_captured(
                    driver,
                    expectation,
                    &observed.actual,
                    observed.passed,
                    elapsed,
                );
                Ok(observed.value)
            }
            Err(err) => {
                warn!(error = %err, "final page read failed");
                let actual = format!("The page could not be read: {}", italic(&err.to_string()));
                self.run.record_captured(driver, expectation, &actual, false, elapsed);
                Ok(sentinel)
            }
        }
    }
}

fn source_presence(text: &str, found: bool) -> String {
    if found {
        format!("The text {} is present in the page source", bold(text))
    } else {
        format!("The text {} is not present in the page source", bold(text))
    }
}

fn visibility(text: &str, visible: bool) -> String {
    if visible {
        format!("The text {} is visible on the page", bold(text))
    } else {
        format!("The text {} is not visible on the page", bold(text))
    }
}

fn dialog_state(kind: DialogKind, text: Option<&str>) -> String {
    match text {
        Some(text) => format!(
            "{} with text {} is present on the page",
            capitalize(kind.with_article()),
            bold(text)
        ),
        None => format!("No {} is present on the page", kind.label()),
    }
}

fn cookie_state(name: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!(
            "A cookie with the name {} and a value of {} is stored for the page",
            bold(name),
            bold(value)
        ),
        None => format!("No cookie with the name {} is stored for the page", bold(name)),
    }
}

fn cookie_value(name: &str, value: &str, passed: bool) -> String {
    if passed {
        cookie_state(name, Some(value))
    } else {
        format!(
            "A cookie with the name {} is stored for the page, but the value of the cookie is {}",
            bold(name),
            bold(value)
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::{Clock, FakeClock};
    use crate::config::AssayConfig;
    use crate::driver::MockDriver;
    use std::sync::Arc;
    use std::time::Duration;

    fn setup() -> (Arc<FakeClock>, MockDriver, TestRun) {
        let clock = FakeClock::shared();
        let driver = MockDriver::new(clock.clone());
        let run = TestRun::with_clock("page", AssayConfig::default(), clock.clone()).unwrap();
        (clock, driver, run)
    }

    fn last_actual(run: &TestRun) -> String {
        run.report().entries().last().unwrap().actual.clone()
    }

    mod location_tests {
        use super::*;

        #[test]
        fn test_url_waits_for_navigation() {
            let (_clock, mut driver, mut run) = setup();
            driver.set_url("https://shop.test/login");
            driver.set_url_at(Duration::from_millis(1_200), "https://shop.test/home");
            let url = run
                .wait_for_page(&driver)
                .url_equals("https://shop.test/home")
                .unwrap();
            assert_eq!(url, "https://shop.test/home");
            let entry = run.report().entries().last().unwrap();
            assert!((entry.elapsed_seconds - 1.2).abs() < 1e-9);
            assert!(entry.status.is_pass());
        }

        #[test]
        fn test_url_and_title_immediate() {
            let (_clock, mut driver, mut run) = setup();
            driver.set_url("https://shop.test/cart?id=7");
            driver.set_title("Cart (1)");
            run.page(&driver).url_matches(r"https://shop\.test/cart\?id=\d+").unwrap();
            run.page(&driver).title_equals("Cart (1)").unwrap();
            run.page(&driver).title_matches(r"Cart \(\d\)").unwrap();
            assert_eq!(run.error_count(), 0);

            let title = run.page(&driver).title_equals("Checkout").unwrap();
            assert_eq!(title, "Cart (1)");
            assert_eq!(last_actual(&run), "Found the page title <b>Cart (1)</b>");
            assert_eq!(run.error_count(), 1);
        }

        #[test]
        fn test_bad_pattern_records_nothing() {
            let (_clock, driver, mut run) = setup();
            assert!(run.page(&driver).url_matches("[").is_err());
            assert_eq!(run.report().total_count(), 0);
        }

        #[test]
        fn test_window_closed_before_final_read_fails() {
            let (clock, mut driver, mut run) = setup();
            driver.set_title("Loading");
            driver.close_window_at(Duration::from_secs(1));
            let title = run.wait_for_page(&driver).within(2.0).title_equals("Done").unwrap();
            assert_eq!(title, "");
            assert_eq!(run.report().total_count(), 1);
            assert_eq!(run.error_count(), 1);
            assert_eq!(clock.now(), Duration::from_secs(2));
            let entry = run.report().entries().last().unwrap();
            assert!(!entry.status.is_pass());
            assert!((entry.elapsed_seconds - 2.0).abs() < 1e-9);
            assert_eq!(
                entry.actual,
                "The page could not be read: <i>Driver error: no such window</i>"
            );
        }
    }

    mod text_tests {
        use super::*;

        #[test]
        fn test_source_presence() {
            let (_clock, mut driver, mut run) = setup();
            driver.set_source("<html><body>Welcome back</body></html>");
            assert!(run.page(&driver).text_present("Welcome").unwrap());
            assert!(run.page(&driver).text_not_present("Goodbye").unwrap());
            assert!(!run.page(&driver).text_not_present("Welcome").unwrap());
            assert_eq!(
                last_actual(&run),
                "The text <b>Welcome</b> is present in the page source"
            );
            assert_eq!(run.error_count(), 1);
        }

        #[test]
        fn test_visible_records_one_result_per_text() {
            let (_clock, mut driver, mut run) = setup();
            driver.show_text("Total: 42");
            let misses = run.page(&driver).text_visible(&["Total", "Tax", "42"]).unwrap();
            assert_eq!(misses, 1);
            assert_eq!(run.report().total_count(), 3);
            assert_eq!(run.error_count(), 1);
        }

        #[test]
        fn test_visible_rejects_empty_list() {
            let (_clock, driver, mut run) = setup();
            assert!(run.page(&driver).text_visible(&[]).unwrap_err().is_authoring_error());
            assert!(run.page(&driver).text_visible_any(&[]).is_err());
        }

        #[test]
        fn test_visible_any_single_result() {
            let (_clock, mut driver, mut run) = setup();
            driver.show_text_at(Duration::from_secs(1), "Saved");
            let shown = run
                .wait_for_page(&driver)
                .text_visible_any(&["Error", "Saved"])
                .unwrap();
            assert_eq!(shown.as_deref(), Some("Saved"));
            assert_eq!(run.report().total_count(), 1);

            let none = run.page(&driver).text_visible_any(&["Error", "Oops"]).unwrap();
            assert_eq!(none, None);
            assert_eq!(
                last_actual(&run),
                "None of the texts <b>[Error, Oops]</b> are visible on the page"
            );
        }

        #[test]
        fn test_not_visible() {
            let (_clock, mut driver, mut run) = setup();
            driver.show_text("Loading");
            assert!(!run.page(&driver).text_not_visible("Loading").unwrap());
            assert!(run.page(&driver).text_not_visible("Done").unwrap());
            assert_eq!(run.error_count(), 1);
        }
    }

    mod dialog_tests {
        use super::*;

        #[test]
        fn test_dialog_presence() {
            let (_clock, mut driver, mut run) = setup();
            driver.open_dialog(DialogKind::Confirmation, "Delete item?");
            assert!(run.page(&driver).dialog_present(DialogKind::Confirmation).unwrap());
            assert!(run.page(&driver).dialog_not_present(DialogKind::Alert).unwrap());
            assert!(!run.page(&driver).dialog_present(DialogKind::Prompt).unwrap());
            assert_eq!(last_actual(&run), "No prompt is present on the page");
            assert_eq!(run.error_count(), 1);
        }

        #[test]
        fn test_dialog_text() {
            let (_clock, mut driver, mut run) = setup();
            driver.open_dialog_at(Duration::from_millis(500), DialogKind::Alert, "Saved 3 items");
            let text = run
                .wait_for_page(&driver)
                .dialog_equals(DialogKind::Alert, "Saved 3 items")
                .unwrap();
            assert_eq!(text, "Saved 3 items");
            run.page(&driver).dialog_matches(DialogKind::Alert, r"Saved \d+ items").unwrap();
            assert_eq!(run.error_count(), 0);
        }

        #[test]
        fn test_dialog_text_without_dialog() {
            let (_clock, driver, mut run) = setup();
            let text = run.page(&driver).dialog_equals(DialogKind::Alert, "x").unwrap();
            assert_eq!(text, "");
            assert_eq!(last_actual(&run), "No alert is present on the page");
            assert_eq!(driver.call_count("dialog_text"), 1);
        }
    }

    mod cookie_tests {
        use super::*;

        #[test]
        fn test_cookie_existence() {
            let (_clock, mut driver, mut run) = setup();
            driver.set_cookie("session", "abc123");
            assert!(run.page(&driver).cookie_exists("session").unwrap());
            assert!(run.page(&driver).cookie_not_exists("tracking").unwrap());
            assert!(!run.page(&driver).cookie_exists("tracking").unwrap());
            assert_eq!(
                last_actual(&run),
                "No cookie with the name <b>tracking</b> is stored for the page"
            );
        }

        #[test]
        fn test_cookie_value() {
            let (_clock, mut driver, mut run) = setup();
            driver.set_cookie("session", "abc123");
            run.page(&driver).cookie_matches("session", "[a-z]+[0-9]+").unwrap();
            let value = run.page(&driver).cookie_equals("session", "xyz").unwrap();
            assert_eq!(value, "abc123");
            assert_eq!(
                last_actual(&run),
                "A cookie with the name <b>session</b> is stored for the page, but the value of the cookie is <b>abc123</b>"
            );
            assert_eq!(run.error_count(), 1);

            let missing = run.page(&driver).cookie_equals("cart", "1").unwrap();
            assert_eq!(missing, "");
            assert_eq!(run.error_count(), 2);
        }
    }
}
