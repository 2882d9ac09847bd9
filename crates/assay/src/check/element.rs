//! Element checks
//!
//! `run.check(&driver, &el)` evaluates once; `run.wait_for(&driver, &el)`
//! polls up to the element's default wait (or the session's), and
//! `.within(secs)` sets an explicit budget. Each family method records
//! exactly one result and hands back what it observed.

use super::compare::{self, Pattern};
use super::{Probe, TestRun};
use crate::driver::ElementResolver;
use crate::markup::{bold, bold_list, capitalize, italic};
use crate::result::{AssayError, AssayResult};
use crate::target::Element;
use tracing::{debug, warn};

// =============================================================================
// PRECONDITIONS
// =============================================================================

/// Kind an element must have before its value is compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Present,
    Input,
    Select,
    Table,
}

impl Gate {
    fn holds<D: ElementResolver + ?Sized>(
        self,
        driver: &D,
        element: &Element,
    ) -> AssayResult<bool> {
        match self {
            Self::Present => driver.is_present(element),
            Self::Input => driver.is_input(element),
            Self::Select => driver.is_select(element),
            Self::Table => driver.is_table(element),
        }
    }

    fn missing(self, element: &Element) -> String {
        let what = match self {
            Self::Present => "is not present on the page",
            Self::Input => "is not an input on the page",
            Self::Select => "is not a select on the page",
            Self::Table => "is not a table on the page",
        };
        format!("{} {what}", element.describe_start())
    }
}

/// 1-based table coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    row: usize,
    column: usize,
}

impl Cell {
    fn new(row: usize, column: usize) -> AssayResult<Self> {
        if row == 0 {
            return Err(AssayError::invalid_argument("row", "table rows are 1-based"));
        }
        if column == 0 {
            return Err(AssayError::invalid_argument(
                "column",
                "table columns are 1-based",
            ));
        }
        Ok(Self { row, column })
    }

    fn describe(self, element: &Element) -> String {
        format!(
            "cell at row {} and column {} within {}",
            self.row,
            self.column,
            element.describe()
        )
    }

    fn missing(self, element: &Element) -> String {
        format!(
            "Cell not found at row {} and column {} within {}",
            self.row,
            self.column,
            element.describe()
        )
    }
}

// =============================================================================
// ELEMENT CHECK
// =============================================================================

/// One pending check against an element
#[derive(Debug)]
pub struct ElementCheck<'r, D: ?Sized> {
    run: &'r mut TestRun,
    driver: &'r D,
    element: &'r Element,
    seconds: f64,
}

impl<'r, D: ElementResolver + ?Sized> ElementCheck<'r, D> {
    pub(crate) fn new(
        run: &'r mut TestRun,
        driver: &'r D,
        element: &'r Element,
        seconds: f64,
    ) -> Self {
        Self {
            run,
            driver,
            element,
            seconds,
        }
    }

    /// Wait up to `seconds` instead of the default
    #[must_use]
    pub fn within(mut self, seconds: f64) -> Self {
        self.seconds = seconds;
        self
    }

    /// Budget this check will wait
    #[must_use]
    pub const fn budget_seconds(&self) -> f64 {
        self.seconds
    }

    /// State checks (present, displayed, enabled, ...)
    pub fn state(self) -> StateCheck<'r, D> {
        StateCheck(self)
    }

    /// Equality checks
    pub fn equals(self) -> Equals<'r, D> {
        Equals(self)
    }

    /// Containment checks
    pub fn contains(self) -> Contains<'r, D> {
        Contains(self)
    }

    /// Pattern checks
    pub fn matches(self) -> Matches<'r, D> {
        Matches(self)
    }

    /// Negated containment checks
    pub fn excludes(self) -> Excludes<'r, D> {
        Excludes(self)
    }

    fn evaluate<T, F>(
        self,
        check: String,
        gate: Gate,
        cell: Option<Cell>,
        sentinel: T,
        probe: F,
    ) -> AssayResult<T>
    where
        F: Fn(&D, &Element) -> AssayResult<Probe<T>>,
    {
        let Self {
            run,
            driver,
            element,
            seconds,
        } = self;
        let budget = run.budget(seconds)?;
        let expectation = run.expect(check, &budget);

        let present = run
            .poller()
            .await_fallible(budget, || driver.is_present(element));
        if !present.satisfied {
            debug!(element = %element, "precondition failed: not present");
            let actual = Gate::Present.missing(element);
            run.record_captured(driver, expectation, &actual, false, present.elapsed_seconds);
            return Ok(sentinel);
        }
        let mut spent = present.elapsed_seconds;

        if gate != Gate::Present {
            let kind = run
                .poller()
                .await_after(budget, spent, || gate.holds(driver, element));
            match kind {
                Some(outcome) if outcome.satisfied => spent += outcome.elapsed_seconds,
                other => {
                    debug!(element = %element, gate = ?gate, "precondition failed: wrong kind");
                    let elapsed = other.map_or(budget.seconds(), |o| spent + o.elapsed_seconds);
                    run.record_captured(
                        driver,
                        expectation,
                        &gate.missing(element),
                        false,
                        elapsed,
                    );
                    return Ok(sentinel);
                }
            }
        }

        if let Some(cell) = cell {
            let found = run.poller().await_after(budget, spent, || {
                Ok(driver.cell_text(element, cell.row, cell.column)?.is_some())
            });
            match found {
                Some(outcome) if outcome.satisfied => spent += outcome.elapsed_seconds,
                other => {
                    debug!(
                        element = %element,
                        row = cell.row,
                        column = cell.column,
                        "precondition failed: no cell"
                    );
                    let elapsed = other.map_or(budget.seconds(), |o| spent + o.elapsed_seconds);
                    run.record_captured(
                        driver,
                        expectation,
                        &cell.missing(element),
                        false,
                        elapsed,
                    );
                    return Ok(sentinel);
                }
            }
        }

        if !budget.is_immediate() {
            let settled = run
                .poller()
                .await_after(budget, spent, || probe(driver, element).map(|p| p.passed));
            spent = settled.map_or(budget.seconds(), |o| spent + o.elapsed_seconds);
        }

        let elapsed = spent.min(budget.seconds());
        match probe(driver, element) {
            Ok(observed) => {
                run.record_captured(
                    driver,
                    expectation,
                    &observed.actual,
                    observed.passed,
                    elapsed,
                );
                Ok(observed.value)
            }
            Err(err) => {
                warn!(element = %element, error = %err, "final read failed");
                let actual = if matches!(driver.is_present(element), Ok(false)) {
                    Gate::Present.missing(element)
                } else {
                    unreadable(element, &err)
                };
                run.record_captured(driver, expectation, &actual, false, elapsed);
                Ok(sentinel)
            }
        }
    }
}

fn unreadable(element: &Element, err: &AssayError) -> String {
    format!("{} could not be read: {}", element.describe_start(), italic(&err.to_string()))
}

fn has_text(element: &Element, actual: &str) -> String {
    format!("{} has text of {}", element.describe_start(), bold(actual))
}

fn has_value(element: &Element, actual: &str) -> String {
    format!("{} has value of {}", element.describe_start(), bold(actual))
}

fn has_class(element: &Element, actual: Option<&str>) -> String {
    match actual {
        Some(class) => format!("{} has class {}", element.describe_start(), bold(class)),
        None => format!("{} has no class attribute", element.describe_start()),
    }
}

fn has_selected(element: &Element, what: &str, actual: Option<&str>) -> String {
    match actual {
        Some(selected) => format!(
            "{} has a selected {what} of {}",
            element.describe_start(),
            bold(selected)
        ),
        None => format!("{} has no selected {what}", element.describe_start()),
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Element state that can be waited for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementState {
    /// Attached to the page
    Present,
    /// Not attached to the page
    NotPresent,
    /// Visible
    Displayed,
    /// Present but hidden
    NotDisplayed,
    /// Checkbox or radio checked
    Checked,
    /// Checkbox or radio unchecked
    NotChecked,
    /// Enabled
    Enabled,
    /// Disabled
    NotEnabled,
    /// Enabled input
    Editable,
    /// Not an enabled input
    NotEditable,
}

impl ElementState {
    /// Phrase used in descriptions
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Present => "present on the page",
            Self::NotPresent => "not present on the page",
            Self::Displayed => "displayed",
            Self::NotDisplayed => "not displayed",
            Self::Checked => "checked",
            Self::NotChecked => "not checked",
            Self::Enabled => "enabled",
            Self::NotEnabled => "not enabled",
            Self::Editable => "editable",
            Self::NotEditable => "not editable",
        }
    }

    /// The negated state
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Present => Self::NotPresent,
            Self::NotPresent => Self::Present,
            Self::Displayed => Self::NotDisplayed,
            Self::NotDisplayed => Self::Displayed,
            Self::Checked => Self::NotChecked,
            Self::NotChecked => Self::Checked,
            Self::Enabled => Self::NotEnabled,
            Self::NotEnabled => Self::Enabled,
            Self::Editable => Self::NotEditable,
            Self::NotEditable => Self::Editable,
        }
    }

    /// Whether the element must be present before this state is evaluated
    #[must_use]
    pub const fn requires_presence(&self) -> bool {
        !matches!(self, Self::Present | Self::NotPresent)
    }

    fn holds<D: ElementResolver + ?Sized>(
        self,
        driver: &D,
        element: &Element,
    ) -> AssayResult<bool> {
        Ok(match self {
            Self::Present => driver.is_present(element)?,
            Self::NotPresent => !driver.is_present(element)?,
            Self::Displayed => driver.is_displayed(element)?,
            Self::NotDisplayed => !driver.is_displayed(element)?,
            Self::Checked => driver.is_checked(element)?,
            Self::NotChecked => !driver.is_checked(element)?,
            Self::Enabled => driver.is_enabled(element)?,
            Self::NotEnabled => !driver.is_enabled(element)?,
            Self::Editable => driver.is_input(element)? && driver.is_enabled(element)?,
            Self::NotEditable => !(driver.is_input(element)? && driver.is_enabled(element)?),
        })
    }
}

/// State checks
#[derive(Debug)]
pub struct StateCheck<'r, D: ?Sized>(ElementCheck<'r, D>);

impl<'r, D: ElementResolver + ?Sized> StateCheck<'r, D> {
    /// Check that the element reaches `state`
    ///
    /// States other than (not) present first wait for presence and then
    /// spend only what is left of the budget on the state itself.
    pub fn is(self, state: ElementState) -> AssayResult<bool> {
        let ElementCheck {
            run,
            driver,
            element,
            seconds,
        } = self.0;
        let budget = run.budget(seconds)?;
        let expectation = run.expect(
            format!("to find {} {}", element.describe(), state.label()),
            &budget,
        );
        let start = element.describe_start();

        let (passed, elapsed, actual) = if state.requires_presence() {
            let outcome = run.poller().await_chained(
                budget,
                || driver.is_present(element),
                || state.holds(driver, element),
            );
            let actual = if !outcome.prerequisite.satisfied {
                Gate::Present.missing(element)
            } else if outcome.short_circuited() {
                format!("{start} is present, but the wait ran out before it was {}", state.label())
            } else if outcome.satisfied() {
                format!("{start} is {}", state.label())
            } else {
                format!("{start} is {}", state.opposite().label())
            };
            (outcome.satisfied(), outcome.elapsed_seconds(), actual)
        } else {
            let outcome = run
                .poller()
                .await_fallible(budget, || state.holds(driver, element));
            let shown = if outcome.satisfied {
                state
            } else {
                state.opposite()
            };
            (
                outcome.satisfied,
                outcome.elapsed_seconds,
                format!("{start} is {}", shown.label()),
            )
        };

        run.record_captured(driver, expectation, &actual, passed, elapsed);
        Ok(passed)
    }

    /// Element is present
    pub fn present(self) -> AssayResult<bool> {
        self.is(ElementState::Present)
    }

    /// Element is not present
    pub fn not_present(self) -> AssayResult<bool> {
        self.is(ElementState::NotPresent)
    }

    /// Element is displayed
    pub fn displayed(self) -> AssayResult<bool> {
        self.is(ElementState::Displayed)
    }

    /// Element is present but not displayed
    pub fn not_displayed(self) -> AssayResult<bool> {
        self.is(ElementState::NotDisplayed)
    }

    /// Element is checked
    pub fn checked(self) -> AssayResult<bool> {
        self.is(ElementState::Checked)
    }

    /// Element is not checked
    pub fn not_checked(self) -> AssayResult<bool> {
        self.is(ElementState::NotChecked)
    }

    /// Element is enabled
    pub fn enabled(self) -> AssayResult<bool> {
        self.is(ElementState::Enabled)
    }

    /// Element is not enabled
    pub fn not_enabled(self) -> AssayResult<bool> {
        self.is(ElementState::NotEnabled)
    }

    /// Element is an enabled input
    pub fn editable(self) -> AssayResult<bool> {
        self.is(ElementState::Editable)
    }

    /// Element is not an enabled input
    pub fn not_editable(self) -> AssayResult<bool> {
        self.is(ElementState::NotEditable)
    }
}

// =============================================================================
// EQUALS
// =============================================================================

/// Equality checks
#[derive(Debug)]
pub struct Equals<'r, D: ?Sized>(ElementCheck<'r, D>);

impl<'r, D: ElementResolver + ?Sized> Equals<'r, D> {
    /// `class` attribute equals `expected`
    pub fn class(self, expected: &str) -> AssayResult<Option<String>> {
        let check = format!("to find {} with class {}", self.0.element.describe(), bold(expected));
        self.0.evaluate(check, Gate::Present, None, None, |driver, el| {
            let class = driver.class(el)?;
            let passed = class.as_deref() == Some(expected);
            let actual = has_class(el, class.as_deref());
            Ok(Probe::new(class, passed, actual))
        })
    }

    /// Attribute `name` equals `expected`
    pub fn attribute(self, name: &str, expected: &str) -> AssayResult<Option<String>> {
        let check = format!(
            "to find {} with attribute {} having a value of {}",
            self.0.element.describe(),
            bold(name),
            bold(expected)
        );
        self.0.evaluate(check, Gate::Present, None, None, |driver, el| {
            let value = driver.attribute(el, name)?;
            let passed = value.as_deref() == Some(expected);
            let actual = match &value {
                Some(v) => format!(
                    "{} has attribute {} with a value of {}",
                    el.describe_start(),
                    bold(name),
                    bold(v)
                ),
                None => format!("{} does not have attribute {}", el.describe_start(), bold(name)),
            };
            Ok(Probe::new(value, passed, actual))
        })
    }

    /// Computed CSS `property` equals `expected`
    pub fn css(self, property: &str, expected: &str) -> AssayResult<Option<String>> {
        let check = format!(
            "to find {} with css attribute {} having a value of {}",
            self.0.element.describe(),
            bold(property),
            bold(expected)
        );
        self.0.evaluate(check, Gate::Present, None, None, |driver, el| {
            let value = driver.css_value(el, property)?;
            let passed = value.as_deref() == Some(expected);
            let actual = match &value {
                Some(v) => format!(
                    "{} has css attribute {} with a value of {}",
                    el.describe_start(),
                    bold(property),
                    bold(v)
                ),
                None => format!(
                    "{} does not have css attribute {}",
                    el.describe_start(),
                    bold(property)
                ),
            };
            Ok(Probe::new(value, passed, actual))
        })
    }

    /// Visible text equals `expected`
    pub fn text(self, expected: &str) -> AssayResult<String> {
        let check = format!(
            "to find {} having text of {}",
            self.0.element.describe(),
            bold(expected)
        );
        self.0.evaluate(check, Gate::Present, None, String::new(), |driver, el| {
            let text = driver.text(el)?;
            let passed = compare::equals(&text, expected);
            let actual = has_text(el, &text);
            Ok(Probe::new(text, passed, actual))
        })
    }

    /// Input value equals `expected`
    pub fn value(self, expected: &str) -> AssayResult<String> {
        let check = format!(
            "to find {} having value of {}",
            self.0.element.describe(),
            bold(expected)
        );
        self.0.evaluate(check, Gate::Input, None, String::new(), |driver, el| {
            let value = driver.value(el)?;
            let passed = compare::equals(&value, expected);
            let actual = has_value(el, &value);
            Ok(Probe::new(value, passed, actual))
        })
    }

    /// Text of the selected option equals `expected`
    pub fn selected_option(self, expected: &str) -> AssayResult<Option<String>> {
        let check = format!(
            "to find {} having a selected option of {}",
            self.0.element.describe(),
            bold(expected)
        );
        self.0.evaluate(check, Gate::Select, None, None, |driver, el| {
            let selected = driver.selected_option(el)?;
            let passed = selected.as_deref() == Some(expected);
            let actual = has_selected(el, "option", selected.as_deref());
            Ok(Probe::new(selected, passed, actual))
        })
    }

    /// Value of the selected option equals `expected`
    pub fn selected_value(self, expected: &str) -> AssayResult<Option<String>> {
        let check = format!(
            "to find {} having a selected value of {}",
            self.0.element.describe(),
            bold(expected)
        );
        self.0.evaluate(check, Gate::Select, None, None, |driver, el| {
            let selected = driver.selected_value(el)?;
            let passed = selected.as_deref() == Some(expected);
            let actual = has_selected(el, "value", selected.as_deref());
            Ok(Probe::new(selected, passed, actual))
        })
    }

    /// Option texts equal `expected`, in order
    pub fn select_options(self, expected: &[&str]) -> AssayResult<Vec<String>> {
        let check = format!(
            "to find {} with select options of {}",
            self.0.element.describe(),
            bold_list(expected)
        );
        self.0.evaluate(check, Gate::Select, None, Vec::new(), |driver, el| {
            let options = driver.select_options(el)?;
            let passed = compare::same_sequence(&options, expected);
            let actual = format!(
                "{} has select options of {}",
                el.describe_start(),
                bold_list(&options)
            );
            Ok(Probe::new(options, passed, actual))
        })
    }

    /// Option values equal `expected`, in order
    pub fn select_values(self, expected: &[&str]) -> AssayResult<Vec<String>> {
        let check = format!(
            "to find {} with select values of {}",
            self.0.element.describe(),
            bold_list(expected)
        );
        self.0.evaluate(check, Gate::Select, None, Vec::new(), |driver, el| {
            let values = driver.select_values(el)?;
            let passed = compare::same_sequence(&values, expected);
            let actual = format!(
                "{} has select values of {}",
                el.describe_start(),
                bold_list(&values)
            );
            Ok(Probe::new(values, passed, actual))
        })
    }

    /// Text of the cell at 1-based `row`/`column` equals `expected`
    pub fn cell_text(self, row: usize, column: usize, expected: &str) -> AssayResult<String> {
        let cell = Cell::new(row, column)?;
        let check = format!(
            "to find {} having text of {}",
            cell.describe(self.0.element),
            bold(expected)
        );
        self.0.evaluate(check, Gate::Table, Some(cell), String::new(), |driver, el| {
            Ok(match driver.cell_text(el, cell.row, cell.column)? {
                Some(text) => {
                    let passed = compare::equals(&text, expected);
                    let actual = format!(
                        "{} has text of {}",
                        capitalize(&cell.describe(el)),
                        bold(&text)
                    );
                    Probe::new(text, passed, actual)
                }
                None => Probe::new(String::new(), false, cell.missing(el)),
            })
        })
    }
}

// =============================================================================
// CONTAINS
// =============================================================================

/// Containment checks
#[derive(Debug)]
pub struct Contains<'r, D: ?Sized>(ElementCheck<'r, D>);

impl<'r, D: ElementResolver + ?Sized> Contains<'r, D> {
    /// Class list contains `expected`
    pub fn class(self, expected: &str) -> AssayResult<Option<String>> {
        let check = format!(
            "to find {} containing class {}",
            self.0.element.describe(),
            bold(expected)
        );
        self.0.evaluate(check, Gate::Present, None, None, |driver, el| {
            let class = driver.class(el)?;
            let passed = class.as_deref().is_some_and(|c| compare::has_class(c, expected));
            let actual = has_class(el, class.as_deref());
            Ok(Probe::new(class, passed, actual))
        })
    }

    /// Element carries attribute `name`; returns all attribute names
    pub fn attribute(self, name: &str) -> AssayResult<Vec<String>> {
        let check = format!("to find {} with attribute {}", self.0.element.describe(), bold(name));
        self.0.evaluate(check, Gate::Present, None, Vec::new(), |driver, el| {
            let names: Vec<String> = driver.attributes(el)?.into_keys().collect();
            let passed = compare::is_member(&names, name);
            let actual = if passed {
                format!("{} has attribute {}", el.describe_start(), bold(name))
            } else {
                format!(
                    "{} does not have attribute {}, only the attributes {}",
                    el.describe_start(),
                    bold(name),
                    bold_list(&names)
                )
            };
            Ok(Probe::new(names, passed, actual))
        })
    }

    /// Visible text contains `expected`
    pub fn text(self, expected: &str) -> AssayResult<String> {
        let check = format!(
            "to find {} containing text {}",
            self.0.element.describe(),
            bold(expected)
        );
        self.0.evaluate(check, Gate::Present, None, String::new(), |driver, el| {
            let text = driver.text(el)?;
            let passed = compare::contains(&text, expected);
            let actual = has_text(el, &text);
            Ok(Probe::new(text, passed, actual))
        })
    }

    /// Input value contains `expected`
    pub fn value(self, expected: &str) -> AssayResult<String> {
        let check = format!(
            "to find {} containing value {}",
            self.0.element.describe(),
            bold(expected)
        );
        self.0.evaluate(check, Gate::Input, None, String::new(), |driver, el| {
            let value = driver.value(el)?;
            let passed = compare::contains(&value, expected);
            let actual = has_value(el, &value);
            Ok(Probe::new(value, passed, actual))
        })
    }

    /// One of the option texts is `expected`; returns all option texts
    pub fn select_option(self, expected: &str) -> AssayResult<Vec<String>> {
        let check = format!(
            "to find {} with the select option {}",
            self.0.element.describe(),
            bold(expected)
        );
        self.0.evaluate(check, Gate::Select, None, Vec::new(), |driver, el| {
            let options = driver.select_options(el)?;
            let passed = compare::is_member(&options, expected);
            let actual = if passed {
                format!("{} contains the select option {}", el.describe_start(), bold(expected))
            } else {
                format!(
                    "{} does not contain the select option {}, only the options {}",
                    el.describe_start(),
                    bold(expected),
                    bold_list(&options)
                )
            };
            Ok(Probe::new(options, passed, actual))
        })
    }

    /// One of the option values is `expected`; returns all option values
    pub fn select_value(self, expected: &str) -> AssayResult<Vec<String>> {
        let check = format!(
            "to find {} with the select value {}",
            self.0.element.describe(),
            bold(expected)
        );
        self.0.evaluate(check, Gate::Select, None, Vec::new(), |driver, el| {
            let values = driver.select_values(el)?;
            let passed = compare::is_member(&values, expected);
            let actual = if passed {
                format!("{} contains the select value {}", el.describe_start(), bold(expected))
            } else {
                format!(
                    "{} does not contain the select value {}, only the values {}",
                    el.describe_start(),
                    bold(expected),
                    bold_list(&values)
                )
            };
            Ok(Probe::new(values, passed, actual))
        })
    }

    /// Select has exactly `expected` options
    pub fn select_options_count(self, expected: usize) -> AssayResult<Option<usize>> {
        let check = format!(
            "to find {} with {} select options",
            self.0.element.describe(),
            bold(&expected.to_string())
        );
        self.0.evaluate(check, Gate::Select, None, None, |driver, el| {
            let count = driver.select_options(el)?.len();
            let actual = format!(
                "{} has {} select options",
                el.describe_start(),
                bold(&count.to_string())
            );
            Ok(Probe::new(Some(count), count == expected, actual))
        })
    }

    /// Table has exactly `expected` rows
    pub fn rows(self, expected: usize) -> AssayResult<Option<usize>> {
        let check = format!(
            "to find {} with {} rows",
            self.0.element.describe(),
            bold(&expected.to_string())
        );
        self.0.evaluate(check, Gate::Table, None, None, |driver, el| {
            let count = driver.row_count(el)?;
            let actual = format!("{} has {} rows", el.describe_start(), bold(&count.to_string()));
            Ok(Probe::new(Some(count), count == expected, actual))
        })
    }

    /// Table has exactly `expected` columns
    pub fn columns(self, expected: usize) -> AssayResult<Option<usize>> {
        let check = format!(
            "to find {} with {} columns",
            self.0.element.describe(),
            bold(&expected.to_string())
        );
        self.0.evaluate(check, Gate::Table, None, None, |driver, el| {
            let count = driver.column_count(el)?;
            let actual = format!(
                "{} has {} columns",
                el.describe_start(),
                bold(&count.to_string())
            );
            Ok(Probe::new(Some(count), count == expected, actual))
        })
    }
}

// =============================================================================
// MATCHES
// =============================================================================

/// Pattern checks; patterns must match the whole value
#[derive(Debug)]
pub struct Matches<'r, D: ?Sized>(ElementCheck<'r, D>);

impl<'r, D: ElementResolver + ?Sized> Matches<'r, D> {
    /// Visible text matches `pattern`
    pub fn text(self, pattern: &str) -> AssayResult<String> {
        let pattern = Pattern::new(pattern)?;
        let check = format!(
            "to find {} having text matching {}",
            self.0.element.describe(),
            bold(pattern.as_str())
        );
        self.0.evaluate(check, Gate::Present, None, String::new(), |driver, el| {
            let text = driver.text(el)?;
            let passed = pattern.matches(&text);
            let actual = has_text(el, &text);
            Ok(Probe::new(text, passed, actual))
        })
    }

    /// Input value matches `pattern`
    pub fn value(self, pattern: &str) -> AssayResult<String> {
        let pattern = Pattern::new(pattern)?;
        let check = format!(
            "to find {} having value matching {}",
            self.0.element.describe(),
            bold(pattern.as_str())
        );
        self.0.evaluate(check, Gate::Input, None, String::new(), |driver, el| {
            let value = driver.value(el)?;
            let passed = pattern.matches(&value);
            let actual = has_value(el, &value);
            Ok(Probe::new(value, passed, actual))
        })
    }

    /// Text of the selected option matches `pattern`
    pub fn selected_option(self, pattern: &str) -> AssayResult<Option<String>> {
        let pattern = Pattern::new(pattern)?;
        let check = format!(
            "to find {} having a selected option matching {}",
            self.0.element.describe(),
            bold(pattern.as_str())
        );
        self.0.evaluate(check, Gate::Select, None, None, |driver, el| {
            let selected = driver.selected_option(el)?;
            let passed = selected.as_deref().is_some_and(|s| pattern.matches(s));
            let actual = has_selected(el, "option", selected.as_deref());
            Ok(Probe::new(selected, passed, actual))
        })
    }

    /// Value of the selected option matches `pattern`
    pub fn selected_value(self, pattern: &str) -> AssayResult<Option<String>> {
        let pattern = Pattern::new(pattern)?;
        let check = format!(
            "to find {} having a selected value matching {}",
            self.0.element.describe(),
            bold(pattern.as_str())
        );
        self.0.evaluate(check, Gate::Select, None, None, |driver, el| {
            let selected = driver.selected_value(el)?;
            let passed = selected.as_deref().is_some_and(|s| pattern.matches(s));
            let actual = has_selected(el, "value", selected.as_deref());
            Ok(Probe::new(selected, passed, actual))
        })
    }

    /// Text of the cell at 1-based `row`/`column` matches `pattern`
    pub fn cell_text(self, row: usize, column: usize, pattern: &str) -> AssayResult<String> {
        let pattern = Pattern::new(pattern)?;
        let cell = Cell::new(row, column)?;
        let check = format!(
            "to find {} having text matching {}",
            cell.describe(self.0.element),
            bold(pattern.as_str())
        );
        self.0.evaluate(check, Gate::Table, Some(cell), String::new(), |driver, el| {
            Ok(match driver.cell_text(el, cell.row, cell.column)? {
                Some(text) => {
                    let passed = pattern.matches(&text);
                    let actual = format!(
                        "{} has text of {}",
                        capitalize(&cell.describe(el)),
                        bold(&text)
                    );
                    Probe::new(text, passed, actual)
                }
                None => Probe::new(String::new(), false, cell.missing(el)),
            })
        })
    }
}

// =============================================================================
// EXCLUDES
// =============================================================================

/// Negated containment checks
#[derive(Debug)]
pub struct Excludes<'r, D: ?Sized>(ElementCheck<'r, D>);

impl<'r, D: ElementResolver + ?Sized> Excludes<'r, D> {
    /// Class list does not contain `unexpected`
    pub fn class(self, unexpected: &str) -> AssayResult<Option<String>> {
        let check = format!(
            "to find {} not containing class {}",
            self.0.element.describe(),
            bold(unexpected)
        );
        self.0.evaluate(check, Gate::Present, None, None, |driver, el| {
            let class = driver.class(el)?;
            let passed = !class.as_deref().is_some_and(|c| compare::has_class(c, unexpected));
            let actual = has_class(el, class.as_deref());
            Ok(Probe::new(class, passed, actual))
        })
    }

    /// Element does not carry attribute `name`; returns all attribute names
    pub fn attribute(self, name: &str) -> AssayResult<Vec<String>> {
        let check = format!(
            "to find {} without attribute {}",
            self.0.element.describe(),
            bold(name)
        );
        self.0.evaluate(check, Gate::Present, None, Vec::new(), |driver, el| {
            let names: Vec<String> = driver.attributes(el)?.into_keys().collect();
            let passed = !compare::is_member(&names, name);
            let actual = if passed {
                format!("{} does not have attribute {}", el.describe_start(), bold(name))
            } else {
                format!("{} has attribute {}", el.describe_start(), bold(name))
            };
            Ok(Probe::new(names, passed, actual))
        })
    }

    /// Visible text does not contain `unexpected`
    pub fn text(self, unexpected: &str) -> AssayResult<String> {
        let check = format!(
            "to find {} not containing text {}",
            self.0.element.describe(),
            bold(unexpected)
        );
        self.0.evaluate(check, Gate::Present, None, String::new(), |driver, el| {
            let text = driver.text(el)?;
            let passed = !compare::contains(&text, unexpected);
            let actual = has_text(el, &text);
            Ok(Probe::new(text, passed, actual))
        })
    }

    /// Input value does not contain `unexpected`
    pub fn value(self, unexpected: &str) -> AssayResult<String> {
        let check = format!(
            "to find {} not containing value {}",
            self.0.element.describe(),
            bold(unexpected)
        );
        self.0.evaluate(check, Gate::Input, None, String::new(), |driver, el| {
            let value = driver.value(el)?;
            let passed = !compare::contains(&value, unexpected);
            let actual = has_value(el, &value);
            Ok(Probe::new(value, passed, actual))
        })
    }

    /// Text of the selected option is not `unexpected`
    pub fn selected_option(self, unexpected: &str) -> AssayResult<Option<String>> {
        let check = format!(
            "to find {} not having a selected option of {}",
            self.0.element.describe(),
            bold(unexpected)
        );
        self.0.evaluate(check, Gate::Select, None, None, |driver, el| {
            let selected = driver.selected_option(el)?;
            let passed = selected.as_deref() != Some(unexpected);
            let actual = has_selected(el, "option", selected.as_deref());
            Ok(Probe::new(selected, passed, actual))
        })
    }

    /// Value of the selected option is not `unexpected`
    pub fn selected_value(self, unexpected: &str) -> AssayResult<Option<String>> {
        let check = format!(
            "to find {} not having a selected value of {}",
            self.0.element.describe(),
            bold(unexpected)
        );
        self.0.evaluate(check, Gate::Select, None, None, |driver, el| {
            let selected = driver.selected_value(el)?;
            let passed = selected.as_deref() != Some(unexpected);
            let actual = has_selected(el, "value", selected.as_deref());
            Ok(Probe::new(selected, passed, actual))
        })
    }

    /// None of the option texts is `unexpected`
    pub fn select_option(self, unexpected: &str) -> AssayResult<Vec<String>> {
        let check = format!(
            "to find {} without the select option {}",
            self.0.element.describe(),
            bold(unexpected)
        );
        self.0.evaluate(check, Gate::Select, None, Vec::new(), |driver, el| {
            let options = driver.select_options(el)?;
            let passed = !compare::is_member(&options, unexpected);
            let actual = if passed {
                format!(
                    "{} does not contain the select option {}",
                    el.describe_start(),
                    bold(unexpected)
                )
            } else {
                format!("{} contains the select option {}", el.describe_start(), bold(unexpected))
            };
            Ok(Probe::new(options, passed, actual))
        })
    }

    /// None of the option values is `unexpected`
    pub fn select_value(self, unexpected: &str) -> AssayResult<Vec<String>> {
        let check = format!(
            "to find {} without the select value {}",
            self.0.element.describe(),
            bold(unexpected)
        );
        self.0.evaluate(check, Gate::Select, None, Vec::new(), |driver, el| {
            let values = driver.select_values(el)?;
            let passed = !compare::is_member(&values, unexpected);
            let actual = if passed {
                format!(
                    "{} does not contain the select value {}",
                    el.describe_start(),
                    bold(unexpected)
                )
            } else {
                format!("{} contains the select value {}", el.describe_start(), bold(unexpected))
            };
            Ok(Probe::new(values, passed, actual))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::{Clock, FakeClock};
    use crate::config::AssayConfig;
    use crate::driver::{MockDriver, MockElement};
    use crate::target::Locator;
    use std::sync::Arc;
    use std::time::Duration;

    fn setup() -> (Arc<FakeClock>, MockDriver, TestRun) {
        let clock = FakeClock::shared();
        let driver = MockDriver::new(clock.clone());
        let run = TestRun::with_clock("element", AssayConfig::default(), clock.clone()).unwrap();
        (clock, driver, run)
    }

    fn id(value: &str) -> Element {
        Element::id(value).unwrap()
    }

    fn last_actual(run: &TestRun) -> String {
        run.report().entries().last().unwrap().actual.clone()
    }

    mod gate_tests {
        use super::*;

        #[test]
        fn test_missing_element_returns_sentinel() {
            let (_clock, driver, mut run) = setup();
            let text = run.check(&driver, &id("ghost")).equals().text("x").unwrap();
            assert_eq!(text, "");
            assert_eq!(run.error_count(), 1);
            assert_eq!(
                last_actual(&run),
                "Element with id <i>ghost</i> is not present on the page"
            );
            assert!(!driver.was_called("text"));
        }

        #[test]
        fn test_wrong_kind_skips_fetch() {
            let (_clock, mut driver, mut run) = setup();
            driver.add_element(Locator::Id("div".into()), MockElement::new());
            let options = run.check(&driver, &id("div")).contains().select_option("a").unwrap();
            assert!(options.is_empty());
            assert!(last_actual(&run).ends_with("is not a select on the page"));
            assert!(!driver.was_called("select_options"));

            let value = run.check(&driver, &id("div")).equals().value("v").unwrap();
            assert_eq!(value, "");
            assert!(last_actual(&run).ends_with("is not an input on the page"));
            assert_eq!(run.error_count(), 2);
        }

        #[test]
        fn test_zero_coordinates_are_authoring_errors() {
            let (_clock, driver, mut run) = setup();
            let err = run
                .check(&driver, &id("t"))
                .equals()
                .cell_text(0, 1, "x")
                .unwrap_err();
            assert!(err.is_authoring_error());
            assert_eq!(run.report().total_count(), 0);
        }

        #[test]
        fn test_invalid_pattern_propagates_before_recording() {
            let (_clock, driver, mut run) = setup();
            let err = run.check(&driver, &id("a")).matches().text("(").unwrap_err();
            assert!(matches!(err, AssayError::InvalidPattern { .. }));
            assert_eq!(run.report().total_count(), 0);
            assert!(driver.history().is_empty());
        }

        #[test]
        fn test_negative_budget_is_authoring_error() {
            let (_clock, driver, mut run) = setup();
            let err = run
                .wait_for(&driver, &id("a"))
                .within(-1.0)
                .state()
                .present()
                .unwrap_err();
            assert!(err.is_authoring_error());
        }

        #[test]
        fn test_oversized_budget_is_authoring_error() {
            let (clock, driver, mut run) = setup();
            let err = run
                .wait_for(&driver, &id("a"))
                .within(1e20)
                .state()
                .present()
                .unwrap_err();
            assert!(err.is_authoring_error());
            assert_eq!(run.report().total_count(), 0);
            assert_eq!(clock.now(), Duration::ZERO);
        }

        #[test]
        fn test_element_removed_before_final_read_fails() {
            let (_clock, mut driver, mut run) = setup();
            driver.add_element(
                Locator::Id("status".into()),
                MockElement::new()
                    .with_text("Loading")
                    .removed_at(Duration::from_secs(1)),
            );
            let text = run
                .wait_for(&driver, &id("status"))
                .within(3.0)
                .equals()
                .text("Done")
                .unwrap();
            assert_eq!(text, "");
            assert_eq!(run.report().total_count(), 1);
            assert_eq!(run.error_count(), 1);
            assert_eq!(
                last_actual(&run),
                "After waiting for 3 seconds, element with id <i>status</i> is not present on the page"
            );
        }

        #[test]
        fn test_kind_check_retries_stale_reads() {
            let (_clock, mut driver, mut run) = setup();
            driver.add_element(
                Locator::Id("pick".into()),
                MockElement::select([("Alpha", "a"), ("Bravo", "b")]).with_stale_kind_queries(2),
            );
            let values = run
                .wait_for(&driver, &id("pick"))
                .contains()
                .select_value("a")
                .unwrap();
            assert_eq!(values, vec!["a", "b"]);
            assert_eq!(run.error_count(), 0);
            assert_eq!(driver.call_count("is_select"), 3);
            let entry = run.report().entries().last().unwrap();
            assert!((entry.elapsed_seconds - 0.2).abs() < 1e-9);
        }

        #[test]
        fn test_wrong_kind_waits_for_budget() {
            let (clock, mut driver, mut run) = setup();
            driver.add_element(Locator::Id("div".into()), MockElement::new());
            let value = run
                .wait_for(&driver, &id("div"))
                .within(2.0)
                .equals()
                .value("v")
                .unwrap();
            assert_eq!(value, "");
            assert_eq!(clock.now(), Duration::from_secs(2));
            assert_eq!(run.report().entries()[0].elapsed_seconds, 2.0);
            assert!(last_actual(&run).ends_with("is not an input on the page"));
            assert!(!driver.was_called("value"));
        }
    }

    mod state_tests {
        use super::*;

        #[test]
        fn test_displayed_after_presence() {
            let (clock, mut driver, mut run) = setup();
            driver.add_element(
                Locator::Id("panel".into()),
                MockElement::new()
                    .appearing_at(Duration::from_secs(1))
                    .displayed_at(Duration::from_secs(2)),
            );
            let ok = run
                .wait_for(&driver, &id("panel"))
                .state()
                .displayed()
                .unwrap();
            assert!(ok);
            assert_eq!(clock.now(), Duration::from_secs(2));
            let entry = run.report().entries().last().unwrap();
            assert!((entry.elapsed_seconds - 2.0).abs() < 1e-9);
            assert_eq!(
                entry.action.as_deref(),
                Some("Waiting up to 5 seconds to find element with id <i>panel</i> displayed")
            );
        }

        #[test]
        fn test_not_present_waits_for_removal() {
            let (_clock, mut driver, mut run) = setup();
            driver.add_element(
                Locator::Id("spinner".into()),
                MockElement::new().removed_at(Duration::from_millis(1_500)),
            );
            assert!(run
                .wait_for(&driver, &id("spinner"))
                .state()
                .not_present()
                .unwrap());
            assert_eq!(run.error_count(), 0);
        }

        #[test]
        fn test_editable_requires_input_and_enabled() {
            let (_clock, mut driver, mut run) = setup();
            driver.add_element(Locator::Id("in".into()), MockElement::input());
            driver.add_element(Locator::Id("off".into()), MockElement::input().enabled(false));
            assert!(run.check(&driver, &id("in")).state().editable().unwrap());
            assert!(!run.check(&driver, &id("off")).state().editable().unwrap());
            assert!(run.check(&driver, &id("off")).state().not_editable().unwrap());
            assert!(last_actual(&run).ends_with("is not editable"));
            assert_eq!(run.error_count(), 1);
        }

        #[test]
        fn test_checked_and_enabled() {
            let (_clock, mut driver, mut run) = setup();
            driver.add_element(Locator::Id("box".into()), MockElement::input().checked(true));
            assert!(run.check(&driver, &id("box")).state().checked().unwrap());
            assert!(!run.check(&driver, &id("box")).state().not_checked().unwrap());
            assert!(run.check(&driver, &id("box")).state().enabled().unwrap());
            assert!(!run.check(&driver, &id("box")).state().not_enabled().unwrap());
            assert!(!run.check(&driver, &id("box")).state().not_displayed().unwrap());
            assert_eq!(run.error_count(), 3);
        }

        #[test]
        fn test_state_opposites() {
            assert_eq!(ElementState::Displayed.opposite(), ElementState::NotDisplayed);
            assert_eq!(ElementState::NotEditable.opposite(), ElementState::Editable);
            assert!(!ElementState::NotPresent.requires_presence());
            assert!(ElementState::Checked.requires_presence());
        }
    }

    mod value_tests {
        use super::*;

        #[test]
        fn test_text_equals_waits_for_change() {
            let (_clock, mut driver, mut run) = setup();
            driver.add_element(
                Locator::Id("status".into()),
                MockElement::new()
                    .with_text("Loading")
                    .with_text_at(Duration::from_secs(3), "Done"),
            );
            let text = run
                .wait_for(&driver, &id("status"))
                .equals()
                .text("Done")
                .unwrap();
            assert_eq!(text, "Done");
            let entry = run.report().entries().last().unwrap();
            assert!((entry.elapsed_seconds - 3.0).abs() < 1e-9);
            assert_eq!(
                entry.actual,
                "After waiting for 3 seconds, element with id <i>status</i> has text of <b>Done</b>"
            );
        }

        #[test]
        fn test_text_mismatch_after_full_wait() {
            let (_clock, mut driver, mut run) = setup();
            driver.add_element(
                Locator::Id("status".into()),
                MockElement::new().with_text("Loading"),
            );
            let text = run
                .wait_for(&driver, &id("status"))
                .within(2.0)
                .equals()
                .text("Done")
                .unwrap();
            assert_eq!(text, "Loading");
            let entry = run.report().entries().last().unwrap();
            assert_eq!(entry.elapsed_seconds, 2.0);
            assert!(entry.status.is_fail());
        }

        #[test]
        fn test_class_attribute_css() {
            let (_clock, mut driver, mut run) = setup();
            driver.add_element(
                Locator::Id("btn".into()),
                MockElement::new()
                    .with_attribute("class", "btn primary")
                    .with_attribute("type", "submit")
                    .with_css("color", "red"),
            );
            let el = id("btn");
            assert_eq!(
                run.check(&driver, &el).equals().class("btn primary").unwrap().as_deref(),
                Some("btn primary")
            );
            run.check(&driver, &el).contains().class("primary").unwrap();
            run.check(&driver, &el).excludes().class("danger").unwrap();
            run.check(&driver, &el).equals().attribute("type", "submit").unwrap();
            run.check(&driver, &el).equals().css("color", "red").unwrap();
            let names = run.check(&driver, &el).contains().attribute("type").unwrap();
            assert_eq!(names, vec!["class".to_string(), "type".to_string()]);
            run.check(&driver, &el).excludes().attribute("disabled").unwrap();
            assert_eq!(run.error_count(), 0);

            run.check(&driver, &el).contains().attribute("href").unwrap();
            assert_eq!(
                last_actual(&run),
                "Element with id <i>btn</i> does not have attribute <b>href</b>, only the attributes <b>[class, type]</b>"
            );
            assert_eq!(run.error_count(), 1);
        }

        #[test]
        fn test_value_checks_on_input() {
            let (_clock, mut driver, mut run) = setup();
            driver.add_element(
                Locator::Id("email".into()),
                MockElement::input().with_value("a@b.test"),
            );
            let el = id("email");
            run.check(&driver, &el).equals().value("a@b.test").unwrap();
            run.check(&driver, &el).contains().value("@b").unwrap();
            run.check(&driver, &el).matches().value(r"\w+@\w+\.test").unwrap();
            run.check(&driver, &el).excludes().value("@c").unwrap();
            assert_eq!(run.error_count(), 0);
            run.check(&driver, &el).matches().value("@b").unwrap();
            assert_eq!(run.error_count(), 1);
        }

        #[test]
        fn test_text_matches_is_whole_value() {
            let (_clock, mut driver, mut run) = setup();
            driver.add_element(Locator::Id("n".into()), MockElement::new().with_text("Order 1234"));
            run.check(&driver, &id("n")).matches().text(r"Order \d+").unwrap();
            run.check(&driver, &id("n")).matches().text(r"\d+").unwrap();
            run.check(&driver, &id("n")).contains().text("1234").unwrap();
            run.check(&driver, &id("n")).excludes().text("Invoice").unwrap();
            assert_eq!(run.error_count(), 1);
        }
    }

    mod select_tests {
        use super::*;

        fn with_select(driver: &mut MockDriver) -> Element {
            driver.add_element(
                Locator::Id("size".into()),
                MockElement::select([("Small", "s"), ("Medium", "m"), ("Large", "l")])
                    .with_selected(1),
            );
            id("size")
        }

        #[test]
        fn test_selected_option_and_value() {
            let (_clock, mut driver, mut run) = setup();
            let el = with_select(&mut driver);
            assert_eq!(
                run.check(&driver, &el).equals().selected_option("Medium").unwrap().as_deref(),
                Some("Medium")
            );
            run.check(&driver, &el).equals().selected_value("m").unwrap();
            run.check(&driver, &el).matches().selected_option("Med.*").unwrap();
            run.check(&driver, &el).matches().selected_value("[ml]").unwrap();
            assert_eq!(run.error_count(), 0);
        }

        #[test]
        fn test_selection_is_not() {
            let (_clock, mut driver, mut run) = setup();
            let el = with_select(&mut driver);
            let shown = run.check(&driver, &el).excludes().selected_option("Large").unwrap();
            assert_eq!(shown.as_deref(), Some("Medium"));
            run.check(&driver, &el).excludes().selected_value("s").unwrap();
            assert_eq!(run.error_count(), 0);

            run.check(&driver, &el).excludes().selected_value("m").unwrap();
            assert_eq!(
                last_actual(&run),
                "Element with id <i>size</i> has a selected value of <b>m</b>"
            );
            assert_eq!(run.error_count(), 1);

            let missing = run.check(&driver, &id("gone")).excludes().selected_option("x").unwrap();
            assert!(missing.is_none());
            assert_eq!(run.error_count(), 2);
        }

        #[test]
        fn test_options_lists_and_count() {
            let (_clock, mut driver, mut run) = setup();
            let el = with_select(&mut driver);
            run.check(&driver, &el).equals().select_options(&["Small", "Medium", "Large"]).unwrap();
            run.check(&driver, &el).equals().select_values(&["s", "m", "l"]).unwrap();
            assert_eq!(
                run.check(&driver, &el).contains().select_options_count(3).unwrap(),
                Some(3)
            );
            run.check(&driver, &el).excludes().select_option("Huge").unwrap();
            run.check(&driver, &el).excludes().select_value("xl").unwrap();
            assert_eq!(run.error_count(), 0);

            run.check(&driver, &el).equals().select_values(&["l", "m", "s"]).unwrap();
            run.check(&driver, &el).excludes().select_value("m").unwrap();
            assert_eq!(run.error_count(), 2);
        }

        #[test]
        fn test_count_sentinel_when_missing() {
            let (_clock, driver, mut run) = setup();
            let count = run.check(&driver, &id("none")).contains().select_options_count(3).unwrap();
            assert_eq!(count, None);
            assert_eq!(run.error_count(), 1);
        }
    }

    mod table_tests {
        use super::*;

        #[test]
        fn test_rows_columns_and_cells() {
            let (_clock, mut driver, mut run) = setup();
            driver.add_element(
                Locator::Id("grid".into()),
                MockElement::table(vec![vec!["a", "b"], vec!["c", "d"], vec!["e", "f"]]),
            );
            let el = id("grid");
            assert_eq!(run.check(&driver, &el).contains().rows(3).unwrap(), Some(3));
            assert_eq!(run.check(&driver, &el).contains().columns(2).unwrap(), Some(2));
            run.check(&driver, &el).matches().cell_text(3, 2, "[a-f]").unwrap();
            assert_eq!(run.error_count(), 0);

            run.check(&driver, &el).contains().columns(3).unwrap();
            assert_eq!(
                last_actual(&run),
                "Element with id <i>grid</i> has <b>2</b> columns"
            );
            assert_eq!(run.error_count(), 1);
        }

        #[test]
        fn test_cell_on_non_table() {
            let (_clock, mut driver, mut run) = setup();
            driver.add_element(Locator::Id("p".into()), MockElement::new());
            let text = run.check(&driver, &id("p")).equals().cell_text(1, 1, "x").unwrap();
            assert_eq!(text, "");
            assert!(last_actual(&run).ends_with("is not a table on the page"));
            assert!(!driver.was_called("cell_text"));
        }
    }
}
