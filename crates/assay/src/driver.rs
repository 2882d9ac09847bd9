//! Target Resolver capabilities
//!
//! The engine never talks to a browser directly. It consumes the small
//! capability set below, implemented once per driver backend. Every call
//! may fail; failures during polling count as "not yet", and a failure on
//! the final value fetch becomes a FAIL result.
//!
//! [`MockDriver`] implements both traits over a [`Clock`], so elements can
//! appear, become displayed or change text at scripted times.

use crate::clock::SharedClock;
use crate::result::{AssayError, AssayResult};
use crate::target::{Element, Locator};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

// =============================================================================
// CAPABILITIES
// =============================================================================

/// Kind of JavaScript dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialogKind {
    /// `alert()`
    Alert,
    /// `confirm()`
    Confirmation,
    /// `prompt()`
    Prompt,
}

impl DialogKind {
    /// Name used in report descriptions
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Confirmation => "confirmation",
            Self::Prompt => "prompt",
        }
    }

    /// Article plus name, e.g. "an alert"
    #[must_use]
    pub const fn with_article(&self) -> &'static str {
        match self {
            Self::Alert => "an alert",
            Self::Confirmation => "a confirmation",
            Self::Prompt => "a prompt",
        }
    }
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Screenshot capture, attached to failing checks
pub trait Capture {
    /// PNG bytes of the current viewport, `None` when unsupported
    fn screenshot(&self) -> AssayResult<Option<Vec<u8>>> {
        Ok(None)
    }
}

/// Element-level queries
pub trait ElementResolver: Capture {
    /// Element is attached to the page
    fn is_present(&self, element: &Element) -> AssayResult<bool>;
    /// Element is visible
    fn is_displayed(&self, element: &Element) -> AssayResult<bool>;
    /// Element is enabled
    fn is_enabled(&self, element: &Element) -> AssayResult<bool>;
    /// Checkbox or radio is checked
    fn is_checked(&self, element: &Element) -> AssayResult<bool>;
    /// Element accepts text input
    fn is_input(&self, element: &Element) -> AssayResult<bool>;
    /// Element is a `<select>`
    fn is_select(&self, element: &Element) -> AssayResult<bool>;
    /// Element is a `<table>`
    fn is_table(&self, element: &Element) -> AssayResult<bool>;

    /// Visible text
    fn text(&self, element: &Element) -> AssayResult<String>;
    /// Input value
    fn value(&self, element: &Element) -> AssayResult<String>;
    /// Attribute value, `None` when the attribute is absent
    fn attribute(&self, element: &Element, name: &str) -> AssayResult<Option<String>>;
    /// All attributes
    fn attributes(&self, element: &Element) -> AssayResult<BTreeMap<String, String>>;
    /// Computed CSS property
    fn css_value(&self, element: &Element, property: &str) -> AssayResult<Option<String>>;

    /// `class` attribute
    fn class(&self, element: &Element) -> AssayResult<Option<String>> {
        self.attribute(element, "class")
    }

    /// Visible text of every option, in order
    fn select_options(&self, element: &Element) -> AssayResult<Vec<String>>;
    /// `value` of every option, in order
    fn select_values(&self, element: &Element) -> AssayResult<Vec<String>>;
    /// Visible text of the selected option
    fn selected_option(&self, element: &Element) -> AssayResult<Option<String>>;
    /// `value` of the selected option
    fn selected_value(&self, element: &Element) -> AssayResult<Option<String>>;

    /// Number of table rows
    fn row_count(&self, element: &Element) -> AssayResult<usize>;
    /// Number of columns in the widest row
    fn column_count(&self, element: &Element) -> AssayResult<usize>;
    /// Text of the cell at 1-based `row`/`column`, `None` when absent
    fn cell_text(&self, element: &Element, row: usize, column: usize)
        -> AssayResult<Option<String>>;
}

/// Page-level queries
pub trait PageResolver: Capture {
    /// Current URL
    fn url(&self) -> AssayResult<String>;
    /// Document title
    fn title(&self) -> AssayResult<String>;
    /// Full page source
    fn page_source(&self) -> AssayResult<String>;
    /// `text` is rendered visibly on the page
    fn is_text_visible(&self, text: &str) -> AssayResult<bool>;
    /// Text of the open dialog of `kind`, `None` when none is open
    fn dialog_text(&self, kind: DialogKind) -> AssayResult<Option<String>>;
    /// A dialog of `kind` is open
    fn is_dialog_present(&self, kind: DialogKind) -> AssayResult<bool> {
        Ok(self.dialog_text(kind)?.is_some())
    }
    /// Cookie value, `None` when no cookie has that name
    fn cookie(&self, name: &str) -> AssayResult<Option<String>>;
}

// =============================================================================
// MOCK DRIVER
// =============================================================================

/// Structural kind of a mock element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockKind {
    /// Any other element
    #[default]
    Other,
    /// `<input>` or `<textarea>`
    Input,
    /// `<select>`
    Select,
    /// `<table>`
    Table,
}

/// Value that changes at scripted times
#[derive(Debug, Clone, Default)]
struct Timeline<T> {
    steps: Vec<(Duration, T)>,
}

impl<T: Clone> Timeline<T> {
    fn set_at(&mut self, at: Duration, value: T) {
        self.steps.push((at, value));
        self.steps.sort_by_key(|(t, _)| *t);
    }

    fn at(&self, now: Duration) -> Option<T> {
        self.steps
            .iter()
            .rev()
            .find(|(t, _)| *t <= now)
            .map(|(_, v)| v.clone())
    }
}

/// Scripted element for [`MockDriver`]
#[derive(Debug, Clone, Default)]
pub struct MockElement {
    kind: MockKind,
    appears_at: Duration,
    removed_at: Option<Duration>,
    displayed_at: Option<Duration>,
    enabled: bool,
    checked: bool,
    text: Timeline<String>,
    value: Timeline<String>,
    attributes: BTreeMap<String, String>,
    css: BTreeMap<String, String>,
    options: Vec<(String, String)>,
    selected: Option<usize>,
    rows: Vec<Vec<String>>,
    transient_failures: u32,
    stale_kind_queries: u32,
}

impl MockElement {
    /// Present, displayed and enabled element
    #[must_use]
    pub fn new() -> Self {
        Self {
            displayed_at: Some(Duration::ZERO),
            enabled: true,
            ..Self::default()
        }
    }

    /// `<input>` element
    #[must_use]
    pub fn input() -> Self {
        Self::new().with_kind(MockKind::Input)
    }

    /// `<select>` with `(text, value)` options
    #[must_use]
    pub fn select<S: Into<String>>(options: impl IntoIterator<Item = (S, S)>) -> Self {
        let mut el = Self::new().with_kind(MockKind::Select);
        el.options = options
            .into_iter()
            .map(|(t, v)| (t.into(), v.into()))
            .collect();
        el
    }

    /// `<table>` with the given rows of cell texts
    #[must_use]
    pub fn table(rows: Vec<Vec<&str>>) -> Self {
        let mut el = Self::new().with_kind(MockKind::Table);
        el.rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(str::to_string).collect())
            .collect();
        el
    }

    /// Set structural kind
    #[must_use]
    pub const fn with_kind(mut self, kind: MockKind) -> Self {
        self.kind = kind;
        self
    }

    /// Attach to the page at `at`
    #[must_use]
    pub const fn appearing_at(mut self, at: Duration) -> Self {
        self.appears_at = at;
        self
    }

    /// Detach from the page at `at`
    #[must_use]
    pub const fn removed_at(mut self, at: Duration) -> Self {
        self.removed_at = Some(at);
        self
    }

    /// Become visible at `at`
    #[must_use]
    pub const fn displayed_at(mut self, at: Duration) -> Self {
        self.displayed_at = Some(at);
        self
    }

    /// Never become visible
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed_at = None;
        self
    }

    /// Set enabled state
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set checked state
    #[must_use]
    pub const fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Text from the start
    #[must_use]
    pub fn with_text(self, text: &str) -> Self {
        self.with_text_at(Duration::ZERO, text)
    }

    /// Text from `at` onwards
    #[must_use]
    pub fn with_text_at(mut self, at: Duration, text: &str) -> Self {
        self.text.set_at(at, text.to_string());
        self
    }

    /// Value from the start
    #[must_use]
    pub fn with_value(self, value: &str) -> Self {
        self.with_value_at(Duration::ZERO, value)
    }

    /// Value from `at` onwards
    #[must_use]
    pub fn with_value_at(mut self, at: Duration, value: &str) -> Self {
        self.value.set_at(at, value.to_string());
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Set a computed CSS property
    #[must_use]
    pub fn with_css(mut self, property: &str, value: &str) -> Self {
        self.css.insert(property.to_string(), value.to_string());
        self
    }

    /// Select the option at `index`
    #[must_use]
    pub const fn with_selected(mut self, index: usize) -> Self {
        self.selected = Some(index);
        self
    }

    /// Fail the next `n` presence queries with a stale-element error
    #[must_use]
    pub const fn with_transient_failures(mut self, n: u32) -> Self {
        self.transient_failures = n;
        self
    }

    /// Fail the next `n` input/select/table queries with a stale reference
    #[must_use]
    pub const fn with_stale_kind_queries(mut self, n: u32) -> Self {
        self.stale_kind_queries = n;
        self
    }

    fn attached(&self, now: Duration) -> bool {
        now >= self.appears_at && self.removed_at.map_or(true, |r| now < r)
    }
}

/// Scripted driver for unit testing
#[derive(Debug)]
pub struct MockDriver {
    clock: SharedClock,
    elements: HashMap<Locator, Vec<MockElement>>,
    url: Timeline<String>,
    title: Timeline<String>,
    source: String,
    visible_texts: Vec<(Duration, String)>,
    dialogs: HashMap<DialogKind, (Duration, String)>,
    cookies: BTreeMap<String, String>,
    screenshot_data: Option<Vec<u8>>,
    window_closed_at: Option<Duration>,
    transient: RefCell<HashMap<(Locator, usize), u32>>,
    stale_kinds: RefCell<HashMap<(Locator, usize), u32>>,
    call_history: RefCell<Vec<String>>,
    screenshots_taken: Cell<usize>,
}

impl MockDriver {
    /// Create an empty page on `clock`
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            elements: HashMap::new(),
            url: Timeline::default(),
            title: Timeline::default(),
            source: String::new(),
            visible_texts: Vec::new(),
            dialogs: HashMap::new(),
            cookies: BTreeMap::new(),
            screenshot_data: None,
            window_closed_at: None,
            transient: RefCell::new(HashMap::new()),
            stale_kinds: RefCell::new(HashMap::new()),
            call_history: RefCell::new(Vec::new()),
            screenshots_taken: Cell::new(0),
        }
    }

    /// Add an element; repeated locators become later matches
    pub fn add_element(&mut self, locator: Locator, element: MockElement) {
        let matches = self.elements.entry(locator.clone()).or_default();
        if element.transient_failures > 0 {
            self.transient
                .borrow_mut()
                .insert((locator.clone(), matches.len()), element.transient_failures);
        }
        if element.stale_kind_queries > 0 {
            self.stale_kinds
                .borrow_mut()
                .insert((locator, matches.len()), element.stale_kind_queries);
        }
        matches.push(element);
    }

    /// Set URL from the start
    pub fn set_url(&mut self, url: &str) {
        self.url.set_at(Duration::ZERO, url.to_string());
    }

    /// Navigate to `url` at `at`
    pub fn set_url_at(&mut self, at: Duration, url: &str) {
        self.url.set_at(at, url.to_string());
    }

    /// Set title from the start
    pub fn set_title(&mut self, title: &str) {
        self.title.set_at(Duration::ZERO, title.to_string());
    }

    /// Change title at `at`
    pub fn set_title_at(&mut self, at: Duration, title: &str) {
        self.title.set_at(at, title.to_string());
    }

    /// Set page source
    pub fn set_source(&mut self, source: &str) {
        self.source = source.to_string();
    }

    /// Render `text` visibly from `at` onwards
    pub fn show_text_at(&mut self, at: Duration, text: &str) {
        self.visible_texts.push((at, text.to_string()));
    }

    /// Render `text` visibly from the start
    pub fn show_text(&mut self, text: &str) {
        self.show_text_at(Duration::ZERO, text);
    }

    /// Open a dialog at `at`
    pub fn open_dialog_at(&mut self, at: Duration, kind: DialogKind, text: &str) {
        self.dialogs.insert(kind, (at, text.to_string()));
    }

    /// Open a dialog from the start
    pub fn open_dialog(&mut self, kind: DialogKind, text: &str) {
        self.open_dialog_at(Duration::ZERO, kind, text);
    }

    /// Store a cookie
    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    /// Close the window at `at`; page reads fail from then on
    pub fn close_window_at(&mut self, at: Duration) {
        self.window_closed_at = Some(at);
    }

    /// Set mock screenshot
    pub fn set_screenshot(&mut self, png: Vec<u8>) {
        self.screenshot_data = Some(png);
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.call_history.borrow().clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history
            .borrow()
            .iter()
            .any(|c| c.starts_with(method))
    }

    /// Number of calls whose entry starts with `method`
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.call_history
            .borrow()
            .iter()
            .filter(|c| c.starts_with(method))
            .count()
    }

    /// Forget recorded calls
    pub fn clear_history(&self) {
        self.call_history.borrow_mut().clear();
    }

    /// Screenshots captured so far
    #[must_use]
    pub fn screenshots_taken(&self) -> usize {
        self.screenshots_taken.get()
    }

    fn now(&self) -> Duration {
        self.clock.now()
    }

    fn log(&self, method: &str, target: &dyn fmt::Display) {
        self.call_history
            .borrow_mut()
            .push(format!("{method}:{target}"));
    }

    fn lookup(&self, element: &Element) -> Option<&MockElement> {
        self.elements
            .get(element.locator())
            .and_then(|matches| matches.get(element.index()))
    }

    fn window(&self, method: &str, target: &dyn fmt::Display) -> AssayResult<()> {
        self.log(method, target);
        match self.window_closed_at {
            Some(at) if self.now() >= at => Err(AssayError::driver("no such window")),
            _ => Ok(()),
        }
    }

    fn go_stale(
        counters: &RefCell<HashMap<(Locator, usize), u32>>,
        element: &Element,
    ) -> AssayResult<()> {
        let key = (element.locator().clone(), element.index());
        if let Some(remaining) = counters.borrow_mut().get_mut(&key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(AssayError::driver(format!(
                    "stale element reference: {element}"
                )));
            }
        }
        Ok(())
    }

    fn kind_of(&self, method: &str, element: &Element) -> AssayResult<MockKind> {
        let kind = self.attached(method, element)?.kind;
        Self::go_stale(&self.stale_kinds, element)?;
        Ok(kind)
    }

    fn attached(&self, method: &str, element: &Element) -> AssayResult<&MockElement> {
        self.log(method, element);
        match self.lookup(element) {
            Some(el) if el.attached(self.now()) => Ok(el),
            _ => Err(AssayError::driver(format!("no such element: {element}"))),
        }
    }
}

impl Capture for MockDriver {
    fn screenshot(&self) -> AssayResult<Option<Vec<u8>>> {
        self.log("screenshot", &"page");
        if self.screenshot_data.is_some() {
            self.screenshots_taken.set(self.screenshots_taken.get() + 1);
        }
        Ok(self.screenshot_data.clone())
    }
}

impl ElementResolver for MockDriver {
    fn is_present(&self, element: &Element) -> AssayResult<bool> {
        self.log("is_present", element);
        Self::go_stale(&self.transient, element)?;
        Ok(self
            .lookup(element)
            .is_some_and(|el| el.attached(self.now())))
    }

    fn is_displayed(&self, element: &Element) -> AssayResult<bool> {
        let now = self.now();
        let el = self.attached("is_displayed", element)?;
        Ok(el.displayed_at.is_some_and(|at| now >= at))
    }

    fn is_enabled(&self, element: &Element) -> AssayResult<bool> {
        Ok(self.attached("is_enabled", element)?.enabled)
    }

    fn is_checked(&self, element: &Element) -> AssayResult<bool> {
        Ok(self.attached("is_checked", element)?.checked)
    }

    fn is_input(&self, element: &Element) -> AssayResult<bool> {
        Ok(self.kind_of("is_input", element)? == MockKind::Input)
    }

    fn is_select(&self, element: &Element) -> AssayResult<bool> {
        Ok(self.kind_of("is_select", element)? == MockKind::Select)
    }

    fn is_table(&self, element: &Element) -> AssayResult<bool> {
        Ok(self.kind_of("is_table", element)? == MockKind::Table)
    }

    fn text(&self, element: &Element) -> AssayResult<String> {
        let now = self.now();
        Ok(self
            .attached("text", element)?
            .text
            .at(now)
            .unwrap_or_default())
    }

    fn value(&self, element: &Element) -> AssayResult<String> {
        let now = self.now();
        Ok(self
            .attached("value", element)?
            .value
            .at(now)
            .unwrap_or_default())
    }

    fn attribute(&self, element: &Element, name: &str) -> AssayResult<Option<String>> {
        Ok(self
            .attached("attribute", element)?
            .attributes
            .get(name)
            .cloned())
    }

    fn attributes(&self, element: &Element) -> AssayResult<BTreeMap<String, String>> {
        Ok(self.attached("attributes", element)?.attributes.clone())
    }

    fn css_value(&self, element: &Element, property: &str) -> AssayResult<Option<String>> {
        Ok(self
            .attached("css_value", element)?
            .css
            .get(property)
            .cloned())
    }

    fn select_options(&self, element: &Element) -> AssayResult<Vec<String>> {
        let el = self.attached("select_options", element)?;
        Ok(el.options.iter().map(|(t, _)| t.clone()).collect())
    }

    fn select_values(&self, element: &Element) -> AssayResult<Vec<String>> {
        let el = self.attached("select_values", element)?;
        Ok(el.options.iter().map(|(_, v)| v.clone()).collect())
    }

    fn selected_option(&self, element: &Element) -> AssayResult<Option<String>> {
        let el = self.attached("selected_option", element)?;
        Ok(el
            .selected
            .and_then(|i| el.options.get(i))
            .map(|(t, _)| t.clone()))
    }

    fn selected_value(&self, element: &Element) -> AssayResult<Option<String>> {
        let el = self.attached("selected_value", element)?;
        Ok(el
            .selected
            .and_then(|i| el.options.get(i))
            .map(|(_, v)| v.clone()))
    }

    fn row_count(&self, element: &Element) -> AssayResult<usize> {
        Ok(self.attached("row_count", element)?.rows.len())
    }

    fn column_count(&self, element: &Element) -> AssayResult<usize> {
        let el = self.attached("column_count", element)?;
        Ok(el.rows.iter().map(Vec::len).max().unwrap_or(0))
    }

    fn cell_text(
        &self,
        element: &Element,
        row: usize,
        column: usize,
    ) -> AssayResult<Option<String>> {
        let el = self.attached("cell_text", element)?;
        Ok(row
            .checked_sub(1)
            .and_then(|r| el.rows.get(r))
            .and_then(|cells| column.checked_sub(1).and_then(|c| cells.get(c)))
            .cloned())
    }
}

impl PageResolver for MockDriver {
    fn url(&self) -> AssayResult<String> {
        self.window("url", &"page")?;
        Ok(self.url.at(self.now()).unwrap_or_default())
    }

    fn title(&self) -> AssayResult<String> {
        self.window("title", &"page")?;
        Ok(self.title.at(self.now()).unwrap_or_default())
    }

    fn page_source(&self) -> AssayResult<String> {
        self.window("page_source", &"page")?;
        Ok(self.source.clone())
    }

    fn is_text_visible(&self, text: &str) -> AssayResult<bool> {
        self.window("is_text_visible", &text)?;
        let now = self.now();
        Ok(self
            .visible_texts
            .iter()
            .any(|(at, shown)| now >= *at && shown.contains(text)))
    }

    fn dialog_text(&self, kind: DialogKind) -> AssayResult<Option<String>> {
        self.window("dialog_text", &kind)?;
        let now = self.now();
        Ok(self
            .dialogs
            .get(&kind)
            .filter(|(at, _)| now >= *at)
            .map(|(_, text)| text.clone()))
    }

    fn cookie(&self, name: &str) -> AssayResult<Option<String>> {
        self.window("cookie", &name)?;
        Ok(self.cookies.get(name).cloned())
    }
}
