//! Assay: check, wait and report engine for browser and HTTP tests
//!
//! A test author writes declarative checks ("element X has text Y",
//! "response code is 200"). Each check resolves its target against the
//! live application, optionally polling for up to a bounded wait, compares
//! actual against expected, records one traceable result, and feeds the
//! per-test error count used for the final verdict.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         ASSAY Architecture                          │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐                │
//! │   │ TestRun    │    │ Check      │    │ Target     │  ElementResolver│
//! │   │ (config,   │───►│ Evaluator  │───►│ Resolver   │  PageResolver   │
//! │   │  wait)     │    │            │    │ (driver)   │  Response       │
//! │   └────────────┘    └─────┬──────┘    └────────────┘                │
//! │                           │ Poller (Clock)                          │
//! │                           ▼                                         │
//! │                     ┌────────────┐    ┌────────────┐                │
//! │                     │ Recorder   │───►│ Error      │──► verdict     │
//! │                     │ (Report)   │    │ Counter    │                │
//! │                     └─────┬──────┘    └────────────┘                │
//! │                           ▼                                         │
//! │                     HTML / JUnit / JSON                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use assay::prelude::*;
//!
//! # fn main() -> AssayResult<()> {
//! let clock = FakeClock::shared();
//! let mut driver = MockDriver::new(clock.clone());
//! driver.add_element(Locator::Id("status".into()), MockElement::new().with_text("Ready"));
//!
//! let mut run = TestRun::with_clock("status page", AssayConfig::default(), clock)?;
//! let status = Element::id("status")?;
//! run.wait_for(&driver, &status).equals().text("Ready")?;
//! run.finish(0)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown
)]
mod aggregator;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown,
    clippy::needless_pass_by_value
)]
pub mod check;
mod clock;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod config;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown
)]
mod driver;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod http;
mod logging;
pub mod markup;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::cast_precision_loss
)]
mod recorder;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown,
    clippy::cast_precision_loss,
    clippy::format_push_string,
    clippy::needless_raw_string_hashes
)]
mod reporter;
mod result;
mod target;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod wait;

pub use aggregator::{ErrorCounter, Verdict};
pub use check::{
    Contains, ElementCheck, ElementState, Equals, Excludes, Matches, PageCheck, Pattern,
    ResponseCheck, ResponseContains, ResponseEquals, ResponseMatches, StateCheck, TestRun,
};
pub use clock::{Clock, FakeClock, SharedClock, SystemClock};
pub use config::{
    AssayConfig, ScreenshotPolicy, ENV_DEFAULT_WAIT, ENV_OUTPUT_DIR, ENV_POLL_INTERVAL_MS,
    ENV_SCREENSHOTS,
};
pub use driver::{
    Capture, DialogKind, ElementResolver, MockDriver, MockElement, MockKind, PageResolver,
};
#[cfg(feature = "http")]
pub use http::HttpClient;
pub use http::{build_url, Request, Response};
pub use logging::{init_tracing, LogFormat};
pub use recorder::{format_seconds, narrate, CheckResult, Expectation, Recorder, Status};
pub use reporter::{Report, ReportFormat};
pub use result::{AssayError, AssayResult};
pub use target::{Element, JsonKey, JsonPath, Locator, ResponseFacet};
pub use wait::{
    ChainedOutcome, DefaultWait, PollOutcome, Poller, WaitBudget, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_WAIT_SECS,
};

/// Everything a test file usually needs
pub mod prelude {
    pub use super::{
        AssayConfig, AssayError, AssayResult, DialogKind, Element, ElementResolver, ElementState,
        FakeClock, JsonPath, Locator, MockDriver, MockElement, PageResolver, Report,
        ReportFormat, Response, ScreenshotPolicy, Status, TestRun,
    };
}
