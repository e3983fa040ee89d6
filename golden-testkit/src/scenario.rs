//! Declarative comparator scenarios.

use std::io::Cursor;

use golden::{
    CollectReporter, CompareOptions, Divergence, DivergenceKind, GoldenComparator, GoldenError,
};
use serde::{Deserialize, Serialize};

use crate::diff::ScenarioReport;

/// A comparator test case: a golden reference, the silver writes made
/// against it, and what should happen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,

    /// Description of what this scenario tests.
    #[serde(default)]
    pub description: String,

    /// Golden reference contents.
    pub golden: Content,

    /// Writes to make, in order.
    pub steps: Vec<Step>,

    /// Expected outcome after all steps.
    #[serde(default)]
    pub expect: Expectation,

    /// Comparator options; defaults when absent.
    #[serde(skip)]
    pub options: Option<CompareOptions>,
}

/// Byte content for golden or silver data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// Text content.
    Text(String),
    /// Binary content.
    Binary(Vec<u8>),
}

impl Content {
    /// Get the content as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Content::Text(s) => s.as_bytes(),
            Content::Binary(b) => b,
        }
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Text(s.to_string())
    }
}

impl From<&[u8]> for Content {
    fn from(b: &[u8]) -> Self {
        Content::Binary(b.to_vec())
    }
}

/// A write made against the comparator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Write the content one byte at a time.
    Bytes(Content),
    /// Write the content as a single block.
    Block(Content),
    /// Close the silver stream.
    Close,
}

/// Expected outcome of a scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Expectation {
    /// Expected divergence; `None` means silver must match golden.
    pub divergence: Option<ExpectedDivergence>,

    /// Index of the step that should trigger the divergence.
    pub at_step: Option<usize>,

    /// Exact bytes the silver sink should hold.
    pub silver: Option<Content>,
}

/// What the reported divergence should look like.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedDivergence {
    pub kind: DivergenceKind,

    /// 1-based offset.
    pub offset: Option<usize>,

    /// Exact rendered diff.
    pub diff: Option<String>,

    /// Lines the rendered diff must contain.
    #[serde(default)]
    pub diff_contains: Vec<String>,
}

/// What actually happened when a scenario ran.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    /// First divergence reported, if any.
    pub divergence: Option<Divergence>,
    /// Index of the step during which it was reported.
    pub at_step: Option<usize>,
    /// Number of times the reporter was called.
    pub report_count: usize,
    /// Golden bytes consumed when the run finished.
    pub position: usize,
    /// Everything the silver sink received.
    pub silver: Vec<u8>,
}

impl Scenario {
    /// Create a new scenario builder.
    pub fn builder(name: &str) -> ScenarioBuilder {
        ScenarioBuilder::new(name)
    }

    /// Parse a scenario from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Run the steps against an in-memory comparator.
    ///
    /// Divergences are collected, not raised; I/O errors from the
    /// comparator are returned.
    pub fn run(&self) -> Result<ScenarioOutcome, GoldenError> {
        let mut cmp = GoldenComparator::with_reporter(
            Cursor::new(self.golden.as_bytes().to_vec()),
            Vec::new(),
            CollectReporter::new(),
        )
        .with_options(self.options.unwrap_or_default());

        let mut at_step = None;
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                Step::Bytes(content) => {
                    for &b in content.as_bytes() {
                        cmp.write_byte(b)?;
                    }
                }
                Step::Block(content) => cmp.write_block(content.as_bytes())?,
                Step::Close => cmp.close()?,
            }
            if at_step.is_none() && cmp.has_diverged() {
                at_step = Some(i);
            }
        }

        let position = cmp.position();
        let (silver, reporter) = cmp.into_parts();
        Ok(ScenarioOutcome {
            divergence: reporter.first().cloned(),
            at_step,
            report_count: reporter.reported().len(),
            position,
            silver,
        })
    }

    /// Run the scenario and compare the outcome with the expectation.
    pub fn check(&self) -> Result<ScenarioReport, GoldenError> {
        let outcome = self.run()?;
        Ok(ScenarioReport::compare(&self.expect, &outcome))
    }

    /// Run the scenario and panic with a report if it does not behave as
    /// expected.
    pub fn assert(&self) {
        let report = match self.check() {
            Ok(report) => report,
            Err(e) => panic!("scenario '{}' failed to run: {}", self.name, e),
        };
        if !report.is_empty() {
            panic!("scenario '{}': {}", self.name, report.report());
        }
    }
}

/// Builder for creating scenarios.
pub struct ScenarioBuilder {
    name: String,
    description: String,
    golden: Content,
    steps: Vec<Step>,
    expect: Expectation,
    options: Option<CompareOptions>,
}

impl ScenarioBuilder {
    /// Create a new builder.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            golden: Content::Text(String::new()),
            steps: Vec::new(),
            expect: Expectation::default(),
            options: None,
        }
    }

    /// Set the description.
    pub fn description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    /// Set the golden reference.
    pub fn golden(mut self, content: impl Into<Content>) -> Self {
        self.golden = content.into();
        self
    }

    /// Write `content` one byte at a time.
    pub fn bytes(mut self, content: impl Into<Content>) -> Self {
        self.steps.push(Step::Bytes(content.into()));
        self
    }

    /// Write `content` as one block.
    pub fn block(mut self, content: impl Into<Content>) -> Self {
        self.steps.push(Step::Block(content.into()));
        self
    }

    /// Close the silver stream.
    pub fn close(mut self) -> Self {
        self.steps.push(Step::Close);
        self
    }

    pub fn options(mut self, options: CompareOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Expect silver to match golden.
    pub fn expect_match(mut self) -> Self {
        self.expect.divergence = None;
        self
    }

    /// Expect a divergence of `kind` at 1-based `offset`.
    pub fn expect_divergence(mut self, kind: DivergenceKind, offset: usize) -> Self {
        self.expect.divergence = Some(ExpectedDivergence {
            kind,
            offset: Some(offset),
            diff: None,
            diff_contains: Vec::new(),
        });
        self
    }

    /// Expect the rendered diff to be exactly `diff`.
    ///
    /// Call after [`expect_divergence`](Self::expect_divergence).
    pub fn expect_diff(mut self, diff: &str) -> Self {
        if let Some(expected) = self.expect.divergence.as_mut() {
            expected.diff = Some(diff.to_string());
        }
        self
    }

    /// Expect the rendered diff to contain `line`.
    ///
    /// Call after [`expect_divergence`](Self::expect_divergence).
    pub fn expect_diff_line(mut self, line: &str) -> Self {
        if let Some(expected) = self.expect.divergence.as_mut() {
            expected.diff_contains.push(line.to_string());
        }
        self
    }

    /// Expect the divergence to be reported during step `index` (0-based).
    pub fn expect_at_step(mut self, index: usize) -> Self {
        self.expect.at_step = Some(index);
        self
    }

    /// Expect the silver sink to hold exactly `content`.
    pub fn expect_silver(mut self, content: impl Into<Content>) -> Self {
        self.expect.silver = Some(content.into());
        self
    }

    /// Build the scenario.
    pub fn build(self) -> Scenario {
        Scenario {
            name: self.name,
            description: self.description,
            golden: self.golden,
            steps: self.steps,
            expect: self.expect,
            options: self.options,
        }
    }
}
