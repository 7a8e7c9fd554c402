/// Validation report types.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pass/fail verdict of one check or of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// Identifier of one of the six draft checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CheckId {
    /// Body length.
    F1,
    /// Image marker count.
    F2,
    /// Scene separator count.
    F3,
    /// Title header structure.
    F4,
    /// Next-episode preview presence.
    F5,
    /// Consecutive past-tense endings.
    F6,
}

impl CheckId {
    pub const ALL: [CheckId; 6] = [
        CheckId::F1,
        CheckId::F2,
        CheckId::F3,
        CheckId::F4,
        CheckId::F5,
        CheckId::F6,
    ];
}

impl std::fmt::Display for CheckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Grammatical ending class of a narrative sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndingClass {
    /// Past-narrative `ㅆ다` ending (`했다`, `싸웠다`).
    Past,
    /// Any other `다` ending (`싸운다`, `있다`, `하겠다`).
    OtherDa,
    /// Does not end in `다`.
    NonDa,
}

/// A maximal run of past-narrative sentences long enough to flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationGroup {
    /// Index of the first sentence of the run among classified sentences.
    pub start: usize,
    pub length: usize,
    /// Tails of the first few sentences in the run.
    pub samples: Vec<String>,
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub id: CheckId,
    pub name: String,
    pub result: Verdict,
    pub value: usize,
    pub criteria: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<ViolationGroup>,
}

/// Aggregated outcome of a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub file: String,
    pub results: Vec<CheckResult>,
    pub overall: Verdict,
    pub fail_items: Vec<CheckId>,
    pub summary: BTreeMap<String, Verdict>,
}

impl ValidationReport {
    /// Aggregate independent check results. Any failure fails the run.
    pub fn from_results(file: impl Into<String>, results: Vec<CheckResult>) -> Self {
        let fail_items: Vec<CheckId> = results
            .iter()
            .filter(|r| !r.result.is_pass())
            .map(|r| r.id)
            .collect();
        let overall = Verdict::from_passed(fail_items.is_empty());
        let summary = results
            .iter()
            .map(|r| (r.id.to_string(), r.result))
            .collect();

        Self {
            file: file.into(),
            results,
            overall,
            fail_items,
            summary,
        }
    }

    pub fn result(&self, id: CheckId) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.id == id)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
