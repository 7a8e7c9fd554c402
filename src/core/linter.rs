/// Episode linter: structural and stylistic checks over a finished draft.
///
/// The body is the prose between the title block and the next-episode
/// preview, without image markers or scene separators. Six independent
/// checks run against the raw text or the body and are aggregated into one
/// report; a failing check never stops the others.
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::sentence::{analyze_endings, EndingPolicy};
use crate::schema::episode::EpisodeTag;
use crate::schema::report::{CheckId, CheckResult, ValidationReport, Verdict};

static IMG_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[IMG:[^\]]+\]").expect("image marker pattern is valid"));
static IMG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[IMG:[^\]]+\]$").expect("image line pattern is valid"));
static TITLE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^# EP-\d+:").expect("title header pattern is valid"));
static NEXT_PREVIEW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*다음\s*화\s*예고\*\*").expect("preview label pattern is valid")
});
static NEXT_PREVIEW_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\*\*다음\s*화\s*예고\*\*").expect("preview line pattern is valid")
});

const SEPARATOR: &str = "---";
const TITLE_PREFIX: &str = "# EP-";
const SUMMARY_PREFIX: &str = ">";
/// Violation groups spelled out in the F6 detail string.
const DETAIL_GROUPS: usize = 3;

#[derive(Debug, Error)]
pub enum LintError {
    #[error("파일을 찾을 수 없음: {}", .0.display())]
    MissingDraft(PathBuf),
    #[error("{} 원고를 찾을 수 없음: {}", .tag, .dir.display())]
    DraftNotFound { tag: EpisodeTag, dir: PathBuf },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Inclusive numeric range a measured value must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: usize,
    pub max: usize,
}

impl Bounds {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: usize) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// `부족` below the range, `초과` above it, nothing inside.
    fn miss_label(&self, value: usize) -> Option<&'static str> {
        if value < self.min {
            Some("부족")
        } else if value > self.max {
            Some("초과")
        } else {
            None
        }
    }
}

/// Thresholds for every draft check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Non-whitespace characters in the body.
    pub body_chars: Bounds,
    /// `[IMG:...]` markers anywhere in the draft.
    pub image_markers: Bounds,
    /// Bare `---` lines anywhere in the draft.
    pub separators: Bounds,
    /// Required number of `# EP-NN:` title lines.
    pub title_headers: usize,
    pub endings: EndingPolicy,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            body_chars: Bounds::new(9000, 11000),
            image_markers: Bounds::new(3, 5),
            separators: Bounds::new(3, 6),
            title_headers: 1,
            endings: EndingPolicy::default(),
        }
    }
}

impl LintConfig {
    pub fn load_from_ron(path: &Path) -> Result<LintConfig, LintError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }
}

/// Format with thousands separators: `9000` -> `9,000`.
fn with_commas(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Strip the title block, image markers, separators and everything from the
/// next-episode preview on, leaving the prose body.
///
/// Lines before the title or the first rule are dropped, as is a summary
/// blockquote between the title and the first rule.
pub fn extract_body(text: &str) -> String {
    let mut body_lines: Vec<&str> = Vec::new();
    let mut started = false;
    let mut seen_rule = false;

    for line in text.split('\n') {
        let stripped = line.trim();
        if stripped.starts_with(TITLE_PREFIX) {
            started = true;
            continue;
        }
        if stripped == SEPARATOR {
            started = true;
            seen_rule = true;
            continue;
        }
        if !started || (!seen_rule && stripped.starts_with(SUMMARY_PREFIX)) {
            continue;
        }
        if NEXT_PREVIEW_LINE.is_match(stripped) {
            break;
        }
        if IMG_LINE.is_match(stripped) {
            continue;
        }
        body_lines.push(line);
    }

    body_lines.join("\n")
}

fn bounded_result(
    id: CheckId,
    name: &str,
    value: usize,
    bounds: Bounds,
    unit: &str,
    detail_prefix: &str,
) -> CheckResult {
    let miss = bounds.miss_label(value);
    let detail = match miss {
        Some(label) => format!("{} {}{} ({})", detail_prefix, value, unit, label),
        None => format!("{} {}{}", detail_prefix, value, unit),
    };
    CheckResult {
        id,
        name: name.to_string(),
        result: Verdict::from_passed(bounds.contains(value)),
        value,
        criteria: format!(
            "{}~{}{}",
            with_commas(bounds.min),
            with_commas(bounds.max),
            unit
        ),
        detail,
        violations: Vec::new(),
    }
}

/// F1: body length without whitespace.
pub fn check_body_length(body: &str, config: &LintConfig) -> CheckResult {
    let count = body.chars().filter(|c| !c.is_whitespace()).count();
    bounded_result(CheckId::F1, "글자 수", count, config.body_chars, "자", "본문")
}

/// F2: number of `[IMG:...]` markers.
pub fn check_image_markers(text: &str, config: &LintConfig) -> CheckResult {
    let count = IMG_MARKER.find_iter(text).count();
    bounded_result(CheckId::F2, "[IMG] 마커", count, config.image_markers, "개", "[IMG] 마커")
}

/// F3: number of bare `---` scene separator lines.
pub fn check_separators(text: &str, config: &LintConfig) -> CheckResult {
    let count = text.split('\n').filter(|line| line.trim() == SEPARATOR).count();
    bounded_result(CheckId::F3, "씬 구분자", count, config.separators, "개", "--- 구분자")
}

/// F4: exactly the configured number of `# EP-NN:` title lines.
pub fn check_title_header(text: &str, config: &LintConfig) -> CheckResult {
    let count = TITLE_HEADER.find_iter(text).count();
    let passed = count == config.title_headers;
    let mut detail = format!("헤더 {}개 발견", count);
    if !passed {
        detail.push_str(&format!(" (정확히 {}개 필요)", config.title_headers));
    }
    CheckResult {
        id: CheckId::F4,
        name: "마크다운 구조".to_string(),
        result: Verdict::from_passed(passed),
        value: count,
        criteria: format!("# EP-XX: 헤더 {}개", config.title_headers),
        detail,
        violations: Vec::new(),
    }
}

/// F5: the next-episode preview label is present.
pub fn check_next_preview(text: &str) -> CheckResult {
    let present = NEXT_PREVIEW.is_match(text);
    CheckResult {
        id: CheckId::F5,
        name: "다음 화 예고".to_string(),
        result: Verdict::from_passed(present),
        value: usize::from(present),
        criteria: "**다음 화 예고** 1개".to_string(),
        detail: format!("다음 화 예고 {}", if present { "존재" } else { "없음" }),
        violations: Vec::new(),
    }
}

/// F6: no run of consecutive past-tense narrative endings.
pub fn check_sentence_endings(body: &str, config: &LintConfig) -> CheckResult {
    let policy = &config.endings;
    let analysis = analyze_endings(body, policy);
    let count = analysis.violations.len();
    debug!(
        sentences = analysis.sentences.len(),
        violations = count,
        "ending analysis done"
    );

    let mut detail_lines = vec![format!("과거형 문미 연속 위반 {}개소", count)];
    for group in analysis.violations.iter().take(DETAIL_GROUPS) {
        detail_lines.push(format!(
            "  [{}연속] ...{}",
            group.length,
            group.samples.join(" / ...")
        ));
    }

    CheckResult {
        id: CheckId::F6,
        name: "문미 연속".to_string(),
        result: Verdict::from_passed(count == 0),
        value: count,
        criteria: format!("과거형(~았/었/였/했다) {}연속 0개소", policy.min_run),
        detail: detail_lines.join("\n"),
        violations: analysis.violations,
    }
}

/// Run all six checks over a draft's text.
pub fn run_checks(text: &str, config: &LintConfig) -> Vec<CheckResult> {
    let body = extract_body(text);
    let results = vec![
        check_body_length(&body, config),
        check_image_markers(text, config),
        check_separators(text, config),
        check_title_header(text, config),
        check_next_preview(text),
        check_sentence_endings(&body, config),
    ];
    for result in &results {
        debug!(check = %result.id, verdict = %result.result, value = result.value, "check done");
    }
    results
}

/// Validate draft text and aggregate the verdict.
pub fn validate_text(file: &str, text: &str, config: &LintConfig) -> ValidationReport {
    let report = ValidationReport::from_results(file, run_checks(text, config));
    info!(file, overall = %report.overall, failed = report.fail_items.len(), "draft validated");
    report
}

/// Read and validate a draft file.
pub fn validate_file(path: &Path, config: &LintConfig) -> Result<ValidationReport, LintError> {
    if !path.exists() {
        return Err(LintError::MissingDraft(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    Ok(validate_text(&path.display().to_string(), &text, config))
}
