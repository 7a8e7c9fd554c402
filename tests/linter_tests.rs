/// Linter integration tests: whole drafts through all six checks.
use episode_workflow::core::linter::{validate_file, validate_text, LintConfig, LintError};
use episode_workflow::schema::report::{CheckId, Verdict};
use std::path::Path;

const PAST: &str = "사일라즈는 검을 높이 들어 올렸다.";
const PRESENT: &str = "바람이 거세게 불어오기 시작한다.";

/// One scene of alternating past and present narration, 30 counted
/// characters per pair.
fn scene(pairs: usize) -> String {
    (0..pairs)
        .map(|_| format!("{} {}", PAST, PRESENT))
        .collect::<Vec<_>>()
        .join("\n")
}

struct DraftShape {
    pairs_per_scene: usize,
    extra_images: usize,
    extra_separators: usize,
    duplicate_title: bool,
    preview: bool,
    past_streak: bool,
}

impl Default for DraftShape {
    fn default() -> Self {
        Self {
            pairs_per_scene: 80,
            extra_images: 0,
            extra_separators: 0,
            duplicate_title: false,
            preview: true,
            past_streak: false,
        }
    }
}

/// Four scenes, three images, four separators, one title, a preview.
fn draft(shape: DraftShape) -> String {
    let mut out = vec![
        "# EP-05: 시험의 날".to_string(),
        String::new(),
        "> 사일라즈가 심사장에 선다.".to_string(),
        String::new(),
        "---".to_string(),
    ];
    for idx in 1..=4 {
        out.push(String::new());
        out.push(scene(shape.pairs_per_scene));
        if idx == 1 && shape.past_streak {
            out.push(format!("{} {} {}", PAST, PAST, PAST));
        }
        if idx == 2 && shape.duplicate_title {
            out.push("# EP-05: 다시 시험의 날".to_string());
        }
        out.push(String::new());
        if idx < 4 {
            out.push(format!("[IMG: 장면 {}]", idx));
            out.push(String::new());
            out.push("---".to_string());
        }
    }
    for idx in 0..shape.extra_images {
        out.push(format!("[IMG: 추가 {}]", idx));
    }
    for _ in 0..shape.extra_separators {
        out.push("---".to_string());
    }
    if shape.preview {
        out.push(String::new());
        out.push("**다음 화 예고**".to_string());
        out.push("심사관의 정체가 드러난다.".to_string());
    }
    out.join("\n")
}

fn failed(shape: DraftShape) -> Vec<CheckId> {
    validate_text("draft.md", &draft(shape), &LintConfig::default()).fail_items
}

#[test]
fn well_formed_draft_passes_every_check() {
    let report = validate_text("draft.md", &draft(DraftShape::default()), &LintConfig::default());

    assert_eq!(report.overall, Verdict::Pass);
    assert!(report.fail_items.is_empty());
    assert_eq!(report.result(CheckId::F1).unwrap().value, 9600);
    assert_eq!(report.result(CheckId::F2).unwrap().value, 3);
    assert_eq!(report.result(CheckId::F3).unwrap().value, 4);
    assert_eq!(report.result(CheckId::F4).unwrap().value, 1);
    assert_eq!(report.result(CheckId::F5).unwrap().value, 1);
    assert_eq!(report.result(CheckId::F6).unwrap().value, 0);
    assert_eq!(report.summary.len(), 6);
    assert!(report.summary.values().all(|v| *v == Verdict::Pass));
}

#[test]
fn each_defect_fails_only_its_own_check() {
    let short = DraftShape {
        pairs_per_scene: 60,
        ..Default::default()
    };
    assert_eq!(failed(short), vec![CheckId::F1]);

    let crowded = DraftShape {
        extra_images: 3,
        ..Default::default()
    };
    assert_eq!(failed(crowded), vec![CheckId::F2]);

    let choppy = DraftShape {
        extra_separators: 3,
        ..Default::default()
    };
    assert_eq!(failed(choppy), vec![CheckId::F3]);

    let two_titles = DraftShape {
        duplicate_title: true,
        ..Default::default()
    };
    assert_eq!(failed(two_titles), vec![CheckId::F4]);

    let no_preview = DraftShape {
        preview: false,
        ..Default::default()
    };
    assert_eq!(failed(no_preview), vec![CheckId::F5]);

    let streak = DraftShape {
        past_streak: true,
        ..Default::default()
    };
    assert_eq!(failed(streak), vec![CheckId::F6]);
}

#[test]
fn independent_failures_are_all_reported() {
    let shape = DraftShape {
        pairs_per_scene: 100,
        extra_images: 3,
        preview: false,
        past_streak: true,
        ..Default::default()
    };
    let report = validate_text("draft.md", &draft(shape), &LintConfig::default());

    assert_eq!(report.overall, Verdict::Fail);
    assert_eq!(
        report.fail_items,
        vec![CheckId::F1, CheckId::F2, CheckId::F5, CheckId::F6]
    );
    let f1 = report.result(CheckId::F1).unwrap();
    assert_eq!(f1.value, 12045);
    assert!(f1.detail.ends_with("(초과)"));
    assert_eq!(f1.criteria, "9,000~11,000자");
}

#[test]
fn past_streak_is_reported_with_samples() {
    let shape = DraftShape {
        past_streak: true,
        ..Default::default()
    };
    let report = validate_text("draft.md", &draft(shape), &LintConfig::default());
    let f6 = report.result(CheckId::F6).unwrap();

    assert_eq!(f6.value, 1);
    assert_eq!(f6.violations.len(), 1);
    // The scene's last sentence is present tense, so the three inserted
    // past sentences form the run; the next scene opens with past tense.
    let group = &f6.violations[0];
    assert_eq!(group.length, 4);
    assert_eq!(group.samples.len(), 3);
    assert!(group.samples.iter().all(|s| s.ends_with("올렸다.")));
    assert!(f6.detail.contains("[4연속]"));
}

#[test]
fn validation_is_deterministic() {
    let text = draft(DraftShape {
        past_streak: true,
        extra_separators: 5,
        ..Default::default()
    });
    let config = LintConfig::default();
    let first = validate_text("draft.md", &text, &config).to_json().unwrap();
    let second = validate_text("draft.md", &text, &config).to_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn report_serializes_uppercase_verdicts() {
    let report = validate_text("draft.md", &draft(DraftShape::default()), &LintConfig::default());
    let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(value["file"], "draft.md");
    assert_eq!(value["overall"], "PASS");
    assert_eq!(value["summary"]["F3"], "PASS");
    assert_eq!(value["results"][0]["id"], "F1");
    assert_eq!(value["results"].as_array().unwrap().len(), 6);
    assert!(value["fail_items"].as_array().unwrap().is_empty());
}

#[test]
fn fixture_draft_fails_structure_checks() {
    let path = Path::new("tests/fixtures/episodes/EP-01_서클의_각성.md");
    let report = validate_file(path, &LintConfig::default()).unwrap();

    assert_eq!(report.overall, Verdict::Fail);
    assert_eq!(
        report.fail_items,
        vec![CheckId::F1, CheckId::F2, CheckId::F3]
    );
    assert_eq!(report.result(CheckId::F2).unwrap().value, 1);
    assert_eq!(report.result(CheckId::F3).unwrap().value, 2);
    assert_eq!(report.result(CheckId::F4).unwrap().result, Verdict::Pass);
    assert_eq!(report.result(CheckId::F5).unwrap().result, Verdict::Pass);
    assert_eq!(report.result(CheckId::F6).unwrap().result, Verdict::Pass);
    assert!(report.file.ends_with("EP-01_서클의_각성.md"));
}

#[test]
fn relaxed_config_changes_verdicts() {
    let config: LintConfig = ron::from_str(
        "(body_chars: (min: 100, max: 5000), image_markers: (min: 1, max: 5), separators: (min: 2, max: 6))",
    )
    .unwrap();
    assert_eq!(config.title_headers, 1);
    assert_eq!(config.endings.min_run, 3);

    let path = Path::new("tests/fixtures/episodes/EP-01_서클의_각성.md");
    let report = validate_file(path, &config).unwrap();
    assert_eq!(report.overall, Verdict::Pass);
}

#[test]
fn missing_draft_is_an_error() {
    let err = validate_file(Path::new("tests/fixtures/episodes/EP-99.md"), &LintConfig::default())
        .unwrap_err();
    assert!(matches!(err, LintError::MissingDraft(_)));
    assert!(err.to_string().starts_with("파일을 찾을 수 없음"));
}
