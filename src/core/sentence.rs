/// Sentence segmentation, ending classification and past-tense run detection.
///
/// Narrative prose in this format should not stack past-tense `~ㅆ다`
/// endings. Sentences are split out of the body, dialogue and fragments are
/// dropped, each remaining sentence is classified by its final syllables, and
/// runs of consecutive past endings are reported.
use serde::{Deserialize, Serialize};

use crate::core::sections::tail_chars;
use crate::schema::report::{EndingClass, ViolationGroup};

/// First precomposed Hangul syllable (`가`).
pub const HANGUL_SYLLABLE_BASE: u32 = 0xAC00;
/// Number of precomposed Hangul syllables (`가`..=`힣`).
pub const HANGUL_SYLLABLE_COUNT: u32 = 11172;
/// Number of final-consonant slots per syllable, including "none".
const FINAL_CONSONANT_SLOTS: u32 = 28;
/// Final-consonant index of `ㅆ`.
const FINAL_SSANG_SIOT: u32 = 20;

/// Declarative ending syllable.
const DA: char = '다';
/// `ㅆ`-final syllables that do not mark past narration: existence and the
/// future/conjectural modal.
const NON_PAST_SYLLABLES: [char; 2] = ['있', '겠'];
/// Past marker that, attached to the existence verb, still describes state.
///
/// This is a three-syllable exception on top of the two above: `그가
/// 있었다.` reads as OTHER_DA, where a two-syllable rule would say PAST.
/// Past progressives such as `앉아 있었다` are exempted along with it.
const EXISTENCE_PAST: (char, char) = ('있', '었');

/// Characters that open a line of dialogue.
const DIALOGUE_OPENERS: [char; 3] = ['"', '\u{201C}', '\u{300C}'];
/// Quote that marks inner speech when it wraps the whole sentence.
const THOUGHT_QUOTE: char = '\'';

const SENTENCE_TERMINALS: [char; 3] = ['.', '!', '?'];

/// Thresholds for the ending-run check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndingPolicy {
    /// Shortest run of past endings that counts as a violation.
    pub min_run: usize,
    /// Units shorter than this many characters are fragments, not sentences.
    pub min_sentence_chars: usize,
    /// Characters kept from the end of each sample sentence.
    pub sample_chars: usize,
    /// Samples recorded per violation group.
    pub max_samples: usize,
}

impl Default for EndingPolicy {
    fn default() -> Self {
        Self {
            min_run: 3,
            min_sentence_chars: 10,
            sample_chars: 30,
            max_samples: 3,
        }
    }
}

/// A narrative sentence and its ending class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence<'a> {
    pub text: &'a str,
    pub class: EndingClass,
}

/// Classified sentences of a body and the runs flagged among them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndingAnalysis<'a> {
    pub sentences: Vec<Sentence<'a>>,
    pub violations: Vec<ViolationGroup>,
}

/// Final-consonant index (0..28) of a precomposed Hangul syllable.
pub fn final_consonant_index(c: char) -> Option<u32> {
    let offset = (c as u32).checked_sub(HANGUL_SYLLABLE_BASE)?;
    if offset < HANGUL_SYLLABLE_COUNT {
        Some(offset % FINAL_CONSONANT_SLOTS)
    } else {
        None
    }
}

/// Whether `c` is a Hangul syllable ending in `ㅆ`.
pub fn has_ssang_siot_final(c: char) -> bool {
    final_consonant_index(c) == Some(FINAL_SSANG_SIOT)
}

/// Classify the grammatical ending of one sentence.
///
/// Decided by the final two syllables, except that `있었다` is treated as
/// a state and not as past narration.
pub fn classify_ending(sentence: &str) -> EndingClass {
    let clean = sentence.trim_end_matches(|c: char| SENTENCE_TERMINALS.contains(&c) || c == ' ' || c == '\t');
    let chars: Vec<char> = clean.chars().collect();
    let len = chars.len();
    if len < 2 || chars[len - 1] != DA {
        return EndingClass::NonDa;
    }

    let stem = chars[len - 2];
    if !has_ssang_siot_final(stem) {
        return EndingClass::OtherDa;
    }
    if NON_PAST_SYLLABLES.contains(&stem) {
        return EndingClass::OtherDa;
    }
    if len >= 3 && (chars[len - 3], stem) == EXISTENCE_PAST {
        return EndingClass::OtherDa;
    }
    EndingClass::Past
}

/// Split a line at whitespace that follows `.`, `!` or `?`.
fn split_line(line: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = line.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let at_boundary = prev.is_some_and(|p| SENTENCE_TERMINALS.contains(&p));
        if c.is_whitespace() && at_boundary {
            units.push(&line[start..idx]);
            start = line.len();
            while let Some(&(next_idx, next)) = chars.peek() {
                if !next.is_whitespace() {
                    start = next_idx;
                    break;
                }
                chars.next();
            }
            prev = None;
            continue;
        }
        prev = Some(c);
    }
    if start < line.len() {
        units.push(&line[start..]);
    }

    units
        .into_iter()
        .map(str::trim)
        .filter(|unit| !unit.is_empty())
        .collect()
}

/// Segment prose into trimmed sentence-like units, skipping blank lines.
pub fn split_sentences(body: &str) -> Vec<&str> {
    body.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .flat_map(split_line)
        .collect()
}

/// Whether a unit is narration subject to the ending rules.
///
/// Fragments and dialogue are exempt.
pub fn is_narrative(unit: &str, min_chars: usize) -> bool {
    if unit.chars().count() < min_chars {
        return false;
    }
    match unit.chars().next() {
        Some(first) if DIALOGUE_OPENERS.contains(&first) => false,
        _ => !(unit.starts_with(THOUGHT_QUOTE) && unit.ends_with(THOUGHT_QUOTE)),
    }
}

/// A maximal stretch of consecutive past endings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PastRun {
    pub start: usize,
    pub length: usize,
}

#[derive(Debug, Clone, Copy)]
enum RunState {
    Idle,
    Accumulating { start: usize, length: usize },
}

/// Collect every maximal run of `Past` of at least `min_run` entries,
/// including a run that reaches the end of the sequence.
pub fn past_runs(classes: &[EndingClass], min_run: usize) -> Vec<PastRun> {
    let mut runs = Vec::new();
    let mut state = RunState::Idle;

    for (idx, class) in classes.iter().enumerate() {
        let is_past = *class == EndingClass::Past;
        state = match state {
            RunState::Idle if is_past => RunState::Accumulating {
                start: idx,
                length: 1,
            },
            RunState::Idle => RunState::Idle,
            RunState::Accumulating { start, length } if is_past => RunState::Accumulating {
                start,
                length: length + 1,
            },
            RunState::Accumulating { start, length } => {
                if length >= min_run {
                    runs.push(PastRun { start, length });
                }
                RunState::Idle
            }
        };
    }

    if let RunState::Accumulating { start, length } = state {
        if length >= min_run {
            runs.push(PastRun { start, length });
        }
    }

    runs
}

/// Classify every narrative sentence of `body` and flag past-ending runs.
pub fn analyze_endings<'a>(body: &'a str, policy: &EndingPolicy) -> EndingAnalysis<'a> {
    let sentences: Vec<Sentence<'a>> = split_sentences(body)
        .into_iter()
        .filter(|unit| is_narrative(unit, policy.min_sentence_chars))
        .map(|text| Sentence {
            text,
            class: classify_ending(text),
        })
        .collect();

    let classes: Vec<EndingClass> = sentences.iter().map(|s| s.class).collect();
    let violations = past_runs(&classes, policy.min_run)
        .into_iter()
        .map(|run| ViolationGroup {
            start: run.start,
            length: run.length,
            samples: sentences[run.start..run.start + run.length.min(policy.max_samples)]
                .iter()
                .map(|s| tail_chars(s.text, policy.sample_chars).to_string())
                .collect(),
        })
        .collect();

    EndingAnalysis {
        sentences,
        violations,
    }
}
