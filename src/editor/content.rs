use std::collections::BTreeMap;

use crate::config::EditorConfig;
use crate::model::{Run, WsId};
use crate::reference::{Marker, is_marker_run, marker_of};

pub fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    for (count, (byte_idx, _)) in text.char_indices().enumerate() {
        if count == char_idx {
            return byte_idx;
        }
    }
    text.len()
}

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

pub(crate) fn runs_char_len(runs: &[Run]) -> usize {
    runs.iter().map(Run::char_len).sum()
}

pub(crate) fn runs_text(runs: &[Run]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}

fn split_text(text: &str, offset: usize) -> (String, String) {
    let byte_idx = char_to_byte_idx(text, offset);
    let left = text[..byte_idx].to_string();
    let right = text[byte_idx..].to_string();
    (left, right)
}

/// Splits `runs` at a character offset and returns the tail. A run
/// straddling the offset is divided; both halves keep its style and
/// writing system.
pub(crate) fn split_runs(runs: &mut Vec<Run>, offset: usize) -> Vec<Run> {
    let mut consumed = 0;
    for idx in 0..runs.len() {
        let len = runs[idx].char_len();
        if offset <= consumed {
            return runs.split_off(idx);
        }
        if offset < consumed + len {
            let mut trailing = runs.split_off(idx + 1);
            let run = &mut runs[idx];
            let (left, right) = split_text(&run.text, offset - consumed);
            let mut tail = run.clone();
            run.text = left;
            tail.text = right;
            trailing.insert(0, tail);
            return trailing;
        }
        consumed += len;
    }
    Vec::new()
}

/// Removes the characters in `from..to`.
pub(crate) fn delete_chars(runs: &mut Vec<Run>, from: usize, to: usize) {
    if from >= to {
        return;
    }
    let mut tail = split_runs(runs, to);
    split_runs(runs, from);
    runs.append(&mut tail);
}

/// Drops empty runs and merges neighbours that share style and writing
/// system. Chapter and verse numbers never merge. At least one run is kept.
pub(crate) fn prune_and_merge_runs(runs: &mut Vec<Run>, config: &EditorConfig) {
    let fallback_ws = runs.first().map(|run| run.ws).unwrap_or(config.vernacular_ws);
    runs.retain(|run| !run.text.is_empty());

    let mut i = 0;
    while i + 1 < runs.len() {
        if can_merge_runs(&runs[i], &runs[i + 1], config) {
            let right = runs.remove(i + 1);
            runs[i].text.push_str(&right.text);
        } else {
            i += 1;
        }
    }

    if runs.is_empty() {
        runs.push(Run::new_text("").with_ws(fallback_ws));
    }
}

fn can_merge_runs(left: &Run, right: &Run, config: &EditorConfig) -> bool {
    left.style == right.style
        && left.ws == right.ws
        && !is_marker_run(left, config)
        && !is_marker_run(right, config)
}

/// Character extents of the marker runs, as `(start, end, marker)`.
pub(crate) fn marker_extents(runs: &[Run], config: &EditorConfig) -> Vec<(usize, usize, Option<Marker>)> {
    let mut extents = Vec::new();
    let mut pos = 0;
    for run in runs {
        let len = run.char_len();
        if is_marker_run(run, config) && len > 0 {
            extents.push((pos, pos + len, marker_of(run, config)));
        }
        pos += len;
    }
    extents
}

pub(crate) fn has_markers(runs: &[Run], config: &EditorConfig) -> bool {
    runs.iter().any(|run| is_marker_run(run, config) && !run.is_empty())
}

/// Number of leading runs made of markers (and empty runs between them).
/// Trailing empty runs after the last leading marker are not counted.
pub(crate) fn leading_marker_runs(runs: &[Run], config: &EditorConfig) -> usize {
    let mut count = 0;
    for (idx, run) in runs.iter().enumerate() {
        if is_marker_run(run, config) {
            count = idx + 1;
        } else if !run.is_empty() {
            break;
        }
    }
    count
}

/// True when a marker follows ordinary text, i.e. the paragraph holds
/// markers that cannot be detached from its start.
pub(crate) fn has_interior_markers(runs: &[Run], config: &EditorConfig) -> bool {
    let leading = leading_marker_runs(runs, config);
    has_markers(&runs[leading..], config)
}

pub(crate) fn first_marker(runs: &[Run], config: &EditorConfig) -> Option<Marker> {
    runs.iter().find_map(|run| marker_of(run, config))
}

/// Concatenates two back translation maps. Where both sides carry a back
/// translation for the same writing system, the separator goes between them.
pub(crate) fn merge_back_translations(
    first: &mut BTreeMap<WsId, Vec<Run>>,
    second: BTreeMap<WsId, Vec<Run>>,
    config: &EditorConfig,
) {
    for (ws, mut runs) in second {
        match first.get_mut(&ws) {
            Some(existing) if !runs_text(existing).is_empty() && !runs_text(&runs).is_empty() => {
                existing.push(Run::new_text(config.back_translation_separator.clone()).with_ws(ws));
                existing.append(&mut runs);
                prune_and_merge_runs(existing, config);
            }
            Some(existing) if runs_text(existing).is_empty() => {
                *existing = runs;
            }
            Some(_) => {}
            None => {
                first.insert(ws, runs);
            }
        }
    }
}

/// Splits back translations to follow a vernacular split. Each back
/// translation is cut where it repeats the first marker of the vernacular
/// tail; without such a marker it stays whole with the first half.
pub(crate) fn split_back_translations(
    back_translations: &mut BTreeMap<WsId, Vec<Run>>,
    tail_marker: Option<Marker>,
    config: &EditorConfig,
) -> BTreeMap<WsId, Vec<Run>> {
    let mut tails = BTreeMap::new();
    let Some(marker) = tail_marker else {
        return tails;
    };
    for (ws, runs) in back_translations.iter_mut() {
        let Some(cut) = runs
            .iter()
            .position(|run| marker_of(run, config) == Some(marker))
        else {
            continue;
        };
        let tail = runs.split_off(cut);
        if runs.is_empty() {
            runs.push(Run::new_text("").with_ws(*ws));
        }
        tails.insert(*ws, tail);
    }
    tails
}
