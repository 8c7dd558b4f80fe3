use serde::Serialize;

use crate::text_metrics;

const ELLIPSIS: char = '…';

/// Width oracle used by the fitter. Implementations must be deterministic
/// for a given `(text, font_px)`.
pub trait TextMeasure {
    fn text_width(&self, text: &str, font_px: f32) -> f32;
}

/// Measures with installed fonts, or with the calibrated width table when
/// `fast_metrics` is set or no font resolves.
#[derive(Debug, Clone, Copy)]
pub struct FontMeasure<'a> {
    pub family: &'a str,
    pub weight: u16,
    pub fast_metrics: bool,
}

impl TextMeasure for FontMeasure<'_> {
    fn text_width(&self, text: &str, font_px: f32) -> f32 {
        if self.fast_metrics {
            return fallback_text_width(text, font_px, self.weight);
        }
        text_metrics::measure_text_width(text, font_px, self.family, self.weight)
            .unwrap_or_else(|| fallback_text_width(text, font_px, self.weight))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextFit {
    pub font_px: u32,
    pub lines: Vec<String>,
}

pub(crate) fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '\'' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        '-' => 0.37,
        '–' => 0.55,
        '—' | '…' => 1.0,
        'A' => 0.652,
        'B' => 0.648,
        'C' => 0.734,
        'D' => 0.723,
        'E' => 0.594,
        'F' => 0.575,
        'G' | 'H' => 0.742,
        'I' => 0.272,
        'J' => 0.557,
        'K' => 0.648,
        'L' => 0.559,
        'M' => 0.903,
        'N' => 0.763,
        'O' => 0.754,
        'P' => 0.623,
        'Q' => 0.755,
        'R' => 0.637,
        'S' => 0.633,
        'T' => 0.599,
        'U' => 0.746,
        'V' => 0.661,
        'W' => 0.958,
        'X' => 0.655,
        'Y' => 0.646,
        'Z' => 0.621,
        'a' => 0.550,
        'b' => 0.603,
        'c' => 0.547,
        'd' => 0.609,
        'e' => 0.570,
        'f' => 0.340,
        'g' | 'h' => 0.600,
        'i' => 0.235,
        'j' => 0.227,
        'k' => 0.522,
        'l' => 0.239,
        'm' => 0.867,
        'n' => 0.585,
        'o' => 0.574,
        'p' => 0.595,
        'q' => 0.585,
        'r' => 0.364,
        's' => 0.523,
        't' => 0.305,
        'u' => 0.585,
        'v' => 0.545,
        'w' => 0.811,
        'x' => 0.538,
        'y' => 0.556,
        'z' => 0.550,
        '0' => 0.613,
        '1' => 0.396,
        '2' => 0.609,
        '3' => 0.597,
        '4' => 0.614,
        '5' => 0.586,
        '6' => 0.608,
        '7' => 0.559,
        '8' => 0.611,
        '9' => 0.595,
        '@' | '#' | '%' | '&' => 0.946,
        _ if ch.is_control() => 0.0,
        _ if !ch.is_ascii() && ch.len_utf16() > 1 => 1.2,
        _ => 0.568,
    }
}

pub(crate) fn fallback_text_width(text: &str, font_px: f32, weight: u16) -> f32 {
    let emboldening = if weight >= 600 { 1.06 } else { 1.0 };
    text.chars().map(char_width_factor).sum::<f32>() * font_px * emboldening
}

fn is_dash(ch: char) -> bool {
    matches!(ch, '-' | '–' | '—')
}

fn is_natural_break(ch: char) -> bool {
    ch.is_whitespace() || is_dash(ch) || ch == ',' || ch == '.'
}

/// A candidate two-line split. `left_end` and `right_start` are byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Break {
    left_end: usize,
    right_start: usize,
    /// Lower wins: comma, period, dash, whitespace.
    priority: u8,
}

impl Break {
    fn split<'t>(&self, text: &'t str) -> (&'t str, &'t str) {
        (
            text[..self.left_end].trim_end(),
            text[self.right_start..].trim_start(),
        )
    }
}

fn find_breaks(text: &str) -> Vec<Break> {
    let mut out = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let after = idx + ch.len_utf8();
        if ch == ',' || ch == '.' {
            out.push(Break {
                left_end: after,
                right_start: after,
                priority: if ch == ',' { 0 } else { 1 },
            });
        } else if ch.is_whitespace() {
            let mut end = after;
            while let Some(&(next_idx, next)) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                end = next_idx + next.len_utf8();
                chars.next();
            }
            out.push(Break {
                left_end: idx,
                right_start: end,
                priority: 3,
            });
        } else if is_dash(ch) {
            out.push(Break {
                left_end: after,
                right_start: after,
                priority: 2,
            });
        }
    }

    out
}

/// Longest prefix of `text` that fits in `max_width` once an ellipsis is
/// appended. Text that already fits is returned unchanged; if not even the
/// ellipsis fits, the result is empty.
pub fn ellipsize_to_width(measure: &impl TextMeasure, font_px: f32, text: &str, max_width: f32) -> String {
    if measure.text_width(text, font_px) <= max_width {
        return text.to_string();
    }
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(text.len()))
        .collect();
    let with_ellipsis = |chars: usize| format!("{}{ELLIPSIS}", text[..bounds[chars]].trim_end());

    let mut lo = 0usize;
    let mut hi = bounds.len() - 1;
    while lo < hi {
        let mid = (lo + hi) / 2;
        if measure.text_width(&with_ellipsis(mid), font_px) <= max_width {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }

    if lo == 0 {
        return String::new();
    }
    with_ellipsis(lo - 1)
}

/// Character-level wrap into at most `max_lines`; the final line carries the
/// remainder of the text and is ellipsized to fit.
fn soft_break_by_chars(
    measure: &impl TextMeasure,
    font_px: f32,
    text: &str,
    max_width: f32,
    max_lines: usize,
) -> Vec<String> {
    let max_lines = max_lines.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut line_start = 0usize;

    for (idx, ch) in text.char_indices() {
        if lines.len() + 1 == max_lines {
            break;
        }
        let mut candidate = current.clone();
        candidate.push(ch);
        if current.is_empty() || measure.text_width(&candidate, font_px) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push(ch);
            line_start = idx;
        }
    }
    lines.push(text[line_start..].to_string());

    lines
        .into_iter()
        .filter(|line| !line.is_empty())
        .map(|line| ellipsize_to_width(measure, font_px, &line, max_width))
        .collect()
}

fn best_two_line_split(
    measure: &impl TextMeasure,
    font_px: f32,
    text: &str,
    max_width: f32,
) -> Option<Vec<String>> {
    let mut best: Option<(&str, &str, f32, u8)> = None;

    for br in find_breaks(text) {
        let (left, right) = br.split(text);
        if left.is_empty() || right.is_empty() {
            continue;
        }
        let left_width = measure.text_width(left, font_px);
        if left_width > max_width {
            continue;
        }
        if measure.text_width(right, font_px) > max_width {
            continue;
        }
        let better = match best {
            None => true,
            Some((_, _, best_width, best_priority)) => {
                br.priority < best_priority || (br.priority == best_priority && left_width > best_width)
            }
        };
        if better {
            best = Some((left, right, left_width, br.priority));
        }
    }

    best.map(|(left, right, _, _)| vec![left.to_string(), right.to_string()])
}

/// Greedy best fit: shrink from `max_font_px` to `min_font_px` one pixel at a
/// time, taking the first size at which the text fits on one line or splits
/// cleanly into two. Below that, ellipsize or wrap by characters at the
/// minimum size. Every returned line fits `max_width` at `font_px`.
pub fn fit_text(
    measure: &impl TextMeasure,
    text: &str,
    max_width: f32,
    max_font_px: u32,
    min_font_px: u32,
) -> TextFit {
    let min_font_px = min_font_px.max(1);
    let max_font_px = max_font_px.max(min_font_px);
    let has_natural_break = text.chars().any(is_natural_break);

    for px in (min_font_px..=max_font_px).rev() {
        let font_px = px as f32;
        if measure.text_width(text, font_px) <= max_width {
            return TextFit {
                font_px: px,
                lines: vec![text.to_string()],
            };
        }
        if has_natural_break
            && let Some(lines) = best_two_line_split(measure, font_px, text, max_width)
        {
            return TextFit { font_px: px, lines };
        }
    }

    let font_px = min_font_px as f32;
    let lines = if has_natural_break {
        best_two_line_split(measure, font_px, text, max_width)
            .unwrap_or_else(|| soft_break_by_chars(measure, font_px, text, max_width, 2))
    } else {
        vec![ellipsize_to_width(measure, font_px, text, max_width)]
    };
    TextFit {
        font_px: min_font_px,
        lines,
    }
}

pub const TITLE_MAX_FONT_PX: u32 = 86;
pub const TITLE_MIN_FONT_PX: u32 = 44;
pub const TAGLINE_MAX_FONT_PX: u32 = 30;
pub const TAGLINE_MIN_FONT_PX: u32 = 20;

pub fn fit_title(measure: &impl TextMeasure, text: &str, max_width: f32, font_range: (u32, u32)) -> TextFit {
    fit_text(measure, text, max_width, font_range.0, font_range.1)
}

/// Like [`fit_title`], then re-ellipsizes any line still wider than `max_width`.
pub fn fit_tagline(measure: &impl TextMeasure, text: &str, max_width: f32, font_range: (u32, u32)) -> TextFit {
    let fitted = fit_text(measure, text, max_width, font_range.0, font_range.1);
    let font_px = fitted.font_px as f32;
    let mut lines: Vec<String> = fitted
        .lines
        .into_iter()
        .take(2)
        .map(|line| ellipsize_to_width(measure, font_px, &line, max_width))
        .collect();
    if lines.is_empty() {
        lines.push(String::new());
    }
    TextFit {
        font_px: fitted.font_px,
        lines,
    }
}
