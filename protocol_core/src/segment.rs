//! Day segmentation and exercise line extraction for raw protocol text.
//!
//! The generator output has no enforced grammar. It usually looks like:
//!
//! ```text
//! ### DIA 1: Peito e Tríceps | CATEGORIA: SUPERIORES
//! - Supino Reto: 4x10 - controle a descida
//! - Tríceps Corda: 3x12
//! ### DIA 2: ...
//! ### RESUMO NUTRICIONAL
//! ```
//!
//! but every piece of that structure may be missing. Nothing in this module
//! returns an error: a day without a marker is a rest day.

use crate::{DayCategory, DayHeader, ExerciseDescriptor};

/// Parser seam between raw protocol text and the rest of the engine.
pub trait ContentParser {
    /// Substring of `content` belonging to 1-based `day_number`. Empty if absent.
    fn day_segment<'a>(&self, content: &'a str, day_number: usize) -> &'a str;

    /// Ordered exercise descriptors found in a day segment.
    fn exercise_lines(&self, segment: &str) -> Vec<ExerciseDescriptor>;

    /// Title and category from the segment's marker line.
    fn day_header(&self, segment: &str) -> DayHeader;

    /// Descriptors for a 0-based day index.
    fn exercises_for_day(&self, content: &str, day: usize) -> Vec<ExerciseDescriptor> {
        self.exercise_lines(self.day_segment(content, day + 1))
    }
}

/// Parser for the `### DAY <n>` / `- <name>: <note>` convention.
///
/// Both `day` and `dia` are accepted as marker tokens, case-insensitively.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkerParser;

impl ContentParser for MarkerParser {
    fn day_segment<'a>(&self, content: &'a str, day_number: usize) -> &'a str {
        let markers = find_markers(content);

        let Some(start) = pick(&markers, |m| m.number == day_number) else {
            tracing::debug!("No marker for day {}, treating as rest day", day_number);
            return "";
        };

        let after: Vec<DayMarker> = markers
            .iter()
            .copied()
            .filter(|m| m.start > start.start)
            .collect();

        // Prefer the next day's marker; tolerate gaps by falling back to any later day.
        let end = pick(&after, |m| m.number == day_number + 1)
            .or_else(|| pick(&after, |m| m.number > day_number))
            .map(|m| m.start)
            .unwrap_or(content.len());

        &content[start.start..end]
    }

    fn exercise_lines(&self, segment: &str) -> Vec<ExerciseDescriptor> {
        let mut descriptors = Vec::new();

        for line in segment.lines() {
            if is_trailer_heading(line) {
                break;
            }

            if let Some(body) = strip_bullet(line) {
                descriptors.push(parse_descriptor(body));
            }
        }

        descriptors
    }

    fn day_header(&self, segment: &str) -> DayHeader {
        let first_line = segment.lines().next().unwrap_or("");
        let Some((_, end)) = marker_at(first_line.as_bytes(), 0) else {
            return DayHeader::default();
        };

        let mut parts = first_line[end..].split('|');
        let title = parts
            .next()
            .map(|t| {
                t.trim_start_matches(|c: char| c == ':' || c == '-' || c.is_whitespace())
                    .trim_matches(|c: char| c == '*' || c.is_whitespace())
            })
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let category = parts.find_map(|part| {
            let part = part.trim().trim_matches('*').trim();
            let rest = strip_prefix_ignore_case(part, "CATEGORIA")
                .or_else(|| strip_prefix_ignore_case(part, "CATEGORY"))?;
            parse_category(rest.trim_start_matches(':').trim())
        });

        DayHeader { title, category }
    }
}

#[derive(Clone, Copy, Debug)]
struct DayMarker {
    start: usize,
    number: usize,
    at_line_start: bool,
}

/// First marker matching `pred`, preferring ones that open a line.
fn pick(markers: &[DayMarker], pred: impl Fn(&DayMarker) -> bool) -> Option<DayMarker> {
    markers
        .iter()
        .find(|m| m.at_line_start && pred(*m))
        .or_else(|| markers.iter().find(|m| pred(*m)))
        .copied()
}

fn find_markers(content: &str) -> Vec<DayMarker> {
    let bytes = content.as_bytes();
    let mut markers = Vec::new();
    let mut line_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\n' {
            line_start = i + 1;
            i += 1;
            continue;
        }

        let boundary = i == 0 || !is_word_byte(bytes[i - 1]);
        if boundary {
            if let Some((number, end)) = marker_at(bytes, i) {
                let at_line_start = bytes[line_start..i]
                    .iter()
                    .all(|b| matches!(b, b'#' | b'*' | b'_' | b' ' | b'\t'));
                markers.push(DayMarker {
                    start: i,
                    number,
                    at_line_start,
                });
                i = end;
                continue;
            }
        }

        i += 1;
    }

    markers
}

/// Matches `day`/`dia`, optional spaces, then a complete number at `i`.
/// Returns the number and the byte offset just past it.
fn marker_at(bytes: &[u8], i: usize) -> Option<(usize, usize)> {
    let token = bytes.get(i..i + 3)?;
    if !(token.eq_ignore_ascii_case(b"day") || token.eq_ignore_ascii_case(b"dia")) {
        return None;
    }

    let mut j = i + 3;
    while j < bytes.len() && (bytes[j] == b' ' || bytes[j] == b'\t') {
        j += 1;
    }

    let digits_start = j;
    while j < bytes.len() && bytes[j].is_ascii_digit() {
        j += 1;
    }
    if j == digits_start {
        return None;
    }

    let number = std::str::from_utf8(&bytes[digits_start..j])
        .ok()?
        .parse()
        .ok()?;
    Some((number, j))
}

// Non-ASCII bytes count as word characters so "Mídia 2" is not a marker.
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

/// Closing sections the generator appends after the last day.
const TRAILER_TITLES: &[&str] = &[
    "RESUMO NUTRICIONAL",
    "DICAS NUTRICIONAIS",
    "DICAS DE ALIMENTAÇÃO",
    "MENTALIDADE TITAN",
    "NUTRITION SUMMARY",
];

/// `#`..`###` heading naming a closing section, e.g. `### RESUMO NUTRICIONAL`.
///
/// Other headings are in-day subsections (`### Aquecimento`) and do not stop
/// extraction.
fn is_trailer_heading(line: &str) -> bool {
    let trimmed = line.trim_start();
    let level = trimmed.bytes().take_while(|b| *b == b'#').count();
    if level == 0 || level > 3 {
        return false;
    }

    let title = trimmed[level..]
        .trim_matches(|c: char| c == '*' || c == ':' || c.is_whitespace())
        .to_uppercase();
    TRAILER_TITLES.iter().any(|t| title.starts_with(t))
}

fn strip_bullet(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if !(trimmed.starts_with('-') || trimmed.starts_with('*')) {
        return None;
    }

    // Horizontal rules and bold emphasis look like bullets but aren't.
    if trimmed
        .chars()
        .all(|c| matches!(c, '-' | '*' | '_') || c.is_whitespace())
    {
        return None;
    }
    if trimmed.starts_with("**") {
        return None;
    }

    let body = trimmed[1..].trim();
    (!body.is_empty()).then_some(body)
}

fn parse_descriptor(body: &str) -> ExerciseDescriptor {
    let (name, note) = match body.split_once(':') {
        Some((name, note)) => {
            let note = note.trim();
            (name, (!note.is_empty()).then(|| note.to_string()))
        }
        None => (body, None),
    };

    ExerciseDescriptor {
        raw_line: body.to_string(),
        name: name
            .trim()
            .trim_matches(|c: char| c == '*' || c.is_whitespace())
            .to_string(),
        note,
    }
}

fn parse_category(tag: &str) -> Option<DayCategory> {
    if tag.is_empty() {
        return None;
    }

    let upper = tag.to_uppercase();
    let category = if upper.contains("SUPERIOR") || upper.contains("UPPER") {
        DayCategory::Upper
    } else if upper.contains("INFERIOR") || upper.contains("LOWER") {
        DayCategory::Lower
    } else if upper.contains("FULL") {
        DayCategory::FullBody
    } else {
        DayCategory::Other(tag.to_string())
    };

    Some(category)
}
