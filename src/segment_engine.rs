use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use crate::errors::EngineError;

// @module: Run projection and replacement engine

// @struct: One text-bearing run projected into the paragraph's logical string
#[derive(Debug, Clone)]
pub struct Segment {
    // @field: Current textual content
    pub text: String,

    // @field: Character length of the text at construction time
    pub original_len: usize,

    // @field: Logical byte offset of the first character within the paragraph
    pub start: usize,
}

impl Segment {
    /// Creates a new segment wrapping one run's current text value
    pub fn new(text: String) -> Self {
        let original_len = text.chars().count();
        Segment {
            text,
            original_len,
            start: 0,
        }
    }

    /// Exclusive logical end offset of this segment
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}..{}] {:?}", self.start, self.end(), self.text)
    }
}

// @struct: A single (original, replacement) substitution pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRule {
    // @field: Exact logical substring to find (never empty)
    pub original: String,

    // @field: Text to insert in its place
    pub replacement: String,
}

impl SubstitutionRule {
    /// Creates a new rule - used by tests and external consumers
    #[allow(dead_code)]
    pub fn new(original: impl Into<String>, replacement: impl Into<String>) -> Self {
        SubstitutionRule {
            original: original.into(),
            replacement: replacement.into(),
        }
    }

    // @creates: Validated rule
    // @validates: Non-empty original
    pub fn new_validated(original: String, replacement: String) -> Result<Self> {
        if original.is_empty() {
            return Err(anyhow!("Substitution rule with empty original text"));
        }
        Ok(SubstitutionRule {
            original,
            replacement,
        })
    }

    /// Build the applied rule list from raw pairs: rules with an empty
    /// original are dropped, the rest are put into application order
    /// (longest original first, ties broken ordinal-ascending).
    pub fn compile<I>(pairs: I) -> Vec<SubstitutionRule>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut rules: Vec<SubstitutionRule> = pairs
            .into_iter()
            .filter(|(original, _)| !original.is_empty())
            .map(|(original, replacement)| SubstitutionRule {
                original,
                replacement,
            })
            .collect();
        rules.sort_by(|a, b| export_ordering(&a.original, &b.original));
        rules
    }
}

/// The ordering shared by exported lines and compiled rules: descending by
/// byte length, ties broken by ordinal comparison ascending. Applying rules
/// in this order guarantees a longer phrase is matched before any shorter
/// phrase that is one of its substrings.
pub fn export_ordering(a: &str, b: &str) -> Ordering {
    b.len().cmp(&a.len()).then_with(|| a.cmp(b))
}

/// How rewritten text is written back across the original run boundaries
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RedistributionPolicy {
    // @policy: Keep untouched prefix/suffix characters in their original runs
    #[default]
    #[serde(rename = "splice")]
    Splice,
    // @policy: Spread the rewritten string across runs by their original lengths
    Proportional,
}

impl RedistributionPolicy {
    // @returns: Lowercase policy identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Splice => "splice".to_string(),
            Self::Proportional => "proportional".to_string(),
        }
    }
}

impl fmt::Display for RedistributionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for RedistributionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "splice" => Ok(Self::Splice),
            "proportional" => Ok(Self::Proportional),
            _ => Err(anyhow!("Invalid redistribution policy: {}", s)),
        }
    }
}

/// Build the ordered segment list for one paragraph from its run texts
pub fn build_segments<I>(texts: I) -> Vec<Segment>
where
    I: IntoIterator<Item = String>,
{
    let mut segments: Vec<Segment> = texts.into_iter().map(Segment::new).collect();
    recalculate_starts(&mut segments);
    segments
}

/// Recompute every segment's logical start offset from the current texts
pub fn recalculate_starts(segments: &mut [Segment]) {
    let mut offset = 0;
    for segment in segments {
        segment.start = offset;
        offset += segment.text.len();
    }
}

/// Concatenation of all segment texts: the paragraph's logical string
pub fn logical_string(segments: &[Segment]) -> String {
    if segments.len() == 1 {
        return segments[0].text.clone();
    }

    let mut combined = String::with_capacity(segments.iter().map(|s| s.text.len()).sum());
    for segment in segments {
        combined.push_str(&segment.text);
    }
    combined
}

/// Find the segment containing the given logical byte position.
/// Exhausted (empty) segments never contain a position; a position at a
/// boundary belongs to the following segment.
fn segment_index_at(segments: &[Segment], position: usize) -> Option<usize> {
    for (index, segment) in segments.iter().enumerate() {
        if position < segment.end() {
            return Some(index);
        }
    }
    None
}

/// Apply the ordered rule list to one paragraph's segments under the given
/// policy. On success the concatenation of segment texts equals the fully
/// rewritten logical string; on a segment-lookup failure the segments are in
/// a partially rewritten state and the caller must discard them instead of
/// writing them back.
pub fn apply_rules(
    segments: &mut [Segment],
    rules: &[SubstitutionRule],
    policy: RedistributionPolicy,
) -> std::result::Result<(), EngineError> {
    if segments.is_empty() || rules.is_empty() {
        return Ok(());
    }

    match policy {
        RedistributionPolicy::Splice => {
            for rule in rules {
                apply_rule_splicing(segments, rule)?;
            }
        }
        RedistributionPolicy::Proportional => {
            recalculate_starts(segments);
            let rewritten = rewrite_logical(&logical_string(segments), rules);
            redistribute_proportional(segments, &rewritten);
        }
    }

    recalculate_starts(segments);
    Ok(())
}

/// Apply one rule exhaustively: find the leftmost occurrence at or after the
/// scan cursor, splice the replacement in, resume scanning after the inserted
/// text. Resuming past the insertion is what keeps a rule whose replacement
/// contains its own original from looping; later rules still see the full
/// updated string.
fn apply_rule_splicing(
    segments: &mut [Segment],
    rule: &SubstitutionRule,
) -> std::result::Result<(), EngineError> {
    let mut search_from = 0;

    loop {
        recalculate_starts(segments);
        let combined = logical_string(segments);

        let Some(found) = combined[search_from..].find(&rule.original) else {
            break;
        };

        let match_start = search_from + found;
        splice_replacement(segments, match_start, rule.original.len(), &rule.replacement)?;
        search_from = match_start + rule.replacement.len();
    }

    Ok(())
}

/// Write one replacement into the segments covering the logical byte range
/// `[match_start, match_start + match_len)`. Untouched prefix/suffix
/// characters stay in their owning segments; fully consumed segments are
/// emptied.
fn splice_replacement(
    segments: &mut [Segment],
    match_start: usize,
    match_len: usize,
    replacement: &str,
) -> std::result::Result<(), EngineError> {
    recalculate_starts(segments);
    let match_end = match_start + match_len;

    let start_index = segment_index_at(segments, match_start)
        .ok_or(EngineError::SegmentLookup { position: match_start })?;
    let end_index = segment_index_at(segments, match_end - 1)
        .ok_or(EngineError::SegmentLookup { position: match_end - 1 })?;

    let start_offset = match_start - segments[start_index].start;
    let end_offset = match_end - segments[end_index].start;

    let prefix = segments[start_index].text[..start_offset].to_string();
    let suffix = segments[end_index].text[end_offset..].to_string();

    segments[start_index].text = format!("{prefix}{replacement}{suffix}");

    for segment in &mut segments[start_index + 1..=end_index] {
        segment.text.clear();
    }

    Ok(())
}

/// Compute the fully rewritten logical string for a paragraph by applying
/// every rule, in order, with the same cursor semantics as the splicing path.
pub fn rewrite_logical(text: &str, rules: &[SubstitutionRule]) -> String {
    let mut current = text.to_string();

    for rule in rules {
        let mut search_from = 0;
        while let Some(found) = current[search_from..].find(&rule.original) {
            let match_start = search_from + found;
            current.replace_range(match_start..match_start + rule.original.len(), &rule.replacement);
            search_from = match_start + rule.replacement.len();
        }
    }

    current
}

/// Spread the rewritten logical string back across the segments: each
/// non-final segment receives up to its original character count, the final
/// segment receives everything left over.
fn redistribute_proportional(segments: &mut [Segment], rewritten: &str) {
    let Some(last_index) = segments.len().checked_sub(1) else {
        return;
    };

    let mut rest = rewritten;
    for (index, segment) in segments.iter_mut().enumerate() {
        if index == last_index {
            segment.text = rest.to_string();
            break;
        }

        let take = char_prefix_len(rest, segment.original_len);
        segment.text = rest[..take].to_string();
        rest = &rest[take..];
    }

    recalculate_starts(segments);
}

/// Byte length of the prefix holding up to `max_chars` characters
fn char_prefix_len(s: &str, max_chars: usize) -> usize {
    s.char_indices()
        .nth(max_chars)
        .map(|(index, _)| index)
        .unwrap_or(s.len())
}

/// Split a projected paragraph into trimmed, non-empty logical lines
pub fn split_logical_lines(paragraph_text: &str) -> impl Iterator<Item = &str> {
    paragraph_text
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
}

/// True when a fragment carries nothing worth translating: only ASCII
/// letters, digits, punctuation and whitespace
pub fn is_ascii_only(fragment: &str) -> bool {
    fragment.chars().all(|c| {
        c.is_ascii_alphanumeric() || c.is_ascii_punctuation() || c.is_ascii_whitespace()
    })
}

/// Collects normalized logical lines for export, preserving document order
pub struct LineCollector {
    // @field: Drop exact duplicates, keeping the first occurrence
    dedup: bool,

    // @field: Lines already seen (only consulted when dedup is on)
    seen: HashSet<String>,

    // @field: Collected lines in document order
    lines: Vec<String>,

    // @field: Optional predicate excluding fragments from the export
    skip: Option<Box<dyn Fn(&str) -> bool>>,
}

impl LineCollector {
    /// Create a collector; `dedup` controls duplicate suppression
    pub fn new(dedup: bool) -> Self {
        LineCollector {
            dedup,
            seen: HashSet::new(),
            lines: Vec::new(),
            skip: None,
        }
    }

    /// Create a collector with a pluggable skip predicate; fragments for
    /// which the predicate returns true are excluded from the export
    pub fn with_skip_predicate<F>(dedup: bool, skip: F) -> Self
    where
        F: Fn(&str) -> bool + 'static,
    {
        LineCollector {
            dedup,
            seen: HashSet::new(),
            lines: Vec::new(),
            skip: Some(Box::new(skip)),
        }
    }

    /// Normalize one projected paragraph and collect its lines
    pub fn push_paragraph(&mut self, paragraph_text: &str) {
        if paragraph_text.trim().is_empty() {
            return;
        }

        let fragments: Vec<&str> = split_logical_lines(paragraph_text).collect();
        for fragment in fragments {
            self.push_line(fragment);
        }
    }

    /// Collect a single already-split fragment
    pub fn push_line(&mut self, fragment: &str) {
        let trimmed = fragment.trim();
        if trimmed.is_empty() {
            return;
        }

        if let Some(skip) = &self.skip {
            if skip(trimmed) {
                return;
            }
        }

        if self.dedup && !self.seen.insert(trimmed.to_string()) {
            return;
        }

        self.lines.push(trimmed.to_string());
    }

    /// Number of collected lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when nothing has been collected
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Finish collection; when `sorted` is requested, entries are reordered
    /// longest-first (ties ordinal-ascending), which is also the order the
    /// match engine applies them in when the export is round-tripped
    pub fn finish(mut self, sorted: bool) -> Vec<String> {
        if sorted {
            self.lines.sort_by(|a, b| export_ordering(a, b));
        }
        self.lines
    }
}

impl fmt::Debug for LineCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineCollector")
            .field("dedup", &self.dedup)
            .field("lines", &self.lines.len())
            .field("filtered", &self.skip.is_some())
            .finish()
    }
}
