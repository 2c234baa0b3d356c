//! Splits a model response into ordered text and fenced-code segments.
//!
//! The scanner has two states. Outside a fence it looks for an opener: three
//! backticks, an optional language tag of `[A-Za-z0-9_]`, then a newline (`\r\n`
//! accepted). Backticks that do not form an opener are skipped one byte at a
//! time. Inside a fence it looks for the next three backticks, which close the
//! block. An opener with no closing fence is not a block: it and everything after
//! it stay in the trailing text segment.

const FENCE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Text,
    Code,
}

/// A contiguous run of a response. `index` is strictly increasing in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub kind: SegmentKind,
    pub content: String,
    /// Language tag from the opening fence, code segments only.
    pub language: Option<String>,
}

impl Segment {
    pub fn is_code(&self) -> bool {
        self.kind == SegmentKind::Code
    }
}

#[derive(Clone, Copy)]
enum ScanState<'a> {
    Outside,
    Inside {
        opener: usize,
        body_start: usize,
        language: Option<&'a str>,
    },
}

/// Segment `text`. Text segments are trimmed and dropped when blank; code segments keep
/// their interior minus trailing whitespace. If nothing is produced the result is a single
/// text segment holding the trimmed input.
pub fn segment(text: &str) -> Vec<Segment> {
    let mut out = SegmentList::default();
    // Start of text not yet emitted.
    let mut pending = 0;
    let mut cursor = 0;
    let mut state = ScanState::Outside;

    loop {
        match state {
            ScanState::Outside => {
                let Some(rel) = text[cursor..].find(FENCE) else {
                    break;
                };
                let fence = cursor + rel;
                match parse_opener(text, fence) {
                    Some((language, body_start)) => {
                        state = ScanState::Inside {
                            opener: fence,
                            body_start,
                            language,
                        };
                    }
                    None => cursor = fence + 1,
                }
            }
            ScanState::Inside {
                opener,
                body_start,
                language,
            } => {
                let Some(rel) = text[body_start..].find(FENCE) else {
                    // Unterminated: leave the opener in the trailing text.
                    break;
                };
                let close = body_start + rel;
                out.push_text(&text[pending..opener]);
                out.push_code(&text[body_start..close], language);
                pending = close + FENCE.len();
                cursor = pending;
                state = ScanState::Outside;
            }
        }
    }
    out.push_text(&text[pending..]);

    if out.items.is_empty() {
        out.items.push(Segment {
            index: 0,
            kind: SegmentKind::Text,
            content: text.trim().to_string(),
            language: None,
        });
    }
    out.items
}

/// If the backticks at `fence` open a block, returns the language tag and where the body starts.
fn parse_opener(text: &str, fence: usize) -> Option<(Option<&str>, usize)> {
    let bytes = text.as_bytes();
    let tag_start = fence + FENCE.len();
    let tag_end = tag_start
        + bytes[tag_start..]
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
            .count();
    let body_start = match bytes.get(tag_end..tag_end + 2) {
        Some(b"\r\n") => tag_end + 2,
        _ if bytes.get(tag_end) == Some(&b'\n') => tag_end + 1,
        _ => return None,
    };
    let language = (tag_end > tag_start).then(|| &text[tag_start..tag_end]);
    Some((language, body_start))
}

#[derive(Default)]
struct SegmentList {
    items: Vec<Segment>,
}

impl SegmentList {
    fn push_text(&mut self, raw: &str) {
        let content = raw.trim();
        if content.is_empty() {
            return;
        }
        self.push(SegmentKind::Text, content.to_string(), None);
    }

    fn push_code(&mut self, raw: &str, language: Option<&str>) {
        self.push(
            SegmentKind::Code,
            raw.trim_end().to_string(),
            language.map(str::to_string),
        );
    }

    fn push(&mut self, kind: SegmentKind, content: String, language: Option<String>) {
        let index = self.items.len();
        self.items.push(Segment {
            index,
            kind,
            content,
            language,
        });
    }
}
