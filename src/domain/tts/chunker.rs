use super::error::ChunkingError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Sentence terminators followed by optional closing quotes/brackets and
/// whitespace. CJK full-width terminators are not followed by a space.
static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:[.!?…]+["'”’)\]]*\s+)|(?:[。！？]+["'”’」』)\]]*\s*)"#)
        .expect("sentence boundary pattern is valid")
});

/// A contiguous slice of the source text with its position in the sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

/// Split `text` into chunks whose UTF-8 encoding is at most `limit_bytes`,
/// preferring sentence boundaries and falling back to word boundaries inside
/// oversized sentences.
pub fn split(text: &str, limit_bytes: usize) -> Result<Vec<Chunk>, ChunkingError> {
    let mut pieces: Vec<&str> = Vec::new();
    let units = sentences(text);

    if units.is_empty() {
        return Ok(if text.is_empty() {
            Vec::new()
        } else {
            vec![Chunk {
                index: 0,
                text: text.to_string(),
            }]
        });
    }

    // Byte range of the accumulation buffer inside `text`; units are contiguous
    let mut buffer_start = 0;
    let mut buffer_end = 0;

    for (unit_start, unit) in units {
        let buffered = buffer_end - buffer_start;

        if buffered + encoded_len(unit) > limit_bytes {
            if buffered > 0 {
                pieces.push(&text[buffer_start..buffer_end]);
            }

            let mut remaining = unit;
            let mut offset = unit_start;
            while encoded_len(remaining) > limit_bytes {
                let head = largest_prefix_within(remaining, limit_bytes)?;
                pieces.push(head);
                offset += head.len();
                remaining = &remaining[head.len()..];
            }

            buffer_start = offset;
            buffer_end = offset + remaining.len();
        } else {
            buffer_end = unit_start + unit.len();
        }
    }

    if buffer_end > buffer_start {
        pieces.push(&text[buffer_start..buffer_end]);
    }

    Ok(pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .enumerate()
        .map(|(index, piece)| Chunk {
            index,
            text: piece.to_string(),
        })
        .collect())
}

/// Sentence-like units as (byte offset, slice). Each unit keeps its trailing
/// whitespace so the units tile the input exactly.
fn sentences(text: &str) -> Vec<(usize, &str)> {
    let mut units = Vec::new();
    let mut last_end = 0;

    for mat in SENTENCE_BOUNDARY.find_iter(text) {
        units.push((last_end, &text[last_end..mat.end()]));
        last_end = mat.end();
    }

    if last_end < text.len() {
        units.push((last_end, &text[last_end..]));
    }

    units
}

fn encoded_len(s: &str) -> usize {
    s.len()
}

/// Prefix of `s` made of its first `chars` characters
fn char_prefix(s: &str, chars: usize) -> &str {
    match s.char_indices().nth(chars) {
        Some((byte_offset, _)) => &s[..byte_offset],
        None => s,
    }
}

/// Binary search on character count for the longest prefix whose encoding
/// fits in `limit`, then back off to the last whitespace if that would cut a
/// word in half.
///
/// Every character takes at least one byte, so only the first `limit + 1`
/// characters are ever searched and each call is bounded by `limit`.
fn largest_prefix_within(s: &str, limit: usize) -> Result<&str, ChunkingError> {
    let window = char_prefix(s, limit.saturating_add(1));
    let mut lower = 0;
    let mut upper = window.chars().count();
    let mut split_point = 0;

    while lower <= upper {
        let mid = (lower + upper) / 2;
        if encoded_len(char_prefix(window, mid)) <= limit {
            split_point = mid;
            lower = mid + 1;
        } else if mid == 0 {
            break;
        } else {
            upper = mid - 1;
        }
    }

    if split_point == 0 {
        let character = s.chars().next().unwrap_or_default();
        return Err(ChunkingError::LimitTooSmall { limit, character });
    }

    let head = char_prefix(window, split_point);
    let splits_word = s[head.len()..]
        .chars()
        .next()
        .is_some_and(|next| !next.is_whitespace())
        && !head.ends_with(char::is_whitespace);

    if splits_word {
        if let Some((ws_offset, ws)) = head
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
        {
            let cut = ws_offset + ws.len_utf8();
            if !head[..ws_offset].trim().is_empty() {
                return Ok(&head[..cut]);
            }
        }
    }

    Ok(head)
}
