//! Segmentation of text and UTF-7 wire bytes into labeled runs

use std::ops::Range;

/// Shift character that opens an escaped run
pub const SHIFT_CHAR: u8 = b'+';
/// Character that closes an escaped run
pub const UNSHIFT_CHAR: u8 = b'-';
/// The escape for a literal `+`
pub const LITERAL_PLUS: &[u8] = b"+-";

/// Label attached to a [`Segment`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Run of direct characters in decoded text, copied verbatim
    Direct,
    /// Run of characters in decoded text that must be Base64-escaped
    Escaped,
    /// Run of literal bytes in UTF-7 text
    Ascii,
    /// Run of UTF-7 text starting at `+`, including the closing `-` if present
    Utf7,
}

impl SegmentKind {
    /// Whether the segment content is copied through unchanged
    pub fn is_literal(self) -> bool {
        matches!(self, SegmentKind::Direct | SegmentKind::Ascii)
    }
}

/// A labeled half-open interval `[low, high)` over input units
///
/// Units are `char`s for [`analyze_ranges`] and bytes for [`analyze_utf7`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    pub kind: SegmentKind,
    pub low: usize,
    pub high: usize,
}

impl Segment {
    pub fn new(kind: SegmentKind, low: usize, high: usize) -> Self {
        Self { kind, low, high }
    }

    pub fn len(&self) -> usize {
        self.high - self.low
    }

    pub fn is_empty(&self) -> bool {
        self.low == self.high
    }

    /// Range usable for slicing the input the segment was built from
    pub fn range(&self) -> Range<usize> {
        self.low..self.high
    }
}

/// Error returned when UTF-7 text cannot be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Escaped payload is not valid unpadded standard Base64
    MalformedEncoding { position: usize, reason: String },

    /// Escaped payload decoded to an odd number of bytes
    TruncatedPayload { position: usize, len: usize },
}

impl DecodeError {
    /// Byte offset of the `+` that opened the failing run
    pub fn position(&self) -> usize {
        match self {
            DecodeError::MalformedEncoding { position, .. } => *position,
            DecodeError::TruncatedPayload { position, .. } => *position,
        }
    }

    pub(crate) fn at(self, position: usize) -> Self {
        match self {
            DecodeError::MalformedEncoding { reason, .. } => {
                DecodeError::MalformedEncoding { position, reason }
            }
            DecodeError::TruncatedPayload { len, .. } => DecodeError::TruncatedPayload { position, len },
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::MalformedEncoding { position, reason } => {
                write!(f, "Malformed base64 in escape at byte {}: {}", position, reason)
            }
            DecodeError::TruncatedPayload { position, len } => {
                write!(
                    f,
                    "Truncated UTF-16 payload in escape at byte {}: {} bytes is not a whole number of code units",
                    position, len
                )
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Returns true if `c` may appear literally in UTF-7 output
#[inline]
pub fn is_direct(c: char) -> bool {
    matches!(c,
        '\'' | '(' | ')' |
        ',' | '-' | '.' | '/' |
        '0'..='9' |
        ':' | '?' |
        'A'..='Z' | 'a'..='z'
    )
}

/// Split decoded text into maximal runs of direct and escaped characters
///
/// Indices are `char` positions. Empty input produces no segments.
pub fn analyze_ranges(chars: &[char]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current: Option<Segment> = None;

    for (i, &c) in chars.iter().enumerate() {
        let kind = if is_direct(c) {
            SegmentKind::Direct
        } else {
            SegmentKind::Escaped
        };

        match current {
            Some(open) if open.kind == kind => {}
            Some(open) => {
                // classification changed, close the run here
                segments.push(Segment::new(open.kind, open.low, i));
                current = Some(Segment::new(kind, i, i));
            }
            None => current = Some(Segment::new(kind, i, i)),
        }
    }

    if let Some(mut open) = current {
        open.high = chars.len();
        segments.push(open);
    }

    segments
}

/// Split UTF-7 bytes into literal runs and `+`...`-` escaped runs
///
/// Inside an escaped run `+` is a Base64 symbol and does not start a new run.
/// A `-` outside an escaped run is an ordinary literal byte. Zero-width
/// segments are dropped, so empty input produces no segments.
pub fn analyze_utf7(bytes: &[u8]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = Segment::new(SegmentKind::Ascii, 0, 0);

    for (i, &b) in bytes.iter().enumerate() {
        if b == SHIFT_CHAR && current.kind == SegmentKind::Ascii {
            current.high = i;
            segments.push(current);
            current = Segment::new(SegmentKind::Utf7, i, i);
        } else if b == UNSHIFT_CHAR && current.kind == SegmentKind::Utf7 {
            current.high = i + 1;
            segments.push(current);
            current = Segment::new(SegmentKind::Ascii, i + 1, i + 1);
        }
    }

    current.high = bytes.len();
    segments.push(current);

    segments.retain(|s| !s.is_empty());
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn assert_partition(segments: &[Segment], len: usize) {
        let mut expected_low = 0;
        for segment in segments {
            assert_eq!(segment.low, expected_low);
            assert!(!segment.is_empty(), "empty segment {:?}", segment);
            expected_low = segment.high;
        }
        assert_eq!(expected_low, len);
    }

    #[test]
    fn test_direct_set() {
        for c in "'(),-./0123456789:?ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz".chars() {
            assert!(is_direct(c), "{:?} should be direct", c);
        }
        for c in [' ', '\t', '\n', '\r', '+', '!', '"', '#', '&', '*', ';', '<', '=', '@', '[', '_', '~', '\u{7f}', 'é', '☺', '😀'] {
            assert!(!is_direct(c), "{:?} should be escaped", c);
        }
    }

    #[test]
    fn test_analyze_ranges_mixed() {
        let input = chars("Hi Mom -☺-!");
        let segments = analyze_ranges(&input);

        assert_eq!(
            segments,
            vec![
                Segment::new(SegmentKind::Direct, 0, 2),
                Segment::new(SegmentKind::Escaped, 2, 3),
                Segment::new(SegmentKind::Direct, 3, 6),
                Segment::new(SegmentKind::Escaped, 6, 7),
                Segment::new(SegmentKind::Direct, 7, 8),
                Segment::new(SegmentKind::Escaped, 8, 9),
                Segment::new(SegmentKind::Direct, 9, 10),
                Segment::new(SegmentKind::Escaped, 10, 11),
            ]
        );
    }

    #[test]
    fn test_analyze_ranges_single_kind() {
        assert_eq!(
            analyze_ranges(&chars("abc")),
            vec![Segment::new(SegmentKind::Direct, 0, 3)]
        );
        assert_eq!(
            analyze_ranges(&chars("日本語")),
            vec![Segment::new(SegmentKind::Escaped, 0, 3)]
        );
    }

    #[test]
    fn test_analyze_ranges_empty() {
        assert!(analyze_ranges(&[]).is_empty());
    }

    #[test]
    fn test_analyze_utf7_known_vector() {
        let segments = analyze_utf7(b"Hi Mom -+Jjo--!");

        assert_eq!(
            segments,
            vec![
                Segment::new(SegmentKind::Ascii, 0, 8),
                Segment::new(SegmentKind::Utf7, 8, 13),
                Segment::new(SegmentKind::Ascii, 13, 15),
            ]
        );
    }

    #[test]
    fn test_analyze_utf7_literal_plus() {
        assert_eq!(
            analyze_utf7(b"+-"),
            vec![Segment::new(SegmentKind::Utf7, 0, 2)]
        );
        assert_eq!(
            analyze_utf7(b"a+-b"),
            vec![
                Segment::new(SegmentKind::Ascii, 0, 1),
                Segment::new(SegmentKind::Utf7, 1, 3),
                Segment::new(SegmentKind::Ascii, 3, 4),
            ]
        );
    }

    #[test]
    fn test_analyze_utf7_empty() {
        assert!(analyze_utf7(b"").is_empty());
    }

    #[test]
    fn test_analyze_utf7_stray_hyphen_is_literal() {
        assert_eq!(
            analyze_utf7(b"a-b--c"),
            vec![Segment::new(SegmentKind::Ascii, 0, 6)]
        );
    }

    #[test]
    fn test_analyze_utf7_unterminated() {
        assert_eq!(
            analyze_utf7(b"ab+AGE"),
            vec![
                Segment::new(SegmentKind::Ascii, 0, 2),
                Segment::new(SegmentKind::Utf7, 2, 6),
            ]
        );
    }

    #[test]
    fn test_analyze_utf7_plus_inside_payload() {
        // U+F800 encodes as "+AA", whose first symbol is the Base64 '+'
        assert_eq!(
            analyze_utf7(b"x++AA-y"),
            vec![
                Segment::new(SegmentKind::Ascii, 0, 1),
                Segment::new(SegmentKind::Utf7, 1, 6),
                Segment::new(SegmentKind::Ascii, 6, 7),
            ]
        );
    }

    #[test]
    fn test_analyze_utf7_adjacent_escapes() {
        assert_eq!(
            analyze_utf7(b"+AGE-+AGI-"),
            vec![
                Segment::new(SegmentKind::Utf7, 0, 5),
                Segment::new(SegmentKind::Utf7, 5, 10),
            ]
        );
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::TruncatedPayload { position: 3, len: 1 };
        assert_eq!(err.position(), 3);
        assert!(err.to_string().contains("byte 3"));
    }

    proptest! {
        #[test]
        fn prop_analyze_ranges_partitions(s in any::<String>()) {
            let input: Vec<char> = s.chars().collect();
            let segments = analyze_ranges(&input);
            assert_partition(&segments, input.len());
            for pair in segments.windows(2) {
                prop_assert_ne!(pair[0].kind, pair[1].kind);
            }
        }

        #[test]
        fn prop_analyze_utf7_partitions(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let segments = analyze_utf7(&bytes);
            assert_partition(&segments, bytes.len());
        }

        #[test]
        fn prop_analyze_utf7_partitions_delimiter_heavy(s in "[+\\-A-Za-z ]{0,32}") {
            let segments = analyze_utf7(s.as_bytes());
            assert_partition(&segments, s.len());
        }
    }
}
