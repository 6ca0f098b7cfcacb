//! UTF-7 encoder

use crate::segment::{analyze_ranges, SHIFT_CHAR, UNSHIFT_CHAR};
use crate::BASE64_UTF7;
use anyhow::{Context, Result};
use base64::Engine;

/// Encodes Unicode text into UTF-7
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder;

impl Encoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self
    }

    /// Encode a string to UTF-7
    ///
    /// Direct characters are copied, every other run becomes `+<base64>-`.
    pub fn encode(&self, input: &str) -> String {
        let chars: Vec<char> = input.chars().collect();
        let mut output = String::with_capacity(input.len() * 2);

        for segment in analyze_ranges(&chars) {
            let run = &chars[segment.range()];
            if segment.kind.is_literal() {
                output.extend(run.iter());
            } else {
                output.push_str(&convert_to_utf7(run));
            }
        }

        output
    }

    /// Encode a string directly to a writer
    pub fn encode_to_writer<W: std::io::Write>(&self, input: &str, mut writer: W) -> Result<()> {
        let encoded = self.encode(input);
        writer.write_all(encoded.as_bytes())?;
        Ok(())
    }

    /// Encode a string to a file
    pub fn encode_to_file(&self, input: &str, path: &std::path::Path) -> Result<()> {
        let encoded = self.encode(input);
        std::fs::write(path, encoded)
            .with_context(|| format!("Failed to write: {}", path.display()))?;
        Ok(())
    }
}

/// Escape one run of non-direct characters as `+<base64>-`
///
/// A run consisting of a single `+` is written as the short form `+-`.
pub fn convert_to_utf7(run: &[char]) -> String {
    if run == ['+'] {
        return "+-".to_string();
    }

    let mut units = [0u16; 2];
    let mut bytes = Vec::with_capacity(run.len() * 4);
    for c in run {
        for unit in c.encode_utf16(&mut units) {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
    }

    let mut output = String::with_capacity(bytes.len() * 4 / 3 + 3);
    output.push(SHIFT_CHAR as char);
    BASE64_UTF7.encode_string(&bytes, &mut output);
    output.push(UNSHIFT_CHAR as char);
    output
}
