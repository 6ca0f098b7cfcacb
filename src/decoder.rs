//! UTF-7 decoder

use crate::segment::{analyze_utf7, DecodeError, LITERAL_PLUS, UNSHIFT_CHAR};
use crate::BASE64_UTF7;
use anyhow::{Context, Result};
use base64::Engine;
use std::char::{decode_utf16, REPLACEMENT_CHARACTER};

/// Decodes UTF-7 text
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    /// Verbosity level for diagnostics on stderr
    verbose: u8,
}

impl Decoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self { verbose: 0 }
    }

    /// Set verbosity level (0-3)
    ///
    /// Level 1 warns about escapes left open at end of input, level 2 also
    /// reports every escaped run as it is decoded.
    pub fn with_verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Decode a UTF-7 string
    pub fn decode(&self, input: &str) -> Result<String, DecodeError> {
        self.decode_bytes(input.as_bytes())
    }

    /// Decode raw UTF-7 wire bytes
    ///
    /// Stops at the first escaped run that fails to decode; nothing decoded
    /// before it is returned.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        let mut output = String::with_capacity(bytes.len());

        for segment in analyze_utf7(bytes) {
            let run = &bytes[segment.range()];

            if segment.kind.is_literal() {
                output.push_str(&String::from_utf8_lossy(run));
                continue;
            }

            if run == LITERAL_PLUS {
                output.push('+');
                continue;
            }

            let payload = match run.strip_suffix(&[UNSHIFT_CHAR]) {
                Some(body) => &body[1..],
                None => {
                    if self.verbose > 0 {
                        eprintln!(
                            "Warning: escape at byte {} is not terminated by '-'",
                            segment.low
                        );
                    }
                    &run[1..]
                }
            };

            let decoded = convert_from_utf7(payload).map_err(|e| e.at(segment.low))?;

            if self.verbose > 1 {
                eprintln!(
                    "Decoded escape at byte {} ({} bytes): {:?}",
                    segment.low,
                    segment.len(),
                    decoded
                );
            }

            output.push_str(&decoded);
        }

        Ok(output)
    }

    /// Decode a string directly to a writer
    pub fn decode_to_writer<W: std::io::Write>(&self, input: &str, mut writer: W) -> Result<()> {
        let decoded = self.decode(input)?;
        writer.write_all(decoded.as_bytes())?;
        Ok(())
    }

    /// Decode the contents of a file
    pub fn decode_file(&self, path: &std::path::Path) -> Result<String> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read: {}", path.display()))?;
        let decoded = self
            .decode_bytes(&bytes)
            .with_context(|| format!("Failed to decode: {}", path.display()))?;
        Ok(decoded)
    }
}

/// Decode the Base64 payload of one escaped run, delimiters already removed
///
/// Errors carry position 0; callers relocate them to the run's offset.
pub fn convert_from_utf7(payload: &[u8]) -> Result<String, DecodeError> {
    let bytes = BASE64_UTF7
        .decode(payload)
        .map_err(|e| DecodeError::MalformedEncoding {
            position: 0,
            reason: e.to_string(),
        })?;

    if bytes.len() % 2 != 0 {
        return Err(DecodeError::TruncatedPayload {
            position: 0,
            len: bytes.len(),
        });
    }

    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));

    Ok(decode_utf16(units)
        .map(|r| r.unwrap_or(REPLACEMENT_CHARACTER))
        .collect())
}
