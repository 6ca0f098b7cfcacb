//! # emx-utf7
//!
//! UTF-7 (RFC 2152) encoding and decoding for protocols that can only carry a
//! restricted subset of ASCII, such as folder and resource names exchanged
//! with legacy mail and collaboration servers.
//!
//! ## Wire Format
//!
//! Direct characters are written as-is:
//!
//! ```text
//! ' ( ) , - . / 0-9 : ? A-Z a-z
//! ```
//!
//! Every other run of characters is converted to UTF-16BE, Base64-encoded
//! with the standard alphabet and no padding, and wrapped in `+` and `-`:
//!
//! ```text
//! 日本語     ->  +ZeVnLIqe-
//! Item 3     ->  Item+ACA-3
//! +          ->  +-
//! ```
//!
//! Only the direct-character variant is supported. The IMAP mailbox variant
//! (`&` shift, `,` in place of `/`) is not.
//!
//! ## Example
//!
//! ```
//! let encoded = emx_utf7::encode("Grüße");
//! assert_eq!(encoded, "Gr+APwA3w-e");
//! assert_eq!(emx_utf7::decode(&encoded).unwrap(), "Grüße");
//! ```

pub mod segment;
pub mod encoder;
pub mod decoder;

pub use segment::{analyze_ranges, analyze_utf7, is_direct, DecodeError, Segment, SegmentKind};
pub use encoder::{convert_to_utf7, Encoder};
pub use decoder::{convert_from_utf7, Decoder};

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

/// Standard alphabet, unpadded output, padding rejected on input
pub(crate) const BASE64_UTF7: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

/// Encode text to UTF-7
pub fn encode(input: &str) -> String {
    Encoder::new().encode(input)
}

/// Decode UTF-7 text
pub fn decode(input: &str) -> Result<String, DecodeError> {
    Decoder::new().decode(input)
}
