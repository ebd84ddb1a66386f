//! MFER patient-data anonymizer
//!
//! MFER files are a flat sequence of tag/length/value items. The anonymizer
//! walks that sequence once and blanks the value bytes of the patient tags.
//! Blanking instead of removing keeps every other item at its original offset,
//! so readers that index into the waveform block are unaffected.

use super::tags::{PATIENT_TAGS, TAG_CHANNEL_ATTRIBUTE, TAG_END};
use super::BinaryTransform;
use crate::domain::TransformError;

/// Largest number of bytes a long-form length may use
const MAX_LENGTH_BYTES: u8 = 4;

/// Blanks patient-identifying tag values in MFER byte streams
#[derive(Debug, Clone)]
pub struct MferAnonymizer {
    redacted_tags: Vec<u8>,
}

impl MferAnonymizer {
    /// Anonymizer that blanks the four patient tags
    pub fn new() -> Self {
        Self {
            redacted_tags: PATIENT_TAGS.to_vec(),
        }
    }

    /// Anonymizer that blanks a custom set of tags
    pub fn with_tags(tags: impl IntoIterator<Item = u8>) -> Self {
        Self {
            redacted_tags: tags.into_iter().collect(),
        }
    }
}

impl Default for MferAnonymizer {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryTransform for MferAnonymizer {
    fn transform(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        if input.is_empty() {
            return Err(TransformError::EmptyInput);
        }

        let mut output = input.to_vec();
        let mut pos = 0;

        while pos < input.len() {
            let tag = input[pos];
            pos += 1;

            if tag == TAG_END {
                break;
            }

            if tag == TAG_CHANNEL_ATTRIBUTE {
                let channel = byte_at(input, pos, "channel number")?;
                pos += 1;
                if channel & 0x80 != 0 {
                    byte_at(input, pos, "channel number")?;
                    pos += 1;
                }
            }

            let (len, value_start) = read_length(input, pos)?;
            let value_end = value_start
                .checked_add(len)
                .filter(|end| *end <= input.len())
                .ok_or(TransformError::Truncated {
                    offset: value_start,
                    context: "tag value",
                })?;

            if self.redacted_tags.contains(&tag) {
                output[value_start..value_end].fill(0);
            }

            pos = value_end;
        }

        Ok(output)
    }

    fn name(&self) -> &'static str {
        "mfer"
    }
}

fn byte_at(input: &[u8], pos: usize, context: &'static str) -> Result<u8, TransformError> {
    input
        .get(pos)
        .copied()
        .ok_or(TransformError::Truncated {
            offset: pos,
            context,
        })
}

/// Decode a length field starting at `pos`
///
/// Returns the length and the offset of the first value byte.
fn read_length(input: &[u8], pos: usize) -> Result<(usize, usize), TransformError> {
    let first = byte_at(input, pos, "length")?;
    if first & 0x80 == 0 {
        return Ok((usize::from(first), pos + 1));
    }

    let count = first & 0x7F;
    if count == 0 || count > MAX_LENGTH_BYTES {
        return Err(TransformError::InvalidLength {
            offset: pos,
            detail: format!("long-form length uses {count} bytes"),
        });
    }

    let mut len = 0usize;
    for i in 0..usize::from(count) {
        let b = byte_at(input, pos + 1 + i, "length")?;
        len = (len << 8) | usize::from(b);
    }
    Ok((len, pos + 1 + usize::from(count)))
}
