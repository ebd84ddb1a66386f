//! MFER tag numbers used by the anonymizer

/// Byte order of waveform data
pub const TAG_BYTE_ORDER: u8 = 0x01;

/// Waveform data block
pub const TAG_WAVEFORM: u8 = 0x1E;

/// Channel attribute group; followed by a channel number before the length
pub const TAG_CHANNEL_ATTRIBUTE: u8 = 0x3F;

/// Preamble text
pub const TAG_PREAMBLE: u8 = 0x40;

/// End of data; anything after it is opaque trailer
pub const TAG_END: u8 = 0x80;

/// Patient name
pub const TAG_PATIENT_NAME: u8 = 0x81;

/// Patient identifier
pub const TAG_PATIENT_ID: u8 = 0x82;

/// Patient age and birth date
pub const TAG_PATIENT_AGE: u8 = 0x83;

/// Patient sex
pub const TAG_PATIENT_SEX: u8 = 0x84;

/// Tags whose values identify the patient
pub const PATIENT_TAGS: [u8; 4] = [
    TAG_PATIENT_NAME,
    TAG_PATIENT_ID,
    TAG_PATIENT_AGE,
    TAG_PATIENT_SEX,
];
