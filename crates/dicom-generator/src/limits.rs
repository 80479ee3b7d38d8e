//! Limits and defaults shared by the codecs and the file helpers.

/// Binary payloads longer than this are handed to a bulk data sink, when one
/// is available, instead of being inlined as base64 (3 MiB).
pub const DEFAULT_BULK_DATA_THRESHOLD: usize = 3 * 1024 * 1024;

/// Maximum value length accepted when reading a binary file (256 MiB).
pub const MAX_ELEMENT_LEN: usize = 256 * 1024 * 1024;

/// Maximum nesting depth of sequences in either codec.
pub const MAX_SEQUENCE_DEPTH: usize = 64;

/// Length of the Part-10 preamble that precedes the magic.
pub const PREAMBLE_LEN: usize = 128;

/// Part-10 magic bytes.
pub const DICM_MAGIC: &[u8; 4] = b"DICM";

/// Description given to datasets wrapped without one.
pub const DEFAULT_DESCRIPTION: &str = "No description";

/// Description given to datasets converted from a file.
pub const CONVERTED_DESCRIPTION: &str = "Converted";

/// Appended to the input stem when no output path is given.
pub const TEMPLATE_SUFFIX: &str = "_template.json";

/// Lower bound of CT-like pixel values.
pub const CT_RESCALE_MIN: f64 = -2048.0;

/// Upper bound of CT-like pixel values.
pub const CT_RESCALE_MAX: f64 = 1000.0;

/// UID root under which generated UIDs are issued.
pub const DICOM_GENERATOR_ROOT_UID: &str = "1.2.826.0.1.3680043.10.1006.";
