//! Error types for field lookup, the JSON codec, Part-10 files and validation.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{Tag, Vr};

/// Broad classification of every error this crate returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// D001: Unknown field, VR code or field reference
    Lookup,
    /// D002: Malformed or unexpected JSON document
    Decode,
    /// D003: Value cannot be rendered as JSON
    Encode,
    /// D004: Malformed or unsupported binary DICOM file
    Part10,
    /// D005: Bulk data could not be stored or fetched
    BulkData,
    /// D006: Filesystem or image failure
    Io,
}

impl ErrorKind {
    /// Returns the error code string (e.g., "D001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Lookup => "D001",
            ErrorKind::Decode => "D002",
            ErrorKind::Encode => "D003",
            ErrorKind::Part10 => "D004",
            ErrorKind::BulkData => "D005",
            ErrorKind::Io => "D006",
        }
    }

    /// Human-readable name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Lookup => "lookup",
            ErrorKind::Decode => "decode",
            ErrorKind::Encode => "encode",
            ErrorKind::Part10 => "part10",
            ErrorKind::BulkData => "bulk-data",
            ErrorKind::Io => "io",
        }
    }
}

/// Failure to resolve a field or a value representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("[D001] no dictionary entry for field {tag}")]
    UnknownField { tag: Tag },

    #[error("[D001] unknown value representation {code:?}")]
    InvalidVr { code: String },

    #[error("[D001] {reference:?} is not a keyword or a hex tag")]
    InvalidFieldReference { reference: String },
}

fn describe_location(tag: &Option<Tag>) -> String {
    match tag {
        Some(tag) => format!(" at {tag}"),
        None => String::new(),
    }
}

/// Error while turning a JSON document back into a dataset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("[D002] malformed document{}: {reason}", describe_location(.tag))]
    MalformedDocument {
        tag: Option<Tag>,
        reason: &'static str,
    },

    #[error("[D002] unexpected key {key:?} in element {tag}")]
    UnexpectedKey { tag: Tag, key: String },

    #[error("[D002] {key:?} is not an 8-digit hex tag")]
    InvalidTagKey { key: String },

    #[error("[D002] element {tag} ({vr:?}): expected {expected}")]
    UnexpectedJsonType {
        tag: Tag,
        vr: Vr,
        expected: &'static str,
    },

    #[error("[D002] element {tag} has invalid base64 in InlineBinary")]
    InvalidBase64 { tag: Tag },

    #[error("[D002] element {tag} refers to bulk data {uri:?} but no bulk data source was given")]
    UnresolvedBulkData { tag: Tag, uri: String },

    #[error("[D005] element {tag}: bulk data {uri:?} unavailable: {message}")]
    BulkDataUnavailable {
        tag: Tag,
        uri: String,
        message: String,
    },

    #[error("[D002] sequence nesting exceeds {max} levels")]
    SequenceTooDeep { max: usize },

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("[D002] invalid JSON: {0}")]
    Json(String),
}

impl DecodeError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::Lookup(_) => ErrorKind::Lookup,
            DecodeError::BulkDataUnavailable { .. } => ErrorKind::BulkData,
            _ => ErrorKind::Decode,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err.to_string())
    }
}

/// Error while rendering a dataset as JSON.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("[D003] element {tag} holds non-finite float {value}")]
    NonFiniteFloat { tag: Tag, value: f64 },

    #[error("[D005] element {tag}: bulk data sink failed: {message}")]
    BulkDataSink { tag: Tag, message: String },

    #[error("[D003] sequence nesting exceeds {max} levels")]
    SequenceTooDeep { max: usize },

    #[error("[D003] annotation on {tag}, which is not in the dataset")]
    OrphanAnnotation { tag: Tag },
}

impl EncodeError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EncodeError::BulkDataSink { .. } => ErrorKind::BulkData,
            _ => ErrorKind::Encode,
        }
    }
}

/// A value that does not fit its element.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("[D003] element {tag}: {value} value does not fit {vr:?}")]
    ValueMismatch {
        tag: Tag,
        vr: Vr,
        value: &'static str,
    },

    #[error("[D003] element {tag}: dictionary says {dictionary:?}, element declares {declared:?}")]
    VrInconsistent {
        tag: Tag,
        dictionary: Vr,
        declared: Vr,
    },

    #[error("[D003] element {tag} ({vr:?}): value {value:?} {reason}")]
    InvalidText {
        tag: Tag,
        vr: Vr,
        value: String,
        reason: &'static str,
    },
}

/// Error from a bulk data store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkDataError {
    #[error("[D005] no bulk data stored under {uri:?}")]
    NotFound { uri: String },

    #[error("[D005] bulk data {uri:?}: {message}")]
    Io { uri: String, message: String },

    #[error("[D005] bulk data {uri:?}: zstd failed: {message}")]
    Compression { uri: String, message: String },
}

/// Error while reading or writing a binary DICOM (Part-10) file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Part10Error {
    #[error("[D004] unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("[D004] missing DICM magic after the 128-byte preamble")]
    MissingMagic,

    #[error("[D004] cannot parse file: {message}")]
    Read { message: String },

    #[error("[D004] cannot write file: {message}")]
    Write { message: String },

    #[error("[D004] unsupported transfer syntax {uid:?}")]
    UnsupportedTransferSyntax { uid: String },

    #[error("[D004] element {tag} holds encapsulated pixel data")]
    EncapsulatedPixelData { tag: Tag },

    #[error("[D004] {field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("[D004] sequence nesting exceeds {max} levels")]
    SequenceTooDeep { max: usize },

    #[error("[D004] element {tag} ({vr:?}): value does not match its VR")]
    UnexpectedValue { tag: Tag, vr: Vr },

    #[error("[D004] element {tag} ({vr:?}): integer {value} out of range")]
    IntegerOutOfRange { tag: Tag, vr: Vr, value: i64 },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Error from the file-backed helpers, wrapping every phase.
#[derive(Debug, Error)]
pub enum Error {
    #[error("[D006] {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[D002] invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Part10(#[from] Part10Error),

    #[error(transparent)]
    BulkData(#[from] BulkDataError),

    #[error("[D006] image: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } | Error::Image(_) => ErrorKind::Io,
            Error::Json(_) => ErrorKind::Decode,
            Error::Lookup(_) => ErrorKind::Lookup,
            Error::Decode(e) => e.kind(),
            Error::Encode(e) => e.kind(),
            Error::Part10(_) => ErrorKind::Part10,
            Error::BulkData(_) => ErrorKind::BulkData,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
