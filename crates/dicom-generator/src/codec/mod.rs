//! Encoding and decoding of datasets.
//!
//! - [`json`]: the DICOM-JSON text form, with bulk data hand-off
//! - [`part10`]: binary DICOM files, through `dicom-object`
//! - [`bulk`]: out-of-band stores for large payloads

pub mod bulk;
pub mod json;
pub mod part10;

pub use bulk::{BulkDataSink, BulkDataSource, DirectoryBulkStore, InMemoryBulkStore};
pub use json::{
    decode_dataset, encode_dataset, from_json, to_json, EncodeOptions, JsonDecoder, JsonEncoder,
};
pub use part10::{read_file, write_file};
