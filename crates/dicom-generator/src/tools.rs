//! File-backed conversions between DICOM files and editable JSON.
//!
//! Every writer serializes the whole document before it creates the output
//! file, so a failed conversion leaves no partial document behind.
//!
//! Binary payloads above the bulk data threshold are not inlined. They go
//! to a sidecar directory next to the JSON document, `<stem>_bulk/`, and
//! the document refers to them by `BulkDataURI`. Reading a document
//! resolves those references through the same directory.

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde_json::Value as JsonValue;

use crate::annotation::AnnotatedDataset;
use crate::codec::{self, part10, DirectoryBulkStore, EncodeOptions};
use crate::error::Error;
use crate::generate;
use crate::limits::{CONVERTED_DESCRIPTION, DEFAULT_BULK_DATA_THRESHOLD, TEMPLATE_SUFFIX};
use crate::model::{Dataset, Tag, Value};
use crate::persistence;
use crate::pixel;

/// Options for converting a DICOM file to an annotated JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Where to write; defaults to `<parent>/<stem>_template.json`.
    pub output_path: Option<PathBuf>,
    pub description: String,
    /// Replace the image payload with a placeholder image.
    pub replace_pixel_data: bool,
    /// Image to substitute instead of the built-in placeholder.
    pub image_path: Option<PathBuf>,
    /// Payloads longer than this go to the sidecar directory.
    pub bulk_data_threshold: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            output_path: None,
            description: CONVERTED_DESCRIPTION.to_string(),
            replace_pixel_data: false,
            image_path: None,
            bulk_data_threshold: DEFAULT_BULK_DATA_THRESHOLD,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_replace_pixel_data(mut self, replace: bool) -> Self {
        self.replace_pixel_data = replace;
        self
    }

    pub fn with_image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    pub fn with_bulk_data_threshold(mut self, threshold: usize) -> Self {
        self.bulk_data_threshold = threshold;
        self
    }
}

/// `<parent>/<stem>_template.json` for an input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{stem}{TEMPLATE_SUFFIX}"))
}

/// `<parent>/<stem>_bulk` for a JSON document: where its bulk data lives.
pub fn bulk_dir_for(document: &Path) -> PathBuf {
    let stem = document.file_stem().unwrap_or_default().to_string_lossy();
    document.with_file_name(format!("{stem}_bulk"))
}

/// Wraps a dataset for editing, optionally replacing its pixel data with the
/// placeholder image.
pub fn dataset_to_annotated(
    mut dataset: Dataset,
    replace_pixel_data: bool,
    description: impl Into<String>,
) -> Result<AnnotatedDataset, Error> {
    if replace_pixel_data {
        pixel::replace_with_placeholder(&mut dataset)?;
    }
    let mut annotated = AnnotatedDataset::new(dataset);
    annotated.set_description(description);
    Ok(annotated)
}

/// Reads a Part-10 file from disk.
pub fn read_dicom(path: &Path) -> Result<Dataset, Error> {
    tracing::info!(path = %path.display(), "reading dataset");
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(part10::read_file(&bytes)?)
}

/// Converts the DICOM file at `input` to an annotated JSON document and
/// returns the path written.
pub fn to_annotated_dataset(input: &Path, options: &ConvertOptions) -> Result<PathBuf, Error> {
    let output = options
        .output_path
        .clone()
        .unwrap_or_else(|| default_output_path(input));

    let mut dataset = read_dicom(input)?;
    if options.replace_pixel_data {
        match &options.image_path {
            Some(image) => pixel::replace_with_image_file(&mut dataset, image)?,
            None => pixel::replace_with_placeholder(&mut dataset)?,
        };
    }
    let mut annotated = AnnotatedDataset::new(dataset);
    annotated.set_description(options.description.as_str());

    let encode_options = EncodeOptions::new().with_bulk_data_threshold(options.bulk_data_threshold);
    let mut sidecar = DirectoryBulkStore::new(bulk_dir_for(&output));
    let json = annotated.to_json_value_with(&encode_options, Some(&mut sidecar))?;
    let bytes = persistence::to_pretty_vec(&json)?;
    fs::write(&output, bytes).map_err(|e| Error::io(&output, e))?;
    tracing::info!(path = %output.display(), "wrote annotated dataset");
    Ok(output)
}

/// Reads an annotated JSON document from disk, resolving bulk data
/// through its sidecar directory.
pub fn from_annotated_file(path: &Path) -> Result<AnnotatedDataset, Error> {
    let json = read_json(path)?;
    let sidecar = DirectoryBulkStore::new(bulk_dir_for(path));
    Ok(AnnotatedDataset::from_json_value_with(&json, Some(&sidecar))?)
}

/// Reads a dataset from either an annotated or a bare JSON document.
pub fn load_json_dataset(path: &Path) -> Result<Dataset, Error> {
    let json = read_json(path)?;
    let sidecar = DirectoryBulkStore::new(bulk_dir_for(path));
    if is_annotated(&json) {
        Ok(AnnotatedDataset::from_json_value_with(&json, Some(&sidecar))?.into_dataset())
    } else {
        Ok(codec::decode_dataset(&json, Some(&sidecar))?)
    }
}

fn read_json(path: &Path) -> Result<JsonValue, Error> {
    tracing::info!(path = %path.display(), "reading JSON document");
    let text = fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(serde_json::from_slice(&text)?)
}

/// An annotated document carries a `dataset` key; a bare dataset is keyed
/// by hex tags only.
fn is_annotated(json: &JsonValue) -> bool {
    json.as_object()
        .is_some_and(|obj| obj.contains_key("dataset") && obj.keys().all(|k| Tag::from_hex(k).is_none()))
}

/// Writes a dataset to disk as a Part-10 file.
pub fn export(dataset: &Dataset, path: &Path) -> Result<(), Error> {
    let bytes = part10::write_file(dataset)?;
    fs::write(path, bytes).map_err(|e| Error::io(path, e))?;
    tracing::info!(path = %path.display(), "wrote DICOM file");
    Ok(())
}

/// Converts a JSON document, annotated or bare, to a Part-10 file and
/// returns the path written. The default output is `<parent>/<stem>.dcm`.
pub fn annotated_to_dicom(input: &Path, output: Option<&Path>) -> Result<PathBuf, Error> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("dcm"));
    let dataset = load_json_dataset(input)?;
    export(&dataset, &output)?;
    Ok(output)
}

/// Writes `count` CT files named `dcmfile0`, `dcmfile1`, ... into `dir`.
///
/// Instance numbers count up from 1; everything else comes from
/// [`generate::ct_dataset`].
pub fn generate_ct_files(dir: &Path, count: usize, rng: &mut impl Rng) -> Result<Vec<PathBuf>, Error> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    let mut written = Vec::with_capacity(count);
    for i in 0..count {
        let instance = Value::text((i + 1).to_string());
        let dataset = generate::ct_dataset(rng, [("InstanceNumber", instance)])?;
        let path = dir.join(format!("dcmfile{i}"));
        export(&dataset, &path)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::tags;
    use crate::error::ErrorKind;
    use crate::model::Vr;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ct_file(dir: &Path) -> PathBuf {
        let dataset = generate::ct_dataset(&mut StdRng::seed_from_u64(1), Vec::<(Tag, Value)>::new()).unwrap();
        let path = dir.join("ct.dcm");
        export(&dataset, &path).unwrap();
        path
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/data/scans/image.dcm")),
            PathBuf::from("/data/scans/image_template.json")
        );
        assert_eq!(default_output_path(Path::new("image")), PathBuf::from("image_template.json"));
    }

    #[test]
    fn test_to_annotated_dataset_default_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = ct_file(dir.path());

        let output = to_annotated_dataset(&input, &ConvertOptions::new()).unwrap();
        assert_eq!(output, dir.path().join("ct_template.json"));

        let annotated = from_annotated_file(&output).unwrap();
        assert_eq!(annotated.description(), "Converted");
        let original = read_dicom(&input).unwrap();
        assert_eq!(annotated.dataset(), &original);
        assert!(!bulk_dir_for(&output).exists());
    }

    #[test]
    fn test_large_payloads_go_to_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let input = ct_file(dir.path());
        let options = ConvertOptions::new().with_bulk_data_threshold(64);
        let output = to_annotated_dataset(&input, &options).unwrap();

        let sidecar = bulk_dir_for(&output);
        assert_eq!(sidecar, dir.path().join("ct_template_bulk"));
        let json = read_json(&output).unwrap();
        let pixels = &json["dataset"]["7FE00010"];
        assert!(pixels.get("InlineBinary").is_none());
        assert!(sidecar.join(pixels["BulkDataURI"].as_str().unwrap()).exists());

        let original = read_dicom(&input).unwrap();
        assert_eq!(from_annotated_file(&output).unwrap().dataset(), &original);
        assert_eq!(load_json_dataset(&output).unwrap(), original);
        let back = annotated_to_dicom(&output, None).unwrap();
        assert_eq!(read_dicom(&back).unwrap(), original);

        fs::remove_dir_all(&sidecar).unwrap();
        let err = from_annotated_file(&output).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BulkData);
    }

    #[test]
    fn test_bare_json_resolves_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let mut dataset = generate::quick_dataset([("PatientID", "1234")]).unwrap();
        dataset.put("PixelData", vec![7u8; 200]).unwrap();

        let json_path = dir.path().join("bare.json");
        let mut sidecar = DirectoryBulkStore::new(bulk_dir_for(&json_path));
        let options = EncodeOptions::new().with_bulk_data_threshold(100);
        let json = codec::encode_dataset(&dataset, &options, Some(&mut sidecar)).unwrap();
        fs::write(&json_path, persistence::to_pretty_vec(&json).unwrap()).unwrap();

        assert_eq!(load_json_dataset(&json_path).unwrap(), dataset);
    }

    #[test]
    fn test_to_annotated_dataset_with_options() {
        let dir = tempfile::tempdir().unwrap();
        let input = ct_file(dir.path());
        let target = dir.path().join("out.json");

        let options = ConvertOptions::new()
            .with_output_path(&target)
            .with_description("thorax fixture")
            .with_replace_pixel_data(true);
        assert_eq!(to_annotated_dataset(&input, &options).unwrap(), target);

        let annotated = from_annotated_file(&target).unwrap();
        assert_eq!(annotated.description(), "thorax fixture");
        let rows = annotated.dataset().value(tags::ROWS).unwrap();
        assert_eq!(rows, &Value::from(32i64));
        assert_eq!(annotated.dataset().element(tags::PIXEL_DATA).unwrap().vr, Vr::OW);
    }

    #[test]
    fn test_failed_conversion_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.dcm");
        fs::write(&input, b"not a dicom file").unwrap();

        let err = to_annotated_dataset(&input, &ConvertOptions::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Part10);
        assert!(!default_output_path(&input).exists());

        let err = to_annotated_dataset(&dir.path().join("missing.dcm"), &ConvertOptions::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_annotated_to_dicom_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let input = ct_file(dir.path());
        let json = to_annotated_dataset(&input, &ConvertOptions::new()).unwrap();

        let output = annotated_to_dicom(&json, None).unwrap();
        assert_eq!(output, dir.path().join("ct_template.dcm"));
        assert_eq!(read_dicom(&output).unwrap(), read_dicom(&input).unwrap());
    }

    #[test]
    fn test_bare_json_to_dicom() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = generate::quick_dataset([("PatientID", "1234"), ("PatientName", "Doe^Jane")]).unwrap();
        let json = dir.path().join("bare.json");
        let mut file = fs::File::create(&json).unwrap();
        persistence::save_dataset(&dataset, &mut file).unwrap();
        drop(file);

        let output = dir.path().join("explicit.dcm");
        assert_eq!(annotated_to_dicom(&json, Some(&output)).unwrap(), output);
        let read = read_dicom(&output).unwrap();
        assert_eq!(read.string(tags::PATIENT_ID), Some("1234"));
        assert!(read.contains(tags::TRANSFER_SYNTAX_UID));
    }

    #[test]
    fn test_dataset_to_annotated() {
        let dataset = generate::ct_template().unwrap().base().clone();
        let annotated = dataset_to_annotated(dataset.clone(), false, "kept").unwrap();
        assert_eq!(annotated.dataset(), &dataset);
        assert_eq!(annotated.description(), "kept");

        let replaced = dataset_to_annotated(dataset.clone(), true, CONVERTED_DESCRIPTION).unwrap();
        assert_ne!(replaced.dataset().pixel_data(), dataset.pixel_data());
    }

    #[test]
    fn test_generate_ct_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("generated");
        let mut rng = StdRng::seed_from_u64(3);
        let paths = generate_ct_files(&target, 3, &mut rng).unwrap();

        assert_eq!(paths.len(), 3);
        assert_eq!(paths[2], target.join("dcmfile2"));
        let last = read_dicom(&paths[2]).unwrap();
        assert_eq!(last.get("InstanceNumber").unwrap().unwrap().value.as_str(), Some("3"));
        let first = read_dicom(&paths[0]).unwrap();
        assert_ne!(first.string(tags::SOP_INSTANCE_UID), last.string(tags::SOP_INSTANCE_UID));
    }
}
