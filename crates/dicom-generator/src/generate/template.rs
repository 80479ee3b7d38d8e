//! Dataset templates and the built-in CT template.

use rand::Rng;
use serde_json::Value as JsonValue;

use crate::codec::{self, part10::CT_IMAGE_STORAGE};
use crate::error::{DecodeError, LookupError};
use crate::generate::{uid, values};
use crate::model::{Dataset, DatasetBuilder, TagLike, Value};

/// A base dataset that generated datasets start from.
///
/// Overrides replace template values through the field resolver; an
/// overridden field keeps the template's VR.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetTemplate {
    base: Dataset,
}

impl DatasetTemplate {
    pub fn new(base: Dataset) -> Self {
        Self { base }
    }

    /// Loads a template from a bare DICOM-JSON dataset.
    pub fn from_json(json: &JsonValue) -> Result<Self, DecodeError> {
        Ok(Self::new(codec::from_json(json)?))
    }

    pub fn base(&self) -> &Dataset {
        &self.base
    }

    /// A copy of the base with `overrides` applied in order.
    ///
    /// # Errors
    ///
    /// Fails on the first override that does not resolve, or that names a
    /// field absent from both the template and the dictionary.
    pub fn generate<K, V>(&self, overrides: impl IntoIterator<Item = (K, V)>) -> Result<Dataset, LookupError>
    where
        K: TagLike,
        V: Into<Value>,
    {
        let mut dataset = self.base.clone();
        for (key, value) in overrides {
            dataset.put(key, value)?;
        }
        Ok(dataset)
    }
}

/// The CT template: a single-slice axial CT image with a small 16x16
/// signed 16-bit pixel payload.
///
/// # Errors
///
/// Fails when a template keyword has no dictionary entry.
pub fn ct_template() -> Result<DatasetTemplate, LookupError> {
    let rows = 16u16;
    let columns = 16u16;
    let pixels: Vec<u8> = (0..rows * columns)
        .flat_map(|i| ((i as i16 % 64) * 16 - 512).to_le_bytes())
        .collect();

    let base = DatasetBuilder::new()
        .text("SpecificCharacterSet", "ISO_IR 100")
        .value("ImageType", ["ORIGINAL", "PRIMARY", "AXIAL"])
        .text("SOPClassUID", CT_IMAGE_STORAGE)
        .text("SOPInstanceUID", "1.2.826.0.1.3680043.10.1006.1")
        .text("StudyDate", "20110101")
        .text("SeriesDate", "20110101")
        .text("AcquisitionDate", "20110101")
        .text("ContentDate", "20110101")
        .text("StudyTime", "120000.000")
        .text("SeriesTime", "120000.000")
        .text("AcquisitionTime", "120000.000")
        .text("ContentTime", "120000.000")
        .text("AccessionNumber", "1234")
        .text("Modality", "CT")
        .text("Manufacturer", "TOSHIBA")
        .text("InstitutionName", "Mock Hospital")
        .empty("ReferringPhysicianName")
        .text("StationName", "CTSTATION1")
        .text("StudyDescription", "CT Thorax")
        .text("SeriesDescription", "Thorax 1.0 CE")
        .text("ManufacturerModelName", "Aquilion")
        .text("PatientName", "Doe^John")
        .text("PatientID", "1234567")
        .text("PatientBirthDate", "19700101")
        .text("PatientSex", "O")
        .text("PatientAge", "041Y")
        .text("PatientIdentityRemoved", "NO")
        .text("BodyPartExamined", "CHEST")
        .text("ScanOptions", "HELICAL_CT")
        .text("SliceThickness", "1.0")
        .text("KVP", "120")
        .text("DataCollectionDiameter", "500.00")
        .text("SoftwareVersions", "V4.51ER010")
        .text("ProtocolName", "Thorax")
        .text("ReconstructionDiameter", "400.00")
        .text("GantryDetectorTilt", "+0.0")
        .text("TableHeight", "+127.50")
        .text("RotationDirection", "CW")
        .text("ExposureTime", "500")
        .text("XRayTubeCurrent", "200")
        .text("Exposure", "100")
        .text("FilterType", "LARGE")
        .text("ConvolutionKernel", "FC08")
        .text("PatientPosition", "FFS")
        .float("SpiralPitchFactor", 0.813)
        .text("StudyInstanceUID", "1.2.826.0.1.3680043.10.1006.2")
        .text("SeriesInstanceUID", "1.2.826.0.1.3680043.10.1006.3")
        .text("StudyID", "1")
        .text("SeriesNumber", "2")
        .text("AcquisitionNumber", "1")
        .text("InstanceNumber", "1")
        .value("ImagePositionPatient", ["-199.609", "-372.109", "-64.000"])
        .value("ImageOrientationPatient", ["1.000", "0.000", "0.000", "0.000", "1.000", "0.000"])
        .text("FrameOfReferenceUID", "1.2.826.0.1.3680043.10.1006.4")
        .empty("PositionReferenceIndicator")
        .text("SliceLocation", "-64.000")
        .int("SamplesPerPixel", 1)
        .text("PhotometricInterpretation", "MONOCHROME2")
        .int("Rows", i64::from(rows))
        .int("Columns", i64::from(columns))
        .value("PixelSpacing", ["0.781", "0.781"])
        .int("BitsAllocated", 16)
        .int("BitsStored", 16)
        .int("HighBit", 15)
        .int("PixelRepresentation", 1)
        .value("WindowCenter", ["40", "-600"])
        .value("WindowWidth", ["400", "1500"])
        .text("RescaleIntercept", "0")
        .text("RescaleSlope", "1")
        .text("RescaleType", "HU")
        .text("LossyImageCompression", "00")
        .empty("RequestingPhysician")
        .text("ScheduledProcedureStepStartDate", "20110101")
        .text("ScheduledProcedureStepStartTime", "120000.000")
        .text("ScheduledProcedureStepEndDate", "20110101")
        .text("ScheduledProcedureStepEndTime", "120000.000")
        .text("PerformedProcedureStepEndDate", "20110101")
        .text("PerformedProcedureStepEndTime", "120000.000")
        .bytes("PixelData", pixels)
        .build()?;
    Ok(DatasetTemplate::new(base))
}

/// Generates a CT dataset from the built-in template.
///
/// Study, series, acquisition and content dates share one random date, and
/// their times one random time; scheduled step times are drawn separately.
/// The patient name and the instance, study, series and frame of reference
/// UIDs are fresh. `overrides` are applied last.
pub fn ct_dataset<K, V>(
    rng: &mut impl Rng,
    overrides: impl IntoIterator<Item = (K, V)>,
) -> Result<Dataset, LookupError>
where
    K: TagLike,
    V: Into<Value>,
{
    let date = values::dicom_date(rng);
    let time = values::dicom_time(rng);

    let generated: Vec<(&str, Value)> = vec![
        ("AccessionNumber", Value::text("1234")),
        ("StudyDate", Value::text(&date)),
        ("SeriesDate", Value::text(&date)),
        ("AcquisitionDate", Value::text(&date)),
        ("ContentDate", Value::text(&date)),
        ("ScheduledProcedureStepStartDate", Value::text(&date)),
        ("ScheduledProcedureStepEndDate", Value::text(&date)),
        ("PerformedProcedureStepEndDate", Value::text(&date)),
        ("StudyTime", Value::text(&time)),
        ("SeriesTime", Value::text(&time)),
        ("AcquisitionTime", Value::text(&time)),
        ("ContentTime", Value::text(&time)),
        ("ScheduledProcedureStepStartTime", Value::text(values::dicom_time(rng))),
        ("ScheduledProcedureStepEndTime", Value::text(values::dicom_time(rng))),
        ("PerformedProcedureStepEndTime", Value::text(&time)),
        ("PatientName", Value::text(values::person_name(rng))),
        ("SOPInstanceUID", Value::text(uid::generate_uid(rng))),
        ("StudyInstanceUID", Value::text(uid::generate_uid(rng))),
        ("SeriesInstanceUID", Value::text(uid::generate_uid(rng))),
        ("FrameOfReferenceUID", Value::text(uid::generate_uid(rng))),
        ("PatientIdentityRemoved", Value::text("NO")),
    ];

    let mut dataset = ct_template()?.generate(generated)?;
    for (key, value) in overrides {
        dataset.put(key, value)?;
    }
    Ok(dataset)
}
