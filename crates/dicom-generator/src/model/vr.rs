//! Value representations (the DICOM data type of a field).

use std::fmt;
use std::str::FromStr;

use crate::error::LookupError;

/// A DICOM value representation.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Vr {
    AE,
    AS,
    AT,
    CS,
    DA,
    DS,
    DT,
    FL,
    FD,
    IS,
    LO,
    LT,
    OB,
    OD,
    OF,
    OL,
    OV,
    OW,
    PN,
    SH,
    SL,
    SQ,
    SS,
    ST,
    SV,
    TM,
    UC,
    UI,
    UL,
    UN,
    UR,
    US,
    UT,
    UV,
}

/// How values of a VR are coerced into and out of text.
///
/// Every VR belongs to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VrKind {
    /// Plain character strings, including dates, times and UIDs.
    Text,
    /// Person names: up to three `=`-separated component groups.
    PersonName,
    /// Decimal and integer strings (DS, IS).
    NumberText,
    /// Binary integers.
    Integer,
    /// Binary floating point.
    Float,
    /// Attribute tag pairs.
    AttributeTag,
    /// Opaque bytes.
    Binary,
    /// Nested datasets.
    Sequence,
}

impl Vr {
    /// Every supported VR.
    pub const ALL: [Vr; 34] = [
        Vr::AE, Vr::AS, Vr::AT, Vr::CS, Vr::DA, Vr::DS, Vr::DT, Vr::FL, Vr::FD,
        Vr::IS, Vr::LO, Vr::LT, Vr::OB, Vr::OD, Vr::OF, Vr::OL, Vr::OV, Vr::OW,
        Vr::PN, Vr::SH, Vr::SL, Vr::SQ, Vr::SS, Vr::ST, Vr::SV, Vr::TM, Vr::UC,
        Vr::UI, Vr::UL, Vr::UN, Vr::UR, Vr::US, Vr::UT, Vr::UV,
    ];

    /// The two-letter code.
    pub fn code(self) -> &'static str {
        match self {
            Vr::AE => "AE",
            Vr::AS => "AS",
            Vr::AT => "AT",
            Vr::CS => "CS",
            Vr::DA => "DA",
            Vr::DS => "DS",
            Vr::DT => "DT",
            Vr::FL => "FL",
            Vr::FD => "FD",
            Vr::IS => "IS",
            Vr::LO => "LO",
            Vr::LT => "LT",
            Vr::OB => "OB",
            Vr::OD => "OD",
            Vr::OF => "OF",
            Vr::OL => "OL",
            Vr::OV => "OV",
            Vr::OW => "OW",
            Vr::PN => "PN",
            Vr::SH => "SH",
            Vr::SL => "SL",
            Vr::SQ => "SQ",
            Vr::SS => "SS",
            Vr::ST => "ST",
            Vr::SV => "SV",
            Vr::TM => "TM",
            Vr::UC => "UC",
            Vr::UI => "UI",
            Vr::UL => "UL",
            Vr::UN => "UN",
            Vr::UR => "UR",
            Vr::US => "US",
            Vr::UT => "UT",
            Vr::UV => "UV",
        }
    }

    /// The descriptive name from PS3.5 section 6.2.
    pub fn long_name(self) -> &'static str {
        match self {
            Vr::AE => "Application Entity",
            Vr::AS => "Age String",
            Vr::AT => "Attribute Tag",
            Vr::CS => "Code String",
            Vr::DA => "Date",
            Vr::DS => "Decimal String",
            Vr::DT => "Date Time",
            Vr::FL => "Floating Point Single",
            Vr::FD => "Floating Point Double",
            Vr::IS => "Integer String",
            Vr::LO => "Long String",
            Vr::LT => "Long Text",
            Vr::OB => "Other Byte String",
            Vr::OD => "Other Double String",
            Vr::OF => "Other Float String",
            Vr::OL => "Other Long",
            Vr::OV => "Other 64-bit Very Long",
            Vr::OW => "Other Word String",
            Vr::PN => "Person Name",
            Vr::SH => "Short String",
            Vr::SL => "Signed Long",
            Vr::SQ => "Sequence of Items",
            Vr::SS => "Signed Short",
            Vr::ST => "Short Text",
            Vr::SV => "Signed 64-bit Very Long",
            Vr::TM => "Time",
            Vr::UC => "Unlimited Characters",
            Vr::UI => "Unique Identifier (UID)",
            Vr::UL => "Unsigned Long",
            Vr::UN => "Unknown",
            Vr::UR => "Universal Resource Identifier",
            Vr::US => "Unsigned Short",
            Vr::UT => "Unlimited Text",
            Vr::UV => "Unsigned 64-bit Very Long",
        }
    }

    /// Looks up a VR by its two-letter code.
    ///
    /// # Errors
    ///
    /// [`LookupError::InvalidVr`] for an unrecognized code.
    pub fn from_code(code: &str) -> Result<Vr, LookupError> {
        Vr::ALL
            .iter()
            .copied()
            .find(|vr| vr.code() == code)
            .ok_or_else(|| LookupError::InvalidVr {
                code: code.to_string(),
            })
    }

    /// The coercion category of this VR.
    pub fn kind(self) -> VrKind {
        match self {
            Vr::PN => VrKind::PersonName,
            Vr::DS | Vr::IS => VrKind::NumberText,
            Vr::SL | Vr::SS | Vr::UL | Vr::US | Vr::SV | Vr::UV => VrKind::Integer,
            Vr::FL | Vr::FD => VrKind::Float,
            Vr::AT => VrKind::AttributeTag,
            Vr::OB | Vr::OD | Vr::OF | Vr::OL | Vr::OV | Vr::OW | Vr::UN => VrKind::Binary,
            Vr::SQ => VrKind::Sequence,
            _ => VrKind::Text,
        }
    }

    /// VRs which could reasonably hold random string contents.
    pub fn is_string_like(self) -> bool {
        matches!(
            self,
            Vr::LO | Vr::LT | Vr::PN | Vr::SH | Vr::ST | Vr::UI | Vr::UT | Vr::UC
        )
    }

    /// VRs which represent numbers, as text or binary.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Vr::DS
                | Vr::FD
                | Vr::FL
                | Vr::IS
                | Vr::OD
                | Vr::OF
                | Vr::SL
                | Vr::SS
                | Vr::UL
                | Vr::US
                | Vr::SV
                | Vr::UV
        )
    }

    /// VRs which represent dates and times.
    pub fn is_date_like(self) -> bool {
        matches!(self, Vr::DA | Vr::DT | Vr::TM)
    }

    /// VRs whose value is carried as raw bytes.
    pub fn is_bytes_like(self) -> bool {
        self.kind() == VrKind::Binary
    }

    /// Returns true for SQ.
    pub fn is_sequence(self) -> bool {
        self == Vr::SQ
    }

    /// Returns true for text VRs that never hold more than one value, so a
    /// backslash is content rather than a separator.
    pub fn is_single_valued_text(self) -> bool {
        matches!(self, Vr::LT | Vr::ST | Vr::UT | Vr::UR)
    }

    /// Explicit VR encoding uses a 4-byte length (after two reserved bytes)
    /// for these VRs and a 2-byte length for all others.
    pub fn has_long_length(self) -> bool {
        matches!(
            self,
            Vr::OB
                | Vr::OD
                | Vr::OF
                | Vr::OL
                | Vr::OV
                | Vr::OW
                | Vr::SQ
                | Vr::SV
                | Vr::UC
                | Vr::UN
                | Vr::UR
                | Vr::UT
                | Vr::UV
        )
    }

    /// Byte used to pad values to even length.
    pub fn padding(self) -> u8 {
        match self.kind() {
            VrKind::Binary => 0x00,
            _ if self == Vr::UI => 0x00,
            _ => b' ',
        }
    }

    /// Size in bytes of one binary number of this VR, if it is one.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            Vr::US | Vr::SS => Some(2),
            Vr::UL | Vr::SL | Vr::FL | Vr::AT => Some(4),
            Vr::FD | Vr::SV | Vr::UV => Some(8),
            _ => None,
        }
    }
}

impl fmt::Display for Vr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VR \"{}\" ({})", self.long_name(), self.code())
    }
}

impl FromStr for Vr {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Vr::from_code(s)
    }
}

macro_rules! vr_conversions {
    ($($vr:ident),* $(,)?) => {
        impl From<Vr> for dicom_core::VR {
            fn from(vr: Vr) -> Self {
                match vr {
                    $(Vr::$vr => dicom_core::VR::$vr,)*
                }
            }
        }

        impl From<dicom_core::VR> for Vr {
            #[allow(unreachable_patterns)]
            fn from(vr: dicom_core::VR) -> Self {
                match vr {
                    $(dicom_core::VR::$vr => Vr::$vr,)*
                    _ => Vr::UN,
                }
            }
        }
    };
}

vr_conversions!(
    AE, AS, AT, CS, DA, DS, DT, FL, FD, IS, LO, LT, OB, OD, OF, OL, OV, OW,
    PN, SH, SL, SQ, SS, ST, SV, TM, UC, UI, UL, UN, UR, US, UT, UV,
);
