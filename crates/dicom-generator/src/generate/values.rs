//! Mock values for every VR.
//!
//! Values are valid for their VR and reproducible for a seeded RNG. Fixed
//! strings are used where a recognisable marker is more useful than noise.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::generate::uid;
use crate::model::{Tag, Value, Vr};
use crate::util::datetime::{date_to_days, format_da, format_dt, format_tm};

const LAST_NAMES: &[&str] = &[
    "Jansen", "de Vries", "van den Berg", "van Dijk", "Bakker", "Janssen", "Visser", "Smit",
    "Meijer", "de Boer", "Mulder", "de Groot", "Bos", "Vos", "Peters", "Hendriks", "van Leeuwen",
    "Dekker", "Brouwer", "de Wit", "Dijkstra", "Smits", "de Graaf", "van der Meer",
];

const FIRST_NAMES: &[&str] = &[
    "Daan", "Sem", "Lucas", "Milan", "Levi", "Luuk", "Bram", "Thijs", "Sanne", "Emma", "Julia",
    "Tess", "Sophie", "Lotte", "Anna", "Fleur", "Noor", "Sep", "Jesse", "Femke", "Maud", "Ruben",
];

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi", "aliquip",
    "commodo", "consequat", "duis", "aute", "irure", "reprehenderit", "voluptate", "velit",
];

/// Maximum length of an LO value.
const LO_MAX_LEN: usize = 64;

/// Maximum length of an LT value.
const LT_MAX_LEN: usize = 10_240;

/// A mock value for `vr`.
pub fn mock_value(vr: Vr, rng: &mut impl Rng) -> Value {
    match vr {
        Vr::AE => Value::text("MockEntity"),
        Vr::AS => Value::text(format!("{:03}Y", rng.gen_range(0..=120))),
        Vr::AT => Value::from(Tag::new(0x0010, 0x0010)),
        Vr::CS => Value::text("MOCK_123_CODE"),
        Vr::DA => Value::text(dicom_date(rng)),
        Vr::DS => Value::text("+10.4"),
        Vr::DT => Value::text(dicom_datetime(rng)),
        Vr::FL => Value::from(1.1),
        Vr::FD => Value::from(1.123),
        Vr::IS => Value::text(rng.gen_range(i32::MIN..=i32::MAX).to_string()),
        Vr::LO => Value::text(truncate(sentence(rng), LO_MAX_LEN)),
        Vr::LT => Value::text(truncate(paragraph(rng), LT_MAX_LEN)),
        Vr::OB => Value::Bytes(b"\x13\x00".to_vec()),
        Vr::OD => Value::Bytes(b"MockDoubleString".to_vec()),
        Vr::OF => Value::Bytes(b"MockFloatString\0".to_vec()),
        Vr::OL => Value::Bytes(b"MockOtherLong\0\0\0".to_vec()),
        Vr::OV => Value::Bytes(b"MockOtherVeryLong\0\0\0\0\0\0\0".to_vec()),
        Vr::OW => Value::Bytes(b"MockOtherWordString\0".to_vec()),
        Vr::PN => Value::text(person_name(rng)),
        Vr::SH => Value::text("MockShortString"),
        Vr::SL => Value::from(i64::from(rng.gen_range(i32::MIN..=i32::MAX))),
        Vr::SQ => Value::Sequence(Vec::new()),
        Vr::SS => Value::from(i64::from(rng.gen_range(i16::MIN..=i16::MAX))),
        Vr::ST => Value::text(sentence(rng)),
        Vr::SV => Value::from(rng.gen_range(i64::MIN..=i64::MAX)),
        Vr::TM => Value::text(dicom_time(rng)),
        Vr::UC => Value::text("MockUnlimitedCharacters"),
        Vr::UI => Value::text(uid::generate_uid(rng)),
        Vr::UL => Value::from(rng.gen_range(0..=1i64 << 31)),
        Vr::UN => Value::Bytes(b"MockUnknown\0".to_vec()),
        Vr::UR => Value::text("http://example.com/mock"),
        Vr::US => Value::from(rng.gen_range(0..=1i64 << 15)),
        Vr::UT => Value::text(paragraph(rng)),
        Vr::UV => Value::from(rng.gen_range(0..=i64::MAX)),
    }
}

/// A Dutch-style person name marked as a test name, like `BakkerTest^Sanne`.
pub fn person_name(rng: &mut impl Rng) -> String {
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Doe");
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Jane");
    format!("{last}Test^{first}")
}

/// First and last day, inclusive, of generated dates.
fn date_range() -> (i32, i32) {
    (date_to_days(2008, 1, 1), date_to_days(2013, 4, 16))
}

/// A DA value between 2008-01-01 and 2013-04-16.
pub fn dicom_date(rng: &mut impl Rng) -> String {
    let (start, end) = date_range();
    format_da(rng.gen_range(start..=end))
}

/// A TM value with millisecond fraction, like `143502.123`.
pub fn dicom_time(rng: &mut impl Rng) -> String {
    format_tm(
        rng.gen_range(0..=23),
        rng.gen_range(0..=59),
        rng.gen_range(0..=59),
        rng.gen_range(100..=999),
    )
}

/// A DT value made from a generated date and time.
pub fn dicom_datetime(rng: &mut impl Rng) -> String {
    let (start, end) = date_range();
    format_dt(
        rng.gen_range(start..=end),
        rng.gen_range(0..=23),
        rng.gen_range(0..=59),
        rng.gen_range(0..=59),
        rng.gen_range(100..=999),
    )
}

/// A capitalised lorem ipsum sentence ending in a full stop.
pub fn sentence(rng: &mut impl Rng) -> String {
    let count = rng.gen_range(4..=10);
    let mut out = String::new();
    for i in 0..count {
        let word = WORDS.choose(rng).copied().unwrap_or("lorem");
        if i == 0 {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        } else {
            out.push(' ');
            out.push_str(word);
        }
    }
    out.push('.');
    out
}

/// A few sentences.
pub fn paragraph(rng: &mut impl Rng) -> String {
    let count = rng.gen_range(3..=6);
    (0..count)
        .map(|_| sentence(rng))
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate(mut s: String, max: usize) -> String {
    if s.len() > max {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::datetime::{parse_da, parse_tm};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_every_vr_fits() {
        let mut rng = StdRng::seed_from_u64(1);
        for vr in Vr::ALL {
            let value = mock_value(vr, &mut rng);
            assert!(value.fits(vr), "{vr}: {value:?}");
        }
    }

    #[test]
    fn test_fixed_values() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(mock_value(Vr::AE, &mut rng), Value::text("MockEntity"));
        assert_eq!(mock_value(Vr::CS, &mut rng), Value::text("MOCK_123_CODE"));
        assert_eq!(mock_value(Vr::DS, &mut rng), Value::text("+10.4"));
        assert_eq!(mock_value(Vr::OB, &mut rng), Value::Bytes(vec![0x13, 0x00]));
        assert_eq!(mock_value(Vr::SQ, &mut rng), Value::Sequence(Vec::new()));
    }

    #[test]
    fn test_even_length_payloads() {
        let mut rng = StdRng::seed_from_u64(1);
        for vr in [Vr::OB, Vr::OD, Vr::OF, Vr::OL, Vr::OV, Vr::OW, Vr::UN] {
            let value = mock_value(vr, &mut rng);
            let len = value.as_bytes().map(<[u8]>::len).unwrap_or(0);
            assert_eq!(len % 2, 0, "{vr}");
        }
    }

    #[test]
    fn test_dates_and_times() {
        let mut rng = StdRng::seed_from_u64(3);
        let (start, end) = date_range();
        for _ in 0..200 {
            let days = parse_da(&dicom_date(&mut rng)).unwrap();
            assert!((start..=end).contains(&days));
            assert!(parse_tm(&dicom_time(&mut rng)).is_ok());
            let dt = dicom_datetime(&mut rng);
            assert_eq!(dt.len(), 18);
            assert!(parse_da(&dt[..8]).is_ok());
            assert!(parse_tm(&dt[8..]).is_ok());
        }
    }

    #[test]
    fn test_person_name() {
        let mut rng = StdRng::seed_from_u64(5);
        let name = person_name(&mut rng);
        let (last, first) = name.split_once('^').unwrap();
        assert!(last.ends_with("Test"));
        assert!(!first.is_empty());
    }

    #[test]
    fn test_text_lengths() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let lo = mock_value(Vr::LO, &mut rng);
            assert!(lo.as_str().unwrap().len() <= LO_MAX_LEN);
            let age = mock_value(Vr::AS, &mut rng);
            let age = age.as_str().unwrap();
            assert_eq!(age.len(), 4);
            assert!(age.ends_with('Y'));
        }
    }

    #[test]
    fn test_reproducible() {
        let a: Vec<Value> = Vr::ALL
            .iter()
            .map(|&vr| mock_value(vr, &mut StdRng::seed_from_u64(11)))
            .collect();
        let b: Vec<Value> = Vr::ALL
            .iter()
            .map(|&vr| mock_value(vr, &mut StdRng::seed_from_u64(11)))
            .collect();
        assert_eq!(a, b);
    }
}
