//! PDF text string encoding (ISO 32000-1 §7.9.2.2)

use lopdf::{Object, StringFormat};

const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// PDFDocEncoding code points for 0x80..=0x9F; the rest of the table
/// coincides with Latin-1.
const PDFDOC_HIGH: [char; 32] = [
    '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}', '\u{2044}',
    '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}', '\u{201D}', '\u{2018}',
    '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}', '\u{0141}', '\u{0152}', '\u{0160}',
    '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}', '\u{0153}', '\u{0161}', '\u{017E}', '\u{FFFD}',
];

/// Decode a PDF text string (UTF-16BE with BOM, UTF-8 with BOM, or PDFDocEncoding)
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&UTF16BE_BOM) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = bytes.strip_prefix(&UTF8_BOM) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => PDFDOC_HIGH[(b - 0x80) as usize],
            0xA0 => '\u{20AC}',
            _ => b as char,
        })
        .collect()
}

/// Encode `value` as a PDF text string object
///
/// ASCII stays a literal string; anything else is written as UTF-16BE with
/// a byte order mark.
pub fn encode_text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::String(value.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = UTF16BE_BOM.to_vec();
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Best-effort string view of a field value object
pub fn object_to_text(object: &Object) -> Option<String> {
    match object {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Integer(i) => Some(i.to_string()),
        Object::Real(r) => Some(r.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        Object::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(object_to_text).collect();
            Some(parts.join(", "))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_round_trip() {
        let object = encode_text_string("Andes SCD SpA");
        match &object {
            Object::String(bytes, StringFormat::Literal) => {
                assert_eq!(bytes.as_slice(), b"Andes SCD SpA")
            }
            other => panic!("unexpected object {other:?}"),
        }
        assert_eq!(object_to_text(&object).as_deref(), Some("Andes SCD SpA"));
    }

    #[test]
    fn test_non_ascii_uses_utf16() {
        let object = encode_text_string("María José");
        match &object {
            Object::String(bytes, _) => {
                assert_eq!(&bytes[..2], &[0xFE, 0xFF]);
                assert_eq!(decode_text_string(bytes), "María José");
            }
            other => panic!("unexpected object {other:?}"),
        }
    }

    #[test]
    fn test_pdfdoc_decoding() {
        assert_eq!(decode_text_string(b"Caf\xE9"), "Café");
        assert_eq!(decode_text_string(&[0x80, 0x41, 0xA0]), "\u{2022}A\u{20AC}");
    }

    #[test]
    fn test_utf8_bom_decoding() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("Ñuñoa".as_bytes());
        assert_eq!(decode_text_string(&bytes), "Ñuñoa");
    }

    #[test]
    fn test_object_to_text_variants() {
        assert_eq!(object_to_text(&Object::Name(b"Yes".to_vec())).as_deref(), Some("Yes"));
        assert_eq!(object_to_text(&Object::Integer(7)).as_deref(), Some("7"));
        assert_eq!(object_to_text(&Object::Null), None);
    }
}
