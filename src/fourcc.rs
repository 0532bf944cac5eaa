//! FOURCC packing and unpacking.
//!
//! Capture backends report codec and pixel-format identifiers as 32-bit
//! integers packing four ASCII bytes, least-significant byte first (so
//! `"MJPG"` packs with `'M'` in the low byte). These helpers convert between
//! the packed form and the readable four-character string.

/// Unpack a FOURCC integer into its four-character ASCII string.
///
/// Bytes are taken least-significant first. Non-printable bytes are mapped to
/// `'?'` so a zero or garbage property value still renders harmlessly.
///
/// # Example
///
/// ```
/// use framepoll::fourcc::{decode_fourcc, encode_fourcc};
///
/// let packed = encode_fourcc(b"MJPG");
/// assert_eq!(decode_fourcc(packed), "MJPG");
/// ```
pub fn decode_fourcc(packed: u32) -> String {
    (0..4)
        .map(|shift| {
            let byte = ((packed >> (8 * shift)) & 0xFF) as u8;
            if byte.is_ascii_graphic() || byte == b' ' {
                byte as char
            } else {
                '?'
            }
        })
        .collect()
}

/// Pack four ASCII bytes into a FOURCC integer, least-significant byte first.
pub fn encode_fourcc(code: &[u8; 4]) -> u32 {
    code.iter()
        .rev()
        .fold(0u32, |packed, &byte| (packed << 8) | u32::from(byte))
}
