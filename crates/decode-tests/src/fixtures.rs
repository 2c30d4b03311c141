//! Synthetic tag and profile builders
//!
//! Byte layouts follow ICC.1:2022; only the fields the decoder reads are
//! filled in.

use iccschema_core::HEADER_SIZE;

/// s15Fixed16 encoding of `v`
pub fn s15(v: f64) -> [u8; 4] {
    ((v * 65536.0).round() as i32).to_be_bytes()
}

fn type_prefix(sig: &[u8; 4]) -> Vec<u8> {
    let mut data = sig.to_vec();
    data.extend_from_slice(&[0; 4]);
    data
}

/// `XYZ ` tag holding one value
pub fn xyz_tag(xyz: [f64; 3]) -> Vec<u8> {
    let mut data = type_prefix(b"XYZ ");
    for v in xyz {
        data.extend_from_slice(&s15(v));
    }
    data
}

/// `sf32` tag holding a row-major 3x3 matrix
pub fn sf32_tag(matrix: [[f64; 3]; 3]) -> Vec<u8> {
    let mut data = type_prefix(b"sf32");
    for v in matrix.iter().flatten() {
        data.extend_from_slice(&s15(*v));
    }
    data
}

/// `mluc` tag; entries are (language, region, text)
pub fn mluc_tag(entries: &[(&str, &str, &str)]) -> Vec<u8> {
    let encoded: Vec<Vec<u8>> = entries
        .iter()
        .map(|(_, _, text)| text.encode_utf16().flat_map(u16::to_be_bytes).collect())
        .collect();

    let mut data = type_prefix(b"mluc");
    data.extend_from_slice(&(entries.len() as u32).to_be_bytes());
    data.extend_from_slice(&12u32.to_be_bytes());

    let mut string_offset = 16 + entries.len() * 12;
    for ((lang, region, _), text) in entries.iter().zip(&encoded) {
        data.extend_from_slice(&lang.as_bytes()[..2]);
        data.extend_from_slice(&region.as_bytes()[..2]);
        data.extend_from_slice(&(text.len() as u32).to_be_bytes());
        data.extend_from_slice(&(string_offset as u32).to_be_bytes());
        string_offset += text.len();
    }
    for text in &encoded {
        data.extend_from_slice(text);
    }
    data
}

/// Version 2 `desc` tag with an ASCII description and empty Unicode and
/// ScriptCode parts
pub fn desc_tag(ascii: &str) -> Vec<u8> {
    let mut data = type_prefix(b"desc");
    data.extend_from_slice(&(ascii.len() as u32 + 1).to_be_bytes());
    data.extend_from_slice(ascii.as_bytes());
    data.push(0);
    // Unicode language code and count, ScriptCode code, count and 67 bytes
    data.extend_from_slice(&[0; 8]);
    data.extend_from_slice(&[0; 3]);
    data.extend_from_slice(&[0; 67]);
    data
}

/// Profile with a header and a tag table, tags 4-byte aligned
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    date: [u16; 6],
    color_space: [u8; 4],
    tags: Vec<([u8; 4], Vec<u8>)>,
}

impl Default for ProfileBuilder {
    fn default() -> Self {
        Self {
            date: [2025, 7, 18, 15, 34, 52],
            color_space: *b"RGB ",
            tags: Vec::new(),
        }
    }
}

impl ProfileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creation date as year, month, day, hours, minutes, seconds
    pub fn date(mut self, date: [u16; 6]) -> Self {
        self.date = date;
        self
    }

    pub fn color_space(mut self, sig: [u8; 4]) -> Self {
        self.color_space = sig;
        self
    }

    pub fn tag(mut self, sig: [u8; 4], data: Vec<u8>) -> Self {
        self.tags.push((sig, data));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let table_size = 4 + self.tags.len() * 12;
        let mut data = vec![0u8; HEADER_SIZE + table_size];

        data[8] = 4;
        data[9] = 0x40;
        data[12..16].copy_from_slice(b"mntr");
        data[16..20].copy_from_slice(&self.color_space);
        data[20..24].copy_from_slice(b"XYZ ");
        for (i, part) in self.date.iter().enumerate() {
            data[24 + i * 2..26 + i * 2].copy_from_slice(&part.to_be_bytes());
        }
        data[36..40].copy_from_slice(b"acsp");
        data[68..72].copy_from_slice(&s15(0.9642));
        data[72..76].copy_from_slice(&s15(1.0));
        data[76..80].copy_from_slice(&s15(0.8249));
        data[HEADER_SIZE..HEADER_SIZE + 4].copy_from_slice(&(self.tags.len() as u32).to_be_bytes());

        for (i, (sig, tag)) in self.tags.iter().enumerate() {
            while data.len() % 4 != 0 {
                data.push(0);
            }
            let entry = HEADER_SIZE + 4 + i * 12;
            let offset = data.len() as u32;
            data[entry..entry + 4].copy_from_slice(sig);
            data[entry + 4..entry + 8].copy_from_slice(&offset.to_be_bytes());
            data[entry + 8..entry + 12].copy_from_slice(&(tag.len() as u32).to_be_bytes());
            data.extend_from_slice(tag);
        }

        let size = data.len() as u32;
        data[0..4].copy_from_slice(&size.to_be_bytes());
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mluc_layout() {
        let tag = mluc_tag(&[("en", "US", "Hi")]);
        assert_eq!(tag.len(), 32);
        assert_eq!(&tag[16..20], b"enUS");
        assert_eq!(&tag[24..28], &28u32.to_be_bytes());
        assert_eq!(&tag[28..], &[0x00, b'H', 0x00, b'i']);
    }

    #[test]
    fn test_profile_size_recorded() {
        let profile = ProfileBuilder::new().tag(*b"wtpt", xyz_tag([1.0; 3])).build();
        let size = u32::from_be_bytes([profile[0], profile[1], profile[2], profile[3]]);
        assert_eq!(size as usize, profile.len());
    }
}
