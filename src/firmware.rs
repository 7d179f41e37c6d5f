// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::ErrorKind;
use std::path::Path;
use bytes::Buf;

use crate::{error::BuildError, util};

pub const WORD_SIZE: usize = 4;

/// Firmware packed into little-endian ROM words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirmwareImage {
    pub words: Vec<u32>,
    pub byte_length: usize,
    pub source_present: bool,
}

impl FirmwareImage {
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            words: words_from_bytes(data),
            byte_length: data.len(),
            source_present: true,
        }
    }

    pub fn absent() -> Self {
        Self::default()
    }
}

/// Packs bytes into words, file order, little-endian. A short tail is
/// zero-extended on its high end.
pub fn words_from_bytes(mut data: &[u8]) -> Vec<u32> {
    let mut words = Vec::with_capacity(util::round_up(data.len(), WORD_SIZE) / WORD_SIZE);

    while data.remaining() >= WORD_SIZE {
        words.push(data.get_u32_le());
    }

    if data.has_remaining() {
        let n = data.remaining();
        words.push(data.get_uint_le(n) as u32);
    }

    words
}

/// Loads `path`. A missing file is not an error: it yields an empty image
/// and a warning. Any other io failure is fatal.
pub fn load(path: &Path) -> Result<FirmwareImage, BuildError> {
    match util::read_file(path) {
        Ok(data) => {
            let image = FirmwareImage::from_bytes(&data);
            info!("Loaded {} bytes ({} words) from {}",
                image.byte_length, image.words.len(), path.display());
            Ok(image)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("{} not found, generating empty ROM", path.display());
            Ok(FirmwareImage::absent())
        }
        Err(source) => Err(BuildError::FirmwareUnreadable { path: path.into(), source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_bytes_pack_in_order() {
        let words = words_from_bytes(&[0x78, 0x56, 0x34, 0x12, 0xef, 0xbe, 0xad, 0xde]);
        assert_eq!(words, vec![0x1234_5678, 0xdead_beef]);
    }

    #[test]
    fn short_tail_is_zero_extended() {
        assert_eq!(words_from_bytes(b"\x01\x02\x03\x04\x05\x06"), vec![0x0403_0201, 0x0000_0006]);
        assert_eq!(words_from_bytes(&[0xaa]), vec![0xaa]);
        assert_eq!(words_from_bytes(&[0xaa, 0xbb, 0xcc]), vec![0x00cc_bbaa]);
    }

    #[test]
    fn word_count_covers_every_byte() {
        for len in 0..=17usize {
            let data: Vec<u8> = (0..len as u8).collect();
            let words = words_from_bytes(&data);
            assert_eq!(words.len(), (len + 3) / 4);
            assert!(words.len() * 4 >= len);
            assert!(words.len() * 4 - len < 4);
        }
    }

    #[test]
    fn empty_input() {
        assert!(words_from_bytes(&[]).is_empty());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("firmware.bin");
        std::fs::write(&path, [0x13, 0x00, 0x00, 0x00, 0x6f]).unwrap();

        let image = load(&path).unwrap();
        assert!(image.source_present);
        assert_eq!(image.byte_length, 5);
        assert_eq!(image.words, vec![0x13, 0x6f]);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let image = load(&dir.path().join("nope.bin")).unwrap();
        assert_eq!(image, FirmwareImage::absent());
        assert!(!image.source_present);
    }

    #[test]
    fn load_directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path()).unwrap_err();
        assert!(matches!(err, BuildError::FirmwareUnreadable { .. }));
    }
}
