// SPDX-License-Identifier: GPL-3.0-or-later

use serde::{Deserialize, Serialize};

use crate::{error::BuildError, firmware::WORD_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RomRegion {
    #[serde(default)]
    pub base: u32,
    #[serde(rename = "size")]
    pub capacity: u32,
}

impl RomRegion {
    pub const DEFAULT_CAPACITY: u32 = 0x8000;

    pub fn depth(&self) -> usize {
        self.capacity as usize / WORD_SIZE
    }
}

impl Default for RomRegion {
    fn default() -> Self {
        Self { base: 0x0000_0000, capacity: Self::DEFAULT_CAPACITY }
    }
}

/// Checks that `words` fit in `rom` and hands them back as the ROM initializer.
/// The rest of the ROM is zero-filled by whoever instantiates it.
pub fn build(words: Vec<u32>, rom: &RomRegion) -> Result<Vec<u32>, BuildError> {
    let size = (words.len() * WORD_SIZE) as u64;
    let capacity = rom.capacity as u64;

    if size > capacity {
        return Err(BuildError::RomOverflow { size, capacity });
    }

    debug!("ROM init uses {} of {} words at base=0x{:08x}", words.len(), rom.depth(), rom.base);
    Ok(words)
}
