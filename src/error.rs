// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("firmware {} exists but could not be read", .path.display())]
    FirmwareUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ROM init is {size} bytes (word aligned) but the ROM holds {capacity} bytes ({} bytes over)", .size - .capacity)]
    RomOverflow { size: u64, capacity: u64 },

    #[error("no bitstream was built in this run, refusing to program {}", .path.display())]
    ArtifactMissing { path: PathBuf },

    #[error("unrecognized board {0}")]
    UnknownBoard(String),

    #[error("CSR {0} is already registered")]
    DuplicateCsr(String),

    #[error("no CSR space left for {0}")]
    CsrSpaceFull(String),

    #[error("toolchain failed")]
    Toolchain(#[source] anyhow::Error),

    #[error("programmer failed")]
    Programmer(#[source] anyhow::Error),
}

impl BuildError {
    /// Bytes past the end of the ROM, for `RomOverflow`.
    pub fn overflow(&self) -> Option<u64> {
        match self {
            Self::RomOverflow { size, capacity } => Some(size - capacity),
            _ => None,
        }
    }
}
