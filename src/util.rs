// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::prelude::*;
use std::path::Path;
use anyhow::{Context, Result};

pub fn round_up(n: usize, boundary: usize) -> usize {
    ((n + boundary - 1) / boundary) * boundary
}

/// Reads a whole file, keeping the raw io error so callers can tell
/// a missing file from an unreadable one.
pub fn read_file(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = std::fs::File::open(path)?;

    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;

    Ok(buf)
}

pub fn read_file_str(path: &Path) -> Result<String> {
    let content = read_file(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let str = String::from_utf8(content)
        .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
    Ok(str)
}

pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_up_to_word() {
        assert_eq!(round_up(0, 4), 0);
        assert_eq!(round_up(1, 4), 4);
        assert_eq!(round_up(4, 4), 4);
        assert_eq!(round_up(7, 4), 8);
    }

    #[test]
    fn write_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.txt");
        write_file(&path, b"hi").unwrap();
        assert_eq!(read_file(&path).unwrap(), b"hi");
    }
}
