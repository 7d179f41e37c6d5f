// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{rom::RomRegion, util::read_file_str};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Cpu {
    #[serde(rename = "type")]
    pub kind: String,
    pub variant: String,
}

impl Default for Cpu {
    fn default() -> Self {
        Self { kind: "vexriscv".into(), variant: "standard".into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Sram {
    pub size: u32,
}

impl Default for Sram {
    fn default() -> Self {
        Self { size: 0x2000 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolchainConfig {
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgrammerConfig {
    pub load_command: Option<Vec<String>>,
    pub flash_command: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: String,
    /// Board default when unset
    pub sys_clk_freq: Option<u32>,
    pub cpu: Cpu,
    pub rom: RomRegion,
    pub sram: Sram,
    pub with_led_chaser: bool,
    pub firmware: PathBuf,
    pub output_dir: PathBuf,
    pub toolchain: Option<ToolchainConfig>,
    pub programmer: Option<ProgrammerConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: "microphase_a7_lite".into(),
            sys_clk_freq: Some(50_000_000),
            cpu: Cpu::default(),
            rom: RomRegion::default(),
            sram: Sram::default(),
            with_led_chaser: false,
            firmware: "firmware.bin".into(),
            output_dir: "build".into(),
            toolchain: None,
            programmer: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        serde_yaml::from_str(&read_file_str(path)?)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn gateware_dir(&self) -> PathBuf {
        self.output_dir.join("gateware")
    }

    pub fn software_dir(&self) -> PathBuf {
        self.output_dir.join("software")
    }

    /// Where the toolchain leaves the bitstream.
    pub fn bitstream_path(&self) -> PathBuf {
        self.gateware_dir().join(format!("{}.bit", self.target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.target, "microphase_a7_lite");
        assert_eq!(config.rom, RomRegion { base: 0, capacity: 0x8000 });
        assert_eq!(config.sram.size, 0x2000);
        assert_eq!(config.cpu.variant, "standard");
        assert!(!config.with_led_chaser);
    }

    #[test]
    fn parse_overrides() {
        let config: Config = serde_yaml::from_str(r#"
target: digilent_arty
sys_clk_freq: 100000000
cpu:
  type: vexriscv
  variant: lite
rom:
  size: 16384
with_led_chaser: true
firmware: out/app.bin
programmer:
  load_command: [ecpprog, "-S", "{bitstream}"]
"#).unwrap();

        assert_eq!(config.target, "digilent_arty");
        assert_eq!(config.sys_clk_freq, Some(100_000_000));
        assert_eq!(config.cpu.variant, "lite");
        assert_eq!(config.rom.capacity, 0x4000);
        assert_eq!(config.rom.base, 0);
        assert!(config.with_led_chaser);
        assert_eq!(config.firmware, PathBuf::from("out/app.bin"));
        assert_eq!(config.programmer.unwrap().load_command.unwrap()[0], "ecpprog");
    }

    #[test]
    fn bitstream_path_follows_target() {
        let config = Config { output_dir: "out".into(), ..Config::default() };
        assert_eq!(config.bitstream_path(), PathBuf::from("out/gateware/microphase_a7_lite.bit"));
    }

    #[test]
    fn from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soc.yaml");
        std::fs::write(&path, "rom: [1, 2]").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("soc.yaml"));
    }
}
