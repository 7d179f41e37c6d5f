// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt::Write as _;
use std::path::Path;
use anyhow::{Context as _, Result};

use crate::{soc::SocDescriptor, util::write_file};

/// ROM contents, one word per line, zero-filled to the ROM depth.
pub fn rom_init(soc: &SocDescriptor) -> String {
    let depth = soc.rom().map(|r| r.size as usize / 4).unwrap_or(0);
    let depth = depth.max(soc.rom_init.len());

    let mut out = String::with_capacity(depth * 9);
    for i in 0..depth {
        let word = soc.rom_init.get(i).copied().unwrap_or(0);
        let _ = writeln!(out, "{:08x}", word);
    }
    out
}

pub fn soc_header(soc: &SocDescriptor) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// Generated for {}. Do not edit.", soc.target);
    let _ = writeln!(out, "#ifndef __GENERATED_SOC_H");
    let _ = writeln!(out, "#define __GENERATED_SOC_H");

    for (name, value) in soc.all_constants() {
        let _ = writeln!(out, "#define {} 0x{:08x}", name, value);
    }

    for (name, gpio) in &soc.peripherals {
        if let Some(slot) = soc.csrs.get(name) {
            for (reg, offset) in gpio.registers() {
                let _ = writeln!(out, "#define CSR_{}_{}_ADDR 0x{:08x}",
                    name.to_uppercase(), reg.to_uppercase(), slot.start + offset);
            }
            let _ = writeln!(out, "#define CSR_{}_OUT_MASK 0x{:08x}", name.to_uppercase(), gpio.out_mask());
        }
    }

    let _ = writeln!(out, "#endif");
    out
}

pub fn write_project(soc: &SocDescriptor, gateware_dir: &Path, software_dir: &Path) -> Result<()> {
    let descriptor = serde_yaml::to_string(soc)
        .context("Failed to serialize SoC descriptor")?;

    write_file(&gateware_dir.join(format!("{}.yaml", soc.target)), descriptor.as_bytes())?;
    write_file(&gateware_dir.join("rom.init"), rom_init(soc).as_bytes())?;
    write_file(&software_dir.join("include/generated/soc.h"), soc_header(soc).as_bytes())?;

    debug!("Wrote project files to {}", gateware_dir.display());
    Ok(())
}
