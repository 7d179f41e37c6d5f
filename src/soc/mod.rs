// SPDX-License-Identifier: GPL-3.0-or-later

pub mod csr;
pub mod gpio;

use std::collections::BTreeMap;
use serde::Serialize;

use crate::{
    boards::Platform,
    config::{Config, Cpu},
    error::BuildError,
    rom::RomRegion,
};
use self::{csr::CsrCatalog, gpio::Gpio};

pub const ROM_BOOT_ADDRESS: &str = "ROM_BOOT_ADDRESS";
pub const LEDS: &str = "leds";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemRegion {
    pub name: String,
    pub base: u32,
    pub size: u32,
}

impl MemRegion {
    pub const SRAM_BASE: u32 = 0x1000_0000;

    fn new(name: &str, base: u32, size: u32) -> Self {
        Self { name: name.to_string(), base, size }
    }

    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.base && (addr - self.base) < self.size
    }
}

/// Parameters of the base SoC the platform builds before any customization.
#[derive(Debug, Clone)]
pub struct SocParams {
    pub sys_clk_freq: u32,
    pub cpu: Cpu,
    pub rom: RomRegion,
    pub rom_init: Vec<u32>,
    pub sram_size: u32,
    pub with_led_chaser: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SocDescriptor {
    pub target: String,
    pub sys_clk_freq: u32,
    pub cpu: Cpu,
    pub cpu_reset_address: u32,
    pub mem_regions: Vec<MemRegion>,
    #[serde(skip)]
    pub rom_init: Vec<u32>,
    pub csrs: CsrCatalog,
    pub peripherals: BTreeMap<String, Gpio>,
    pub constants: BTreeMap<String, u64>,
}

impl SocDescriptor {
    /// Builds the base SoC the way the platform would, LED chaser included
    /// when `with_led_chaser` is set.
    pub fn new(platform: &Platform, params: SocParams) -> Result<Self, BuildError> {
        let SocParams { sys_clk_freq, cpu, rom, rom_init, sram_size, with_led_chaser } = params;

        let mem_regions = vec![
            MemRegion::new("rom", rom.base, rom.capacity),
            MemRegion::new("sram", MemRegion::SRAM_BASE, sram_size),
            MemRegion::new("csr", CsrCatalog::BASE, CsrCatalog::size()),
        ];

        let mut soc = Self {
            target: platform.name.to_string(),
            sys_clk_freq,
            cpu,
            cpu_reset_address: rom.base,
            mem_regions,
            rom_init,
            csrs: CsrCatalog::new(CsrCatalog::BASE),
            peripherals: BTreeMap::new(),
            constants: BTreeMap::new(),
        };

        soc.add_csr("ctrl")?;
        soc.add_csr("uart")?;
        soc.add_csr("timer0")?;

        if with_led_chaser {
            soc.add_peripheral(LEDS, Gpio::led_chaser(platform.request_all("user_led")))?;
        }

        soc.add_constant("CONFIG_CLOCK_FREQUENCY", sys_clk_freq.into());
        soc.add_constant("ROM_SIZE", rom.capacity.into());
        soc.add_constant("SRAM_BASE", MemRegion::SRAM_BASE.into());
        soc.add_constant("SRAM_SIZE", sram_size.into());

        Ok(soc)
    }

    pub fn has_capability(&self, name: &str) -> bool {
        self.peripherals.contains_key(name)
    }

    /// Attaches a peripheral and gives it a CSR window under the same name.
    pub fn add_peripheral(&mut self, name: &str, gpio: Gpio) -> Result<(), BuildError> {
        self.add_csr(name)?;
        self.peripherals.insert(name.to_string(), gpio);
        Ok(())
    }

    pub fn add_csr(&mut self, name: &str) -> Result<(), BuildError> {
        self.csrs.add(name).map(|_| ())
    }

    pub fn add_constant(&mut self, name: &str, value: u64) {
        self.constants.insert(name.to_string(), value);
    }

    pub fn region(&self, name: &str) -> Option<&MemRegion> {
        self.mem_regions.iter().find(|r| r.name == name)
    }

    pub fn rom(&self) -> Option<&MemRegion> {
        self.region("rom")
    }

    /// Human readable description of what lives at `addr`.
    pub fn addr_desc(&self, addr: u32) -> String {
        if let Some((slot, offset)) = self.csrs.lookup(addr) {
            format!("addr=0x{:08x} csr={} offset=0x{:04x}", addr, slot.name, offset)
        } else if let Some(r) = self.mem_regions.iter().find(|r| r.contains(addr)) {
            format!("addr=0x{:08x} region={} offset=0x{:x}", addr, r.name, addr - r.base)
        } else {
            format!("addr=0x{:08x} region=????", addr)
        }
    }

    /// Every constant exported to firmware, CSR bases included.
    pub fn all_constants(&self) -> BTreeMap<String, u64> {
        let mut constants = self.constants.clone();
        for slot in self.csrs.iter() {
            constants.insert(format!("CSR_{}_BASE", slot.name.to_uppercase()), slot.start.into());
        }
        constants
    }
}

/// Builds the descriptor for `config.target` with `init` as ROM contents.
pub fn assemble(config: &Config, init: Vec<u32>) -> Result<SocDescriptor, BuildError> {
    let platform = Platform::lookup(&config.target)?;

    let params = SocParams {
        sys_clk_freq: config.sys_clk_freq.unwrap_or(platform.default_clk_freq),
        cpu: config.cpu.clone(),
        rom: config.rom,
        rom_init: init,
        sram_size: config.sram.size,
        with_led_chaser: config.with_led_chaser,
    };

    let mut soc = SocDescriptor::new(platform, params)?;

    if !soc.has_capability(LEDS) {
        let pads = platform.request_all("user_led");
        info!("Adding GPIO LEDs manually pads={}", pads.len());
        soc.add_peripheral(LEDS, Gpio::gpio_out(pads))?;
    }

    soc.add_constant(ROM_BOOT_ADDRESS, config.rom.base.into());

    Ok(soc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_attaches_gpio_leds() {
        let soc = assemble(&Config::default(), vec![0x13]).unwrap();

        assert!(soc.has_capability(LEDS));
        match &soc.peripherals[LEDS] {
            Gpio::GpioOut { pads } => assert_eq!(pads.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
        assert!(soc.csrs.contains(LEDS));
        assert_eq!(soc.rom_init, vec![0x13]);
        assert_eq!(soc.sys_clk_freq, 50_000_000);
        assert_eq!(soc.cpu.variant, "standard");
    }

    #[test]
    fn led_chaser_is_not_replaced() {
        let config = Config { with_led_chaser: true, ..Config::default() };
        let soc = assemble(&config, vec![]).unwrap();
        assert!(matches!(soc.peripherals[LEDS], Gpio::LedChaser { .. }));
        assert_eq!(soc.csrs.iter().filter(|s| s.name == LEDS).count(), 1);
    }

    #[test]
    fn boot_address_is_rom_base() {
        let soc = assemble(&Config::default(), vec![]).unwrap();
        assert_eq!(soc.constants[ROM_BOOT_ADDRESS], 0);
        assert_eq!(soc.cpu_reset_address, 0);
        assert_eq!(soc.rom().unwrap().size, 0x8000);
        assert_eq!(soc.region("sram").unwrap().size, 0x2000);
    }

    #[test]
    fn clock_falls_back_to_board_default() {
        let config = Config { target: "digilent_arty".into(), sys_clk_freq: None, ..Config::default() };
        let soc = assemble(&config, vec![]).unwrap();
        assert_eq!(soc.sys_clk_freq, 100_000_000);
        assert_eq!(soc.constants["CONFIG_CLOCK_FREQUENCY"], 100_000_000);
    }

    #[test]
    fn unknown_target_fails() {
        let config = Config { target: "nope".into(), ..Config::default() };
        assert!(matches!(assemble(&config, vec![]), Err(BuildError::UnknownBoard(_))));
    }

    #[test]
    fn csr_bases_are_exported() {
        let soc = assemble(&Config::default(), vec![]).unwrap();
        let constants = soc.all_constants();
        assert_eq!(constants["CSR_CTRL_BASE"], 0xf000_0000);
        assert_eq!(constants["CSR_LEDS_BASE"], 0xf000_1800);
    }

    #[test]
    fn addr_desc_names_location() {
        let soc = assemble(&Config::default(), vec![]).unwrap();
        assert_eq!(soc.addr_desc(0xf000_0804), "addr=0xf0000804 csr=uart offset=0x0004");
        assert_eq!(soc.addr_desc(0x1000_0010), "addr=0x10000010 region=sram offset=0x10");
        assert_eq!(soc.addr_desc(0x2000_0000), "addr=0x20000000 region=????");
        assert_eq!(soc.addr_desc(soc.cpu_reset_address), "addr=0x00000000 region=rom offset=0x0");
    }
}
