// SPDX-License-Identifier: GPL-3.0-or-later

use serde::Serialize;

use crate::error::BuildError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsrSlot {
    pub name: String,
    pub start: u32,
    pub end: u32,
}

/// Control/status register windows, allocated in registration order.
#[derive(Debug, Clone, Serialize)]
pub struct CsrCatalog {
    base: u32,
    slots: Vec<CsrSlot>,
}

impl CsrCatalog {
    pub const BASE: u32 = 0xf000_0000;
    pub const PAGE_SIZE: u32 = 0x800;
    pub const MAX_SLOTS: u32 = 32;

    pub fn new(base: u32) -> Self {
        Self { base, slots: vec![] }
    }

    pub fn size() -> u32 {
        Self::PAGE_SIZE * Self::MAX_SLOTS
    }

    pub fn add(&mut self, name: &str) -> Result<&CsrSlot, BuildError> {
        if self.contains(name) {
            return Err(BuildError::DuplicateCsr(name.to_string()));
        }
        if self.slots.len() as u32 >= Self::MAX_SLOTS {
            return Err(BuildError::CsrSpaceFull(name.to_string()));
        }

        let start = self.base + self.slots.len() as u32 * Self::PAGE_SIZE;
        let end = start + Self::PAGE_SIZE - 1;
        debug!("CSR base=0x{:08x} name={}", start, name);

        self.slots.push(CsrSlot { name: name.to_string(), start, end });
        Ok(&self.slots[self.slots.len() - 1])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&CsrSlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CsrSlot> {
        self.slots.iter()
    }

    /// Resolves `addr` to its window and the offset into it.
    pub fn lookup(&self, addr: u32) -> Option<(&CsrSlot, u32)> {
        let index = self.slots.binary_search_by_key(&addr, |s| s.start)
            .map_or_else(|e| e.checked_sub(1), Some);

        index.and_then(|i| self.slots.get(i))
            .filter(|s| addr <= s.end)
            .map(|s| (s, addr - s.start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_allocated_in_order() {
        let mut csrs = CsrCatalog::new(CsrCatalog::BASE);
        csrs.add("ctrl").unwrap();
        let leds = csrs.add("leds").unwrap().clone();
        assert_eq!(leds.start, 0xf000_0800);
        assert_eq!(leds.end, 0xf000_0fff);
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut csrs = CsrCatalog::new(CsrCatalog::BASE);
        csrs.add("leds").unwrap();
        assert!(matches!(csrs.add("leds"), Err(BuildError::DuplicateCsr(_))));
    }

    #[test]
    fn lookup_resolves_offset() {
        let mut csrs = CsrCatalog::new(CsrCatalog::BASE);
        csrs.add("ctrl").unwrap();
        csrs.add("uart").unwrap();

        let (slot, offset) = csrs.lookup(0xf000_0804).unwrap();
        assert_eq!(slot.name, "uart");
        assert_eq!(offset, 4);

        let (slot, offset) = csrs.lookup(0xf000_0000).unwrap();
        assert_eq!(slot.name, "ctrl");
        assert_eq!(offset, 0);

        assert!(csrs.lookup(0xefff_ffff).is_none());
        assert!(csrs.lookup(0xf000_1000).is_none());
    }
}
