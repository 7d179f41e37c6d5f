// SPDX-License-Identifier: GPL-3.0-or-later

use serde::Serialize;

use crate::error::BuildError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pad {
    pub group: String,
    pub index: usize,
}

impl std::fmt::Display for Pad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group, self.index)
    }
}

#[derive(Debug)]
pub struct Platform {
    pub name: &'static str,
    pub default_clk_freq: u32,
    // group name, pad count
    pub pins: &'static [(&'static str, usize)],
    pub load: &'static [&'static str],
    pub flash: &'static [&'static str],
}

const OPENFPGALOADER_LOAD: &[&str] = &["openFPGALoader", "{bitstream}"];
const OPENFPGALOADER_FLASH: &[&str] = &["openFPGALoader", "-f", "{bitstream}"];

static BOARDS: &[Platform] = &[
    Platform {
        name: "microphase_a7_lite",
        default_clk_freq: 50_000_000,
        pins: &[("user_led", 2), ("user_btn", 2), ("serial", 1)],
        load: OPENFPGALOADER_LOAD,
        flash: OPENFPGALOADER_FLASH,
    },
    Platform {
        name: "digilent_arty",
        default_clk_freq: 100_000_000,
        pins: &[("user_led", 4), ("user_btn", 4), ("user_sw", 4), ("serial", 1)],
        load: OPENFPGALOADER_LOAD,
        flash: OPENFPGALOADER_FLASH,
    },
];

impl Platform {
    pub fn lookup(name: &str) -> Result<&'static Platform, BuildError> {
        BOARDS.iter()
            .find(|b| b.name == name)
            .ok_or_else(|| BuildError::UnknownBoard(name.to_string()))
    }

    /// Every pad of `group`, empty if the board has none.
    pub fn request_all(&self, group: &str) -> Vec<Pad> {
        let count = self.pins.iter()
            .find(|(g, _)| *g == group)
            .map(|(_, n)| *n)
            .unwrap_or(0);

        (0..count).map(|index| Pad { group: group.to_string(), index }).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_board() {
        let p = Platform::lookup("microphase_a7_lite").unwrap();
        assert_eq!(p.default_clk_freq, 50_000_000);
    }

    #[test]
    fn lookup_unknown_board() {
        assert!(matches!(Platform::lookup("nexys9000"), Err(BuildError::UnknownBoard(_))));
    }

    #[test]
    fn request_all_leds() {
        let p = Platform::lookup("digilent_arty").unwrap();
        let leds = p.request_all("user_led");
        assert_eq!(leds.len(), 4);
        assert_eq!(leds[3].to_string(), "user_led:3");
        assert!(p.request_all("ddram").is_empty());
    }
}
