// SPDX-License-Identifier: GPL-3.0-or-later

use serde::Serialize;

use crate::boards::Pad;

/// Status-indicator peripherals driving the board LEDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Gpio {
    /// Free-running pattern generator, attached by the platform.
    LedChaser { pads: Vec<Pad>, period_ms: u32 },
    /// Plain output bank written by firmware.
    GpioOut { pads: Vec<Pad> },
}

impl Gpio {
    pub const LED_CHASER_PERIOD_MS: u32 = 1000;

    pub fn led_chaser(pads: Vec<Pad>) -> Self {
        Self::LedChaser { pads, period_ms: Self::LED_CHASER_PERIOD_MS }
    }

    pub fn gpio_out(pads: Vec<Pad>) -> Self {
        Self::GpioOut { pads }
    }

    pub fn pads(&self) -> &[Pad] {
        match self {
            Self::LedChaser { pads, .. } | Self::GpioOut { pads } => pads,
        }
    }

    // name, offset
    pub fn registers(&self) -> &'static [(&'static str, u32)] {
        match self {
            Self::LedChaser { .. } => &[("out", 0x0000), ("mode", 0x0004)],
            Self::GpioOut { .. } => &[("out", 0x0000)],
        }
    }

    /// Mask of the `out` register bits backed by a pad.
    pub fn out_mask(&self) -> u32 {
        match self.pads().len() {
            0 => 0,
            n if n >= 32 => u32::MAX,
            n => (1 << n) - 1,
        }
    }
}
