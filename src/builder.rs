// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;
use anyhow::{Context as _, Result};

use crate::{
    config::Config,
    error::BuildError,
    firmware::{self, FirmwareImage},
    rom,
    soc::{self, SocDescriptor},
    toolchain::{Programmer, Toolchain},
};

/// What the operator asked for on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildRequest {
    pub build: bool,
    pub load: bool,
    pub flash: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Configured,
    Described,
    Synthesized,
    Programmed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Describe,
    Synthesize,
    Program,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Describe => "describe",
            Self::Synthesize => "synthesize",
            Self::Program => "program",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
pub struct BuildReport {
    pub firmware: FirmwareImage,
    pub soc: SocDescriptor,
    pub bitstream: Option<PathBuf>,
}

/// Drives one invocation: load, describe, synthesize, program.
pub struct Builder<'a> {
    config: &'a Config,
    request: BuildRequest,
    toolchain: &'a mut dyn Toolchain,
    programmer: &'a mut dyn Programmer,
    state: BuildState,
}

impl<'a> Builder<'a> {
    pub fn new(
        config: &'a Config,
        request: BuildRequest,
        toolchain: &'a mut dyn Toolchain,
        programmer: &'a mut dyn Programmer,
    ) -> Self {
        Self { config, request, toolchain, programmer, state: BuildState::Configured }
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    pub fn run(&mut self) -> Result<BuildReport> {
        let result = self.run_phases();
        if result.is_err() {
            self.state = BuildState::Failed;
        }
        result
    }

    fn run_phases(&mut self) -> Result<BuildReport> {
        let (firmware, soc) = self.describe()
            .with_context(|| format!("phase={} failed", Phase::Describe))?;
        self.state = BuildState::Described;

        let bitstream = self.synthesize(&soc)
            .with_context(|| format!("phase={} failed", Phase::Synthesize))?;
        if bitstream.is_some() {
            self.state = BuildState::Synthesized;
        }

        if self.request.load || self.request.flash {
            self.program(bitstream.as_deref())
                .with_context(|| format!("phase={} failed", Phase::Program))?;
            self.state = BuildState::Programmed;
        }

        Ok(BuildReport { firmware, soc, bitstream })
    }

    fn describe(&self) -> Result<(FirmwareImage, SocDescriptor), BuildError> {
        let firmware = firmware::load(&self.config.firmware)?;
        let init = rom::build(firmware.words.clone(), &self.config.rom).map_err(|e| {
            if let Some(over) = e.overflow() {
                error!("{} is {} bytes and does not fit in ROM, {} bytes over after word alignment",
                    self.config.firmware.display(), firmware.byte_length, over);
            }
            e
        })?;
        let soc = soc::assemble(self.config, init)?;
        Ok((firmware, soc))
    }

    /// Project files are generated on every run; the bitstream only when
    /// a build was requested.
    fn synthesize(&mut self, soc: &SocDescriptor) -> Result<Option<PathBuf>, BuildError> {
        if self.request.build {
            info!("Building {} ROM={} words", soc.target, soc.rom_init.len());
        } else {
            debug!("Build not requested, generating project files only");
        }

        let bitstream = self.toolchain.build(soc, self.request.build)
            .map_err(BuildError::Toolchain)?;

        // only trust a bitstream from a synthesis this run asked for
        Ok(bitstream.filter(|_| self.request.build))
    }

    fn program(&mut self, bitstream: Option<&std::path::Path>) -> Result<(), BuildError> {
        let bitstream = bitstream.ok_or_else(|| BuildError::ArtifactMissing {
            path: self.config.bitstream_path(),
        })?;

        if self.request.load {
            info!("Loading {}", bitstream.display());
            self.programmer.load_bitstream(bitstream).map_err(BuildError::Programmer)?;
        }

        if self.request.flash {
            info!("Flashing {}", bitstream.display());
            self.programmer.flash(bitstream).map_err(BuildError::Programmer)?;
        }

        Ok(())
    }
}
