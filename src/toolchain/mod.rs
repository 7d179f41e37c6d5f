// SPDX-License-Identifier: GPL-3.0-or-later

pub mod export;

use std::path::{Path, PathBuf};
use std::process::Command;
use anyhow::{bail, Context as _, Result};

use crate::{boards::Platform, config::Config, soc::SocDescriptor};

/// Turns a descriptor into gateware.
pub trait Toolchain {
    /// Writes the project files for `soc`, and synthesizes the bitstream
    /// when `run` is set. Returns the bitstream produced by this call, if any.
    fn build(&mut self, soc: &SocDescriptor, run: bool) -> Result<Option<PathBuf>>;
}

/// Puts a bitstream on the device.
pub trait Programmer {
    /// Volatile load into the FPGA.
    fn load_bitstream(&mut self, bitstream: &Path) -> Result<()>;

    /// Writes the bitstream to the configuration flash.
    fn flash(&mut self, bitstream: &Path) -> Result<()>;
}

fn expand(args: &[String], vars: &[(&str, &str)]) -> Vec<String> {
    args.iter().map(|arg| {
        vars.iter().fold(arg.clone(), |arg, (k, v)| arg.replace(&format!("{{{}}}", k), v))
    }).collect()
}

fn run(args: &[String], cwd: &Path) -> Result<()> {
    let (program, rest) = match args.split_first() {
        Some(split) => split,
        None => bail!("empty command"),
    };

    let mut cmd = Command::new(program);
    cmd.args(rest).current_dir(cwd);
    info!("Running {:?} in {}", cmd, cwd.display());

    let status = cmd.status()
        .with_context(|| format!("failed to run {}", program))?;

    if !status.success() {
        bail!("{} exited with {}", program, status);
    }

    Ok(())
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

/// Runs the user's `toolchain.command` over the generated project files.
pub struct CommandToolchain {
    gateware_dir: PathBuf,
    software_dir: PathBuf,
    bitstream: PathBuf,
    command: Option<Vec<String>>,
}

impl CommandToolchain {
    pub fn new(config: &Config) -> Self {
        Self {
            gateware_dir: config.gateware_dir(),
            software_dir: config.software_dir(),
            bitstream: config.bitstream_path(),
            command: config.toolchain.as_ref().map(|t| t.command.clone()),
        }
    }

    fn remove_stale_bitstream(&self) -> Result<()> {
        match std::fs::remove_file(&self.bitstream) {
            Ok(()) => {
                debug!("Removed previous {}", self.bitstream.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", self.bitstream.display())),
        }
    }
}

impl Toolchain for CommandToolchain {
    fn build(&mut self, soc: &SocDescriptor, run_synthesis: bool) -> Result<Option<PathBuf>> {
        export::write_project(soc, &self.gateware_dir, &self.software_dir)?;

        if !run_synthesis {
            return Ok(None);
        }

        let command = match &self.command {
            Some(command) => command,
            None => bail!("no toolchain.command configured for {}, cannot synthesize", soc.target),
        };

        self.remove_stale_bitstream()?;

        let gateware_dir = self.gateware_dir.display().to_string();
        let args = expand(command, &[("target", &soc.target), ("gateware_dir", &gateware_dir)]);
        run(&args, &self.gateware_dir).context("synthesis failed")?;

        if self.bitstream.exists() {
            Ok(Some(self.bitstream.clone()))
        } else {
            warn!("{} finished without producing {}", args[0], self.bitstream.display());
            Ok(None)
        }
    }
}

pub struct CommandProgrammer {
    load: Vec<String>,
    flash: Vec<String>,
    cwd: PathBuf,
}

impl CommandProgrammer {
    pub fn new(config: &Config, platform: &Platform) -> Self {
        let programmer = config.programmer.clone().unwrap_or_default();

        Self {
            load: programmer.load_command.unwrap_or_else(|| owned(platform.load)),
            flash: programmer.flash_command.unwrap_or_else(|| owned(platform.flash)),
            cwd: PathBuf::from("."),
        }
    }

    fn run_with(&self, command: &[String], bitstream: &Path) -> Result<()> {
        let bitstream = bitstream.display().to_string();
        run(&expand(command, &[("bitstream", &bitstream)]), &self.cwd)
    }
}

impl Programmer for CommandProgrammer {
    fn load_bitstream(&mut self, bitstream: &Path) -> Result<()> {
        self.run_with(&self.load, bitstream)
    }

    fn flash(&mut self, bitstream: &Path) -> Result<()> {
        self.run_with(&self.flash, bitstream)
    }
}
