mod boards;
mod builder;
mod config;
mod error;
mod firmware;
mod rom;
mod soc;
mod toolchain;
mod util;

use std::io::prelude::*;
use std::path::PathBuf;
use clap::Parser;
use clap::AppSettings;
use anyhow::Result;
use env_logger::fmt::Color;
use log::LevelFilter;

use boards::Platform;
use builder::{Builder, BuildRequest};
use config::Config;
use soc::SocDescriptor;
use toolchain::{CommandProgrammer, CommandToolchain};

#[macro_use]
extern crate log;

/// Build a bare-metal SoC bitstream with firmware baked into its boot ROM
#[derive(Parser, Debug)]
#[clap(
    global_setting(AppSettings::DeriveDisplayOrder)
)]
pub struct Args {
    /// Config file. Built-in defaults are used when omitted
    config: Option<PathBuf>,

    /// Build bitstream
    #[clap(long)]
    build: bool,

    /// Load bitstream
    #[clap(long)]
    load: bool,

    /// Flash bitstream
    #[clap(long)]
    flash: bool,

    /// Firmware image to place in ROM
    #[clap(short, long)]
    firmware: Option<PathBuf>,

    /// Output directory
    #[clap(short, long)]
    output_dir: Option<PathBuf>,

    /// System clock frequency in Hz
    #[clap(long, parse(try_from_str=clap_num::maybe_hex))]
    sys_clk_freq: Option<u32>,

    /// Print the memory map once the SoC is described
    #[clap(long)]
    print_map: bool,

    /// Verbosity. Can be repeated
    #[clap(short, long, parse(from_occurrences))]
    verbose: u8,
}

impl Args {
    fn request(&self) -> BuildRequest {
        BuildRequest { build: self.build, load: self.load, flash: self.flash }
    }

    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(firmware) = &self.firmware {
            config.firmware = firmware.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if self.sys_clk_freq.is_some() {
            config.sys_clk_freq = self.sys_clk_freq;
        }

        Ok(config)
    }
}

fn init_logging(level: u8) {
    let lf = match level {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(lf)
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            let mut style = buf.style();
            let level = match record.level() {
                log::Level::Error => style.set_color(Color::Red).set_intense(true).value("ERROR"),
                log::Level::Warn =>  style.set_color(Color::Yellow).set_intense(true).value("WARN "),
                log::Level::Info =>  style.set_color(Color::Green).set_intense(true).value("INFO "),
                log::Level::Debug => style.set_color(Color::Cyan).set_intense(true).value("DEBUG"),
                log::Level::Trace => style.set_color(Color::Blue).set_intense(true).value("TRACE"),
            };

            let module = record.module_path()
                .and_then(|m| m.rsplit("::").next())
                .unwrap_or("");

            writeln!(buf, "{} [{:<9}] {}", level, module, record.args())
        })
        .init();
}

fn print_map(soc: &SocDescriptor) {
    info!("{} sys_clk={}Hz cpu={}:{} reset {}",
        soc.target, soc.sys_clk_freq, soc.cpu.kind, soc.cpu.variant, soc.addr_desc(soc.cpu_reset_address));

    for r in &soc.mem_regions {
        info!("region {:<6} base=0x{:08x} size=0x{:x}", r.name, r.base, r.size);
    }
    for slot in soc.csrs.iter() {
        info!("csr    {:<6} {}", slot.name, soc.addr_desc(slot.start));
    }
    for (name, value) in soc.all_constants() {
        info!("const  {}=0x{:x}", name, value);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.config()?;
    let platform = Platform::lookup(&config.target)?;

    let mut toolchain = CommandToolchain::new(&config);
    let mut programmer = CommandProgrammer::new(&config, platform);

    let mut builder = Builder::new(&config, args.request(), &mut toolchain, &mut programmer);
    let result = builder.run();
    debug!("Build stopped in state={:?}", builder.state());
    let report = result?;

    if args.print_map {
        print_map(&report.soc);
    }

    if let Some(bitstream) = report.bitstream {
        info!("Bitstream at {}", bitstream.display());
    }

    Ok(())
}
