use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use retroboy_mbc1::{BatteryStore, BusDevice, CartridgeHeader, Mbc1, Rom};

/// One line of a bus script.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Read(u16),
    Write(u16, u8),
    State,
    Save,
}

impl Command {
    /// Parses a script line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.split('#').next().unwrap_or_default().trim();
        let mut words = line.split_whitespace();
        let Some(op) = words.next() else {
            return Ok(None);
        };

        let command = match op {
            "r" | "read" => Command::Read(parse_hex(words.next(), "address")?),
            "w" | "write" => {
                let address = parse_hex(words.next(), "address")?;
                let data = parse_hex(words.next(), "data")?;
                let data = u8::try_from(data)
                    .map_err(|_| anyhow!("data {data:#x} does not fit in 8 bits"))?;
                Command::Write(address, data)
            }
            "state" => Command::State,
            "save" => Command::Save,
            other => bail!("unknown command '{other}'"),
        };

        if let Some(extra) = words.next() {
            bail!("unexpected argument '{extra}'");
        }
        Ok(Some(command))
    }
}

fn parse_hex(word: Option<&str>, what: &str) -> Result<u16> {
    let word = word.ok_or_else(|| anyhow!("missing {what}"))?;
    let digits = word
        .strip_prefix("0x")
        .or_else(|| word.strip_prefix('$'))
        .unwrap_or(word);
    u16::from_str_radix(digits, 16).with_context(|| format!("invalid {what} '{word}'"))
}

/// A cartridge loaded by the command-line tool, together with its battery
/// storage.
pub struct Session {
    pub mbc: Mbc1,
    pub header: CartridgeHeader,
    store: BatteryStore,
    identifier: String,
}

impl Session {
    /// Reads the ROM at `rom_path`. Battery saves go to `save_dir` (default:
    /// next to the ROM) and are named after the ROM's file stem.
    pub fn open(rom_path: &Path, save_dir: Option<&Path>) -> Result<Self> {
        let image = std::fs::read(rom_path)
            .with_context(|| format!("Failed to read ROM '{}'", rom_path.display()))?;
        let identifier = rom_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("ROM path '{}' has no file name", rom_path.display()))?;
        let directory = match save_dir {
            Some(dir) => dir.to_path_buf(),
            None => rom_path.parent().unwrap_or(Path::new(".")).to_path_buf(),
        };

        Self::new(image, identifier, BatteryStore::builder().directory(directory).build())
    }

    pub fn new(image: Vec<u8>, identifier: impl Into<String>, store: BatteryStore) -> Result<Self> {
        let header = CartridgeHeader::parse(&image).context("Unsupported cartridge")?;
        log::info!(
            "Cartridge '{}': {:?}, {} KiB ROM, {} KiB RAM",
            header.title,
            header.cartridge_type,
            image.len() / 1024,
            header.ram_size / 1024
        );

        let mut mbc = Mbc1::new(Rom::new(image), header.ram_size);
        let identifier = identifier.into();
        if header.has_battery() {
            store.load(&mut mbc, &identifier)?;
        }

        Ok(Self {
            mbc,
            header,
            store,
            identifier,
        })
    }

    pub fn save(&self) -> Result<()> {
        self.store.save(&self.mbc, &self.identifier)
    }

    pub fn execute(&mut self, command: Command, output: &mut impl Write) -> Result<()> {
        match command {
            Command::Read(address) => {
                writeln!(output, "{address:04X} = {:02X}", self.mbc.read(address))?;
            }
            Command::Write(address, data) => self.mbc.write(address, data),
            Command::State => {
                let latches = self.mbc.latches();
                writeln!(
                    output,
                    "ram_enable={} mode={:?} low5={:02X} high2={} rom_bank={:02X} ram_bank={}",
                    latches.ram_enable,
                    latches.banking_mode,
                    latches.rom_bank_low5,
                    latches.rom_bank_high2,
                    self.mbc.rom_bank(),
                    self.mbc.ram_bank()
                )?;
            }
            Command::Save => self.save()?,
        }
        Ok(())
    }

    /// Runs every command in `input`. Battery-backed cartridges are saved
    /// once the script is exhausted.
    pub fn run_script(&mut self, input: impl BufRead, mut output: impl Write) -> Result<()> {
        for (index, line) in input.lines().enumerate() {
            let line = line.context("Failed to read script")?;
            let command = Command::parse(&line)
                .with_context(|| format!("line {}: '{}'", index + 1, line.trim()))?;
            if let Some(command) = command {
                self.execute(command, &mut output)?;
            }
        }

        if self.header.has_battery() {
            self.save()?;
        }
        Ok(())
    }
}

pub fn run(rom_path: &Path, save_dir: Option<&Path>) -> Result<()> {
    let mut session = Session::open(rom_path, save_dir)?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    session.run_script(stdin.lock(), stdout.lock())
}
