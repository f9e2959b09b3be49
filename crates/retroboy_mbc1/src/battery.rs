use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use typed_builder::TypedBuilder;

use crate::Mbc1;

/// File-backed storage for battery RAM.
///
/// Each cartridge is saved as `<directory>/<identifier><suffix>`. The core
/// controller only deals in byte streams; this type owns the naming policy.
#[derive(TypedBuilder, Clone, Debug)]
pub struct BatteryStore {
    #[builder(setter(into))]
    directory: PathBuf,
    #[builder(default = String::from(".bin"), setter(into))]
    suffix: String,
}

impl BatteryStore {
    pub fn path_for(&self, identifier: &str) -> PathBuf {
        self.directory.join(format!("{identifier}{}", self.suffix))
    }

    /// Saves the RAM of `mbc` under `identifier`.
    ///
    /// The image is written to a temporary sibling, synced to disk and then
    /// renamed over the previous save, so an interrupted save keeps the old
    /// file intact.
    pub fn save(&self, mbc: &Mbc1, identifier: &str) -> Result<()> {
        let path = self.path_for(identifier);
        let tmp = self.directory.join(format!("{identifier}{}.tmp", self.suffix));

        fs::create_dir_all(&self.directory)
            .with_context(|| format!("Failed to create '{}'", self.directory.display()))?;

        if let Err(err) = Self::write_synced(mbc, &tmp) {
            let _ = fs::remove_file(&tmp);
            return Err(err.context(format!("Failed to write '{}'", tmp.display())));
        }

        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to move save into '{}'", path.display()))?;
        log::info!("Saved battery RAM to '{}'", path.display());
        Ok(())
    }

    fn write_synced(mbc: &Mbc1, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        mbc.save_ram(&mut writer)?;
        writer.into_inner().map_err(|err| err.into_error())?.sync_all()?;
        Ok(())
    }

    /// Restores the RAM of `mbc` from the save named `identifier`.
    ///
    /// Returns `Ok(false)` when no save exists yet. On error the RAM is left
    /// as it was.
    pub fn load(&self, mbc: &mut Mbc1, identifier: &str) -> Result<bool> {
        let path = self.path_for(identifier);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("No battery save at '{}'", path.display());
                return Ok(false);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to open '{}'", path.display()))
            }
        };

        mbc.load_ram(BufReader::new(file))
            .with_context(|| format!("Failed to restore battery RAM from '{}'", path.display()))?;
        log::info!("Loaded battery RAM from '{}'", path.display());
        Ok(true)
    }
}
