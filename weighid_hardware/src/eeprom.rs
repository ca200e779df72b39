//! EEPROM emulations implementing `weighid_traits::CalibrationStore`.
//!
//! Both backends keep a RAM cache that reads and writes go through, the way
//! flash-emulated EEPROM works on microcontrollers: nothing is durable until
//! `commit` is called.

use std::fs;
use std::io::{ErrorKind, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use weighid_traits::{BoxError, CalibrationStore};

use crate::error::{HwError, Result};

/// Value of a never-written EEPROM byte.
pub const ERASED: u8 = 0xFF;

fn span(address: usize, len: usize, capacity: usize) -> Result<Range<usize>> {
    match address.checked_add(len) {
        Some(end) if end <= capacity => Ok(address..end),
        _ => Err(HwError::OutOfRange {
            address,
            len,
            capacity,
        }),
    }
}

/// In-memory EEPROM with a separate committed image.
#[derive(Debug, Clone)]
pub struct MemoryEeprom {
    cache: Vec<u8>,
    committed: Vec<u8>,
    commits: usize,
}

impl MemoryEeprom {
    /// A fully erased store of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self::from_image(vec![ERASED; capacity])
    }

    /// A store whose committed contents are `image`.
    pub fn from_image(image: Vec<u8>) -> Self {
        Self {
            cache: image.clone(),
            committed: image,
            commits: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cache.len()
    }

    /// Bytes that survived the last `commit`.
    pub fn committed(&self) -> &[u8] {
        &self.committed
    }

    pub fn commit_count(&self) -> usize {
        self.commits
    }

    /// True when the cache holds writes that were not committed yet.
    pub fn is_dirty(&self) -> bool {
        self.cache != self.committed
    }

    /// Drop uncommitted writes, as a power cycle would.
    pub fn power_cycle(&mut self) {
        self.cache.clone_from(&self.committed);
    }
}

impl CalibrationStore for MemoryEeprom {
    fn read(&mut self, address: usize, buf: &mut [u8]) -> std::result::Result<(), BoxError> {
        let r = span(address, buf.len(), self.cache.len())?;
        buf.copy_from_slice(&self.cache[r]);
        Ok(())
    }

    fn write(&mut self, address: usize, bytes: &[u8]) -> std::result::Result<(), BoxError> {
        let r = span(address, bytes.len(), self.cache.len())?;
        self.cache[r].copy_from_slice(bytes);
        Ok(())
    }

    fn commit(&mut self) -> std::result::Result<(), BoxError> {
        self.committed.clone_from(&self.cache);
        self.commits += 1;
        Ok(())
    }
}

/// EEPROM image persisted in a file on the host.
///
/// A missing file reads as erased memory. `commit` replaces the file
/// atomically: the temp file is synced before the rename and the directory
/// after it. An image of the wrong size is resized on open and rewritten on
/// the next commit.
#[derive(Debug)]
pub struct FileEeprom {
    path: PathBuf,
    cache: Vec<u8>,
    dirty: bool,
}

impl FileEeprom {
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (cache, dirty) = match fs::read(&path) {
            Ok(mut bytes) => {
                let resized = bytes.len() != capacity;
                if resized {
                    tracing::warn!(
                        path = %path.display(),
                        found = bytes.len(),
                        capacity,
                        "eeprom image size mismatch; resizing"
                    );
                    bytes.resize(capacity, ERASED);
                }
                (bytes, resized)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no eeprom image yet; starting erased");
                (vec![ERASED; capacity], false)
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, cache, dirty })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn capacity(&self) -> usize {
        self.cache.len()
    }

    /// True when the file on disk differs from the cache.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&self.cache)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        sync_parent(&self.path);
        self.dirty = false;
        tracing::debug!(path = %self.path.display(), bytes = self.cache.len(), "eeprom image committed");
        Ok(())
    }
}

/// Persist the rename itself. Not every platform can open a directory.
fn sync_parent(path: &Path) {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if let Err(e) = fs::File::open(dir).and_then(|d| d.sync_all()) {
        tracing::debug!(dir = %dir.display(), error = %e, "directory sync skipped");
    }
}

impl CalibrationStore for FileEeprom {
    fn read(&mut self, address: usize, buf: &mut [u8]) -> std::result::Result<(), BoxError> {
        let r = span(address, buf.len(), self.cache.len())?;
        buf.copy_from_slice(&self.cache[r]);
        Ok(())
    }

    fn write(&mut self, address: usize, bytes: &[u8]) -> std::result::Result<(), BoxError> {
        let r = span(address, bytes.len(), self.cache.len())?;
        if self.cache[r.clone()] != *bytes {
            self.cache[r].copy_from_slice(bytes);
            self.dirty = true;
        }
        Ok(())
    }

    fn commit(&mut self) -> std::result::Result<(), BoxError> {
        self.flush().map_err(Into::into)
    }
}
