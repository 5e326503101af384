use anyhow::{Context, Result};
use log::*;
use parking_lot::Mutex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Somewhere the bearer credential survives between invocations.
pub trait CredentialSlot: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn store(&self, credential: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Single file holding the raw credential string.
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSlot { path: path.into() }
    }
}

fn read_if_found(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(c) => Ok(Some(c)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl CredentialSlot for FileSlot {
    fn load(&self) -> Result<Option<String>> {
        let token = read_if_found(&self.path)
            .with_context(|| format!("Error reading token file {:?}", self.path))?;
        Ok(token.map(|t| t.trim().to_owned()))
    }

    fn store(&self, credential: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Error ensuring path {:?} exists", parent))?;
        }
        debug!("Saving token to {:?}", self.path);
        std::fs::write(&self.path, credential)
            .with_context(|| format!("Error writing token file {:?}", self.path))
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Error removing token file {:?}", self.path)),
        }
    }
}

/// Process-lifetime slot, for embedding and tests.
#[derive(Default)]
pub struct MemorySlot {
    value: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn with(credential: &str) -> Self {
        MemorySlot { value: Mutex::new(Some(credential.to_owned())) }
    }
}

impl CredentialSlot for MemorySlot {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.value.lock().clone())
    }

    fn store(&self, credential: &str) -> Result<()> {
        *self.value.lock() = Some(credential.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.value.lock() = None;
        Ok(())
    }
}
