//! Descriptor file I/O.
//!
//! The descriptor is read once at the start of a run and written once at the
//! end. Writes go to a sibling temporary file that is synced and then renamed
//! over the old file, so readers only ever see a complete descriptor.

use crate::{codec, error::Error, model::Model, validate::validate_model};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

///
/// DescriptorFile
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DescriptorFile {
    path: PathBuf,
    temp_path: PathBuf,
}

impl DescriptorFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut temp_path = path.clone().into_os_string();
        temp_path.push(".tmp");

        Self {
            path,
            temp_path: temp_path.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Load the descriptor, or `None` when the file does not exist yet.
    pub fn load(&self) -> Result<Option<Model>, Error> {
        match fs::read(&self.path) {
            Ok(bytes) => codec::load(&bytes).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }

    /// Load the descriptor, starting a fresh model with `comment` when missing.
    pub fn load_or_create<I, S>(&self, comment: I) -> Result<Model, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(model) = self.load()? {
            return Ok(model);
        }
        info!(path = %self.path.display(), "descriptor not found, starting a new model");

        Ok(Model::new(comment))
    }

    /// Validate and persist `model`.
    ///
    /// Returns `false` when the file already holds exactly these bytes and
    /// nothing was written.
    pub fn commit(&self, model: &Model) -> Result<bool, Error> {
        validate_model(model)?;
        let bytes = codec::save(model)?;

        match fs::read(&self.path) {
            Ok(current) if current == bytes => {
                debug!(path = %self.path.display(), "descriptor unchanged, skipping write");
                return Ok(false);
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(&self.path, e)),
        }

        if let Err(e) = self.write_replace(&bytes) {
            // the old file is untouched until the rename succeeds
            let _ = fs::remove_file(&self.temp_path);

            return Err(Error::io(&self.path, e));
        }
        info!(path = %self.path.display(), bytes = bytes.len(), "descriptor written");

        Ok(true)
    }

    fn write_replace(&self, bytes: &[u8]) -> io::Result<()> {
        let mut file = fs::File::create(&self.temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&self.temp_path, &self.path)
    }
}

///
/// TESTS
///
