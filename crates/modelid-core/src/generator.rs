use crate::{
    alloc::UidAllocator,
    error::Error,
    model::Model,
    reconcile::{ReconcileSummary, reconcile},
    writer::DescriptorFile,
};
use modelid_config::Config;
use modelid_schema::node::Schema;
use rand::{CryptoRng, RngCore, rngs::OsRng};
use std::path::Path;
use tracing::info;

///
/// RunOutcome
///

#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub model: Model,
    pub summary: ReconcileSummary,

    /// `false` when the descriptor already held the reconciled model.
    pub written: bool,
}

///
/// Generator
///
/// One generation run per call to `run`: check the schema, load or create
/// the descriptor, reconcile, validate and commit. Any failure leaves the
/// descriptor file as it was.
///

#[derive(Debug)]
pub struct Generator<R = OsRng> {
    config: Config,
    file: DescriptorFile,
    allocator: UidAllocator<R>,
}

impl Generator<OsRng> {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_rng(config, OsRng)
    }

    /// Generator configured from a TOML file on disk.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let config = Config::load(path)?;

        Ok(Self::new(config))
    }
}

impl<R: RngCore + CryptoRng> Generator<R> {
    #[must_use]
    pub fn with_rng(config: Config, rng: R) -> Self {
        let file = DescriptorFile::new(&config.descriptor_file);
        let allocator = UidAllocator::with_rng(rng).max_attempts(config.max_uid_attempts);

        Self {
            config,
            file,
            allocator,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn file(&self) -> &DescriptorFile {
        &self.file
    }

    pub fn run(&mut self, schema: &Schema) -> Result<RunOutcome, Error> {
        schema.validate().map_err(Error::InvalidSchema)?;

        let current = self.file.load_or_create(self.config.comment_lines())?;
        let reconciled = reconcile(&current, schema, &mut self.allocator)?;
        let written = self.file.commit(&reconciled.model)?;

        info!(
            path = %self.file.path().display(),
            entities = reconciled.model.entities.len(),
            properties = reconciled.model.property_count(),
            summary = %reconciled.summary,
            written,
            "generation run complete"
        );

        Ok(RunOutcome {
            model: reconciled.model,
            summary: reconciled.summary,
            written,
        })
    }
}
