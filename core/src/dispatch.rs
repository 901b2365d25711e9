//! dispatch.rs
//! Format dispatch table: format name -> engine factory, per direction.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::compression::{CompressionFormat, Direction};
use crate::engine::{Capability, EngineFactory, EngineMode, FlateEngineFactory};

/// Engine constructors for one direction, keyed by format name.
#[derive(Clone, Default)]
pub struct EngineFamily {
    entries: HashMap<&'static str, Arc<dyn EngineFactory>>,
}

impl EngineFamily {
    pub fn new() -> Self {
        Self::default()
    }

    /// All three flate2-backed formats for `direction`, run as `mode`.
    pub fn flate(direction: Direction, mode: EngineMode) -> Self {
        CompressionFormat::ALL.iter().fold(Self::new(), |family, format| {
            family.with(format.name(), Arc::new(FlateEngineFactory::new(*format, direction, mode)))
        })
    }

    pub fn with(mut self, name: &'static str, factory: Arc<dyn EngineFactory>) -> Self {
        self.entries.insert(name, factory);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn EngineFactory>> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

impl fmt::Debug for EngineFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("EngineFamily").field("formats", &names).finish()
    }
}

#[derive(Debug, Clone)]
pub struct DispatchTable {
    pub capability: Capability,
    pub compressors: EngineFamily,
    pub decompressors: EngineFamily,
}

impl DispatchTable {
    pub fn new(capability: Capability) -> Self {
        let mode = capability.engine_mode();
        Self {
            capability,
            compressors: EngineFamily::flate(Direction::Compress, mode),
            decompressors: EngineFamily::flate(Direction::Decompress, mode),
        }
    }

    /// Process-wide table built from `Capability::global()`.
    pub fn global() -> &'static DispatchTable {
        static TABLE: OnceLock<DispatchTable> = OnceLock::new();
        TABLE.get_or_init(|| DispatchTable::new(Capability::global()))
    }

    pub fn family(&self, direction: Direction) -> &EngineFamily {
        match direction {
            Direction::Compress   => &self.compressors,
            Direction::Decompress => &self.decompressors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_direction_knows_every_format() {
        for capability in [Capability::WORKER, Capability::INLINE] {
            let table = DispatchTable::new(capability);
            for direction in [Direction::Compress, Direction::Decompress] {
                for format in CompressionFormat::ALL {
                    assert!(table.family(direction).contains(format.name()));
                }
            }
        }
    }

    #[test]
    fn only_compressors_accept_options() {
        let table = DispatchTable::new(Capability::INLINE);
        assert!(table.compressors.get("gzip").unwrap().accepts_options());
        assert!(!table.decompressors.get("gzip").unwrap().accepts_options());
        assert!(table.compressors.get("brotli").is_none());
    }
}
