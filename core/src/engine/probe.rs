//! Worker-thread capability detection.

use std::sync::OnceLock;

use log::{debug, warn};

use crate::compression::{create_compressor, CompressionFormat};
use crate::config::{EnginePreference, StreamConfig};
use crate::engine::types::{EngineContext, EngineMode};
use crate::engine::worker::WorkerEngine;

/// Whether worker engines can be used in this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    pub worker_engines: bool,
}

impl Capability {
    pub const WORKER: Capability = Capability { worker_engines: true };
    pub const INLINE: Capability = Capability { worker_engines: false };

    /// Start one worker engine and release it straight away.
    pub fn probe() -> Self {
        let codec = match create_compressor(CompressionFormat::DeflateRaw, None) {
            Ok(codec) => codec,
            Err(e) => {
                warn!("[PROBE] could not build probe codec: {e}");
                return Self::INLINE;
            }
        };

        let worker_engines = match WorkerEngine::spawn("probe", codec, EngineContext::detached()) {
            Ok(engine) => engine.join().is_ok(),
            Err(e) => {
                warn!("[PROBE] worker threads unavailable: {e}");
                false
            }
        };

        debug!("[PROBE] worker_engines={worker_engines}");
        Self { worker_engines }
    }

    pub fn detect(preference: EnginePreference) -> Self {
        match preference {
            EnginePreference::Auto   => Self::probe(),
            EnginePreference::Worker => Self::WORKER,
            EnginePreference::Inline => Self::INLINE,
        }
    }

    /// Detected once per process, honouring `StreamConfig::global`.
    pub fn global() -> Self {
        static CAPABILITY: OnceLock<Capability> = OnceLock::new();
        *CAPABILITY.get_or_init(|| Capability::detect(StreamConfig::global().engine))
    }

    pub fn engine_mode(self) -> EngineMode {
        if self.worker_engines {
            EngineMode::Worker
        } else {
            EngineMode::Inline
        }
    }
}
