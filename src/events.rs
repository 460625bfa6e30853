//
// events.rs
// Dicom-Tagfix
//
// Observability sink injected by the caller. The engine reports decisions and per-file
// outcomes here instead of configuring a logger of its own.
//

use std::path::PathBuf;
use std::sync::Mutex;

use dicom::core::Tag;
use tracing::{debug, info, warn};

use crate::render::format_tag;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixEvent {
    CorruptionDecision {
        representative: PathBuf,
        sentinel: String,
        corrupted: bool,
    },
    FileCorrected {
        path: PathBuf,
        tags: Vec<Tag>,
    },
    FileUnchanged {
        path: PathBuf,
    },
    FileFallbackCopied {
        path: PathBuf,
        reason: String,
    },
    SubdirectoryCopied {
        path: PathBuf,
    },
    BackupDeleted {
        path: PathBuf,
    },
    BackupRetained {
        path: PathBuf,
    },
}

pub trait EventSink {
    fn record(&self, event: FixEvent);
}

/// Forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: FixEvent) {
        match event {
            FixEvent::CorruptionDecision {
                representative,
                sentinel,
                corrupted: true,
            } => info!(
                "'{}' found in {}: correcting directory",
                sentinel,
                representative.display()
            ),
            FixEvent::CorruptionDecision {
                representative,
                sentinel,
                corrupted: false,
            } => info!(
                "no corrections made: '{}' not found in any tag of {}",
                sentinel,
                representative.display()
            ),
            FixEvent::FileCorrected { path, tags } => {
                let tags: Vec<String> = tags.into_iter().map(format_tag).collect();
                debug!("corrected {} in {}", tags.join(", "), path.display())
            }
            FixEvent::FileUnchanged { path } => debug!("no match in {}, copied", path.display()),
            FixEvent::FileFallbackCopied { path, reason } => {
                warn!("error modifying {} ({}), copied original", path.display(), reason)
            }
            FixEvent::SubdirectoryCopied { path } => {
                warn!("found directory {}, moved without inspection", path.display())
            }
            FixEvent::BackupDeleted { path } => info!("deleted originals at {}", path.display()),
            FixEvent::BackupRetained { path } => info!("originals kept at {}", path.display()),
        }
    }
}

/// Keeps events in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<FixEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FixEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: FixEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
