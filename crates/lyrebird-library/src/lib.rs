// SPDX-License-Identifier: GPL-3.0-or-later
pub mod batch;
pub mod filename_heuristics;
pub mod metadata;
pub mod scan;
pub mod store;
pub mod tags;

pub use batch::{BatchSettings, BatchSummary, FileOutcome, FileReport, LyricsBatch};
pub use filename_heuristics::{FilenameHeuristicsError, FilenameHeuristicsService, ParsedFilename};
pub use metadata::{MetadataSource, TagMetadataSource};
pub use scan::{scan_audio_files, ScanError, ScannedAudioFile};
pub use store::{LyricsFileStore, StoreError};
pub use tags::{EmbeddedTagReader, EmbeddedTags, TagReadError};
