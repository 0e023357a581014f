//! # acescvt-core
//!
//! Texture grouping and batch colorspace conversion for ACES pipelines.
//!
//! A texture directory is scanned, its files are folded into groups that
//! share one logical texture series (UDIM tiles, frames, UV tiles), each
//! group gets a guessed [`MapType`], and the selected groups are converted
//! through an external colorspace tool and copied back next to the sources.
//!
//! ```text
//! scan_directory -> group_files -> Session (selection, overrides)
//!                                     |
//!                                     v
//!                         plan_batch -> run_batch -> BatchReport
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use acescvt_core::{group_files, MapType, PatternTokenizer};
//!
//! let paths = ["tex/shot_diffuse.1002.exr", "tex/shot_diffuse.1001.exr", "tex/shot_normal.1001.exr"];
//! let groups = group_files(paths, &PatternTokenizer::default());
//!
//! assert_eq!(groups.len(), 2);
//! let diffuse = groups.get("shot_diffuse.<UDIM>.exr").unwrap();
//! assert_eq!(diffuse.len(), 2);
//! assert_eq!(diffuse.map_type(), MapType::OutSrgb);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod batch;
pub mod convert;
pub mod error;
pub mod filter;
pub mod group;
pub mod maptype;
pub mod pattern;
pub mod plan;
pub mod probe;
pub mod session;
pub mod settings;
pub mod texture;
pub mod worker;

pub use batch::{is_writable, run_batch, run_conversion, BatchEvent, BatchReport};
pub use convert::{Converter, ExternalConverter};
pub use error::{Error, Result};
pub use filter::ExtensionFilter;
pub use group::{
    group_files, group_files_with_progress, scan_and_group, scan_directory, GroupMap, TextureGroup,
};
pub use maptype::{classify_map_type, ColorspacePair, MapType};
pub use pattern::{PatternTokenizer, TilingMode};
pub use plan::{
    batch_summary, plan_batch, plan_conversion, plan_files, ConversionJob, ConversionStep,
    SelectedGroup, Selection,
};
pub use probe::{EnvVarProbe, EnvironmentProbe, Standalone};
pub use session::{GroupEntry, Session, SortKey};
pub use settings::Settings;
pub use texture::TextureFile;
pub use worker::{Worker, WorkerEvent};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::batch::{run_batch, run_conversion, BatchEvent, BatchReport};
    pub use crate::convert::{Converter, ExternalConverter};
    pub use crate::error::{Error, Result};
    pub use crate::group::{group_files, scan_and_group, GroupMap, TextureGroup};
    pub use crate::maptype::{classify_map_type, MapType};
    pub use crate::pattern::PatternTokenizer;
    pub use crate::session::Session;
}
