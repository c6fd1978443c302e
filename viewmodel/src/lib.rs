//! Framework-neutral view-model for the portal's polling table blocks.
//!
//! A [`PollingTable`] owns the dataset fetched from one backend endpoint, keeps it
//! fresh on a fixed interval, derives the filtered/sorted rows the UI renders and
//! tracks the single add/edit/view/delete modal of the block.

pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod filter;
pub mod modal;
pub mod poller;
pub mod prefs;
pub mod record;
pub mod service;
pub mod sort;
pub mod store;
pub mod view;

pub use clock::Clock;
#[cfg(feature = "tokio-clock")]
pub use clock::TokioClock;
pub use config::PollConfig;
pub use error::{AppError, ErrorPayload, FieldError};
pub use filter::{FilterCriteria, FilterValue};
pub use modal::{ModalFormState, ModalMode};
pub use poller::{PollTask, PollingTable, RefreshTimer};
pub use prefs::{MemoryStorage, PreferenceStorage, Preferences, ViewMode};
pub use record::{Column, ColumnKind, FieldValue, FilterKind, TableRecord};
pub use service::{DataService, ExportFormat, RecordMutations};
pub use sort::{SortOrder, SortSpec};
pub use store::TableStore;
pub use view::{TableSnapshot, TableStatus};
