/// Project documents embedding a results framework.
pub mod document;
mod persist;
mod workspace;

pub use document::{DocumentLoadError, ProjectDocument};
pub use persist::{JsonFile, Persist, PersistError};
pub use workspace::{META_DIR, OpenError, Workspace, config_path};
