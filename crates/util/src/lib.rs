//! Helpers for code that runs against, or inside, the Latch platform.

pub mod config;
pub mod provenance;

pub use config::{LATCH_CONFIG_DIR_ENV, latch_config_dir, token_path, workspace_path};
pub use provenance::{ProvenanceError, WORKFLOW_VERSION_ENV, workflow_version};
