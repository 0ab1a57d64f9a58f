//! Output directory management.
//!
//! Artifacts live under `<root>/<bucket>/`, where the root defaults to
//! `<home>/aimakeme`. A bucket groups the artifacts of one or more runs.
//!
//! # Example
//!
//! ```ignore
//! use aimakeme_core::storage::DirectoryProvisioner;
//!
//! let provisioner = DirectoryProvisioner::from_home()?;
//! let dir = provisioner.provision("holiday-cards").await?;
//! // dir == ~/aimakeme/holiday-cards, created if it was missing
//! ```

mod error;
mod provisioner;

pub use error::ProvisionError;
pub use provisioner::{DirectoryProvisioner, APP_NAMESPACE};
