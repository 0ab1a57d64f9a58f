//! Persister module for turning API responses into artifacts on disk.
//!
//! For each successful job the persister downloads the generated image and
//! writes two files sharing a root name into the bucket directory:
//!
//! - `<root>.jpg`: the image bytes, streamed straight from the download
//! - `<root>.prompt`: JSON `{"prompt": ..., "revised_prompt": ...}`
//!
//! The root name is the local wall-clock time (year, month, day, hour,
//! minute, second, unpadded) followed by `_<job index>`.
//!
//! The output directory must already exist; the orchestrator provisions it
//! once per run. Files are never rolled back: a failed metadata write leaves
//! the image in place.
//!
//! # Example
//!
//! ```ignore
//! use aimakeme_core::persister::AssetPersister;
//!
//! let persister = AssetPersister::from_config(&config.api)?;
//! let artifact = persister.resolve(response, &options, 0, &output_dir).await?;
//! println!("Saved {} ({} bytes)", artifact.image_path.display(), artifact.image_bytes);
//! ```

mod asset_persister;
mod error;
mod types;

pub use asset_persister::{root_name, AssetPersister, IMAGE_EXTENSION, PROMPT_EXTENSION};
pub use error::PersistError;
pub use types::{Artifact, PromptRecord};
