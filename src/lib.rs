//! # image-metadata
//!
//! Batch image metadata extraction of basic image properties, EXIF tags and
//! GPS sub-tags for every image in a directory, as structured records and an
//! optional JSON document.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use image_metadata::config::Config;
//! use image_metadata::extract::FileProbe;
//! use image_metadata::pipeline::{collect_images, run_batch, save_json, BatchSummary};
//! use std::path::{Path, PathBuf};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!
//!     // Collect supported image files from paths (files or directories)
//!     let images = collect_images(&[PathBuf::from("./photos")], &config.discovery);
//!
//!     let batch = run_batch(&images, &FileProbe, |_, record| {
//!         if let Some(ref err) = record.error {
//!             eprintln!("{err}");
//!         }
//!     });
//!
//!     let summary = BatchSummary::of(&batch);
//!     println!("{} of {} images read", summary.succeeded, summary.total);
//!
//!     let saved = save_json(&batch, Path::new("."))?;
//!     println!("Metadata saved to {}", saved.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Single Files
//!
//! ```rust,no_run
//! use image_metadata::extract::extract;
//! use std::path::Path;
//!
//! let record = extract(Path::new("photo.jpg"));
//! if let Some(info) = &record.basic_info {
//!     println!("{} {}x{} {}", info.format, info.width, info.height, info.mode);
//! }
//! for (tag, value) in record.gps_data.iter() {
//!     println!("{tag}: {value}");
//! }
//! ```
//!
//! ## Record Layout
//!
//! | Field | Content |
//! |-------|---------|
//! | `filename` | path as supplied |
//! | `basic_info` | size, width, height, format, mode, animation flag, frame count |
//! | `exif_data` | resolved tag name → normalized string or `null` |
//! | `gps_data` | resolved GPS sub-tag name → value in native form |
//! | `error` | failure description, or `null` |
//!
//! ## Modules
//!
//! - [`config`] — Configuration types and loading/saving
//! - [`error`] — Error taxonomy
//! - [`exif`] — Raw tag reading, tag names, value normalization
//! - [`extract`] — Per-file extraction into a record
//! - [`pipeline`] — Image collection, batch runs, JSON persistence
//! - [`record`] — Record types
//! - [`report`] — Text report rendering

pub mod config;
pub mod error;
pub mod exif;
pub mod extract;
pub mod pipeline;
pub mod record;
pub mod report;

#[cfg(test)]
mod test_utils;
