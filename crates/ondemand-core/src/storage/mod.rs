//! Disk side of a download: temp file, sequential writes, atomic finalize.
//!
//! Bytes go to `<final>.part`, preallocated when the size is known. Only a
//! fully written and synced file is renamed onto the final name; an
//! unfinished writer deletes its temp file when dropped.

mod builder;
mod writer;

pub use builder::StorageWriterBuilder;
pub use writer::StorageWriter;

/// Suffix of the in-progress file next to the final path.
pub const TEMP_SUFFIX: &str = ".part";

/// Temp path for `final_path` (`lora.safetensors` → `lora.safetensors.part`).
pub fn temp_path(final_path: &std::path::Path) -> std::path::PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    std::path::PathBuf::from(o)
}
