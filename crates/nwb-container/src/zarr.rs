//! Zarr v2 directory-store backend.
//!
//! Every group is a directory with `.zgroup` and `.zattrs`. Every dataset is a
//! directory with `.zarray`, `.zattrs`, and a single uncompressed chunk `0`
//! holding `vlen-utf8` encoded strings:
//!
//! ```text
//! u32 LE item count, then per item: u32 LE byte length + UTF-8 bytes
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use nwb_core::Backend;
use serde_json::{Map, Value, json};

use crate::layout::{self, Attribute, Dataset, DatasetValue, Group};
use crate::{ContainerError, ContainerWriter, NwbFile};

const ZARR_FORMAT: u8 = 2;

/// Writes containers as Zarr v2 directory stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZarrWriter;

impl ContainerWriter for ZarrWriter {
    fn backend(&self) -> Backend {
        Backend::Zarr
    }

    fn write(&self, file: &NwbFile, path: &Path) -> Result<(), ContainerError> {
        remove_existing(path)?;
        write_group(path, &layout::build(file))?;
        tracing::debug!(path = %path.display(), "wrote zarr store");
        Ok(())
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ContainerError + '_ {
    move |source| ContainerError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn remove_existing(path: &Path) -> Result<(), ContainerError> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(source),
    };
    result.map_err(io_error(path))
}

fn write_json(path: PathBuf, value: &Value) -> Result<(), ContainerError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| ContainerError::Json {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, format!("{text}\n")).map_err(io_error(&path))
}

fn attrs_json(attrs: &[Attribute]) -> Value {
    Value::Object(
        attrs
            .iter()
            .map(|a| (a.name.clone(), Value::String(a.value.clone())))
            .collect::<Map<_, _>>(),
    )
}

fn write_group(dir: &Path, group: &Group) -> Result<(), ContainerError> {
    fs::create_dir_all(dir).map_err(io_error(dir))?;
    write_json(dir.join(".zgroup"), &json!({ "zarr_format": ZARR_FORMAT }))?;
    write_json(dir.join(".zattrs"), &attrs_json(&group.attrs))?;

    for dataset in &group.datasets {
        write_dataset(&dir.join(&dataset.name), dataset)?;
    }
    for child in &group.groups {
        write_group(&dir.join(&child.name), child)?;
    }
    Ok(())
}

fn write_dataset(dir: &Path, dataset: &Dataset) -> Result<(), ContainerError> {
    fs::create_dir_all(dir).map_err(io_error(dir))?;

    let items: &[String] = match &dataset.value {
        DatasetValue::Scalar(value) => std::slice::from_ref(value),
        DatasetValue::Array(values) => values,
    };
    let len = items.len();

    write_json(
        dir.join(".zarray"),
        &json!({
            "chunks": [len.max(1)],
            "compressor": null,
            "dtype": "|O",
            "fill_value": null,
            "filters": [{ "id": "vlen-utf8" }],
            "order": "C",
            "shape": [len],
            "zarr_format": ZARR_FORMAT,
        }),
    )?;

    let mut attrs = attrs_json(&dataset.attrs);
    if let Value::Object(map) = &mut attrs {
        map.insert("zarr_dtype".to_string(), Value::String("str".to_string()));
    }
    write_json(dir.join(".zattrs"), &attrs)?;

    if len > 0 {
        let chunk = dir.join("0");
        fs::write(&chunk, encode_vlen_utf8(items)).map_err(io_error(&chunk))?;
    }
    Ok(())
}

/// Encode strings with the `vlen-utf8` codec.
#[must_use]
pub fn encode_vlen_utf8(items: &[String]) -> Vec<u8> {
    let payload: usize = items.iter().map(String::len).sum();
    let mut out = Vec::with_capacity(4 + items.len() * 4 + payload);
    out.extend_from_slice(&vlen_header(items.len()));
    for item in items {
        out.extend_from_slice(&vlen_header(item.len()));
        out.extend_from_slice(item.as_bytes());
    }
    out
}

fn vlen_header(len: usize) -> [u8; 4] {
    // Metadata strings are far below 4 GiB.
    u32::try_from(len).unwrap_or(u32::MAX).to_le_bytes()
}

/// Decode a `vlen-utf8` chunk. Returns `None` on truncated or non-UTF-8 input.
#[must_use]
pub fn decode_vlen_utf8(bytes: &[u8]) -> Option<Vec<String>> {
    fn take_u32(bytes: &[u8], at: &mut usize) -> Option<usize> {
        let raw: [u8; 4] = bytes.get(*at..*at + 4)?.try_into().ok()?;
        *at += 4;
        usize::try_from(u32::from_le_bytes(raw)).ok()
    }

    let mut at = 0;
    let count = take_u32(bytes, &mut at)?;
    let mut items = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let len = take_u32(bytes, &mut at)?;
        let raw = bytes.get(at..at + len)?;
        at += len;
        items.push(String::from_utf8(raw.to_vec()).ok()?);
    }
    Some(items)
}
