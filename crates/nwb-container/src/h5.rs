//! HDF5 single-file backend (feature `hdf5`).

use std::path::Path;
use std::str::FromStr;

use hdf5::types::VarLenUnicode;
use nwb_core::Backend;

use crate::layout::{self, Attribute, DatasetValue, Group};
use crate::{ContainerError, ContainerWriter, NwbFile};

/// Writes containers as one HDF5 file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hdf5Writer;

impl ContainerWriter for Hdf5Writer {
    fn backend(&self) -> Backend {
        Backend::Hdf5
    }

    fn write(&self, file: &NwbFile, path: &Path) -> Result<(), ContainerError> {
        // `create` truncates an existing file. The handle closes on drop,
        // including on the error path.
        let h5 = hdf5::File::create(path)?;
        write_group(&h5, &layout::build(file))?;
        h5.flush()?;
        tracing::debug!(path = %path.display(), "wrote hdf5 file");
        Ok(())
    }
}

fn text(value: &str) -> Result<VarLenUnicode, ContainerError> {
    // Only interior NUL bytes are rejected.
    VarLenUnicode::from_str(value)
        .map_err(|e| ContainerError::Hdf5(hdf5::Error::from(e.to_string())))
}

fn write_attrs(location: &hdf5::Location, attrs: &[Attribute]) -> Result<(), ContainerError> {
    for attr in attrs {
        location
            .new_attr::<VarLenUnicode>()
            .shape(())
            .create(attr.name.as_str())?
            .write_scalar(&text(&attr.value)?)?;
    }
    Ok(())
}

fn write_group(h5: &hdf5::Group, group: &Group) -> Result<(), ContainerError> {
    write_attrs(h5, &group.attrs)?;

    for dataset in &group.datasets {
        let ds = match &dataset.value {
            DatasetValue::Scalar(value) => {
                let ds = h5
                    .new_dataset::<VarLenUnicode>()
                    .shape(())
                    .create(dataset.name.as_str())?;
                ds.write_scalar(&text(value)?)?;
                ds
            }
            DatasetValue::Array(values) => {
                let values = values
                    .iter()
                    .map(|v| text(v))
                    .collect::<Result<Vec<_>, _>>()?;
                h5.new_dataset_builder()
                    .with_data(values.as_slice())
                    .create(dataset.name.as_str())?
            }
        };
        write_attrs(&ds, &dataset.attrs)?;
    }

    for child in &group.groups {
        let sub = h5.create_group(&child.name)?;
        write_group(&sub, child)?;
    }
    Ok(())
}
