//! Backend-neutral NWB group/dataset tree.
//!
//! Both writers serialize the same [`Group`] tree, so the HDF5 and Zarr
//! outputs carry identical paths, attributes, and values.

use crate::NwbFile;

pub const NWB_NAMESPACE: &str = "core";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetValue {
    /// Single string, stored as a one-element (Zarr) or scalar (HDF5) dataset.
    Scalar(String),
    /// One-dimensional string array.
    Array(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub name: String,
    pub value: DatasetValue,
    pub attrs: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub datasets: Vec<Dataset>,
    pub groups: Vec<Group>,
}

impl Group {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.push(Attribute {
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    fn scalar(mut self, name: &str, value: impl Into<String>) -> Self {
        self.datasets.push(Dataset {
            name: name.to_string(),
            value: DatasetValue::Scalar(value.into()),
            attrs: Vec::new(),
        });
        self
    }

    fn optional_scalar(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.scalar(name, value),
            None => self,
        }
    }

    fn child(mut self, group: Self) -> Self {
        self.groups.push(group);
        self
    }

    /// Find a nested group by `/`-separated path.
    #[must_use]
    pub fn group(&self, path: &str) -> Option<&Self> {
        path.split('/')
            .filter(|part| !part.is_empty())
            .try_fold(self, |group, part| {
                group.groups.iter().find(|child| child.name == part)
            })
    }

    #[must_use]
    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.name == name)
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// Lay out `file` as the NWB 2.x group tree.
#[must_use]
pub fn build(file: &NwbFile) -> Group {
    let subject = &file.subject;
    let dob = subject.date_of_birth.map(|d| d.to_rfc3339());

    let mut subject_group = Group::named("subject")
        .attr("namespace", NWB_NAMESPACE)
        .attr("neurodata_type", "Subject")
        .attr("object_id", file.subject_object_id.to_string())
        .scalar("age", subject.age.as_str())
        .optional_scalar("date_of_birth", dob.as_deref())
        .optional_scalar("description", subject.description.as_deref())
        .optional_scalar("genotype", subject.genotype.as_deref())
        .scalar("sex", subject.sex.as_str())
        .scalar("species", subject.species.as_str())
        .optional_scalar("strain", subject.strain.as_deref())
        .scalar("subject_id", subject.subject_id.as_str());
    if let Some(age) = subject_group.datasets.iter_mut().find(|d| d.name == "age") {
        age.attrs.push(Attribute {
            name: "reference".to_string(),
            value: "birth".to_string(),
        });
    }

    let general = Group::named("general")
        .optional_scalar("institution", file.institution.as_deref())
        .scalar("session_id", file.session_id.as_str())
        .child(subject_group);

    let mut root = Group::named("")
        .attr("namespace", NWB_NAMESPACE)
        .attr("neurodata_type", "NWBFile")
        .attr("nwb_version", crate::NWB_VERSION)
        .attr("object_id", file.identifier.to_string())
        .scalar("identifier", file.identifier.to_string())
        .scalar("session_description", file.session_description.as_str())
        .scalar("session_start_time", file.session_start_time.to_rfc3339())
        .scalar(
            "timestamps_reference_time",
            file.timestamps_reference_time.to_rfc3339(),
        )
        .child(Group::named("acquisition"))
        .child(Group::named("analysis"))
        .child(general)
        .child(Group::named("processing"))
        .child(
            Group::named("stimulus")
                .child(Group::named("presentation"))
                .child(Group::named("templates")),
        );
    root.datasets.push(Dataset {
        name: "file_create_date".to_string(),
        value: DatasetValue::Array(vec![file.file_create_date.to_rfc3339()]),
        attrs: Vec::new(),
    });
    root
}
