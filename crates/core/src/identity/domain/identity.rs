use std::fmt;

use serde::{Deserialize, Serialize};

use crate::shared::storage_path::{display_name, FaceKey};

/// Identifier the vision service assigns to an enrolled face.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceId(String);

impl FaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mapping from an enrolled face to the person it belongs to.
///
/// Name, role and series are stored in display form (spaces, not
/// underscores); `filepath` is the reference image the face came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub face_id: FaceId,
    pub name: String,
    pub role: String,
    pub series_name: String,
    pub filepath: String,
}

impl Identity {
    pub fn from_reference(face_id: FaceId, face: &FaceKey) -> Self {
        Self {
            face_id,
            name: display_name(&face.artist),
            role: display_name(&face.role),
            series_name: display_name(&face.series),
            filepath: face.key.clone(),
        }
    }
}

/// Splits an external image id `artist-role` into display name and role.
///
/// Returns `None` unless the id has exactly one `-` separator.
pub fn parse_external_image_id(external_id: &str) -> Option<(String, String)> {
    let (name, role) = external_id.split_once('-')?;
    if role.contains('-') {
        return None;
    }
    Some((display_name(name), display_name(role)))
}
