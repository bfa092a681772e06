//! Store domain model.
//!
//! Stores are listed in the directory, addressed publicly by slug and
//! edited by id. Their location is a GeoJSON-style point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DelishError, DelishResult};

/// Tags offered on the store form.
pub const TAG_CHOICES: &[&str] = &[
    "Wifi",
    "Open Late",
    "Family Friendly",
    "Vegetarian",
    "Licensed",
];

/// The only location discriminator a store may carry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LocationKind {
    #[default]
    Point,
}

/// A geographic point with the address it was picked from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    #[serde(rename = "type", default)]
    pub kind: LocationKind,
    /// `[longitude, latitude]`, GeoJSON order.
    pub coordinates: [f64; 2],
    pub address: String,
}

impl Location {
    pub fn point(lng: f64, lat: f64, address: impl Into<String>) -> Self {
        Self {
            kind: LocationKind::Point,
            coordinates: [lng, lat],
            address: address.into(),
        }
    }

    pub fn lng(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn lat(&self) -> f64 {
        self.coordinates[1]
    }

    fn validate(&self) -> DelishResult<()> {
        if self.address.trim().is_empty() {
            return Err(DelishError::validation("You must supply an address!"));
        }
        let [lng, lat] = self.coordinates;
        if !lng.is_finite() || !lat.is_finite() {
            return Err(DelishError::validation("You must supply coordinates!"));
        }
        if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
            return Err(DelishError::validation(format!(
                "Coordinates out of range: [{lng}, {lat}]"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    /// URL-safe unique identifier derived from the name at creation.
    pub slug: String,
    pub description: String,
    pub location: Option<Location>,
    /// Photo filenames under the uploads directory, oldest first.
    pub photos: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    /// The most recently uploaded photo, used as the cover image.
    pub fn cover_photo(&self) -> Option<&str> {
        self.photos.last().map(String::as_str)
    }
}

/// Fields required to create a new store. The slug is derived by the
/// repository.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateStore {
    pub name: String,
    pub description: String,
    pub location: Option<Location>,
    /// Filename of a photo already written to the uploads directory.
    pub photo: Option<String>,
    pub tags: Vec<String>,
}

impl CreateStore {
    pub fn validate(&self) -> DelishResult<()> {
        validate_name(&self.name)?;
        if let Some(location) = &self.location {
            location.validate()?;
        }
        Ok(())
    }
}

/// Replacement values for an existing store.
///
/// Name, description and tags are always replaced. `location` is only
/// replaced when present, and `photo` is appended to the photo list.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateStore {
    pub name: String,
    pub description: String,
    pub location: Option<Location>,
    pub photo: Option<String>,
    pub tags: Vec<String>,
}

impl UpdateStore {
    pub fn validate(&self) -> DelishResult<()> {
        validate_name(&self.name)?;
        if let Some(location) = &self.location {
            location.validate()?;
        }
        Ok(())
    }

    /// Pin the location discriminator to [`LocationKind::Point`].
    pub fn force_point(mut self) -> Self {
        if let Some(location) = self.location.as_mut() {
            location.kind = LocationKind::Point;
        }
        self
    }
}

fn validate_name(name: &str) -> DelishResult<()> {
    if name.trim().is_empty() {
        return Err(DelishError::validation("Please enter a store name!"));
    }
    Ok(())
}

/// A tag with the number of stores carrying it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}
