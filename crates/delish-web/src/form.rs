//! Upload stage of the store form pipeline.
//!
//! Reads a `multipart/form-data` store submission into memory. At most one
//! file is accepted, in the `photo` field, and only when its declared
//! content type is an image; anything else stops the request here, before
//! a file is written or a record touched.

use axum::extract::Multipart;
use axum::extract::multipart::Field;
use delish_core::error::{DelishError, DelishResult};
use delish_core::models::store::{CreateStore, Location, UpdateStore};

use crate::error::WebError;
use crate::photo::{PHOTO_FIELD, PhotoUpload, is_image};

/// A parsed store form. Field names follow the HTML form in
/// [`crate::views::store_form`].
#[derive(Debug, Default)]
pub struct StoreSubmission {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub address: String,
    /// Raw `location[coordinates][0]` input.
    pub lng: String,
    /// Raw `location[coordinates][1]` input.
    pub lat: String,
    pub photo: Option<PhotoUpload>,
}

impl StoreSubmission {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, WebError> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if let Some(file_name) = field.file_name() {
                let file_name = file_name.to_string();
                submission.accept_file(name, &file_name, field).await?;
                continue;
            }

            let value = field.text().await?;
            submission.set_text(&name, value);
        }

        Ok(submission)
    }

    async fn accept_file(
        &mut self,
        name: String,
        file_name: &str,
        field: Field<'_>,
    ) -> Result<(), WebError> {
        if name != PHOTO_FIELD {
            return Err(WebError::UnexpectedField(name));
        }
        let content_type = field.content_type().unwrap_or_default().to_string();

        // Browsers send an unnamed part with no body when no file was
        // chosen. Only that combination counts as absent.
        if file_name.is_empty() {
            let bytes = field.bytes().await?;
            if bytes.is_empty() {
                return Ok(());
            }
            self.check_photo(name, &content_type)?;
            self.photo = Some(PhotoUpload {
                content_type,
                bytes,
            });
            return Ok(());
        }

        self.check_photo(name, &content_type)?;
        let bytes = field.bytes().await?;
        self.photo = Some(PhotoUpload {
            content_type,
            bytes,
        });
        Ok(())
    }

    /// A photo is accepted once, and only with an image content type.
    fn check_photo(&self, name: String, content_type: &str) -> Result<(), WebError> {
        if self.photo.is_some() {
            return Err(WebError::UnexpectedField(name));
        }
        if !is_image(content_type) {
            return Err(WebError::Rejected {
                content_type: content_type.to_string(),
            });
        }
        Ok(())
    }

    fn set_text(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = value.trim().to_string(),
            "description" => self.description = value.trim().to_string(),
            "tags" => self.tags.push(value),
            "location[address]" => self.address = value,
            "location[coordinates][0]" => self.lng = value,
            "location[coordinates][1]" => self.lat = value,
            // `location[type]` included: the discriminator is never taken
            // from the request.
            _ => {}
        }
    }

    /// The submitted location, or `None` when every location input is blank.
    pub fn location(&self) -> DelishResult<Option<Location>> {
        let address = self.address.trim();
        let lng = self.lng.trim();
        let lat = self.lat.trim();

        if address.is_empty() && lng.is_empty() && lat.is_empty() {
            return Ok(None);
        }

        Ok(Some(Location::point(
            parse_coordinate(lng)?,
            parse_coordinate(lat)?,
            address,
        )))
    }

    /// Split into the creation input and the photo still to be processed.
    pub fn into_create(mut self) -> Result<(CreateStore, Option<PhotoUpload>), WebError> {
        let location = self.location()?;
        let photo = self.photo.take();
        let input = CreateStore {
            name: self.name,
            description: self.description,
            location,
            photo: None,
            tags: self.tags,
        };
        Ok((input, photo))
    }

    /// Split into the update input and the photo still to be processed.
    pub fn into_update(mut self) -> Result<(UpdateStore, Option<PhotoUpload>), WebError> {
        let location = self.location()?;
        let photo = self.photo.take();
        let input = UpdateStore {
            name: self.name,
            description: self.description,
            location,
            photo: None,
            tags: self.tags,
        };
        Ok((input, photo))
    }
}

fn parse_coordinate(raw: &str) -> DelishResult<f64> {
    raw.parse::<f64>()
        .map_err(|_| DelishError::validation("You must supply coordinates!"))
}
