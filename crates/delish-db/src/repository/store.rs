//! SurrealDB implementation of [`StoreRepository`].

use chrono::{DateTime, Utc};
use delish_core::error::DelishResult;
use delish_core::models::store::{CreateStore, Location, Store, TagCount, UpdateStore};
use delish_core::repository::StoreRepository;
use delish_core::slug::{disambiguate, slugify};
use delish_core::tags::{normalize_tags, tally};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct StoreRow {
    name: String,
    slug: String,
    description: String,
    location: Option<serde_json::Value>,
    photos: Vec<String>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct StoreRowWithId {
    record_id: String,
    name: String,
    slug: String,
    description: String,
    location: Option<serde_json::Value>,
    photos: Vec<String>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct SlugRow {
    slug: String,
}

#[derive(Debug, SurrealValue)]
struct TagsRow {
    tags: Vec<String>,
}

fn parse_location(value: Option<serde_json::Value>) -> Result<Option<Location>, DbError> {
    value
        .map(|v| {
            serde_json::from_value(v)
                .map_err(|e| DbError::Query(format!("invalid stored location: {e}")))
        })
        .transpose()
}

fn location_value(location: &Location) -> Result<serde_json::Value, DbError> {
    serde_json::to_value(location).map_err(|e| DbError::Query(format!("invalid location: {e}")))
}

impl StoreRow {
    fn into_store(self, id: Uuid) -> Result<Store, DbError> {
        Ok(Store {
            id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            location: parse_location(self.location)?,
            photos: self.photos,
            tags: self.tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl StoreRowWithId {
    fn try_into_store(self) -> Result<Store, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        Ok(Store {
            id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            location: parse_location(self.location)?,
            photos: self.photos,
            tags: self.tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Store repository.
#[derive(Clone)]
pub struct SurrealStoreRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealStoreRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Derive a slug from `base` that no existing store uses yet.
    async fn unique_slug(&self, base: &str) -> Result<String, DbError> {
        let mut result = self
            .db
            .query("SELECT slug FROM store WHERE string::starts_with(slug, $base)")
            .bind(("base", base.to_string()))
            .await?;
        let rows: Vec<SlugRow> = result.take(0)?;

        Ok(disambiguate(base, rows.iter().map(|r| r.slug.as_str())))
    }

    async fn select_many(
        &self,
        filter: &str,
        tag: Option<String>,
    ) -> Result<Vec<Store>, DbError> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM store {filter} \
             ORDER BY created_at ASC"
        );
        let mut builder = self.db.query(&query);
        if let Some(tag) = tag {
            builder = builder.bind(("tag", tag));
        }

        let mut result = builder.await?;
        let rows: Vec<StoreRowWithId> = result.take(0)?;

        rows.into_iter()
            .map(StoreRowWithId::try_into_store)
            .collect()
    }
}

impl<C: Connection> StoreRepository for SurrealStoreRepository<C> {
    async fn create(&self, input: CreateStore) -> DelishResult<Store> {
        input.validate()?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let name = input.name.trim().to_string();
        let slug = self.unique_slug(&slugify(&name)).await?;
        let tags = normalize_tags(&input.tags);
        let photos: Vec<String> = input.photo.into_iter().collect();

        let mut sets = vec![
            "name = $name",
            "slug = $slug",
            "description = $description",
            "photos = $photos",
            "tags = $tags",
        ];
        if input.location.is_some() {
            sets.push("location = $location");
        }

        let query = format!(
            "CREATE type::record('store', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("name", name))
            .bind(("slug", slug))
            .bind(("description", input.description.trim().to_string()))
            .bind(("photos", photos))
            .bind(("tags", tags));

        if let Some(location) = &input.location {
            builder = builder.bind(("location", location_value(location)?));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<StoreRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "store".into(),
            id: id_str,
        })?;

        Ok(row.into_store(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> DelishResult<Option<Store>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('store', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StoreRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_store(id)?)),
            None => Ok(None),
        }
    }

    async fn get_by_slug(&self, slug: &str) -> DelishResult<Option<Store>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM store WHERE slug = $slug",
            )
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StoreRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_store()?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> DelishResult<Vec<Store>> {
        Ok(self.select_many("", None).await?)
    }

    async fn list_by_tag(&self, tag: Option<&str>) -> DelishResult<Vec<Store>> {
        let stores = match tag {
            Some(tag) => {
                self.select_many("WHERE tags CONTAINS $tag", Some(tag.to_string()))
                    .await?
            }
            None => self.select_many("WHERE array::len(tags) > 0", None).await?,
        };
        Ok(stores)
    }

    async fn update(&self, id: Uuid, input: UpdateStore) -> DelishResult<Option<Store>> {
        input.validate()?;

        let id_str = id.to_string();

        let mut sets = vec!["name = $name", "description = $description", "tags = $tags"];
        if input.location.is_some() {
            sets.push("location = $location");
        }
        if input.photo.is_some() {
            sets.push("photos = array::append(photos, $photo)");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('store', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str))
            .bind(("name", input.name.trim().to_string()))
            .bind(("description", input.description.trim().to_string()))
            .bind(("tags", normalize_tags(&input.tags)));

        if let Some(location) = &input.location {
            builder = builder.bind(("location", location_value(location)?));
        }
        if let Some(photo) = input.photo {
            builder = builder.bind(("photo", photo));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<StoreRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_store(id)?)),
            None => Ok(None),
        }
    }

    async fn tag_counts(&self) -> DelishResult<Vec<TagCount>> {
        let mut result = self
            .db
            .query("SELECT tags FROM store")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagsRow> = result.take(0).map_err(DbError::from)?;
        Ok(tally(rows.iter().map(|r| r.tags.as_slice())))
    }
}
