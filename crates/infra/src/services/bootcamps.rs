use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use devcamper_auth::Principal;
use devcamper_catalog::{BOOTCAMPS, BootcampInput, COURSES, ensure_publish_quota, slugify};
use devcamper_core::{DomainError, DomainResult, RecordId};
use devcamper_query::{Document, Filter, Paginated, QuerySpec};

use super::ensure_owner;
use crate::geo::{GeoPoint, miles_to_radians};
use crate::geocoder::Geocoder;
use crate::pipeline::advanced_results;
use crate::store::DocumentStore;

/// A file received for a bootcamp photo.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub directory: PathBuf,
    pub max_bytes: u64,
}

#[derive(Clone)]
pub struct BootcampService {
    store: Arc<dyn DocumentStore>,
    geocoder: Arc<dyn Geocoder>,
}

fn not_found(id: impl std::fmt::Display) -> DomainError {
    DomainError::not_found(format!("Bootcamp not found with id of {id}"))
}

impl BootcampService {
    pub fn new(store: Arc<dyn DocumentStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { store, geocoder }
    }

    pub async fn list(&self, spec: &QuerySpec) -> DomainResult<Paginated<Document>> {
        advanced_results(self.store.as_ref(), BOOTCAMPS, spec).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: RecordId) -> DomainResult<Document> {
        self.store.find_by_id(BOOTCAMPS, id).await?.ok_or_else(|| not_found(id))
    }

    /// quota → validate → slug → geocode → persist.
    #[instrument(skip(self, principal, input), fields(principal = %principal.id))]
    pub async fn create(&self, principal: &Principal, input: BootcampInput) -> DomainResult<Document> {
        let owner = RecordId::from(principal.id);

        // Count and insert are separate operations; concurrent creates by the
        // same principal can both pass the check.
        let owned = self.store.count(BOOTCAMPS, &Filter::eq("user", owner.to_string())).await?;
        ensure_publish_quota(principal, owned)?;

        let new = input.validate_new()?;

        let slug = slugify(&new.name);

        let location = self.geocoder.geocode(&new.address).await?;
        if location.is_none() {
            warn!(address = %new.address, "address could not be geocoded; bootcamp stored without location");
        }

        let record = new.into_record(owner, slug, location, Utc::now());
        let doc = self.store.insert(BOOTCAMPS, record.to_document()?).await?;
        info!(id = %record.id, "bootcamp created");
        Ok(doc)
    }

    #[instrument(skip(self, principal, input), fields(id = %id, principal = %principal.id))]
    pub async fn update(&self, principal: &Principal, id: RecordId, input: BootcampInput) -> DomainResult<Document> {
        let existing = self.get(id).await?;
        ensure_owner(principal, &existing)?;

        let changes = input.validate_patch()?;
        self.store
            .update_by_id(BOOTCAMPS, id, changes)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Load, authorize, cascade to courses, then delete.
    #[instrument(skip(self, principal), fields(id = %id, principal = %principal.id))]
    pub async fn remove(&self, principal: &Principal, id: RecordId) -> DomainResult<()> {
        let existing = self.get(id).await?;
        ensure_owner(principal, &existing)?;

        let removed_courses = self
            .store
            .delete_many(COURSES, &Filter::eq("bootcamp", id.to_string()))
            .await?;
        info!(courses = removed_courses, "courses removed with bootcamp");

        self.store.delete_by_id(BOOTCAMPS, id).await?;
        Ok(())
    }

    /// Bootcamps within `distance` miles of the zipcode's location.
    #[instrument(skip(self))]
    pub async fn within_radius(&self, zipcode: &str, distance: f64) -> DomainResult<Vec<Document>> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(DomainError::bad_request(format!("Invalid distance: {distance}")));
        }
        let location = self
            .geocoder
            .geocode(zipcode)
            .await?
            .ok_or_else(|| DomainError::bad_request(format!("Could not find a location for zipcode {zipcode}")))?;

        let center = GeoPoint::new(location.longitude(), location.latitude());
        let docs = self
            .store
            .find_within_sphere(BOOTCAMPS, "location.coordinates", center, miles_to_radians(distance))
            .await?;
        Ok(docs)
    }

    /// Store an uploaded photo as `photo_<id><ext>` and record its name.
    #[instrument(skip(self, principal, upload, settings), fields(id = %id, principal = %principal.id))]
    pub async fn upload_photo(
        &self,
        principal: &Principal,
        id: RecordId,
        upload: Option<PhotoUpload>,
        settings: &UploadSettings,
    ) -> DomainResult<String> {
        let existing = self.get(id).await?;
        ensure_owner(principal, &existing)?;

        let upload = upload.ok_or_else(|| DomainError::bad_request("Please upload a file"))?;
        if !upload.content_type.as_deref().is_some_and(|t| t.starts_with("image")) {
            return Err(DomainError::bad_request("Please upload an image file"));
        }
        if upload.bytes.len() as u64 > settings.max_bytes {
            return Err(DomainError::bad_request(format!(
                "Please upload an image less than {}",
                settings.max_bytes
            )));
        }

        let extension = Path::new(&upload.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let file_name = format!("photo_{id}{extension}");
        let target = settings.directory.join(&file_name);

        let written = async {
            tokio::fs::create_dir_all(&settings.directory).await?;
            tokio::fs::write(&target, &upload.bytes).await
        }
        .await;
        if let Err(e) = written {
            error!(error = %e, path = %target.display(), "photo write failed");
            return Err(DomainError::internal("Problem with file upload"));
        }

        let mut changes = Document::new();
        changes.insert("photo".to_string(), Value::String(file_name.clone()));
        self.store
            .update_by_id(BOOTCAMPS, id, changes)
            .await?
            .ok_or_else(|| not_found(id))?;
        Ok(file_name)
    }
}
