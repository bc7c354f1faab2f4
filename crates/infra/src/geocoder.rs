//! Address → location resolution.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use devcamper_catalog::GeoLocation;
use devcamper_core::{DomainError, SERVER_ERROR};

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("failed to read geocoder fixtures {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid geocoder fixtures: {0}")]
    Parse(String),

    #[error("geocoding provider failed: {0}")]
    Provider(String),
}

impl From<GeocodeError> for DomainError {
    fn from(err: GeocodeError) -> Self {
        tracing::error!(error = %err, "geocoder failure");
        DomainError::internal(SERVER_ERROR)
    }
}

/// External geocoding collaborator.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a free-form address or postal code. `Ok(None)` when unknown.
    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>, GeocodeError>;
}

/// One entry of a fixture file.
#[derive(Debug, Clone, Deserialize)]
pub struct KnownLocation {
    pub address: String,
    pub location: GeoLocation,
}

/// Geocoder backed by a fixed table of known locations.
///
/// A query matches an entry's address, formatted address or zipcode,
/// ignoring case and repeated whitespace.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    entries: Vec<KnownLocation>,
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

impl StaticGeocoder {
    pub fn new(entries: Vec<KnownLocation>) -> Self {
        Self { entries }
    }

    pub fn with(mut self, address: impl Into<String>, location: GeoLocation) -> Self {
        self.entries.push(KnownLocation {
            address: address.into(),
            location,
        });
        self
    }

    pub fn from_json(text: &str) -> Result<Self, GeocodeError> {
        serde_json::from_str(text)
            .map(Self::new)
            .map_err(|e| GeocodeError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, GeocodeError> {
        let text = std::fs::read_to_string(path).map_err(|source| GeocodeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, query: &str) -> Option<&GeoLocation> {
        let wanted = normalize(query);
        self.entries
            .iter()
            .find(|e| {
                normalize(&e.address) == wanted
                    || e.location.formatted_address.as_deref().is_some_and(|f| normalize(f) == wanted)
                    || e.location.zipcode.as_deref().is_some_and(|z| normalize(z) == wanted)
            })
            .map(|e| &e.location)
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>, GeocodeError> {
        Ok(self.lookup(query).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boston() -> GeoLocation {
        GeoLocation {
            zipcode: Some("02215".into()),
            formatted_address: Some("233 Bay State Rd, Boston, MA 02215-1405, US".into()),
            ..GeoLocation::point(-71.104028, 42.350846)
        }
    }

    #[tokio::test]
    async fn matches_address_and_zipcode() {
        let g = StaticGeocoder::default().with("233 Bay State Rd Boston MA 02215", boston());
        assert_eq!(g.geocode("233  bay state rd boston ma 02215").await.unwrap(), Some(boston()));
        assert_eq!(g.geocode("02215").await.unwrap(), Some(boston()));
        assert_eq!(g.geocode("90210").await.unwrap(), None);
    }

    #[test]
    fn parses_fixture_file_shape() {
        let g = StaticGeocoder::from_json(
            r#"[{"address": "Boston", "location": {"type": "Point", "coordinates": [-71.0, 42.3], "zipcode": "02118"}}]"#,
        )
        .unwrap();
        assert_eq!(g.len(), 1);
        assert!(StaticGeocoder::from_json("{").is_err());
    }
}
