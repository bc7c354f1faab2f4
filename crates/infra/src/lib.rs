//! Infrastructure layer: document stores, query execution, geocoding,
//! per-entity services and fixture loading.

pub mod fixtures;
pub mod geo;
pub mod geocoder;
pub mod pipeline;
pub mod services;
pub mod store;

pub use geo::{EARTH_RADIUS_MILES, GeoPoint};
pub use geocoder::{GeocodeError, Geocoder, StaticGeocoder};
pub use pipeline::{advanced_results, populate};
pub use services::{BootcampService, CourseService, PhotoUpload, ReviewService, Services, UploadSettings, UserService};
pub use store::{DocumentStore, FindOptions, InMemoryDocumentStore, PostgresDocumentStore, StoreError};
