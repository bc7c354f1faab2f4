//! `devcamper-catalog`: entity schemas and business rules.
//!
//! Each entity has an input type (request body) with `validate_new` /
//! `validate_patch`, and a stored type describing the persisted document.
//! Nothing here performs IO; lifecycle steps that need collaborators
//! (geocoding, cascades) are orchestrated by `devcamper-infra`.

pub mod bootcamp;
pub mod collections;
pub mod course;
pub mod quota;
pub mod review;
pub mod slug;
pub mod timestamp;
pub mod user;
mod validate;

pub use bootcamp::{Bootcamp, BootcampInput, Career, GeoLocation, NewBootcamp};
pub use collections::{BOOTCAMPS, COURSES, REVIEWS, UNIQUE_INDEXES, USERS, UniqueIndex};
pub use course::{Course, CourseInput, MinimumSkill};
pub use quota::{MAX_BOOTCAMPS_PER_PUBLISHER, ensure_publish_quota};
pub use review::{Review, ReviewInput};
pub use slug::slugify;
pub use user::{User, UserInput};
