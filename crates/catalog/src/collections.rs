//! Collection names and their unique indexes.

pub const BOOTCAMPS: &str = "bootcamps";
pub const COURSES: &str = "courses";
pub const REVIEWS: &str = "reviews";
pub const USERS: &str = "users";

/// Every collection, in fixture-load order.
pub const ALL: [&str; 4] = [BOOTCAMPS, COURSES, USERS, REVIEWS];

/// A set of fields whose combined values must be unique within a collection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UniqueIndex {
    pub collection: &'static str,
    pub fields: &'static [&'static str],
}

pub const UNIQUE_INDEXES: &[UniqueIndex] = &[
    UniqueIndex {
        collection: BOOTCAMPS,
        fields: &["name"],
    },
    UniqueIndex {
        collection: USERS,
        fields: &["email"],
    },
    // One review per user per bootcamp.
    UniqueIndex {
        collection: REVIEWS,
        fields: &["bootcamp", "user"],
    },
];
