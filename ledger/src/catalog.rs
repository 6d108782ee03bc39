//! # Catalog Records
//!
//! Books known to the library. Unrelated to the chain: a book's identifier
//! is simply an MD5 digest of its ISBN and publish date, so registering the
//! same edition twice yields the same id. The id is a lookup key, never a
//! security boundary.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// A catalog entry. Missing fields deserialize as empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Book {
    /// Derived identifier. Anything a client sends here is overwritten.
    pub id: String,
    pub title: String,
    pub author: String,
    pub publish_date: String,
    pub isbn: String,
}

impl Book {
    /// Overwrite `id` with the value derived from ISBN and publish date.
    pub fn assign_id(&mut self) {
        self.id = derive_book_id(&self.isbn, &self.publish_date);
    }

    /// Consume the book and return it with its derived id.
    pub fn with_derived_id(mut self) -> Self {
        self.assign_id();
        self
    }
}

/// Deterministic book identifier: `hex(MD5(isbn || publish_date))`, 32
/// lowercase hex characters.
pub fn derive_book_id(isbn: &str, publish_date: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(isbn.as_bytes());
    hasher.update(publish_date.as_bytes());
    hex::encode(hasher.finalize())
}
