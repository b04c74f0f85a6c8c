//! Note resources.
//!
//! Notes are attached to a parent record and cannot be edited once created.
//!
//! ```rust,ignore
//! use attio::rest::{Creatable, Listable, PathIds};
//! use attio::rest::resources::Note;
//! use serde_json::json;
//!
//! let note = Note::create(&client, &PathIds::new(), json!({
//!     "parent_object": "companies",
//!     "parent_record_id": "rec_1",
//!     "title": "Kickoff",
//!     "format": "plaintext",
//!     "content": "Agenda and next steps",
//! })).await?;
//!
//! let notes = Note::list(&client, &PathIds::new(), Some(json!({
//!     "parent_object": "companies",
//!     "parent_record_id": "rec_1",
//! }))).await?;
//! ```

use crate::clients::HttpMethod;
use crate::rest::{
    ApiResource, Creatable, Deletable, Listable, ResourceOperation, ResourcePath, Retrievable,
};

resource_type!(
    /// A note on a record.
    Note
);

impl ApiResource for Note {
    const NAME: &'static str = "Note";
    const ID_KEY: &'static str = "note_id";
    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(HttpMethod::Post, ResourceOperation::Create, &[], "notes"),
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Retrieve,
            &["note_id"],
            "notes/{note_id}",
        ),
        ResourcePath::new(HttpMethod::Get, ResourceOperation::List, &[], "notes"),
        ResourcePath::new(
            HttpMethod::Delete,
            ResourceOperation::Delete,
            &["note_id"],
            "notes/{note_id}",
        ),
    ];

    resource_accessors!();
}

impl Creatable for Note {}
impl Retrievable for Note {}
impl Listable for Note {}
impl Deletable for Note {}

impl Note {
    /// Returns the note title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    /// Returns the plaintext body.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.get_str("content_plaintext")
    }
}
