//! Command surface of the desktop backend that owns diary storage.

pub mod records;
mod tauri;

use serde::Serialize;
use thiserror::Error;

pub use records::{DiaryRecord, EdgeRecord, GraphSnapshot, NodeRecord, RelationshipRecord};
pub use tauri::TauriBackend;

/// Failure of a single backend command.
#[derive(Clone, Debug, Error, PartialEq)]
#[allow(missing_docs)]
pub enum BackendError {
	/// The IPC bridge itself failed (missing bridge, rejected promise without a message).
	#[error("invoke `{command}` failed: {detail}")]
	Invoke { command: &'static str, detail: String },
	/// The command answered, but its payload did not match the expected shape.
	#[error("unexpected response from `{command}`: {detail}")]
	Decode { command: &'static str, detail: String },
	/// The backend ran the command and reported an error string.
	#[error("{0}")]
	Rejected(String),
}

/// Arguments of `add_relationship`. The id is generated client-side so the
/// optimistic edge and the stored row share it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct CreateRelationship {
	/// Client-generated relationship id.
	pub id: String,
	pub parent_id: String,
	pub child_id: String,
	/// Wire name from [`RelationshipType::as_str`](crate::graph::RelationshipType::as_str).
	pub relationship_type: String,
}

/// Asynchronous backend operations consumed by the graph core.
///
/// Futures are not `Send`: everything runs on the browser's event loop.
#[allow(async_fn_in_trait)]
pub trait GraphBackend {
	/// Fetch the full node and edge collection.
	async fn fetch_graph(&self) -> Result<GraphSnapshot, BackendError>;

	/// Persist a relationship between two diaries.
	async fn create_relationship(&self, request: CreateRelationship) -> Result<(), BackendError>;

	/// Delete a stored relationship by id.
	async fn delete_relationship(&self, id: &str) -> Result<(), BackendError>;

	/// All diaries, newest first.
	async fn list_diaries(&self) -> Result<Vec<DiaryRecord>, BackendError>;

	/// Diaries carrying the named tag.
	async fn diaries_with_tag(&self, tag: &str) -> Result<Vec<DiaryRecord>, BackendError>;

	/// Relationships in which the diary is either parent or child.
	async fn relationships_of(&self, diary_id: &str) -> Result<Vec<RelationshipRecord>, BackendError>;
}
