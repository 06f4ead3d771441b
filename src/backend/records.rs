//! Wire records exchanged with the desktop backend.

use serde::{Deserialize, Serialize};

/// One node as the backend reports it in a graph snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
	/// Backend id.
	pub id: String,
	/// Display label; may be blank.
	pub label: String,
	/// Type discriminator. Older records may omit it.
	#[serde(default)]
	pub node_type: Option<String>,
	/// Free-form properties; `title`, `name` and `type` are consulted.
	#[serde(default)]
	pub properties: serde_json::Map<String, serde_json::Value>,
}

/// One edge as the backend reports it. `label` carries the relationship
/// type, or `tagged_as_<name>` for implicit diary-to-tag links.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct EdgeRecord {
	pub id: String,
	pub source: String,
	pub target: String,
	pub label: String,
}

/// Full graph as returned by `get_graph_data`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct GraphSnapshot {
	pub nodes: Vec<NodeRecord>,
	pub edges: Vec<EdgeRecord>,
}

/// Diary entry summary as returned by `list_diaries` and `search_diaries_by_tag`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiaryRecord {
	/// Diary id.
	pub id: String,
	/// Entry title.
	pub title: String,
	/// RFC 3339 creation time.
	#[serde(default)]
	pub created_at: Option<String>,
	/// Tag names attached to the entry.
	#[serde(default)]
	pub tags: Vec<String>,
}

/// Stored relationship row as returned by `get_relationships`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct RelationshipRecord {
	pub id: String,
	pub parent_id: String,
	pub child_id: String,
	pub relationship_type: String,
	#[serde(default)]
	pub created_at: Option<String>,
}
