//! Render-ready node and edge types and the enums decoded from backend labels.

use std::fmt;
use std::str::FromStr;

/// Prefix the backend puts on implicit diary-to-tag edge labels.
pub const TAG_EDGE_PREFIX: &str = "tagged_as_";

/// Canonical node type, fixed once at ingestion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
	/// A diary entry; the only kind that can take part in relationships.
	Diary,
	/// A tag attached to diaries.
	Tag,
	/// The record carried no recognizable type.
	Unknown,
}

impl NodeKind {
	/// Parse a backend type discriminator.
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"diary" => Some(Self::Diary),
			"tag" => Some(Self::Tag),
			_ => None,
		}
	}

	/// Visual group used for colouring.
	pub fn group(self) -> u32 {
		match self {
			Self::Diary => 0,
			Self::Tag => 1,
			Self::Unknown => 7,
		}
	}

	/// Lowercase name as the backend spells it.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Diary => "diary",
			Self::Tag => "tag",
			Self::Unknown => "unknown",
		}
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Relationship types a user can author between two diaries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum RelationshipType {
	#[default]
	DependsOn,
	RelatedTo,
	References,
}

impl RelationshipType {
	/// Every type, in selector order.
	pub const ALL: [Self; 3] = [Self::DependsOn, Self::RelatedTo, Self::References];

	/// Wire name, e.g. `depends_on`.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::DependsOn => "depends_on",
			Self::RelatedTo => "related_to",
			Self::References => "references",
		}
	}
}

impl fmt::Display for RelationshipType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for RelationshipType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|t| t.as_str() == s)
			.ok_or_else(|| format!("unknown relationship type `{s}`"))
	}
}

/// What an edge means, decoded from its backend label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeKind {
	/// User-authored relationship between two diaries.
	Relationship(RelationshipType),
	/// Implicit link from a diary to one of its tags.
	Tagged {
		/// Tag name with the label prefix removed.
		tag: String,
	},
	/// A label the client does not know; kept for display.
	Other(String),
}

impl EdgeKind {
	/// Decode a backend edge label.
	pub fn from_label(label: &str) -> Self {
		if let Some(tag) = label.strip_prefix(TAG_EDGE_PREFIX) {
			return Self::Tagged { tag: tag.to_string() };
		}
		match label.parse() {
			Ok(kind) => Self::Relationship(kind),
			Err(_) => Self::Other(label.to_string()),
		}
	}

	/// Display text with any backend-internal prefix stripped.
	pub fn display_label(&self) -> String {
		match self {
			Self::Relationship(kind) => kind.as_str().to_string(),
			Self::Tagged { tag } => tag.clone(),
			Self::Other(raw) => raw.clone(),
		}
	}

	/// Authored by a user, so it may be deleted.
	pub fn is_user_relationship(&self) -> bool {
		matches!(self, Self::Relationship(_))
	}
}

/// Where an edge's arrowhead is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrowHead {
	/// Arrow drawn at the target (parent) end.
	ToTarget,
	/// Undirected, used for tag links.
	None,
}

/// Render-ready node.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Backend id, unique within a snapshot.
	pub id: String,
	/// Display label, never empty.
	pub label: String,
	/// Canonical type.
	pub kind: NodeKind,
	/// Colour group derived from `kind`.
	pub group: u32,
	/// Hover text.
	pub tooltip: String,
	/// Backend properties, untouched.
	pub raw_properties: serde_json::Map<String, serde_json::Value>,
}

/// Render-ready edge. `source` is the child, `target` the parent.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct GraphEdge {
	pub id: String,
	pub source: String,
	pub target: String,
	pub kind: EdgeKind,
	/// Display label from [`EdgeKind::display_label`].
	pub label: String,
	pub arrow: ArrowHead,
}

impl GraphEdge {
	/// Edge for a freshly authored relationship.
	pub fn relationship(id: String, child: String, parent: String, kind: RelationshipType) -> Self {
		Self {
			id,
			source: child,
			target: parent,
			label: kind.as_str().to_string(),
			kind: EdgeKind::Relationship(kind),
			arrow: ArrowHead::ToTarget,
		}
	}
}
