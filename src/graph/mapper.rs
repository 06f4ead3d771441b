//! Backend records to render-ready nodes and edges.
//!
//! Type inference happens here and only here: every node leaves the mapper
//! with one canonical [`NodeKind`]. Records that cannot be classified are
//! still mapped (as [`NodeKind::Unknown`]) and reported as warnings so one
//! bad row never blocks the rest of the graph.

use serde_json::Value;

use super::types::{ArrowHead, EdgeKind, GraphEdge, GraphNode, NodeKind};
use crate::backend::{EdgeRecord, GraphSnapshot, NodeRecord};

/// A data-quality problem found while mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapperWarning {
	/// No usable type discriminator; the node was mapped as unknown.
	UnknownNodeType {
		/// Node id.
		id: String,
		/// The discriminator the record carried, if any.
		raw: Option<String>,
	},
}

/// Output of mapping one snapshot, in record order.
#[derive(Clone, Debug, Default, PartialEq)]
#[allow(missing_docs)]
pub struct MappedGraph {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
	pub warnings: Vec<MapperWarning>,
}

/// Map every record of a snapshot, logging each warning.
pub fn map_snapshot(snapshot: &GraphSnapshot) -> MappedGraph {
	let mut warnings = Vec::new();
	let nodes = snapshot
		.nodes
		.iter()
		.map(|record| {
			let (node, warning) = map_node(record);
			warnings.extend(warning);
			node
		})
		.collect();
	let edges = snapshot.edges.iter().map(map_edge).collect();

	for warning in &warnings {
		log::warn!("graph record: {warning:?}");
	}
	MappedGraph {
		nodes,
		edges,
		warnings,
	}
}

/// Map one node, inferring its kind from the record.
pub fn map_node(record: &NodeRecord) -> (GraphNode, Option<MapperWarning>) {
	let kind = classify(record);
	let warning = (kind == NodeKind::Unknown).then(|| MapperWarning::UnknownNodeType {
		id: record.id.clone(),
		raw: record.node_type.clone(),
	});

	let label = if record.label.trim().is_empty() {
		fallback_label(record, kind)
	} else {
		record.label.clone()
	};
	let tooltip = tooltip_for(&label, kind, record);

	let node = GraphNode {
		id: record.id.clone(),
		label,
		kind,
		group: kind.group(),
		tooltip,
		raw_properties: record.properties.clone(),
	};
	(node, warning)
}

/// Map one edge. Tag links are drawn without an arrowhead.
pub fn map_edge(record: &EdgeRecord) -> GraphEdge {
	let kind = EdgeKind::from_label(&record.label);
	let arrow = match kind {
		EdgeKind::Tagged { .. } => ArrowHead::None,
		_ => ArrowHead::ToTarget,
	};
	GraphEdge {
		id: record.id.clone(),
		source: record.source.clone(),
		target: record.target.clone(),
		label: kind.display_label(),
		kind,
		arrow,
	}
}

fn classify(record: &NodeRecord) -> NodeKind {
	if let Some(kind) = record.node_type.as_deref().and_then(NodeKind::parse) {
		return kind;
	}
	if let Some(kind) = record
		.properties
		.get("type")
		.and_then(Value::as_str)
		.and_then(NodeKind::parse)
	{
		return kind;
	}
	let props = &record.properties;
	if props.contains_key("created_at") || props.contains_key("title") {
		NodeKind::Diary
	} else if props.contains_key("name") {
		NodeKind::Tag
	} else {
		NodeKind::Unknown
	}
}

fn fallback_label(record: &NodeRecord, kind: NodeKind) -> String {
	let key = match kind {
		NodeKind::Tag => "name",
		_ => "title",
	};
	record
		.properties
		.get(key)
		.and_then(Value::as_str)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
		.unwrap_or_else(|| record.id.clone())
}

fn tooltip_for(label: &str, kind: NodeKind, record: &NodeRecord) -> String {
	match kind {
		NodeKind::Diary => match record.properties.get("created_at").and_then(Value::as_str) {
			Some(created) => format!("{label}\nCreated: {created}"),
			None => label.to_string(),
		},
		NodeKind::Tag => format!("#{label}"),
		NodeKind::Unknown => format!("{label} (unknown type)"),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn record(id: &str, node_type: Option<&str>, props: Value) -> NodeRecord {
		NodeRecord {
			id: id.into(),
			label: id.into(),
			node_type: node_type.map(String::from),
			properties: props.as_object().cloned().unwrap_or_default(),
		}
	}

	#[test]
	fn diary_tooltip_includes_creation_time() {
		let (node, warning) = map_node(&record(
			"d1",
			Some("diary"),
			json!({"created_at": "2024-03-01T10:00:00Z"}),
		));
		assert!(warning.is_none());
		assert_eq!(node.kind, NodeKind::Diary);
		assert_eq!(node.tooltip, "d1\nCreated: 2024-03-01T10:00:00Z");
	}

	#[test]
	fn secondary_type_field_is_used_when_primary_missing() {
		let (node, _) = map_node(&record("t1", None, json!({"type": "tag"})));
		assert_eq!(node.kind, NodeKind::Tag);
		assert_eq!(node.group, NodeKind::Tag.group());
	}

	#[test]
	fn property_heuristic_classifies_untyped_records() {
		let (diary, _) = map_node(&record("d1", Some("???"), json!({"created_at": "x"})));
		let (tag, _) = map_node(&record("t1", None, json!({"name": "work"})));
		assert_eq!(diary.kind, NodeKind::Diary);
		assert_eq!(tag.kind, NodeKind::Tag);
	}

	#[test]
	fn unclassifiable_record_is_kept_with_warning() {
		let snapshot = GraphSnapshot {
			nodes: vec![
				record("d1", Some("diary"), json!({})),
				record("x", Some("folder"), json!({})),
				record("t1", Some("tag"), json!({})),
			],
			edges: vec![],
		};
		let mapped = map_snapshot(&snapshot);
		let ids: Vec<_> = mapped.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["d1", "x", "t1"]);
		assert_eq!(mapped.nodes[1].kind, NodeKind::Unknown);
		assert_eq!(
			mapped.warnings,
			vec![MapperWarning::UnknownNodeType {
				id: "x".into(),
				raw: Some("folder".into())
			}]
		);
	}

	#[test]
	fn blank_label_falls_back_to_properties() {
		let mut rec = record("t9", Some("tag"), json!({"name": "ideas"}));
		rec.label = String::new();
		let (node, _) = map_node(&rec);
		assert_eq!(node.label, "ideas");
		assert_eq!(node.tooltip, "#ideas");
	}

	#[test]
	fn tag_edges_have_no_arrow_and_stripped_label() {
		let edge = map_edge(&EdgeRecord {
			id: "tag-d1-t1".into(),
			source: "d1".into(),
			target: "t1".into(),
			label: "tagged_as_work".into(),
		});
		assert_eq!(edge.label, "work");
		assert_eq!(edge.arrow, ArrowHead::None);
	}
}
