//! [`GraphBackend`] over the desktop shell's IPC bridge.

use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

use super::{BackendError, CreateRelationship, DiaryRecord, GraphBackend, GraphSnapshot, RelationshipRecord};

#[wasm_bindgen]
extern "C" {
	#[wasm_bindgen(catch, js_namespace = ["window", "__TAURI__", "core"], js_name = invoke)]
	async fn ipc_invoke(cmd: &str, args: JsValue) -> Result<JsValue, JsValue>;
}

/// Backend reached through the desktop shell's `invoke` IPC bridge.
#[derive(Clone, Copy, Debug, Default)]
pub struct TauriBackend;

#[derive(Serialize)]
struct NoArgs {}

#[derive(Serialize)]
struct ById<'a> {
	id: &'a str,
}

#[derive(Serialize)]
struct ByTag<'a> {
	tag: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ByDiary<'a> {
	diary_id: &'a str,
}

impl TauriBackend {
	async fn call<A: Serialize, T: DeserializeOwned>(
		&self,
		command: &'static str,
		args: &A,
	) -> Result<T, BackendError> {
		let json = serde_json::to_string(args).map_err(|e| BackendError::Decode {
			command,
			detail: e.to_string(),
		})?;
		let args = js_sys::JSON::parse(&json).map_err(|e| BackendError::Invoke {
			command,
			detail: describe(&e),
		})?;

		log::debug!("invoke {command}");
		let value = ipc_invoke(command, args).await.map_err(|e| match e.as_string() {
			Some(text) => BackendError::Rejected(text),
			None => BackendError::Invoke {
				command,
				detail: describe(&e),
			},
		})?;

		let text = if value.is_undefined() || value.is_null() {
			"null".to_string()
		} else {
			js_sys::JSON::stringify(&value)
				.map(String::from)
				.map_err(|e| BackendError::Decode {
					command,
					detail: describe(&e),
				})?
		};
		serde_json::from_str(&text).map_err(|e| BackendError::Decode {
			command,
			detail: e.to_string(),
		})
	}
}

fn describe(value: &JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

impl GraphBackend for TauriBackend {
	async fn fetch_graph(&self) -> Result<GraphSnapshot, BackendError> {
		self.call("get_graph_data", &NoArgs {}).await
	}

	async fn create_relationship(&self, request: CreateRelationship) -> Result<(), BackendError> {
		// The command echoes the stored id; the client already knows it.
		let _: String = self.call("add_relationship", &request).await?;
		Ok(())
	}

	async fn delete_relationship(&self, id: &str) -> Result<(), BackendError> {
		self.call("delete_relationship", &ById { id }).await
	}

	async fn list_diaries(&self) -> Result<Vec<DiaryRecord>, BackendError> {
		self.call("list_diaries", &NoArgs {}).await
	}

	async fn diaries_with_tag(&self, tag: &str) -> Result<Vec<DiaryRecord>, BackendError> {
		self.call("search_diaries_by_tag", &ByTag { tag }).await
	}

	async fn relationships_of(&self, diary_id: &str) -> Result<Vec<RelationshipRecord>, BackendError> {
		self.call("get_relationships", &ByDiary { diary_id }).await
	}
}
