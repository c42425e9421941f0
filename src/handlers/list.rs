use crate::http::internal_error;
use crate::http::response::Response;
use crate::store::FileStore;
use log::error;

pub fn list_files(store: &FileStore) -> Response {
    match store.list() {
        Ok(names) => Response::json(render_names(&names)),
        Err(e) => {
            error!("can't list {}: {e}", store.root().display());
            internal_error("Unable to read files")
        }
    }
}

/// `["a", "b"]`, in the order given.
fn render_names(names: &[String]) -> String {
    let quoted: Vec<String> = names
        .iter()
        .map(|name| serde_json::Value::from(name.as_str()).to_string())
        .collect();
    format!("[{}]", quoted.join(", "))
}
