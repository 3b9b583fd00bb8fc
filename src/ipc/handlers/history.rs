use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{number_param, opt_param, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store::{HistoryEntry, HistoryKind, Section};
use serde_json::json;

const MAX_LABEL_LEN: usize = 120;

fn handle_history_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let entries = state.store.history(state.db.as_ref());
    ok(&req.id, json!({ "entries": entries }))
}

fn handle_history_append(state: &mut AppState, req: &Request) -> serde_json::Value {
    let label = match required_str(&req.params, "label") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    if label.chars().count() > MAX_LABEL_LEN {
        return err(
            &req.id,
            "bad_params",
            format!("label length must be <= {}", MAX_LABEL_LEN),
            None,
        );
    }
    let kind: HistoryKind = match opt_param(&req.params, "kind") {
        Ok(Some(v)) => v,
        Ok(None) => return err(&req.id, "bad_params", "missing kind", None),
        Err(_) => {
            return err(
                &req.id,
                "bad_params",
                "kind must be one of: k12, tertiary, term",
                None,
            )
        }
    };
    let Some(value) = number_param(&req.params, "value") else {
        return err(&req.id, "bad_params", "value must be numeric", None);
    };
    let snapshot = req
        .params
        .get("snapshot")
        .cloned()
        .unwrap_or(serde_json::Value::Null);

    let entry = HistoryEntry::new(label, kind, value, snapshot);
    let persisted = state.store.append_history(state.db.as_ref(), entry.clone());
    ok(&req.id, json!({ "entry": entry, "persisted": persisted }))
}

fn handle_history_remove(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(&req.params, "id") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let (removed, persisted) = state.store.remove_history(state.db.as_ref(), id);
    if !removed {
        return err(
            &req.id,
            "not_found",
            "history entry not found",
            Some(json!({ "id": id })),
        );
    }
    ok(&req.id, json!({ "removed": true, "persisted": persisted }))
}

fn handle_history_clear(state: &mut AppState, req: &Request) -> serde_json::Value {
    let persisted = state.store.clear(state.db.as_ref(), Section::History);
    ok(&req.id, json!({ "persisted": persisted }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "history.list" => Some(handle_history_list(state, req)),
        "history.append" => Some(handle_history_append(state, req)),
        "history.remove" => Some(handle_history_remove(state, req)),
        "history.clear" => Some(handle_history_clear(state, req)),
        _ => None,
    }
}
