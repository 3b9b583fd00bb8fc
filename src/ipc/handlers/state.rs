use crate::ipc::error::{err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::store::Section;
use serde_json::json;

fn handle_state_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let sections = state.store.load_all(state.db.as_ref());
    ok(
        &req.id,
        json!({
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "persistent": state.db.is_some(),
            "sections": sections,
        }),
    )
}

fn handle_state_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let section_raw = match required_str(&req.params, "section") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let Some(section) = Section::parse(section_raw) else {
        return err(&req.id, "bad_params", "unknown section", None);
    };
    let Some(value) = req.params.get("value").cloned() else {
        return err(&req.id, "bad_params", "missing value", None);
    };

    let persisted = match state.store.save(state.db.as_ref(), section, value) {
        Ok(v) => v,
        Err(msg) => {
            return err(
                &req.id,
                "bad_params",
                msg,
                Some(json!({ "section": section.key() })),
            )
        }
    };
    ok(
        &req.id,
        json!({
            "section": section.key(),
            "value": state.store.load(state.db.as_ref(), section),
            "persisted": persisted,
        }),
    )
}

fn handle_state_clear(state: &mut AppState, req: &Request) -> serde_json::Value {
    let sections: Vec<Section> = match req.params.get("section").and_then(|v| v.as_str()) {
        None => Section::ALL.to_vec(),
        Some(raw) => match Section::parse(raw) {
            Some(s) => vec![s],
            None => return err(&req.id, "bad_params", "unknown section", None),
        },
    };
    let mut persisted = true;
    for section in &sections {
        persisted &= state.store.clear(state.db.as_ref(), *section);
    }
    ok(
        &req.id,
        json!({
            "cleared": sections.iter().map(|s| s.key()).collect::<Vec<_>>(),
            "persisted": persisted,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "state.load" => Some(handle_state_load(state, req)),
        "state.save" => Some(handle_state_save(state, req)),
        "state.clear" => Some(handle_state_clear(state, req)),
        _ => None,
    }
}
