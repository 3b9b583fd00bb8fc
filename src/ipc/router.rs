use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    if let Some(resp) = handlers::core::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::k12::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::tertiary::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::term::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::state::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::history::try_handle(state, &req) {
        return resp;
    }

    tracing::debug!("unknown method {}", req.method);
    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
