use crate::calc::format_2dp;
use crate::feedback;
use crate::gpa::{compute_gpa, Subject};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::list_param;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_gpa(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let subjects: Vec<Subject> = match list_param(&req.params, "subjects") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let summary = compute_gpa(&subjects);
    // Nothing counted yet: no feedback for a placeholder 0.
    let counted = summary.total_units > 0.0;
    ok(
        &req.id,
        json!({
            "gpa": summary.gpa,
            "gpaDisplay": format_2dp(summary.gpa),
            "totalUnits": summary.total_units,
            "subjectCount": summary.subject_count,
            "message": counted.then(|| feedback::tertiary_message(summary.gpa)),
            "honors": counted.then(|| feedback::honors(summary.gpa)).flatten(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "tertiary.gpa" => Some(handle_gpa(state, req)),
        _ => None,
    }
}
