use crate::calc::{format_2dp, number_from_value};
use crate::feedback;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{list_param, opt_param, required_str};
use crate::ipc::types::{AppState, Request};
use crate::term::{self, Term, TermSubject, TermWeights};
use serde_json::json;

fn projection_json(subject: &TermSubject) -> serde_json::Value {
    let projection = term::project(subject);
    json!({
        "name": subject.name,
        "targetGrade": subject.target_grade,
        "current": projection.current,
        "currentDisplay": projection.current.map(|c| format_2dp(c.current_grade)),
        "requiredFinal": projection.required_final,
        "requiredDisplay": projection.required_final.map(|r| format_2dp(r.required)),
        "weights": projection.weights,
    })
}

fn handle_validate_weights(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let weights: TermWeights = match opt_param(&req.params, "weights") {
        Ok(v) => v.unwrap_or_default(),
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    ok(&req.id, json!(term::validate_weights(&weights)))
}

fn handle_update_weight(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let weights: TermWeights = match opt_param(&req.params, "weights") {
        Ok(v) => v.unwrap_or_default(),
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let term_key = match required_str(&req.params, "term") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let Some(edited) = Term::parse(term_key) else {
        return err(
            &req.id,
            "bad_params",
            "term must be one of: prelim, midterm, prefinal, final",
            None,
        );
    };
    let value = req
        .params
        .get("value")
        .and_then(number_from_value)
        .unwrap_or(0.0);

    let next = weights.with_weight(edited, value);
    let validation = term::validate_weights(&next);
    if let Some(msg) = validation.message.as_deref() {
        tracing::debug!("term weight edit left an invalid total: {msg}");
    }
    ok(
        &req.id,
        json!({
            "weights": next,
            "validation": validation,
        }),
    )
}

fn handle_project(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let subject: TermSubject = match opt_param(&req.params, "subject") {
        Ok(Some(v)) => v,
        Ok(None) => return err(&req.id, "bad_params", "missing subject", None),
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    ok(&req.id, projection_json(&subject))
}

fn handle_summary(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let subjects: Vec<TermSubject> = match list_param(&req.params, "subjects") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let rows: Vec<serde_json::Value> = subjects.iter().map(projection_json).collect();
    let average = term::semester_average(&subjects);
    ok(
        &req.id,
        json!({
            "subjects": rows,
            "semesterAverage": average,
            "semesterAverageDisplay": average.map(format_2dp),
            // The average is on the 0-100 scale, so `message` uses the K-12
            // bands; `tertiaryMessage` reads it against the 1.0-5.0 bands.
            "message": average.map(feedback::k12_message),
            "tertiaryMessage": average.map(feedback::tertiary_message),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "term.validateWeights" => Some(handle_validate_weights(state, req)),
        "term.updateWeight" => Some(handle_update_weight(state, req)),
        "term.project" => Some(handle_project(state, req)),
        "term.summary" => Some(handle_summary(state, req)),
        _ => None,
    }
}
