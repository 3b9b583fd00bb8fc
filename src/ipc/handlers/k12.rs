use crate::calc::{
    appended, final_grade, format_2dp, project_goal, removed, replaced, Component, Components,
    ScoreEntry,
};
use crate::feedback::{self, Difficulty};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{grade_level_param, list_param, number_param, opt_param};
use crate::ipc::types::{AppState, Request};
use crate::paste;
use serde_json::json;

struct K12Input {
    written_works: Vec<ScoreEntry>,
    performance_tasks: Vec<ScoreEntry>,
    quarterly_assessment: ScoreEntry,
}

fn parse_input(params: &serde_json::Value) -> Result<K12Input, String> {
    Ok(K12Input {
        written_works: list_param(params, "writtenWorks")?,
        performance_tasks: list_param(params, "performanceTasks")?,
        quarterly_assessment: opt_param(params, "quarterlyAssessment")?.unwrap_or_default(),
    })
}

fn components_json(components: &Components) -> serde_json::Value {
    let mut out = serde_json::Map::new();
    for c in Component::ALL {
        let r = components.get(c);
        out.insert(
            c.key().to_string(),
            json!({
                "label": c.label(),
                "average": r.average,
                "itemCount": r.item_count,
                "display": format_2dp(r.average),
            }),
        );
    }
    serde_json::Value::Object(out)
}

fn handle_weights(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (level, weights) = match grade_level_param(state, &req.params) {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    ok(
        &req.id,
        json!({
            "gradeLevel": level.key(),
            "weights": weights,
            "valid": weights.is_valid(),
        }),
    )
}

fn handle_calculate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (level, weights) = match grade_level_param(state, &req.params) {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let input = match parse_input(&req.params) {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };

    let components = Components::aggregate(
        &input.written_works,
        &input.performance_tasks,
        &input.quarterly_assessment,
    );
    let grade = final_grade(&components, &weights);

    ok(
        &req.id,
        json!({
            "gradeLevel": level.key(),
            "weights": weights,
            "components": components_json(&grade.components),
            "finalGrade": grade.value,
            "finalGradeDisplay": format_2dp(grade.value),
            "descriptor": feedback::k12_descriptor(grade.value),
            "message": feedback::k12_message(grade.value),
            "passed": grade.value >= feedback::PASSING_GRADE,
        }),
    )
}

fn handle_goal(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (level, weights) = match grade_level_param(state, &req.params) {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let input = match parse_input(&req.params) {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let components = Components::aggregate(
        &input.written_works,
        &input.performance_tasks,
        &input.quarterly_assessment,
    );

    let solve_for = match req.params.get("solveFor") {
        None | Some(serde_json::Value::Null) => components.default_unknown(),
        Some(raw) => match raw.as_str().and_then(Component::parse) {
            Some(c) => c,
            None => {
                return err(
                    &req.id,
                    "bad_params",
                    "solveFor must be one of: ww, pt, qa",
                    None,
                )
            }
        },
    };

    let Some(target) = number_param(&req.params, "targetGrade") else {
        return ok(
            &req.id,
            json!({
                "gradeLevel": level.key(),
                "solveFor": solve_for,
                "goal": null,
            }),
        );
    };

    let goal = project_goal(&components, &weights, target, solve_for);
    let guidance = goal.required.map(|required| {
        let difficulty = Difficulty::for_required(required);
        json!({
            "requiredDisplay": format_2dp(required),
            "difficulty": difficulty,
            "message": difficulty.message(),
            "tips": difficulty.tips(),
        })
    });

    ok(
        &req.id,
        json!({
            "gradeLevel": level.key(),
            "solveFor": solve_for,
            "components": components_json(&components),
            "goal": goal,
            "guidance": guidance,
        }),
    )
}

fn handle_parse_paste(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(text) = req.params.get("text").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing text", None);
    };
    let existing: Vec<ScoreEntry> = match list_param(&req.params, "existing") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let parsed = paste::parse_score_lines(text);
    let entries = appended(&existing, &parsed.entries);
    ok(
        &req.id,
        json!({
            "entries": entries,
            "parsedCount": parsed.entries.len(),
            "totalLines": parsed.total_lines,
            "warnings": parsed.warnings,
        }),
    )
}

fn index_param(params: &serde_json::Value) -> Result<usize, String> {
    params
        .get("index")
        .and_then(|v| v.as_u64())
        .map(|i| i as usize)
        .ok_or_else(|| "index must be a non-negative integer".to_string())
}

fn handle_replace_entry(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let entries: Vec<ScoreEntry> = match list_param(&req.params, "entries") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let index = match index_param(&req.params) {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let entry: ScoreEntry = match opt_param(&req.params, "entry") {
        Ok(Some(v)) => v,
        Ok(None) => return err(&req.id, "bad_params", "missing entry", None),
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    ok(
        &req.id,
        json!({
            "entries": replaced(&entries, index, entry),
            "changed": index < entries.len(),
        }),
    )
}

fn handle_remove_entry(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let entries: Vec<ScoreEntry> = match list_param(&req.params, "entries") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let index = match index_param(&req.params) {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    ok(
        &req.id,
        json!({
            "entries": removed(&entries, index),
            "changed": index < entries.len(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "k12.weights" => Some(handle_weights(state, req)),
        "k12.calculate" => Some(handle_calculate(state, req)),
        "k12.goal" => Some(handle_goal(state, req)),
        "k12.parsePaste" => Some(handle_parse_paste(state, req)),
        "k12.replaceEntry" => Some(handle_replace_entry(state, req)),
        "k12.removeEntry" => Some(handle_remove_entry(state, req)),
        _ => None,
    }
}
