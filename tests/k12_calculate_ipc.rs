use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradecalcd");
    let mut child = Command::new(exe)
        .env_remove("GRADECALCD_WORKSPACE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradecalcd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn f(v: &serde_json::Value) -> f64 {
    v.as_f64().expect("number")
}

#[test]
fn grade7_final_grade_breakdown() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "k12.calculate",
        json!({
            "gradeLevel": "7",
            "writtenWorks": [
                { "name": "Quiz 1", "score": 18, "maxScore": 20 },
                { "name": "Quiz 2", "score": "22", "maxScore": "25" },
                { "name": "", "score": "", "maxScore": "" }
            ],
            "performanceTasks": [{ "name": "Project", "score": 45, "maxScore": 50 }],
            "quarterlyAssessment": { "score": 42, "maxScore": 50 }
        }),
    );

    assert!((f(&res["components"]["ww"]["average"]) - 89.0).abs() < 1e-9);
    assert_eq!(res["components"]["ww"]["itemCount"], json!(2));
    assert_eq!(res["components"]["pt"]["display"], json!("90.00"));
    assert_eq!(res["components"]["qa"]["display"], json!("84.00"));
    assert!((f(&res["finalGrade"]) - 88.4).abs() < 1e-9);
    assert_eq!(res["finalGradeDisplay"], json!("88.40"));
    assert_eq!(res["descriptor"], json!("Very Satisfactory"));
    assert_eq!(res["passed"], json!(true));
    assert!((f(&res["weights"]["ww"]) - 0.4).abs() < 1e-12);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn empty_written_works_yield_zero_contribution() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "k12.calculate",
        json!({
            "gradeLevel": 7,
            "writtenWorks": [],
            "performanceTasks": [{ "score": 45, "maxScore": 50 }],
            "quarterlyAssessment": { "score": 42, "maxScore": 50 }
        }),
    );
    assert_eq!(res["components"]["ww"]["average"], json!(0.0));
    assert_eq!(res["components"]["ww"]["itemCount"], json!(0));
    assert!((f(&res["finalGrade"]) - 52.8).abs() < 1e-9);
    assert_eq!(res["descriptor"], json!("Below Expectations"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn shs_goal_solves_for_quarterly_assessment() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "k12.goal",
        json!({
            "gradeLevel": "shs",
            "writtenWorks": [{ "score": 90, "maxScore": 100 }],
            "performanceTasks": [{ "score": 45, "maxScore": 50 }],
            "targetGrade": 90
        }),
    );
    assert_eq!(res["solveFor"], json!("qa"));
    assert!((f(&res["goal"]["knownContribution"]) - 72.0).abs() < 1e-9);
    assert!((f(&res["goal"]["required"]) - 90.0).abs() < 1e-9);
    assert_eq!(res["goal"]["isPossible"], json!(true));
    assert_eq!(res["guidance"]["requiredDisplay"], json!("90.00"));
    assert_eq!(res["guidance"]["difficulty"], json!("hard"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn goal_solves_for_last_ungraded_component() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    // PT is the missing piece: 0.3*80 + 0.2*70 = 38 known, (80 - 38) / 0.5 = 84.
    let res = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "k12.goal",
        json!({
            "gradeLevel": "2",
            "writtenWorks": [{ "score": 8, "maxScore": 10 }],
            "performanceTasks": [],
            "quarterlyAssessment": { "score": 35, "maxScore": 50 },
            "targetGrade": "80"
        }),
    );
    assert_eq!(res["solveFor"], json!("pt"));
    assert!((f(&res["goal"]["required"]) - 84.0).abs() < 1e-9);
    assert_eq!(res["goal"]["isPossible"], json!(true));

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "k12.goal",
        json!({
            "gradeLevel": "2",
            "writtenWorks": [{ "score": 8, "maxScore": 10 }],
            "performanceTasks": [{ "score": 5, "maxScore": 10 }],
            "quarterlyAssessment": { "score": 35, "maxScore": 50 },
            "targetGrade": 99,
            "solveFor": "ww"
        }),
    );
    assert_eq!(res["solveFor"], json!("ww"));
    assert_eq!(res["goal"]["isPossible"], json!(false));
    assert_eq!(res["guidance"]["difficulty"], json!("very-hard"));

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "k12.goal",
        json!({ "gradeLevel": "2", "targetGrade": "" }),
    );
    assert_eq!(res["goal"], json!(null));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn bad_grade_level_and_solve_for_are_param_errors() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let res = request(
        &mut stdin,
        &mut reader,
        "1",
        "k12.calculate",
        json!({ "gradeLevel": "13" }),
    );
    assert_eq!(res["ok"], json!(false));
    assert_eq!(res["error"]["code"], json!("bad_params"));

    let res = request(
        &mut stdin,
        &mut reader,
        "2",
        "k12.goal",
        json!({ "gradeLevel": "3", "targetGrade": 80, "solveFor": "exam" }),
    );
    assert_eq!(res["error"]["code"], json!("bad_params"));

    let res = request(
        &mut stdin,
        &mut reader,
        "3",
        "k12.calculate",
        json!({ "gradeLevel": "3", "writtenWorks": "18/20" }),
    );
    assert_eq!(res["error"]["code"], json!("bad_params"));

    let res = request(
        &mut stdin,
        &mut reader,
        "3a",
        "k12.goal",
        json!({ "gradeLevel": "3", "targetGrade": 80, "solveFor": 3 }),
    );
    assert_eq!(res["error"]["code"], json!("bad_params"));

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "3b",
        "k12.goal",
        json!({ "gradeLevel": "3", "targetGrade": 80, "solveFor": null }),
    );
    assert_eq!(res["solveFor"], json!("qa"));

    let weights = request_ok(&mut stdin, &mut reader, "4", "k12.weights", json!({ "gradeLevel": "5" }));
    assert_eq!(weights["gradeLevel"], json!("5"));
    assert_eq!(weights["valid"], json!(true));
    assert!((f(&weights["weights"]["pt"]) - 0.5).abs() < 1e-12);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn paste_appends_parsed_rows_to_existing_list() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "k12.parsePaste",
        json!({
            "text": "Quiz 2\t22\t25\nbroken line\nSeatwork, 9, 10\n",
            "existing": [{ "name": "Quiz 1", "score": 18, "maxScore": 20 }]
        }),
    );
    let entries = res["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["name"], json!("Quiz 1"));
    assert_eq!(entries[1]["name"], json!("Quiz 2"));
    assert_eq!(entries[2]["maxScore"], json!(10.0));
    assert_eq!(res["parsedCount"], json!(2));
    assert_eq!(res["totalLines"], json!(3));
    assert_eq!(res["warnings"][0]["line"], json!(2));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn entry_edits_return_new_lists() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let entries = json!([
        { "name": "Quiz 1", "score": 18, "maxScore": 20 },
        { "name": "Quiz 2", "score": 22, "maxScore": 25 }
    ]);

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "k12.replaceEntry",
        json!({
            "entries": entries.clone(),
            "index": 1,
            "entry": { "name": "Quiz 2", "score": "24", "maxScore": "25" }
        }),
    );
    assert_eq!(res["changed"], json!(true));
    assert_eq!(res["entries"][1]["score"], json!(24.0));
    assert_eq!(res["entries"][0]["name"], json!("Quiz 1"));

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "k12.removeEntry",
        json!({ "entries": entries.clone(), "index": 0 }),
    );
    assert_eq!(res["changed"], json!(true));
    assert_eq!(res["entries"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(res["entries"][0]["name"], json!("Quiz 2"));

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "k12.removeEntry",
        json!({ "entries": entries.clone(), "index": 7 }),
    );
    assert_eq!(res["changed"], json!(false));
    assert_eq!(res["entries"].as_array().map(|a| a.len()), Some(2));

    let res = request(
        &mut stdin,
        &mut reader,
        "4",
        "k12.replaceEntry",
        json!({ "entries": entries.clone(), "index": -1, "entry": {} }),
    );
    assert_eq!(res["error"]["code"], json!("bad_params"));

    drop(stdin);
    let _ = child.wait();
}
