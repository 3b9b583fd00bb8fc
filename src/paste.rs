use crate::calc::ScoreEntry;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PasteWarning {
    pub line: usize,
    pub code: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteResult {
    pub entries: Vec<ScoreEntry>,
    pub warnings: Vec<PasteWarning>,
    pub total_lines: usize,
}

fn split_fields(line: &str) -> Vec<&str> {
    if line.contains('\t') {
        line.split('\t').collect()
    } else {
        line.split(',').collect()
    }
}

fn parse_field(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses spreadsheet-style `name<TAB>score<TAB>maxScore` lines.
///
/// Lines without a tab fall back to commas. Blank lines are ignored; short or
/// non-numeric lines are skipped and reported, never fatal.
pub fn parse_score_lines(text: &str) -> PasteResult {
    let mut out = PasteResult::default();
    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if raw_line.trim().is_empty() {
            continue;
        }
        out.total_lines += 1;
        let fields = split_fields(raw_line);
        if fields.len() < 3 {
            out.warnings.push(PasteWarning {
                line: line_no,
                code: "bad_columns",
                message: "expected name, score and max score",
            });
            continue;
        }
        let (Some(score), Some(max_score)) = (parse_field(fields[1]), parse_field(fields[2]))
        else {
            out.warnings.push(PasteWarning {
                line: line_no,
                code: "bad_number",
                message: "score and max score must be numeric",
            });
            continue;
        };
        out.entries
            .push(ScoreEntry::new(fields[0].trim(), score, max_score));
    }
    out
}
