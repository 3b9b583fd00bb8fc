use crate::calc::lenient_number;
use serde::{Deserialize, Serialize};

/// One tertiary subject on the 1.0 (best) to 5.0 scale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub grade: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub units: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpaSummary {
    pub gpa: f64,
    pub total_units: f64,
    pub subject_count: usize,
}

/// Units-weighted mean grade over subjects that have both a grade and units.
///
/// Grades outside 1.0..=5.0 pass through untouched. No counted units gives a
/// GPA of 0.
pub fn compute_gpa(subjects: &[Subject]) -> GpaSummary {
    let mut total_points = 0.0_f64;
    let mut total_units = 0.0_f64;
    let mut subject_count = 0_usize;
    for s in subjects {
        let (Some(grade), Some(units)) = (s.grade, s.units) else {
            continue;
        };
        total_points += grade * units;
        total_units += units;
        subject_count += 1;
    }
    let gpa = if total_units > 0.0 {
        total_points / total_units
    } else {
        0.0
    };
    GpaSummary {
        gpa,
        total_units,
        subject_count,
    }
}
