//! Term-based grading: four sequential periods with user-editable weights.

use crate::calc::{is_attainable, lenient_number, number_from_value, WEIGHT_SUM_TOLERANCE};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    Prelim,
    Midterm,
    Prefinal,
    Final,
}

impl Term {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prelim" => Some(Self::Prelim),
            "midterm" => Some(Self::Midterm),
            "prefinal" | "pre-final" => Some(Self::Prefinal),
            "final" => Some(Self::Final),
            _ => None,
        }
    }
}

/// Unparseable weights count as 0, the same as a cleared input box.
fn lenient_weight<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(number_from_value).unwrap_or(0.0))
}

/// Percentages per term. Expected to sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermWeights {
    #[serde(deserialize_with = "lenient_weight")]
    pub prelim: f64,
    #[serde(deserialize_with = "lenient_weight")]
    pub midterm: f64,
    #[serde(deserialize_with = "lenient_weight")]
    pub prefinal: f64,
    #[serde(rename = "final", deserialize_with = "lenient_weight")]
    pub final_term: f64,
}

impl Default for TermWeights {
    fn default() -> Self {
        Self {
            prelim: 20.0,
            midterm: 20.0,
            prefinal: 20.0,
            final_term: 40.0,
        }
    }
}

impl TermWeights {
    pub fn total(&self) -> f64 {
        self.prelim + self.midterm + self.prefinal + self.final_term
    }

    /// Copy of these weights with one term replaced.
    pub fn with_weight(&self, term: Term, value: f64) -> Self {
        let mut next = *self;
        match term {
            Term::Prelim => next.prelim = value,
            Term::Midterm => next.midterm = value,
            Term::Prefinal => next.prefinal = value,
            Term::Final => next.final_term = value,
        }
        next
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TermGrades {
    #[serde(default, deserialize_with = "lenient_number")]
    pub prelim: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub midterm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub prefinal: Option<f64>,
    #[serde(rename = "final", default, deserialize_with = "lenient_number")]
    pub final_term: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermSubject {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub units: Option<f64>,
    #[serde(default)]
    pub weights: TermWeights,
    #[serde(default)]
    pub grades: TermGrades,
    #[serde(default, deserialize_with = "lenient_number")]
    pub target_grade: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightValidation {
    pub valid: bool,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Lints a weight set. An invalid total is a warning for the user; callers
/// keep computing with the weights as given.
pub fn validate_weights(weights: &TermWeights) -> WeightValidation {
    let total = weights.total();
    let valid = (total - 100.0).abs() <= WEIGHT_SUM_TOLERANCE;
    let message = if valid {
        None
    } else {
        Some(format!("Weights must sum to 100% (current: {}%)", total))
    };
    WeightValidation {
        valid,
        total,
        message,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentGrade {
    pub current_grade: f64,
    pub completed_weight: f64,
}

/// Grade over the graded share of prelim, midterm and pre-final.
///
/// The weighted sum is renormalised by the completed weight, so the result is
/// the grade "on what's graded so far", not the contribution to the final.
pub fn current_grade(subject: &TermSubject) -> Option<CurrentGrade> {
    let w = &subject.weights;
    let g = &subject.grades;
    let mut weighted_sum = 0.0_f64;
    let mut completed_weight = 0.0_f64;
    for (grade, weight) in [
        (g.prelim, w.prelim),
        (g.midterm, w.midterm),
        (g.prefinal, w.prefinal),
    ] {
        if let Some(grade) = grade {
            weighted_sum += grade * (weight / 100.0);
            completed_weight += weight;
        }
    }
    if completed_weight == 0.0 {
        return None;
    }
    Some(CurrentGrade {
        current_grade: weighted_sum / (completed_weight / 100.0),
        completed_weight,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredFinal {
    pub required: f64,
    pub remaining_weight: f64,
    pub is_possible: bool,
}

/// Score needed on the remaining weight to reach `target_grade`.
///
/// `None` when there is no target, nothing graded yet, or no weight left.
pub fn required_final(subject: &TermSubject) -> Option<RequiredFinal> {
    let target = subject.target_grade?;
    let current = current_grade(subject)?;
    let remaining_weight = 100.0 - current.completed_weight;
    if remaining_weight <= 0.0 {
        return None;
    }
    let required = (target - current.current_grade * (current.completed_weight / 100.0))
        / (remaining_weight / 100.0);
    Some(RequiredFinal {
        required,
        remaining_weight,
        is_possible: is_attainable(required),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermProjection {
    pub current: Option<CurrentGrade>,
    pub required_final: Option<RequiredFinal>,
    pub weights: WeightValidation,
}

pub fn project(subject: &TermSubject) -> TermProjection {
    TermProjection {
        current: current_grade(subject),
        required_final: required_final(subject),
        weights: validate_weights(&subject.weights),
    }
}

/// Plain mean of the current grades of subjects that have one.
pub fn semester_average(subjects: &[TermSubject]) -> Option<f64> {
    let grades: Vec<f64> = subjects
        .iter()
        .filter_map(current_grade)
        .map(|c| c.current_grade)
        .collect();
    if grades.is_empty() {
        return None;
    }
    Some(grades.iter().sum::<f64>() / (grades.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(prelim: Option<f64>, midterm: Option<f64>, prefinal: Option<f64>) -> TermSubject {
        TermSubject {
            name: "Data Structures".into(),
            units: Some(3.0),
            weights: TermWeights::default(),
            grades: TermGrades {
                prelim,
                midterm,
                prefinal,
                final_term: None,
            },
            target_grade: None,
        }
    }

    #[test]
    fn three_terms_graded_projects_final() {
        let mut s = subject(Some(85.0), Some(87.0), Some(86.0));
        s.target_grade = Some(90.0);

        let current = current_grade(&s).expect("current");
        assert_eq!(current.completed_weight, 60.0);
        assert!((current.current_grade - 86.0).abs() < 1e-9);

        let req = required_final(&s).expect("required");
        assert_eq!(req.remaining_weight, 40.0);
        assert!((req.required - 96.0).abs() < 1e-9);
        assert!(req.is_possible);
    }

    #[test]
    fn current_grade_renormalises_by_completed_share() {
        let s = subject(Some(80.0), None, None);
        let current = current_grade(&s).expect("current");
        // 80 * 0.2 = 16 contributed, but the grade so far is 80.
        assert!((current.current_grade - 80.0).abs() < 1e-9);
        assert_eq!(current.completed_weight, 20.0);
    }

    #[test]
    fn nothing_graded_has_no_current_or_requirement() {
        let mut s = subject(None, None, None);
        s.target_grade = Some(75.0);
        assert!(current_grade(&s).is_none());
        assert!(required_final(&s).is_none());
    }

    #[test]
    fn final_grade_does_not_count_toward_current() {
        let mut s = subject(None, None, None);
        s.grades.final_term = Some(99.0);
        assert!(current_grade(&s).is_none());
    }

    #[test]
    fn no_target_means_no_requirement() {
        let s = subject(Some(85.0), Some(87.0), Some(86.0));
        assert!(required_final(&s).is_none());
    }

    #[test]
    fn fully_weighted_subject_has_no_requirement() {
        let mut s = subject(Some(90.0), Some(80.0), Some(70.0));
        s.weights = TermWeights {
            prelim: 30.0,
            midterm: 30.0,
            prefinal: 40.0,
            final_term: 0.0,
        };
        s.grades.final_term = Some(85.0);
        s.target_grade = Some(90.0);
        let current = current_grade(&s).expect("current");
        assert_eq!(current.completed_weight, 100.0);
        assert!(required_final(&s).is_none());
    }

    #[test]
    fn out_of_reach_target_is_not_possible() {
        let mut s = subject(Some(60.0), Some(65.0), Some(62.0));
        s.target_grade = Some(95.0);
        let req = required_final(&s).expect("required");
        assert!(req.required > 100.0);
        assert!(!req.is_possible);
    }

    #[test]
    fn invalid_weights_warn_but_still_compute() {
        let mut s = subject(Some(85.0), Some(87.0), None);
        s.weights = s.weights.with_weight(Term::Prelim, 30.0);
        let projection = project(&s);
        assert!(!projection.weights.valid);
        assert_eq!(projection.weights.total, 110.0);
        assert_eq!(
            projection.weights.message.as_deref(),
            Some("Weights must sum to 100% (current: 110%)")
        );
        let current = projection.current.expect("current");
        assert_eq!(current.completed_weight, 50.0);
        assert!((current.current_grade - (85.0 * 0.3 + 87.0 * 0.2) / 0.5).abs() < 1e-9);
    }

    #[test]
    fn with_weight_leaves_original_untouched() {
        let base = TermWeights::default();
        let edited = base.with_weight(Term::Final, 25.0);
        assert_eq!(base.final_term, 40.0);
        assert_eq!(edited.final_term, 25.0);
        assert!(validate_weights(&base).valid);
        assert_eq!(validate_weights(&edited).total, 85.0);
    }

    #[test]
    fn weights_deserialize_leniently_with_defaults() {
        let w: TermWeights = serde_json::from_value(serde_json::json!({
            "prelim": "25",
            "midterm": "",
            "final": 35
        }))
        .expect("weights");
        assert_eq!(w.prelim, 25.0);
        assert_eq!(w.midterm, 0.0);
        assert_eq!(w.prefinal, 20.0);
        assert_eq!(w.final_term, 35.0);
    }

    #[test]
    fn semester_average_skips_ungraded_subjects() {
        let subjects = vec![
            subject(Some(90.0), None, None),
            subject(None, None, None),
            subject(Some(80.0), Some(80.0), None),
        ];
        let avg = semester_average(&subjects).expect("average");
        assert!((avg - 85.0).abs() < 1e-9);
        assert_eq!(semester_average(&[subject(None, None, None)]), None);
    }
}
