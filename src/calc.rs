use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Absolute tolerance used when checking that a set of weights sums to its
/// expected total.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Reads a JSON number, a numeric string, or an empty value.
///
/// Form fields arrive as strings (`""` while the user is still typing), so
/// anything that does not parse to a finite number is treated as empty rather
/// than rejected.
pub fn number_from_value(v: &serde_json::Value) -> Option<f64> {
    let n = match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|x| x.is_finite())
}

pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(number_from_value))
}

/// Display rounding used in every response: two decimals, like the UI shows.
pub fn format_2dp(x: f64) -> String {
    format!("{:.2}", x)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub max_score: Option<f64>,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, score: f64, max_score: f64) -> Self {
        Self {
            name: name.into(),
            score: Some(score),
            max_score: Some(max_score),
        }
    }

    /// Both values present and a positive maximum.
    pub fn is_complete(&self) -> bool {
        matches!((self.score, self.max_score), (Some(_), Some(max)) if max > 0.0)
    }

    pub fn percent(&self) -> Option<f64> {
        if !self.is_complete() {
            return None;
        }
        let (score, max) = (self.score?, self.max_score?);
        Some(100.0 * score / max)
    }
}

/// Returns a new list with `more` appended after `entries`.
pub fn appended(entries: &[ScoreEntry], more: &[ScoreEntry]) -> Vec<ScoreEntry> {
    entries.iter().chain(more.iter()).cloned().collect()
}

/// Returns a new list with the entry at `index` swapped for `entry`.
/// An out-of-range index leaves the copy unchanged.
pub fn replaced(entries: &[ScoreEntry], index: usize, entry: ScoreEntry) -> Vec<ScoreEntry> {
    let mut out = entries.to_vec();
    if let Some(slot) = out.get_mut(index) {
        *slot = entry;
    }
    out
}

/// Returns a new list without the entry at `index`.
pub fn removed(entries: &[ScoreEntry], index: usize) -> Vec<ScoreEntry> {
    entries
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, e)| e.clone())
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentResult {
    pub average: f64,
    pub item_count: usize,
}

/// Mean of the per-item percentages over complete entries.
///
/// Every item counts equally regardless of its point value; an empty or fully
/// ungraded list yields `average = 0, item_count = 0`.
pub fn component_average(entries: &[ScoreEntry]) -> ComponentResult {
    let mut sum = 0.0_f64;
    let mut item_count = 0_usize;
    for p in entries.iter().filter_map(ScoreEntry::percent) {
        sum += p;
        item_count += 1;
    }
    let average = if item_count > 0 {
        sum / (item_count as f64)
    } else {
        0.0
    };
    ComponentResult {
        average,
        item_count,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Component {
    #[serde(rename = "ww")]
    WrittenWorks,
    #[serde(rename = "pt")]
    PerformanceTasks,
    #[serde(rename = "qa")]
    QuarterlyAssessment,
}

impl Component {
    pub const ALL: [Component; 3] = [
        Component::WrittenWorks,
        Component::PerformanceTasks,
        Component::QuarterlyAssessment,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ww" | "writtenworks" => Some(Self::WrittenWorks),
            "pt" | "performancetasks" => Some(Self::PerformanceTasks),
            "qa" | "quarterlyassessment" => Some(Self::QuarterlyAssessment),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::WrittenWorks => "ww",
            Self::PerformanceTasks => "pt",
            Self::QuarterlyAssessment => "qa",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::WrittenWorks => "Written Works",
            Self::PerformanceTasks => "Performance Tasks",
            Self::QuarterlyAssessment => "Quarterly Assessment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightProfile {
    pub ww: f64,
    pub pt: f64,
    pub qa: f64,
}

impl WeightProfile {
    pub const fn new(ww: f64, pt: f64, qa: f64) -> Self {
        Self { ww, pt, qa }
    }

    pub fn weight(&self, component: Component) -> f64 {
        match component {
            Component::WrittenWorks => self.ww,
            Component::PerformanceTasks => self.pt,
            Component::QuarterlyAssessment => self.qa,
        }
    }

    pub fn sum(&self) -> f64 {
        self.ww + self.pt + self.qa
    }

    pub fn is_valid(&self) -> bool {
        (self.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradeLevel {
    Grade(u8),
    SeniorHigh,
}

impl GradeLevel {
    pub fn parse(s: &str) -> Option<Self> {
        let t = s.trim();
        if t.eq_ignore_ascii_case("shs") {
            return Some(Self::SeniorHigh);
        }
        match t.parse::<u8>().ok()? {
            n @ 1..=10 => Some(Self::Grade(n)),
            11 | 12 => Some(Self::SeniorHigh),
            _ => None,
        }
    }

    pub fn key(self) -> String {
        match self {
            Self::Grade(n) => n.to_string(),
            Self::SeniorHigh => "shs".to_string(),
        }
    }
}

/// Grade-level weight lookup handed to the calculators.
#[derive(Debug, Clone)]
pub struct WeightTable {
    profiles: HashMap<GradeLevel, WeightProfile>,
}

impl WeightTable {
    /// DepEd Order No. 8, s. 2015.
    pub fn deped() -> Self {
        let mut profiles = HashMap::new();
        for n in 1..=6 {
            profiles.insert(GradeLevel::Grade(n), WeightProfile::new(0.30, 0.50, 0.20));
        }
        for n in 7..=10 {
            profiles.insert(GradeLevel::Grade(n), WeightProfile::new(0.40, 0.40, 0.20));
        }
        profiles.insert(GradeLevel::SeniorHigh, WeightProfile::new(0.50, 0.30, 0.20));
        Self { profiles }
    }

    pub fn profile(&self, level: GradeLevel) -> Option<WeightProfile> {
        self.profiles.get(&level).copied()
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::deped()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Components {
    pub ww: ComponentResult,
    pub pt: ComponentResult,
    pub qa: ComponentResult,
}

impl Components {
    pub fn aggregate(
        written_works: &[ScoreEntry],
        performance_tasks: &[ScoreEntry],
        quarterly_assessment: &ScoreEntry,
    ) -> Self {
        Self {
            ww: component_average(written_works),
            pt: component_average(performance_tasks),
            qa: component_average(std::slice::from_ref(quarterly_assessment)),
        }
    }

    pub fn get(&self, component: Component) -> ComponentResult {
        match component {
            Component::WrittenWorks => self.ww,
            Component::PerformanceTasks => self.pt,
            Component::QuarterlyAssessment => self.qa,
        }
    }

    /// The component a goal projection solves for when the caller does not
    /// name one: the last ungraded component, falling back to QA.
    pub fn default_unknown(&self) -> Component {
        Component::ALL
            .iter()
            .rev()
            .copied()
            .find(|c| self.get(*c).item_count == 0)
            .unwrap_or(Component::QuarterlyAssessment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinalGrade {
    pub value: f64,
    pub components: Components,
}

/// Σ(component average × weight). Not clamped, not rounded.
pub fn final_grade(components: &Components, weights: &WeightProfile) -> FinalGrade {
    let value = Component::ALL
        .iter()
        .map(|c| components.get(*c).average * weights.weight(*c))
        .sum();
    FinalGrade {
        value,
        components: *components,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProjection {
    pub solve_for: Component,
    pub target: f64,
    pub known_contribution: f64,
    pub needed: f64,
    pub required: Option<f64>,
    pub is_possible: bool,
}

/// Solves the K-12 final grade formula for one unknown component.
///
/// A zero (or negative) weight on the unknown leaves nothing to solve:
/// `required` is `None` and the target is reported as not possible.
pub fn project_goal(
    components: &Components,
    weights: &WeightProfile,
    target: f64,
    solve_for: Component,
) -> GoalProjection {
    let known_contribution: f64 = Component::ALL
        .iter()
        .filter(|c| **c != solve_for)
        .map(|c| components.get(*c).average * weights.weight(*c))
        .sum();
    let needed = target - known_contribution;
    let weight = weights.weight(solve_for);
    let required = if weight > 0.0 {
        Some(needed / weight)
    } else {
        None
    };
    GoalProjection {
        solve_for,
        target,
        known_contribution,
        needed,
        required,
        is_possible: required.map(is_attainable).unwrap_or(false),
    }
}

/// A required percentage can be earned iff it lies in `[0, 100]`.
pub fn is_attainable(required: f64) -> bool {
    (0.0..=100.0).contains(&required)
}
