//! Descriptors and motivational text shown next to computed grades.

use serde::Serialize;

/// DepEd passing mark for a K-12 final grade.
pub const PASSING_GRADE: f64 = 75.0;

/// DepEd proficiency descriptor for a 0-100 final grade.
pub fn k12_descriptor(grade: f64) -> &'static str {
    if grade >= 90.0 {
        "Outstanding"
    } else if grade >= 85.0 {
        "Very Satisfactory"
    } else if grade >= 80.0 {
        "Satisfactory"
    } else if grade >= PASSING_GRADE {
        "Fairly Satisfactory"
    } else {
        "Below Expectations"
    }
}

pub fn k12_message(grade: f64) -> &'static str {
    if grade >= 90.0 {
        "Outstanding! Your hard work is paying off!"
    } else if grade >= 85.0 {
        "Very Satisfactory! Keep up the great work!"
    } else if grade >= 80.0 {
        "Satisfactory! You're doing well!"
    } else if grade >= PASSING_GRADE {
        "Fairly Satisfactory. Keep pushing - you can improve!"
    } else {
        "Don't be discouraged! Use this as motivation to work harder next time."
    }
}

/// Message for a 1.0-5.0 GPA, where lower is better.
pub fn tertiary_message(gpa: f64) -> &'static str {
    if gpa <= 1.5 {
        "Summa Cum Laude potential! Your dedication is truly inspiring!"
    } else if gpa <= 1.75 {
        "Magna Cum Laude potential! Keep up the excellent work!"
    } else if gpa <= 2.0 {
        "Cum Laude potential! You're doing great!"
    } else if gpa <= 2.5 {
        "Very Good! You're on the right track!"
    } else if gpa <= 3.0 {
        "Good! With a little more effort, you can reach even higher!"
    } else if gpa <= 4.0 {
        "Satisfactory. There's room for improvement - you can do it!"
    } else {
        "Don't give up! Every challenge is an opportunity to learn and grow."
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Honors {
    SummaCumLaude,
    MagnaCumLaude,
    CumLaude,
}

pub fn honors(gpa: f64) -> Option<Honors> {
    if gpa <= 0.0 {
        // 0 means "no counted subjects", not a perfect record.
        None
    } else if gpa <= 1.5 {
        Some(Honors::SummaCumLaude)
    } else if gpa <= 1.75 {
        Some(Honors::MagnaCumLaude)
    } else if gpa <= 2.0 {
        Some(Honors::CumLaude)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    VeryHard,
}

impl Difficulty {
    pub fn for_required(required: f64) -> Self {
        if required <= 60.0 {
            Self::Easy
        } else if required <= 80.0 {
            Self::Medium
        } else if required <= 95.0 {
            Self::Hard
        } else {
            Self::VeryHard
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Easy => "You can do this! Just basic review needed.",
            Self::Medium => "Challenging but achievable! Structured study needed.",
            Self::Hard => "This will require serious effort!",
            Self::VeryHard => "Very difficult target. Consider adjusting goals or seeking help.",
        }
    }

    pub fn tips(self) -> &'static [&'static str] {
        match self {
            Self::Easy => &[
                "Review your notes",
                "Get good sleep the night before",
                "Stay confident and focused",
            ],
            Self::Medium => &[
                "Create a study schedule 2 weeks before",
                "Join a study group for motivation",
                "Practice with past exam questions",
                "Focus on key topics from Written Works",
            ],
            Self::Hard => &[
                "Ask your teacher for help immediately",
                "Identify and focus on your weakest areas",
                "Consider asking about extra credit opportunities",
                "Form a dedicated study group",
                "Review all lessons thoroughly",
            ],
            Self::VeryHard => &[
                "Talk to your teacher ASAP about options",
                "Focus only on the most important topics",
                "Don't lose hope - every point counts!",
                "Ask about remedial activities or extra credit",
                "Inform your parents and seek their support",
            ],
        }
    }
}
