use std::fmt;

use serde::Serialize;

use crate::store::AnswerRecord;

/// A–F grade over the score percentage. Rewards high scores narrowly; kept
/// separate from the CEFR bands on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    E,
    F,
}

/// CEFR-style proficiency band derived from the score percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProficiencyLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grade = match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::E => "E",
            LetterGrade::F => "F",
        };
        write!(f, "{grade}")
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            ProficiencyLevel::A1 => "A1",
            ProficiencyLevel::A2 => "A2",
            ProficiencyLevel::B1 => "B1",
            ProficiencyLevel::B2 => "B2",
            ProficiencyLevel::C1 => "C1",
            ProficiencyLevel::C2 => "C2",
        };
        write!(f, "{level}")
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub total_answers: usize,
    pub correct_answers: usize,
    pub average_score: f64,
    pub score: LetterGrade,
    pub proficiency_level: ProficiencyLevel,
}

/// Aggregates an answer-log subset into the final report. A pending verdict
/// counts as incorrect.
pub fn score(records: &[AnswerRecord]) -> ScoreReport {
    let total_answers = records.len();
    let correct_answers = records
        .iter()
        .filter(|r| r.is_correct == Some(true))
        .count();

    let average_score = if total_answers > 0 {
        truncate2(correct_answers as f64 / total_answers as f64 * 100.0)
    } else {
        0.0
    };

    ScoreReport {
        total_answers,
        correct_answers,
        average_score,
        score: letter_grade(average_score),
        proficiency_level: proficiency_level(average_score),
    }
}

// Truncated, not rounded, to two decimal places.
fn truncate2(value: f64) -> f64 {
    (value * 100.0).trunc() / 100.0
}

fn letter_grade(average: f64) -> LetterGrade {
    if average >= 90.0 {
        LetterGrade::A
    } else if average >= 80.0 {
        LetterGrade::B
    } else if average >= 70.0 {
        LetterGrade::C
    } else if average >= 60.0 {
        LetterGrade::D
    } else if average >= 50.0 {
        LetterGrade::E
    } else {
        LetterGrade::F
    }
}

fn proficiency_level(average: f64) -> ProficiencyLevel {
    if average <= 20.0 {
        ProficiencyLevel::A1
    } else if average <= 40.0 {
        ProficiencyLevel::A2
    } else if average <= 60.0 {
        ProficiencyLevel::B1
    } else if average <= 75.0 {
        ProficiencyLevel::B2
    } else if average <= 90.0 {
        ProficiencyLevel::C1
    } else {
        ProficiencyLevel::C2
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record(is_correct: Option<bool>) -> AnswerRecord {
        AnswerRecord {
            id: 0,
            session_id: "s".to_owned(),
            telegram_user: "u".to_owned(),
            question_id: 0,
            answer_id: 0,
            is_correct,
            created_at: Utc::now(),
        }
    }

    fn records(correct: usize, wrong: usize) -> Vec<AnswerRecord> {
        let mut out = vec![record(Some(true)); correct];
        out.extend(vec![record(Some(false)); wrong]);
        out
    }

    #[test]
    fn empty_history_scores_zero() {
        let report = score(&[]);
        assert_eq!(report.total_answers, 0);
        assert_eq!(report.correct_answers, 0);
        assert_eq!(report.average_score, 0.0);
    }

    #[test]
    fn three_of_four_is_c_grade_b2_band() {
        let report = score(&records(3, 1));
        assert_eq!(report.average_score, 75.0);
        assert_eq!(report.score, LetterGrade::C);
        assert_eq!(report.proficiency_level, ProficiencyLevel::B2);
    }

    #[test]
    fn perfect_run_is_a_grade_c2_band() {
        let report = score(&records(5, 0));
        assert_eq!(report.correct_answers, 5);
        assert_eq!(report.average_score, 100.0);
        assert_eq!(report.score, LetterGrade::A);
        assert_eq!(report.proficiency_level, ProficiencyLevel::C2);
    }

    #[test]
    fn average_is_truncated_not_rounded() {
        // 2/3 = 66.666..., rounding would produce 66.67
        let report = score(&records(2, 1));
        assert_eq!(report.average_score, 66.66);
        // 1/3 = 33.333...
        let report = score(&records(1, 2));
        assert_eq!(report.average_score, 33.33);
    }

    #[test]
    fn grade_and_band_tables_stay_independent() {
        // 90% is the best letter grade but not yet the top band.
        let report = score(&records(9, 1));
        assert_eq!(report.average_score, 90.0);
        assert_eq!(report.score, LetterGrade::A);
        assert_eq!(report.proficiency_level, ProficiencyLevel::C1);

        // 20% is a failing grade but a defined entry band.
        let report = score(&records(1, 4));
        assert_eq!(report.score, LetterGrade::F);
        assert_eq!(report.proficiency_level, ProficiencyLevel::A1);

        // 50% sits exactly on the E threshold.
        let report = score(&records(2, 2));
        assert_eq!(report.score, LetterGrade::E);
        assert_eq!(report.proficiency_level, ProficiencyLevel::B1);
    }

    #[test]
    fn pending_verdicts_count_as_incorrect() {
        let report = score(&[record(Some(true)), record(None)]);
        assert_eq!(report.total_answers, 2);
        assert_eq!(report.correct_answers, 1);
        assert_eq!(report.average_score, 50.0);
    }

    #[test]
    fn report_serializes_with_camel_case_wire_names() {
        let json = serde_json::to_value(score(&records(3, 1))).unwrap();
        assert_eq!(json["totalAnswers"], 4);
        assert_eq!(json["correctAnswers"], 3);
        assert_eq!(json["averageScore"], 75.0);
        assert_eq!(json["score"], "C");
        assert_eq!(json["proficiencyLevel"], "B2");
    }
}
