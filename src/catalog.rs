use serde::{Deserialize, Serialize};

use crate::store::QuestionSource;

/// One answer variant of a multiple-choice question. The correctness flag is
/// never serialized into API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: i32,
    pub text: String,
    #[serde(skip_serializing)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i32,
    pub text: String,
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn option(&self, option_id: i32) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

/// Read-only, ordered question catalog, loaded once at process start.
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    pub fn new(mut questions: Vec<Question>) -> Self {
        questions.sort_by_key(|q| q.id);
        Self { questions }
    }

    pub fn empty() -> Self {
        Self { questions: Vec::new() }
    }

    /// Loads the catalog from its backing source. An unreadable source
    /// degrades to an empty catalog so the process still starts.
    pub async fn load<S: QuestionSource>(source: &S) -> Self {
        match source.load_questions().await {
            Ok(questions) => {
                log::info!("Loaded {} questions into the catalog", questions.len());
                Self::new(questions)
            }
            Err(e) => {
                log::error!("Failed to load questions, serving an empty catalog: {e}");
                Self::empty()
            }
        }
    }

    pub fn all(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, question_id: i32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn by_index(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn count(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
