//! Line-by-line entry of a question for the terminal.

use wordlink_core::{Category, Identity, Question, QuestionDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Category,
    ClueWords,
    SolutionWord,
    AnswerExplanation,
    Active,
}

const FIELDS: [Field; 6] = [
    Field::Title,
    Field::Category,
    Field::ClueWords,
    Field::SolutionWord,
    Field::AnswerExplanation,
    Field::Active,
];

/// What the form wants after a line was accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum FormStep {
    /// Ask for the next field with this prompt.
    Ask(String),
    Done(QuestionDraft),
}

/// Collects the fields of a new or edited question one line at a time.
///
/// An empty line keeps the value shown in brackets. Field rules are left to
/// [`QuestionDraft::validate`] once the form is complete.
#[derive(Debug, Clone)]
pub struct QuestionForm {
    question_id: Option<String>,
    draft: QuestionDraft,
    field: usize,
}

impl QuestionForm {
    pub fn new(owner: Identity) -> Self {
        Self {
            question_id: None,
            draft: QuestionDraft {
                title: String::new(),
                category: Category::General,
                clue_words: Vec::new(),
                solution_word: String::new(),
                answer_explanation: String::new(),
                is_active: true,
                owner,
                image_url: None,
            },
            field: 0,
        }
    }

    pub fn edit(question: &Question) -> Self {
        Self {
            question_id: Some(question.id.clone()),
            draft: QuestionDraft::from_question(question),
            field: 0,
        }
    }

    /// Id of the question being edited, `None` for a new one.
    pub fn question_id(&self) -> Option<&str> {
        self.question_id.as_deref()
    }

    pub fn prompt(&self) -> String {
        let (label, current) = match FIELDS[self.field] {
            Field::Title => ("Title", self.draft.title.clone()),
            Field::Category => ("Category", self.draft.category.as_str().to_string()),
            Field::ClueWords => ("Clue words, comma separated", self.draft.clue_words.join(", ")),
            Field::SolutionWord => ("Solution word", self.draft.solution_word.clone()),
            Field::AnswerExplanation => {
                ("Answer explanation", self.draft.answer_explanation.clone())
            }
            Field::Active => (
                "Active (y/n)",
                if self.draft.is_active { "y" } else { "n" }.to_string(),
            ),
        };
        if current.is_empty() {
            format!("{label}:")
        } else {
            format!("{label} [{current}]:")
        }
    }

    /// Take one line for the current field.
    ///
    /// A rejected line leaves the form on the same field.
    pub fn accept(&mut self, line: &str) -> Result<FormStep, String> {
        let value = line.trim();
        if !value.is_empty() {
            self.set(FIELDS[self.field], value)?;
        } else if self.is_blank(FIELDS[self.field]) {
            return Err("A value is required".to_string());
        }

        self.field += 1;
        if self.field == FIELDS.len() {
            Ok(FormStep::Done(self.draft.clone()))
        } else {
            Ok(FormStep::Ask(self.prompt()))
        }
    }

    fn set(&mut self, field: Field, value: &str) -> Result<(), String> {
        match field {
            Field::Title => self.draft.title = value.to_string(),
            Field::Category => {
                self.draft.category = value
                    .to_uppercase()
                    .parse()
                    .map_err(|e: wordlink_core::CategoryParseError| e.to_string())?;
            }
            Field::ClueWords => {
                self.draft.clue_words = value
                    .split(',')
                    .map(str::trim)
                    .filter(|w| !w.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            Field::SolutionWord => self.draft.solution_word = value.to_string(),
            Field::AnswerExplanation => self.draft.answer_explanation = value.to_string(),
            Field::Active => {
                self.draft.is_active = match value.to_lowercase().as_str() {
                    "y" | "yes" => true,
                    "n" | "no" => false,
                    _ => return Err("Answer y or n".to_string()),
                };
            }
        }
        Ok(())
    }

    fn is_blank(&self, field: Field) -> bool {
        match field {
            Field::Title => self.draft.title.is_empty(),
            Field::ClueWords => self.draft.clue_words.is_empty(),
            Field::SolutionWord => self.draft.solution_word.is_empty(),
            Field::AnswerExplanation => self.draft.answer_explanation.is_empty(),
            Field::Category | Field::Active => false,
        }
    }
}
