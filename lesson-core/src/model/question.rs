use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lenient;

/// Option labels of a true/false question, fixed
pub const TRUE_FALSE_OPTIONS: [&str; 2] = ["true", "false"];

/// Fewest options a multiple choice question may have
pub const MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    FillBlank,
    TrueFalse,
    WordOrder,
}

impl QuestionType {
    pub fn all() -> &'static [QuestionType] {
        &[
            QuestionType::MultipleChoice,
            QuestionType::FillBlank,
            QuestionType::TrueFalse,
            QuestionType::WordOrder,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::FillBlank => "fill_blank",
            QuestionType::TrueFalse => "true_false",
            QuestionType::WordOrder => "word_order",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "Multiple choice",
            QuestionType::FillBlank => "Fill in the blank",
            QuestionType::TrueFalse => "True / false",
            QuestionType::WordOrder => "Word order",
        }
    }

    pub fn from_wire(name: &str) -> Option<QuestionType> {
        QuestionType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == name)
    }

    /// Next type in `all()` order, wrapping
    pub fn next(&self) -> QuestionType {
        let all = QuestionType::all();
        let pos = all.iter().position(|t| t == self).unwrap_or(0);
        all[(pos + 1) % all.len()]
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a learner builds a word order answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    #[default]
    Drag,
    Type,
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::Drag => "drag",
            InputMode::Type => "type",
        }
    }

    pub fn from_wire(name: &str) -> Option<InputMode> {
        match name {
            "drag" => Some(InputMode::Drag),
            "type" => Some(InputMode::Type),
            _ => None,
        }
    }
}

/// Type-specific part of a question.
///
/// Only the fields owned by the current type exist; switching type rebuilds
/// this value (see [`crate::mutate::exercise::retype`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    /// `correct` points into `options`; stored pages carry the option text.
    MultipleChoice {
        options: Vec<String>,
        correct: Option<usize>,
    },
    FillBlank {
        answer: String,
    },
    TrueFalse {
        answer: Option<bool>,
    },
    /// `sentence` is the full target sentence
    WordOrder {
        words: Vec<String>,
        sentence: String,
        input_mode: InputMode,
    },
}

impl QuestionKind {
    /// Build a multiple choice payload from option texts and the stored
    /// answer text. The first option whose text matches is the correct one.
    pub fn multiple_choice(mut options: Vec<String>, answer: &str) -> Self {
        if options.len() < MIN_OPTIONS {
            options.resize(MIN_OPTIONS, String::new());
        }
        let correct = if answer.is_empty() {
            None
        } else {
            options.iter().position(|o| o == answer)
        };
        QuestionKind::MultipleChoice { options, correct }
    }

    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::FillBlank { .. } => QuestionType::FillBlank,
            QuestionKind::TrueFalse { .. } => QuestionType::TrueFalse,
            QuestionKind::WordOrder { .. } => QuestionType::WordOrder,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawQuestion", into = "RawQuestion")]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub explanation: Option<String>,
    pub kind: QuestionKind,
}

impl Question {
    /// Empty multiple choice question with two blank options
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            prompt: String::new(),
            explanation: None,
            kind: QuestionKind::multiple_choice(Vec::new(), ""),
        }
    }

    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    /// Option labels as shown to a learner. Empty for types without options.
    pub fn options(&self) -> Vec<&str> {
        match &self.kind {
            QuestionKind::MultipleChoice { options, .. } => {
                options.iter().map(String::as_str).collect()
            }
            QuestionKind::TrueFalse { .. } => TRUE_FALSE_OPTIONS.to_vec(),
            QuestionKind::FillBlank { .. } | QuestionKind::WordOrder { .. } => Vec::new(),
        }
    }

    /// The answer in its stored text form; empty when unset
    pub fn correct_answer(&self) -> String {
        match &self.kind {
            QuestionKind::MultipleChoice { options, correct } => correct
                .and_then(|i| options.get(i))
                .cloned()
                .unwrap_or_default(),
            QuestionKind::FillBlank { answer } => answer.clone(),
            QuestionKind::TrueFalse { answer } => match answer {
                Some(true) => "true".to_string(),
                Some(false) => "false".to_string(),
                None => String::new(),
            },
            QuestionKind::WordOrder { sentence, .. } => sentence.clone(),
        }
    }

    /// Restore the question invariants. Returns true if anything changed.
    pub fn canonicalize(&mut self) -> bool {
        match &mut self.kind {
            QuestionKind::MultipleChoice { options, correct } => {
                let mut repaired = false;
                if options.len() < MIN_OPTIONS {
                    options.resize(MIN_OPTIONS, String::new());
                    repaired = true;
                }
                if correct.is_some_and(|i| i >= options.len()) {
                    *correct = None;
                    repaired = true;
                }
                repaired
            }
            QuestionKind::FillBlank { .. }
            | QuestionKind::TrueFalse { .. }
            | QuestionKind::WordOrder { .. } => false,
        }
    }
}

impl Default for Question {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn parse_true_false(answer: &str) -> Option<Option<bool>> {
    match answer {
        "" => Some(None),
        "true" => Some(Some(true)),
        "false" => Some(Some(false)),
        _ => None,
    }
}

/// Stored shape of a question: a flat record whose optional fields depend
/// on `type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    #[serde(default, deserialize_with = "lenient::id")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    prompt: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    kind: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    explanation: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    options: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::text")]
    correct_answer: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    words: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    input_mode: Option<String>,
}

impl From<RawQuestion> for Question {
    fn from(raw: RawQuestion) -> Self {
        let kind = match QuestionType::from_wire(&raw.kind) {
            Some(QuestionType::FillBlank) => QuestionKind::FillBlank {
                answer: raw.correct_answer,
            },
            Some(QuestionType::TrueFalse) => QuestionKind::TrueFalse {
                answer: parse_true_false(&raw.correct_answer).unwrap_or(None),
            },
            Some(QuestionType::WordOrder) => QuestionKind::WordOrder {
                words: raw.words.unwrap_or_default(),
                sentence: raw.correct_answer,
                input_mode: raw
                    .input_mode
                    .as_deref()
                    .and_then(InputMode::from_wire)
                    .unwrap_or_default(),
            },
            Some(QuestionType::MultipleChoice) | None => QuestionKind::multiple_choice(
                raw.options.unwrap_or_default(),
                &raw.correct_answer,
            ),
        };

        let id = raw
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut question = Question {
            id,
            prompt: raw.prompt,
            explanation: raw.explanation,
            kind,
        };
        question.canonicalize();
        question
    }
}

impl From<Question> for RawQuestion {
    fn from(question: Question) -> Self {
        let correct_answer = question.correct_answer();
        let mut raw = RawQuestion {
            id: Some(question.id),
            prompt: question.prompt,
            kind: question.kind.question_type().as_str().to_string(),
            explanation: question.explanation,
            correct_answer,
            ..Default::default()
        };
        match question.kind {
            QuestionKind::MultipleChoice { options, .. } => raw.options = Some(options),
            QuestionKind::TrueFalse { .. } => {
                raw.options = Some(TRUE_FALSE_OPTIONS.iter().map(|s| s.to_string()).collect())
            }
            QuestionKind::WordOrder {
                words, input_mode, ..
            } => {
                raw.words = Some(words);
                raw.input_mode = Some(input_mode.as_str().to_string());
            }
            QuestionKind::FillBlank { .. } => {}
        }
        raw
    }
}
