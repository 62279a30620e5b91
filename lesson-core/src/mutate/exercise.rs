//! Edits on exercise blocks and the questions inside them.
//!
//! Multiple choice correctness is tracked by option position, so renaming
//! the correct option keeps it correct and removing it clears the answer.

use super::check;
use crate::error::Rejection;
use crate::model::question::parse_true_false;
use crate::model::{
    ExerciseData, InputMode, Question, QuestionKind, QuestionType, MIN_OPTIONS, TRUE_FALSE_OPTIONS,
};

/// A single field of a question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionField {
    Prompt(String),
    Explanation(Option<String>),
    /// Rebuilds the type-specific fields, see [`retype`]
    Type(QuestionType),
    /// Answer in stored text form. Multiple choice needs the text of an
    /// existing option (or empty to clear); true/false needs `true`, `false`
    /// or empty.
    CorrectAnswer(String),
    InputMode(InputMode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExerciseEdit {
    SetTitle(String),
    SetShowResultsImmediately(bool),
    SetAllowRetry(bool),
    /// Append an empty multiple choice question
    AddQuestion,
    RemoveQuestion(usize),
    UpdateQuestion {
        index: usize,
        field: QuestionField,
    },
    AddOption {
        question: usize,
    },
    RemoveOption {
        question: usize,
        option: usize,
    },
    UpdateOption {
        question: usize,
        option: usize,
        value: String,
    },
    AddWord {
        question: usize,
    },
    RemoveWord {
        question: usize,
        word: usize,
    },
    UpdateWord {
        question: usize,
        word: usize,
        value: String,
    },
}

pub fn apply(exercise: &ExerciseData, edit: ExerciseEdit) -> Result<ExerciseData, Rejection> {
    let mut next = exercise.clone();

    match edit {
        ExerciseEdit::SetTitle(title) => next.title = title,
        ExerciseEdit::SetShowResultsImmediately(on) => next.show_results_immediately = on,
        ExerciseEdit::SetAllowRetry(on) => next.allow_retry = on,
        ExerciseEdit::AddQuestion => next.questions.push(Question::new()),
        ExerciseEdit::RemoveQuestion(index) => {
            question_mut(&mut next, index)?;
            next.questions.remove(index);
        }
        ExerciseEdit::UpdateQuestion { index, field } => {
            update_field(question_mut(&mut next, index)?, field)?
        }
        ExerciseEdit::AddOption { question } => add_option(question_mut(&mut next, question)?)?,
        ExerciseEdit::RemoveOption { question, option } => {
            remove_option(question_mut(&mut next, question)?, option)?
        }
        ExerciseEdit::UpdateOption {
            question,
            option,
            value,
        } => update_option(question_mut(&mut next, question)?, option, value)?,
        ExerciseEdit::AddWord { question } => words_mut(question_mut(&mut next, question)?)?
            .push(String::new()),
        ExerciseEdit::RemoveWord { question, word } => {
            let words = words_mut(question_mut(&mut next, question)?)?;
            check(word, words.len(), "word")?;
            words.remove(word);
        }
        ExerciseEdit::UpdateWord {
            question,
            word,
            value,
        } => {
            let words = words_mut(question_mut(&mut next, question)?)?;
            check(word, words.len(), "word")?;
            words[word] = value;
        }
    }

    next.canonicalize();
    Ok(next)
}

/// Rebuild the type-specific part of `kind` for a new question type.
///
/// Fields the new type does not own are dropped:
/// - multiple choice keeps two or more existing options (true/false counts
///   as having `true` and `false`), otherwise starts with two empty ones,
///   and keeps the answer only if it still names an option
/// - true/false gets its fixed options and an empty answer
/// - fill in the blank keeps the answer text
/// - word order keeps its words if it already had them and starts with an
///   empty sentence
pub fn retype(kind: &QuestionKind, to: QuestionType) -> QuestionKind {
    let answer = match kind {
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
    };

    match to {
        QuestionType::MultipleChoice => {
            let options = match kind {
                QuestionKind::MultipleChoice { options, .. } if options.len() >= MIN_OPTIONS => {
                    options.clone()
                }
                QuestionKind::TrueFalse { .. } => {
                    TRUE_FALSE_OPTIONS.iter().map(|s| s.to_string()).collect()
                }
                _ => vec![String::new(); MIN_OPTIONS],
            };
            QuestionKind::multiple_choice(options, &answer)
        }
        QuestionType::TrueFalse => QuestionKind::TrueFalse { answer: None },
        QuestionType::FillBlank => QuestionKind::FillBlank { answer },
        QuestionType::WordOrder => {
            let (words, input_mode) = match kind {
                QuestionKind::WordOrder {
                    words, input_mode, ..
                } => (words.clone(), *input_mode),
                _ => (Vec::new(), InputMode::default()),
            };
            QuestionKind::WordOrder {
                words,
                sentence: String::new(),
                input_mode,
            }
        }
    }
}

fn update_field(question: &mut Question, field: QuestionField) -> Result<(), Rejection> {
    match field {
        QuestionField::Prompt(prompt) => question.prompt = prompt,
        QuestionField::Explanation(explanation) => question.explanation = explanation,
        QuestionField::Type(to) => question.kind = retype(&question.kind, to),
        QuestionField::CorrectAnswer(value) => set_correct_answer(&mut question.kind, value)?,
        QuestionField::InputMode(mode) => match &mut question.kind {
            QuestionKind::WordOrder { input_mode, .. } => *input_mode = mode,
            other => return Err(wrong_type(QuestionType::WordOrder, other)),
        },
    }
    Ok(())
}

fn set_correct_answer(kind: &mut QuestionKind, value: String) -> Result<(), Rejection> {
    match kind {
        QuestionKind::MultipleChoice { options, correct } => {
            if value.is_empty() {
                *correct = None;
            } else {
                let index = options
                    .iter()
                    .position(|o| *o == value)
                    .ok_or_else(|| Rejection::InvalidAnswer(value.clone()))?;
                *correct = Some(index);
            }
        }
        QuestionKind::TrueFalse { answer } => {
            *answer = parse_true_false(&value).ok_or(Rejection::InvalidAnswer(value))?;
        }
        QuestionKind::FillBlank { answer } => *answer = value,
        QuestionKind::WordOrder { sentence, .. } => *sentence = value,
    }
    Ok(())
}

fn add_option(question: &mut Question) -> Result<(), Rejection> {
    match &mut question.kind {
        QuestionKind::MultipleChoice { options, .. } => {
            options.push(String::new());
            Ok(())
        }
        other => Err(wrong_type(QuestionType::MultipleChoice, other)),
    }
}

fn remove_option(question: &mut Question, option: usize) -> Result<(), Rejection> {
    let found = question.question_type();
    let QuestionKind::MultipleChoice { options, correct } = &mut question.kind else {
        return Err(Rejection::WrongQuestionType {
            expected: QuestionType::MultipleChoice,
            found,
        });
    };
    check(option, options.len(), "option")?;
    if options.len() <= MIN_OPTIONS {
        return Err(Rejection::MinimumOptions);
    }

    options.remove(option);
    *correct = match *correct {
        Some(c) if c == option => None,
        Some(c) if c > option => Some(c - 1),
        other => other,
    };
    Ok(())
}

fn update_option(question: &mut Question, option: usize, value: String) -> Result<(), Rejection> {
    let found = question.question_type();
    let QuestionKind::MultipleChoice { options, correct } = &mut question.kind else {
        return Err(Rejection::WrongQuestionType {
            expected: QuestionType::MultipleChoice,
            found,
        });
    };
    check(option, options.len(), "option")?;

    // An option renamed to nothing can no longer be named as the answer
    if value.is_empty() && *correct == Some(option) {
        *correct = None;
    }
    options[option] = value;
    Ok(())
}

fn words_mut(question: &mut Question) -> Result<&mut Vec<String>, Rejection> {
    match &mut question.kind {
        QuestionKind::WordOrder { words, .. } => Ok(words),
        other => Err(wrong_type(QuestionType::WordOrder, other)),
    }
}

fn question_mut(exercise: &mut ExerciseData, index: usize) -> Result<&mut Question, Rejection> {
    let len = exercise.questions.len();
    exercise
        .questions
        .get_mut(index)
        .ok_or(Rejection::out_of_range("question", index, len))
}

fn wrong_type(expected: QuestionType, found: &QuestionKind) -> Rejection {
    Rejection::WrongQuestionType {
        expected,
        found: found.question_type(),
    }
}
