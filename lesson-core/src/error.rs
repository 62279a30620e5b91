use thiserror::Error;

use crate::model::{BlockId, BlockType, QuestionType};

/// Why an edit was not applied.
///
/// Every guarded operation in the model returns one of these instead of
/// changing state, so callers can tell "ignored" apart from "applied".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("no block with id {0}")]
    UnknownBlock(BlockId),

    #[error("block is already at the drop position")]
    SamePosition,

    #[error("block is already at the edge of the page")]
    AtBoundary,

    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("a table needs at least one column")]
    MinimumColumns,

    #[error("a multiple choice question needs at least two options")]
    MinimumOptions,

    #[error("edit needs a {expected} question, found {found}")]
    WrongQuestionType {
        expected: QuestionType,
        found: QuestionType,
    },

    #[error("edit targets a {edit} block, found {block}")]
    EditKindMismatch { block: BlockType, edit: BlockType },

    #[error("\"{0}\" is not a valid answer for this question")]
    InvalidAnswer(String),

    #[error("could not find a video id in \"{0}\"")]
    InvalidVideoSource(String),
}

impl Rejection {
    pub(crate) fn out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        Rejection::IndexOutOfRange { what, index, len }
    }
}
