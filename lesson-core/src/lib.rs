//! Lesson Core - Platform-agnostic content block editing for lesson pages
//!
//! This crate holds the block model (intro, image, table, video and
//! exercise blocks), the normalizer that makes stored block lists safe to
//! edit, the per-type mutators, and the sequence controller that owns a
//! page's block list and reports every change to its owner.

pub mod app;
pub mod echo;
pub mod error;
pub mod export;
pub mod model;
pub mod mutate;
pub mod normalize;
pub mod sequence;

pub use app::{App, InputTarget, Mode, SaveState};
pub use echo::{EchoGuard, Epoch, Incoming, Reception};
pub use error::Rejection;
pub use export::{
    blocks_from_json, blocks_to_json, generate_outline, page_from_json, to_json, PageSummary,
};
pub use model::{
    BlockData, BlockId, BlockType, ContentBlock, ExerciseData, ImageData, InputMode, IntroData,
    Page, Question, QuestionKind, QuestionType, RawBlock, TableData, UnknownData, YoutubeData,
};
pub use mutate::{
    BlockEdit, ExerciseEdit, ImageEdit, IntroEdit, QuestionField, TableEdit, YoutubeEdit,
};
pub use normalize::{normalize, renormalize};
pub use sequence::{move_item, ChangeSink, Emission, SequenceController};
