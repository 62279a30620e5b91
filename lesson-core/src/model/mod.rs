pub mod block;
pub(crate) mod lenient;
pub mod page;
pub mod question;

pub use block::{
    BlockData, BlockId, BlockType, ContentBlock, ExerciseData, ImageData, IntroData, RawBlock,
    TableData, UnknownData, YoutubeData,
};
pub use page::Page;
pub use question::{InputMode, Question, QuestionKind, QuestionType, MIN_OPTIONS, TRUE_FALSE_OPTIONS};
