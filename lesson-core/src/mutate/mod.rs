//! Pure, type-specific block edits.
//!
//! Every mutator takes the current payload by reference and returns a new
//! payload, or a [`Rejection`] when a guard refuses the edit. Nothing here
//! touches the block list; the sequence controller swaps results in.

pub mod exercise;
pub mod media;
pub mod table;

pub use exercise::{ExerciseEdit, QuestionField};
pub use media::{extract_video_id, ImageEdit, IntroEdit, YoutubeEdit};
pub use table::TableEdit;

use crate::error::Rejection;
use crate::model::{BlockData, BlockType, ContentBlock};

/// An edit addressed to one block, tagged with the block type it expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockEdit {
    Intro(IntroEdit),
    Image(ImageEdit),
    Table(TableEdit),
    Youtube(YoutubeEdit),
    Exercise(ExerciseEdit),
}

impl BlockEdit {
    pub fn target(&self) -> BlockType {
        match self {
            BlockEdit::Intro(_) => BlockType::Intro,
            BlockEdit::Image(_) => BlockType::Image,
            BlockEdit::Table(_) => BlockType::Table,
            BlockEdit::Youtube(_) => BlockType::Youtube,
            BlockEdit::Exercise(_) => BlockType::Exercise,
        }
    }
}

impl From<TableEdit> for BlockEdit {
    fn from(edit: TableEdit) -> Self {
        BlockEdit::Table(edit)
    }
}

impl From<ExerciseEdit> for BlockEdit {
    fn from(edit: ExerciseEdit) -> Self {
        BlockEdit::Exercise(edit)
    }
}

impl From<IntroEdit> for BlockEdit {
    fn from(edit: IntroEdit) -> Self {
        BlockEdit::Intro(edit)
    }
}

impl From<ImageEdit> for BlockEdit {
    fn from(edit: ImageEdit) -> Self {
        BlockEdit::Image(edit)
    }
}

impl From<YoutubeEdit> for BlockEdit {
    fn from(edit: YoutubeEdit) -> Self {
        BlockEdit::Youtube(edit)
    }
}

/// Apply `edit` to `block`, producing the replacement block (same id).
pub fn apply(block: &ContentBlock, edit: BlockEdit) -> Result<ContentBlock, Rejection> {
    let data = match (&block.data, edit) {
        (BlockData::Intro(d), BlockEdit::Intro(e)) => BlockData::Intro(media::apply_intro(d, e)?),
        (BlockData::Image(d), BlockEdit::Image(e)) => BlockData::Image(media::apply_image(d, e)?),
        (BlockData::Table(d), BlockEdit::Table(e)) => BlockData::Table(table::apply(d, e)?),
        (BlockData::Youtube(d), BlockEdit::Youtube(e)) => {
            BlockData::Youtube(media::apply_youtube(d, e)?)
        }
        (BlockData::Exercise(d), BlockEdit::Exercise(e)) => {
            BlockData::Exercise(exercise::apply(d, e)?)
        }
        (data, edit) => {
            return Err(Rejection::EditKindMismatch {
                block: data.block_type(),
                edit: edit.target(),
            })
        }
    };
    Ok(block.with_data(data))
}

pub(crate) fn check(index: usize, len: usize, what: &'static str) -> Result<(), Rejection> {
    if index < len {
        Ok(())
    } else {
        Err(Rejection::out_of_range(what, index, len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockId, TableData, UnknownData};

    #[test]
    fn test_edit_keeps_block_id() {
        let block = ContentBlock::new(BlockType::Table);
        let next = apply(&block, TableEdit::AddColumn.into()).unwrap();
        assert_eq!(next.id(), block.id());
        match &next.data {
            BlockData::Table(TableData { headers, .. }) => assert_eq!(headers.len(), 2),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_edit_for_other_type_is_rejected() {
        let block = ContentBlock::with_id(
            BlockId::parse("i").unwrap(),
            BlockData::default_for(BlockType::Intro),
        );
        assert_eq!(
            apply(&block, TableEdit::AddRow.into()),
            Err(Rejection::EditKindMismatch {
                block: BlockType::Intro,
                edit: BlockType::Table,
            })
        );
    }

    #[test]
    fn test_unknown_block_takes_no_edit() {
        let block = ContentBlock::with_id(
            BlockId::parse("a").unwrap(),
            BlockData::Unknown(UnknownData {
                kind: "audio".into(),
                data: serde_json::json!({"src": "s.mp3"}),
            }),
        );
        for edit in [
            BlockEdit::from(IntroEdit::SetText("x".into())),
            TableEdit::AddRow.into(),
        ] {
            let target = edit.target();
            assert_eq!(
                apply(&block, edit),
                Err(Rejection::EditKindMismatch {
                    block: BlockType::Unknown,
                    edit: target,
                })
            );
        }
    }

    #[test]
    fn test_intro_text() {
        let block = ContentBlock::new(BlockType::Intro);
        let next = apply(&block, IntroEdit::SetText("Welcome".into()).into()).unwrap();
        assert_eq!(next.data.summary(), "Welcome");
    }
}
