//! The ordered block list of a page and the operations over it.
//!
//! [`SequenceController`] exclusively owns the list. Every successful
//! mutation re-normalizes the list and emits it in full to a [`ChangeSink`];
//! deletions additionally fire a separate notification so the owner can
//! persist them right away.

use crate::echo::{EchoGuard, Epoch, Incoming, Reception};
use crate::error::Rejection;
use crate::model::{BlockId, BlockType, ContentBlock, RawBlock};
use crate::mutate::{self, BlockEdit};
use crate::normalize;

/// One emitted state of the block list
#[derive(Debug, Clone, Copy)]
pub struct Emission<'a> {
    pub epoch: Epoch,
    pub blocks: &'a [ContentBlock],
}

/// Receives the controller's output
pub trait ChangeSink {
    /// Called after every applied mutation with the full list
    fn on_change(&mut self, emission: &Emission<'_>);

    /// Called after `on_change` when the mutation was a deletion
    fn on_block_deleted(&mut self, _removed: &ContentBlock, _emission: &Emission<'_>) {}
}

/// Discards everything
impl ChangeSink for () {
    fn on_change(&mut self, _emission: &Emission<'_>) {}
}

/// Move the item at `from` to position `to`, shifting the items in between.
///
/// Same semantics as removing at `from` and inserting at `to`. Returns
/// `false`, leaving `items` untouched, when either index is out of range.
pub fn move_item<T>(items: &mut [T], from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from < to {
        items[from..=to].rotate_left(1);
    } else if to < from {
        items[to..=from].rotate_right(1);
    }
    true
}

pub struct SequenceController<S> {
    blocks: Vec<ContentBlock>,
    guard: EchoGuard,
    sink: S,
}

impl<S: ChangeSink> SequenceController<S> {
    pub fn new(sink: S) -> Self {
        Self {
            blocks: Vec::new(),
            guard: EchoGuard::new(),
            sink,
        }
    }

    /// Start from stored blocks. Nothing is emitted.
    pub fn with_blocks(raw: Vec<RawBlock>, sink: S) -> Self {
        let mut controller = Self::new(sink);
        controller.blocks = normalize::normalize(raw);
        controller
    }

    /// Start from blocks that are already typed, e.g. a loaded page
    pub fn from_blocks(mut blocks: Vec<ContentBlock>, sink: S) -> Self {
        normalize::renormalize(&mut blocks);
        let mut controller = Self::new(sink);
        controller.blocks = blocks;
        controller
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: &BlockId) -> Option<&ContentBlock> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    pub fn position(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id() == id)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn guard(&self) -> &EchoGuard {
        &self.guard
    }

    /// Append a block of `kind` with its default payload
    pub fn add(&mut self, kind: BlockType) -> BlockId {
        let block = ContentBlock::new(kind);
        let id = block.id().clone();
        log::debug!("add {} block {}", kind, id);
        self.blocks.push(block);
        self.emit();
        id
    }

    /// Replace the block with the same id, keeping its position
    pub fn update(&mut self, mut block: ContentBlock) -> Result<(), Rejection> {
        let index = self.index_of(block.id())?;
        block.data.canonicalize();
        log::debug!("update block {}", block.id());
        self.blocks[index] = block;
        self.emit();
        Ok(())
    }

    /// Run a typed edit through the block's mutator and swap the result in
    pub fn edit(&mut self, id: &BlockId, edit: BlockEdit) -> Result<(), Rejection> {
        let index = self.index_of(id)?;
        let next = mutate::apply(&self.blocks[index], edit)?;
        log::debug!("edit {} block {}", next.block_type(), id);
        self.blocks[index] = next;
        self.emit();
        Ok(())
    }

    pub fn delete(&mut self, id: &BlockId) -> Result<ContentBlock, Rejection> {
        let index = self.index_of(id)?;
        let removed = self.blocks.remove(index);
        log::debug!("delete {} block {}", removed.block_type(), id);
        let epoch = self.emit();
        self.sink.on_block_deleted(
            &removed,
            &Emission {
                epoch,
                blocks: &self.blocks,
            },
        );
        Ok(removed)
    }

    /// Move the block `from` to the position currently held by `to`.
    ///
    /// Only permutes; no block is created, dropped or changed.
    pub fn reorder(&mut self, from: &BlockId, to: &BlockId) -> Result<(), Rejection> {
        if from == to {
            return Err(Rejection::SamePosition);
        }
        let from_index = self.index_of(from)?;
        let to_index = self.index_of(to)?;
        if !move_item(&mut self.blocks, from_index, to_index) {
            let len = self.blocks.len();
            return Err(Rejection::out_of_range("block", from_index.max(to_index), len));
        }
        log::debug!("move block {} from {} to {}", from, from_index, to_index);
        self.emit();
        Ok(())
    }

    pub fn move_up(&mut self, id: &BlockId) -> Result<(), Rejection> {
        let index = self.index_of(id)?;
        if index == 0 {
            return Err(Rejection::AtBoundary);
        }
        let target = self.blocks[index - 1].id().clone();
        self.reorder(id, &target)
    }

    pub fn move_down(&mut self, id: &BlockId) -> Result<(), Rejection> {
        let index = self.index_of(id)?;
        if index + 1 >= self.blocks.len() {
            return Err(Rejection::AtBoundary);
        }
        let target = self.blocks[index + 1].id().clone();
        self.reorder(id, &target)
    }

    /// Take a block list pushed in from outside.
    ///
    /// Reflections of our own emissions are absorbed; anything else replaces
    /// the list after normalization. Neither case emits.
    pub fn receive(&mut self, incoming: Incoming) -> Reception {
        if self.guard.is_echo(incoming.echo_of) {
            log::trace!("absorbed echo of {:?}", incoming.echo_of);
            return Reception::Absorbed;
        }
        self.blocks = normalize::normalize(incoming.blocks);
        log::debug!("replaced block list from outside ({} blocks)", self.blocks.len());
        Reception::Replaced
    }

    fn index_of(&self, id: &BlockId) -> Result<usize, Rejection> {
        self.position(id)
            .ok_or_else(|| Rejection::UnknownBlock(id.clone()))
    }

    fn emit(&mut self) -> Epoch {
        normalize::renormalize(&mut self.blocks);
        let epoch = self.guard.arm();
        self.sink.on_change(&Emission {
            epoch,
            blocks: &self.blocks,
        });
        epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockData, TableData};
    use crate::mutate::TableEdit;
    use proptest::prelude::*;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        changes: Vec<(Epoch, Vec<String>)>,
        deleted: Vec<String>,
    }

    impl ChangeSink for Recorder {
        fn on_change(&mut self, emission: &Emission<'_>) {
            let ids = emission
                .blocks
                .iter()
                .map(|b| b.id().to_string())
                .collect();
            self.changes.push((emission.epoch, ids));
        }

        fn on_block_deleted(&mut self, removed: &ContentBlock, _emission: &Emission<'_>) {
            self.deleted.push(removed.id().to_string());
        }
    }

    fn id(s: &str) -> BlockId {
        BlockId::parse(s).unwrap()
    }

    fn controller(ids: &[&str]) -> SequenceController<Recorder> {
        let raw = ids
            .iter()
            .map(|i| RawBlock::with_id(i, "intro", json!({"text": i})))
            .collect();
        SequenceController::with_blocks(raw, Recorder::default())
    }

    fn order(c: &SequenceController<Recorder>) -> Vec<&str> {
        c.blocks().iter().map(|b| b.id().as_str()).collect()
    }

    #[test]
    fn test_add_table_to_empty_page() {
        let mut c = SequenceController::new(Recorder::default());
        let new_id = c.add(BlockType::Table);

        assert_eq!(c.len(), 1);
        assert_eq!(c.blocks()[0].id(), &new_id);
        assert_eq!(
            c.blocks()[0].data,
            BlockData::Table(TableData {
                title: String::new(),
                headers: vec![String::new()],
                rows: Vec::new(),
            })
        );
        assert_eq!(c.sink().changes.len(), 1);
    }

    #[test]
    fn test_reorder_last_to_first() {
        let mut c = controller(&["b1", "b2", "b3"]);
        c.reorder(&id("b3"), &id("b1")).unwrap();
        assert_eq!(order(&c), vec!["b3", "b1", "b2"]);
    }

    #[test]
    fn test_reorder_first_to_last() {
        let mut c = controller(&["b1", "b2", "b3"]);
        c.reorder(&id("b1"), &id("b3")).unwrap();
        assert_eq!(order(&c), vec!["b2", "b3", "b1"]);
    }

    #[test]
    fn test_reorder_onto_self_is_rejected() {
        let mut c = controller(&["b1", "b2"]);
        assert_eq!(c.reorder(&id("b1"), &id("b1")), Err(Rejection::SamePosition));
        assert!(c.sink().changes.is_empty());
    }

    #[test]
    fn test_reorder_outside_sequence_is_rejected() {
        let mut c = controller(&["b1", "b2"]);
        assert_eq!(
            c.reorder(&id("b1"), &id("nowhere")),
            Err(Rejection::UnknownBlock(id("nowhere")))
        );
        assert_eq!(order(&c), vec!["b1", "b2"]);
    }

    #[test]
    fn test_move_up_and_down() {
        let mut c = controller(&["b1", "b2", "b3"]);
        c.move_down(&id("b1")).unwrap();
        assert_eq!(order(&c), vec!["b2", "b1", "b3"]);
        c.move_up(&id("b3")).unwrap();
        assert_eq!(order(&c), vec!["b2", "b3", "b1"]);
        assert_eq!(c.move_up(&id("b2")), Err(Rejection::AtBoundary));
        assert_eq!(c.move_down(&id("b1")), Err(Rejection::AtBoundary));
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut c = controller(&["b1", "b2"]);
        let replacement = ContentBlock::with_id(id("b2"), BlockData::default_for(BlockType::Image));
        c.update(replacement).unwrap();
        assert_eq!(order(&c), vec!["b1", "b2"]);
        assert_eq!(c.blocks()[1].block_type(), BlockType::Image);
    }

    #[test]
    fn test_update_unknown_id_changes_nothing() {
        let mut c = controller(&["b1"]);
        let stranger = ContentBlock::with_id(id("zz"), BlockData::default_for(BlockType::Intro));
        assert_eq!(c.update(stranger), Err(Rejection::UnknownBlock(id("zz"))));
        assert_eq!(order(&c), vec!["b1"]);
        assert!(c.sink().changes.is_empty());
    }

    #[test]
    fn test_update_repairs_payload() {
        let mut c = controller(&["b1"]);
        let ragged = ContentBlock::with_id(
            id("b1"),
            BlockData::Table(TableData {
                title: String::new(),
                headers: vec!["A".into(), "B".into()],
                rows: vec![vec!["1".into()]],
            }),
        );
        c.update(ragged).unwrap();
        match &c.blocks()[0].data {
            BlockData::Table(t) => assert_eq!(t.rows[0].len(), 2),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_edit_routes_to_mutator() {
        let mut c = SequenceController::new(Recorder::default());
        let table = c.add(BlockType::Table);
        c.edit(&table, TableEdit::AddColumn.into()).unwrap();
        assert_eq!(c.edit(&table, TableEdit::RemoveColumn(0).into()), Ok(()));
        assert_eq!(
            c.edit(&table, TableEdit::RemoveColumn(0).into()),
            Err(Rejection::MinimumColumns)
        );
        assert_eq!(c.sink().changes.len(), 3);
    }

    #[test]
    fn test_delete_fires_both_notifications() {
        let mut c = controller(&["b1", "b2"]);
        let removed = c.delete(&id("b1")).unwrap();
        assert_eq!(removed.id().as_str(), "b1");
        assert_eq!(order(&c), vec!["b2"]);
        assert_eq!(c.sink().changes.len(), 1);
        assert_eq!(c.sink().changes[0].1, vec!["b2".to_string()]);
        assert_eq!(c.sink().deleted, vec!["b1".to_string()]);
    }

    #[test]
    fn test_delete_unknown_is_rejected() {
        let mut c = controller(&["b1"]);
        assert!(c.delete(&id("b9")).is_err());
        assert!(c.sink().deleted.is_empty());
    }

    #[test]
    fn test_emissions_carry_increasing_epochs() {
        let mut c = SequenceController::new(Recorder::default());
        c.add(BlockType::Intro);
        c.add(BlockType::Image);
        let epochs: Vec<u64> = c.sink().changes.iter().map(|(e, _)| e.value()).collect();
        assert_eq!(epochs, vec![1, 2]);
    }

    #[test]
    fn test_echo_is_absorbed() {
        let mut c = SequenceController::new(Recorder::default());
        c.add(BlockType::Intro);
        let epoch = c.sink().changes[0].0;
        let echoed = serde_json::to_value(c.blocks()).unwrap();
        let raw: Vec<RawBlock> = serde_json::from_value(echoed).unwrap();

        // the owner lost the block in between; an echo must not clobber state
        assert_eq!(c.receive(Incoming::echo(epoch, Vec::new())), Reception::Absorbed);
        assert_eq!(c.len(), 1);

        assert_eq!(c.receive(Incoming::external(raw)), Reception::Replaced);
        assert_eq!(c.len(), 1);
        assert_eq!(c.sink().changes.len(), 1);
    }

    #[test]
    fn test_external_update_is_normalized() {
        let mut c = controller(&["b1"]);
        let reception = c.receive(Incoming::external(vec![
            RawBlock::new("paragraph", json!({"text": "x"})),
            RawBlock::with_id("t", "table", json!({})),
        ]));
        assert_eq!(reception, Reception::Replaced);
        assert_eq!(c.len(), 2);
        assert_eq!(c.blocks()[0].block_type(), BlockType::Intro);
        assert!(!c.blocks()[0].id().as_str().is_empty());
    }

    #[test]
    fn test_move_item() {
        let mut items = vec![1, 2, 3, 4];
        assert!(move_item(&mut items, 0, 2));
        assert_eq!(items, vec![2, 3, 1, 4]);
        assert!(move_item(&mut items, 3, 0));
        assert_eq!(items, vec![4, 2, 3, 1]);
        assert!(move_item(&mut items, 1, 1));
        assert_eq!(items, vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_move_item_out_of_range() {
        let mut items = vec![1, 2, 3];
        assert!(!move_item(&mut items, 3, 0));
        assert!(!move_item(&mut items, 0, 7));
        assert_eq!(items, vec![1, 2, 3]);

        let mut empty: Vec<i32> = Vec::new();
        assert!(!move_item(&mut empty, 0, 0));
    }

    proptest! {
        #[test]
        fn prop_reorder_conserves_ids(
            len in 1usize..8,
            moves in prop::collection::vec((0usize..8, 0usize..8), 0..20),
        ) {
            let names: Vec<String> = (0..len).map(|i| format!("b{i}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let mut c = controller(&refs);

            for (from, to) in moves {
                let from = id(&format!("b{}", from % len));
                let to = id(&format!("b{}", to % len));
                let before: Vec<ContentBlock> = c.blocks().to_vec();
                let _ = c.reorder(&from, &to);

                let mut now: Vec<&str> = order(&c);
                let mut was: Vec<&str> = before.iter().map(|b| b.id().as_str()).collect();
                now.sort_unstable();
                was.sort_unstable();
                prop_assert_eq!(now, was);
                for block in c.blocks() {
                    let old = before.iter().find(|b| b.id() == block.id()).unwrap();
                    prop_assert_eq!(&old.data, &block.data);
                }
            }
        }

        #[test]
        fn prop_tables_stay_rectangular(
            edits in prop::collection::vec(0u8..6, 0..40),
        ) {
            let mut c = SequenceController::new(());
            let table = c.add(BlockType::Table);
            for (step, edit) in edits.into_iter().enumerate() {
                let edit = match edit {
                    0 => TableEdit::AddColumn,
                    1 => TableEdit::RemoveColumn(step % 3),
                    2 => TableEdit::AddRow,
                    3 => TableEdit::RemoveRow(step % 3),
                    4 => TableEdit::UpdateCell { row: step % 2, col: step % 3, value: "v".into() },
                    _ => TableEdit::UpdateHeader { col: step % 3, value: "h".into() },
                };
                let _ = c.edit(&table, edit.into());
                match &c.blocks()[0].data {
                    BlockData::Table(t) => {
                        prop_assert!(!t.headers.is_empty());
                        for row in &t.rows {
                            prop_assert_eq!(row.len(), t.headers.len());
                        }
                    }
                    other => prop_assert!(false, "unexpected payload {:?}", other),
                }
            }
        }
    }
}
