//! Page builder state shared by frontends.
//!
//! [`App`] owns the page, a [`SequenceController`] over its blocks, the
//! current selection and mode, and the text-input workflow. Saving is left
//! to the frontend; [`SaveState`] only records what still needs writing.

use crate::error::Rejection;
use crate::model::{
    BlockData, BlockId, BlockType, ContentBlock, InputMode, Page, Question, QuestionKind, QuestionType,
};
use crate::mutate::{
    self, BlockEdit, ExerciseEdit, ImageEdit, IntroEdit, QuestionField, TableEdit, YoutubeEdit,
};
use crate::sequence::{ChangeSink, Emission, SequenceController};

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    AddPicker,
    Input,
    Help,
}

/// Input target for text input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    /// Main field of the selected block: intro text, image url, video
    /// source, table or exercise title
    BlockText,
    /// Image caption or video title
    Caption,
    PageTitle,
    QuestionPrompt,
    /// Options of a multiple choice question, separated by `|`
    Options,
    /// Words of a word order question, separated by spaces
    Words,
    CorrectAnswer,
}

impl InputTarget {
    pub fn prompt(&self) -> &'static str {
        match self {
            InputTarget::BlockText => "Edit block",
            InputTarget::Caption => "Caption / title",
            InputTarget::PageTitle => "Page title",
            InputTarget::QuestionPrompt => "Question prompt",
            InputTarget::Options => "Options (separate with |)",
            InputTarget::Words => "Words (separate with spaces)",
            InputTarget::CorrectAnswer => "Correct answer",
        }
    }
}

/// Tracks what the page owner still has to persist.
///
/// Edits only mark the page dirty; deletions also request an immediate flush.
#[derive(Debug, Default)]
pub struct SaveState {
    pub dirty: bool,
    pub flush_requested: bool,
}

impl ChangeSink for SaveState {
    fn on_change(&mut self, _emission: &Emission<'_>) {
        self.dirty = true;
    }

    fn on_block_deleted(&mut self, _removed: &ContentBlock, _emission: &Emission<'_>) {
        self.flush_requested = true;
    }
}

/// Platform-agnostic page builder state
pub struct App {
    /// Page metadata; the live block list is owned by `controller`
    pub page: Page,
    pub controller: SequenceController<SaveState>,
    pub mode: Mode,
    pub running: bool,

    // Selection state
    pub selected: usize,
    pub question_selected: usize,

    // Input state
    pub input_buffer: String,
    pub input_target: InputTarget,

    // Picker state
    pub picker_selected: usize,

    /// Write the page as soon as a block is deleted
    pub flush_on_delete: bool,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    pub fn new(page: Page) -> Self {
        let mut app = Self {
            page: Page::new(String::new()),
            controller: SequenceController::new(SaveState::default()),
            mode: Mode::Normal,
            running: true,

            selected: 0,
            question_selected: 0,

            input_buffer: String::new(),
            input_target: InputTarget::BlockText,

            picker_selected: 0,

            flush_on_delete: true,

            status_message: None,
        };
        app.load_page(page);
        app
    }

    pub fn load_page(&mut self, mut page: Page) {
        let blocks = std::mem::take(&mut page.blocks);
        self.controller = SequenceController::from_blocks(blocks, SaveState::default());
        self.page = page;
        self.selected = 0;
        self.question_selected = 0;
    }

    /// The page as it should be saved; unsaved block edits bump `updated_at`
    pub fn page_snapshot(&self) -> Page {
        let mut page = self.page.clone();
        let blocks = self.controller.blocks().to_vec();
        if self.is_dirty() {
            page.set_blocks(blocks);
        } else {
            page.blocks = blocks;
        }
        page
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        self.controller.blocks()
    }

    pub fn is_dirty(&self) -> bool {
        self.controller.sink().dirty
    }

    pub fn mark_saved(&mut self) {
        let state = self.controller.sink_mut();
        state.dirty = false;
        state.flush_requested = false;
    }

    /// Whether a deletion asked for the page to be written right away.
    /// Clears the request.
    pub fn take_flush_request(&mut self) -> bool {
        let requested = std::mem::take(&mut self.controller.sink_mut().flush_requested);
        requested && self.flush_on_delete
    }

    pub fn selected_block(&self) -> Option<&ContentBlock> {
        self.blocks().get(self.selected)
    }

    fn selected_id(&self) -> Option<BlockId> {
        self.selected_block().map(|b| b.id().clone())
    }

    // Block navigation

    pub fn next_block(&mut self) {
        let count = self.blocks().len();
        if count > 0 {
            self.selected = (self.selected + 1) % count;
            self.question_selected = 0;
        }
    }

    pub fn prev_block(&mut self) {
        let count = self.blocks().len();
        if count > 0 {
            self.selected = if self.selected == 0 {
                count - 1
            } else {
                self.selected - 1
            };
            self.question_selected = 0;
        }
    }

    pub fn next_question(&mut self) {
        let count = self.selected_questions();
        if count > 0 {
            self.question_selected = (self.question_selected + 1) % count;
        }
    }

    pub fn prev_question(&mut self) {
        let count = self.selected_questions();
        if count > 0 {
            self.question_selected = if self.question_selected == 0 {
                count - 1
            } else {
                self.question_selected - 1
            };
        }
    }

    fn selected_questions(&self) -> usize {
        match self.selected_block().map(|b| &b.data) {
            Some(BlockData::Exercise(e)) => e.questions.len(),
            _ => 0,
        }
    }

    // Sequence operations

    pub fn add_block(&mut self, kind: BlockType) {
        self.controller.add(kind);
        self.selected = self.blocks().len() - 1;
        self.question_selected = 0;
        self.mode = Mode::Normal;
        self.set_status(&format!("{} block added", kind.label()));
    }

    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selected_id() else {
            return false;
        };
        let outcome = self.controller.delete(&id).map(|_| ());
        let deleted = self.report(outcome, "Block deleted");
        if deleted {
            let count = self.blocks().len();
            if self.selected >= count && count > 0 {
                self.selected = count - 1;
            }
            self.question_selected = 0;
        }
        deleted
    }

    pub fn move_selected_up(&mut self) -> bool {
        let Some(id) = self.selected_id() else {
            return false;
        };
        let outcome = self.controller.move_up(&id);
        self.follow(&id);
        self.report(outcome, "Moved up")
    }

    pub fn move_selected_down(&mut self) -> bool {
        let Some(id) = self.selected_id() else {
            return false;
        };
        let outcome = self.controller.move_down(&id);
        self.follow(&id);
        self.report(outcome, "Moved down")
    }

    fn follow(&mut self, id: &BlockId) {
        if let Some(pos) = self.controller.position(id) {
            self.selected = pos;
        }
    }

    /// Apply an edit to the selected block
    pub fn edit_selected(&mut self, edit: BlockEdit, done: &str) -> bool {
        let Some(id) = self.selected_id() else {
            self.set_status("No block selected");
            return false;
        };
        let outcome = self.controller.edit(&id, edit);
        self.report(outcome, done)
    }

    // Table shortcuts

    pub fn add_column(&mut self) -> bool {
        self.edit_selected(TableEdit::AddColumn.into(), "Column added")
    }

    pub fn remove_last_column(&mut self) -> bool {
        let last = match self.selected_block().map(|b| &b.data) {
            Some(BlockData::Table(t)) => t.column_count().saturating_sub(1),
            _ => 0,
        };
        self.edit_selected(TableEdit::RemoveColumn(last).into(), "Column removed")
    }

    pub fn add_row(&mut self) -> bool {
        self.edit_selected(TableEdit::AddRow.into(), "Row added")
    }

    pub fn remove_last_row(&mut self) -> bool {
        let last = match self.selected_block().map(|b| &b.data) {
            Some(BlockData::Table(t)) => t.row_count().saturating_sub(1),
            _ => 0,
        };
        self.edit_selected(TableEdit::RemoveRow(last).into(), "Row removed")
    }

    // Exercise shortcuts

    pub fn add_question(&mut self) -> bool {
        let added = self.edit_selected(ExerciseEdit::AddQuestion.into(), "Question added");
        if added {
            self.question_selected = self.selected_questions().saturating_sub(1);
        }
        added
    }

    pub fn remove_question(&mut self) -> bool {
        let removed = self.edit_selected(
            ExerciseEdit::RemoveQuestion(self.question_selected).into(),
            "Question removed",
        );
        if removed {
            self.question_selected = self
                .question_selected
                .min(self.selected_questions().saturating_sub(1));
        }
        removed
    }

    pub fn cycle_question_type(&mut self) -> bool {
        let Some(current) = self.current_question_type() else {
            self.set_status("No question selected");
            return false;
        };
        let next = current.next();
        self.edit_selected(
            ExerciseEdit::UpdateQuestion {
                index: self.question_selected,
                field: QuestionField::Type(next),
            }
            .into(),
            next.label(),
        )
    }

    pub fn toggle_input_mode(&mut self) -> bool {
        let mode = match self.current_question().map(|q| &q.kind) {
            Some(QuestionKind::WordOrder { input_mode, .. }) => match input_mode {
                InputMode::Drag => InputMode::Type,
                InputMode::Type => InputMode::Drag,
            },
            _ => InputMode::Drag,
        };
        self.edit_selected(
            ExerciseEdit::UpdateQuestion {
                index: self.question_selected,
                field: QuestionField::InputMode(mode),
            }
            .into(),
            &format!("Input mode: {}", mode.as_str()),
        )
    }

    pub fn toggle_allow_retry(&mut self) -> bool {
        let Some(BlockData::Exercise(e)) = self.selected_block().map(|b| &b.data) else {
            self.set_status("Not an exercise");
            return false;
        };
        let on = !e.allow_retry;
        self.edit_selected(
            ExerciseEdit::SetAllowRetry(on).into(),
            if on { "Retry allowed" } else { "Retry disabled" },
        )
    }

    pub fn toggle_show_results(&mut self) -> bool {
        let Some(BlockData::Exercise(e)) = self.selected_block().map(|b| &b.data) else {
            self.set_status("Not an exercise");
            return false;
        };
        let on = !e.show_results_immediately;
        self.edit_selected(
            ExerciseEdit::SetShowResultsImmediately(on).into(),
            if on {
                "Results shown immediately"
            } else {
                "Results shown at the end"
            },
        )
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.selected_block().map(|b| &b.data) {
            Some(BlockData::Exercise(e)) => e.questions.get(self.question_selected),
            _ => None,
        }
    }

    fn current_question_type(&self) -> Option<QuestionType> {
        self.current_question().map(|q| q.question_type())
    }

    // Input workflow

    /// Open the input dialog, prefilled with the current value
    pub fn begin_input(&mut self, target: InputTarget) {
        let prefill = match target {
            InputTarget::PageTitle => Some(self.page.title.clone()),
            InputTarget::BlockText => self.selected_block().and_then(|b| match &b.data {
                BlockData::Intro(d) => Some(d.text.clone()),
                BlockData::Image(d) => Some(d.url.clone()),
                BlockData::Youtube(d) => Some(d.video_id.clone()),
                BlockData::Table(d) => Some(d.title.clone()),
                BlockData::Exercise(d) => Some(d.title.clone()),
                BlockData::Unknown(_) => None,
            }),
            InputTarget::Caption => match self.selected_block().map(|b| &b.data) {
                Some(BlockData::Image(d)) => Some(d.caption.clone().unwrap_or_default()),
                Some(BlockData::Youtube(d)) => Some(d.title.clone().unwrap_or_default()),
                _ => None,
            },
            InputTarget::QuestionPrompt => self.current_question().map(|q| q.prompt.clone()),
            InputTarget::Options => match self.current_question().map(|q| &q.kind) {
                Some(QuestionKind::MultipleChoice { options, .. }) => Some(options.join(" | ")),
                _ => None,
            },
            InputTarget::Words => match self.current_question().map(|q| &q.kind) {
                Some(QuestionKind::WordOrder { words, .. }) => Some(words.join(" ")),
                _ => None,
            },
            InputTarget::CorrectAnswer => self.current_question().map(|q| q.correct_answer()),
        };

        match prefill {
            Some(value) => {
                self.input_buffer = value;
                self.input_target = target;
                self.mode = Mode::Input;
            }
            None => self.set_status("Nothing to edit here"),
        }
    }

    pub fn cancel_input(&mut self) {
        self.input_buffer.clear();
        self.mode = Mode::Normal;
    }

    /// Apply the input buffer to its target
    pub fn complete_input(&mut self) -> bool {
        let value = std::mem::take(&mut self.input_buffer);
        self.mode = Mode::Normal;

        if self.input_target == InputTarget::PageTitle {
            self.page.title = value.trim().to_string();
            self.page.touch();
            self.controller.sink_mut().dirty = true;
            self.set_status("Page title updated");
            return true;
        }

        let Some(block) = self.selected_block().cloned() else {
            self.set_status("No block selected");
            return false;
        };
        let question = self.question_selected;
        let edits: Vec<BlockEdit> = match (self.input_target, &block.data) {
            (InputTarget::BlockText, BlockData::Intro(_)) => vec![IntroEdit::SetText(value).into()],
            (InputTarget::BlockText, BlockData::Image(_)) => vec![ImageEdit::SetUrl(value).into()],
            (InputTarget::BlockText, BlockData::Youtube(_)) => {
                vec![YoutubeEdit::SetSource(value).into()]
            }
            (InputTarget::BlockText, BlockData::Table(_)) => vec![TableEdit::SetTitle(value).into()],
            (InputTarget::BlockText, BlockData::Exercise(_)) => {
                vec![ExerciseEdit::SetTitle(value).into()]
            }
            (InputTarget::Caption, BlockData::Image(_)) => {
                vec![ImageEdit::SetCaption(non_empty(value)).into()]
            }
            (InputTarget::Caption, BlockData::Youtube(_)) => {
                vec![YoutubeEdit::SetTitle(non_empty(value)).into()]
            }
            (InputTarget::QuestionPrompt, _) => vec![question_edit(question, QuestionField::Prompt(value))],
            (InputTarget::CorrectAnswer, _) => {
                vec![question_edit(question, QuestionField::CorrectAnswer(value.trim().to_string()))]
            }
            (InputTarget::Options, BlockData::Exercise(e)) => {
                let current = e.questions.get(question).map(|q| q.options().len()).unwrap_or(0);
                list_edits(question, current, split_options(&value), ListKind::Options)
            }
            (InputTarget::Words, BlockData::Exercise(e)) => {
                let current = match e.questions.get(question).map(|q| &q.kind) {
                    Some(QuestionKind::WordOrder { words, .. }) => words.len(),
                    _ => 0,
                };
                let words = value.split_whitespace().map(str::to_string).collect();
                list_edits(question, current, words, ListKind::Words)
            }
            _ => {
                self.set_status("Nothing to edit here");
                return false;
            }
        };

        // Fold the edits locally so a multi-step change is emitted once
        let outcome = edits
            .into_iter()
            .try_fold(block, |block, edit| mutate::apply(&block, edit))
            .and_then(|next| self.controller.update(next));
        self.report(outcome, "Updated")
    }

    /// Turn an operation outcome into a status line
    fn report(&mut self, outcome: Result<(), Rejection>, done: &str) -> bool {
        match outcome {
            Ok(()) => {
                self.set_status(done);
                true
            }
            Err(rejection) => {
                log::debug!("edit rejected: {}", rejection);
                self.set_status(&format!("Not applied: {}", rejection));
                false
            }
        }
    }

    /// Set status message
    pub fn set_status(&mut self, msg: &str) {
        self.status_message = Some(msg.to_string());
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Get title for display
    pub fn title(&self) -> String {
        if self.page.title.is_empty() {
            "Untitled".to_string()
        } else {
            self.page.title.clone()
        }
    }
}

#[derive(Clone, Copy)]
enum ListKind {
    Options,
    Words,
}

fn question_edit(index: usize, field: QuestionField) -> BlockEdit {
    ExerciseEdit::UpdateQuestion { index, field }.into()
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn split_options(value: &str) -> Vec<String> {
    value.split('|').map(|s| s.trim().to_string()).collect()
}

/// Edits that turn a list of `current` entries into `target`
fn list_edits(question: usize, current: usize, target: Vec<String>, kind: ListKind) -> Vec<BlockEdit> {
    let mut edits = Vec::new();
    for i in (target.len()..current).rev() {
        edits.push(match kind {
            ListKind::Options => ExerciseEdit::RemoveOption { question, option: i },
            ListKind::Words => ExerciseEdit::RemoveWord { question, word: i },
        });
    }
    for (i, value) in target.into_iter().enumerate() {
        if i >= current {
            edits.push(match kind {
                ListKind::Options => ExerciseEdit::AddOption { question },
                ListKind::Words => ExerciseEdit::AddWord { question },
            });
        }
        edits.push(match kind {
            ListKind::Options => ExerciseEdit::UpdateOption {
                question,
                option: i,
                value,
            },
            ListKind::Words => ExerciseEdit::UpdateWord {
                question,
                word: i,
                value,
            },
        });
    }
    edits.into_iter().map(BlockEdit::from).collect()
}

impl Default for App {
    fn default() -> Self {
        Self::new(Page::new(String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawBlock;
    use serde_json::json;

    fn app_with(blocks: Vec<RawBlock>) -> App {
        App::new(Page::from_blocks("Test".into(), blocks))
    }

    fn type_input(app: &mut App, target: InputTarget, text: &str) -> bool {
        app.begin_input(target);
        app.input_buffer = text.to_string();
        app.complete_input()
    }

    #[test]
    fn test_add_selects_new_block() {
        let mut app = App::default();
        app.add_block(BlockType::Intro);
        app.add_block(BlockType::Table);
        assert_eq!(app.selected, 1);
        assert!(app.is_dirty());
        assert!(!app.take_flush_request());
    }

    #[test]
    fn test_delete_requests_flush() {
        let mut app = app_with(vec![
            RawBlock::with_id("a", "intro", json!({})),
            RawBlock::with_id("b", "intro", json!({})),
        ]);
        app.selected = 1;
        assert!(app.delete_selected());
        assert_eq!(app.selected, 0);
        assert!(app.take_flush_request());
        assert!(!app.take_flush_request());
    }

    #[test]
    fn test_flush_on_delete_can_be_disabled() {
        let mut app = app_with(vec![RawBlock::with_id("a", "intro", json!({}))]);
        app.flush_on_delete = false;
        app.delete_selected();
        assert!(!app.take_flush_request());
        assert!(app.is_dirty());
    }

    #[test]
    fn test_selection_follows_moved_block() {
        let mut app = app_with(vec![
            RawBlock::with_id("a", "intro", json!({})),
            RawBlock::with_id("b", "intro", json!({})),
        ]);
        assert!(app.move_selected_down());
        assert_eq!(app.selected, 1);
        assert_eq!(app.selected_block().unwrap().id().as_str(), "a");
        assert!(!app.move_selected_down());
        assert!(app.status_message.as_deref().unwrap().starts_with("Not applied"));
    }

    #[test]
    fn test_rejection_reported_in_status() {
        let mut app = App::default();
        app.add_block(BlockType::Table);
        assert!(!app.remove_last_column());
        assert_eq!(
            app.status_message.as_deref(),
            Some("Not applied: a table needs at least one column")
        );
    }

    #[test]
    fn test_youtube_input_extracts_id() {
        let mut app = App::default();
        app.add_block(BlockType::Youtube);
        assert!(type_input(
            &mut app,
            InputTarget::BlockText,
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        ));
        match &app.selected_block().unwrap().data {
            BlockData::Youtube(d) => assert_eq!(d.video_id, "dQw4w9WgXcQ"),
            other => panic!("unexpected payload {other:?}"),
        }
        assert!(!type_input(&mut app, InputTarget::BlockText, "not a video"));
    }

    #[test]
    fn test_options_input_rewrites_list() {
        let mut app = App::default();
        app.add_block(BlockType::Exercise);
        app.add_question();
        assert!(type_input(&mut app, InputTarget::Options, "red | green | blue"));
        assert!(type_input(&mut app, InputTarget::CorrectAnswer, "green"));
        assert!(type_input(&mut app, InputTarget::Options, "red | lime"));

        let q = app.current_question().unwrap();
        assert_eq!(q.options(), vec!["red", "lime"]);
        assert_eq!(q.correct_answer(), "lime");
    }

    #[test]
    fn test_options_input_needs_two() {
        let mut app = App::default();
        app.add_block(BlockType::Exercise);
        app.add_question();
        assert!(type_input(&mut app, InputTarget::Options, "a | b | c"));
        assert!(!type_input(&mut app, InputTarget::Options, "only"));
        assert_eq!(app.current_question().unwrap().options(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_words_input_for_word_order() {
        let mut app = App::default();
        app.add_block(BlockType::Exercise);
        app.add_question();
        while app.current_question().unwrap().question_type() != QuestionType::WordOrder {
            app.cycle_question_type();
        }
        assert!(type_input(&mut app, InputTarget::Words, "the cat sat"));
        assert!(type_input(&mut app, InputTarget::Words, "a dog"));
        match &app.current_question().unwrap().kind {
            QuestionKind::WordOrder { words, .. } => assert_eq!(words, &vec!["a", "dog"]),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_page_title_input() {
        let mut app = App::default();
        assert!(type_input(&mut app, InputTarget::PageTitle, "  Fractions "));
        assert_eq!(app.title(), "Fractions");
        assert!(app.is_dirty());
    }

    #[test]
    fn test_snapshot_carries_blocks() {
        let mut app = App::default();
        app.add_block(BlockType::Intro);
        let page = app.page_snapshot();
        assert_eq!(page.block_count(), 1);
        app.mark_saved();
        assert!(!app.is_dirty());
    }

    #[test]
    fn test_snapshot_bumps_updated_at_after_edit() {
        let mut page = Page::from_blocks("Test".into(), Vec::new());
        let stale = page.updated_at - chrono::Duration::days(1);
        page.updated_at = stale;
        let mut app = App::new(page);

        assert_eq!(app.page_snapshot().updated_at, stale);

        app.add_block(BlockType::Intro);
        let saved = app.page_snapshot();
        assert!(saved.updated_at > stale);
        assert_eq!(saved.created_at, app.page_snapshot().created_at);
    }
}
