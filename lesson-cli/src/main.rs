//! Lesson CLI - Terminal page builder for lesson content blocks

mod config;
mod io;
mod ui;

use std::io::stdout;
use std::path::Path;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use lesson_core::{generate_outline, App, BlockType, InputTarget, Mode};

use config::Config;

fn main() -> Result<()> {
    // Get page name or path from args
    let args: Vec<String> = std::env::args().collect();

    let lesson_dir = io::lesson_dir()?;
    let config = Config::load(&lesson_dir.join("config.ron"))?;
    init_logging(&lesson_dir, &config)?;

    let page_path = io::resolve_page_path(args.get(1).map(String::as_str), &config.pages_dir(&lesson_dir));
    let page = io::load_page(&page_path)?;

    let mut app = App::new(page);
    app.flush_on_delete = config.flush_on_delete;
    app.set_status(&format!("Editing {}", page_path.display()));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app, &page_path);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = res {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
    }

    // Anything not yet written goes out on quit
    if app.is_dirty() {
        io::save_page(&app.page_snapshot(), &page_path)?;
    }

    Ok(())
}

/// Log to ~/.lesson/lesson.log; the terminal belongs to the UI
fn init_logging(lesson_dir: &Path, config: &Config) -> Result<()> {
    let file = io::open_log(lesson_dir)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, path: &Path) -> Result<()> {
    while app.running {
        terminal.draw(|f| ui::draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            // Clear status on any key
            app.clear_status();

            match app.mode {
                Mode::Normal => handle_normal_mode(app, key.code, path),
                Mode::AddPicker => handle_add_picker(app, key.code),
                Mode::Input => handle_input_mode(app, key.code),
                Mode::Help => {
                    app.mode = Mode::Normal;
                }
            }

            if app.take_flush_request() {
                save(app, path);
            }
        }
    }
    Ok(())
}

fn save(app: &mut App, path: &Path) {
    match io::save_page(&app.page_snapshot(), path) {
        Ok(()) => {
            app.mark_saved();
            app.set_status(&format!("Saved {}", path.display()));
        }
        Err(e) => {
            log::error!("save failed: {:#}", e);
            app.set_status(&format!("Save failed: {}", e));
        }
    }
}

fn handle_normal_mode(app: &mut App, code: KeyCode, path: &Path) {
    match code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('?') => app.mode = Mode::Help,

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => app.next_block(),
        KeyCode::Char('k') | KeyCode::Up => app.prev_block(),
        KeyCode::Char(']') => app.next_question(),
        KeyCode::Char('[') => app.prev_question(),

        // Sequence
        KeyCode::Char('J') => {
            app.move_selected_down();
        }
        KeyCode::Char('K') => {
            app.move_selected_up();
        }
        KeyCode::Char('a') => {
            app.picker_selected = 0;
            app.mode = Mode::AddPicker;
        }
        KeyCode::Char('d') => {
            app.delete_selected();
        }

        // Text fields
        KeyCode::Char('e') => app.begin_input(InputTarget::BlockText),
        KeyCode::Char('c') => app.begin_input(InputTarget::Caption),
        KeyCode::Char('T') => app.begin_input(InputTarget::PageTitle),
        KeyCode::Char('p') => app.begin_input(InputTarget::QuestionPrompt),
        KeyCode::Char('o') => app.begin_input(InputTarget::Options),
        KeyCode::Char('w') => app.begin_input(InputTarget::Words),
        KeyCode::Char('A') => app.begin_input(InputTarget::CorrectAnswer),

        // Table
        KeyCode::Char('>') => {
            app.add_column();
        }
        KeyCode::Char('<') => {
            app.remove_last_column();
        }
        KeyCode::Char('+') => {
            app.add_row();
        }
        KeyCode::Char('-') => {
            app.remove_last_row();
        }

        // Exercise
        KeyCode::Char('n') => {
            app.add_question();
        }
        KeyCode::Char('N') => {
            app.remove_question();
        }
        KeyCode::Char('t') => {
            app.cycle_question_type();
        }
        KeyCode::Char('m') => {
            app.toggle_input_mode();
        }
        KeyCode::Char('r') => {
            app.toggle_allow_retry();
        }
        KeyCode::Char('i') => {
            app.toggle_show_results();
        }

        // File
        KeyCode::Char('s') => save(app, path),
        KeyCode::Char('E') => {
            let page = app.page_snapshot();
            match io::export_outline(&page, path) {
                Ok(out) => app.set_status(&format!(
                    "Outline exported to {} ({} chars)",
                    out.display(),
                    generate_outline(&page).len()
                )),
                Err(e) => app.set_status(&format!("Export failed: {}", e)),
            }
        }

        _ => {}
    }
}

fn handle_add_picker(app: &mut App, code: KeyCode) {
    let kinds = BlockType::all();

    match code {
        KeyCode::Esc => app.mode = Mode::Normal,
        KeyCode::Char('j') | KeyCode::Down => {
            app.picker_selected = (app.picker_selected + 1) % kinds.len();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.picker_selected = if app.picker_selected == 0 {
                kinds.len() - 1
            } else {
                app.picker_selected - 1
            };
        }
        KeyCode::Enter => app.add_block(kinds[app.picker_selected]),
        // Quick select
        KeyCode::Char(c @ '1'..='5') => {
            let index = (c as usize) - ('1' as usize);
            if let Some(kind) = kinds.get(index) {
                app.add_block(*kind);
            }
        }
        _ => {}
    }
}

fn handle_input_mode(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Enter => {
            app.complete_input();
        }
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => {
            app.input_buffer.push(c);
        }
        _ => {}
    }
}
