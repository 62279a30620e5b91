//! Terminal UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use lesson_core::{App, BlockData, BlockType, ContentBlock, Mode, QuestionKind};

// Catppuccin Mocha colors
const SURFACE0: Color = Color::Rgb(49, 50, 68);
const SURFACE1: Color = Color::Rgb(69, 71, 90);
const TEXT: Color = Color::Rgb(205, 214, 244);
const SUBTEXT0: Color = Color::Rgb(166, 173, 200);
const RED: Color = Color::Rgb(243, 139, 168);
const YELLOW: Color = Color::Rgb(249, 226, 175);
const GREEN: Color = Color::Rgb(166, 227, 161);
const BLUE: Color = Color::Rgb(137, 180, 250);
const MAUVE: Color = Color::Rgb(203, 166, 247);
const TEAL: Color = Color::Rgb(148, 226, 213);

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_title_bar(frame, app, chunks[0]);
    draw_main_area(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);

    // Draw popups/overlays
    match app.mode {
        Mode::AddPicker => draw_add_picker(frame, app),
        Mode::Input => draw_input_dialog(frame, app),
        Mode::Help => draw_help(frame),
        Mode::Normal => {}
    }
}

fn draw_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let count = app.blocks().len();
    let current = if count > 0 { app.selected + 1 } else { 0 };
    let dirty = if app.is_dirty() { " *" } else { "" };

    let title_text = format!(" Lesson - {}{} [{}/{}]", app.title(), dirty, current, count);

    let title_bar = Paragraph::new(title_text).style(Style::default().fg(TEXT).bg(SURFACE0));

    frame.render_widget(title_bar, area);
}

fn draw_main_area(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(36), // Block list
            Constraint::Min(0),     // Detail
        ])
        .split(area);

    draw_block_list(frame, app, chunks[0]);
    draw_detail(frame, app, chunks[1]);
}

fn draw_block_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BLUE))
        .title(format!("Blocks ({})", app.blocks().len()));

    if app.blocks().is_empty() {
        let hint = Paragraph::new("Empty page. Press a to add a block.")
            .style(Style::default().fg(SUBTEXT0))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(hint, area);
        return;
    }

    let items: Vec<ListItem> = app
        .blocks()
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let selected = i == app.selected;
            let marker = if selected { ">" } else { " " };
            let summary: String = b.data.summary().chars().take(22).collect();
            let color = type_color(b.block_type());
            let style = if selected {
                Style::default().fg(TEXT).bg(SURFACE1)
            } else {
                Style::default().fg(TEXT)
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", marker), style),
                Span::styled(format!("{:<8}", b.block_type().label()), style.fg(color)),
                Span::styled(summary, style),
            ]))
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}

fn draw_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(SUBTEXT0))
        .title("Detail");

    let lines = match app.selected_block() {
        Some(b) => detail_lines(app, b),
        None => vec![Line::from(Span::styled(
            "No block selected",
            Style::default().fg(SUBTEXT0),
        ))],
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn heading(text: String, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn field(name: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<10}", name), Style::default().fg(SUBTEXT0)),
        Span::styled(value.to_string(), Style::default().fg(TEXT)),
    ])
}

fn detail_lines(app: &App, b: &ContentBlock) -> Vec<Line<'static>> {
    let mut lines = vec![
        heading(b.block_type().label().to_string(), type_color(b.block_type())),
        Line::from(Span::styled(
            b.id().to_string(),
            Style::default().fg(SUBTEXT0),
        )),
        Line::from(""),
    ];

    match &b.data {
        BlockData::Intro(d) => {
            for line in d.text.lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
        BlockData::Image(d) => {
            lines.push(field("url", &d.url));
            lines.push(field("alt", d.alt.as_deref().unwrap_or("")));
            lines.push(field("caption", d.caption.as_deref().unwrap_or("")));
            if !d.has_preview() {
                lines.push(Line::from(Span::styled(
                    "no image set",
                    Style::default().fg(YELLOW),
                )));
            }
        }
        BlockData::Youtube(d) => {
            lines.push(field("video", &d.video_id));
            lines.push(field("title", d.title.as_deref().unwrap_or("")));
            if let Some(url) = d.watch_url() {
                lines.push(field("watch", &url));
            }
        }
        BlockData::Table(d) => {
            lines.push(field("title", &d.title));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("| {} |", d.headers.join(" | ")),
                Style::default().fg(TEAL).add_modifier(Modifier::BOLD),
            )));
            for row in &d.rows {
                lines.push(Line::from(format!("| {} |", row.join(" | "))));
            }
        }
        BlockData::Exercise(d) => {
            lines.push(field("title", &d.title));
            lines.push(field(
                "results",
                if d.show_results_immediately {
                    "immediately"
                } else {
                    "at the end"
                },
            ));
            lines.push(field("retry", if d.allow_retry { "yes" } else { "no" }));
            lines.push(Line::from(""));

            for (i, q) in d.questions.iter().enumerate() {
                let selected = i == app.question_selected;
                let marker = if selected { ">" } else { " " };
                let style = if selected {
                    Style::default().fg(TEXT).bg(SURFACE1)
                } else {
                    Style::default().fg(TEXT)
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("{} {}. ", marker, i + 1), style),
                    Span::styled(
                        format!("[{}] ", q.question_type().label()),
                        style.fg(MAUVE),
                    ),
                    Span::styled(q.prompt.clone(), style),
                ]));

                match &q.kind {
                    QuestionKind::MultipleChoice { options, correct } => {
                        for (oi, option) in options.iter().enumerate() {
                            let mark = if *correct == Some(oi) { "x" } else { " " };
                            lines.push(Line::from(format!("     [{}] {}", mark, option)));
                        }
                    }
                    QuestionKind::TrueFalse { answer } => {
                        let answer = match answer {
                            Some(true) => "true",
                            Some(false) => "false",
                            None => "(not set)",
                        };
                        lines.push(Line::from(format!("     answer: {}", answer)));
                    }
                    QuestionKind::FillBlank { answer } => {
                        lines.push(Line::from(format!("     answer: {}", answer)));
                    }
                    QuestionKind::WordOrder {
                        words,
                        sentence,
                        input_mode,
                    } => {
                        lines.push(Line::from(format!("     words: {}", words.join(" / "))));
                        lines.push(Line::from(format!("     sentence: {}", sentence)));
                        lines.push(Line::from(format!("     input: {}", input_mode.as_str())));
                    }
                }
            }
            if d.questions.is_empty() {
                lines.push(Line::from(Span::styled(
                    "No questions. Press n to add one.",
                    Style::default().fg(SUBTEXT0),
                )));
            }
        }
        BlockData::Unknown(d) => {
            lines.push(field("type", &d.kind));
            lines.push(Line::from(Span::styled(
                "Kept as stored; this block cannot be edited here.",
                Style::default().fg(YELLOW),
            )));
            let json = serde_json::to_string_pretty(&d.data).unwrap_or_default();
            for line in json.lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
    }

    lines
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode_str = match app.mode {
        Mode::Normal => "NORMAL",
        Mode::AddPicker => "ADD",
        Mode::Input => "INPUT",
        Mode::Help => "HELP",
    };

    let status = app.status_message.as_deref().unwrap_or("");

    let help_hint = "j/k select | J/K move | a add | e edit | d delete | s save | ? help";

    let status_text = format!(
        " {} | {}",
        mode_str,
        if status.is_empty() { help_hint } else { status },
    );

    let status_bar = Paragraph::new(status_text).style(Style::default().fg(SUBTEXT0).bg(SURFACE0));

    frame.render_widget(status_bar, area);
}

fn draw_add_picker(frame: &mut Frame, app: &App) {
    let area = centered_rect(40, 9, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MAUVE))
        .title("Add Block (1-5 or j/k)");

    let items: Vec<ListItem> = BlockType::all()
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let selected = i == app.picker_selected;
            let marker = if selected { ">" } else { " " };
            let color = type_color(*kind);
            let style = if selected {
                Style::default().fg(color).bg(SURFACE1)
            } else {
                Style::default().fg(color)
            };
            ListItem::new(format!("{} {} {}", i + 1, marker, kind.label())).style(style)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}

fn draw_input_dialog(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 5, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(GREEN))
        .title(format!("{} (Enter to apply, Esc to cancel)", app.input_target.prompt()));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let input = Paragraph::new(format!("{}_", app.input_buffer))
        .style(Style::default().fg(TEXT))
        .wrap(Wrap { trim: false });
    frame.render_widget(input, inner);
}

fn draw_help(frame: &mut Frame) {
    let area = centered_rect(60, 34, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BLUE))
        .title("Help (press any key to close)");

    let section = |name: &'static str| {
        Line::from(Span::styled(
            name,
            Style::default().fg(MAUVE).add_modifier(Modifier::BOLD),
        ))
    };

    let help_text = vec![
        section("Blocks"),
        Line::from("  j/k      Select next/prev block"),
        Line::from("  J/K      Move block down/up"),
        Line::from("  a        Add block"),
        Line::from("  d        Delete block"),
        Line::from("  e        Edit text, url, video or title"),
        Line::from("  c        Edit caption / video title"),
        Line::from("  T        Edit page title"),
        Line::from(""),
        section("Tables"),
        Line::from("  >/<      Add/remove last column"),
        Line::from("  +/-      Add/remove last row"),
        Line::from(""),
        section("Exercises"),
        Line::from("  n/N      Add/remove question"),
        Line::from("  ]/[      Next/prev question"),
        Line::from("  t        Cycle question type"),
        Line::from("  p        Edit prompt"),
        Line::from("  o        Edit options"),
        Line::from("  w        Edit words"),
        Line::from("  A        Set correct answer"),
        Line::from("  m        Toggle drag/type input"),
        Line::from("  r/i      Toggle retry/immediate results"),
        Line::from(""),
        section("File"),
        Line::from("  s        Save page"),
        Line::from("  E        Export outline"),
        Line::from("  q        Save and quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(SUBTEXT0),
        )),
    ];

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, area);
}

fn type_color(kind: BlockType) -> Color {
    match kind {
        BlockType::Intro => TEXT,
        BlockType::Image => GREEN,
        BlockType::Table => TEAL,
        BlockType::Youtube => RED,
        BlockType::Exercise => YELLOW,
        BlockType::Unknown => SUBTEXT0,
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
