use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use mycomind::{document, MapError, MapNode, MapSession, NodePatch};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::path::Path;

// ============================================================================
// TUI Mode
// ============================================================================

/// TUI operating mode
#[derive(Clone, Copy, PartialEq)]
enum TuiMode {
    Navigate,      // Browsing the focused subtree
    EditLabel,     // Renaming the cursor node
    ConfirmDelete, // y/n prompt before deleting
    Help,          // Key reference overlay
}

/// One visible row of the tree pane: a node id plus its indent depth
/// relative to the focus root.
struct Row {
    id: String,
    depth: usize,
}

/// TUI application state wrapping one editing session.
struct TuiApp {
    session: MapSession,
    rows: Vec<Row>,
    list_state: ListState,
    mode: TuiMode,
    edit_buffer: String,
    status_message: String,
    dirty: bool,
}

impl TuiApp {
    fn new(session: MapSession) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        let mut app = TuiApp {
            session,
            rows: Vec::new(),
            list_state,
            mode: TuiMode::Navigate,
            edit_buffer: String::new(),
            status_message: String::new(),
            dirty: false,
        };
        app.rebuild_rows();
        app
    }

    /// Flatten the focus root's visible subtree into list rows. Hidden
    /// children stay out; collapsed nodes render as a single row.
    fn rebuild_rows(&mut self) {
        self.rows.clear();
        let focus = self.session.focus_root().clone();
        for child in &focus.children {
            push_rows(child, 0, &mut self.rows);
        }

        if self.rows.is_empty() {
            self.list_state.select(None);
        } else {
            let idx = self.list_state.selected().unwrap_or(0).min(self.rows.len() - 1);
            self.list_state.select(Some(idx));
        }
        self.sync_selection();
    }

    /// Keep the engine selection on the cursor row.
    fn sync_selection(&mut self) {
        match self.cursor_id() {
            Some(id) => self.session.click(&id),
            None => self.session.clear_selection(),
        }
    }

    fn cursor_id(&self) -> Option<String> {
        self.list_state.selected().and_then(|i| self.rows.get(i)).map(|r| r.id.clone())
    }

    fn cursor_node(&self) -> Option<&MapNode> {
        self.session.selected_node()
    }

    fn select_next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some((i + 1).min(self.rows.len() - 1)));
        self.sync_selection();
    }

    fn select_prev(&mut self) {
        let i = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some(i.saturating_sub(1)));
        self.sync_selection();
    }

    fn select_first(&mut self) {
        if !self.rows.is_empty() {
            self.list_state.select(Some(0));
            self.sync_selection();
        }
    }

    fn select_last(&mut self) {
        if !self.rows.is_empty() {
            self.list_state.select(Some(self.rows.len() - 1));
            self.sync_selection();
        }
    }

    /// Move the cursor to the row holding `id`, if it is visible.
    fn cursor_to(&mut self, id: &str) {
        if let Some(i) = self.rows.iter().position(|r| r.id == id) {
            self.list_state.select(Some(i));
            self.sync_selection();
        }
    }

    fn drill_into_cursor(&mut self) {
        if let Some(id) = self.cursor_id() {
            // Drilling into a collapsed node expands it, which edits the tree
            let was_collapsed = self.cursor_node().map(|n| n.collapsed).unwrap_or(false);
            self.session.drill_into(&id);
            if was_collapsed {
                self.dirty = true;
            }
            self.list_state.select(Some(0));
            self.rebuild_rows();
            self.status_message = format!(
                "Entered {} ({} rows)",
                self.session.focus_root().label,
                self.rows.len()
            );
        }
    }

    fn drill_up(&mut self) {
        let left = self.session.focus_root().clone();
        if self.session.drill_up() {
            if left.collapsed {
                self.dirty = true;
            }
            self.rebuild_rows();
            self.cursor_to(&left.id);
            self.status_message = format!("Back to {}", self.session.focus_root().label);
        } else {
            self.status_message = "Already at root".to_string();
        }
    }

    fn toggle_cursor(&mut self) {
        if let Some(id) = self.cursor_id() {
            let had_children = self
                .cursor_node()
                .map(|n| n.has_children())
                .unwrap_or(false);
            if !had_children {
                self.status_message = "Nothing to fold".to_string();
                return;
            }
            self.session.toggle_collapse(&id);
            self.rebuild_rows();
            self.dirty = true;
            let collapsed = self.cursor_node().map(|n| n.collapsed).unwrap_or(false);
            self.status_message =
                format!("{} {}", if collapsed { "Collapsed" } else { "Expanded" }, id);
        }
    }

    fn add_under_cursor(&mut self) {
        let new_id = self.session.add_node();
        self.rebuild_rows();
        self.cursor_to(&new_id);
        self.dirty = true;
        self.status_message = "Added node (r to rename)".to_string();
    }

    fn delete_cursor(&mut self) {
        let Some(id) = self.cursor_id() else {
            self.status_message = "Nothing selected".to_string();
            return;
        };
        match self.session.delete_node(&id) {
            Ok(true) => {
                self.rebuild_rows();
                self.dirty = true;
                self.status_message = format!("Deleted {}", id);
            }
            Ok(false) => {
                self.status_message = format!("No node with id {}", id);
            }
            Err(e) => {
                // Guard rejection: nothing changed, tell the user why
                self.status_message = format!("Rejected: {}", e);
            }
        }
    }

    fn begin_rename(&mut self) {
        if let Some(node) = self.cursor_node() {
            self.edit_buffer = node.label.clone();
            self.mode = TuiMode::EditLabel;
        } else {
            self.status_message = "Nothing selected".to_string();
        }
    }

    fn commit_rename(&mut self) {
        if let Some(id) = self.cursor_id() {
            let label = self.edit_buffer.trim().to_string();
            if !label.is_empty() {
                self.session.update_node(&id, &NodePatch::label(label));
                self.dirty = true;
                self.status_message = format!("Renamed {}", id);
            }
        }
        self.edit_buffer.clear();
        self.mode = TuiMode::Navigate;
    }

    fn save(&mut self, path: &Path) {
        match document::save_file(path, self.session.tree()) {
            Ok(()) => {
                self.dirty = false;
                self.status_message = format!("Saved to {}", path.display());
            }
            Err(e) => {
                self.status_message = format!("Save failed: {}", e);
            }
        }
    }
}

fn push_rows(node: &MapNode, depth: usize, rows: &mut Vec<Row>) {
    rows.push(Row { id: node.id.clone(), depth });
    for child in &node.children {
        push_rows(child, depth + 1, rows);
    }
}

// ============================================================================
// Entry point and event loop
// ============================================================================

pub(crate) fn run_tui(root: MapNode, path: &Path) -> Result<(), MapError> {
    let session = MapSession::open(root)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = TuiApp::new(session);
    app.status_message = format!(
        "Loaded {} nodes. Press ? for help, q to quit.",
        app.session.tree().subtree_size()
    );

    let result = run_tui_loop(&mut terminal, &mut app, path);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn run_tui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut TuiApp,
    path: &Path,
) -> Result<(), MapError> {
    loop {
        terminal.draw(|f| draw_ui(f, app))?;

        if !event::poll(std::time::Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.mode {
            TuiMode::Navigate => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('w') => app.save(path),

                KeyCode::Char('j') | KeyCode::Down => app.select_next(),
                KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
                KeyCode::Char('g') | KeyCode::Home => app.select_first(),
                KeyCode::Char('G') | KeyCode::End => app.select_last(),

                KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.drill_into_cursor(),
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => {
                    app.drill_up()
                }
                KeyCode::Char('0') => {
                    app.session.breadcrumb_jump(0);
                    app.rebuild_rows();
                    app.status_message = "Jumped to root".to_string();
                }

                KeyCode::Char(' ') | KeyCode::Char('t') => app.toggle_cursor(),
                KeyCode::Char('E') => {
                    app.session.expand_all();
                    app.rebuild_rows();
                    app.dirty = true;
                    app.status_message = "Expanded all below focus".to_string();
                }
                KeyCode::Char('C') => {
                    app.session.collapse_all();
                    app.rebuild_rows();
                    app.dirty = true;
                    app.status_message = "Collapsed all below focus".to_string();
                }

                KeyCode::Char('a') => app.add_under_cursor(),
                KeyCode::Char('d') => {
                    if app.cursor_id().is_some() {
                        app.mode = TuiMode::ConfirmDelete;
                    } else {
                        app.status_message = "Nothing selected".to_string();
                    }
                }
                KeyCode::Char('r') => app.begin_rename(),
                KeyCode::Char('?') => app.mode = TuiMode::Help,
                _ => {}
            },

            TuiMode::EditLabel => match key.code {
                KeyCode::Esc => {
                    app.edit_buffer.clear();
                    app.mode = TuiMode::Navigate;
                    app.status_message = "Rename cancelled".to_string();
                }
                KeyCode::Enter => app.commit_rename(),
                KeyCode::Backspace => {
                    app.edit_buffer.pop();
                }
                KeyCode::Char(c) => app.edit_buffer.push(c),
                _ => {}
            },

            TuiMode::ConfirmDelete => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    app.delete_cursor();
                    app.mode = TuiMode::Navigate;
                }
                _ => {
                    app.mode = TuiMode::Navigate;
                    app.status_message = "Delete cancelled".to_string();
                }
            },

            TuiMode::Help => {
                app.mode = TuiMode::Navigate;
            }
        }
    }
}

// ============================================================================
// Drawing
// ============================================================================

fn draw_ui(f: &mut Frame, app: &TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Breadcrumb bar
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(f.size());

    draw_breadcrumb(f, app, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    draw_tree(f, app, main_chunks[0]);
    draw_preview(f, app, main_chunks[1]);

    let status = if app.dirty {
        format!("{}  [unsaved, w to write]", app.status_message)
    } else {
        app.status_message.clone()
    };
    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(status_bar, chunks[2]);

    match app.mode {
        TuiMode::EditLabel => draw_edit_popup(f, app),
        TuiMode::ConfirmDelete => draw_confirm_popup(f, app),
        TuiMode::Help => draw_help_popup(f),
        TuiMode::Navigate => {}
    }
}

fn draw_breadcrumb(f: &mut Frame, app: &TuiApp, area: Rect) {
    let bg = Color::Rgb(40, 40, 60);
    let mut spans = vec![Span::styled(" ", Style::default().bg(bg))];

    let crumbs = app.session.breadcrumbs();
    for (i, crumb) in crumbs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray).bg(bg)));
        }
        let style = if i == crumbs.len() - 1 {
            Style::default().fg(Color::Cyan).bg(bg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray).bg(bg)
        };
        spans.push(Span::styled(truncate_label(&crumb.label, 20), style));
    }

    if crumbs.len() > 1 {
        spans.push(Span::styled("   [Esc/Backspace: up]", Style::default().fg(Color::DarkGray).bg(bg)));
    }

    let breadcrumb = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    f.render_widget(breadcrumb, area);
}

fn draw_tree(f: &mut Frame, app: &TuiApp, area: Rect) {
    let usable_width = area.width.saturating_sub(6) as usize;

    let items: Vec<ListItem> = app
        .rows
        .iter()
        .map(|row| {
            let node = mycomind::locate::find(app.session.tree(), &row.id);
            let (marker, label, extra) = match node {
                Some(n) => {
                    let marker = if n.collapsed {
                        "▶"
                    } else if n.has_children() {
                        "▼"
                    } else {
                        "○"
                    };
                    let extra = if n.direct_child_count() > 0 {
                        format!(" ({})", n.direct_child_count())
                    } else {
                        String::new()
                    };
                    (marker, n.label.clone(), extra)
                }
                None => ("?", row.id.clone(), String::new()),
            };

            let indent = "  ".repeat(row.depth);
            let text = format!("{}{} {}{}", indent, marker, label, extra);
            ListItem::new(Line::from(Span::raw(truncate_label(&text, usable_width))))
        })
        .collect();

    let title = format!(" {} ", app.session.focus_root().label);
    let tree = List::new(items)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)).title(title))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    f.render_stateful_widget(tree, area, &mut app.list_state.clone());
}

fn draw_preview(f: &mut Frame, app: &TuiApp, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    match app.cursor_node() {
        Some(node) => {
            lines.push(Line::from(Span::styled(
                node.label.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                format!("id: {}", node.id),
                Style::default().fg(Color::DarkGray),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(format!(
                "{} / {}",
                node.metadata.node_type.as_str(),
                node.metadata.status.as_str()
            )));
            if !node.metadata.tags.is_empty() {
                lines.push(Line::from(format!("tags: {}", node.metadata.tags.join(", "))));
            }
            lines.push(Line::from(Span::styled(
                format!("created: {}", format_created(&node.metadata.created)),
                Style::default().fg(Color::DarkGray),
            )));
            lines.push(Line::from(format!(
                "children: {} visible, {} hidden",
                node.children.len(),
                node.hidden_children.len()
            )));
            if !node.description.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(node.description.clone()));
            }
        }
        None => {
            lines.push(Line::from(Span::styled(
                "Empty view - a to add a node",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let preview = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)).title(" Details "));
    f.render_widget(preview, area);
}

fn draw_edit_popup(f: &mut Frame, app: &TuiApp) {
    let area = centered_rect(50, 3, f.size());
    f.render_widget(Clear, area);
    let input = Paragraph::new(format!("{}_", app.edit_buffer))
        .block(Block::default().borders(Borders::ALL).title(" Rename (Enter to apply, Esc to cancel) "));
    f.render_widget(input, area);
}

fn draw_confirm_popup(f: &mut Frame, app: &TuiApp) {
    let label = app.cursor_node().map(|n| n.label.clone()).unwrap_or_default();
    let area = centered_rect(50, 3, f.size());
    f.render_widget(Clear, area);
    let prompt = Paragraph::new(format!("Delete '{}' and its subtree? (y/n)", label))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Red)).title(" Confirm "));
    f.render_widget(prompt, area);
}

fn draw_help_popup(f: &mut Frame) {
    let lines = vec![
        Line::from("j/k      move    g/G first/last"),
        Line::from("Enter/l  drill into    Esc/h drill up    0 jump to root"),
        Line::from("Space/t  toggle fold   E expand all   C collapse all"),
        Line::from("a add    d delete    r rename    w write    q quit"),
        Line::from(""),
        Line::from("Any key to close"),
    ];
    let area = centered_rect(64, lines.len() as u16 + 2, f.size());
    f.render_widget(Clear, area);
    let help = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Keys "));
    f.render_widget(help, area);
}

/// Centered popup rect with a fixed height in rows.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect { x, y, width, height: height.min(area.height) }
}

/// Char-boundary-safe truncation with an ellipsis.
fn truncate_label(s: &str, max_chars: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = chars.into_iter().take(keep).collect();
    out.push('…');
    out
}

fn format_created(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%d %b %Y %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
