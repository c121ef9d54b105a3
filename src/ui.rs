use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use expense_tracker::{bar_ratio, format_money, Category, KeyValueStore, Summary, Tracker};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    AddName,
    AddAmount,
    EditBudget,
}

impl InputMode {
    pub fn is_editing(&self) -> bool {
        *self != InputMode::Normal
    }
}

pub struct App<'a, S> {
    pub tracker: &'a mut Tracker<S>,
    pub state: TableState,
    pub mode: InputMode,
    pub name_input: String,
    pub amount_input: String,
    pub budget_input: String,
    pub currency: String,
}

impl<'a, S: KeyValueStore> App<'a, S> {
    pub fn new(tracker: &'a mut Tracker<S>, currency: &str) -> Self {
        let mut state = TableState::default();
        if !tracker.expenses().is_empty() {
            state.select(Some(0));
        }

        Self {
            tracker,
            state,
            mode: InputMode::Normal,
            name_input: String::new(),
            amount_input: String::new(),
            budget_input: String::new(),
            currency: currency.to_string(),
        }
    }

    /// Handle one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.mode {
            InputMode::Normal => return self.handle_normal_key(key),
            InputMode::AddName | InputMode::AddAmount => self.handle_form_key(key),
            InputMode::EditBudget => self.handle_budget_key(key),
        }
        false
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('a') => self.mode = InputMode::AddName,
            KeyCode::Char('b') => {
                self.budget_input = self.tracker.budget().to_string();
                self.mode = InputMode::EditBudget;
            }
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Home => self.select_first(),
            KeyCode::End => self.select_last(),
            _ => {}
        }
        false
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.name_input.clear();
                self.amount_input.clear();
                self.mode = InputMode::Normal;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.mode = match self.mode {
                    InputMode::AddName => InputMode::AddAmount,
                    _ => InputMode::AddName,
                };
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.name_input.clear();
                self.amount_input.clear();
                self.mode = InputMode::Normal;
            }
            KeyCode::Enter => self.submit_expense(),
            KeyCode::Backspace => {
                self.active_input().pop();
            }
            KeyCode::Char(c) => self.active_input().push(c),
            _ => {}
        }
    }

    fn handle_budget_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.budget_input.clear();
                self.mode = InputMode::Normal;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.budget_input.clear();
                self.mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                // Invalid budgets leave the field open for correction
                if self.tracker.set_budget_text(&self.budget_input).is_ok() {
                    self.budget_input.clear();
                    self.mode = InputMode::Normal;
                }
            }
            KeyCode::Backspace => {
                self.budget_input.pop();
            }
            KeyCode::Char(c) => self.budget_input.push(c),
            _ => {}
        }
    }

    fn active_input(&mut self) -> &mut String {
        match self.mode {
            InputMode::AddAmount => &mut self.amount_input,
            _ => &mut self.name_input,
        }
    }

    /// Rejected input keeps the form open with its contents
    fn submit_expense(&mut self) {
        if self
            .tracker
            .add_expense(&self.name_input, &self.amount_input)
            .is_err()
        {
            return;
        }

        self.name_input.clear();
        self.amount_input.clear();
        self.mode = InputMode::Normal;
        self.select_last();
    }

    fn delete_selected(&mut self) {
        let Some(i) = self.state.selected() else {
            return;
        };
        self.tracker.delete(i);

        let len = self.tracker.expenses().len();
        if len == 0 {
            self.state.select(None);
        } else if i >= len {
            self.state.select(Some(len - 1));
        }
    }

    pub fn next(&mut self) {
        let len = self.tracker.expenses().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.tracker.expenses().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    fn select_first(&mut self) {
        if !self.tracker.expenses().is_empty() {
            self.state.select(Some(0));
        }
    }

    fn select_last(&mut self) {
        let len = self.tracker.expenses().len();
        if len > 0 {
            self.state.select(Some(len - 1));
        }
    }
}

pub fn run_ui<S: KeyValueStore>(app: &mut App<'_, S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("terminal UI failed: {}", err);
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<'_, S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Windows reports releases too
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui<S: KeyValueStore>(f: &mut Frame, app: &mut App<'_, S>) {
    let summary = app.tracker.summary();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                                          // Header
            Constraint::Length(if summary.over_budget { 3 } else { 0 }),    // Warning banner
            Constraint::Min(0),                                             // Content area
            Constraint::Length(if app.mode.is_editing() { 3 } else { 0 }),  // Input form
            Constraint::Length(3),                                          // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app, &summary);
    if summary.over_budget {
        render_warning(f, chunks[1]);
    }

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60), // Expense list
            Constraint::Percentage(40), // Breakdown
        ])
        .split(chunks[2]);

    render_table(f, content_chunks[0], app);
    render_breakdown(f, content_chunks[1], app, &summary);

    if app.mode.is_editing() {
        render_form(f, chunks[3], app);
    }
    render_status_bar(f, chunks[4], app);
}

fn category_color(category: Category) -> Color {
    category.color().parse().unwrap_or(Color::White)
}

fn render_header<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<'_, S>, summary: &Summary) {
    let spans = vec![
        Span::styled(
            "💸 My Finance Tracker",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Total Spent: {}", format_money(summary.total_spent, &app.currency)),
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Monthly Budget: {}", format_money(summary.budget, &app.currency)),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Remaining: {}", format_money(summary.remaining, &app.currency)),
            Style::default().fg(if summary.over_budget { Color::Red } else { Color::Green }),
        ),
    ];

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_warning(f: &mut Frame, area: Rect) {
    let warning = Paragraph::new(Line::from(Span::styled(
        "⚠️  You are over your monthly budget!",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Yellow)));

    f.render_widget(warning, area);
}

fn render_table<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &mut App<'_, S>) {
    let header_cells = ["#", "Expense", "Amount", "Type"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let currency = app.currency.clone();
    let rows = app.tracker.expenses().iter().enumerate().map(|(i, e)| {
        let color = category_color(e.category);
        let cells = vec![
            Cell::from(format!("{}", i)),
            Cell::from(truncate(&e.name, 30)),
            Cell::from(format_money(e.amount, &currency)),
            Cell::from(e.category.as_str()).style(Style::default().fg(color)),
        ];
        Row::new(cells).height(1).style(Style::default().fg(color))
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(20),
            Constraint::Length(14),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Expenses "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_breakdown<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<'_, S>, summary: &Summary) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Breakdown: Needs vs Wants ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Needs gauge
            Constraint::Length(3), // Wants gauge
            Constraint::Min(0),    // Details
        ])
        .split(inner);

    for (slice, row) in summary.breakdown.iter().zip(rows.iter()) {
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(format!(" {} ", slice.label)))
            .gauge_style(Style::default().fg(category_color(slice.category)))
            .ratio(bar_ratio(slice.share))
            .label(format!(
                "{:.1}%  {}",
                slice.share * 100.0,
                format_money(slice.value, &app.currency)
            ));
        f.render_widget(gauge, *row);
    }

    let used = summary.budget_used();
    let used_label = if used.is_finite() {
        format!("{:.1}%", used * 100.0)
    } else {
        "∞".to_string()
    };

    let details = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Entries: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(format!(
                "{} ({} needs, {} wants)",
                summary.expense_count,
                summary.needs().count,
                summary.wants().count
            )),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Budget used: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::styled(
                used_label,
                Style::default().fg(if summary.over_budget { Color::Red } else { Color::Green }),
            ),
        ]),
    ];

    f.render_widget(Paragraph::new(details), rows[2]);
}

fn render_form<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<'_, S>) {
    let active = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let idle = Style::default().fg(Color::DarkGray);

    let (title, spans) = match app.mode {
        InputMode::EditBudget => (
            " Monthly Budget ",
            vec![
                Span::styled("Budget: ", active),
                Span::raw(format!("{}▏", app.budget_input)),
            ],
        ),
        _ => {
            let editing_name = app.mode == InputMode::AddName;
            (
                " Add Expense ",
                vec![
                    Span::styled("Expense: ", if editing_name { active } else { idle }),
                    Span::raw(format!("{}{}", app.name_input, if editing_name { "▏" } else { "" })),
                    Span::raw("   "),
                    Span::styled("Amount: ", if editing_name { idle } else { active }),
                    Span::raw(format!("{}{}", app.amount_input, if editing_name { "" } else { "▏" })),
                ],
            )
        }
    };

    let form = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title),
    );

    f.render_widget(form, area);
}

fn render_status_bar<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<'_, S>) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
    let total = app.tracker.expenses().len();

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, total),
        Style::default().fg(Color::Cyan),
    )];

    let hints: &[(&str, &str)] = if app.mode.is_editing() {
        &[("Tab", " Field | "), ("Enter", " Save | "), ("Esc", " Cancel")]
    } else {
        &[
            ("a", " Add | "),
            ("b", " Budget | "),
            ("d", " Delete | "),
            ("↑/↓", " Nav | "),
            ("q", " Quit"),
        ]
    };

    status_spans.push(Span::raw(" | "));
    for (key, label) in hints {
        status_spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(*label));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expense_tracker::{Expense, MemoryStore, Store, TrackerState};
    use ratatui::backend::TestBackend;

    fn press(app: &mut App<'_, MemoryStore>, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App<'_, MemoryStore>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_add_through_form() {
        let mut tracker = Tracker::open(MemoryStore::new());
        let mut app = App::new(&mut tracker, "₹");

        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.mode, InputMode::AddName);
        type_text(&mut app, "Rent");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "1000");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, InputMode::Normal);
        assert!(app.name_input.is_empty());
        assert_eq!(app.state.selected(), Some(0));
        assert_eq!(app.tracker.expenses()[0].category, Category::Need);
    }

    #[test]
    fn test_invalid_form_stays_open() {
        let mut tracker = Tracker::open(MemoryStore::new());
        let mut app = App::new(&mut tracker, "₹");

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Lunch");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "abc");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, InputMode::AddAmount);
        assert_eq!(app.name_input, "Lunch");
        assert_eq!(app.amount_input, "abc");
        assert!(app.tracker.expenses().is_empty());

        // 'q' is text while editing, not quit
        assert!(!press(&mut app, KeyCode::Char('q')));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, InputMode::Normal);
        assert!(app.amount_input.is_empty());
    }

    #[test]
    fn test_budget_and_delete_keys() {
        let mut tracker = Tracker::open(MemoryStore::new());
        tracker.add("a", 10.0).unwrap();
        tracker.add("b", 20.0).unwrap();
        let mut app = App::new(&mut tracker, "₹");

        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.budget_input, "5000");
        for _ in 0..4 {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "25");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.tracker.budget(), 25.0);
        assert!(app.tracker.summary().over_budget);

        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.tracker.expenses().len(), 1);
        assert_eq!(app.state.selected(), Some(0));

        press(&mut app, KeyCode::Delete);
        assert!(app.tracker.expenses().is_empty());
        assert_eq!(app.state.selected(), None);

        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn test_renders_warning_when_over_budget() {
        let mut tracker = Tracker::open(MemoryStore::new());
        tracker.add("Rent", 6000.0).unwrap();
        let mut app = App::new(&mut tracker, "$");

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("over your monthly budget"));
        assert!(text.contains("Breakdown: Needs vs Wants"));
    }

    #[test]
    fn test_renders_with_overflowed_saved_total() {
        // Two near-max amounts saved by an older session sum to infinity
        let overflowed = TrackerState::new(
            vec![
                Expense { name: "Rent".into(), amount: 1e308, category: Category::Need },
                Expense { name: "Rent".into(), amount: 1e308, category: Category::Need },
            ],
            5000.0,
        );
        let mut store = Store::new(MemoryStore::new());
        store.save(&overflowed);
        let mut tracker = Tracker::open(store.into_backend());
        assert!(tracker.summary().total_spent.is_infinite());
        let mut app = App::new(&mut tracker, "$");

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();

        let text: String = terminal.backend().buffer().content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Breakdown: Needs vs Wants"));
    }

    #[test]
    fn test_ctrl_c_cancels_open_form() {
        let mut tracker = Tracker::open(MemoryStore::new());
        let mut app = App::new(&mut tracker, "₹");
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Rent");
        assert!(!app.handle_key(ctrl_c));
        assert_eq!(app.mode, InputMode::Normal);
        assert!(app.name_input.is_empty());

        press(&mut app, KeyCode::Char('b'));
        assert!(!app.handle_key(ctrl_c));
        assert_eq!(app.mode, InputMode::Normal);
        assert!(app.budget_input.is_empty());

        // A second Ctrl+C from the list quits
        assert!(app.handle_key(ctrl_c));
        assert!(app.tracker.expenses().is_empty());
    }

    #[test]
    fn test_category_colors() {
        assert_eq!(category_color(Category::Need), Color::Rgb(0x4c, 0xaf, 0x50));
        assert_eq!(category_color(Category::Want), Color::Rgb(0xff, 0x98, 0x00));
    }
}
