use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::error::PortalError;
use crate::models::JobListing;
use crate::portal::Portal;
use crate::search;
use crate::store::Store;
use crate::truncate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
    Apply,
}

struct AppState {
    all_jobs: Vec<JobListing>,
    jobs: Vec<JobListing>,
    selected: usize,
    scroll_offset: u16,
    mode: Mode,
    query: String,
    email: String,
    message: Option<String>,
}

impl AppState {
    fn new(all_jobs: Vec<JobListing>, query: &str) -> Self {
        let mut state = Self {
            jobs: Vec::new(),
            all_jobs,
            selected: 0,
            scroll_offset: 0,
            mode: Mode::Browse,
            query: query.trim().to_string(),
            email: String::new(),
            message: None,
        };
        state.refilter();
        state
    }

    fn current_job(&self) -> Option<&JobListing> {
        self.jobs.get(self.selected)
    }

    /// Re-run the filter, keeping the selected job when it is still visible.
    fn refilter(&mut self) {
        let previous = self.current_job().map(|j| j.id);
        self.jobs = search::filter(&self.all_jobs, &self.query);
        self.selected = previous
            .and_then(|id| self.jobs.iter().position(|j| j.id == id))
            .unwrap_or(0);
        self.scroll_offset = 0;
        self.message = if self.jobs.is_empty() {
            Some("No matching jobs found!".to_string())
        } else {
            None
        };
    }

    fn next(&mut self) {
        if !self.jobs.is_empty() && self.selected < self.jobs.len() - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }

    fn push_char(&mut self, c: char) {
        match self.mode {
            Mode::Search => {
                self.query.push(c);
                self.refilter();
            }
            Mode::Apply => self.email.push(c),
            Mode::Browse => {}
        }
    }

    fn pop_char(&mut self) {
        match self.mode {
            Mode::Search => {
                self.query.pop();
                self.refilter();
            }
            Mode::Apply => {
                self.email.pop();
            }
            Mode::Browse => {}
        }
    }
}

pub fn run_browse<S: Store>(portal: &Portal<S>, query: Option<&str>) -> Result<()> {
    let jobs = portal.jobs()?;
    if jobs.is_empty() {
        println!("No jobs found.");
        return Ok(());
    }

    let mut state = AppState::new(jobs, query.unwrap_or_default());

    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    run_loop(&mut terminal, &mut state, portal)
}

/// Raw mode and the alternate screen, undone on drop so every exit path
/// (including a failed setup) leaves the shell usable.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        stdout().execute(EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = stdout().execute(LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn run_loop<S: Store>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    portal: &Portal<S>,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(state.selected));

    loop {
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match state.mode {
                Mode::Browse => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Down | KeyCode::Char('j') => state.next(),
                    KeyCode::Up | KeyCode::Char('k') => state.prev(),
                    KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
                    KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
                    KeyCode::Char('/') => {
                        state.mode = Mode::Search;
                        state.message = None;
                    }
                    KeyCode::Char('c') => {
                        state.query.clear();
                        state.refilter();
                    }
                    KeyCode::Char('a') if state.current_job().is_some() => {
                        state.mode = Mode::Apply;
                        state.message = None;
                    }
                    _ => {}
                },
                Mode::Search => match key.code {
                    KeyCode::Enter => state.mode = Mode::Browse,
                    KeyCode::Esc => {
                        state.query.clear();
                        state.refilter();
                        state.mode = Mode::Browse;
                    }
                    KeyCode::Backspace => state.pop_char(),
                    KeyCode::Char(c) => state.push_char(c),
                    _ => {}
                },
                Mode::Apply => match key.code {
                    KeyCode::Enter => {
                        if let Some(job_id) = state.current_job().map(|j| j.id) {
                            state.message = Some(apply_message(portal, job_id, &state.email));
                        }
                        state.email.clear();
                        state.mode = Mode::Browse;
                    }
                    KeyCode::Esc => {
                        state.email.clear();
                        state.mode = Mode::Browse;
                    }
                    KeyCode::Backspace => state.pop_char(),
                    KeyCode::Char(c) => state.push_char(c),
                    _ => {}
                },
            }
            list_state.select(Some(state.selected));
        }
    }
    Ok(())
}

fn apply_message<S: Store>(portal: &Portal<S>, job_id: i64, email: &str) -> String {
    match portal.apply_to_job(job_id, email, None) {
        Ok(id) => format!("Application #{} submitted!", id),
        Err(err @ PortalError::DuplicateApplication { .. }) => err.to_string(),
        Err(PortalError::Validation(_)) => "Email required".to_string(),
        Err(err) => format!("Error: {}", err),
    }
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);

    // Left panel: job list
    let items: Vec<ListItem> = state
        .jobs
        .iter()
        .map(|job| {
            ListItem::new(format!(
                "#{:<4} {} | {}",
                job.id,
                truncate(&job.title, 32),
                job.company_display()
            ))
        })
        .collect();

    let title = if state.query.is_empty() {
        format!(" Jobs ({}) ", state.jobs.len())
    } else {
        format!(" Jobs ({}/{}) matching '{}' ", state.jobs.len(), state.all_jobs.len(), state.query)
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: job detail
    let detail = Paragraph::new(build_detail(state))
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));

    frame.render_widget(detail, chunks[1]);

    // Footer: prompt, last message, or key help
    let footer = match state.mode {
        Mode::Search => Paragraph::new(format!(" Search: {}_", state.query)),
        Mode::Apply => Paragraph::new(format!(" Apply with email: {}_", state.email)),
        Mode::Browse => match &state.message {
            Some(message) => Paragraph::new(format!(" {}", message)).style(Style::default().fg(Color::Yellow)),
            None => Paragraph::new(" j/k:navigate  J/K:scroll  /:search  c:clear  a:apply  q:quit")
                .style(Style::default().fg(Color::DarkGray)),
        },
    };
    frame.render_widget(footer, rows[1]);
}

fn build_detail(state: &AppState) -> Text<'_> {
    let Some(job) = state.current_job() else {
        return Text::raw("No job selected");
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        job.title.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("at {}", job.company_display())));
    lines.push(Line::from(Span::styled(
        format!("Salary: {}", job.salary_display()),
        Style::default().fg(Color::Green),
    )));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        "Description",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for line in textwrap::fill(&job.description, 70).lines() {
        lines.push(Line::from(format!("  {}", line)));
    }

    Text::from(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: i64, title: &str, company: &str) -> JobListing {
        JobListing {
            id,
            title: title.to_string(),
            description: format!("{} duties", title),
            salary: None,
            employer_id: None,
            company: Some(company.to_string()),
        }
    }

    fn jobs() -> Vec<JobListing> {
        vec![
            job(3, "Marketing Manager", "Global Marketing"),
            job(2, "Data Scientist", "Data Insights"),
            job(1, "Software Engineer", "Tech Solutions"),
        ]
    }

    #[test]
    fn test_typing_a_query_filters_live() {
        let mut state = AppState::new(jobs(), "");
        state.mode = Mode::Search;
        for c in "data".chars() {
            state.push_char(c);
        }
        assert_eq!(state.jobs.len(), 1);
        assert_eq!(state.current_job().map(|j| j.id), Some(2));

        state.pop_char();
        state.pop_char();
        state.pop_char();
        state.pop_char();
        assert_eq!(state.jobs.len(), 3);
    }

    #[test]
    fn test_refilter_keeps_selected_job_when_visible() {
        let mut state = AppState::new(jobs(), "");
        state.next();
        assert_eq!(state.current_job().map(|j| j.id), Some(2));

        state.query = "insights".to_string();
        state.refilter();
        assert_eq!(state.selected, 0);
        assert_eq!(state.current_job().map(|j| j.id), Some(2));
    }

    #[test]
    fn test_no_match_sets_message_and_empty_selection() {
        let state = AppState::new(jobs(), "plumber");
        assert!(state.current_job().is_none());
        assert_eq!(state.message.as_deref(), Some("No matching jobs found!"));
    }

    #[test]
    fn test_navigation_stays_in_bounds() {
        let mut state = AppState::new(jobs(), "");
        state.prev();
        assert_eq!(state.selected, 0);
        for _ in 0..10 {
            state.next();
        }
        assert_eq!(state.selected, 2);
    }

    #[test]
    fn test_terminal_guard_restores_cooked_mode() {
        {
            // Fails without a tty; either way the guard must not leave raw mode on.
            let _guard = TerminalGuard::enter();
        }
        assert!(!crossterm::terminal::is_raw_mode_enabled().unwrap_or(false));
    }

    #[test]
    fn test_browse_mode_ignores_typing() {
        let mut state = AppState::new(jobs(), "");
        state.push_char('x');
        assert!(state.query.is_empty());
        assert!(state.email.is_empty());
    }
}
