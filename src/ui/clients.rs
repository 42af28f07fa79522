use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::db::Directory;
use crate::models::{Client, ClientFilter};

/// A client together with its phone numbers, as shown in the list
#[derive(Debug, Clone)]
pub struct ClientEntry {
    pub client: Client,
    pub phones: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchField {
    FirstName,
    LastName,
    Email,
    Phone,
}

impl SearchField {
    fn label(self) -> &'static str {
        match self {
            SearchField::FirstName => "First name",
            SearchField::LastName => "Last name",
            SearchField::Email => "Email",
            SearchField::Phone => "Phone",
        }
    }

    fn next(self) -> Self {
        match self {
            SearchField::FirstName => SearchField::LastName,
            SearchField::LastName => SearchField::Email,
            SearchField::Email => SearchField::Phone,
            SearchField::Phone => SearchField::FirstName,
        }
    }
}

pub struct SearchInput {
    pub field: SearchField,
    pub value: String,
}

impl SearchInput {
    pub fn to_filter(&self) -> ClientFilter {
        let value = self.value.trim();
        if value.is_empty() {
            return ClientFilter::new();
        }

        match self.field {
            SearchField::FirstName => ClientFilter::new().first_name(value),
            SearchField::LastName => ClientFilter::new().last_name(value),
            SearchField::Email => ClientFilter::new().email(value),
            SearchField::Phone => ClientFilter::new().phone(value),
        }
    }
}

// Represents the state of the client list screen
pub struct ClientsState {
    entries: Vec<ClientEntry>,
    list_state: ListState,
    show_delete_confirmation: bool,
    search: Option<SearchInput>,
    filtered: bool,
    status: Option<String>,
}

impl ClientsState {
    pub fn new(entries: Vec<ClientEntry>) -> Self {
        let mut list_state = ListState::default();
        if !entries.is_empty() {
            list_state.select(Some(0));
        }

        Self {
            entries,
            list_state,
            show_delete_confirmation: false,
            search: None,
            filtered: false,
            status: None,
        }
    }

    pub fn filtered(mut self, filtered: bool) -> Self {
        self.filtered = filtered;
        self
    }

    pub fn next(&mut self) {
        if self.entries.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.entries.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.entries.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(0) | None => self.entries.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }

    pub fn selected_entry(&self) -> Option<&ClientEntry> {
        self.list_state.selected().and_then(|i| self.entries.get(i))
    }

    pub fn selected_client_id(&self) -> Option<i32> {
        self.selected_entry().map(|e| e.client.id)
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    fn start_search(&mut self) {
        self.search = Some(SearchInput {
            field: SearchField::FirstName,
            value: String::new(),
        });
    }
}

pub enum ClientAction {
    Quit,
    NewClient,
    EditClient(i32),
    DeleteClient(i32),
    Search(ClientFilter),
}

// DB operations for the client list
pub async fn load_clients(db: &mut Directory, filter: &ClientFilter) -> Result<Vec<ClientEntry>> {
    let clients = db.find_client(filter).await?;

    let mut entries = Vec::with_capacity(clients.len());
    for client in clients {
        let phones = db
            .get_phones(client.id)
            .await?
            .into_iter()
            .filter_map(|p| p.phone)
            .collect();
        entries.push(ClientEntry { client, phones });
    }

    Ok(entries)
}

pub fn render_clients<B: Backend>(frame: &mut Frame<B>, state: &mut ClientsState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(3),
        ].as_ref())
        .split(size);

    let items: Vec<ListItem> = state
        .entries
        .iter()
        .map(|entry| {
            let phones = if entry.phones.is_empty() {
                "no phones".to_string()
            } else {
                entry.phones.join(", ")
            };
            ListItem::new(Spans::from(vec![
                Span::styled(
                    format!("#{} ", entry.client.id),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(entry.client.full_name()),
                Span::raw(format!("  <{}>  ", entry.client.email)),
                Span::styled(phones, Style::default().fg(Color::Gray)),
            ]))
        })
        .collect();

    let title = if state.filtered { "Clients (filtered)" } else { "Clients" };
    let clients_list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(clients_list, chunks[0], &mut state.list_state);

    let search_line = match &state.search {
        Some(search) => Spans::from(vec![
            Span::styled(
                format!("{}: ", search.field.label()),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(
                format!("{}|", search.value),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        None => Spans::from(Span::styled(
            state.status.clone().unwrap_or_default(),
            Style::default().fg(Color::Red),
        )),
    };
    let search = Paragraph::new(search_line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(search, chunks[1]);

    let buttons_text = if state.search.is_some() {
        "<Tab> Change field | <Enter> Search | <Esc> Cancel"
    } else if state.selected_entry().is_some() {
        "<N> New | <E> Edit | <D> Delete | </> Search | <Esc> Clear search / Quit"
    } else {
        "<N> New | </> Search | <Esc> Clear search / Quit"
    };

    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));

    frame.render_widget(buttons, chunks[2]);

    if state.show_delete_confirmation {
        render_delete_confirmation(frame, size);
    }
}

fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect) {
    let popup_area = centered_rect(50, 20, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Are you sure you want to delete this client?"),
        Spans::from(""),
        Spans::from("All of the client's phone numbers will also be deleted."),
        Spans::from(""),
        Spans::from("<Y> Yes  <N> No"),
    ])
    .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(popup, popup_area);
}

// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Apply one key press to the list screen
pub fn handle_key(state: &mut ClientsState, code: KeyCode) -> Option<ClientAction> {
    if let Some(search) = &mut state.search {
        match code {
            KeyCode::Esc => state.search = None,
            KeyCode::Tab => search.field = search.field.next(),
            KeyCode::Enter => {
                let filter = search.to_filter();
                state.search = None;
                return Some(ClientAction::Search(filter));
            }
            KeyCode::Backspace => {
                search.value.pop();
            }
            KeyCode::Char(c) => search.value.push(c),
            _ => {}
        }
        return None;
    }

    if state.show_delete_confirmation {
        match code {
            KeyCode::Char('y') => {
                state.toggle_delete_confirmation();
                return state.selected_client_id().map(ClientAction::DeleteClient);
            }
            KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => {
                state.toggle_delete_confirmation();
            }
            _ => {}
        }
        return None;
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => {
            if state.filtered {
                return Some(ClientAction::Search(ClientFilter::new()));
            }
            return Some(ClientAction::Quit);
        }
        KeyCode::Char('n') => return Some(ClientAction::NewClient),
        KeyCode::Char('e') | KeyCode::Enter => {
            return state.selected_client_id().map(ClientAction::EditClient);
        }
        KeyCode::Char('d') => {
            if state.selected_entry().is_some() {
                state.toggle_delete_confirmation();
            }
        }
        KeyCode::Char('/') => state.start_search(),
        KeyCode::Down => state.next(),
        KeyCode::Up => state.previous(),
        _ => {}
    }
    None
}

pub fn handle_input(state: &mut ClientsState) -> Result<Option<ClientAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i32, first_name: &str) -> ClientEntry {
        ClientEntry {
            client: Client {
                id,
                first_name: first_name.into(),
                last_name: "Lee".into(),
                email: format!("{}@x.com", first_name.to_lowercase()),
            },
            phones: vec![],
        }
    }

    #[test]
    fn navigation_wraps_around() {
        let mut state = ClientsState::new(vec![entry(1, "Ann"), entry(2, "Bob")]);
        assert_eq!(state.selected_client_id(), Some(1));
        state.next();
        assert_eq!(state.selected_client_id(), Some(2));
        state.next();
        assert_eq!(state.selected_client_id(), Some(1));
        state.previous();
        assert_eq!(state.selected_client_id(), Some(2));
    }

    #[test]
    fn empty_list_has_no_selection() {
        let mut state = ClientsState::new(vec![]);
        state.next();
        state.previous();
        assert!(state.selected_client_id().is_none());
        assert!(handle_key(&mut state, KeyCode::Char('e')).is_none());
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut state = ClientsState::new(vec![entry(5, "Ann")]);
        assert!(handle_key(&mut state, KeyCode::Char('d')).is_none());
        assert!(matches!(
            handle_key(&mut state, KeyCode::Char('y')),
            Some(ClientAction::DeleteClient(5))
        ));
        assert!(!state.show_delete_confirmation);
    }

    #[test]
    fn search_builds_filter_for_chosen_field() {
        let mut state = ClientsState::new(vec![entry(1, "Ann")]);
        handle_key(&mut state, KeyCode::Char('/'));
        for _ in 0..3 {
            handle_key(&mut state, KeyCode::Tab);
        }
        for c in "+2".chars() {
            handle_key(&mut state, KeyCode::Char(c));
        }
        match handle_key(&mut state, KeyCode::Enter) {
            Some(ClientAction::Search(filter)) => {
                assert_eq!(filter, ClientFilter::new().phone("+2"));
            }
            _ => panic!("expected a search action"),
        }
        assert!(state.search.is_none());
    }

    #[test]
    fn escape_clears_filter_before_quitting() {
        let mut state = ClientsState::new(vec![]).filtered(true);
        assert!(matches!(
            handle_key(&mut state, KeyCode::Esc),
            Some(ClientAction::Search(f)) if f == ClientFilter::new()
        ));
        let mut state = ClientsState::new(vec![]);
        assert!(matches!(handle_key(&mut state, KeyCode::Esc), Some(ClientAction::Quit)));
    }
}
