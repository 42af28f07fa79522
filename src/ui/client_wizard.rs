use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::{Client, ClientChanges, Phones};

/// Values captured by the wizard, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientForm {
    pub client_id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phones: String,
}

impl ClientForm {
    pub fn phones(&self) -> Phones {
        Phones::parse_list(&self.phones)
    }

    /// Full replacement of an existing client's fields and phones
    pub fn to_changes(&self) -> ClientChanges {
        ClientChanges::new()
            .first_name(self.first_name.trim())
            .last_name(self.last_name.trim())
            .email(self.email.trim())
            .phones(self.phones())
    }
}

pub enum ClientWizardAction {
    Cancel,
    Save(ClientForm),
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum ClientField {
    FirstName,
    LastName,
    Email,
    Phones,
}

pub struct ClientWizardState {
    pub form: ClientForm,
    pub current_field: ClientField,
    pub editing: bool,
    pub error: Option<String>,
}

impl ClientWizardState {
    pub fn new() -> Self {
        Self {
            form: ClientForm {
                client_id: None,
                first_name: String::new(),
                last_name: String::new(),
                email: String::new(),
                phones: String::new(),
            },
            current_field: ClientField::FirstName,
            editing: false,
            error: None,
        }
    }

    pub fn from_existing(client: Client, phones: &[String]) -> Self {
        Self {
            form: ClientForm {
                client_id: Some(client.id),
                first_name: client.first_name,
                last_name: client.last_name,
                email: client.email,
                phones: phones.join(", "),
            },
            current_field: ClientField::FirstName,
            editing: false,
            error: None,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            ClientField::FirstName => ClientField::LastName,
            ClientField::LastName => ClientField::Email,
            ClientField::Email => ClientField::Phones,
            ClientField::Phones => ClientField::FirstName,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            ClientField::FirstName => ClientField::Phones,
            ClientField::LastName => ClientField::FirstName,
            ClientField::Email => ClientField::LastName,
            ClientField::Phones => ClientField::Email,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let field_value = match self.current_field {
            ClientField::FirstName => &mut self.form.first_name,
            ClientField::LastName => &mut self.form.last_name,
            ClientField::Email => &mut self.form.email,
            ClientField::Phones => &mut self.form.phones,
        };

        match key {
            KeyCode::Char(c) => {
                field_value.push(c);
            }
            KeyCode::Backspace => {
                field_value.pop();
            }
            _ => {}
        }
    }

    // Phones may be empty; the names and email may not
    pub fn is_valid(&self) -> bool {
        !self.form.first_name.trim().is_empty()
            && !self.form.last_name.trim().is_empty()
            && !self.form.email.trim().is_empty()
    }
}

impl Default for ClientWizardState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_client_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ClientWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = if state.form.client_id.is_none() {
        "New Client"
    } else {
        "Edit Client"
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let error = Paragraph::new(state.error.clone().unwrap_or_default())
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(error, chunks[2]);

    let help_text = if state.editing {
        "Enter - Save field | Esc - Stop editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save client | Esc - Cancel"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut ClientWizardState, area: Rect) {
    let field_names = [
        "First name",
        "Last name",
        "Email",
        "Phones (comma separated)",
    ];

    let field_values = [
        &state.form.first_name,
        &state.form.last_name,
        &state.form.email,
        &state.form.phones,
    ];

    let items: Vec<ListItem> = field_names
        .iter()
        .zip(field_values.iter())
        .enumerate()
        .map(|(i, (name, value))| {
            let selected = i == state.current_field as usize;
            let content = if selected && state.editing {
                Spans::from(vec![
                    Span::styled(format!("{}: ", name), Style::default().fg(Color::Yellow)),
                    Span::styled(
                        format!("{}|", value),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                let style = if selected {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };

                Spans::from(vec![
                    Span::styled(format!("{}: ", name), style),
                    Span::raw(value.as_str()),
                ])
            };

            ListItem::new(content)
        })
        .collect();

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Client Details"));

    f.render_widget(form_list, area);
}

/// Apply one key press to the wizard
pub fn handle_key(state: &mut ClientWizardState, code: KeyCode) -> Option<ClientWizardAction> {
    match code {
        KeyCode::Esc => {
            if state.editing {
                state.toggle_editing();
            } else {
                return Some(ClientWizardAction::Cancel);
            }
        }
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up if !state.editing => state.previous_field(),
        KeyCode::Down if !state.editing => state.next_field(),
        KeyCode::Char('s') if !state.editing => {
            if state.is_valid() {
                return Some(ClientWizardAction::Save(state.form.clone()));
            }
            state.error = Some("First name, last name and email are required".to_string());
        }
        _ if state.editing => state.edit_current_field(code),
        _ => {}
    }

    None
}

pub fn handle_input(state: &mut ClientWizardState) -> Result<Option<ClientWizardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }

    Ok(None)
}
