use std::io;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use client_directory::{
    config, db, logging,
    ui::{
        client_wizard::{
            handle_input as handle_client_wizard_input, render_client_wizard, ClientForm,
            ClientWizardAction, ClientWizardState,
        },
        clients::{
            handle_input as handle_clients_input, load_clients, render_clients, ClientAction,
            ClientsState,
        },
    },
    ClientChanges, ClientFilter, Directory, DirectoryError, Phones,
};

#[derive(Parser)]
#[command(name = "client-directory", version, about = "Manage clients and their phone numbers")]
struct Cli {
    /// PostgreSQL URL; defaults to DATABASE_URL
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the tables if they do not exist
    Init,
    /// Add a client with optional phone numbers
    Add {
        first_name: String,
        last_name: String,
        email: String,
        #[arg(long = "phone")]
        phones: Vec<String>,
    },
    /// Add a phone number to an existing client
    AddPhone { client_id: i32, phone: String },
    /// Change client fields and optionally replace the phone set
    Change(ChangeArgs),
    /// Remove a phone number from a client
    DeletePhone { client_id: i32, phone: String },
    /// Remove a client and all of their phone numbers
    Delete { client_id: i32 },
    /// Search clients; every supplied filter must match
    Find(FindArgs),
    /// List a client's phone numbers
    Phones { client_id: i32 },
    /// Run a sample session against the database
    Demo,
    /// Browse and edit clients interactively
    Browse,
}

#[derive(Args)]
struct ChangeArgs {
    client_id: i32,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// Replacement phone set; may be repeated
    #[arg(long = "phone", conflicts_with = "clear_phones")]
    phones: Vec<String>,
    /// Remove every phone number of the client
    #[arg(long)]
    clear_phones: bool,
}

impl ChangeArgs {
    fn to_changes(&self) -> ClientChanges {
        let phones = if self.clear_phones {
            Some(Phones::empty())
        } else if self.phones.is_empty() {
            None
        } else {
            Some(Phones::from(self.phones.clone()))
        };

        ClientChanges {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phones,
        }
    }
}

#[derive(Args)]
struct FindArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
}

impl From<FindArgs> for ClientFilter {
    fn from(args: FindArgs) -> Self {
        ClientFilter {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init(cli.database_url)?;

    // The browser owns the terminal; log lines would corrupt the screen
    if !matches!(cli.command, Command::Browse) {
        logging::init(&config.log_level)?;
    }

    let mut directory = db::init(&config).await?;
    tracing::debug!("database connection established");

    let result = run_command(&mut directory, cli.command).await;
    directory.close().await?;

    result
}

async fn run_command(directory: &mut Directory, command: Command) -> Result<()> {
    match command {
        Command::Init => println!("Schema is ready"),
        Command::Add { first_name, last_name, email, phones } => {
            let phones = (!phones.is_empty()).then(|| Phones::from(phones));
            let id = directory
                .add_client(&first_name, &last_name, &email, phones)
                .await?;
            println!("{}", id);
        }
        Command::AddPhone { client_id, phone } => {
            directory.add_phone(client_id, &phone).await?;
        }
        Command::Change(args) => {
            directory.change_client(args.client_id, &args.to_changes()).await?;
        }
        Command::DeletePhone { client_id, phone } => {
            let removed = directory.delete_phone(client_id, &phone).await?;
            println!("Removed {} phone number(s)", removed);
        }
        Command::Delete { client_id } => {
            let removed = directory.delete_client(client_id).await?;
            println!("Removed {} client(s)", removed);
        }
        Command::Find(args) => {
            let filter = ClientFilter::from(args);
            for client in directory.find_client(&filter).await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    client.id, client.first_name, client.last_name, client.email
                );
            }
        }
        Command::Phones { client_id } => {
            for number in directory.get_phones(client_id).await? {
                println!("{}", number.phone.unwrap_or_default());
            }
        }
        Command::Demo => run_demo(directory).await?,
        Command::Browse => run_browser(directory).await?,
    }

    Ok(())
}

async fn run_demo(directory: &mut Directory) -> Result<()> {
    let ivan = directory
        .add_client("Ivan", "Petrov", "ivan@example.com", Some("+79991112233".into()))
        .await?;
    let maria = directory
        .add_client(
            "Maria",
            "Sidorova",
            "maria@example.com",
            Some(["+79994445566", "+79997778899"].into()),
        )
        .await?;
    directory
        .add_client("Anna", "Kozlova", "anna@example.com", None)
        .await?;

    directory.add_phone(ivan, "+79990001122").await?;
    directory
        .change_client(
            ivan,
            &ClientChanges::new()
                .email("ivan_new@example.com")
                .phones(["+79993334455"]),
        )
        .await?;
    directory.delete_phone(ivan, "+79993334455").await?;

    let by_name = directory
        .find_client(&ClientFilter::new().first_name("Ivan"))
        .await?;
    println!("Search by first name 'Ivan': {:?}", by_name);
    let by_phone = directory
        .find_client(&ClientFilter::new().phone("+79994445566"))
        .await?;
    println!("Search by phone '+79994445566': {:?}", by_phone);

    directory.delete_client(maria).await?;

    Ok(())
}

// Represents the current screen of the browser
enum AppScreen {
    Clients,
    ClientWizard,
}

struct AppState<'a> {
    db: &'a mut Directory,
    screen: AppScreen,
    filter: ClientFilter,
    clients_state: Option<ClientsState>,
    client_wizard_state: Option<ClientWizardState>,
}

async fn run_browser(directory: &mut Directory) -> Result<()> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState {
        db: directory,
        screen: AppScreen::Clients,
        filter: ClientFilter::new(),
        clients_state: None,
        client_wizard_state: None,
    };

    let result = match load_clients_screen(&mut app_state).await {
        Ok(()) => run_app(&mut terminal, &mut app_state).await,
        Err(err) => Err(err),
    };

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState<'_>) -> Result<()> {
    loop {
        terminal.draw(|f| match app_state.screen {
            AppScreen::Clients => {
                if let Some(state) = &mut app_state.clients_state {
                    render_clients(f, state);
                }
            }
            AppScreen::ClientWizard => {
                if let Some(state) = &mut app_state.client_wizard_state {
                    render_client_wizard(f, state);
                }
            }
        })?;

        let should_quit = match app_state.screen {
            AppScreen::Clients => handle_clients_screen(app_state).await?,
            AppScreen::ClientWizard => handle_client_wizard_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

async fn load_clients_screen(app_state: &mut AppState<'_>) -> Result<()> {
    let entries = load_clients(app_state.db, &app_state.filter).await?;
    let filtered = app_state.filter != ClientFilter::new();

    app_state.clients_state = Some(ClientsState::new(entries).filtered(filtered));
    app_state.screen = AppScreen::Clients;

    Ok(())
}

async fn handle_clients_screen(app_state: &mut AppState<'_>) -> Result<bool> {
    let action = match &mut app_state.clients_state {
        Some(state) => handle_clients_input(state)?,
        None => return Ok(false),
    };

    match action {
        Some(ClientAction::Quit) => return Ok(true),
        Some(ClientAction::NewClient) => {
            app_state.client_wizard_state = Some(ClientWizardState::new());
            app_state.screen = AppScreen::ClientWizard;
        }
        Some(ClientAction::EditClient(client_id)) => {
            if let Some(client) = app_state.db.get_client(client_id).await? {
                let phones: Vec<String> = app_state
                    .db
                    .get_phones(client_id)
                    .await?
                    .into_iter()
                    .filter_map(|p| p.phone)
                    .collect();
                app_state.client_wizard_state = Some(ClientWizardState::from_existing(client, &phones));
                app_state.screen = AppScreen::ClientWizard;
            } else {
                load_clients_screen(app_state).await?;
            }
        }
        Some(ClientAction::DeleteClient(client_id)) => {
            app_state.db.delete_client(client_id).await?;
            load_clients_screen(app_state).await?;
            if let Some(state) = &mut app_state.clients_state {
                state.set_status(format!("Deleted client #{}", client_id));
            }
        }
        Some(ClientAction::Search(filter)) => {
            app_state.filter = filter;
            load_clients_screen(app_state).await?;
        }
        None => {}
    }

    Ok(false)
}

async fn handle_client_wizard_screen(app_state: &mut AppState<'_>) -> Result<bool> {
    let action = match &mut app_state.client_wizard_state {
        Some(state) => handle_client_wizard_input(state)?,
        None => return Ok(false),
    };

    match action {
        Some(ClientWizardAction::Cancel) => {
            app_state.client_wizard_state = None;
            load_clients_screen(app_state).await?;
        }
        Some(ClientWizardAction::Save(form)) => match save_client(app_state.db, &form).await {
            Ok(()) => {
                app_state.client_wizard_state = None;
                load_clients_screen(app_state).await?;
            }
            Err(err @ (DirectoryError::UniqueViolation { .. } | DirectoryError::ForeignKeyViolation { .. })) => {
                if let Some(state) = &mut app_state.client_wizard_state {
                    state.error = Some(err.to_string());
                }
            }
            Err(err) => return Err(err.into()),
        },
        None => {}
    }

    Ok(false)
}

async fn save_client(db: &mut Directory, form: &ClientForm) -> client_directory::Result<()> {
    match form.client_id {
        Some(client_id) => db.change_client(client_id, &form.to_changes()).await,
        None => {
            let phones = form.phones();
            let phones = (!phones.is_empty()).then_some(phones);
            db.add_client(
                form.first_name.trim(),
                form.last_name.trim(),
                form.email.trim(),
                phones,
            )
            .await
            .map(|_| ())
        }
    }
}
