use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use grove_core::{init_logging, NotePath, Workspace};
use grove_tui::{load_config, read_config, App, Config, Event, EventHandler};
use log::{error, info};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};

/// grove - a terminal notebook of nested notes
///
/// ```bash
/// grove                           # Open the terminal UI on ./grove.db
/// grove --db ~/notes.db tree      # Print the outline
/// grove add "Inbox"               # New top-level note
/// grove add --parent 0 "Call Bob" "about the lease"
/// grove show 0/1                  # Print one note
/// grove search milk               # Paths and titles of matching notes
/// ```
#[derive(Parser, Debug)]
#[command(name = "grove", version, about, long_about = None)]
struct Cli {
    /// SQLite database holding the notes
    #[arg(long, global = true, default_value = "grove.db")]
    db: PathBuf,

    /// Keep notes in memory; no database, config or log file is written
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive terminal UI (default)
    Tui,
    /// Print every note as an indented outline
    Tree,
    /// Create a note and print its path
    Add {
        /// Parent path such as `0/2`; omitted for a top-level note
        #[arg(long)]
        parent: Option<NotePath>,
        title: String,
        content: Option<String>,
    },
    /// Print a note's title and content
    Show { path: NotePath },
    /// Case-insensitive substring search over titles and content
    Search { query: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config_for(&cli)?;
    if !cli.memory {
        start_logging(&config, &cli)?;
    }

    let mut workspace = if cli.memory {
        Workspace::in_memory()
    } else {
        Workspace::open(&cli.db)
            .with_context(|| format!("failed to open `{}`", cli.db.display()))?
    };

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => run_tui(workspace, config),
        Command::Tree => {
            print_tree(&workspace);
            Ok(())
        }
        Command::Add {
            parent,
            title,
            content,
        } => {
            let content = content.unwrap_or_default();
            let path = match parent {
                Some(parent) => workspace.create_child(&parent, title, content)?,
                None => workspace.create_root(title, content),
            };
            println!("{}", path);
            Ok(())
        }
        Command::Show { path } => {
            let note = workspace.resolve(&path)?;
            println!("{}", note.title());
            if !note.content().is_empty() {
                println!();
                println!("{}", note.content());
            }
            Ok(())
        }
        Command::Search { query } => {
            for hit in grove_core::search(workspace.tree().forest(), &query) {
                println!("{}\t{}", hit.path, hit.note.title());
            }
            Ok(())
        }
    }
}

fn sibling_path(db: &Path, name: &str) -> PathBuf {
    match db.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(name),
        _ => PathBuf::from(name),
    }
}

/// Config next to the database; `--memory` reads it but never creates it
fn config_for(cli: &Cli) -> Result<Config> {
    let path = sibling_path(&cli.db, "config.toml");
    if cli.memory {
        read_config(&path)
    } else {
        load_config(&path)
    }
}

fn start_logging(config: &Config, cli: &Cli) -> Result<()> {
    let mut log_dir = sibling_path(&cli.db, "logs");
    if log_dir.is_relative() {
        log_dir = std::env::current_dir()?.join(log_dir);
    }
    init_logging(&config.log_level, &log_dir)?;
    info!(
        "event=startup module=cli version={} memory={}",
        env!("CARGO_PKG_VERSION"),
        cli.memory
    );
    Ok(())
}

fn print_tree(workspace: &Workspace) {
    for hit in grove_core::gather_all(workspace.tree().forest()) {
        let indent = "  ".repeat(hit.path.depth() - 1);
        println!("{}{}  [{}]", indent, hit.note.title(), hit.path);
    }
}

fn run_tui(workspace: Workspace, config: Config) -> Result<()> {
    let mut app = App::new(workspace, config)?;
    app.initialize()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let event_handler = EventHandler::new(250);
    let result = run_app(&mut terminal, &mut app, &event_handler);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        error!("event=tui_exit module=cli error={:?}", err);
    }
    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_handler: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|f| grove_tui::ui::render(f, app))?;

        match event_handler.next()? {
            Event::Key(key) => grove_tui::event::handle_key_event(key, app),
            Event::Mouse(mouse) => grove_tui::event::handle_mouse_event(mouse, app),
            Event::Tick => app.tick(),
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parses_add_with_parent() {
        let cli = Cli::try_parse_from(["grove", "--memory", "add", "--parent", "0/1", "Title"]).unwrap();
        assert!(cli.memory);
        match cli.command {
            Some(Command::Add { parent, title, content }) => {
                assert_eq!(parent, Some("0/1".parse().unwrap()));
                assert_eq!(title, "Title");
                assert!(content.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_bad_path() {
        assert!(Cli::try_parse_from(["grove", "show", "a/b"]).is_err());
        assert!(Cli::try_parse_from(["grove", "show", ""]).is_err());
    }

    #[test]
    fn test_cli_defaults_to_tui() {
        let cli = Cli::try_parse_from(["grove"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.db, PathBuf::from("grove.db"));
    }

    #[test]
    fn test_memory_run_leaves_config_unwritten() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("grove.db");
        let db_arg = db.to_str().unwrap();

        let cli = Cli::try_parse_from(["grove", "--memory", "--db", db_arg, "tree"]).unwrap();
        config_for(&cli).unwrap();
        assert!(!dir.path().join("config.toml").exists());

        let cli = Cli::try_parse_from(["grove", "--db", db_arg, "tree"]).unwrap();
        config_for(&cli).unwrap();
        assert!(dir.path().join("config.toml").exists());
    }

    #[test]
    fn test_config_for_creates_missing_db_dir() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("new").join("grove.db");
        let cli = Cli::try_parse_from(["grove", "--db", db.to_str().unwrap(), "tree"]).unwrap();
        config_for(&cli).unwrap();
        assert!(dir.path().join("new").join("config.toml").exists());
    }

    #[test]
    fn test_sibling_path() {
        assert_eq!(sibling_path(Path::new("grove.db"), "logs"), PathBuf::from("logs"));
        assert_eq!(
            sibling_path(Path::new("/data/grove.db"), "config.toml"),
            PathBuf::from("/data/config.toml")
        );
    }
}
