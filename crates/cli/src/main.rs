use anyhow::Context;
use clap::{Parser, Subcommand};
use lib::bookmarks::{BookmarkStore, BookmarkedQuestion, JsonFileRepository};
use lib::client::GatewayClient;
use lib::editor::Editor;
use lib::explainer::CannedExplainer;
use lib::view::{ChatView, ExplainerTab, ExplainerView, Role, SolverView};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "codepad")]
#[command(about = "Codepad CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and default files (config, bookmarks).
    Init {
        /// Config file path (default: CODEPAD_CONFIG_PATH or ~/.codepad/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Run the gateway (HTTP proxy to the Gemini API). The API key comes from GEMINI_API_KEY or provider.apiKey.
    Gateway {
        /// Config file path (default: CODEPAD_CONFIG_PATH or ~/.codepad/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// HTTP port (default from config or 15151)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Chat with the assistant via the gateway (interactive). `/share` asks about the attached code; `/exit` quits.
    Chat {
        /// Config file path (default: CODEPAD_CONFIG_PATH or ~/.codepad/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Source file attached as context to every question.
        #[arg(long, value_name = "FILE")]
        code: Option<PathBuf>,
    },

    /// Explain a source file (explanation, complexity, optimizations).
    Explain {
        /// Config file path (default: CODEPAD_CONFIG_PATH or ~/.codepad/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Source file to explain.
        #[arg(long, value_name = "FILE")]
        code: PathBuf,
    },

    /// Show the simulated run output for a source file.
    Run {
        /// Source file to run.
        file: PathBuf,
    },

    /// Manage bookmarked questions.
    Bookmark {
        /// Config file path (default: CODEPAD_CONFIG_PATH or ~/.codepad/config.json)
        #[arg(long, short, value_name = "PATH", global = true)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        command: BookmarkCommands,
    },
}

#[derive(Subcommand)]
enum BookmarkCommands {
    /// Bookmark a code problem.
    Add {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Source file holding the code (default: the editor's sample).
        #[arg(long, value_name = "FILE")]
        code: Option<PathBuf>,
    },

    /// List bookmarks.
    List,

    /// Remove a bookmark by id.
    Remove { id: String },

    /// Ask the assistant to explain and fix a bookmarked problem.
    Solve { id: String },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("codepad {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Gateway { config, port }) => {
            if let Err(e) = run_gateway(config, port).await {
                log::error!("gateway failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Chat { config, code }) => {
            if let Err(e) = run_chat(config, code).await {
                log::error!("chat failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Explain { config, code }) => {
            if let Err(e) = run_explain(config, &code).await {
                log::error!("explain failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Run { file }) => {
            if let Err(e) = run_file(&file) {
                log::error!("run failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Bookmark { config, command }) => {
            if let Err(e) = run_bookmark(config, command).await {
                log::error!("bookmark failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let dir = lib::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_gateway(config_path: Option<PathBuf>, port: Option<u16>) -> anyhow::Result<()> {
    let (mut config, _) = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    if lib::config::resolve_api_key(&config).is_none() {
        log::warn!("no API key configured (GEMINI_API_KEY or provider.apiKey); provider calls will fail");
    }
    log::info!("starting gateway on {}:{}", config.gateway.bind, config.gateway.port);
    lib::gateway::run_gateway(config).await
}

async fn run_chat(config_path: Option<PathBuf>, code_path: Option<PathBuf>) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let (config, _) = lib::config::load_config(config_path)?;
    let code = code_path.as_deref().map(read_source).transpose()?;
    let client = GatewayClient::new(config.gateway.base_url());
    let mut view = ChatView::new();

    for message in view.messages() {
        println!("< {}", message.content);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("/exit") || input.eq_ignore_ascii_case("/quit") {
            break;
        }

        // `/share` asks about the attached file.
        let input = match (input, code.as_deref()) {
            ("/share", Some(c)) => lib::prompt::share_code(c),
            ("/share", None) => {
                eprintln!("no code attached; start chat with --code FILE");
                continue;
            }
            _ => input.to_string(),
        };

        let seen = view.messages().len();
        if !view.send(&client, &input, code.as_deref()).await {
            continue;
        }
        for message in &view.messages()[seen..] {
            if message.role != Role::Assistant {
                continue;
            }
            if message.is_code {
                println!("```\n{}\n```", message.content);
            } else {
                println!("< {}", message.content);
            }
        }
        if let Some(failure) = view.last_failure() {
            eprintln!("chat error: {}", failure.user_message());
        }
    }

    Ok(())
}

async fn run_explain(config_path: Option<PathBuf>, code_path: &Path) -> anyhow::Result<()> {
    let (config, _) = lib::config::load_config(config_path)?;
    let code = read_source(code_path)?;
    let source = CannedExplainer::from_config(&config.explainer);
    let mut view = ExplainerView::new();
    if !view.explain(&source, &code).await {
        anyhow::bail!("nothing to explain: {} is empty", code_path.display());
    }
    for (heading, tab) in [
        ("Explanation", ExplainerTab::Explanation),
        ("Complexity", ExplainerTab::Complexity),
        ("Optimizations", ExplainerTab::Optimizations),
    ] {
        view.select_tab(tab);
        println!("## {}\n\n{}\n", heading, view.tab_content().unwrap_or(""));
    }
    Ok(())
}

fn run_file(path: &Path) -> anyhow::Result<()> {
    let mut editor = Editor::new(read_source(path)?);
    println!("{}", editor.run());
    Ok(())
}

async fn run_bookmark(config_path: Option<PathBuf>, command: BookmarkCommands) -> anyhow::Result<()> {
    let (config, path) = lib::config::load_config(config_path)?;
    let file = lib::config::resolve_bookmarks_path(&config, &path);
    let mut store = BookmarkStore::open(JsonFileRepository::new(&file))
        .with_context(|| format!("opening bookmarks at {}", file.display()))?;

    match command {
        BookmarkCommands::Add {
            title,
            description,
            code,
        } => {
            let editor = match code {
                Some(p) => Editor::new(read_source(&p)?),
                None => Editor::default(),
            };
            let question = editor.bookmark(&title, &description)?;
            let id = question.id.clone();
            if store.add(question)? {
                println!("bookmarked {} ({})", title.trim(), id);
            } else {
                println!("bookmark {} already exists", id);
            }
        }
        BookmarkCommands::List => {
            if store.list().is_empty() {
                println!("no bookmarks");
            }
            for q in store.list() {
                print_bookmark(q);
            }
        }
        BookmarkCommands::Remove { id } => {
            if !store.remove(&id)? {
                anyhow::bail!("no bookmark with id {}", id);
            }
            println!("removed {}", id);
        }
        BookmarkCommands::Solve { id } => {
            let question = store
                .get(&id)
                .cloned()
                .with_context(|| format!("no bookmark with id {}", id))?;
            let client = GatewayClient::new(config.gateway.base_url());
            let mut view = SolverView::new();
            view.solve(&client, &question).await;
            println!("{}", view.solution());
        }
    }
    Ok(())
}

fn print_bookmark(q: &BookmarkedQuestion) {
    println!("{}  {}  {}", q.id, q.timestamp, q.title);
    if !q.description.trim().is_empty() {
        println!("    {}", q.description.trim());
    }
}
