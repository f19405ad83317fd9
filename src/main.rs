use std::sync::Arc;

use clap::{
    Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use songswipe::{
    cli::{self, SearchOptions},
    config::{self, Settings},
    error,
    search::SortMode,
    warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in with Spotify
    Auth(AuthOptions),

    /// Forget the stored token
    Logout,

    /// Search playlists by tags
    Search(SearchArgs),

    /// List your own playlists
    Playlists,

    /// Swipe through tracks into a new playlist
    Create(CreateOptions),

    /// Swipe through tracks into one of your playlists
    Edit(EditOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Redirect URL (or its fragment) holding an access token, skips the browser flow
    #[clap(long)]
    redirect_url: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Comma separated tags, e.g. "gym,chill"
    #[clap(long)]
    tags: Option<String>,

    /// Order of the results
    #[clap(long, value_enum, default_value_t = SortMode::Recommended)]
    sort: SortMode,

    /// Skip looking up follower counts
    #[clap(long)]
    no_followers: bool,
}

impl From<SearchArgs> for SearchOptions {
    fn from(args: SearchArgs) -> Self {
        SearchOptions {
            tags: args.tags,
            sort: args.sort,
            followers: !args.no_followers,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CreateOptions {
    /// Name of the new playlist
    #[clap(long)]
    name: Option<String>,

    #[clap(long, default_value = "")]
    description: String,

    /// Make the playlist public
    #[clap(long)]
    public: bool,

    #[command(flatten)]
    search: SearchArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct EditOptions {
    /// Id or name of the playlist to add tracks to
    #[clap(long)]
    playlist: Option<String>,

    #[command(flatten)]
    search: SearchArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }
    if let Command::Logout = cli.command {
        cli::logout().await;
        return;
    }

    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment file. Err: {}", e);
    }
    let settings = match Settings::from_env() {
        Ok(settings) => Arc::new(settings),
        Err(e) => error!(
            "{}\nAdd it to {}",
            e,
            config::data_dir().join(".env").display()
        ),
    };

    match cli.command {
        Command::Auth(opt) => cli::auth(settings, opt.redirect_url).await,
        Command::Search(opt) => cli::search(&settings, opt.into()).await,
        Command::Playlists => cli::playlists(&settings).await,
        Command::Create(opt) => {
            cli::create(
                &settings,
                opt.name,
                opt.description,
                opt.public,
                opt.search.into(),
            )
            .await
        }
        Command::Edit(opt) => cli::edit(&settings, opt.playlist, opt.search.into()).await,
        Command::Logout | Command::Completions(_) => {}
    }
}
