use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use leaderboard_rs::api::{ApiError, Client, GameQuery, UserQuery};
use leaderboard_rs::auth::{Credential, Session, parse_callback};
use leaderboard_rs::board::{Board, participant_styles};
use leaderboard_rs::config::Config;
use leaderboard_rs::models::{AddGameParticipant, AddGameRequest, UpdateUserRequest, UserUpdates};
use leaderboard_rs::storage::{self, TokenStore};
use leaderboard_rs::style::{EntryStyle, Tone};
use leaderboard_rs::stats;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "leaderboard",
    version,
    about = "Browse a ranked leaderboard, submit games, and assign stable entry colors"
)]
struct Cli {
    /// JSON config file (environment variables override it).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Backend base URL, e.g. https://leaderboard.example.com
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Credential file (default: platform config dir).
    #[arg(long, global = true)]
    token_path: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the hue sequence for a range of indices.
    Hue(HueArgs),
    /// Fetch ranked users (and optionally export them).
    Users(UsersArgs),
    /// Print elo statistics per region.
    Stats(UsersArgs),
    /// Fetch games by id or date.
    Games(GamesArgs),
    /// Confirm a game result with the mailed code.
    Confirm(ConfirmArgs),
    /// Print the login URL of the identity provider.
    Login,
    /// Store the tokens from the login redirect URL.
    Callback {
        /// Full redirect URL (or just its #fragment).
        url: String,
    },
    /// Forget the stored credential.
    Logout,
    /// Show who the stored credential belongs to.
    Whoami,
    /// Register or update the signed-in user's profile.
    Update(UpdateArgs),
    /// Submit a finished game.
    AddGame(AddGameArgs),
}

#[derive(Args, Debug)]
struct HueArgs {
    /// Number of entries to print.
    #[arg(short = 'n', long, default_value_t = 8)]
    count: usize,
    /// First index.
    #[arg(long, default_value_t = 0)]
    start: u64,
    #[command(flatten)]
    tone: ToneArgs,
}

#[derive(Args, Debug)]
struct ToneArgs {
    /// Saturation in 0..1 (default from config).
    #[arg(long)]
    saturation: Option<f64>,
    /// Lightness in 0..1 (default from config).
    #[arg(long)]
    lightness: Option<f64>,
}

impl ToneArgs {
    fn resolve(&self, base: Tone) -> Tone {
        Tone::new(
            self.saturation.unwrap_or(base.saturation),
            self.lightness.unwrap_or(base.lightness),
        )
    }
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct UsersArgs {
    #[arg(short, long, default_value = "")]
    region: String,
    /// Look up a single user.
    #[arg(short, long)]
    username: Option<String>,
    /// Users around this elo.
    #[arg(long)]
    elo: Option<i64>,
    /// Page size (max 100).
    #[arg(long)]
    pagesize: Option<u32>,
    /// Cursor from a previous page.
    #[arg(long, default_value = "")]
    lastpagekey: String,
    /// How many pages to follow.
    #[arg(long, default_value_t = 1)]
    pages: usize,
    /// Save standings to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    #[command(flatten)]
    tone: ToneArgs,
}

impl UsersArgs {
    fn query(&self) -> UserQuery {
        let mut q = match &self.username {
            Some(u) => UserQuery::username(u.as_str()),
            None => UserQuery::region(self.region.as_str()),
        };
        q.region = self.region.clone();
        if let Some(p) = self.pagesize {
            q = q.with_pagesize(p);
        }
        if let Some(e) = self.elo {
            q = q.with_elo(e);
        }
        q.after(self.lastpagekey.as_str())
    }
}

#[derive(Args, Debug)]
struct GamesArgs {
    #[arg(long, conflicts_with = "date")]
    gameid: Option<String>,
    /// Date as stored by the backend (e.g. 2024-05-01).
    #[arg(long)]
    date: Option<String>,
    #[command(flatten)]
    tone: ToneArgs,
}

#[derive(Args, Debug)]
struct ConfirmArgs {
    #[arg(long)]
    gameid: String,
    #[arg(long)]
    username: String,
    #[arg(long)]
    code: String,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long, default_value = "")]
    iconurl: String,
    #[arg(long, default_value_t = false)]
    disabled: bool,
}

#[derive(Args, Debug)]
struct AddGameArgs {
    /// Points awarded per placement step.
    #[arg(long, default_value_t = 0)]
    placement_points: i64,
    /// Participant as username:team:placement:points (repeatable).
    #[arg(short, long = "participant", required = true)]
    participants: Vec<String>,
}

fn parse_participant(s: &str) -> Result<AddGameParticipant> {
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    let [username, team, placement, points] = parts.as_slice() else {
        bail!("invalid participant {:?}, expected username:team:placement:points", s);
    };
    if username.is_empty() {
        bail!("invalid participant {:?}: empty username", s);
    }
    let num = |field: &str, v: &str| -> Result<i64> {
        v.parse::<i64>()
            .with_context(|| format!("invalid {} {:?} in participant {:?}", field, v, s))
    };
    Ok(AddGameParticipant {
        username: username.to_string(),
        team: num("team", *team)?,
        placement: num("placement", *placement)?,
        points: num("points", *points)?,
    })
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 2 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.2}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut cfg = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        cfg.api_url = url;
    }
    if let Some(p) = cli.token_path {
        cfg.token_path = Some(p);
    }

    match cli.cmd {
        Command::Hue(args) => cmd_hue(&cfg, args),
        Command::Users(args) => cmd_users(&cfg, args),
        Command::Stats(args) => cmd_stats(&cfg, args),
        Command::Games(args) => cmd_games(&cfg, args),
        Command::Confirm(args) => cmd_confirm(&cfg, args),
        Command::Login => cmd_login(&cfg),
        Command::Callback { url } => cmd_callback(&cfg, &url),
        Command::Logout => {
            token_store(&cfg).clear()?;
            eprintln!("Signed out");
            Ok(())
        }
        Command::Whoami => cmd_whoami(&cfg),
        Command::Update(args) => cmd_update(&cfg, args),
        Command::AddGame(args) => cmd_add_game(&cfg, args),
    }
}

fn token_store(cfg: &Config) -> TokenStore {
    match &cfg.token_path {
        Some(p) => TokenStore::new(p),
        None => TokenStore::default_location(),
    }
}

fn client(cfg: &Config) -> Result<Client> {
    Ok(Client::new(cfg.api_url.as_str())?)
}

fn cmd_hue(cfg: &Config, args: HueArgs) -> Result<()> {
    let tone = args.tone.resolve(cfg.tone);
    for index in (args.start..=u64::MAX).take(args.count) {
        let style = EntryStyle::for_index(index, tone);
        println!("{}\t{}\t{}\t{}", index, style.hsl.h_deg, style.hex, style.css());
    }
    Ok(())
}

fn fetch_board(cfg: &Config, args: &UsersArgs) -> Result<Board> {
    let client = client(cfg)?;
    let mut board = Board::new(args.tone.resolve(cfg.tone));
    for page in client.fetch_user_pages(&args.query(), args.pages.max(1))? {
        board.push_page(page);
    }
    Ok(board)
}

fn cmd_users(cfg: &Config, args: UsersArgs) -> Result<()> {
    let board = fetch_board(cfg, &args)?;
    for row in board.rows() {
        println!(
            "{:>4}  {:<24} {:>6}  {:<12} {}",
            row.rank, row.user.username, row.user.elo, row.user.region, row.style.hex
        );
    }
    if let Some(key) = board.next_page_key() {
        eprintln!("More results: --lastpagekey {}", key);
    }

    if let Some(path) = args.out.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => storage::save_standings_csv(board.rows(), path)?,
            "json" => storage::save_standings_json(board.rows(), path)?,
            other => bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} rows to {}", board.rows().len(), path.display());
    }
    Ok(())
}

fn cmd_stats(cfg: &Config, args: UsersArgs) -> Result<()> {
    let board = fetch_board(cfg, &args)?;
    let users: Vec<_> = board.rows().iter().map(|r| r.user.clone()).collect();
    for s in stats::region_summary(&users) {
        println!(
            "{}  count={} disabled={}  min={} max={} mean={} median={}",
            if s.region.is_empty() { "-" } else { s.region.as_str() },
            s.count,
            s.disabled,
            fmt_opt(s.min.map(|v| v as f64)),
            fmt_opt(s.max.map(|v| v as f64)),
            fmt_opt(s.mean),
            fmt_opt(s.median)
        );
    }
    Ok(())
}

fn cmd_games(cfg: &Config, args: GamesArgs) -> Result<()> {
    let query = match (args.gameid, args.date) {
        (Some(id), _) => GameQuery::by_id(id),
        (None, Some(date)) => GameQuery::by_date(date),
        (None, None) => bail!("pass --gameid or --date"),
    };
    let tone = args.tone.resolve(cfg.tone);
    let resp = client(cfg)?.fetch_games(&query)?;
    for game in &resp.games {
        println!(
            "{}  {}{}",
            game.gameid,
            game.date,
            if game.readonly { "  (confirmed)" } else { "" }
        );
        for (p, style) in participant_styles(game, tone) {
            println!(
                "  #{:<2} team {:<2} {:<24} {:>5} pts  elo {:>5} ({:+})  {}{}",
                p.placement,
                p.team,
                p.username,
                p.points,
                p.elo,
                p.elo_update,
                style.hex,
                if p.confirmed { "" } else { "  unconfirmed" }
            );
        }
    }
    Ok(())
}

fn cmd_confirm(cfg: &Config, args: ConfirmArgs) -> Result<()> {
    let msg = client(cfg)?.confirm_game(&args.gameid, &args.username, &args.code)?;
    println!("{}", msg);
    Ok(())
}

fn cmd_login(cfg: &Config) -> Result<()> {
    if cfg.cognito_domain.is_empty() || cfg.cognito_client_id.is_empty() {
        bail!("identity provider not configured: set LEADERBOARD_COGNITO_DOMAIN and LEADERBOARD_COGNITO_CLIENT_ID");
    }
    println!("{}", cfg.auth().login_url(&cfg.redirect_uri));
    Ok(())
}

fn cmd_callback(cfg: &Config, url: &str) -> Result<()> {
    let credential = Credential::from_callback(parse_callback(url), Utc::now())?;
    let claims = credential.claims()?;
    let store = token_store(cfg);
    store.save(&credential)?;
    eprintln!(
        "Signed in as {} until {} (stored in {})",
        claims.display_name(),
        credential.expires_at,
        store.path().display()
    );
    Ok(())
}

fn cmd_whoami(cfg: &Config) -> Result<()> {
    let credential = token_store(cfg)
        .load()?
        .ok_or_else(|| anyhow!("not signed in; run `leaderboard login`"))?;
    let claims = credential.claims()?;
    println!("{}", claims.display_name());
    if let Some(email) = &claims.email {
        println!("email:   {}", email);
    }
    let state = if credential.is_expired(Utc::now()) { "expired" } else { "valid" };
    println!("expires: {} ({})", credential.expires_at, state);
    Ok(())
}

/// Run an authorized call with the stored credential. When the backend or the
/// session reports that sign-in is needed, the stored credential is dropped.
fn with_session<T>(
    cfg: &Config,
    call: impl FnOnce(&Client, &mut Session) -> Result<T, ApiError>,
) -> Result<T> {
    let store = token_store(cfg);
    let mut session = match store.load()? {
        Some(c) => Session::with_credential(c),
        None => Session::signed_out(),
    };
    match call(&client(cfg)?, &mut session) {
        Ok(v) => Ok(v),
        Err(e) if e.needs_sign_in() => {
            store.clear()?;
            if !cfg.cognito_domain.is_empty() {
                eprintln!("Sign in at: {}", cfg.auth().login_url(&cfg.redirect_uri));
            }
            Err(anyhow::Error::new(e).context("sign-in required"))
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_update(cfg: &Config, args: UpdateArgs) -> Result<()> {
    let request = UpdateUserRequest {
        user_updates: UserUpdates {
            title: args.title,
            iconurl: args.iconurl,
            disabled: args.disabled,
        },
    };
    let resp = with_session(cfg, |c, s| c.update_user(s, &request))?;
    let u = resp.updated_user;
    println!("{} ({}) elo {} region {}", u.username, u.title, u.elo, u.region);
    Ok(())
}

fn cmd_add_game(cfg: &Config, args: AddGameArgs) -> Result<()> {
    let participants = args
        .participants
        .iter()
        .map(|s| parse_participant(s))
        .collect::<Result<Vec<_>>>()?;
    let request = AddGameRequest {
        placement_points: args.placement_points,
        participants,
    };
    let resp = with_session(cfg, |c, s| c.add_game(s, &request))?;
    println!("{}", resp.gameid);
    eprintln!("{}", resp.message);
    Ok(())
}
