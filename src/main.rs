//! WICKET — terminal bet slip
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the session, wallet and betting backend into a bet slip, and
//! reads slip commands from stdin until `quit` or Ctrl+C.

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use secrecy::SecretString;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use wicket::account::{Session, SharedWallet, UserProfile};
use wicket::api::{BettingApi, DryRunApi, HttpBettingApi};
use wicket::config::AppConfig;
use wicket::history::{BetHistory, HistoryTab};
use wicket::money::{format_amount_2dp_in, format_amount_in};
use wicket::slip::quick::QuickBet;
use wicket::slip::validation::parse_stake;
use wicket::slip::{AddOutcome, BetSlip};
use wicket::types::{BetSubmission, BetType, MatchListing, Selection, TeamSide, WicketError};

const BANNER: &str = r#"
 __      __ ___  ___  _  __ ___  _____
 \ \    / /|_ _|/ __|| |/ /| __||_   _|
  \ \/\/ /  | || (__ | ' < | _|   | |
   \_/\_/  |___|\___||_|\_\|___|  |_|

  Bet slip terminal v0.1.0 (type `help`)
"#;

const HELP: &str = "\
commands:
  matches                      refresh and list fixtures
  pick <match> <1|2>           add (or remove) a match-winner selection
  unpick <n>                   remove the n-th selection
  stake <n> <amount>           set the stake on the n-th selection
  quick <amount>               same stake on every selection
  type <single|multiple>       switch bet type
  show                         print the slip
  place                        place the slip
  quickbet <match> <1|2> [amt] place a single bet straight away
  history [tab] [search]       placed bets (tab: all|won|lost|pending)
  balance                      refresh the wallet balance
  login <token> | logout
  clear                        empty the slip
  quit";

/// Everything the command loop touches.
struct App {
    cfg: AppConfig,
    session: Arc<Session>,
    wallet: SharedWallet,
    api: Box<dyn BettingApi>,
    slip: BetSlip,
    /// Fixtures last fetched from the backend.
    matches: Vec<MatchListing>,
}

impl App {
    fn money(&self, amount: Decimal) -> String {
        format_amount_in(&self.cfg.client.currency_symbol, amount)
    }
}

enum Flow {
    Continue,
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load("config.toml")?;
    init_logging();

    println!("{BANNER}");
    info!(
        client = %cfg.client.name,
        api_enabled = cfg.api.enabled,
        min_stake = %cfg.slip.min_stake,
        fixtures = cfg.matches.len(),
        "WICKET starting up"
    );

    let mut app = build_app(cfg).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                match handle_command(&mut app, line.trim()).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => {
                        error!(error = %e, "Command failed");
                        println!("error: {e:#}");
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!(selections = app.slip.len(), "WICKET shut down cleanly.");
    Ok(())
}

/// Wire backend, session, wallet and slip from configuration.
async fn build_app(cfg: AppConfig) -> Result<App> {
    let (api, session): (Box<dyn BettingApi>, Session) = if cfg.api.enabled {
        let api = HttpBettingApi::new(&cfg.api.base_url, cfg.api.timeout_secs)?;
        let session = match AppConfig::resolve_env(&cfg.api.token_env) {
            Ok(token) => Session::authenticated(api_user(), SecretString::new(token)),
            Err(e) => {
                warn!(error = %e, "No API token, browsing anonymously");
                Session::anonymous()
            }
        };
        (Box::new(api) as Box<dyn BettingApi>, session)
    } else {
        info!(balance = %cfg.wallet.demo_balance, "Using dry-run backend");
        let demo_user = UserProfile {
            id: "1".to_string(),
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
        };
        (
            Box::new(DryRunApi::new(cfg.wallet.demo_balance, cfg.matches.clone()))
                as Box<dyn BettingApi>,
            Session::authenticated(demo_user, SecretString::new("dry-run".to_string())),
        )
    };

    let session = Arc::new(session);
    let wallet = SharedWallet::default();
    if let Some(token) = session.token() {
        if let Err(e) = wallet.refresh(api.as_ref(), &token).await {
            warn!(error = %e, "Initial wallet refresh failed");
        }
    }

    let matches = fetch_matches(api.as_ref(), &cfg.matches).await;
    let slip = BetSlip::new(
        cfg.slip.stake_rules(),
        Arc::new(wallet.clone()),
        session.clone(),
    );

    Ok(App {
        cfg,
        session,
        wallet,
        api,
        slip,
        matches,
    })
}

/// Fixtures from the backend, or the configured ones when it is unreachable.
async fn fetch_matches(api: &dyn BettingApi, fallback: &[MatchListing]) -> Vec<MatchListing> {
    match api.matches().await {
        Ok(matches) => {
            info!(backend = api.name(), count = matches.len(), "Fixtures loaded");
            matches
        }
        Err(e) => {
            warn!(error = %e, "Fixture fetch failed, using configured fixtures");
            fallback.to_vec()
        }
    }
}

fn api_user() -> UserProfile {
    UserProfile {
        id: std::env::var("WICKET_USER_ID").unwrap_or_default(),
        name: std::env::var("WICKET_USER_NAME").unwrap_or_else(|_| "account holder".into()),
        email: std::env::var("WICKET_USER_EMAIL").unwrap_or_default(),
    }
}

/// Run one command line against the app.
async fn handle_command(app: &mut App, line: &str) -> Result<Flow> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return Ok(Flow::Continue);
    };
    let args: Vec<&str> = parts.collect();

    match cmd {
        "help" | "?" => println!("{HELP}"),
        "quit" | "exit" => return Ok(Flow::Quit),
        "matches" => {
            app.matches = fetch_matches(app.api.as_ref(), &app.cfg.matches).await;
            for listing in &app.matches {
                println!("  {listing}");
            }
        }
        "pick" => {
            let (match_id, side) = match_and_side(&args)?;
            let selection = pick(app, match_id, side)?;
            let label = selection.to_string();
            match app.slip.toggle_selection(selection) {
                AddOutcome::Added => println!("added: {label}"),
                AddOutcome::Removed => println!("removed: {label}"),
                AddOutcome::Duplicate => println!("already on slip: {label}"),
                AddOutcome::InvalidOdds => println!("cannot price: {label}"),
            }
            print_slip(app);
        }
        "unpick" => {
            let id = nth_selection_id(&app.slip, args.first())?;
            app.slip.remove_selection(&id);
            print_slip(app);
        }
        "stake" => {
            let id = nth_selection_id(&app.slip, args.first())?;
            let raw = args.get(1).copied().unwrap_or("");
            if let Err(e) = app.slip.set_stake(&id, raw) {
                println!("  ! {e}");
            }
            print_slip(app);
        }
        "quick" => {
            let amount = parse_stake(args.first().copied().unwrap_or(""));
            if !app.slip.rules().quick_stakes.contains(&amount) {
                warn!(amount = %amount, "Quick stake is not a configured preset");
            }
            app.slip.apply_quick_stake(amount);
            print_slip(app);
        }
        "type" => {
            let bet_type: BetType = args
                .first()
                .ok_or_else(|| anyhow!("usage: type <single|multiple>"))?
                .parse()?;
            if !app.slip.set_bet_type(bet_type) {
                println!("  ! Multiple needs at least two selections");
            }
            print_slip(app);
        }
        "show" => print_slip(app),
        "clear" => {
            app.slip.clear_all();
            println!("slip cleared");
        }
        "place" => place_slip(app).await?,
        "quickbet" => {
            let (match_id, side) = match_and_side(&args)?;
            let selection = pick(app, match_id, side)?;
            let mut quick = QuickBet::with_stake(
                selection,
                app.cfg.slip.stake_rules(),
                app.cfg.slip.quick_bet_default_stake,
            );
            if let Some(raw) = args.get(2) {
                quick.set_stake_raw(raw);
            }
            println!(
                "quick bet: {} | stake {} | potential win {}",
                quick.selection(),
                app.money(quick.stake()),
                format_amount_2dp_in(&app.cfg.client.currency_symbol, quick.potential_win()),
            );
            let submission = quick.into_submission()?;
            submit(app, submission).await?;
        }
        "history" => {
            let tab: HistoryTab = match args.first() {
                Some(t) => t.parse()?,
                None => HistoryTab::All,
            };
            let search = args.get(1..).map(|s| s.join(" ")).unwrap_or_default();
            let token = require_token(app)?;
            let history = BetHistory::new(app.api.bet_history(&token).await?);
            for (tab, count) in history.tab_counts() {
                print!("{tab:?}({count}) ");
            }
            println!();
            for bet in history.filter(tab, &search) {
                println!("  {bet}");
            }
            println!("  {}", history.stats());
        }
        "balance" => {
            let token = require_token(app)?;
            let balance = app.wallet.refresh(app.api.as_ref(), &token).await?;
            println!("balance: {}", app.money(balance));
        }
        "login" => {
            let token = args.first().ok_or_else(|| anyhow!("usage: login <token>"))?;
            app.session
                .login(api_user(), SecretString::new(token.to_string()));
            let token = require_token(app)?;
            if let Err(e) = app.wallet.refresh(app.api.as_ref(), &token).await {
                warn!(error = %e, "Wallet refresh after login failed");
            }
        }
        "logout" => app.session.logout(),
        other => println!("unknown command `{other}` (try `help`)"),
    }
    Ok(Flow::Continue)
}

fn match_and_side<'a>(args: &[&'a str]) -> Result<(&'a str, TeamSide)> {
    match args {
        [match_id, side, ..] => Ok((*match_id, side.parse()?)),
        _ => Err(anyhow!("usage: <match> <1|2>")),
    }
}

fn pick(app: &App, match_id: &str, side: TeamSide) -> Result<Selection> {
    let listing = app
        .matches
        .iter()
        .find(|m| m.id == match_id)
        .ok_or_else(|| anyhow!("no match with id {match_id}"))?;
    Ok(Selection::match_winner(listing, side)?)
}

/// Resolve a 1-based position on the slip to a selection id.
fn nth_selection_id(slip: &BetSlip, arg: Option<&&str>) -> Result<String> {
    let n: usize = arg
        .ok_or_else(|| anyhow!("selection number required"))?
        .parse()
        .context("selection number must be a positive integer")?;
    slip.selections()
        .get(n.wrapping_sub(1))
        .map(|s| s.id.clone())
        .ok_or_else(|| anyhow!("no selection #{n} (slip has {})", slip.len()))
}

fn require_token(app: &App) -> Result<SecretString> {
    app.session
        .token()
        .ok_or_else(|| anyhow!(WicketError::NotAuthenticated))
}

async fn place_slip(app: &mut App) -> Result<()> {
    let submission = app.slip.prepare_submission()?;
    if submit(app, submission).await? {
        app.slip.clear_all();
    }
    Ok(())
}

/// Send a submission; returns whether the backend accepted it.
async fn submit(app: &App, submission: BetSubmission) -> Result<bool> {
    let token = require_token(app)?;
    let receipt = app.api.place_bet(&submission, &token).await?;
    println!("{receipt}");
    info!(
        backend = app.api.name(),
        bet_id = %receipt.bet_id,
        accepted = receipt.accepted,
        "Bet submitted"
    );
    if let Err(e) = app.wallet.refresh(app.api.as_ref(), &token).await {
        warn!(error = %e, "Wallet refresh after bet failed");
    }
    Ok(receipt.accepted)
}

fn print_slip(app: &mut App) {
    let symbol = app.cfg.client.currency_symbol.as_str();
    let slip = &mut app.slip;
    if slip.is_empty() {
        println!("Your bet slip is empty. Pick odds to add selections.");
        return;
    }
    let totals = slip.compute_totals();
    println!("Bet slip ({} selection(s), {})", slip.len(), slip.bet_type());
    for (i, sel) in slip.selections().iter().enumerate() {
        let stake = slip.stake(&sel.id);
        let stake = if stake.is_zero() { "-".to_string() } else { format_amount_in(symbol, stake) };
        print!("  {}. {sel} | stake {stake}", i + 1);
        match slip.error(&sel.id) {
            Some(e) => println!("  ! {e}"),
            None => println!(),
        }
    }
    println!("  Total stake:   {}", format_amount_in(symbol, totals.total_stake));
    println!("  Potential win: {}", format_amount_2dp_in(symbol, totals.potential_win));
    if slip.bet_type() == BetType::Single && slip.len() > 1 {
        println!("  Note: single bets price the whole stake at the first selection's odds");
    }
    let ready = slip.can_submit();
    if ready && totals.total_stake > Decimal::ZERO {
        println!("  Ready: place bet {}", format_amount_in(symbol, totals.total_stake));
    } else if !ready {
        println!("  Not ready to place");
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wicket=info"));

    let json_logging = std::env::var("WICKET_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
