//!
//! ssui-session CLI
//! ----------------
//! Bootstraps a portal session against the configured API, prints the
//! current identity and gate tables, and exercises group switching, the
//! request pause and the websocket token from the command line.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use ssui_session::config::PortalConfig;
use ssui_session::gateway::HttpGateway;
use ssui_session::identity::{ReloadSignal, SessionManager};
use ssui_session::notifications::NotificationStream;
use ssui_session::store::{FileStore, MemoryCookieJar};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} <command> [args]\n\nCommands:\n  login <token>          store the API auth token\n  whoami                 load the user and print identity and gate tables\n  refresh                reload the user from the API, ignoring the cache\n  switch-group <name>    select another group, then reload\n  ws-token [path]        request a websocket token\n  listen                 request a websocket token and print live notifications\n  pause <seconds>        set the request pause\n  logout                 forget the session\n\nEnvironment:\n  SSUI_API_BASE          portal API base URL (default http://127.0.0.1:3000)\n  SSUI_STORE_PATH        session file (default .ssui/session.json)\n  SSUI_WS_TOKEN_PATH     token issuance endpoint (default /api/auth?requester_type=ws)\n  SSUI_TIMEOUT_SECS      HTTP timeout (default 30)\n  SSUI_AUTH_TOKEN        auth token to seed the session with\n  RUST_LOG               log filter (default info)"
    );
}

struct Cli {
    config: PortalConfig,
    store: Arc<FileStore>,
    cookies: Arc<MemoryCookieJar>,
    reload: Arc<ReloadSignal>,
    session: SessionManager,
}

fn build(config: &PortalConfig, store: Arc<FileStore>, cookies: Arc<MemoryCookieJar>) -> Result<Cli> {
    let gateway = Arc::new(HttpGateway::new(config.clone())?);
    let reload = Arc::new(ReloadSignal::new());
    let session = SessionManager::new(gateway, store.clone(), cookies.clone(), reload.clone());
    Ok(Cli { config: config.clone(), store, cookies, reload, session })
}

fn print_session(session: &SessionManager) -> Result<()> {
    let rbac = session.rbac();
    let out = serde_json::json!({
        "user": session.current_user(),
        "navigation": rbac.get_nav_features(),
        "navigation_enabled": rbac.navigation_enabled(),
        "actions": rbac.get_action_features(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("log filter")?;
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().cloned().unwrap_or_else(|| "ssui-session".to_string());
    let Some(command) = args.get(1).map(String::as_str) else {
        print_usage(&program);
        return Err(anyhow!("missing command"));
    };

    let config = PortalConfig::from_env()?;
    info!(target: "ssui", "api_base={} store={}", config.api_base, config.store_path.display());
    let store = Arc::new(FileStore::open(&config.store_path)?);
    let cookies = Arc::new(MemoryCookieJar::new());
    let ctx = build(&config, store, cookies)?;
    if let Some(token) = &ctx.config.auth_token {
        ctx.session.create(token)?;
    }

    match command {
        "login" => {
            let token = args.get(2).ok_or_else(|| anyhow!("login requires a token"))?;
            ctx.session.create(token)?;
            ctx.session.refresh_user().await?;
            print_session(&ctx.session)?;
        }
        "whoami" => {
            ctx.session.load_user().await?;
            print_session(&ctx.session)?;
        }
        "refresh" => {
            ctx.session.refresh_user().await?;
            print_session(&ctx.session)?;
        }
        "switch-group" => {
            let name = args.get(2).ok_or_else(|| anyhow!("switch-group requires a group name"))?;
            let mut reloads = ctx.reload.subscribe();
            ctx.session.switch_group(name)?;
            reloads.changed().await.context("reload signal")?;
            // The old session is finished; start over from the persisted store.
            let Cli { config, store, cookies, .. } = ctx;
            let fresh = build(&config, store, cookies)?;
            fresh.session.load_user().await?;
            print_session(&fresh.session)?;
        }
        "ws-token" => {
            let path = args.get(2).map(String::as_str).unwrap_or("");
            let token = ctx.session.request_ws_token(path).await?;
            println!("{}", serde_json::to_string_pretty(&token)?);
        }
        "listen" => {
            ctx.session.request_ws_token("").await?;
            let mut stream = NotificationStream::connect(&ctx.config.api_base, ctx.cookies.as_ref()).await?;
            while let Some(event) = stream.next().await {
                println!("{}", event?);
            }
        }
        "pause" => {
            let raw = args.get(2).ok_or_else(|| anyhow!("pause requires seconds"))?;
            let seconds: i64 = raw.parse().with_context(|| format!("'{}' is not a number", raw))?;
            println!("{}", ctx.session.set_pause(seconds)?);
        }
        "logout" => {
            ctx.session.destroy()?;
            info!(target: "ssui", "session cleared in {}", ctx.store.path().display());
        }
        "-h" | "--help" | "help" => print_usage(&program),
        other => {
            print_usage(&program);
            return Err(anyhow!("unknown command '{}'", other));
        }
    }
    Ok(())
}
