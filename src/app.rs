use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use crate::api::models::{ProfileUpdate, UserProfile};
use crate::api::{ApiClient, ApiOptions, DEFAULT_API_URL};
use crate::auth::validation::SignUpForm;
use crate::auth::{self, login, password, profile, register, Outcome, Redirect, Tone};
use crate::cli::args::{CliArgs, Command, ConfigCommand, ProfileCommand, ScreenArgs};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::console::{self, ConsoleCommand, ConsoleHelper, Reply};
use crate::output::{self, OutputFormat};
use crate::screens::{Hostel, Screen, ScreenState, ScreenTable};
use crate::session::{FileSessionStore, SessionStore};
use crate::table::paginator::PageSize;
use crate::utils::{mask_secret, parse_bool};

const HOSTEL_FETCH_PAGE: u64 = 100;

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(120));
    if let Ok(style) = ProgressStyle::with_template(":: {spinner} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb
}

fn print_notice(tone: Tone, text: &str) {
    let tag = match tone {
        Tone::Success => "[OK]".green().bold(),
        Tone::Error => "[ERR]".red().bold(),
        Tone::Info => "[INF]".blue().bold(),
    };
    println!("{tag} {text}");
}

fn print_profile(user: &UserProfile) {
    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    format_kv_line("Id", &user.id.to_string());
    format_kv_line("User id", &user.user_id);
    format_kv_line("Name", &or_dash(&user.name));
    format_kv_line("Email", &or_dash(&user.email));
    format_kv_line("Mobile", &or_dash(&user.mobile));
    format_kv_line("Role", &or_dash(&user.user_role));
    format_kv_line("Bio", &or_dash(&user.bio));
    format_kv_line("Image", &or_dash(&user.profile_image));
    format_kv_line("Active", format_bool(user.is_active));
    format_kv_line("Verified", &or_dash(&user.verified_at));
}

async fn follow_redirect(redirect: Redirect) {
    if !redirect.after.is_zero() {
        let pb = spinner(&format!("Redirecting to {}", redirect.route.name()));
        tokio::time::sleep(redirect.after).await;
        pb.finish_and_clear();
    }
    format_kv_line("Next", redirect.route.command_hint());
}

async fn report(outcome: Outcome) {
    if let Some(notice) = &outcome.notice {
        print_notice(notice.tone, &notice.text);
    }
    for (field, message) in &outcome.field_errors {
        println!("   {} {}", format!("{field}:").red(), message);
    }
    if let Some(user) = &outcome.profile {
        print_profile(user);
    }
    if let Some(redirect) = outcome.redirect {
        follow_redirect(redirect).await;
    }
}

#[derive(Clone, Debug)]
struct RunConfig {
    api: ApiOptions,
    session_path: PathBuf,
    config_path: Option<PathBuf>,
    page_size: PageSize,
    no_color: bool,
    command: Command,
}

fn build_run_config(
    args: CliArgs,
    cfg: ConfigFile,
    env_api_url: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let base_url = args
        .api_url
        .or(env_api_url)
        .or(cfg.api_url)
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    validation::validate_url(&base_url)
        .map_err(|e| format!("invalid API URL '{base_url}': {e}"))?;

    let timeout_seconds = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout_seconds == 0 {
        return Err("invalid timeout, expected a positive number of seconds".to_string());
    }
    let proxy = args
        .proxy
        .or(cfg.proxy)
        .filter(|p| !p.trim().is_empty());

    let session_path = args
        .session
        .or(cfg.session_file)
        .map(|p| config::expand_tilde(&p))
        .unwrap_or_else(config::default_session_path);

    let page_size = match cfg.page_size {
        Some(value) => {
            PageSize::new(value).map_err(|e| format!("invalid page_size in config: {e}"))?
        }
        None => PageSize::DEFAULT,
    };

    Ok(RunConfig {
        api: ApiOptions {
            base_url,
            timeout_seconds,
            proxy,
        },
        session_path,
        config_path,
        page_size,
        no_color,
        command: args.command,
    })
}

fn profile_update(
    args: crate::cli::args::ProfileUpdateArgs,
    cached: UserProfile,
) -> ProfileUpdate {
    ProfileUpdate {
        name: args.name.or(cached.name).unwrap_or_default(),
        bio: args.bio.or(cached.bio),
        email: args.email.or(cached.email).unwrap_or_default(),
        mobile: args.mobile.or(cached.mobile).unwrap_or_default(),
        is_active: args.active.unwrap_or(cached.is_active),
        image: args
            .image
            .map(|p| config::expand_tilde(&p))
            .unwrap_or_default(),
    }
}

async fn run_flow(run: &RunConfig, command: Command) -> Result<(), String> {
    let api = ApiClient::new(&run.api).map_err(|e| e.to_string())?;
    let store = FileSessionStore::new(&run.session_path);
    log::debug!(
        "using API {} with session {}",
        api.base_url(),
        run.session_path.display()
    );

    let pb = spinner("Contacting the hostel API");
    let result = match command {
        Command::Signup(a) => {
            let form = SignUpForm {
                username: a.username,
                email: a.email,
                mobile: a.mobile,
                confirm_password: a.confirm_password.unwrap_or_else(|| a.password.clone()),
                password: a.password,
                user_role: a.role,
                agreed_to_terms: a.agree_terms,
            };
            register::sign_up(&api, &store, &form).await
        }
        Command::VerifyOtp(a) => register::verify_otp(&api, &store, a.id, &a.otp).await,
        Command::ResendOtp(a) => register::resend_otp(&api, &store, a.id).await,
        Command::Login(a) => login::login(&api, &store, &a.username, &a.password).await,
        Command::Logout => login::logout(&api, &store).await,
        Command::ForgotPassword(a) => {
            password::forgot_password(&api, &store, &a.identifier).await
        }
        Command::ResetPassword(a) => {
            password::reset_password(
                &api,
                &store,
                a.identifier.as_deref(),
                &a.otp,
                &a.new_password,
                &a.confirm_password,
            )
            .await
        }
        Command::ChangePassword(a) => {
            password::change_password(
                &api,
                &store,
                &a.old_password,
                &a.new_password,
                &a.confirm_password,
            )
            .await
        }
        Command::Profile(ProfileCommand::Show) => profile::show_profile(&api, &store).await,
        Command::Profile(ProfileCommand::Update(a)) => {
            let cached = match store.load() {
                Ok(session) => session.user.unwrap_or_default(),
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(e.to_string());
                }
            };
            profile::update_profile(&api, &store, &profile_update(a, cached)).await
        }
        Command::Config(_) | Command::Screen(_) => {
            pb.finish_and_clear();
            return Err("not an account command".to_string());
        }
    };
    pb.finish_and_clear();

    let outcome = result.map_err(|e| e.to_string())?;
    report(outcome).await;
    Ok(())
}

async fn open_screen(
    run: &RunConfig,
    screen: Screen,
    remote: bool,
) -> Result<Option<Box<dyn ScreenTable>>, String> {
    if !remote {
        return Ok(Some(screen.open()));
    }
    let api = ApiClient::new(&run.api).map_err(|e| e.to_string())?;
    let pb = spinner("Fetching hostels");
    let fetched = api.all_hostels(HOSTEL_FETCH_PAGE).await;
    pb.finish_and_clear();
    match fetched {
        Ok(hostels) => {
            log::info!("fetched {} hostels", hostels.len());
            let records = hostels.into_iter().map(Hostel::from).collect();
            Ok(Some(Box::new(ScreenState::<Hostel>::new(records))))
        }
        Err(e) => {
            log::warn!("hostel listing failed: {e}");
            print_notice(
                Tone::Error,
                &auth::failure_text(&e, "Failed to fetch hostels."),
            );
            Ok(None)
        }
    }
}

fn prepare_table(
    table: &mut dyn ScreenTable,
    run: &RunConfig,
    args: &ScreenArgs,
) -> Result<(), String> {
    let size = match args.page_size {
        Some(value) => PageSize::new(value).map_err(|e| e.to_string())?,
        None => run.page_size,
    };
    table.set_page_size(size);
    if let Some(filter) = args.filter.as_deref() {
        table.set_filter(filter);
    }
    for column in &args.sort {
        table
            .sort_by(column)
            .map_err(|e| format!("invalid --sort: {e}"))?;
    }
    if let Some(page) = args.page {
        table
            .go_to_page(page)
            .map_err(|e| format!("invalid --page: {e}"))?;
    }
    Ok(())
}

async fn run_screen(run: &RunConfig, args: ScreenArgs) -> Result<(), String> {
    let screen = Screen::parse(&args.screen)
        .ok_or_else(|| format!("unknown screen '{}'", args.screen))?;
    let Some(mut table) = open_screen(run, screen, args.remote).await? else {
        return Ok(());
    };
    prepare_table(table.as_mut(), run, &args)?;

    if args.interactive {
        return run_console(table.as_mut(), !run.no_color);
    }

    let format = args
        .format
        .as_deref()
        .and_then(OutputFormat::parse)
        .or_else(|| args.output.as_deref().and_then(output::infer_format_from_path))
        .unwrap_or(OutputFormat::Text);
    let color = !run.no_color && args.output.is_none();

    let bytes = match format {
        OutputFormat::Text => output::render_text(&table.render(), color).into_bytes(),
        OutputFormat::Json => {
            output::render_json(&table.export().map_err(|e| e.to_string())?)
        }
        OutputFormat::Xml => output::render_xml(&table.render()),
    };

    match args.output.as_deref() {
        Some(path) => {
            let path = config::expand_tilde(path);
            tokio::fs::write(&path, &bytes)
                .await
                .map_err(|e| format!("failed to write output file {}: {e}", path.display()))?;
            format_kv_line("Saved", &path.display().to_string());
        }
        None => print!("{}", String::from_utf8_lossy(&bytes)),
    }
    Ok(())
}

fn ask_yes_no(editor: &mut Editor<ConsoleHelper, DefaultHistory>, prompt: &str) -> bool {
    editor
        .readline(&format!("{prompt} [y/N] "))
        .ok()
        .and_then(|answer| parse_bool(&answer))
        .unwrap_or(false)
}

fn run_console(table: &mut dyn ScreenTable, color: bool) -> Result<(), String> {
    let mut editor: Editor<ConsoleHelper, DefaultHistory> =
        Editor::new().map_err(|e| format!("failed to start console: {e}"))?;
    editor.set_helper(Some(ConsoleHelper));

    let prompt = format!("{}> ", table.screen().name());
    print!("{}", output::render_text(&table.render(), color));
    println!("type 'help' for commands");

    loop {
        let line = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(format!("console input failed: {e}")),
        };
        let _ = editor.add_history_entry(line.as_str());

        let command = match ConsoleCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                print_notice(Tone::Error, &e);
                continue;
            }
        };

        let mut confirm = |question: &str| ask_yes_no(&mut editor, question);
        match console::apply(table, command, &mut confirm, color) {
            Ok(Reply::Output(text)) if text.is_empty() => {}
            Ok(Reply::Output(text)) if text.ends_with('\n') => print!("{text}"),
            Ok(Reply::Output(text)) => println!("{text}"),
            Ok(Reply::Quit) => break,
            Err(e) => print_notice(Tone::Error, &e.to_string()),
        }
    }
    Ok(())
}

fn show_config(run: &RunConfig) {
    let path = run
        .config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    format_kv_line("Config", &path);
    format_kv_line("API", &run.api.base_url);
    format_kv_line("Timeout", &format!("{}s", run.api.timeout_seconds));
    format_kv_line("Proxy", run.api.proxy.as_deref().unwrap_or("-"));
    format_kv_line("Session", &run.session_path.display().to_string());
    format_kv_line("Page size", &run.page_size.get().to_string());
    format_kv_line("Color", format_bool(!run.no_color));

    match FileSessionStore::new(&run.session_path).load() {
        Ok(session) => {
            let state = match session.access_token.as_deref() {
                Some(token) => format!("signed in (token {})", mask_secret(token)),
                None => "signed out".to_string(),
            };
            format_kv_line("Account", &state);
            if let Some(id) = session.pending_user_id {
                format_kv_line("Pending", &format!("OTP for account {id}"));
            }
            if let Some(identifier) = session.pending_identifier.as_deref() {
                format_kv_line("Reset", identifier);
            }
        }
        Err(e) => print_notice(Tone::Error, &e.to_string()),
    }
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    match run.command.clone() {
        Command::Config(ConfigCommand::Init) => {
            let path = run
                .config_path
                .clone()
                .ok_or_else(|| "cannot locate a home directory, pass --config".to_string())?;
            if config::ensure_default_config_file(&path)? {
                print_notice(Tone::Success, &format!("wrote {}", path.display()));
            } else {
                print_notice(Tone::Info, &format!("{} already exists", path.display()));
            }
            Ok(())
        }
        Command::Config(ConfigCommand::Show) => {
            show_config(&run);
            Ok(())
        }
        Command::Screen(args) => run_screen(&run, args).await,
        command => run_flow(&run, command).await,
    }
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };
    init_logging(args.verbose);

    let allow_missing = matches!(args.command, Command::Config(ConfigCommand::Init));
    let (config_path, cfg) = match args.config.as_deref().map(config::expand_tilde) {
        Some(path) => {
            let cfg = config::load_config(&path, allow_missing)?;
            (Some(path), cfg)
        }
        None => match config::default_config_path() {
            Some(path) => {
                let cfg = config::load_config(&path, true)?;
                (Some(path), cfg)
            }
            None => (None, ConfigFile::default()),
        },
    };

    let run = build_run_config(args, cfg, config::env_api_url(), config_path)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}
