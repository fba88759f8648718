use crate::cli::args::{CliArgs, Command, ScreenArgs};
use crate::output::OutputFormat;
use crate::screens::Screen;
use crate::table::paginator::PageSize;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected a positive number of seconds".to_string());
        }
    }
    if let Some(url) = args.api_url.as_deref() {
        validate_url(url).map_err(|e| format!("invalid --api-url '{url}': {e}"))?;
    }
    if let Command::Screen(screen) = &args.command {
        validate_screen(screen)?;
    }
    Ok(())
}

pub fn validate_url(url: &str) -> Result<(), String> {
    let parsed = reqwest::Url::parse(url.trim()).map_err(|e| e.to_string())?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{other}'")),
    }
}

fn validate_screen(args: &ScreenArgs) -> Result<(), String> {
    let screen = Screen::parse(&args.screen).ok_or_else(|| {
        format!(
            "unknown screen '{}', expected one of: {}",
            args.screen,
            Screen::ALL.map(Screen::name).join(", ")
        )
    })?;
    if let Some(size) = args.page_size {
        PageSize::new(size).map_err(|e| format!("invalid --page-size: {e}"))?;
    }
    if args.page == Some(0) {
        return Err("invalid --page, pages start at 1".to_string());
    }
    if let Some(raw) = args.format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!("invalid --format '{raw}', expected text, json or xml"));
        }
    }
    if args.remote && screen != Screen::Hostels {
        return Err("--remote is only available for the hostels screen".to_string());
    }
    if args.interactive && args.output.is_some() {
        return Err("--output cannot be combined with --interactive".to_string());
    }
    Ok(())
}
