use std::path::PathBuf;
use std::sync::Arc;

use dialoguer::{theme::ColorfulTheme, Confirm, FuzzySelect, Input, Select};

use heartline_core::identity::DeviceIdentityProvider;
use heartline_core::storage::FileStore;
use heartline_core::VERSION;

use crate::app::{resolve_config_path, resolve_data_dir, AppContext};
use crate::cli::{BackendArg, InitArgs};
use crate::config::{write_config, Backend, GitHubSection, HeartlineConfig};
use crate::errors::CliError;
use crate::ui::theme::{styled, styles};
use crate::ui::{badge, blank_line, hint, print, receipt, Badge, UiContext};

/// Print a step indicator for the wizard flow.
fn print_step(ctx: &UiContext, step: usize, total: usize, title: &str, detail: &str) {
    if !ctx.mode.is_pretty() {
        return;
    }
    let progress = styled(&format!("{}/{}", step, total), styles::dim(), ctx.color);
    println!("{}  {}", progress, styled(title, styles::bold(), ctx.color));
    println!("    {}", styled(detail, styles::dim(), ctx.color));
}

fn parse_timezone(value: &str) -> anyhow::Result<Option<String>> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(None);
    }

    let tz = trimmed
        .parse::<chrono_tz::Tz>()
        .map_err(|_| CliError::invalid_input(format!("Invalid timezone: {}", trimmed)))?;
    Ok(Some(tz.to_string()))
}

fn timezone_options() -> Vec<String> {
    let mut zones: Vec<String> = chrono_tz::TZ_VARIANTS
        .iter()
        .map(|tz| tz.to_string())
        .filter(|tz| tz != "UTC")
        .collect();
    zones.sort();
    zones.insert(0, "UTC".to_string());
    zones
}

fn parse_github_repo(value: &str) -> anyhow::Result<(String, String)> {
    match value.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(CliError::invalid_input(format!(
            "Invalid GitHub repository '{}' (expected OWNER/REPO)",
            value
        ))
        .into()),
    }
}

fn backend_from_arg(arg: BackendArg) -> Backend {
    match arg {
        BackendArg::None => Backend::None,
        BackendArg::Local => Backend::Local,
        BackendArg::Github => Backend::Github,
    }
}

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let ui = ctx.ui_context(false, None);
    let interactive = ui.is_interactive() && !args.no_input;
    let theme = ColorfulTheme::default();
    let total_steps = 3;

    let config_path = resolve_config_path()?;
    if config_path.exists() && !args.force {
        let overwrite = interactive
            && Confirm::with_theme(&theme)
                .with_prompt(format!("Replace existing config at {}?", config_path.display()))
                .default(false)
                .interact()?;
        if !overwrite {
            return Err(CliError::config_with_hint(
                format!("Config already exists at {}", config_path.display()),
                "Hint: Pass --force to overwrite it.",
            )
            .into());
        }
    }

    if !ctx.quiet() && interactive && ui.mode.is_pretty() {
        println!("{} \u{00B7} init", styled("Heartline", styles::bold(), ui.color));
        println!(
            "{}\n",
            styled(&format!("v{}", VERSION), styles::dim(), ui.color)
        );
    }

    let data_dir: PathBuf = resolve_data_dir(ctx.cli(), None)?;

    let backend = match args.backend {
        Some(arg) => backend_from_arg(arg),
        None if interactive => {
            print_step(
                &ui,
                1,
                total_steps,
                "Shared ledger",
                "Where plays from every device are tallied.",
            );
            let options = [
                "None (this device only)",
                "Local directory (shared folder or testing)",
                "GitHub repository",
            ];
            let choice = Select::with_theme(&theme)
                .with_prompt("Backend")
                .default(0)
                .items(&options)
                .interact()?;
            blank_line(&ui);
            match choice {
                1 => Backend::Local,
                2 => Backend::Github,
                _ => Backend::None,
            }
        }
        None => Backend::None,
    };

    let mut config = HeartlineConfig::new(data_dir.clone(), backend, None);
    if let Some(key) = &args.document_key {
        config.remote.document_key = key.clone();
    }

    match backend {
        Backend::Local => {
            config.remote.shared_dir = match &args.shared_dir {
                Some(dir) => Some(dir.clone()),
                None if interactive => {
                    print_step(
                        &ui,
                        2,
                        total_steps,
                        "Shared directory",
                        "Leave empty to keep the ledger next to this device's data.",
                    );
                    let input: String = Input::with_theme(&theme)
                        .with_prompt("Directory")
                        .allow_empty(true)
                        .interact_text()?;
                    blank_line(&ui);
                    Some(input).filter(|v| !v.trim().is_empty())
                }
                None => None,
            };
        }
        Backend::Github => {
            let repo = match &args.github_repo {
                Some(value) => value.clone(),
                None if interactive => {
                    print_step(
                        &ui,
                        2,
                        total_steps,
                        "Repository",
                        "Plays are committed to a JSON file in this repository.",
                    );
                    Input::with_theme(&theme)
                        .with_prompt("OWNER/REPO")
                        .interact_text()?
                }
                None => {
                    return Err(CliError::invalid_input(
                        "--backend github requires --github-repo OWNER/REPO",
                    )
                    .into())
                }
            };
            let (owner, repo) = parse_github_repo(&repo)?;
            config.github = Some(GitHubSection {
                owner,
                repo,
                branch: args.github_branch.clone(),
                api_base: None,
                token_env: args.token_env.clone(),
            });
        }
        Backend::None => {}
    }

    let timezone = match &args.timezone {
        Some(value) => value.clone(),
        None if interactive => {
            print_step(
                &ui,
                3,
                total_steps,
                "Timezone",
                "Used when showing your play history.",
            );
            let zones = timezone_options();
            let selection = FuzzySelect::with_theme(&theme)
                .with_prompt("Timezone")
                .default(0)
                .items(&zones)
                .interact()?;
            blank_line(&ui);
            zones.get(selection).cloned().unwrap_or_default()
        }
        None => String::new(),
    };
    config.ui.timezone = parse_timezone(&timezone)?;

    let local = Arc::new(FileStore::open(&data_dir)?);
    let device_id = DeviceIdentityProvider::new(local).get_or_create();
    write_config(&config_path, &config)?;

    if ctx.quiet() {
        return Ok(());
    }

    let config_display = config_path.to_string_lossy();
    let data_display = data_dir.to_string_lossy();
    print(
        &ui,
        &receipt(
            &ui,
            "Heartline is ready",
            &[
                ("Config", config_display.as_ref()),
                ("Data dir", data_display.as_ref()),
                ("Backend", config.remote.backend.as_str()),
                ("Device", device_id.as_str()),
            ],
        ),
    );

    if let Some(github) = &config.github {
        if std::env::var(github.token_env()).is_err() {
            print(
                &ui,
                &badge(
                    &ui,
                    Badge::Info,
                    &format!("Set {} to a token with contents access", github.token_env()),
                ),
            );
        }
    }

    if ui.mode.is_pretty() {
        blank_line(&ui);
        print(
            &ui,
            &hint(
                &ui,
                "heartline play Alice Bob  \u{00B7}  heartline history  \u{00B7}  heartline stats",
            ),
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("").unwrap(), None);
        assert_eq!(parse_timezone("UTC").unwrap(), None);
        assert_eq!(
            parse_timezone(" America/New_York ").unwrap().as_deref(),
            Some("America/New_York")
        );
        assert!(parse_timezone("Mars/Olympus").is_err());
    }

    #[test]
    fn test_parse_github_repo() {
        assert_eq!(
            parse_github_repo("me/plays").unwrap(),
            ("me".to_string(), "plays".to_string())
        );
        assert!(parse_github_repo("plays").is_err());
        assert!(parse_github_repo("me/").is_err());
        assert!(parse_github_repo("a/b/c").is_err());
    }

    #[test]
    fn test_timezone_options_start_with_utc() {
        let zones = timezone_options();
        assert_eq!(zones[0], "UTC");
        assert!(zones.iter().any(|z| z == "Europe/Paris"));
    }
}
