use dialoguer::{theme::ColorfulTheme, Input};
use log::debug;

use heartline_core::score::validate_names;
use heartline_core::StatsSource;

use crate::app::AppContext;
use crate::cli::PlayArgs;
use crate::errors::CliError;
use crate::output::{play_json, source_label};
use crate::ui::{
    badge, blank_line, header, kv, print, score_card, Badge, OutputMode, Spinner,
};

pub fn handle_play(ctx: &AppContext, args: &PlayArgs) -> anyhow::Result<()> {
    let ui = ctx.ui_for(&args.output)?;
    let interactive = !args.no_input && ui.is_interactive() && !ui.mode.is_json();

    let (name1, name2) = read_names(args, interactive)?;
    // reject blank names before touching storage
    validate_names(&name1, &name2).map_err(CliError::from)?;

    let game = ctx.game()?;

    let spinner = Spinner::new(&ui, "Adding your play to the shared ledger");
    spinner.start();
    let result = game.play(&name1, &name2).map_err(CliError::from);
    spinner.clear();
    let result = result?;
    debug!(
        "Play {} recorded after {} attempt(s)",
        result.record.fingerprint(),
        result.report.attempts
    );

    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&play_json(&result)?)?);
        return Ok(());
    }

    if ctx.quiet() {
        println!("{}", result.percentage());
        return Ok(());
    }

    let stats = &result.report.stats;
    match ui.mode {
        OutputMode::Pretty => {
            print(&ui, &header(&ui, "play", None));
            blank_line(&ui);
            print(
                &ui,
                &score_card(
                    &ui,
                    &result.record.first_name,
                    &result.record.second_name,
                    result.percentage(),
                    result.verdict,
                ),
            );
            blank_line(&ui);
            print(
                &ui,
                &kv(
                    &ui,
                    "Plays",
                    &format!(
                        "{} from {} device(s)",
                        stats.total_plays, stats.unique_devices
                    ),
                ),
            );
            if let StatsSource::LocalOnly { reason } = &result.report.source {
                print(
                    &ui,
                    &badge(
                        &ui,
                        Badge::Warn,
                        &format!("Showing this device only: {}", reason.describe()),
                    ),
                );
            }
        }
        OutputMode::Plain | OutputMode::Json => {
            print(
                &ui,
                &score_card(
                    &ui,
                    &result.record.first_name,
                    &result.record.second_name,
                    result.percentage(),
                    result.verdict,
                ),
            );
            print(&ui, &kv(&ui, "total_plays", &stats.total_plays.to_string()));
            print(
                &ui,
                &kv(&ui, "unique_devices", &stats.unique_devices.to_string()),
            );
            print(&ui, &kv(&ui, "source", &source_label(&result.report)));
        }
    }

    Ok(())
}

fn read_names(args: &PlayArgs, interactive: bool) -> anyhow::Result<(String, String)> {
    match (&args.name1, &args.name2) {
        (Some(a), Some(b)) => Ok((a.clone(), b.clone())),
        (first, _) if interactive => {
            let theme = ColorfulTheme::default();
            let name1 = match first {
                Some(a) => a.clone(),
                None => Input::with_theme(&theme)
                    .with_prompt("First name")
                    .allow_empty(true)
                    .interact_text()?,
            };
            let name2: String = Input::with_theme(&theme)
                .with_prompt("Second name")
                .allow_empty(true)
                .interact_text()?;
            Ok((name1, name2))
        }
        _ => Err(CliError::invalid_input(
            "Please enter both names (e.g. `heartline play Alice Bob`)",
        )
        .into()),
    }
}
