use crate::app::AppContext;
use crate::cli::StatsArgs;
use crate::output::{stats_items, stats_json};
use crate::ui::{header, hint, kv, print, Spinner};

pub fn handle_stats(ctx: &AppContext, args: &StatsArgs) -> anyhow::Result<()> {
    let ui = ctx.ui_for(&args.output)?;
    let game = ctx.game()?;

    let spinner = Spinner::new(&ui, "Reading the shared ledger");
    spinner.start();
    let report = game.stats();
    spinner.clear();

    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&stats_json(&report)?)?);
        return Ok(());
    }

    if ctx.quiet() {
        println!(
            "{} {}",
            report.stats.total_plays, report.stats.unique_devices
        );
        return Ok(());
    }

    print(&ui, &header(&ui, "stats", None));
    for (key, value) in stats_items(&report) {
        print(&ui, &kv(&ui, key, &value));
    }
    if !report.is_shared() && ui.mode.is_pretty() {
        print(
            &ui,
            &hint(&ui, "Check `[remote]` in your config or drop --offline."),
        );
    }
    Ok(())
}
