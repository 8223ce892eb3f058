use crate::app::AppContext;
use crate::cli::HistoryArgs;
use crate::constants::DEFAULT_HISTORY_LIMIT;
use crate::output::{history_json, history_rows, HISTORY_COLUMNS};
use crate::ui::{header, hint, print, simple_table};

pub fn handle_history(ctx: &AppContext, args: &HistoryArgs) -> anyhow::Result<()> {
    let ui = ctx.ui_for(&args.output)?;
    let game = ctx.game()?;
    let history = game.history();
    let limit = args.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let records = &history.records()[..history.len().min(limit)];

    if ui.mode.is_json() {
        let value = history_json(game.device_id(), records);
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if records.is_empty() {
        if !ctx.quiet() {
            print(&ui, &header(&ui, "history", None));
            print(&ui, &hint(&ui, "No plays yet. Try `heartline play Alice Bob`."));
        }
        return Ok(());
    }

    if !ctx.quiet() && ui.mode.is_pretty() {
        let context = format!("last {}", records.len());
        print(&ui, &header(&ui, "history", Some(&context)));
    }
    let rows = history_rows(&ui, records, ctx.timezone());
    println!("{}", simple_table(&ui, &HISTORY_COLUMNS, &rows));
    Ok(())
}
