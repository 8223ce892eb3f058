use clap::CommandFactory;
use clap_complete::generate;
use serde_json::json;

use crate::app::AppContext;
use crate::cli::{Cli, CompletionsArgs, DeviceArgs};
use crate::ui::{kv, print};

pub fn handle_device(ctx: &AppContext, args: &DeviceArgs) -> anyhow::Result<()> {
    let ui = ctx.ui_for(&args.output)?;
    let game = ctx.game()?;
    let data_dir = ctx.data_dir()?;

    if ui.mode.is_json() {
        let value = json!({
            "deviceId": game.device_id(),
            "dataDir": data_dir.to_string_lossy(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if ctx.quiet() {
        println!("{}", game.device_id());
    } else {
        print(&ui, &kv(&ui, "Device", game.device_id()));
        print(&ui, &kv(&ui, "Data dir", &data_dir.to_string_lossy()));
    }
    Ok(())
}

pub fn handle_completions(args: &CompletionsArgs) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "heartline", &mut std::io::stdout());
    Ok(())
}
