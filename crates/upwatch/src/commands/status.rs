//! Status summary handler.

use std::fmt::Write;

use owo_colors::OwoColorize;

use upwatch_core::StatusSummary;

use crate::cli::GlobalOpts;
use crate::config::Target;
use crate::error::CliError;
use crate::output;

fn format_summary(summary: &StatusSummary, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total  {}", summary.total);
    if color {
        let _ = writeln!(out, "Up     {}", summary.up.green());
        let _ = write!(out, "Down   {}", summary.down.red());
    } else {
        let _ = writeln!(out, "Up     {}", summary.up);
        let _ = write!(out, "Down   {}", summary.down);
    }
    out
}

pub async fn handle(target: &Target, global: &GlobalOpts) -> Result<(), CliError> {
    let summary = target.dashboard.summary().await?;
    let color = output::should_color(global.color_mode());

    let out = output::render_single(
        global.output_format(),
        &summary,
        |s| format_summary(s, color),
        |s| format!("{} {} {}", s.total, s.up, s.down),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
