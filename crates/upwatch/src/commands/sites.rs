//! Site command handlers.

use std::sync::Arc;

use tabled::Tabled;

use upwatch_core::{Command as CoreCommand, CommandResult, Site};

use crate::cli::{GlobalOpts, OutputFormat, SitesArgs, SitesCommand};
use crate::config::Target;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Last checked")]
    last_checked: String,
    #[tabled(rename = "Down since")]
    down_since: String,
}

fn site_row(site: &Arc<Site>, color: bool) -> SiteRow {
    SiteRow {
        id: site.id.to_string(),
        name: site.name.clone(),
        url: site.url.clone(),
        status: output::paint_status(site.status, color),
        last_checked: site.last_checked_label(),
        down_since: site.down_since_label(),
    }
}

pub async fn handle(target: &Target, args: SitesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let dashboard = &target.dashboard;

    match args.command {
        SitesCommand::List => {
            let sites = dashboard.list_sites().await?;
            if sites.is_empty() && matches!(global.output_format(), OutputFormat::Table) {
                output::notice(
                    "No sites monitored yet. Add one with: upwatch sites add --name <NAME> --url <URL>",
                    global.quiet,
                );
                return Ok(());
            }
            let color = output::should_color(global.color_mode());
            let out = output::render_list(
                global.output_format(),
                sites.as_slice(),
                |s| site_row(s, color),
                |s| s.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Add { name, url } => {
            let cmd = CoreCommand::add_site(&name, &url)?;
            if let CommandResult::SiteAdded { name } = dashboard.execute(cmd).await? {
                output::notice(&format!("✓ Now monitoring '{name}'"), global.quiet);
            }
            Ok(())
        }

        SitesCommand::Delete { site } => {
            let id = dashboard.resolve_site(&site).await?;
            let label = dashboard
                .store()
                .find_site(&id.to_string())
                .map_or_else(|| id.to_string(), |s| format!("'{}' ({})", s.name, s.url));

            if !util::confirm(
                &format!("Stop monitoring {label}?"),
                global.yes,
                "sites delete",
            )? {
                return Ok(());
            }

            dashboard.execute(CoreCommand::DeleteSite { id }).await?;
            output::notice(&format!("✓ Deleted site {id}"), global.quiet);
            Ok(())
        }
    }
}
