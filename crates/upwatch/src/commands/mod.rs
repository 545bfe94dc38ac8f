//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod sites;
pub mod status;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::config::Target;
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, target: &Target, global: &GlobalOpts) -> Result<(), CliError> {
    let result = match cmd {
        Command::Login(args) => auth::login(target, args, global).await,
        Command::Logout => auth::logout(target, global).await,
        Command::Sites(args) => sites::handle(target, args, global).await,
        Command::Status => status::handle(target, global).await,
        Command::Config(_) | Command::Completions(_) => {
            return Err(CliError::Internal(
                "config and completions are handled before dispatch".into(),
            ));
        }
    };
    result.map_err(|e| util::with_profile(e, &target.profile_name))
}
