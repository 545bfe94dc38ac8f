//! Screen implementations. Each screen is a top-level Component.

pub mod login;
pub mod sites;

use crate::component::Component;
use crate::screen::ScreenId;

/// Build both screens. `server` and `username` prefill the login form.
pub fn create_screens(server: &str, username: Option<String>) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Login,
            Box::new(login::LoginScreen::new(server, username)),
        ),
        (ScreenId::Sites, Box::new(sites::SitesScreen::new())),
    ]
}
