use std::fmt;

/// The two top-level screens. Which one is active follows the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Login,
    Sites,
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => write!(f, "Login"),
            Self::Sites => write!(f, "Sites"),
        }
    }
}
