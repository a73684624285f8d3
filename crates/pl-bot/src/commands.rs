//! Slash commands answered without the classifier.

/// A recognized bot command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    /// `/start`: greeting + capabilities.
    Start,
    /// `/help`: capabilities.
    Help,
    /// `/about`: who the bot is.
    About,
    /// `/regions`: regions present in the catalog.
    Regions,
}

impl BotCommand {
    pub const ALL: [BotCommand; 4] = [
        BotCommand::Start,
        BotCommand::Help,
        BotCommand::About,
        BotCommand::Regions,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BotCommand::Start => "start",
            BotCommand::Help => "help",
            BotCommand::About => "about",
            BotCommand::Regions => "regions",
        }
    }

    /// Parse the leading `/command[@botname]` token. Unknown commands are `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let name = token.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or_default().to_ascii_lowercase();
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}
