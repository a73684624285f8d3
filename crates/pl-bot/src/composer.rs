//! Turns a resolution outcome into a localized `Reply`.

use std::collections::BTreeSet;
use std::sync::Arc;

use pl_protocol::{
    CatalogEntry, Language, LinkButton, Reply, ReplyKind, ResolutionOutcome, SmalltalkKind,
};

use crate::commands::BotCommand;
use crate::guard::InputRejection;
use crate::i18n::{Localizer, ids};
use crate::resolver::{Resolution, UnknownRegion};

/// Transport message-size limit, in characters.
pub const MAX_REPLY_CHARS: usize = 4000;

const ELLIPSIS: char = '…';

/// Cut `text` to `MAX_REPLY_CHARS` characters, ending with an ellipsis when cut.
pub fn truncate_reply(text: &str) -> String {
    if text.chars().count() <= MAX_REPLY_CHARS {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(MAX_REPLY_CHARS - 1).collect();
    truncated.push(ELLIPSIS);
    truncated
}

/// Builds replies from outcomes. Pure: no I/O, no logging side effects.
#[derive(Clone)]
pub struct Composer {
    localizer: Arc<dyn Localizer>,
}

impl Composer {
    pub fn new(localizer: Arc<dyn Localizer>) -> Self {
        Self { localizer }
    }

    pub fn localizer(&self) -> &dyn Localizer {
        self.localizer.as_ref()
    }

    pub fn compose(
        &self,
        conversation_id: &str,
        language: Language,
        outcome: &ResolutionOutcome,
    ) -> Reply {
        let (kind, text, buttons) = self.outcome_parts(language, outcome);
        Reply::new(conversation_id, kind, language, truncate_reply(&text)).with_buttons(buttons)
    }

    /// Like `compose`, appending "did you mean" regions for an unrecognized mention.
    pub fn compose_resolution(
        &self,
        conversation_id: &str,
        language: Language,
        resolution: &Resolution,
    ) -> Reply {
        let (kind, mut text, buttons) = self.outcome_parts(language, &resolution.outcome);
        if let Some(unknown) = &resolution.unknown_region {
            text.push_str("\n\n");
            text.push_str(&self.region_suggestions_text(language, unknown));
        }
        Reply::new(conversation_id, kind, language, truncate_reply(&text)).with_buttons(buttons)
    }

    fn outcome_parts(
        &self,
        language: Language,
        outcome: &ResolutionOutcome,
    ) -> (ReplyKind, String, Vec<LinkButton>) {
        match outcome {
            ResolutionOutcome::Matched(entries) => match entries.first() {
                Some(entry) => (
                    ReplyKind::Link,
                    self.link_text(language, entry),
                    vec![LinkButton {
                        label: entry.label.clone(),
                        url: entry.url.clone(),
                    }],
                ),
                None => (ReplyKind::NoMatch, self.no_match_text(language), Vec::new()),
            },
            ResolutionOutcome::Ambiguous(entries) => (
                ReplyKind::Disambiguation,
                self.disambiguation_text(language, entries),
                entries
                    .iter()
                    .map(|entry| LinkButton {
                        label: format!("{}{}", entry.label, self.region_suffix(language, entry)),
                        url: entry.url.clone(),
                    })
                    .collect(),
            ),
            ResolutionOutcome::NoMatch => {
                (ReplyKind::NoMatch, self.no_match_text(language), Vec::new())
            }
            ResolutionOutcome::Smalltalk(kind) => {
                let id = match kind {
                    SmalltalkKind::Greeting => ids::GREETING,
                    SmalltalkKind::Chitchat => ids::SMALLTALK,
                    SmalltalkKind::Help => ids::CAPABILITIES,
                    SmalltalkKind::About => ids::ABOUT,
                };
                (ReplyKind::Smalltalk, self.render(language, id), Vec::new())
            }
            ResolutionOutcome::OffTopic => (
                ReplyKind::OffTopic,
                self.render(language, ids::CAPABILITIES),
                Vec::new(),
            ),
        }
    }

    /// Reply for a failed classification (LLM down or timed out).
    pub fn transient_error(&self, conversation_id: &str, language: Language) -> Reply {
        Reply::new(
            conversation_id,
            ReplyKind::TransientError,
            language,
            self.render(language, ids::TRANSIENT_ERROR),
        )
    }

    /// Reply for input rejected by the guard.
    pub fn invalid_input(
        &self,
        conversation_id: &str,
        language: Language,
        rejection: &InputRejection,
    ) -> Reply {
        let text = match rejection {
            InputRejection::Empty => self.render(language, ids::INPUT_EMPTY),
            InputRejection::TooLong { max } => self.localizer.render(
                language,
                ids::INPUT_TOO_LONG,
                &[("max", &max.to_string())],
            ),
            InputRejection::Spam => self.render(language, ids::INPUT_SPAM),
        };
        Reply::new(conversation_id, ReplyKind::InvalidInput, language, text)
    }

    /// Reply for a bot command. `regions` are the catalog's display names.
    pub fn command(
        &self,
        conversation_id: &str,
        language: Language,
        command: BotCommand,
        regions: &[String],
    ) -> Reply {
        let text = match command {
            BotCommand::Start => format!(
                "{}\n\n{}",
                self.render(language, ids::GREETING),
                self.render(language, ids::CAPABILITIES)
            ),
            BotCommand::Help => self.render(language, ids::CAPABILITIES),
            BotCommand::About => self.render(language, ids::ABOUT),
            BotCommand::Regions if regions.is_empty() => {
                self.render(language, ids::REGIONS_EMPTY)
            }
            BotCommand::Regions => {
                let list = regions
                    .iter()
                    .map(|r| format!("• {r}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                self.localizer.render(
                    language,
                    ids::REGIONS_LIST,
                    &[("count", &regions.len().to_string()), ("regions", &list)],
                )
            }
        };
        Reply::new(
            conversation_id,
            ReplyKind::Command,
            language,
            truncate_reply(&text),
        )
    }

    fn render(&self, language: Language, id: &str) -> String {
        self.localizer.render(language, id, &[])
    }

    fn region_suffix(&self, language: Language, entry: &CatalogEntry) -> String {
        match entry.region_display() {
            Some(region) => format!(" ({region})"),
            None => format!(" ({})", self.render(language, ids::REGION_NATIONAL)),
        }
    }

    fn link_text(&self, language: Language, entry: &CatalogEntry) -> String {
        let region = self.region_suffix(language, entry);
        let mut text = self.localizer.render(
            language,
            ids::LINK_FOUND,
            &[("label", &entry.label), ("region", &region), ("url", &entry.url)],
        );
        if !entry.notes.trim().is_empty() {
            text.push_str("\n\n");
            text.push_str(&self.localizer.render(
                language,
                ids::LINK_NOTES,
                &[("notes", entry.notes.trim())],
            ));
        }
        text
    }

    fn disambiguation_text(&self, language: Language, entries: &[CatalogEntry]) -> String {
        let mut lines = vec![self.render(language, ids::DISAMBIGUATION), String::new()];
        for entry in entries {
            let region = self.region_suffix(language, entry);
            lines.push(self.localizer.render(
                language,
                ids::DISAMBIGUATION_ITEM,
                &[("label", &entry.label), ("region", &region)],
            ));
        }

        // Entries from different regions: the user's region would settle it.
        let regions: BTreeSet<&str> = entries.iter().map(|e| e.region.as_str()).collect();
        if regions.len() > 1 {
            lines.push(String::new());
            lines.push(self.render(language, ids::DISAMBIGUATION_REGION_HINT));
        }
        lines.join("\n")
    }

    fn region_suggestions_text(&self, language: Language, unknown: &UnknownRegion) -> String {
        self.localizer.render(
            language,
            ids::REGION_SUGGESTIONS,
            &[
                ("mention", &unknown.mention),
                ("regions", &unknown.suggestions.join(", ")),
            ],
        )
    }

    fn no_match_text(&self, language: Language) -> String {
        format!(
            "{}\n\n{}",
            self.render(language, ids::NO_MATCH),
            self.render(language, ids::CAPABILITIES)
        )
    }
}
