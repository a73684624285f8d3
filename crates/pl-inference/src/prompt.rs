//! System prompt construction for the LLM tier.

use std::fmt::Write;

use pl_catalog::IntentVocabulary;
use pl_protocol::Language;

/// Catalog knowledge embedded in the system prompt.
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    pub intents: Vec<IntentVocabulary>,
    pub regions: Vec<String>,
}

impl PromptContext {
    pub fn new(intents: Vec<IntentVocabulary>, regions: Vec<String>) -> Self {
        Self { intents, regions }
    }
}

const PREAMBLE: &str = "You are the intent classifier of PAstaLink, a bot that gives citizens \
the official links to Italian public services. Classify the user message.

Respond with ONLY a JSON object (no markdown, no explanation):
{\"category\": \"<category>\", \"intent\": \"<intent>\" or null, \"sub_intent\": \"<sub_intent>\" or null, \
\"region\": \"<region>\" or null, \"smalltalk_kind\": \"<kind>\" or null, \"confidence\": <0.0-1.0>}

Categories:
- service_request: the user wants an official service, document, payment or booking.
- smalltalk: greetings, thanks, \"how are you\", help requests, questions about the bot.
- off_topic: anything not related to Italian public administration.
- unclassified: you cannot tell what the user wants.

Smalltalk kinds: greeting, chitchat, help (\"cosa sai fare\", \"what can you do\"), \
about (\"chi sei\", \"who are you\").";

const RULES: &str = "Rules:
- intent and sub_intent must come from the list above; use null for sub_intent when unsure.
- Never invent an intent. If no intent fits, use off_topic.
- region: the Italian region or city the user mentions, as written, or null.
- Only one intent per reply, the most relevant one.
- confidence reflects how sure you are of category and intent together.

Examples:
U: Cosa sai fare?
A: {\"category\": \"smalltalk\", \"intent\": null, \"sub_intent\": null, \"region\": null, \"smalltalk_kind\": \"help\", \"confidence\": 0.95}
U: Prenotare visita medica in Lombardia
A: {\"category\": \"service_request\", \"intent\": \"cup\", \"sub_intent\": null, \"region\": \"Lombardia\", \"smalltalk_kind\": null, \"confidence\": 0.9}
U: Chi ha vinto la partita ieri?
A: {\"category\": \"off_topic\", \"intent\": null, \"sub_intent\": null, \"region\": null, \"smalltalk_kind\": null, \"confidence\": 0.9}";

/// Build the system prompt for one request.
pub fn build_system_prompt(context: &PromptContext, language: Language) -> String {
    let mut prompt = String::with_capacity(2048);
    prompt.push_str(PREAMBLE);

    prompt.push_str("\n\nService intents (intent: sub_intents | example label):\n");
    for vocab in &context.intents {
        let subs = if vocab.sub_intents.is_empty() {
            "-".to_string()
        } else {
            vocab.sub_intents.join(", ")
        };
        let _ = writeln!(prompt, "- {}: {} | {}", vocab.intent, subs, vocab.label);
    }

    if !context.regions.is_empty() {
        let _ = write!(prompt, "\nKnown regions: {}\n", context.regions.join(", "));
    }

    let _ = write!(
        prompt,
        "\nThe user most likely writes in {}.\n\n",
        language.english_name()
    );
    prompt.push_str(RULES);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> PromptContext {
        PromptContext::new(
            vec![
                IntentVocabulary {
                    intent: "bollo_auto".into(),
                    label: "Calcolo bollo auto".into(),
                    sub_intents: vec!["calcolo_bollo".into(), "pagamento".into()],
                },
                IntentVocabulary {
                    intent: "spid".into(),
                    label: "Richiedi SPID".into(),
                    sub_intents: vec![],
                },
            ],
            vec!["Lazio".into(), "Lombardia".into()],
        )
    }

    #[test]
    fn prompt_lists_vocabulary_and_regions() {
        let prompt = build_system_prompt(&context(), Language::It);
        assert!(prompt.contains("- bollo_auto: calcolo_bollo, pagamento | Calcolo bollo auto"));
        assert!(prompt.contains("- spid: - | Richiedi SPID"));
        assert!(prompt.contains("Known regions: Lazio, Lombardia"));
        assert!(prompt.contains("writes in Italian"));
    }

    #[test]
    fn prompt_names_language() {
        let prompt = build_system_prompt(&context(), Language::En);
        assert!(prompt.contains("writes in English"));
    }

    #[test]
    fn empty_context_still_has_categories() {
        let prompt = build_system_prompt(&PromptContext::default(), Language::It);
        assert!(prompt.contains("service_request"));
        assert!(!prompt.contains("Known regions"));
    }
}
