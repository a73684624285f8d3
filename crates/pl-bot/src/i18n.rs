//! Localized reply templates.
//!
//! Templates are looked up by id in the requested language, then in the
//! fallback language; a template missing everywhere renders as its id.
//! `{name}` placeholders are filled from the render params; unknown
//! placeholders are left as written.

use std::collections::HashMap;
use std::sync::LazyLock;

use pl_protocol::Language;
use regex::{Captures, Regex};

/// Template ids known to the built-in tables.
pub mod ids {
    pub const LINK_FOUND: &str = "link_found";
    pub const LINK_NOTES: &str = "link_notes";
    pub const DISAMBIGUATION: &str = "disambiguation";
    pub const DISAMBIGUATION_ITEM: &str = "disambiguation_item";
    pub const DISAMBIGUATION_REGION_HINT: &str = "disambiguation_region_hint";
    pub const REGION_NATIONAL: &str = "region_national";
    pub const REGION_SUGGESTIONS: &str = "region_suggestions";
    pub const NO_MATCH: &str = "no_match";
    pub const CAPABILITIES: &str = "capabilities";
    pub const GREETING: &str = "greeting";
    pub const SMALLTALK: &str = "smalltalk";
    pub const ABOUT: &str = "about";
    pub const TRANSIENT_ERROR: &str = "transient_error";
    pub const INPUT_EMPTY: &str = "input_empty";
    pub const INPUT_TOO_LONG: &str = "input_too_long";
    pub const INPUT_SPAM: &str = "input_spam";
    pub const REGIONS_LIST: &str = "regions_list";
    pub const REGIONS_EMPTY: &str = "regions_empty";
}

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// Source of localized reply strings.
pub trait Localizer: Send + Sync {
    /// Raw template text, if this localizer has it for `language`.
    fn template(&self, language: Language, id: &str) -> Option<&str>;

    /// Language tried when the requested one lacks a template.
    fn fallback_language(&self) -> Language;

    /// Render `id` in `language` with `{name}` params substituted.
    fn render(&self, language: Language, id: &str, params: &[(&str, &str)]) -> String {
        let Some(template) = self
            .template(language, id)
            .or_else(|| self.template(self.fallback_language(), id))
        else {
            tracing::warn!(template = id, language = %language, "missing template");
            return id.to_string();
        };
        substitute(template, params)
    }
}

/// Replace `{name}` with the matching param value.
pub fn substitute(template: &str, params: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

const ITALIAN: &[(&str, &str)] = &[
    (ids::LINK_FOUND, "Ecco il link ufficiale per te 🍝\n\n{label}{region}\n{url}"),
    (ids::LINK_NOTES, "ℹ️ {notes}"),
    (
        ids::DISAMBIGUATION,
        "Ho trovato più servizi che corrispondono alla tua richiesta. Quale ti serve?",
    ),
    (ids::DISAMBIGUATION_ITEM, "• {label}{region}"),
    (
        ids::DISAMBIGUATION_REGION_HINT,
        "Dimmi in quale regione ti trovi per un risultato preciso.",
    ),
    (ids::REGION_NATIONAL, "nazionale"),
    (
        ids::REGION_SUGGESTIONS,
        "Non conosco la regione \"{mention}\". Forse intendevi: {regions}?",
    ),
    (
        ids::NO_MATCH,
        "Non ho trovato un link ufficiale per questa richiesta.",
    ),
    (
        ids::CAPABILITIES,
        "Posso darti i link ufficiali ai servizi pubblici italiani:\n\
         • Salute: fascicolo sanitario, prenotazioni CUP\n\
         • Veicoli: bollo auto, patente\n\
         • Identità digitale: SPID, CIE, App IO\n\
         • Altri servizi: ANPR, PagoPA, scuola, INPS, Agenzia delle Entrate, TARI\n\n\
         Esempio: \"Come pago il bollo auto?\" oppure \"Prenotare una visita in Lombardia\".",
    ),
    (
        ids::GREETING,
        "Ciao! 👋 Pronto a servirti i link al dente. Di quale servizio pubblico hai bisogno?",
    ),
    (
        ids::SMALLTALK,
        "Tutto bene qui, sto mescolando un po' di link nella pentola 😄 Come posso aiutarti con i servizi pubblici?",
    ),
    (
        ids::ABOUT,
        "Sono PAstaLink 🍝: ti do i link ufficiali ai servizi pubblici italiani senza perdere tempo. \
         Nessun dato personale, solo link rapidi e istruzioni chiare.",
    ),
    (
        ids::TRANSIENT_ERROR,
        "Scusa, il servizio è momentaneamente non disponibile. Riprova tra poco.",
    ),
    (ids::INPUT_EMPTY, "Scrivimi un messaggio e ti aiuto a trovare il link giusto."),
    (
        ids::INPUT_TOO_LONG,
        "Messaggio troppo lungo: resta sotto i {max} caratteri, per favore.",
    ),
    (ids::INPUT_SPAM, "Mandami un messaggio con una domanda, per favore."),
    (ids::REGIONS_LIST, "Regioni disponibili ({count}):\n{regions}"),
    (
        ids::REGIONS_EMPTY,
        "Il catalogo contiene solo servizi nazionali.",
    ),
];

const ENGLISH: &[(&str, &str)] = &[
    (ids::LINK_FOUND, "Here is the official link 🍝\n\n{label}{region}\n{url}"),
    (ids::LINK_NOTES, "ℹ️ {notes}"),
    (
        ids::DISAMBIGUATION,
        "I found several services matching your request. Which one do you need?",
    ),
    (ids::DISAMBIGUATION_ITEM, "• {label}{region}"),
    (
        ids::DISAMBIGUATION_REGION_HINT,
        "Tell me your region for a precise result.",
    ),
    (ids::REGION_NATIONAL, "national"),
    (
        ids::REGION_SUGGESTIONS,
        "I don't know the region \"{mention}\". Did you mean: {regions}?",
    ),
    (ids::NO_MATCH, "I couldn't find an official link for this request."),
    (
        ids::CAPABILITIES,
        "I give you the official links to Italian public services:\n\
         • Health: health records, CUP medical bookings\n\
         • Vehicles: car tax, driving license\n\
         • Digital identity: SPID, CIE, IO app\n\
         • Other services: ANPR, PagoPA, school, INPS, tax agency, waste tax (TARI)\n\n\
         Example: \"How do I pay the car tax?\" or \"Book a medical visit in Lombardy\".",
    ),
    (
        ids::GREETING,
        "Hi there! 👋 Ready to serve your links al dente. Which public service do you need?",
    ),
    (
        ids::SMALLTALK,
        "All good here! Stirring some links in the pot 😄 How can I help with Italian public services?",
    ),
    (
        ids::ABOUT,
        "I'm PAstaLink 🍝: I give you the official links to Italian public services without wasting time. \
         No personal data, just quick links and clear instructions.",
    ),
    (
        ids::TRANSIENT_ERROR,
        "Sorry, the service is temporarily unavailable. Please try again shortly.",
    ),
    (ids::INPUT_EMPTY, "Send me a message and I'll find the right link."),
    (
        ids::INPUT_TOO_LONG,
        "Message too long: please keep it under {max} characters.",
    ),
    (ids::INPUT_SPAM, "Please send me a message with a question."),
    (ids::REGIONS_LIST, "Available regions ({count}):\n{regions}"),
    (ids::REGIONS_EMPTY, "The catalog only contains national services."),
];

/// IT and EN tables compiled into the binary.
#[derive(Debug, Clone)]
pub struct BuiltinLocalizer {
    tables: HashMap<Language, HashMap<String, String>>,
    fallback: Language,
}

impl BuiltinLocalizer {
    pub fn new(fallback: Language) -> Self {
        let table = |entries: &[(&str, &str)]| {
            entries
                .iter()
                .map(|(id, text)| (id.to_string(), text.to_string()))
                .collect::<HashMap<_, _>>()
        };
        let tables = HashMap::from([
            (Language::It, table(ITALIAN)),
            (Language::En, table(ENGLISH)),
        ]);
        Self { tables, fallback }
    }

    /// Replace or add one template.
    pub fn with_template(
        mut self,
        language: Language,
        id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.tables
            .entry(language)
            .or_default()
            .insert(id.into(), text.into());
        self
    }

    /// Remove one template (tests exercise the fallback chain with it).
    pub fn without_template(mut self, language: Language, id: &str) -> Self {
        if let Some(table) = self.tables.get_mut(&language) {
            table.remove(id);
        }
        self
    }
}

impl Default for BuiltinLocalizer {
    fn default() -> Self {
        Self::new(Language::It)
    }
}

impl Localizer for BuiltinLocalizer {
    fn template(&self, language: Language, id: &str) -> Option<&str> {
        self.tables
            .get(&language)
            .and_then(|table| table.get(id))
            .map(String::as_str)
    }

    fn fallback_language(&self) -> Language {
        self.fallback
    }
}
