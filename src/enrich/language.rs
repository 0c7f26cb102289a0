// src/enrich/language.rs
use tracing::trace;

use super::text::unescape_newlines;
use super::Enricher;
use crate::corpus::{SongRecord, NO_LANGUAGE};

/// Display names for the two-letter codes the reports care about.
pub static LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("ro", "Romanian"),
    ("pt", "Portuguese"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("ru", "Russian"),
    ("tr", "Turkish"),
    ("ja", "Japanese"),
    ("zh", "Chinese"),
    ("ko", "Korean"),
    ("ar", "Arabic"),
    ("sv", "Swedish"),
    ("fi", "Finnish"),
    ("cs", "Czech"),
    ("hu", "Hungarian"),
    ("el", "Greek"),
    ("ca", "Catalan"),
    ("no", "Norwegian"),
    ("sl", "Slovenian"),
    ("hr", "Croatian"),
];

/// whatlang reports ISO 639-3; this folds its languages down to ISO 639-1.
static ISO639_3_TO_1: &[(&str, &str)] = &[
    ("afr", "af"),
    ("aka", "ak"),
    ("amh", "am"),
    ("ara", "ar"),
    ("aze", "az"),
    ("bel", "be"),
    ("ben", "bn"),
    ("bul", "bg"),
    ("cat", "ca"),
    ("ces", "cs"),
    ("cmn", "zh"),
    ("dan", "da"),
    ("deu", "de"),
    ("ell", "el"),
    ("eng", "en"),
    ("epo", "eo"),
    ("est", "et"),
    ("fin", "fi"),
    ("fra", "fr"),
    ("guj", "gu"),
    ("heb", "he"),
    ("hin", "hi"),
    ("hrv", "hr"),
    ("hun", "hu"),
    ("hye", "hy"),
    ("ind", "id"),
    ("ita", "it"),
    ("jav", "jv"),
    ("jpn", "ja"),
    ("kan", "kn"),
    ("kat", "ka"),
    ("khm", "km"),
    ("kor", "ko"),
    ("lat", "la"),
    ("lav", "lv"),
    ("lit", "lt"),
    ("mal", "ml"),
    ("mar", "mr"),
    ("mkd", "mk"),
    ("mya", "my"),
    ("nep", "ne"),
    ("nld", "nl"),
    ("nob", "no"),
    ("ori", "or"),
    ("pan", "pa"),
    ("pes", "fa"),
    ("pol", "pl"),
    ("por", "pt"),
    ("ron", "ro"),
    ("rus", "ru"),
    ("sin", "si"),
    ("slk", "sk"),
    ("slv", "sl"),
    ("sna", "sn"),
    ("spa", "es"),
    ("srp", "sr"),
    ("swe", "sv"),
    ("tam", "ta"),
    ("tel", "te"),
    ("tgl", "tl"),
    ("tha", "th"),
    ("tuk", "tk"),
    ("tur", "tr"),
    ("ukr", "uk"),
    ("urd", "ur"),
    ("uzb", "uz"),
    ("vie", "vi"),
    ("yid", "yi"),
    ("zul", "zu"),
];

fn lookup<'a>(table: &'a [(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Two-letter code for a whatlang code; codes without one pass through.
pub fn two_letter_code(code: &str) -> &str {
    lookup(ISO639_3_TO_1, code).unwrap_or(code)
}

/// Display name for a two-letter code; unknown codes pass through unchanged.
pub fn language_name(code: &str) -> &str {
    lookup(LANGUAGE_NAMES, code).unwrap_or(code)
}

/// Identify the language of `text` as a display name. `None` means the
/// detector had nothing to say or was less confident than `min_confidence`.
pub fn detect_language(text: &str, min_confidence: f64) -> Option<String> {
    let info = whatlang::detect(&unescape_newlines(text))?;
    if info.confidence() < min_confidence {
        trace!(
            lang = info.lang().code(),
            confidence = info.confidence(),
            "detection below confidence floor"
        );
        return None;
    }
    Some(language_name(two_letter_code(info.lang().code())).to_string())
}

/// Fills [`SongRecord::language`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageEnricher {
    min_confidence: f64,
}

impl LanguageEnricher {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }
}

impl Enricher for LanguageEnricher {
    fn name(&self) -> &'static str {
        "language"
    }

    fn enrich(&self, mut record: SongRecord) -> SongRecord {
        record.language = if record.has_lyrics {
            detect_language(&record.lyrics, self.min_confidence).unwrap_or_else(|| {
                trace!(artist = %record.artist, song = %record.song, "language detection failed");
                NO_LANGUAGE.to_string()
            })
        } else {
            NO_LANGUAGE.to_string()
        };
        record
    }
}
