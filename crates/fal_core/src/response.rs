//! crates/fal_core/src/response.rs
//!
//! Defensive parsing of generation-service output. The model is asked for a
//! single JSON object but regularly wraps it in prose or code fences, drops
//! fields, or truncates; every public parse function here degrades instead
//! of failing, returning a tagged outcome so callers can log fallbacks.

use crate::domain::{
    CardInterpretation, DrawnCard, DreamEmotion, DreamReading, DreamSymbol, KatinaReading,
    TarotReading,
};
use crate::zodiac::ZodiacSign;
use serde::Deserialize;

/// The result of parsing a generation response: either the decoded object
/// (with missing fields repaired) or a fully populated placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    Parsed(T),
    Fallback(T),
}

impl<T> ParseOutcome<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ParseOutcome::Fallback(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            ParseOutcome::Parsed(v) | ParseOutcome::Fallback(v) => v,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResponseParseError {
    #[error("no JSON object found in the response")]
    MissingJson,
    #[error("response JSON could not be decoded: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Locates the JSON object inside a free-text response. If the trimmed text
/// already starts with `{` the whole text is taken; otherwise the slice from
/// the first `{` to the last `}` is, which also strips code fences and any
/// prose before or after the object.
pub fn extract_json(raw: &str) -> Result<&str, ResponseParseError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }
    let start = raw.find('{').ok_or(ResponseParseError::MissingJson)?;
    let end = raw.rfind('}').ok_or(ResponseParseError::MissingJson)?;
    if end < start {
        return Err(ResponseParseError::MissingJson);
    }
    Ok(&raw[start..=end])
}

//=========================================================================================
// Raw (all-optional) decode targets
//=========================================================================================

#[derive(Deserialize)]
struct RawCardEntry {
    position: Option<String>,
    name: Option<String>,
    interpretation: Option<String>,
}

#[derive(Deserialize)]
struct RawTarot {
    summary: Option<String>,
    cards: Option<Vec<RawCardEntry>>,
    relationship: Option<String>,
    future: Option<String>,
    advice: Option<String>,
    #[serde(rename = "zodiacInfluence")]
    zodiac_influence: Option<String>,
}

#[derive(Deserialize)]
struct RawKatina {
    summary: Option<String>,
    cards: Option<Vec<RawCardEntry>>,
    future: Option<String>,
    advice: Option<String>,
}

#[derive(Deserialize)]
struct RawDreamSymbol {
    name: Option<String>,
    meaning: Option<String>,
    emoji: Option<String>,
}

#[derive(Deserialize)]
struct RawDreamEmotion {
    name: Option<String>,
    impact: Option<String>,
}

#[derive(Deserialize)]
struct RawDream {
    summary: Option<String>,
    interpretation: Option<String>,
    symbols: Option<Vec<RawDreamSymbol>>,
    emotions: Option<Vec<RawDreamEmotion>>,
    guidance: Option<String>,
}

fn repair_card_entries(raw: Option<Vec<RawCardEntry>>, drawn: &[DrawnCard]) -> Vec<CardInterpretation> {
    raw.unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, entry)| CardInterpretation {
            position: entry
                .position
                .unwrap_or_else(|| drawn.get(i).map(|d| d.position.to_string()).unwrap_or_default()),
            name: entry
                .name
                .unwrap_or_else(|| drawn.get(i).map(|d| d.card.name.clone()).unwrap_or_default()),
            interpretation: entry
                .interpretation
                .unwrap_or_else(|| "Kart yorumlanamadı.".to_string()),
        })
        .collect()
}

fn placeholder_cards(drawn: &[DrawnCard]) -> Vec<CardInterpretation> {
    drawn
        .iter()
        .map(|d| CardInterpretation {
            position: d.position.to_string(),
            name: d.card.name.clone(),
            interpretation: "Kart yorumlanamadı.".to_string(),
        })
        .collect()
}

//=========================================================================================
// Tarot
//=========================================================================================

fn try_parse_tarot(
    raw: &str,
    drawn: &[DrawnCard],
    sign: ZodiacSign,
) -> Result<TarotReading, ResponseParseError> {
    let decoded: RawTarot = serde_json::from_str(extract_json(raw)?)?;
    Ok(TarotReading {
        summary: decoded
            .summary
            .unwrap_or_else(|| "Tarot falı yorumu hazır.".to_string()),
        cards: repair_card_entries(decoded.cards, drawn),
        relationship: decoded
            .relationship
            .unwrap_or_else(|| "Kartlar arasında güçlü bir bağlantı görünüyor.".to_string()),
        future: decoded
            .future
            .unwrap_or_else(|| "Gelecek, seçimlerinizle şekillenecektir.".to_string()),
        advice: decoded
            .advice
            .unwrap_or_else(|| "Sezgilerinize güvenin ve kalbinizin sesini dinleyin.".to_string()),
        zodiac_influence: decoded.zodiac_influence.unwrap_or_else(|| {
            format!("{} burcunun özellikleri bu yorumu etkilemektedir.", sign)
        }),
    })
}

/// The full placeholder object substituted when the tarot response cannot
/// be decoded at all.
pub fn tarot_fallback(drawn: &[DrawnCard], sign: ZodiacSign) -> TarotReading {
    TarotReading {
        summary: "Tarot falı yorumlanırken bir hata oluştu.".to_string(),
        cards: placeholder_cards(drawn),
        relationship: "Kartlar arasındaki ilişki yorumlanamadı.".to_string(),
        future: "Gelecek öngörüsü oluşturulamadı.".to_string(),
        advice: "Teknik bir hatadan dolayı tavsiye verilemiyor.".to_string(),
        zodiac_influence: format!("{} burcunuzun etkisi hesaplanamadı.", sign),
    }
}

/// Parses a tarot response, repairing missing fields and substituting the
/// full placeholder object when no JSON can be decoded. Never errors.
pub fn parse_tarot(raw: &str, drawn: &[DrawnCard], sign: ZodiacSign) -> ParseOutcome<TarotReading> {
    match try_parse_tarot(raw, drawn, sign) {
        Ok(reading) => ParseOutcome::Parsed(reading),
        Err(_) => ParseOutcome::Fallback(tarot_fallback(drawn, sign)),
    }
}

//=========================================================================================
// Katina
//=========================================================================================

fn try_parse_katina(raw: &str, drawn: &[DrawnCard]) -> Result<KatinaReading, ResponseParseError> {
    let decoded: RawKatina = serde_json::from_str(extract_json(raw)?)?;
    Ok(KatinaReading {
        summary: decoded
            .summary
            .unwrap_or_else(|| "Katina falı yorumu hazır.".to_string()),
        cards: repair_card_entries(decoded.cards, drawn),
        future: decoded
            .future
            .unwrap_or_else(|| "Gelecek, seçimlerinizle şekillenecektir.".to_string()),
        advice: decoded
            .advice
            .unwrap_or_else(|| "Sezgilerinize güvenin ve kalbinizin sesini dinleyin.".to_string()),
    })
}

/// The full placeholder object substituted when the Katina response cannot
/// be decoded at all.
pub fn katina_fallback(drawn: &[DrawnCard]) -> KatinaReading {
    KatinaReading {
        summary: "Katina falı yorumlanırken bir hata oluştu.".to_string(),
        cards: placeholder_cards(drawn),
        future: "Gelecek öngörüsü oluşturulamadı.".to_string(),
        advice: "Teknik bir hatadan dolayı tavsiye verilemiyor.".to_string(),
    }
}

/// Parses a Katina response with the same degrade-don't-fail policy as the
/// other reading types. Never errors.
pub fn parse_katina(raw: &str, drawn: &[DrawnCard]) -> ParseOutcome<KatinaReading> {
    match try_parse_katina(raw, drawn) {
        Ok(reading) => ParseOutcome::Parsed(reading),
        Err(_) => ParseOutcome::Fallback(katina_fallback(drawn)),
    }
}

//=========================================================================================
// Dreams
//=========================================================================================

/// Keyword → emoji table for symbols the model returned without an emoji.
/// Matched case-insensitively as a substring of the symbol name.
const DEFAULT_EMOJIS: [(&str, &str); 20] = [
    ("su", "💧"),
    ("deniz", "🌊"),
    ("gökyüzü", "🌌"),
    ("yıldız", "⭐"),
    ("ağaç", "🌳"),
    ("güneş", "☀️"),
    ("ay", "🌙"),
    ("ev", "🏠"),
    ("araba", "🚗"),
    ("uçak", "✈️"),
    ("insan", "👤"),
    ("hayvan", "🐾"),
    ("kuş", "🦅"),
    ("yılan", "🐍"),
    ("dağ", "⛰️"),
    ("yol", "🛣️"),
    ("kapı", "🚪"),
    ("anahtar", "🔑"),
    ("kitap", "📚"),
    ("kalem", "✏️"),
];

fn default_emoji(symbol_name: &str) -> String {
    let lower = symbol_name.to_lowercase();
    for (keyword, emoji) in DEFAULT_EMOJIS {
        if lower.contains(keyword) {
            return emoji.to_string();
        }
    }
    "✨".to_string()
}

fn try_parse_dream(raw: &str) -> Result<DreamReading, ResponseParseError> {
    let decoded: RawDream = serde_json::from_str(extract_json(raw)?)?;
    let symbols = decoded
        .symbols
        .unwrap_or_default()
        .into_iter()
        .map(|s| {
            let name = s.name.unwrap_or_default();
            let emoji = match s.emoji {
                Some(e) if !e.trim().is_empty() => e,
                _ => default_emoji(&name),
            };
            DreamSymbol {
                meaning: s.meaning.unwrap_or_default(),
                name,
                emoji,
            }
        })
        .collect();
    let emotions = decoded
        .emotions
        .unwrap_or_default()
        .into_iter()
        .map(|e| DreamEmotion {
            name: e.name.unwrap_or_default(),
            impact: e.impact.unwrap_or_default(),
        })
        .collect();
    Ok(DreamReading {
        summary: decoded.summary.unwrap_or_else(|| "Rüyanın özeti".to_string()),
        interpretation: decoded
            .interpretation
            .unwrap_or_else(|| "Rüya yorumu yapılamadı.".to_string()),
        symbols,
        emotions,
        guidance: decoded
            .guidance
            .unwrap_or_else(|| "Tavsiye bulunmuyor.".to_string()),
    })
}

/// The full placeholder object substituted when the dream response cannot
/// be decoded at all.
pub fn dream_fallback() -> DreamReading {
    DreamReading {
        summary: "Rüya yorumu oluşturulurken bir hata oluştu.".to_string(),
        interpretation:
            "Üzgünüz, rüya yorumu işlenirken bir hata oluştu. Lütfen daha sonra tekrar deneyin."
                .to_string(),
        symbols: vec![
            DreamSymbol {
                name: "Hata".to_string(),
                meaning: "Rüya yorumlama sisteminde geçici bir sorun oluştu.".to_string(),
                emoji: "⚠️".to_string(),
            },
            DreamSymbol {
                name: "Teknik Sorun".to_string(),
                meaning: "Yapay zeka yanıtı işlenirken teknik bir problem oluştu.".to_string(),
                emoji: "🔧".to_string(),
            },
        ],
        emotions: vec![DreamEmotion {
            name: "Belirsiz".to_string(),
            impact: "Rüyanızdaki duygular analiz edilemedi.".to_string(),
        }],
        guidance: "Lütfen daha sonra tekrar deneyiniz.".to_string(),
    }
}

/// Parses a dream response, backfilling emojis and repairing missing fields.
/// Never errors.
pub fn parse_dream(raw: &str) -> ParseOutcome<DreamReading> {
    match try_parse_dream(raw) {
        Ok(reading) => ParseOutcome::Parsed(reading),
        Err(_) => ParseOutcome::Fallback(dream_fallback()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Card;

    fn drawn(name: &str, position: &'static str) -> DrawnCard {
        DrawnCard {
            card: Card {
                name: name.to_string(),
                suit: None,
                image: format!("/images/test/{name}.jpg"),
            },
            position,
            reversed: false,
            meaning: None,
        }
    }

    fn three_drawn() -> Vec<DrawnCard> {
        vec![
            drawn("The Fool", "Geçmiş"),
            drawn("The Star", "Şimdiki Zaman"),
            drawn("The Sun", "Gelecek"),
        ]
    }

    const VALID_TAROT: &str = r#"{
        "summary": "Değişim kapıda.",
        "cards": [
            {"position": "Geçmiş", "name": "The Fool", "interpretation": "Yeni başlangıçlar."},
            {"position": "Şimdiki Zaman", "name": "The Star", "interpretation": "Umut dolu bir dönem."},
            {"position": "Gelecek", "name": "The Sun", "interpretation": "Aydınlık günler."}
        ],
        "relationship": "Kartlar bir yükseliş hikayesi anlatıyor.",
        "future": "İş hayatınızda olumlu gelişmeler var.",
        "advice": "Cesur olun.",
        "zodiacInfluence": "İkizler etkisi güçlü."
    }"#;

    #[test]
    fn parses_a_clean_json_object() {
        let outcome = parse_tarot(VALID_TAROT, &three_drawn(), ZodiacSign::Gemini);
        assert!(!outcome.is_fallback());
        let reading = outcome.into_inner();
        assert_eq!(reading.summary, "Değişim kapıda.");
        assert_eq!(reading.cards.len(), 3);
        assert_eq!(reading.cards[0].position, "Geçmiş");
    }

    #[test]
    fn extracts_json_wrapped_in_commentary() {
        let wrapped = format!("Here is the result:\n{VALID_TAROT}\nHope this helps!");
        let outcome = parse_tarot(&wrapped, &three_drawn(), ZodiacSign::Gemini);
        assert!(!outcome.is_fallback());
        assert_eq!(outcome.into_inner().cards[2].name, "The Sun");
    }

    #[test]
    fn extracts_json_from_a_fenced_code_block() {
        let fenced = format!("```json\n{VALID_TAROT}\n```");
        let outcome = parse_tarot(&fenced, &three_drawn(), ZodiacSign::Gemini);
        assert!(!outcome.is_fallback());
    }

    #[test]
    fn missing_fields_get_documented_defaults() {
        let outcome = parse_tarot(r#"{"summary": "Kısa özet."}"#, &three_drawn(), ZodiacSign::Leo);
        assert!(!outcome.is_fallback());
        let reading = outcome.into_inner();
        assert_eq!(reading.summary, "Kısa özet.");
        assert!(reading.cards.is_empty());
        assert!(!reading.relationship.is_empty());
        assert!(!reading.future.is_empty());
        assert!(!reading.advice.is_empty());
        assert!(reading.zodiac_influence.contains("Aslan"));
    }

    #[test]
    fn truncated_json_yields_the_full_fallback() {
        let outcome = parse_tarot(r#"{"summary": "kesik"#, &three_drawn(), ZodiacSign::Gemini);
        assert!(outcome.is_fallback());
        let reading = outcome.into_inner();
        assert!(!reading.summary.is_empty());
        assert_eq!(reading.cards.len(), 3);
        assert!(reading.cards.iter().all(|c| !c.interpretation.is_empty()));
        assert!(!reading.relationship.is_empty());
        assert!(!reading.future.is_empty());
        assert!(!reading.advice.is_empty());
        assert!(!reading.zodiac_influence.is_empty());
    }

    #[test]
    fn no_json_at_all_yields_the_fallback() {
        let outcome = parse_katina("Üzgünüm, yardımcı olamam.", &three_drawn());
        assert!(outcome.is_fallback());
        assert_eq!(outcome.into_inner().cards.len(), 3);
    }

    #[test]
    fn katina_missing_fields_are_repaired() {
        let raw = r#"{"cards": [{"name": "Gunes"}]}"#;
        let outcome = parse_katina(raw, &[drawn("Gunes", "Hayat Kartı (Merkezin Kartı)")]);
        assert!(!outcome.is_fallback());
        let reading = outcome.into_inner();
        assert_eq!(reading.cards[0].position, "Hayat Kartı (Merkezin Kartı)");
        assert_eq!(reading.cards[0].interpretation, "Kart yorumlanamadı.");
        assert!(!reading.summary.is_empty());
    }

    #[test]
    fn dream_symbols_get_emoji_backfill() {
        let raw = r#"{
            "summary": "Kısa özet",
            "interpretation": "Uzun yorum",
            "symbols": [
                {"name": "Deniz kenarı", "meaning": "Duygusal derinlik"},
                {"name": "Ejderha", "meaning": "Güç"}
            ],
            "emotions": [{"name": "Korku", "impact": "Temkin"}],
            "guidance": "Sakin kalın"
        }"#;
        let outcome = parse_dream(raw);
        assert!(!outcome.is_fallback());
        let reading = outcome.into_inner();
        assert_eq!(reading.symbols[0].emoji, "🌊");
        assert_eq!(reading.symbols[1].emoji, "✨");
    }

    #[test]
    fn dream_fallback_fills_every_field() {
        let outcome = parse_dream("not json");
        assert!(outcome.is_fallback());
        let reading = outcome.into_inner();
        assert!(!reading.summary.is_empty());
        assert!(!reading.interpretation.is_empty());
        assert!(!reading.symbols.is_empty());
        assert!(!reading.emotions.is_empty());
        assert!(!reading.guidance.is_empty());
        assert!(reading.symbols.iter().all(|s| !s.emoji.is_empty()));
    }
}
