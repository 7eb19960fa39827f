//! crates/fal_core/src/prompt.rs
//!
//! Prompt assembly for the generation service. Each reading type has a fixed
//! Turkish template instructing the model to answer with a single JSON object
//! and nothing else; drawn cards, the resolved zodiac sign, and the literal
//! user question are spliced in.

use crate::domain::DrawnCard;
use crate::zodiac::ZodiacSign;

const TAROT_PROMPT_TEMPLATE: &str = r#"Sen deneyimli bir tarot falcısı ve astrologsun. Aşağıdaki bilgileri kullanarak kişiye özel bir tarot yorumu yapacaksın.

SEÇİLEN KARTLAR:
{cards}

KİŞİNİN BURCU: {zodiac}

SORULAN SORU: {question}

Yanıtını SADECE aşağıdaki JSON formatında ver. JSON formatı dışında hiçbir metin yazma:

{
  "summary": "Tarot falının genel özeti ve sorunun kısa bir yanıtı (1-2 cümle)",
  "cards": [
{schema_cards}
  ],
  "relationship": "Üç kartın birbiriyle ilişkisi ve oluşturdukları genel hikaye",
  "future": "Gelecek öngörüsü ve kişinin soru hakkındaki cevabı (en az bir paragraf)",
  "advice": "Kişiye özel tavsiyeler (madde madde en az 3 tavsiye)",
  "zodiacInfluence": "Kişinin burcunun tarot falı üzerindeki etkisi"
}

ÖNEMLİ NOTLAR:
1. Yorumunu tamamen sorulan soruya odakla.
2. Kişinin burcunun özelliklerini mutlaka yoruma dahil et.
3. Anlaşılır ve pozitif bir dil kullan, korkutucu ifadelerden kaçın.
4. Yorumunu en az 1-2 paragraf olacak şekilde detaylandır.
5. JSON formatına kesinlikle uy, tüm alanları eksiksiz doldur; fazladan virgül bırakma.
6. Yaratıcı ve kişiye özel bir yorum sağla."#;

const KATINA_PROMPT_TEMPLATE: &str = r#"Sen deneyimli bir Katina falcısı ve astrologsun. "Kelth Haçı" (İmparator Artısı) yöntemini kullanarak Katina falı yorumu yapacaksın. Aşağıdaki bilgileri kullanarak kişiye özel bir Katina falı yorumu yap.

SEÇİLEN KARTLAR:
{cards}

KİŞİNİN BURCU: {zodiac}

SORULAN SORU: {question}

KARTLARIN AÇILIM ANLAMLARI:

1.Nolu Kart (Hayat Kartı): İçinde bulunulan durumu ve sorumuzla ilgili olarak bizi neyin etkisi altına aldığını gösterir.

2.Nolu Kart (Artı Kartı): İçinde bulunulan durumun iyi ve kötü yanlarını, sıkıntıları, arayış yollarını ve çevrenin etkisini anlatır.

3.Nolu Kart (Risk Kartı): Sabitlenmenin, kök salmanın kartıdır; olayların yarattığı korkuların ve arzuların durumu nasıl etkilediğini gösterir.

4.Nolu Kart (Geçmiş Kartı): Geçmişte yaşananları ve bunların kişide bıraktığı izleri simgeler.

5.Nolu Kart (Taç Kartı): Kişiyi neyin taçlandırıp neyin yönettiğini, yapması gerekenleri ve sahip olduğu yetkinlikleri anlatır.

6.Nolu Kart (Gelecek Kartı): Yakın gelecekte karşılaşılacak yenilikleri ve gelişmeleri gösterir.

7.Nolu Kart (Durum Kartı): Kişiyi, olayları ele alışını ve kendi yarattığı engellerden kurtulması için yapması gerekenleri anlatır.

8.Nolu Kart (Evrenin Kartı): Kişinin çevresini, alacağı yardımları ve bu çevrenin sorulan soruya etkisini anlatır.

9.Nolu Kart (İstek ve Beklentilerin Kartı): Ümitlerin kartıdır; arzulara, umutlara, korkulara ve ertelemelere işaret eder.

10.Nolu Kart (Sonuç Kartı): Gelecekte ne olacak sorusuna en net cevabı veren karttır.

Yanıtını SADECE aşağıdaki JSON formatında ver. JSON formatı dışında hiçbir metin yazma:

{
  "summary": "Falın genel özeti ve sorunun kısa bir yanıtı (birkaç paragraf)",
  "cards": [
{schema_cards}
  ],
  "future": "Gelecek öngörüsü ve kişinin soru hakkındaki cevabı (en az bir paragraf)",
  "advice": "Kişiye özel tavsiyeler (madde madde en az 3 tavsiye)"
}

ÖNEMLİ NOTLAR:
1. Yorumunu tamamen sorulan soruya odakla.
2. Kişinin burcunun özelliklerini mutlaka yoruma dahil et.
3. Anlaşılır ve pozitif bir dil kullan, korkutucu ifadelerden kaçın.
4. Yorumunu en az 1-2 paragraf olacak şekilde detaylandır.
5. JSON formatına kesinlikle uy, tüm alanları eksiksiz doldur; fazladan virgül bırakma.
6. Yaratıcı ve kişiye özel bir yorum sağla.
7. "Ters" gelen kartların olumsuz anlamlarını yorumlarında belirt.
8. Kelth Haçı (İmparator Artısı) açılım metodunun kurallarına göre yorumla."#;

const DREAM_PROMPT_TEMPLATE: &str = r#"Sen deneyimli bir rüya yorumcusu ve astrolog olarak çalışıyorsun. Aşağıdaki rüyayı analiz edip yorumlayacaksın.

RÜYA AÇIKLAMASI:
{description}

HİSSEDİLEN DUYGULAR:
{emotions}

Analiz sonucunu SADECE aşağıdaki JSON formatında döndür. JSON formatı dışında hiçbir metin yazma:

{
  "interpretation": "Rüyanın genel anlamı ve yorumu (en az 3 paragraf)",
  "symbols": [
    {
      "name": "Rüyada geçen sembol",
      "meaning": "Bu sembolün anlamı ve psikolojik/spiritüel yorumu",
      "emoji": "Sembolü en iyi temsil eden tek bir emoji"
    }
  ],
  "emotions": [
    {
      "name": "Duygu",
      "impact": "Bu duygunun rüyadaki etkisi ve anlamı"
    }
  ],
  "guidance": "Rüya ile ilgili tavsiye, öneri ve yönlendirme",
  "summary": "Rüyanın tek bir cümlelik özeti"
}

ÖNEMLİ NOTLAR:
1. Yanıtını SADECE JSON formatında ver. Açıklama, giriş veya kapanış cümlesi ekleme.
2. Rüyada en az 3-5 sembol belirle ve her sembol için MUTLAKA bir emoji ekle.
3. JSON formatının geçerli olduğundan emin ol, fazladan virgül veya sözdizimi hatası olmamalı.
4. Kullanıcının belirttiği duyguları analiz et.
5. Yaratıcı, derin ve anlamlı bir rüya yorumu oluştur.
6. Akademik terimler yerine spiritüel ve kolay anlaşılır bir dil kullan."#;

/// Builds the tarot prompt for a complete three-card spread.
pub fn tarot_prompt(cards: &[DrawnCard], sign: ZodiacSign, question: &str) -> String {
    let card_lines = cards
        .iter()
        .enumerate()
        .map(|(i, dc)| {
            let suit = dc
                .card
                .suit
                .as_deref()
                .map(|s| format!(" ({s})"))
                .unwrap_or_default();
            format!("{}. {}: {}{}", i + 1, dc.position, dc.card.name, suit)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let schema_cards = cards
        .iter()
        .map(|dc| {
            format!(
                "    {{\n      \"position\": \"{}\",\n      \"name\": \"{}\",\n      \"interpretation\": \"Bu kartın {} pozisyonundaki anlamı ve kişinin hayatındaki etkisi\"\n    }}",
                dc.position, dc.card.name, dc.position
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");

    TAROT_PROMPT_TEMPLATE
        .replace("{cards}", &card_lines)
        .replace("{schema_cards}", &schema_cards)
        .replace("{zodiac}", sign.label())
        .replace("{question}", question)
}

/// Builds the Katina prompt for a complete ten-card Kelth Cross spread,
/// embedding each card's orientation and its precomputed meaning texts.
pub fn katina_prompt(cards: &[DrawnCard], sign: ZodiacSign, question: &str) -> String {
    let card_blocks = cards
        .iter()
        .enumerate()
        .map(|(i, dc)| {
            let orientation = if dc.reversed { "(Ters)" } else { "(Düz)" };
            let meaning = dc.oriented_meaning().unwrap_or("Bilinmiyor");
            let description = dc
                .meaning
                .as_ref()
                .map(|m| m.description.as_str())
                .unwrap_or("Bilinmiyor");
            format!(
                "{}. {}: {} {}\n   Anlamı: {}\n   Açıklaması: {}",
                i + 1,
                dc.position,
                dc.card.name,
                orientation,
                meaning,
                description
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let schema_cards = cards
        .iter()
        .map(|dc| {
            format!(
                "    {{\n      \"position\": \"{}\",\n      \"name\": \"{}\",\n      \"interpretation\": \"Bu kartın yorumu ve kişinin hayatındaki etkisi\"\n    }}",
                dc.position, dc.card.name
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");

    KATINA_PROMPT_TEMPLATE
        .replace("{cards}", &card_blocks)
        .replace("{schema_cards}", &schema_cards)
        .replace("{zodiac}", sign.label())
        .replace("{question}", question)
}

/// Builds the dream interpretation prompt.
pub fn dream_prompt(description: &str, emotions: &[String]) -> String {
    DREAM_PROMPT_TEMPLATE
        .replace("{description}", description)
        .replace("{emotions}", &emotions.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Card, CardMeaning, DrawnCard};
    use crate::selection::{KATINA_POSITIONS, TAROT_POSITIONS};

    fn drawn(name: &str, suit: Option<&str>, position: &'static str, reversed: bool) -> DrawnCard {
        DrawnCard {
            card: Card {
                name: name.to_string(),
                suit: suit.map(str::to_string),
                image: format!("/images/test/{name}.jpg"),
            },
            position,
            reversed,
            meaning: None,
        }
    }

    #[test]
    fn tarot_prompt_embeds_cards_sign_and_question() {
        let cards = vec![
            drawn("The Fool", None, TAROT_POSITIONS[0], false),
            drawn("Ace of Cups", Some("Kupalar"), TAROT_POSITIONS[1], false),
            drawn("The Sun", None, TAROT_POSITIONS[2], false),
        ];
        let prompt = tarot_prompt(&cards, crate::zodiac::ZodiacSign::Gemini, "İş değiştirecek miyim?");

        assert!(prompt.contains("1. Geçmiş: The Fool"));
        assert!(prompt.contains("2. Şimdiki Zaman: Ace of Cups (Kupalar)"));
        assert!(prompt.contains("3. Gelecek: The Sun"));
        assert!(prompt.contains("KİŞİNİN BURCU: İkizler"));
        assert!(prompt.contains("SORULAN SORU: İş değiştirecek miyim?"));
        assert!(prompt.contains("SADECE aşağıdaki JSON formatında"));
        assert!(prompt.contains("\"name\": \"The Fool\""));
        assert!(prompt.contains("zodiacInfluence"));
    }

    #[test]
    fn katina_prompt_carries_orientation_and_meanings() {
        let mut cards: Vec<DrawnCard> = KATINA_POSITIONS
            .iter()
            .enumerate()
            .map(|(i, pos)| drawn(&format!("Kart{i}"), None, pos, false))
            .collect();
        cards[1].reversed = true;
        cards[1].meaning = Some(CardMeaning {
            description: "Bir sınav kartıdır.".to_string(),
            upright: "Şans ve bereket.".to_string(),
            reversed: "Gecikme ve sabır.".to_string(),
        });

        let prompt = katina_prompt(&cards, crate::zodiac::ZodiacSign::Leo, "Taşınmalı mıyım?");

        assert!(prompt.contains("1. Hayat Kartı (Merkezin Kartı): Kart0 (Düz)"));
        assert!(prompt.contains("2. Artı Kartı: Kart1 (Ters)"));
        assert!(prompt.contains("Anlamı: Gecikme ve sabır."));
        assert!(prompt.contains("Açıklaması: Bir sınav kartıdır."));
        assert!(prompt.contains("Anlamı: Bilinmiyor"));
        assert!(prompt.contains("KİŞİNİN BURCU: Aslan"));
        assert!(prompt.contains("\"position\": \"Sonuç Kartı\""));
    }

    #[test]
    fn dream_prompt_embeds_description_and_emotions() {
        let prompt = dream_prompt(
            "Denizde yüzüyordum.",
            &["korku".to_string(), "merak".to_string()],
        );
        assert!(prompt.contains("Denizde yüzüyordum."));
        assert!(prompt.contains("korku, merak"));
        assert!(prompt.contains("SADECE aşağıdaki JSON formatında"));
    }
}
