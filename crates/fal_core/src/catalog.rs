//! crates/fal_core/src/catalog.rs
//!
//! Static card catalogs for the tarot and Katina decks. Built once at
//! startup from fixed lists; card names are unique within each catalog.

use crate::domain::Card;

//=========================================================================================
// Tarot
//=========================================================================================

const MAJOR_ARCANA: [(&str, &str); 22] = [
    ("The Fool", "The_Fool.jpg"),
    ("The Magician", "The_Magician.jpg"),
    ("The High Priestess", "The_High_Priestess.jpg"),
    ("The Empress", "The_Empress.jpg"),
    ("The Emperor", "The_Emperor.jpg"),
    ("The Hierophant", "The_Hierophant.jpg"),
    ("The Lovers", "The_Lovers.png"),
    ("The Chariot", "The_Chariot.jpg"),
    ("Strength", "Strength.jpg"),
    ("The Hermit", "The_Hermit.jpg"),
    ("Wheel of Fortune", "Wheel_of_Fortune.jpg"),
    ("Justice", "Justice.jpg"),
    ("The Hanged Man", "The_Hanged_Man.jpg"),
    ("Death", "Death.jpg"),
    ("Temperance", "Temperance.jpg"),
    ("The Devil", "The_Devil.jpg"),
    ("The Tower", "The_Tower.jpg"),
    ("The Star", "The_Star.jpg"),
    ("The Moon", "The_Moon.jpg"),
    ("The Sun", "The_Sun.jpg"),
    ("Judgement", "Judgement.jpg"),
    ("The World", "The_World.jpg"),
];

// The cups keep their hand-named image files from the original asset set.
const CUPS: [(&str, &str); 14] = [
    ("Ace of Cups", "Kupa_Asi.jpg"),
    ("Two of Cups", "Kupa_ikilisi.jpg"),
    ("Three of Cups", "Kupa_Uclusu.jpg"),
    ("Four of Cups", "Kupa_Dortlusu.jpg"),
    ("Five of Cups", "Kupa_Beslisi.jpg"),
    ("Six of Cups", "Kupa_Altilisi.jpg"),
    ("Seven of Cups", "Kupa_Yedilisi.jpg"),
    ("Eight of Cups", "Kupa_Sekizlisi.jpg"),
    ("Nine of Cups", "Kupa_Dokuzlusu.jpg"),
    ("Ten of Cups", "Kupa_Onlusu.jpg"),
    ("Page of Cups", "Page_Of_Cups.jpg"),
    ("Knight of Cups", "Kupa_Sovalyesi.jpg"),
    ("Queen of Cups", "Kupa_Kralicesi.jpg"),
    ("King of Cups", "Kupa_Krali.jpg"),
];

/// English rank name for positions 1..=14 within a minor suit.
fn rank_name(num: usize, suit_word: &str) -> String {
    match num {
        1 => format!("Ace of {suit_word}"),
        2 => format!("Two of {suit_word}"),
        3 => format!("Three of {suit_word}"),
        4 => format!("Four of {suit_word}"),
        5 => format!("Five of {suit_word}"),
        6 => format!("Six of {suit_word}"),
        7 => format!("Seven of {suit_word}"),
        8 => format!("Eight of {suit_word}"),
        9 => format!("Nine of {suit_word}"),
        10 => format!("Ten of {suit_word}"),
        11 => format!("Page of {suit_word}"),
        12 => format!("Knight of {suit_word}"),
        13 => format!("Queen of {suit_word}"),
        14 => format!("King of {suit_word}"),
        _ => format!("{num} of {suit_word}"),
    }
}

fn numbered_suit(suit: &str, suit_word: &str, dir: &str, prefix: &str) -> Vec<Card> {
    (1..=14)
        .map(|num| Card {
            name: rank_name(num, suit_word),
            suit: Some(suit.to_string()),
            image: format!("/images/tarot/Minor_Kartlar/{dir}/{prefix}_{num}.jpg"),
        })
        .collect()
}

/// The full 78-card tarot deck in catalog order: major arcana, then
/// cups, swords, wands, and pentacles.
pub fn tarot_catalog() -> Vec<Card> {
    let mut cards: Vec<Card> = MAJOR_ARCANA
        .iter()
        .map(|(name, file)| Card {
            name: (*name).to_string(),
            suit: None,
            image: format!("/images/tarot/Major_Kartlar/{file}"),
        })
        .collect();

    cards.extend(CUPS.iter().map(|(name, file)| Card {
        name: (*name).to_string(),
        suit: Some("Kupalar".to_string()),
        image: format!("/images/tarot/Minor_Kartlar/Kupalar/{file}"),
    }));
    cards.extend(numbered_suit("Kılıçlar", "Swords", "Kiliclar", "Kilic"));
    cards.extend(numbered_suit("Değnekler", "Wands", "Degnekler", "Degnek"));
    cards.extend(numbered_suit("Tilsımlar", "Pentacles", "Tilsimlar", "Tilsim"));
    cards
}

//=========================================================================================
// Katina
//=========================================================================================

const KATINA_IMAGES: [&str; 65] = [
    "Agac.png", "Afyon.png", "Alyans.png", "Anahtar.png", "Ariman.jpg",
    "Assyranta.jpg", "Atart.png", "Abonoz.jpg", "Aral.jpg", "Adhamdeva.jpg",
    "Ay.png", "Bahceler.png", "Balik.jpg", "Baykus.png", "Bedes.jpg",
    "Bulutlar.png", "Capa.png", "Cicekler.jpg", "Dastar.jpg", "Dag.png",
    "Dare.jpg", "Dervis.png", "Deve.png", "Elmas.jpg", "Eprahhat.jpg",
    "Ev.png", "Gamhat.jpg", "Gunes.png", "Hac.png", "Hesse.jpg",
    "İsfahan.jpg", "Kalif.jpg", "Kalp.png", "Kale.png", "Kapi.png",
    "Kareler.png", "Kiz_Cocugu.png", "Kitap.png", "Kopek.png", "Mektup.png",
    "Mezar.png", "Mida.jpg", "Munzur.jpg", "Nil_NEHRi.png", "Parsadra.jpg",
    "Saah.jpg", "Samyeli.png", "Selana.jpg", "Selçukassa.jpg", "Sunit.jpg",
    "Supurge.png", "Tagral.jpg", "Tattaret.jpg", "Tilki.png", "Turan.jpg",
    "Urmia.jpg", "Valide.png", "Yakut.jpg", "Yatagan.png", "Yelkenli.png",
    "Yildizlar.png", "Yilan.png", "Yol.png", "Zara.jpg", "Zümrüt.jpg",
];

/// The 65-card Katina deck. Card names are the image file names without
/// their extension, matching the product's asset naming.
pub fn katina_catalog() -> Vec<Card> {
    KATINA_IMAGES
        .iter()
        .map(|filename| {
            let name = filename
                .trim_end_matches(".png")
                .trim_end_matches(".jpg")
                .to_string();
            Card {
                name,
                suit: None,
                image: format!("/images/katina/{filename}"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tarot_catalog_has_78_unique_cards() {
        let cards = tarot_catalog();
        assert_eq!(cards.len(), 78);
        let names: HashSet<&str> = cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), 78);
    }

    #[test]
    fn tarot_suits_hold_14_cards_each() {
        let cards = tarot_catalog();
        for suit in ["Kupalar", "Kılıçlar", "Değnekler", "Tilsımlar"] {
            let count = cards
                .iter()
                .filter(|c| c.suit.as_deref() == Some(suit))
                .count();
            assert_eq!(count, 14, "suit {suit}");
        }
        let majors = cards.iter().filter(|c| c.suit.is_none()).count();
        assert_eq!(majors, 22);
    }

    #[test]
    fn katina_catalog_has_65_unique_cards() {
        let cards = katina_catalog();
        assert_eq!(cards.len(), 65);
        let names: HashSet<&str> = cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), 65);
        assert!(cards.iter().all(|c| c.suit.is_none()));
        assert!(cards.iter().all(|c| c.image.starts_with("/images/katina/")));
    }
}
