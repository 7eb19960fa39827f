//! crates/fal_core/src/zodiac.rs
//!
//! Pure birth-date to zodiac-sign resolution. The ranges are the fixed
//! day/month table the product uses; they are mutually exclusive and cover
//! every calendar date, Feb 29 included.

use chrono::{Datelike, NaiveDate};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    /// The Turkish display label, as shown to users and embedded in prompts.
    pub fn label(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Koç",
            ZodiacSign::Taurus => "Boğa",
            ZodiacSign::Gemini => "İkizler",
            ZodiacSign::Cancer => "Yengeç",
            ZodiacSign::Leo => "Aslan",
            ZodiacSign::Virgo => "Başak",
            ZodiacSign::Libra => "Terazi",
            ZodiacSign::Scorpio => "Akrep",
            ZodiacSign::Sagittarius => "Yay",
            ZodiacSign::Capricorn => "Oğlak",
            ZodiacSign::Aquarius => "Kova",
            ZodiacSign::Pisces => "Balık",
        }
    }

    /// Resolves a birth date to its sign. Total over all valid dates; the
    /// match arms are ordered so each month's split day is claimed exactly once.
    pub fn from_date(date: NaiveDate) -> Self {
        let month = date.month();
        let day = date.day();
        match (month, day) {
            (3, 21..) | (4, ..=19) => ZodiacSign::Aries,
            (4, _) | (5, ..=20) => ZodiacSign::Taurus,
            (5, _) | (6, ..=20) => ZodiacSign::Gemini,
            (6, _) | (7, ..=22) => ZodiacSign::Cancer,
            (7, _) | (8, ..=22) => ZodiacSign::Leo,
            (8, _) | (9, ..=22) => ZodiacSign::Virgo,
            (9, _) | (10, ..=22) => ZodiacSign::Libra,
            (10, _) | (11, ..=21) => ZodiacSign::Scorpio,
            (11, _) | (12, ..=21) => ZodiacSign::Sagittarius,
            (12, _) | (1, ..=19) => ZodiacSign::Capricorn,
            (1, _) | (2, ..=18) => ZodiacSign::Aquarius,
            _ => ZodiacSign::Pisces,
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::HashMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn boundary_dates_fall_on_the_documented_side() {
        assert_eq!(ZodiacSign::from_date(date(2024, 3, 20)), ZodiacSign::Pisces);
        assert_eq!(ZodiacSign::from_date(date(2024, 3, 21)), ZodiacSign::Aries);
        assert_eq!(ZodiacSign::from_date(date(2024, 4, 19)), ZodiacSign::Aries);
        assert_eq!(ZodiacSign::from_date(date(2024, 4, 20)), ZodiacSign::Taurus);
        assert_eq!(ZodiacSign::from_date(date(2024, 12, 21)), ZodiacSign::Sagittarius);
        assert_eq!(ZodiacSign::from_date(date(2024, 12, 22)), ZodiacSign::Capricorn);
        assert_eq!(ZodiacSign::from_date(date(2024, 1, 19)), ZodiacSign::Capricorn);
        assert_eq!(ZodiacSign::from_date(date(2024, 1, 20)), ZodiacSign::Aquarius);
        assert_eq!(ZodiacSign::from_date(date(2024, 2, 18)), ZodiacSign::Aquarius);
        assert_eq!(ZodiacSign::from_date(date(2024, 2, 19)), ZodiacSign::Pisces);
    }

    #[test]
    fn leap_day_shares_the_late_february_sign() {
        assert_eq!(ZodiacSign::from_date(date(2024, 2, 28)), ZodiacSign::Pisces);
        assert_eq!(ZodiacSign::from_date(date(2024, 2, 29)), ZodiacSign::Pisces);
    }

    #[test]
    fn every_date_of_a_leap_year_maps_to_exactly_one_sign() {
        let mut counts: HashMap<ZodiacSign, u32> = HashMap::new();
        let mut day = date(2024, 1, 1);
        while day.year() == 2024 {
            *counts.entry(ZodiacSign::from_date(day)).or_default() += 1;
            day += Duration::days(1);
        }
        let total: u32 = counts.values().sum();
        assert_eq!(total, 366);
        assert_eq!(counts.len(), 12);
        // Each sign covers roughly a month of dates.
        assert!(counts.values().all(|&n| (28..=33).contains(&n)), "{counts:?}");
    }

    #[test]
    fn gemini_mid_june() {
        assert_eq!(ZodiacSign::from_date(date(1990, 6, 15)), ZodiacSign::Gemini);
        assert_eq!(ZodiacSign::from_date(date(1990, 6, 15)).label(), "İkizler");
    }
}
