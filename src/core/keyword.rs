use crate::utils::error::{Result, ServiceError};
use chrono::{Datelike, NaiveDate};

pub const DEFAULT_WORDS: &[&str] = &[
    "FLI", "LEARN TO LEARN", "INDEPENDENT", "SOCIAL LEADER", "CITIZENSHIP",
    "CARING", "KIND", "TEAM PLAYER", "COOKING", "FAIR",
    "PERSONAL BEST", "LEARN TO BE", "INNOVATIVE", "ARTSSO", "SENIORS",
    "CERRITOS", "RESPECTFUL", "FREEDOM", "COURAGEOUS", "FUNDACIÓN",
    "WEECARE", "COLOMBIA", "THINK", "HUMBLE", "CHONTADURO",
    "SPORTS", "VIADUCTO", "MOTIVATED", "LOYAL", "MULTICULTURAL",
    "LICEO INGLÉS", "UNITED STATES", "LEADERSHIP", "SUCCESS", "EMPATHETIC",
    "HONESTY", "PASSIONATE", "VOLLEYBALL", "SCIENCE", "LEADER",
    "RELIABLE", "HONEST", "INTEGRITY", "LEARN TO THINK", "THOUGHTFUL",
    "JAGGY", "RISARALDA", "GLOBAL CITIZEN", "LOVE IT!", "COFFEE",
    "OPEN MINDED", "RISK TAKER", "CONSOTA", "HAPPY", "SOCCER",
    "DIGNITY", "RESPONSIBLE", "TRUSTWORTHY", "OTÚN", "SIX-SEVEN",
    "ACHIEVEMENT", "GLOBAL", "ROBOTICS", "DIGITAL", "PROACTIVE",
    "PEREIRA", "NHS", "FLIMUN", "30 DE AGOSTO", "CREATIVE",
    "AWARENESS", "NJHS", "COGNIA", "BILINGUAL", "UNDERSTANDING",
    "AUTONOMOUS", "CIVIC", "GO JAGUARS",
];

/// Decorative word of the day printed on every ticket.
///
/// The index is the 1-based day of the year (January 1st is day 1) modulo
/// the word count, so the rotation restarts every January.
#[derive(Debug, Clone)]
pub struct DailyKeyword {
    words: Vec<String>,
}

impl DailyKeyword {
    pub fn new(words: Vec<String>) -> Result<Self> {
        if words.is_empty() {
            return Err(ServiceError::ConfigError {
                message: "keyword word list cannot be empty".to_string(),
            });
        }
        Ok(Self { words })
    }

    pub fn keyword_for(&self, date: NaiveDate) -> String {
        let index = date.ordinal() as usize % self.words.len();
        self.words[index].to_uppercase()
    }
}

impl Default for DailyKeyword {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}
