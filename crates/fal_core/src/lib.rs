pub mod catalog;
pub mod domain;
pub mod ports;
pub mod prompt;
pub mod response;
pub mod selection;
pub mod wizard;
pub mod zodiac;

pub use domain::{
    Card, CardInterpretation, CardMeaning, CardReadingRecord, DrawnCard, DreamReading,
    DreamRecord, KatinaReading, NewCardReading, NewDream, ReadingKind, StoredCard, TarotReading,
    User, UserCredentials,
};
pub use ports::{InterpretationService, PortError, PortResult, ReadingStore};
pub use response::ParseOutcome;
pub use selection::{SelectionError, Spread, KATINA_POSITIONS, TAROT_POSITIONS};
pub use wizard::{CardReading, ReadingWizard, SubmitOutcome, WizardError, WizardState};
pub use zodiac::ZodiacSign;
