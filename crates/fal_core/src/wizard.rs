//! crates/fal_core/src/wizard.rs
//!
//! The explicit reading-submission state machine for card readings:
//! SelectingCards → EnteringDetails → (AwaitingAuth ⇄) Submitting →
//! Completed | Failed. The machine owns the spread and the drafted details
//! and drives the interpretation and persistence ports at submission; it has
//! no knowledge of any rendering layer.

use crate::domain::{
    CardMeaning, KatinaReading, NewCardReading, ReadingKind, StoredCard, TarotReading,
};
use crate::ports::{InterpretationService, PortError, ReadingStore};
use crate::selection::{SelectionError, Spread};
use chrono::NaiveDate;
use rand::Rng;
use tracing::warn;
use uuid::Uuid;

/// The interpretation produced by a completed card-reading submission.
#[derive(Debug, Clone, PartialEq)]
pub enum CardReading {
    Tarot(TarotReading),
    Katina(KatinaReading),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    SelectingCards,
    EnteringDetails,
    /// Submission attempted without an authenticated user; drafted state is
    /// preserved so the reading can resume after login.
    AwaitingAuth,
    Completed,
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("exactly {expected} cards must be selected ({actual}/{expected})")]
    IncompleteSelection { expected: usize, actual: usize },
    #[error("a question and birth date are required")]
    MissingDetails,
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("operation '{0}' is not allowed in the current step")]
    InvalidTransition(&'static str),
    #[error("interpretation failed: {0}")]
    Generation(#[from] PortError),
}

/// What a submission attempt produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Completed(CardReading),
    /// The machine paused in `AwaitingAuth`; resubmit with a user id.
    AuthRequired,
}

pub struct ReadingWizard {
    spread: Spread,
    question: Option<String>,
    birth_date: Option<NaiveDate>,
    state: WizardState,
}

impl ReadingWizard {
    pub fn tarot() -> Self {
        Self::over(Spread::tarot())
    }

    pub fn katina() -> Self {
        Self::over(Spread::katina())
    }

    /// Starts a wizard over an existing spread. Useful for tests with small
    /// pools.
    pub fn over(spread: Spread) -> Self {
        Self {
            spread,
            question: None,
            birth_date: None,
            state: WizardState::SelectingCards,
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn kind(&self) -> ReadingKind {
        self.spread.kind()
    }

    pub fn spread(&self) -> &Spread {
        &self.spread
    }

    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    fn require_selecting(&self, op: &'static str) -> Result<(), WizardError> {
        if self.state == WizardState::SelectingCards {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition(op))
        }
    }

    // --- Step 1: card selection ---

    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) -> Result<(), WizardError> {
        self.require_selecting("shuffle")?;
        self.spread.shuffle(rng);
        Ok(())
    }

    pub fn select_card<R: Rng>(&mut self, name: &str, rng: &mut R) -> Result<(), WizardError> {
        self.require_selecting("select")?;
        self.spread.select(name, rng)?;
        Ok(())
    }

    pub fn select_prechosen(&mut self, name: &str, reversed: bool) -> Result<(), WizardError> {
        self.require_selecting("select")?;
        self.spread.select_prechosen(name, reversed)?;
        Ok(())
    }

    pub fn remove_card(&mut self, index: usize) -> Result<(), WizardError> {
        self.require_selecting("remove")?;
        self.spread.remove(index)?;
        Ok(())
    }

    pub fn reset_cards(&mut self) -> Result<(), WizardError> {
        self.require_selecting("reset")?;
        self.spread.reset();
        Ok(())
    }

    /// Step 1 → step 2, guarded by the exact required card count.
    pub fn proceed_to_details(&mut self) -> Result<(), WizardError> {
        self.require_selecting("proceed")?;
        if !self.spread.is_complete() {
            return Err(WizardError::IncompleteSelection {
                expected: self.spread.capacity(),
                actual: self.spread.drawn().len(),
            });
        }
        self.state = WizardState::EnteringDetails;
        Ok(())
    }

    // --- Step 2: details ---

    pub fn set_details(&mut self, question: &str, birth_date: NaiveDate) -> Result<(), WizardError> {
        if !matches!(
            self.state,
            WizardState::EnteringDetails | WizardState::AwaitingAuth
        ) {
            return Err(WizardError::InvalidTransition("set_details"));
        }
        if question.trim().is_empty() {
            return Err(WizardError::MissingDetails);
        }
        self.question = Some(question.trim().to_string());
        self.birth_date = Some(birth_date);
        Ok(())
    }

    /// Attaches meaning texts to the drawn cards before submission.
    pub fn annotate_meanings<F>(&mut self, lookup: F) -> Result<(), WizardError>
    where
        F: Fn(&str) -> Option<CardMeaning>,
    {
        if !matches!(
            self.state,
            WizardState::EnteringDetails | WizardState::AwaitingAuth
        ) {
            return Err(WizardError::InvalidTransition("annotate_meanings"));
        }
        self.spread.annotate_meanings(lookup);
        Ok(())
    }

    // --- Submission ---

    /// Runs the submission pipeline: interpretation call, then a best-effort
    /// persistence write. Without a user identity the machine pauses in
    /// `AwaitingAuth` and keeps all drafted state. A persistence failure is
    /// logged and does not block completion; a generation failure moves the
    /// machine to `Failed`.
    pub async fn submit(
        &mut self,
        user_id: Option<Uuid>,
        interpreter: &dyn InterpretationService,
        store: &dyn ReadingStore,
    ) -> Result<SubmitOutcome, WizardError> {
        if !matches!(
            self.state,
            WizardState::EnteringDetails | WizardState::AwaitingAuth
        ) {
            return Err(WizardError::InvalidTransition("submit"));
        }
        let (question, birth_date) = match (self.question.clone(), self.birth_date) {
            (Some(q), Some(d)) if !q.is_empty() => (q, d),
            _ => return Err(WizardError::MissingDetails),
        };
        let Some(user_id) = user_id else {
            self.state = WizardState::AwaitingAuth;
            return Ok(SubmitOutcome::AuthRequired);
        };

        let cards = self.spread.drawn();
        let reading = match self.spread.kind() {
            ReadingKind::Tarot => {
                match interpreter.interpret_tarot(cards, birth_date, &question).await {
                    Ok(r) => CardReading::Tarot(r),
                    Err(e) => {
                        self.state = WizardState::Failed;
                        return Err(WizardError::Generation(e));
                    }
                }
            }
            ReadingKind::Katina => {
                match interpreter.interpret_katina(cards, birth_date, &question).await {
                    Ok(r) => CardReading::Katina(r),
                    Err(e) => {
                        self.state = WizardState::Failed;
                        return Err(WizardError::Generation(e));
                    }
                }
            }
            ReadingKind::Dream => return Err(WizardError::InvalidTransition("submit")),
        };

        let interpretation = match &reading {
            CardReading::Tarot(r) => serde_json::to_value(r),
            CardReading::Katina(r) => serde_json::to_value(r),
        }
        .unwrap_or(serde_json::Value::Null);

        let new_reading = NewCardReading {
            user_id,
            question,
            birth_date,
            selected_cards: self.stored_cards(),
            interpretation,
        };
        if let Err(e) = store.save_card_reading(self.spread.kind(), &new_reading).await {
            // The user still gets their result; only history is affected.
            warn!(error = %e, "failed to persist reading, continuing");
        }

        self.state = WizardState::Completed;
        Ok(SubmitOutcome::Completed(reading))
    }

    fn stored_cards(&self) -> Vec<StoredCard> {
        let katina = self.spread.kind() == ReadingKind::Katina;
        self.spread
            .drawn()
            .iter()
            .map(|dc| StoredCard {
                name: dc.card.name.clone(),
                suit: dc.card.suit.clone(),
                image: dc.card.image.clone(),
                reversed: katina.then_some(dc.reversed),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CardReadingRecord, DrawnCard, DreamReading, DreamRecord, NewDream, User, UserCredentials,
    };
    use crate::ports::{PortResult, ReadingStore};
    use crate::response::{parse_tarot, ParseOutcome};
    use crate::zodiac::ZodiacSign;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    /// Interpreter fake that runs the real parser over a canned raw response.
    struct CannedInterpreter {
        raw: String,
        fail: bool,
    }

    #[async_trait]
    impl InterpretationService for CannedInterpreter {
        async fn interpret_tarot(
            &self,
            cards: &[DrawnCard],
            birth_date: NaiveDate,
            _question: &str,
        ) -> PortResult<TarotReading> {
            if self.fail {
                return Err(PortError::Unexpected("generation unavailable".to_string()));
            }
            let sign = ZodiacSign::from_date(birth_date);
            Ok(parse_tarot(&self.raw, cards, sign).into_inner())
        }

        async fn interpret_katina(
            &self,
            cards: &[DrawnCard],
            _birth_date: NaiveDate,
            _question: &str,
        ) -> PortResult<KatinaReading> {
            if self.fail {
                return Err(PortError::Unexpected("generation unavailable".to_string()));
            }
            Ok(match crate::response::parse_katina(&self.raw, cards) {
                ParseOutcome::Parsed(r) | ParseOutcome::Fallback(r) => r,
            })
        }

        async fn interpret_dream(
            &self,
            _description: &str,
            _emotions: &[String],
        ) -> PortResult<DreamReading> {
            Err(PortError::Unexpected("not under test".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        saved: Mutex<Vec<(ReadingKind, NewCardReading)>>,
        fail_writes: bool,
    }

    #[async_trait]
    impl ReadingStore for RecordingStore {
        async fn create_user_with_email(&self, _: &str, _: &str) -> PortResult<User> {
            Err(PortError::Unexpected("not under test".to_string()))
        }
        async fn get_user_by_email(&self, _: &str) -> PortResult<UserCredentials> {
            Err(PortError::Unexpected("not under test".to_string()))
        }
        async fn create_auth_session(
            &self,
            _: &str,
            _: Uuid,
            _: DateTime<Utc>,
        ) -> PortResult<()> {
            Err(PortError::Unexpected("not under test".to_string()))
        }
        async fn validate_auth_session(&self, _: &str) -> PortResult<Uuid> {
            Err(PortError::Unauthorized)
        }
        async fn delete_auth_session(&self, _: &str) -> PortResult<()> {
            Ok(())
        }
        async fn save_card_reading(
            &self,
            kind: ReadingKind,
            reading: &NewCardReading,
        ) -> PortResult<Uuid> {
            if self.fail_writes {
                return Err(PortError::Unexpected("connection reset".to_string()));
            }
            self.saved.lock().unwrap().push((kind, reading.clone()));
            Ok(Uuid::new_v4())
        }
        async fn list_card_readings(
            &self,
            _: ReadingKind,
            _: Uuid,
        ) -> PortResult<Vec<CardReadingRecord>> {
            Ok(Vec::new())
        }
        async fn get_card_reading(
            &self,
            _: ReadingKind,
            _: Uuid,
            id: Uuid,
        ) -> PortResult<CardReadingRecord> {
            Err(PortError::NotFound(id.to_string()))
        }
        async fn save_dream(&self, _: &NewDream) -> PortResult<Uuid> {
            Ok(Uuid::new_v4())
        }
        async fn list_dreams(&self, _: Uuid) -> PortResult<Vec<DreamRecord>> {
            Ok(Vec::new())
        }
        async fn get_dream(&self, _: Uuid, id: Uuid) -> PortResult<DreamRecord> {
            Err(PortError::NotFound(id.to_string()))
        }
    }

    const TAROT_RESPONSE: &str = r#"{
        "summary": "Kariyerinizde bir dönüm noktasındasınız.",
        "cards": [
            {"position": "Geçmiş", "name": "The Fool", "interpretation": "Cesur bir başlangıç."},
            {"position": "Şimdiki Zaman", "name": "The Star", "interpretation": "Umut ve ilham."},
            {"position": "Gelecek", "name": "The Sun", "interpretation": "Başarı sizi bekliyor."}
        ],
        "relationship": "Kartlar bir yükseliş anlatıyor.",
        "future": "Yeni bir iş fırsatı belirebilir.",
        "advice": "Adım atmaktan çekinmeyin.",
        "zodiacInfluence": "İkizler burcu değişime açıktır."
    }"#;

    fn birth_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 6, 15).unwrap()
    }

    fn draft_tarot_wizard() -> ReadingWizard {
        let mut rng = StdRng::seed_from_u64(21);
        let mut wizard = ReadingWizard::tarot();
        wizard.shuffle(&mut rng).unwrap();
        for name in ["The Fool", "The Star", "The Sun"] {
            wizard.select_prechosen(name, false).unwrap();
        }
        wizard.proceed_to_details().unwrap();
        wizard
            .set_details("İş değiştirecek miyim?", birth_date())
            .unwrap();
        wizard
    }

    #[tokio::test]
    async fn full_tarot_submission_completes_and_persists() {
        let mut wizard = draft_tarot_wizard();
        let interpreter = CannedInterpreter {
            raw: format!("Elbette, işte yorumunuz:\n{TAROT_RESPONSE}\nSevgiler."),
            fail: false,
        };
        let store = RecordingStore::default();
        let user = Uuid::new_v4();

        let outcome = wizard
            .submit(Some(user), &interpreter, &store)
            .await
            .unwrap();
        assert_eq!(wizard.state(), WizardState::Completed);

        let SubmitOutcome::Completed(CardReading::Tarot(reading)) = outcome else {
            panic!("expected a completed tarot reading");
        };
        assert_eq!(reading.cards.len(), 3);
        assert_eq!(reading.cards[0].position, "Geçmiş");
        assert_eq!(reading.cards[1].position, "Şimdiki Zaman");
        assert_eq!(reading.cards[2].position, "Gelecek");
        assert!(reading.zodiac_influence.contains("İkizler"));

        let saved = store.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        let (kind, record) = &saved[0];
        assert_eq!(*kind, ReadingKind::Tarot);
        assert_eq!(record.user_id, user);
        assert_eq!(record.question, "İş değiştirecek miyim?");
        assert_eq!(record.selected_cards.len(), 3);
        assert!(record.selected_cards.iter().all(|c| c.reversed.is_none()));
    }

    #[tokio::test]
    async fn persistence_failure_still_completes() {
        let mut wizard = draft_tarot_wizard();
        let interpreter = CannedInterpreter {
            raw: TAROT_RESPONSE.to_string(),
            fail: false,
        };
        let store = RecordingStore {
            fail_writes: true,
            ..Default::default()
        };

        let outcome = wizard
            .submit(Some(Uuid::new_v4()), &interpreter, &store)
            .await
            .unwrap();
        assert!(matches!(outcome, SubmitOutcome::Completed(_)));
        assert_eq!(wizard.state(), WizardState::Completed);
        assert!(store.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn generation_failure_moves_to_failed() {
        let mut wizard = draft_tarot_wizard();
        let interpreter = CannedInterpreter {
            raw: String::new(),
            fail: true,
        };
        let store = RecordingStore::default();

        let result = wizard
            .submit(Some(Uuid::new_v4()), &interpreter, &store)
            .await;
        assert!(matches!(result, Err(WizardError::Generation(_))));
        assert_eq!(wizard.state(), WizardState::Failed);

        // Terminal states reject further submissions.
        let retry = wizard
            .submit(Some(Uuid::new_v4()), &interpreter, &store)
            .await;
        assert!(matches!(retry, Err(WizardError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn unauthenticated_submission_pauses_and_resumes() {
        let mut wizard = draft_tarot_wizard();
        let interpreter = CannedInterpreter {
            raw: TAROT_RESPONSE.to_string(),
            fail: false,
        };
        let store = RecordingStore::default();

        let outcome = wizard.submit(None, &interpreter, &store).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::AuthRequired);
        assert_eq!(wizard.state(), WizardState::AwaitingAuth);
        // Drafted state survives the pause.
        assert_eq!(wizard.question(), Some("İş değiştirecek miyim?"));
        assert_eq!(wizard.spread().drawn().len(), 3);

        let outcome = wizard
            .submit(Some(Uuid::new_v4()), &interpreter, &store)
            .await
            .unwrap();
        assert!(matches!(outcome, SubmitOutcome::Completed(_)));
        assert_eq!(store.saved.lock().unwrap().len(), 1);
    }

    #[test]
    fn step_one_requires_the_exact_card_count() {
        let mut wizard = ReadingWizard::tarot();
        wizard.select_prechosen("The Fool", false).unwrap();
        let err = wizard.proceed_to_details().unwrap_err();
        assert!(matches!(
            err,
            WizardError::IncompleteSelection {
                expected: 3,
                actual: 1
            }
        ));
        assert_eq!(wizard.state(), WizardState::SelectingCards);
    }

    #[test]
    fn selection_is_locked_after_step_one() {
        let mut wizard = ReadingWizard::tarot();
        for name in ["The Fool", "The Star", "The Sun"] {
            wizard.select_prechosen(name, false).unwrap();
        }
        wizard.proceed_to_details().unwrap();
        let err = wizard.select_prechosen("Death", false).unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition("select")));
    }

    #[test]
    fn blank_question_is_rejected() {
        let mut wizard = ReadingWizard::tarot();
        for name in ["The Fool", "The Star", "The Sun"] {
            wizard.select_prechosen(name, false).unwrap();
        }
        wizard.proceed_to_details().unwrap();
        let err = wizard.set_details("   ", birth_date()).unwrap_err();
        assert!(matches!(err, WizardError::MissingDetails));
    }
}
