//! Saving generated results to a user's library.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use uuid::Uuid;

use crate::domain::{Flashcard, FlashcardRecord, SummaryRecord};
use crate::ports::{DatabaseService, PortError, PortResult};

pub fn default_summary_title(now: DateTime<Utc>) -> String {
    format!("Summary {}", now.format("%Y-%m-%d"))
}

pub fn default_deck_title(now: DateTime<Utc>) -> String {
    format!("Deck - {}", now.format("%Y-%m-%d"))
}

/// Uses `title` when it has content, otherwise the fallback.
fn title_or(title: Option<&str>, fallback: impl FnOnce() -> String) -> String {
    title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(fallback)
}

pub async fn save_summary(
    db: &dyn DatabaseService,
    user_id: Uuid,
    original_text: &str,
    summary_text: &str,
    title: Option<&str>,
) -> PortResult<SummaryRecord> {
    let title = title_or(title, || default_summary_title(Utc::now()));
    db.insert_summary(user_id, original_text, summary_text, Some(title.as_str()))
        .await
}

/// A card that could not be stored, by its position in the submitted deck.
#[derive(Debug)]
pub struct CardFailure {
    pub index: usize,
    pub error: PortError,
}

/// Per-card outcome of a deck save. Stored cards stay stored even when others fail.
#[derive(Debug)]
pub struct DeckSaveReport {
    pub title: String,
    pub saved: Vec<FlashcardRecord>,
    pub failed: Vec<CardFailure>,
}

impl DeckSaveReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Inserts every card of a deck concurrently, one insert per card.
///
/// There is no transaction: a failed insert does not undo the others.
pub async fn save_deck(
    db: &dyn DatabaseService,
    user_id: Uuid,
    original_text: &str,
    title: Option<&str>,
    cards: &[Flashcard],
) -> DeckSaveReport {
    let title = title_or(title, || default_deck_title(Utc::now()));

    let inserts = cards.iter().map(|card| {
        db.insert_flashcard(
            user_id,
            original_text,
            &card.question,
            &card.answer,
            Some(title.as_str()),
        )
    });
    let outcomes = join_all(inserts).await;

    let mut saved = Vec::with_capacity(outcomes.len());
    let mut failed = Vec::new();
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(record) => saved.push(record),
            Err(error) => failed.push(CardFailure { index, error }),
        }
    }

    DeckSaveReport {
        title,
        saved,
        failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QARecord, User, UserCredentials};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Stores cards in memory and rejects any card whose question is listed in `reject`.
    #[derive(Default)]
    struct CardStore {
        cards: Mutex<Vec<FlashcardRecord>>,
        summaries: Mutex<Vec<SummaryRecord>>,
        reject: Vec<String>,
    }

    #[async_trait]
    impl DatabaseService for CardStore {
        async fn create_user_with_email(&self, _: &str, _: &str) -> PortResult<User> {
            unimplemented!()
        }
        async fn get_user_by_email(&self, _: &str) -> PortResult<UserCredentials> {
            unimplemented!()
        }
        async fn create_auth_session(&self, _: &str, _: Uuid, _: DateTime<Utc>) -> PortResult<()> {
            unimplemented!()
        }
        async fn validate_auth_session(&self, _: &str) -> PortResult<Uuid> {
            unimplemented!()
        }
        async fn delete_auth_session(&self, _: &str) -> PortResult<()> {
            unimplemented!()
        }

        async fn insert_summary(
            &self,
            user_id: Uuid,
            original_text: &str,
            summary_text: &str,
            title: Option<&str>,
        ) -> PortResult<SummaryRecord> {
            let record = SummaryRecord {
                id: Uuid::new_v4(),
                user_id,
                title: title.map(str::to_string),
                original_text: original_text.to_string(),
                summary_text: summary_text.to_string(),
                created_at: Utc::now(),
            };
            self.summaries.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn insert_flashcard(
            &self,
            user_id: Uuid,
            original_text: &str,
            question: &str,
            answer: &str,
            title: Option<&str>,
        ) -> PortResult<FlashcardRecord> {
            if self.reject.iter().any(|q| q == question) {
                return Err(PortError::Unexpected("constraint violation".to_string()));
            }
            let record = FlashcardRecord {
                id: Uuid::new_v4(),
                user_id,
                title: title.map(str::to_string),
                original_text: original_text.to_string(),
                question: question.to_string(),
                answer: answer.to_string(),
                created_at: Utc::now(),
            };
            self.cards.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn insert_qa(&self, _: Uuid, _: &str, _: &str) -> PortResult<QARecord> {
            unimplemented!()
        }
        async fn list_summaries(&self, _: Uuid) -> PortResult<Vec<SummaryRecord>> {
            unimplemented!()
        }
        async fn get_summary(&self, _: Uuid, _: Uuid) -> PortResult<SummaryRecord> {
            unimplemented!()
        }
        async fn list_flashcards(&self, _: Uuid) -> PortResult<Vec<FlashcardRecord>> {
            unimplemented!()
        }
        async fn list_qa(&self, _: Uuid) -> PortResult<Vec<QARecord>> {
            unimplemented!()
        }
    }

    fn deck(size: usize) -> Vec<Flashcard> {
        (1..=size)
            .map(|n| Flashcard::new(format!("Q{n}"), format!("A{n}")))
            .collect()
    }

    #[tokio::test]
    async fn failed_card_leaves_the_rest_persisted() {
        let store = CardStore {
            reject: vec!["Q7".to_string()],
            ..Default::default()
        };
        let user_id = Uuid::new_v4();

        let report = save_deck(&store, user_id, "source", Some("Biology"), &deck(10)).await;

        assert!(!report.is_complete());
        assert_eq!(report.saved.len(), 9);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].index, 6);

        let stored = store.cards.lock().unwrap();
        assert_eq!(stored.len(), 9);
        assert!(stored.iter().all(|c| c.question != "Q7"));
        assert!(stored
            .iter()
            .all(|c| c.user_id == user_id && c.title.as_deref() == Some("Biology")));
    }

    #[tokio::test]
    async fn blank_deck_title_gets_a_dated_default() {
        let store = CardStore::default();
        let report = save_deck(&store, Uuid::new_v4(), "source", Some("  "), &deck(2)).await;

        assert!(report.is_complete());
        assert!(report.title.starts_with("Deck - "));
        assert_eq!(report.saved.len(), 2);
    }

    #[tokio::test]
    async fn summary_title_defaults_when_missing() {
        let store = CardStore::default();
        let record = save_summary(&store, Uuid::new_v4(), "source", "summary", None)
            .await
            .unwrap();
        assert!(record.title.unwrap().starts_with("Summary "));
    }

    #[test]
    fn default_titles_use_the_calendar_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 18, 30, 0).unwrap();
        assert_eq!(default_summary_title(now), "Summary 2024-03-09");
        assert_eq!(default_deck_title(now), "Deck - 2024-03-09");
    }
}
