//! Core card types for studybuddy.
//!
//! A [`Card`] is what the generation service hands back for one review
//! session. A [`SavedCard`] is a card the user chose to keep; its id is
//! derived from the card's content according to a [`CardIdentity`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Separator between question and answer when hashing a card.
const HASH_SEPARATOR: u8 = 0x1f;

/// A question/answer pair produced for a review session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Front of the card.
    pub question: String,
    /// Back of the card.
    pub answer: String,
}

impl Card {
    /// Create a new card.
    #[must_use]
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Check that both sides carry text.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.question.trim().is_empty() && !self.answer.trim().is_empty()
    }
}

/// How the id of a saved card is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardIdentity {
    /// The question text is the id. Two cards with the same question are
    /// the same card, whatever their answers.
    #[default]
    QuestionText,
    /// The id is a BLAKE3 hash over question and answer.
    ContentHash,
}

impl CardIdentity {
    /// Derive the id for the given card.
    #[must_use]
    pub fn id_for(self, card: &Card) -> String {
        match self {
            Self::QuestionText => card.question.clone(),
            Self::ContentHash => compute_hash(card),
        }
    }
}

impl std::fmt::Display for CardIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuestionText => write!(f, "question-text"),
            Self::ContentHash => write!(f, "content-hash"),
        }
    }
}

/// Compute the BLAKE3 hash of a card's content.
#[must_use]
pub fn compute_hash(card: &Card) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(card.question.as_bytes());
    hasher.update(&[HASH_SEPARATOR]);
    hasher.update(card.answer.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// A card persisted in the saved-card collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCard {
    /// Identity of the card, derived from its content.
    pub id: String,
    /// Front of the card.
    pub question: String,
    /// Back of the card.
    pub answer: String,
    /// When the card was saved. Absent for collections written before
    /// timestamps were recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl SavedCard {
    /// Create a saved card from a session card, stamped with the current time.
    #[must_use]
    pub fn new(card: Card, identity: CardIdentity) -> Self {
        let id = identity.id_for(&card);
        Self {
            id,
            question: card.question,
            answer: card.answer,
            saved_at: Some(Utc::now()),
        }
    }

    /// Get the session card this entry was saved from.
    #[must_use]
    pub fn to_card(&self) -> Card {
        Card::new(self.question.clone(), self.answer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_text_identity() {
        let card = Card::new("What is ownership?", "A set of rules");
        assert_eq!(CardIdentity::QuestionText.id_for(&card), "What is ownership?");
    }

    #[test]
    fn test_question_text_identity_ignores_answer() {
        let a = Card::new("Capital of France?", "Paris");
        let b = Card::new("Capital of France?", "paris, obviously");
        assert_eq!(
            CardIdentity::QuestionText.id_for(&a),
            CardIdentity::QuestionText.id_for(&b)
        );
    }

    #[test]
    fn test_content_hash_identity_is_deterministic() {
        let card = Card::new("Q", "A");
        let id1 = CardIdentity::ContentHash.id_for(&card);
        let id2 = CardIdentity::ContentHash.id_for(&card);
        assert_eq!(id1, id2);
        assert_eq!(id1.len(), 64);
    }

    #[test]
    fn test_content_hash_identity_separates_answers() {
        let a = Card::new("Capital of France?", "Paris");
        let b = Card::new("Capital of France?", "Lyon");
        assert_ne!(
            CardIdentity::ContentHash.id_for(&a),
            CardIdentity::ContentHash.id_for(&b)
        );
    }

    #[test]
    fn test_content_hash_separator_prevents_shifting() {
        let a = Card::new("ab", "c");
        let b = Card::new("a", "bc");
        assert_ne!(compute_hash(&a), compute_hash(&b));
    }

    #[test]
    fn test_card_well_formed() {
        assert!(Card::new("Q", "A").is_well_formed());
        assert!(!Card::new("", "A").is_well_formed());
        assert!(!Card::new("Q", "   ").is_well_formed());
    }

    #[test]
    fn test_identity_display() {
        assert_eq!(CardIdentity::QuestionText.to_string(), "question-text");
        assert_eq!(CardIdentity::ContentHash.to_string(), "content-hash");
    }

    #[test]
    fn test_saved_card_new() {
        let saved = SavedCard::new(Card::new("Q", "A"), CardIdentity::QuestionText);
        assert_eq!(saved.id, "Q");
        assert_eq!(saved.question, "Q");
        assert_eq!(saved.answer, "A");
        assert!(saved.saved_at.is_some());
        assert_eq!(saved.to_card(), Card::new("Q", "A"));
    }

    #[test]
    fn test_saved_card_wire_format() {
        let saved = SavedCard {
            id: "Q".to_string(),
            question: "Q".to_string(),
            answer: "A".to_string(),
            saved_at: None,
        };
        let json = serde_json::to_string(&saved).unwrap();
        assert_eq!(json, r#"{"id":"Q","question":"Q","answer":"A"}"#);
    }

    #[test]
    fn test_saved_card_loads_without_timestamp() {
        let json = r#"[{"id":"Q","question":"Q","answer":"A"}]"#;
        let cards: Vec<SavedCard> = serde_json::from_str(json).unwrap();
        assert_eq!(cards.len(), 1);
        assert!(cards[0].saved_at.is_none());
    }

    #[test]
    fn test_identity_deserialize() {
        let identity: CardIdentity = serde_json::from_str(r#""content-hash""#).unwrap();
        assert_eq!(identity, CardIdentity::ContentHash);
    }
}
