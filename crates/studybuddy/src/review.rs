//! Reviewing cards one at a time.
//!
//! A [`ReviewSession`] holds a list of cards and a cursor. Freshly generated
//! cards are reviewed front to back once: moving past the last card ends
//! the session. The saved deck is a loop instead: moving past either end
//! wraps around, and deleting a card leaves the cursor on a card that still
//! exists.
//!
//! [`run`] drives a session from line-based input, so the same loop serves
//! a terminal and the tests.

use std::io::{BufRead, Write};

use crate::card::{Card, SavedCard};
use crate::error::Result;
use crate::store::{CardStore, ToggleOutcome};

/// How the cursor behaves at the ends of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewMode {
    /// Front to back once; stepping past the last card finishes.
    Session,
    /// Wraps around at both ends.
    Deck,
}

/// Which side of the current card is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    /// The question.
    #[default]
    Question,
    /// The answer.
    Answer,
}

/// Result of moving the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The cursor is on a card.
    Moved,
    /// There are no more cards to show.
    Finished,
}

/// Something that can be shown in a review.
pub trait Reviewable {
    /// Front of the card.
    fn question(&self) -> &str;
    /// Back of the card.
    fn answer(&self) -> &str;
    /// The id the card is stored under, if it came from the store.
    fn saved_id(&self) -> Option<&str>;
    /// The plain card.
    fn to_card(&self) -> Card;
}

impl Reviewable for Card {
    fn question(&self) -> &str {
        &self.question
    }

    fn answer(&self) -> &str {
        &self.answer
    }

    fn saved_id(&self) -> Option<&str> {
        None
    }

    fn to_card(&self) -> Card {
        self.clone()
    }
}

impl Reviewable for SavedCard {
    fn question(&self) -> &str {
        &self.question
    }

    fn answer(&self) -> &str {
        &self.answer
    }

    fn saved_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn to_card(&self) -> Card {
        SavedCard::to_card(self)
    }
}

/// A cursor over a list of cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSession<T> {
    cards: Vec<T>,
    index: usize,
    side: Side,
    mode: ReviewMode,
    finished: bool,
}

impl<T> ReviewSession<T> {
    /// Review freshly generated cards front to back.
    #[must_use]
    pub fn session(cards: Vec<T>) -> Self {
        Self::new(cards, ReviewMode::Session)
    }

    /// Review the saved deck, wrapping at both ends.
    #[must_use]
    pub fn deck(cards: Vec<T>) -> Self {
        Self::new(cards, ReviewMode::Deck)
    }

    fn new(cards: Vec<T>, mode: ReviewMode) -> Self {
        Self {
            cards,
            index: 0,
            side: Side::Question,
            mode,
            finished: false,
        }
    }

    /// Get the cursor behavior.
    #[must_use]
    pub fn mode(&self) -> ReviewMode {
        self.mode
    }

    /// Get the number of cards left in the session.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if there are no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Get the zero-based cursor position.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Get the one-based position and the total, for display.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        self.current().map(|_| (self.index + 1, self.cards.len()))
    }

    /// Get the card under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        if self.finished {
            return None;
        }
        self.cards.get(self.index)
    }

    /// Check if the cursor is on the last card.
    #[must_use]
    pub fn is_last(&self) -> bool {
        !self.cards.is_empty() && self.index + 1 == self.cards.len()
    }

    /// Check if nothing is left to show.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished || self.cards.is_empty()
    }

    /// Get the side currently showing.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Turn the current card over.
    pub fn flip(&mut self) -> Side {
        self.side = match self.side {
            Side::Question => Side::Answer,
            Side::Answer => Side::Question,
        };
        self.side
    }

    /// Move to the next card. Every move shows the question side.
    pub fn next_card(&mut self) -> Step {
        if self.is_finished() {
            return Step::Finished;
        }
        self.side = Side::Question;

        if self.index + 1 < self.cards.len() {
            self.index += 1;
            return Step::Moved;
        }
        match self.mode {
            ReviewMode::Deck => {
                self.index = 0;
                Step::Moved
            }
            ReviewMode::Session => {
                self.cards.clear();
                self.index = 0;
                self.finished = true;
                Step::Finished
            }
        }
    }

    /// Move to the previous card. The deck wraps to its last card; a
    /// session stays on its first.
    pub fn prev_card(&mut self) -> Step {
        if self.is_finished() {
            return Step::Finished;
        }
        self.side = Side::Question;

        self.index = match (self.index, self.mode) {
            (0, ReviewMode::Deck) => self.cards.len() - 1,
            (0, ReviewMode::Session) => 0,
            (i, _) => i - 1,
        };
        Step::Moved
    }

    /// Take the current card out of the session.
    ///
    /// The cursor stays put, so the following card moves under it. Removing
    /// the last card moves the cursor to the new last card.
    pub fn remove_current(&mut self) -> Option<T> {
        if self.is_finished() {
            return None;
        }
        let removed = self.cards.remove(self.index);
        if self.index >= self.cards.len() {
            self.index = self.cards.len().saturating_sub(1);
        }
        self.side = Side::Question;
        Some(removed)
    }
}

/// A command typed during a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    /// Turn the card over.
    Flip,
    /// Next card.
    Next,
    /// Previous card.
    Prev,
    /// Save the card, or unsave it if already saved.
    Save,
    /// Delete the card from the saved deck.
    Delete,
    /// Stop reviewing.
    Quit,
}

impl ReviewAction {
    /// Parse one line of input. An empty line flips the card.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "" | "f" | "flip" => Some(Self::Flip),
            "n" | "next" => Some(Self::Next),
            "p" | "prev" | "previous" => Some(Self::Prev),
            "s" | "save" => Some(Self::Save),
            "d" | "delete" => Some(Self::Delete),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

fn show<T: Reviewable>(
    session: &ReviewSession<T>,
    store: &CardStore,
    out: &mut impl Write,
) -> Result<()> {
    let (Some(card), Some((position, total))) = (session.current(), session.position()) else {
        return Ok(());
    };

    writeln!(out)?;
    writeln!(out, "Card {position} of {total}")?;
    match session.side() {
        Side::Question => writeln!(out, "Question: {}", card.question())?,
        Side::Answer => writeln!(out, "Answer:   {}", card.answer())?,
    }

    let prompt = match session.mode() {
        ReviewMode::Session => {
            let saved = store.is_saved(&store.id_for(&card.to_card()));
            let next = if session.is_last() { "finish" } else { "next" };
            format!(
                "[f]lip  [n] {next}  [p]rev  [s] {}  [q]uit > ",
                if saved { "unsave" } else { "save" }
            )
        }
        ReviewMode::Deck => "[f]lip  [n]ext  [p]rev  [d]elete  [q]uit > ".to_string(),
    };
    write!(out, "{prompt}")?;
    out.flush()?;
    Ok(())
}

/// Run a review from line-based input until the cards run out, the input
/// ends, or the user quits.
///
/// Saving in a session toggles the current card in `store`. Deleting in
/// the deck removes the current card from `store` and from the session.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails, or if the
/// store has not been initialized.
pub fn run<T: Reviewable>(
    session: &mut ReviewSession<T>,
    store: &CardStore,
    input: impl BufRead,
    mut out: impl Write,
) -> Result<()> {
    let mut lines = input.lines();

    while !session.is_finished() {
        show(session, store, &mut out)?;
        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };

        match ReviewAction::parse(&line?) {
            Some(ReviewAction::Flip) => {
                session.flip();
            }
            Some(ReviewAction::Next) => {
                session.next_card();
            }
            Some(ReviewAction::Prev) => {
                session.prev_card();
            }
            Some(ReviewAction::Save) => match session.mode() {
                ReviewMode::Session => {
                    if let Some(card) = session.current() {
                        match store.toggle(card.to_card())? {
                            ToggleOutcome::Saved => writeln!(out, "Saved.")?,
                            ToggleOutcome::Removed => writeln!(out, "Unsaved.")?,
                        }
                    }
                }
                ReviewMode::Deck => writeln!(out, "Every card here is saved already.")?,
            },
            Some(ReviewAction::Delete) => match session.mode() {
                ReviewMode::Deck => {
                    if let Some(card) = session.current() {
                        let id = card
                            .saved_id()
                            .map_or_else(|| store.id_for(&card.to_card()), str::to_string);
                        store.remove(&id)?;
                        session.remove_current();
                    }
                }
                ReviewMode::Session => writeln!(out, "Only saved cards can be deleted.")?,
            },
            Some(ReviewAction::Quit) => break,
            None => writeln!(out, "Unknown command.")?,
        }
    }

    if session.is_finished() {
        match session.mode() {
            ReviewMode::Session => writeln!(out, "Session finished.")?,
            ReviewMode::Deck => writeln!(out, "No saved cards.")?,
        }
    }
    Ok(())
}
