//! Cursor-based access to a repertoire graph.
//!
//! A [`CursorSession`] owns a pointer into one repertoire. Every navigation,
//! extension and quiz goes through that pointer, so a caller works the tree
//! the way a player does: select a repertoire, play moves, record new ones,
//! rehearse due positions. Sessions are independent of each other; open one
//! per user or per task.

mod outcome;
mod state;

pub use outcome::QuizOutcome;
pub use state::Cursor;

use crate::error::RepertoireError;
use crate::persistence::GraphRepository;
use crate::rules::{AppliedMove, Rules, StandardRules};
use crate::scheduler::{Answer, ReviewMode};
use crate::types::{MoveEdge, RepertoireId, Timestamp};

pub struct CursorSession<G, R = StandardRules> {
    graph: G,
    rules: R,
    cursor: Option<Cursor>,
}

impl<G: GraphRepository> CursorSession<G, StandardRules> {
    /// Session using standard chess rules.
    pub fn standard(graph: G) -> Self {
        Self::new(graph, StandardRules)
    }
}

impl<G: GraphRepository, R: Rules> CursorSession<G, R> {
    pub fn new(graph: G, rules: R) -> Self {
        Self {
            graph,
            rules,
            cursor: None,
        }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Current cursor, `None` before the first [`select`](Self::select).
    pub fn current(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn selected(&self) -> Option<RepertoireId> {
        self.cursor.as_ref().map(|c| c.repertoire)
    }

    /// Key of the position the cursor stands on.
    pub fn position(&self) -> Result<&str, RepertoireError> {
        self.cursor().map(|c| c.position.as_str())
    }

    /// Select a repertoire and put the cursor on its root.
    pub async fn select(&mut self, rep: RepertoireId) -> Result<&Cursor, RepertoireError> {
        if !rep.is_valid() {
            return Err(RepertoireError::InvalidSelection);
        }
        let start = self
            .graph
            .start_position(rep)
            .await?
            .ok_or_else(|| RepertoireError::RepertoireNotFound(rep.to_string()))?;

        tracing::debug!(rep_id = %rep, "Selected repertoire");
        Ok(self.cursor.insert(Cursor::at_start(rep, start)))
    }

    /// Back to the root of the selected repertoire.
    pub fn reset(&mut self) -> Result<(), RepertoireError> {
        let cursor = self.cursor_mut()?;
        cursor.position = cursor.start.clone();
        Ok(())
    }

    /// Move the cursor to a recorded position, e.g. one that is due.
    pub async fn jump_to(&mut self, position: &str) -> Result<(), RepertoireError> {
        let rep = self.cursor()?.repertoire;
        let key = self
            .rules
            .canonicalize(position)
            .map_err(|_| RepertoireError::UnknownPosition(position.to_string()))?;
        if self.graph.get_node(rep, &key).await?.is_none() {
            return Err(RepertoireError::UnknownPosition(key));
        }
        self.cursor_mut()?.position = key;
        Ok(())
    }

    /// Play a move without recording it.
    pub fn play_move(&mut self, move_text: &str) -> Result<AppliedMove, RepertoireError> {
        let applied = self.apply(move_text)?;
        self.cursor_mut()?.position = applied.position.clone();
        Ok(applied)
    }

    /// Record a move from the cursor position and follow it.
    ///
    /// The position it was played from becomes due at `now`. If recording
    /// fails the cursor does not move.
    pub async fn extend(
        &mut self,
        move_text: &str,
        now: Timestamp,
    ) -> Result<AppliedMove, RepertoireError> {
        let applied = self.apply(move_text)?;
        let cursor = self.cursor()?;
        self.graph
            .add_edge(
                cursor.repertoire,
                &cursor.position,
                &applied.position,
                &applied.san,
                now,
            )
            .await?;

        tracing::info!(rep_id = %cursor.repertoire, san = %applied.san, "Extended repertoire");
        self.cursor_mut()?.position = applied.position.clone();
        Ok(applied)
    }

    /// Check an answer at the cursor position. Moves the Leitner box only.
    pub async fn quiz(
        &mut self,
        move_text: &str,
        now: Timestamp,
    ) -> Result<QuizOutcome, RepertoireError> {
        self.attempt(move_text, ReviewMode::AdjustBox, now).await
    }

    /// Check an answer at the cursor position and schedule the next review.
    pub async fn quiz_with_reschedule(
        &mut self,
        move_text: &str,
        now: Timestamp,
    ) -> Result<QuizOutcome, RepertoireError> {
        self.attempt(move_text, ReviewMode::Reschedule, now).await
    }

    /// Moves recorded from the cursor position.
    pub async fn list_edges(&self) -> Result<Vec<String>, RepertoireError> {
        let cursor = self.cursor()?;
        Ok(self
            .graph
            .list_edges(cursor.repertoire, &cursor.position)
            .await?)
    }

    pub async fn list_moves(&self) -> Result<Vec<MoveEdge>, RepertoireError> {
        let cursor = self.cursor()?;
        Ok(self
            .graph
            .list_moves(cursor.repertoire, &cursor.position)
            .await?)
    }

    /// Forget a move recorded from the cursor position, along with every
    /// position only reachable through it. Returns the removed positions.
    pub async fn delete_edge(&mut self, move_text: &str) -> Result<Vec<String>, RepertoireError> {
        let cursor = self.cursor()?;
        // Stored moves are canonical; accept any spelling the rules understand.
        let san = self
            .rules
            .apply_move(&cursor.position, move_text)
            .map(|applied| applied.san)
            .unwrap_or_else(|_| move_text.trim().to_string());

        let removed = self
            .graph
            .delete_edge(cursor.repertoire, &cursor.position, &san)
            .await?;
        tracing::info!(
            rep_id = %cursor.repertoire,
            %san,
            removed = removed.len(),
            "Removed move"
        );

        let cursor = self.cursor_mut()?;
        if removed.contains(&cursor.position) {
            cursor.position = cursor.start.clone();
        }
        Ok(removed)
    }

    /// Positions of the selected repertoire due for review at `now`.
    pub async fn due_positions(&self, now: Timestamp) -> Result<Vec<String>, RepertoireError> {
        let rep = self.cursor()?.repertoire;
        Ok(self.graph.list_due_nodes(rep, now).await?)
    }

    pub async fn count_due(&self, now: Timestamp) -> Result<usize, RepertoireError> {
        let rep = self.cursor()?.repertoire;
        Ok(self.graph.count_due(rep, now).await?)
    }

    async fn attempt(
        &mut self,
        move_text: &str,
        mode: ReviewMode,
        now: Timestamp,
    ) -> Result<QuizOutcome, RepertoireError> {
        let cursor = self.cursor()?;
        let (rep, position) = (cursor.repertoire, cursor.position.clone());

        let recorded = self.graph.list_moves(rep, &position).await?;
        if recorded.is_empty() {
            return Err(RepertoireError::EdgeNotFound {
                position,
                move_text: move_text.trim().to_string(),
            });
        }
        let node = self
            .graph
            .get_node(rep, &position)
            .await?
            .ok_or_else(|| RepertoireError::UnknownPosition(position.clone()))?;

        // An answer the rules reject is simply wrong.
        let played = self.rules.apply_move(&position, move_text).ok();
        let matched = recorded.iter().find(|edge| match &played {
            Some(applied) => edge.move_text == applied.san || edge.child_fen == applied.position,
            None => edge.move_text == move_text.trim(),
        });

        let answer = if matched.is_some() {
            Answer::Correct
        } else {
            Answer::Incorrect
        };
        let schedule = node.schedule.review(answer, mode, now);
        self.graph.update_schedule(rep, &position, &schedule).await?;

        tracing::info!(
            rep_id = %rep,
            correct = matched.is_some(),
            box_index = schedule.box_index,
            "Quiz answered"
        );

        match matched {
            Some(edge) => {
                self.cursor_mut()?.position = edge.child_fen.clone();
                Ok(QuizOutcome::Correct {
                    played: edge.move_text.clone(),
                    position: edge.child_fen.clone(),
                    schedule,
                })
            }
            None => Ok(QuizOutcome::Incorrect {
                played: played.map_or_else(|| move_text.trim().to_string(), |a| a.san),
                expected: recorded.iter().map(|e| e.move_text.clone()).collect(),
                schedule,
            }),
        }
    }

    fn apply(&self, move_text: &str) -> Result<AppliedMove, RepertoireError> {
        let cursor = self.cursor()?;
        self.rules
            .apply_move(&cursor.position, move_text)
            .map_err(|e| RepertoireError::IllegalMove {
                move_text: move_text.trim().to_string(),
                reason: e.to_string(),
            })
    }

    fn cursor(&self) -> Result<&Cursor, RepertoireError> {
        self.cursor
            .as_ref()
            .filter(|c| c.is_usable())
            .ok_or(RepertoireError::InvalidSelection)
    }

    fn cursor_mut(&mut self) -> Result<&mut Cursor, RepertoireError> {
        self.cursor
            .as_mut()
            .filter(|c| c.is_usable())
            .ok_or(RepertoireError::InvalidSelection)
    }
}
