//! Turning a chosen suggestion into a document change.
//!
//! A commit cuts the trigger and query out of the document and, in the same
//! transaction, inserts the mention followed by one space. Command
//! suggestions with a registered generator insert a placeholder instead and
//! hand back a [`CommandRequest`]. Every committed transaction carries a
//! session override that closes the popup.

use std::fmt;
use std::sync::Arc;

use command_provider::{CommandGenerator, CommandPresentation};
use tracing::debug;

use crate::autocomplete::catalog::Suggestion;
use crate::autocomplete::command::{CommandRegistry, PendingCommand, PlaceholderTracker};
use crate::autocomplete::session::{SessionOverride, SessionState};
use crate::autocomplete::trigger::TRIGGER_LEN;
use crate::core::document::{Inline, Mark, MentionAttrs, MentionMark};
use crate::core::state::{EditorState, Selection};
use crate::core::transform::Transaction;
use crate::error::DocumentError;

/// How committed mentions are stored in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MentionRepresentation {
    /// One atomic inline node.
    #[default]
    Node,
    /// `prefix + label` text carrying a mention mark.
    Mark,
}

impl MentionRepresentation {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "node" => Some(Self::Node),
            "mark" => Some(Self::Mark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    Inactive,
    MissingAnchor,
    OutOfBounds { pos: usize, size: usize },
    Document(DocumentError),
}

/// Placeholder insertion waiting to be tracked once its transaction lands.
pub struct CommandRequest {
    pub suggestion_id: String,
    pub placeholder_from: usize,
    pub presentation: CommandPresentation,
    generator: Arc<dyn CommandGenerator>,
}

impl fmt::Debug for CommandRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRequest")
            .field("suggestion_id", &self.suggestion_id)
            .field("placeholder_from", &self.placeholder_from)
            .field("presentation", &self.presentation)
            .finish()
    }
}

impl CommandRequest {
    /// Tracks the placeholder; call after the placeholder transaction was
    /// applied so its range is expressed in the new document.
    pub fn into_pending(self, tracker: &mut PlaceholderTracker) -> PendingCommand {
        let id = tracker.track(
            self.placeholder_from,
            &self.presentation.placeholder,
            self.presentation.clone(),
        );
        PendingCommand::new(id, self.suggestion_id, self.generator)
    }
}

#[derive(Debug)]
pub enum CommitOutcome {
    Committed(Transaction),
    Command {
        transaction: Transaction,
        request: CommandRequest,
    },
    Ignored(IgnoreReason),
}

impl CommitOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, CommitOutcome::Ignored(_))
    }
}

/// Commits `suggestion` for the open `session`.
pub fn commit(
    state: &EditorState,
    session: &SessionState,
    suggestion: &Suggestion,
    representation: MentionRepresentation,
    registry: &CommandRegistry,
) -> CommitOutcome {
    match build(state, session, suggestion, representation, registry) {
        Ok(outcome) => {
            debug!(id = %suggestion.id, category = suggestion.category.as_str(), "suggestion committed");
            outcome
        }
        Err(reason) => {
            debug!(id = %suggestion.id, ?reason, "commit ignored");
            CommitOutcome::Ignored(reason)
        }
    }
}

fn build(
    state: &EditorState,
    session: &SessionState,
    suggestion: &Suggestion,
    representation: MentionRepresentation,
    registry: &CommandRegistry,
) -> Result<CommitOutcome, IgnoreReason> {
    if !session.active {
        return Err(IgnoreReason::Inactive);
    }
    let (Some(anchor), Some(query_end)) = (session.anchor, session.query_end()) else {
        return Err(IgnoreReason::MissingAnchor);
    };
    let size = state.doc().content_size();
    let insert_pos = match anchor.checked_sub(TRIGGER_LEN) {
        Some(pos) if query_end <= size => pos,
        _ => {
            return Err(IgnoreReason::OutOfBounds {
                pos: anchor.saturating_sub(TRIGGER_LEN),
                size,
            })
        }
    };

    let mut tr = state.tr();
    tr.delete(insert_pos, query_end)
        .map_err(IgnoreReason::Document)?;
    tr.set_meta(SessionOverride(SessionState::inactive()));

    if suggestion.is_command() {
        if let Some(generator) = registry.get(&suggestion.id) {
            let presentation = generator.presentation();
            let placeholder_len = presentation.placeholder.chars().count();
            tr.insert_text(insert_pos, &presentation.placeholder)
                .map_err(IgnoreReason::Document)?;
            tr.set_selection(Selection::cursor(insert_pos + placeholder_len));
            return Ok(CommitOutcome::Command {
                transaction: tr,
                request: CommandRequest {
                    suggestion_id: suggestion.id.clone(),
                    placeholder_from: insert_pos,
                    presentation,
                    generator,
                },
            });
        }
    }

    let cursor = match representation {
        MentionRepresentation::Node => {
            let attrs = MentionAttrs::new(
                suggestion.category,
                suggestion.label.clone(),
                suggestion.description.clone(),
            );
            tr.insert(insert_pos, vec![Inline::Mention(attrs)])
                .and_then(|tr| tr.insert_text(insert_pos + 1, " "))
                .map_err(IgnoreReason::Document)?;
            insert_pos + 2
        }
        MentionRepresentation::Mark => {
            let text = suggestion.display_label();
            let len = text.chars().count();
            let mark = Mark::Mention(MentionMark::new(
                suggestion.category,
                suggestion.description.clone(),
            ));
            tr.insert_text(insert_pos, &text)
                .and_then(|tr| tr.add_mark(insert_pos, insert_pos + len, mark))
                .and_then(|tr| tr.insert_text(insert_pos + len, " "))
                .map_err(IgnoreReason::Document)?;
            insert_pos + len + 1
        }
    };
    tr.set_selection(Selection::cursor(cursor));
    Ok(CommitOutcome::Committed(tr))
}
