use serde::Serialize;

use crate::types::RepertoireId;

/// Where a session currently stands: which repertoire, which position.
///
/// Lives only as long as the session; every (re)select starts over at the
/// repertoire's root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cursor {
    pub repertoire: RepertoireId,
    /// Root position of the selected repertoire.
    pub start: String,
    pub position: String,
}

impl Cursor {
    pub(crate) fn at_start(repertoire: RepertoireId, start: String) -> Self {
        Self {
            repertoire,
            position: start.clone(),
            start,
        }
    }

    pub fn is_at_start(&self) -> bool {
        self.position == self.start
    }

    /// A cursor is only usable with a real repertoire and a position to stand on.
    pub(crate) fn is_usable(&self) -> bool {
        self.repertoire.is_valid() && !self.position.is_empty()
    }
}
