//! Named repertoires and their settings.

use serde::Serialize;

use crate::error::RepertoireError;
use crate::persistence::{GraphRepository, RepertoireRepository};
use crate::types::{NewRepertoire, Repertoire, RepertoireId, Timestamp};

/// A repertoire together with how much of it needs attention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepertoireOverview {
    #[serde(flatten)]
    pub repertoire: Repertoire,
    /// Positions due for review.
    pub due: usize,
    /// Positions recorded, root included.
    pub positions: usize,
}

/// CRUD over repertoires. Creating one also plants its root position in the graph.
pub struct RepertoireCatalog<R, G> {
    repertoires: R,
    graph: G,
}

impl<R: RepertoireRepository, G: GraphRepository> RepertoireCatalog<R, G> {
    pub fn new(repertoires: R, graph: G) -> Self {
        Self { repertoires, graph }
    }

    pub async fn create(
        &self,
        new: NewRepertoire,
        now: Timestamp,
    ) -> Result<Repertoire, RepertoireError> {
        let name = validate_name(&new.name)?;
        validate_settings(new.rating, new.coverage)?;
        let start_fen = match new.start_fen.as_deref() {
            Some(fen) => chess::canonicalize(fen)
                .map_err(|e| RepertoireError::InvalidRepertoire(e.to_string()))?,
            None => chess::starting_position(),
        };

        let new = NewRepertoire { name, ..new };
        let repertoire = self
            .repertoires
            .create_repertoire(&new, &start_fen, now)
            .await?;

        if let Err(err) = self
            .graph
            .create_start_node(repertoire.id, &repertoire.start_fen)
            .await
        {
            tracing::warn!(
                rep_id = %repertoire.id,
                error = %err,
                "Start position not created, rolling back"
            );
            self.repertoires.delete_repertoire(repertoire.id).await?;
            return Err(err.into());
        }

        tracing::info!(rep_id = %repertoire.id, name = %repertoire.name, "Created repertoire");
        Ok(repertoire)
    }

    /// Newest first.
    pub async fn list(&self) -> Result<Vec<Repertoire>, RepertoireError> {
        Ok(self.repertoires.list_repertoires().await?)
    }

    /// Every repertoire with its due and total position counts at `now`.
    pub async fn list_with_due(
        &self,
        now: Timestamp,
    ) -> Result<Vec<RepertoireOverview>, RepertoireError> {
        let mut overview = Vec::new();
        for repertoire in self.repertoires.list_repertoires().await? {
            let due = self.graph.count_due(repertoire.id, now).await?;
            let positions = self.graph.count_nodes(repertoire.id).await?;
            overview.push(RepertoireOverview {
                repertoire,
                due,
                positions,
            });
        }
        Ok(overview)
    }

    pub async fn get(&self, id: RepertoireId) -> Result<Repertoire, RepertoireError> {
        self.repertoires
            .load_repertoire(id)
            .await?
            .ok_or_else(|| RepertoireError::RepertoireNotFound(id.to_string()))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Repertoire>, RepertoireError> {
        Ok(self.repertoires.find_by_name(name.trim()).await?)
    }

    /// Save changed settings. The root position cannot be changed.
    pub async fn update(&self, repertoire: &Repertoire) -> Result<(), RepertoireError> {
        let name = validate_name(&repertoire.name)?;
        validate_settings(repertoire.rating, repertoire.coverage)?;
        let repertoire = Repertoire {
            name,
            ..repertoire.clone()
        };
        self.repertoires.update_repertoire(&repertoire).await?;
        tracing::info!(rep_id = %repertoire.id, "Updated repertoire");
        Ok(())
    }

    pub async fn rename(
        &self,
        id: RepertoireId,
        name: &str,
    ) -> Result<Repertoire, RepertoireError> {
        let mut repertoire = self.get(id).await?;
        repertoire.name = validate_name(name)?;
        self.repertoires.update_repertoire(&repertoire).await?;
        Ok(repertoire)
    }

    /// Delete a repertoire with all its positions and moves.
    pub async fn delete(&self, id: RepertoireId) -> Result<(), RepertoireError> {
        if !self.repertoires.delete_repertoire(id).await? {
            return Err(RepertoireError::RepertoireNotFound(id.to_string()));
        }
        tracing::info!(rep_id = %id, "Deleted repertoire");
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String, RepertoireError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RepertoireError::InvalidRepertoire(
            "name must not be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

fn validate_settings(rating: u32, coverage: f64) -> Result<(), RepertoireError> {
    if rating == 0 {
        return Err(RepertoireError::InvalidRepertoire(
            "rating must be positive".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&coverage) {
        return Err(RepertoireError::InvalidRepertoire(format!(
            "coverage must be between 0 and 100, got {coverage}"
        )));
    }
    Ok(())
}
