//! Dashboard annotations
//!
//! A [`NewAnnotation`] can only be built from a non-blank author and text, so
//! an invalid submission never reaches the network.

use crate::domain::panel::{EmptyReason, PanelState};
use crate::domain::types::{AnnotationId, AnnotationText, AuthorName, DashboardId, Tag};
use crate::domain::validation::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A validated annotation ready to be written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAnnotation {
    pub dashboard_id: DashboardId,
    pub author: AuthorName,
    pub text: AnnotationText,
    pub tags: BTreeSet<Tag>,
}

impl NewAnnotation {
    pub fn new<I, S>(
        dashboard_id: DashboardId,
        author: &str,
        text: &str,
        tags: I,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let author =
            AuthorName::try_new(author.to_string()).map_err(|_| ValidationError::EmptyAuthor)?;
        let text = AnnotationText::try_new(text.to_string()).map_err(|_| ValidationError::EmptyText)?;

        let mut parsed = BTreeSet::new();
        for raw in tags {
            let raw = raw.as_ref();
            if raw.trim().is_empty() {
                continue;
            }
            let tag = Tag::try_new(raw.to_string())
                .map_err(|_| ValidationError::InvalidTag(raw.to_string()))?;
            parsed.insert(tag);
        }

        Ok(Self {
            dashboard_id,
            author,
            text,
            tags: parsed,
        })
    }
}

/// A stored annotation as listed by the document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: Option<AnnotationId>,
    pub dashboard_id: DashboardId,
    pub author: AuthorName,
    pub text: AnnotationText,
    pub tags: BTreeSet<Tag>,
    pub created_at: DateTime<Utc>,
}

/// Annotations in reverse-chronological order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationFeed {
    items: Vec<Annotation>,
}

impl AnnotationFeed {
    /// Sorting is stable, so items sharing a timestamp keep server order
    pub fn assemble(mut items: Vec<Annotation>) -> PanelState<Self> {
        if items.is_empty() {
            return PanelState::Empty(EmptyReason::NoAnnotations);
        }
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        PanelState::Populated(Self { items })
    }

    pub fn items(&self) -> &[Annotation] {
        &self.items
    }

    pub fn latest(&self) -> Option<&Annotation> {
        self.items.first()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
