//! Area model and the lifecycle store.
//!
//! An `Area` is a user-digitized zone: a polygon in world space plus
//! name/description/color metadata. The store tracks each area's lifecycle
//! status relative to the persistence collaborator so the host can send only
//! pending changes on save and reconcile ids once the collaborator confirms.
//!
//! Property editors are modeled as per-area `EditBuffer`s. Typing into an
//! editor never touches the area itself; `commit_editor` merges the buffer
//! back through [`AreaStore::edit`] so status transitions stay in one place.

#[cfg(test)]
#[path = "areas_test.rs"]
mod areas_test;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::camera::Point;
use crate::consts::{DEFAULT_AREA_COLOR, MIN_AREA_POINTS};
use crate::geometry::point_in_polygon;

/// Identifier for an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum AreaId {
    /// Session-local id for an area the collaborator has not seen yet.
    Temporary(Uuid),
    /// Id assigned by the collaborator.
    Persistent(i64),
}

impl AreaId {
    /// Fresh temporary id.
    #[must_use]
    pub fn temporary() -> Self {
        Self::Temporary(Uuid::new_v4())
    }

    #[must_use]
    pub fn is_temporary(self) -> bool {
        matches!(self, Self::Temporary(_))
    }

    /// The collaborator id, if one has been assigned.
    #[must_use]
    pub fn persistent(self) -> Option<i64> {
        match self {
            Self::Persistent(id) => Some(id),
            Self::Temporary(_) => None,
        }
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temporary(uuid) => write!(f, "temp_{uuid}"),
            Self::Persistent(id) => write!(f, "{id}"),
        }
    }
}

/// Lifecycle status relative to the collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaStatus {
    /// Drawn locally, not yet saved.
    Inserted,
    /// Saved once, metadata changed since.
    Updated,
    /// Saved once, deleted locally; kept as a tombstone until confirmed.
    Deleted,
    /// In sync with the collaborator.
    Clean,
}

/// Editable metadata field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaField {
    Name,
    Description,
    Color,
}

/// A digitized zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    /// Outline in world space, drawing order, first point not repeated.
    pub coordinates: Vec<Point>,
    pub name: String,
    pub description: String,
    /// CSS hex color.
    pub color: String,
    pub status: AreaStatus,
}

impl Area {
    /// Whether the area is visible (anything but a tombstone).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != AreaStatus::Deleted
    }

    /// Current value of a metadata field.
    #[must_use]
    pub fn field(&self, field: AreaField) -> &str {
        match field {
            AreaField::Name => &self.name,
            AreaField::Description => &self.description,
            AreaField::Color => &self.color,
        }
    }

    fn field_mut(&mut self, field: AreaField) -> &mut String {
        match field {
            AreaField::Name => &mut self.name,
            AreaField::Description => &mut self.description,
            AreaField::Color => &mut self.color,
        }
    }
}

/// An area as returned by the collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedArea {
    pub id: i64,
    pub coordinates: Vec<Point>,
    pub name: String,
    pub description: String,
    pub color: String,
}

/// Draft copy of an area's metadata held by an open editor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditBuffer {
    pub name: String,
    pub description: String,
    pub color: String,
}

impl EditBuffer {
    fn from_area(area: &Area) -> Self {
        Self { name: area.name.clone(), description: area.description.clone(), color: area.color.clone() }
    }

    #[must_use]
    pub fn field(&self, field: AreaField) -> &str {
        match field {
            AreaField::Name => &self.name,
            AreaField::Description => &self.description,
            AreaField::Color => &self.color,
        }
    }

    fn set(&mut self, field: AreaField, value: String) {
        match field {
            AreaField::Name => self.name = value,
            AreaField::Description => self.description = value,
            AreaField::Color => self.color = value,
        }
    }
}

/// Errors from store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AreaError {
    #[error("an area needs at least 3 points, got {0}")]
    TooFewPoints(usize),
    #[error("area {0} not found")]
    NotFound(AreaId),
    #[error("area {0} is deleted")]
    Deleted(AreaId),
    #[error("area id {0} is already in use or was retired")]
    IdReused(i64),
    #[error("area {0} has no pending insert")]
    NotPendingInsert(AreaId),
    #[error("no editor is open for area {0}")]
    EditorNotOpen(AreaId),
}

/// In-memory area collection, in drawing order.
#[derive(Debug, Clone, Default)]
pub struct AreaStore {
    areas: Vec<Area>,
    /// Persistent ids whose delete the collaborator confirmed.
    retired: HashSet<i64>,
    /// Open editors, in open order.
    editors: Vec<(AreaId, EditBuffer)>,
}

impl AreaStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Creation / hydration ---

    /// Add a freshly drawn area with a temporary id and default metadata.
    ///
    /// # Errors
    ///
    /// `TooFewPoints` when `coordinates` has fewer than 3 points.
    pub fn create_draft(&mut self, coordinates: Vec<Point>) -> Result<AreaId, AreaError> {
        if coordinates.len() < MIN_AREA_POINTS {
            return Err(AreaError::TooFewPoints(coordinates.len()));
        }

        let id = AreaId::temporary();
        let name = format!("Area_{}", self.active_count() + 1);
        debug!(%id, %name, points = coordinates.len(), "draft area created");
        self.areas.push(Area {
            id,
            coordinates,
            name,
            description: String::new(),
            color: DEFAULT_AREA_COLOR.to_owned(),
            status: AreaStatus::Inserted,
        });
        Ok(id)
    }

    /// Insert or replace an area loaded from the collaborator. It is `Clean`.
    /// A local entry with an unsaved update or delete is kept as is.
    ///
    /// # Errors
    ///
    /// `TooFewPoints` for degenerate outlines, `IdReused` when the id was
    /// retired by a confirmed delete.
    pub fn load_persisted(&mut self, persisted: PersistedArea) -> Result<(), AreaError> {
        if persisted.coordinates.len() < MIN_AREA_POINTS {
            return Err(AreaError::TooFewPoints(persisted.coordinates.len()));
        }
        if self.retired.contains(&persisted.id) {
            return Err(AreaError::IdReused(persisted.id));
        }

        let area = Area {
            id: AreaId::Persistent(persisted.id),
            coordinates: persisted.coordinates,
            name: persisted.name,
            description: persisted.description,
            color: persisted.color,
            status: AreaStatus::Clean,
        };
        match self.position(area.id) {
            Some(idx) if self.areas[idx].status != AreaStatus::Clean => {
                debug!(id = %area.id, status = ?self.areas[idx].status, "keeping pending local area over reload");
            }
            Some(idx) => self.areas[idx] = area,
            None => self.areas.push(area),
        }
        Ok(())
    }

    // --- Mutation ---

    /// Set one metadata field.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `Deleted` for tombstones.
    pub fn edit(&mut self, id: AreaId, field: AreaField, value: impl Into<String>) -> Result<(), AreaError> {
        let area = self.get_mut(id)?;
        if area.status == AreaStatus::Deleted {
            return Err(AreaError::Deleted(id));
        }

        *area.field_mut(field) = value.into();
        if area.status == AreaStatus::Clean {
            area.status = AreaStatus::Updated;
        }
        Ok(())
    }

    /// Delete an area. Unsaved areas vanish; saved ones become tombstones
    /// until the collaborator confirms. Closes the area's editor.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids.
    pub fn delete(&mut self, id: AreaId) -> Result<(), AreaError> {
        let idx = self.position(id).ok_or(AreaError::NotFound(id))?;
        if id.is_temporary() {
            self.areas.remove(idx);
        } else {
            self.areas[idx].status = AreaStatus::Deleted;
        }
        self.close_editor(id);
        debug!(%id, "area deleted");
        Ok(())
    }

    /// Drop every unsaved area.
    pub fn clear_drafts(&mut self) {
        self.areas.retain(|a| a.status != AreaStatus::Inserted);
        let areas = &self.areas;
        self.editors.retain(|(id, _)| areas.iter().any(|a| a.id == *id));
    }

    // --- Queries ---

    /// Non-deleted areas in drawing order.
    pub fn active_areas(&self) -> impl Iterator<Item = &Area> {
        self.areas.iter().filter(|a| a.is_active())
    }

    /// Number of non-deleted areas.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active_areas().count()
    }

    /// Look up any area, tombstones included.
    #[must_use]
    pub fn get(&self, id: AreaId) -> Option<&Area> {
        self.areas.iter().find(|a| a.id == id)
    }

    /// Topmost active area containing `world_pt`. Later areas draw on top.
    #[must_use]
    pub fn area_at(&self, world_pt: Point) -> Option<&Area> {
        self.areas.iter().rev().filter(|a| a.is_active()).find(|a| point_in_polygon(world_pt, &a.coordinates))
    }

    #[must_use]
    pub fn pending_inserts(&self) -> Vec<&Area> {
        self.with_status(AreaStatus::Inserted)
    }

    #[must_use]
    pub fn pending_updates(&self) -> Vec<&Area> {
        self.with_status(AreaStatus::Updated)
    }

    #[must_use]
    pub fn pending_deletes(&self) -> Vec<&Area> {
        self.with_status(AreaStatus::Deleted)
    }

    /// Total number of areas, tombstones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    // --- Reconciliation ---

    /// The collaborator stored an inserted area under `persistent_id`.
    /// Moves an open editor to the new id.
    ///
    /// # Errors
    ///
    /// `IdReused` when `persistent_id` is live or retired, `NotFound` for
    /// unknown ids, `NotPendingInsert` when the area is not an unsaved draft.
    pub fn confirm_insert(&mut self, temp_id: AreaId, persistent_id: i64) -> Result<AreaId, AreaError> {
        let new_id = AreaId::Persistent(persistent_id);
        if self.retired.contains(&persistent_id) || self.position(new_id).is_some() {
            return Err(AreaError::IdReused(persistent_id));
        }

        let area = self.get_mut(temp_id)?;
        if !temp_id.is_temporary() || area.status != AreaStatus::Inserted {
            return Err(AreaError::NotPendingInsert(temp_id));
        }
        area.id = new_id;
        area.status = AreaStatus::Clean;

        if let Some((id, _)) = self.editors.iter_mut().find(|(id, _)| *id == temp_id) {
            *id = new_id;
        }
        debug!(%temp_id, %new_id, "insert confirmed");
        Ok(new_id)
    }

    /// The collaborator applied an update.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids.
    pub fn confirm_update(&mut self, id: AreaId) -> Result<(), AreaError> {
        let area = self.get_mut(id)?;
        if area.status == AreaStatus::Updated {
            area.status = AreaStatus::Clean;
        }
        Ok(())
    }

    /// The collaborator applied a delete; the tombstone goes and its id is
    /// retired.
    ///
    /// # Errors
    ///
    /// `NotFound` when there is no tombstone for `id`.
    pub fn confirm_delete(&mut self, id: AreaId) -> Result<(), AreaError> {
        let idx = self
            .areas
            .iter()
            .position(|a| a.id == id && a.status == AreaStatus::Deleted)
            .ok_or(AreaError::NotFound(id))?;
        self.areas.remove(idx);
        if let Some(pid) = id.persistent() {
            self.retired.insert(pid);
        }
        Ok(())
    }

    // --- Editors ---

    /// Open an editor seeded from the area's metadata. Reopening keeps the
    /// existing buffer. Returns whether a new editor was opened.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `Deleted` for tombstones.
    pub fn open_editor(&mut self, id: AreaId) -> Result<bool, AreaError> {
        let area = self.get(id).ok_or(AreaError::NotFound(id))?;
        if !area.is_active() {
            return Err(AreaError::Deleted(id));
        }
        if self.editor(id).is_some() {
            return Ok(false);
        }
        let buffer = EditBuffer::from_area(area);
        self.editors.push((id, buffer));
        Ok(true)
    }

    /// Close an editor, discarding its buffer. Returns whether one was open.
    pub fn close_editor(&mut self, id: AreaId) -> bool {
        let before = self.editors.len();
        self.editors.retain(|(eid, _)| *eid != id);
        self.editors.len() != before
    }

    pub fn close_all_editors(&mut self) {
        self.editors.clear();
    }

    #[must_use]
    pub fn editor(&self, id: AreaId) -> Option<&EditBuffer> {
        self.editors.iter().find(|(eid, _)| *eid == id).map(|(_, buffer)| buffer)
    }

    /// Change one field of an open editor's buffer.
    ///
    /// # Errors
    ///
    /// `EditorNotOpen` when no editor is open for `id`.
    pub fn update_editor(&mut self, id: AreaId, field: AreaField, value: impl Into<String>) -> Result<(), AreaError> {
        let (_, buffer) =
            self.editors.iter_mut().find(|(eid, _)| *eid == id).ok_or(AreaError::EditorNotOpen(id))?;
        buffer.set(field, value.into());
        Ok(())
    }

    /// Write the buffer's changed fields into the area and close the editor.
    ///
    /// # Errors
    ///
    /// `EditorNotOpen` when no editor is open, otherwise whatever
    /// [`AreaStore::edit`] reports.
    pub fn commit_editor(&mut self, id: AreaId) -> Result<(), AreaError> {
        let buffer = self.editor(id).cloned().ok_or(AreaError::EditorNotOpen(id))?;
        let area = self.get(id).ok_or(AreaError::NotFound(id))?;

        let changed: Vec<AreaField> = [AreaField::Name, AreaField::Description, AreaField::Color]
            .into_iter()
            .filter(|f| area.field(*f) != buffer.field(*f))
            .collect();
        for field in changed {
            self.edit(id, field, buffer.field(field))?;
        }
        self.close_editor(id);
        Ok(())
    }

    /// Ids with an open editor, in open order.
    #[must_use]
    pub fn open_editor_ids(&self) -> Vec<AreaId> {
        self.editors.iter().map(|(id, _)| *id).collect()
    }

    // --- Internal ---

    fn position(&self, id: AreaId) -> Option<usize> {
        self.areas.iter().position(|a| a.id == id)
    }

    fn get_mut(&mut self, id: AreaId) -> Result<&mut Area, AreaError> {
        self.areas.iter_mut().find(|a| a.id == id).ok_or(AreaError::NotFound(id))
    }

    fn with_status(&self, status: AreaStatus) -> Vec<&Area> {
        self.areas.iter().filter(|a| a.status == status).collect()
    }
}
