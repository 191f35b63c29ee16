//! Save/hydrate reconciliation between an [`AreaStore`] and an
//! [`AreaRepository`].
//!
//! DESIGN
//! ======
//! The store is authoritative. `save` walks the pending inserts, updates
//! and deletes in that order and sends one request per area. A confirmed
//! request is folded back into the store (`confirm_*`); a failed one leaves
//! the area in its pending status so the next save retries it.
//!
//! The model id travels in a [`SyncContext`]; nothing here is global.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use digitizer::areas::{Area, AreaId, AreaStore, PersistedArea};
use digitizer::camera::Point;
use digitizer::consts::DEFAULT_AREA_COLOR;
use digitizer::geometry::polygon_area;
use tracing::{info, warn};

use super::repository::{
    AreaDelta, AreaKey, AreaRecord, AreaRepository, CoordinateRecord, DrawingStatus, RepositoryError, SaveReceipt,
};

const AREA_STYLE_SOLID: &str = "SOLID";

/// Which model the store belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncContext {
    pub model_id: String,
}

impl SyncContext {
    #[must_use]
    pub fn new(model_id: impl Into<String>) -> Self {
        Self { model_id: model_id.into() }
    }
}

/// One request that did not go through.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveFailure {
    pub id: AreaId,
    pub status: DrawingStatus,
    pub reason: String,
}

/// Outcome of one save pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveReport {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Inserts the collaborator accepted without returning an id. They stay
    /// pending in the store.
    pub unconfirmed: usize,
    pub failures: Vec<SaveFailure>,
}

impl SaveReport {
    /// Requests the collaborator accepted.
    #[must_use]
    pub fn saved(&self) -> usize {
        self.inserted + self.updated + self.deleted + self.unconfirmed
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.unconfirmed == 0
    }

    fn fail(&mut self, id: AreaId, status: DrawingStatus, reason: impl ToString) {
        let reason = reason.to_string();
        warn!(%id, ?status, %reason, "area save failed");
        self.failures.push(SaveFailure { id, status, reason });
    }
}

// =============================================================================
// PAYLOADS
// =============================================================================

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Insert payload: rounded coordinates numbered from 1, rounded size.
#[must_use]
pub fn insert_delta(ctx: &SyncContext, area: &Area) -> AreaDelta {
    let coordinates = area
        .coordinates
        .iter()
        .zip(1..)
        .map(|(p, point_order)| CoordinateRecord { point_order, x: round3(p.x), y: round3(p.y) })
        .collect();
    AreaDelta {
        model_id: Some(ctx.model_id.clone()),
        area_nm: Some(area.name.clone()),
        area_desc: Some(area.description.clone()),
        area_color: Some(area.color.clone()),
        area_size: Some(polygon_area(&area.coordinates).round()),
        area_style: Some(AREA_STYLE_SOLID.to_string()),
        coordinates: Some(coordinates),
        ..AreaDelta::new(DrawingStatus::Insert)
    }
}

/// Update payload: metadata only. `None` for areas without a stored id.
#[must_use]
pub fn update_delta(area: &Area) -> Option<AreaDelta> {
    let id = area.id.persistent()?;
    Some(AreaDelta {
        area_id: Some(AreaKey::Id(id)),
        area_nm: Some(area.name.clone()),
        area_desc: Some(area.description.clone()),
        area_color: Some(area.color.clone()),
        area_style: Some(AREA_STYLE_SOLID.to_string()),
        ..AreaDelta::new(DrawingStatus::Update)
    })
}

/// Delete payload. `None` for areas without a stored id.
#[must_use]
pub fn delete_delta(area: &Area) -> Option<AreaDelta> {
    let id = area.id.persistent()?;
    Some(AreaDelta { area_id: Some(AreaKey::Id(id)), ..AreaDelta::new(DrawingStatus::Delete) })
}

/// Convert a listed record: coordinates sorted by `pointOrder`, missing
/// metadata defaulted.
#[must_use]
pub fn persisted_from_record(mut record: AreaRecord) -> PersistedArea {
    record.coordinates.sort_by_key(|c| c.point_order);
    PersistedArea {
        id: record.area_id,
        coordinates: record.coordinates.iter().map(|c| Point::new(c.x, c.y)).collect(),
        name: record.area_nm.unwrap_or_else(|| format!("Area_{}", record.area_id)),
        description: record.area_desc.unwrap_or_default(),
        color: record.area_color.unwrap_or_else(|| DEFAULT_AREA_COLOR.to_string()),
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Load every stored area of the model into `store`. Records the store
/// refuses (too few points, retired ids) are skipped. Returns how many loaded.
///
/// # Errors
///
/// Returns the repository error if the list request fails.
pub async fn hydrate(
    repo: &dyn AreaRepository,
    ctx: &SyncContext,
    store: &mut AreaStore,
) -> Result<usize, RepositoryError> {
    let records = repo.list(&ctx.model_id).await?;
    let total = records.len();
    let mut loaded = 0;
    for record in records {
        let area_id = record.area_id;
        match store.load_persisted(persisted_from_record(record)) {
            Ok(()) => loaded += 1,
            Err(e) => warn!(area_id, error = %e, "skipping stored area"),
        }
    }
    info!(model_id = %ctx.model_id, loaded, total, "areas hydrated");
    Ok(loaded)
}

/// Push every pending change to the collaborator and fold the confirmed
/// ones back into `store`.
pub async fn save(repo: &dyn AreaRepository, ctx: &SyncContext, store: &mut AreaStore) -> SaveReport {
    let mut report = SaveReport::default();

    let inserts: Vec<(AreaId, AreaDelta)> =
        store.pending_inserts().into_iter().map(|area| (area.id, insert_delta(ctx, area))).collect();
    for (id, delta) in inserts {
        match repo.save(&delta).await {
            Ok(SaveReceipt { area_id: Some(persistent_id), .. }) => match store.confirm_insert(id, persistent_id) {
                Ok(_) => report.inserted += 1,
                Err(e) => report.fail(id, DrawingStatus::Insert, e),
            },
            Ok(SaveReceipt { area_id: None, .. }) => {
                warn!(%id, "insert accepted without an area id; keeping it pending");
                report.unconfirmed += 1;
            }
            Err(e) => report.fail(id, DrawingStatus::Insert, e),
        }
    }

    let updates: Vec<(AreaId, Option<AreaDelta>)> =
        store.pending_updates().into_iter().map(|area| (area.id, update_delta(area))).collect();
    for (id, delta) in updates {
        let Some(delta) = delta else {
            report.fail(id, DrawingStatus::Update, "area has no stored id");
            continue;
        };
        match repo.save(&delta).await {
            Ok(_) => match store.confirm_update(id) {
                Ok(()) => report.updated += 1,
                Err(e) => report.fail(id, DrawingStatus::Update, e),
            },
            Err(e) => report.fail(id, DrawingStatus::Update, e),
        }
    }

    let deletes: Vec<(AreaId, Option<AreaDelta>)> =
        store.pending_deletes().into_iter().map(|area| (area.id, delete_delta(area))).collect();
    for (id, delta) in deletes {
        let Some(delta) = delta else {
            report.fail(id, DrawingStatus::Delete, "area has no stored id");
            continue;
        };
        match repo.save(&delta).await {
            Ok(_) => match store.confirm_delete(id) {
                Ok(()) => report.deleted += 1,
                Err(e) => report.fail(id, DrawingStatus::Delete, e),
            },
            Err(e) => report.fail(id, DrawingStatus::Delete, e),
        }
    }

    info!(
        model_id = %ctx.model_id,
        inserted = report.inserted,
        updated = report.updated,
        deleted = report.deleted,
        unconfirmed = report.unconfirmed,
        failed = report.failures.len(),
        "save finished"
    );
    report
}

/// Ask the collaborator to drop every stored area of the model.
///
/// # Errors
///
/// Returns the repository error if the request fails or is rejected.
pub async fn delete_all(repo: &dyn AreaRepository, ctx: &SyncContext) -> Result<(), RepositoryError> {
    let delta = AreaDelta {
        model_id: Some(ctx.model_id.clone()),
        area_id: Some(AreaKey::All),
        ..AreaDelta::new(DrawingStatus::Delete)
    };
    repo.save(&delta).await?;
    info!(model_id = %ctx.model_id, "all stored areas deleted");
    Ok(())
}
