//! Session point list with linear undo/redo.

use thiserror::Error;

use crate::model::{Depth, InjectionPoint};

const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("point `{0}` already exists")]
    DuplicatePoint(String),
    #[error("unknown point `{0}`")]
    UnknownPoint(String),
    #[error("coordinates of point `{0}` are not finite")]
    NonFiniteCoordinates(String),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
}

pub type PlanResult<T> = std::result::Result<T, PlanError>;

/// The points of one session.
///
/// Every successful edit records a snapshot; a new edit after an undo drops the
/// redo branch. Only template percentages are stored.
#[derive(Debug, Clone, Default)]
pub struct TreatmentPlan {
    points: Vec<InjectionPoint>,
    undo: Vec<Vec<InjectionPoint>>,
    redo: Vec<Vec<InjectionPoint>>,
}

impl TreatmentPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn points(&self) -> &[InjectionPoint] {
        &self.points
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&InjectionPoint> {
        self.points.iter().find(|point| point.id == id)
    }

    #[must_use]
    pub fn total_dosage(&self) -> u32 {
        self.points
            .iter()
            .fold(0u32, |total, point| total.saturating_add(point.dosage))
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Replace the whole point list, e.g. with a fresh proposal. Undoable.
    pub fn load(&mut self, points: Vec<InjectionPoint>) -> PlanResult<()> {
        let mut prepared: Vec<InjectionPoint> = Vec::with_capacity(points.len());
        for point in points {
            if prepared.iter().any(|existing| existing.id == point.id) {
                return Err(PlanError::DuplicatePoint(point.id));
            }
            prepared.push(prepare(point)?);
        }
        self.record();
        self.points = prepared;
        Ok(())
    }

    pub fn add(&mut self, point: InjectionPoint) -> PlanResult<()> {
        if self.get(&point.id).is_some() {
            return Err(PlanError::DuplicatePoint(point.id));
        }
        let point = prepare(point)?;
        self.record();
        self.points.push(point);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> PlanResult<InjectionPoint> {
        let index = self.index_of(id)?;
        self.record();
        Ok(self.points.remove(index))
    }

    pub fn set_dosage(&mut self, id: &str, dosage: u32) -> PlanResult<()> {
        let index = self.index_of(id)?;
        if self.points[index].dosage == dosage {
            return Ok(());
        }
        self.record();
        self.points[index].dosage = dosage;
        Ok(())
    }

    pub fn set_depth(&mut self, id: &str, depth: Depth) -> PlanResult<()> {
        let index = self.index_of(id)?;
        if self.points[index].depth == depth {
            return Ok(());
        }
        self.record();
        self.points[index].depth = depth;
        Ok(())
    }

    /// Move a point to new template percentages, clamped to `0..=100`.
    pub fn move_point(&mut self, id: &str, x: f64, y: f64) -> PlanResult<()> {
        let index = self.index_of(id)?;
        if !x.is_finite() || !y.is_finite() {
            return Err(PlanError::NonFiniteCoordinates(id.to_owned()));
        }
        let (x, y) = (x.clamp(0.0, 100.0), y.clamp(0.0, 100.0));
        if self.points[index].x == x && self.points[index].y == y {
            return Ok(());
        }
        self.record();
        let point = &mut self.points[index];
        point.x = x;
        point.y = y;
        Ok(())
    }

    /// Clear every point. Undoable.
    pub fn reset(&mut self) {
        if self.points.is_empty() {
            return;
        }
        self.record();
        self.points.clear();
    }

    pub fn undo(&mut self) -> PlanResult<()> {
        let previous = self.undo.pop().ok_or(PlanError::NothingToUndo)?;
        self.redo.push(std::mem::replace(&mut self.points, previous));
        Ok(())
    }

    pub fn redo(&mut self) -> PlanResult<()> {
        let next = self.redo.pop().ok_or(PlanError::NothingToRedo)?;
        self.undo.push(std::mem::replace(&mut self.points, next));
        Ok(())
    }

    fn index_of(&self, id: &str) -> PlanResult<usize> {
        self.points
            .iter()
            .position(|point| point.id == id)
            .ok_or_else(|| PlanError::UnknownPoint(id.to_owned()))
    }

    fn record(&mut self) {
        if self.undo.len() == HISTORY_LIMIT {
            self.undo.remove(0);
        }
        self.undo.push(self.points.clone());
        self.redo.clear();
    }
}

fn prepare(mut point: InjectionPoint) -> PlanResult<InjectionPoint> {
    if !point.x.is_finite() || !point.y.is_finite() {
        return Err(PlanError::NonFiniteCoordinates(point.id));
    }
    point.x = point.x.clamp(0.0, 100.0);
    point.y = point.y.clamp(0.0, 100.0);
    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn procerus(id: &str) -> InjectionPoint {
        InjectionPoint::new(id, "procerus", 50.0, 30.0, 4)
    }

    #[test]
    fn add_and_remove() {
        let mut plan = TreatmentPlan::new();
        plan.add(procerus("a")).unwrap();
        plan.add(procerus("b")).unwrap();
        assert_eq!(plan.points().len(), 2);
        assert_eq!(plan.total_dosage(), 8);

        let removed = plan.remove("a").unwrap();
        assert_eq!(removed.id, "a");
        assert_eq!(plan.points().len(), 1);
    }

    #[test]
    fn duplicate_and_unknown_ids_are_rejected() {
        let mut plan = TreatmentPlan::new();
        plan.add(procerus("a")).unwrap();
        assert_eq!(
            plan.add(procerus("a")),
            Err(PlanError::DuplicatePoint("a".to_owned()))
        );
        assert_eq!(
            plan.set_dosage("zz", 3),
            Err(PlanError::UnknownPoint("zz".to_owned()))
        );
        // Failed edits leave no history entry.
        plan.undo().unwrap();
        assert!(plan.points().is_empty());
        assert!(!plan.can_undo());
    }

    #[test]
    fn undo_and_redo_walk_the_history() {
        let mut plan = TreatmentPlan::new();
        plan.add(procerus("a")).unwrap();
        plan.set_dosage("a", 10).unwrap();
        plan.move_point("a", 52.0, 31.0).unwrap();

        plan.undo().unwrap();
        assert_eq!(plan.get("a").unwrap().x, 50.0);
        plan.undo().unwrap();
        assert_eq!(plan.get("a").unwrap().dosage, 4);

        plan.redo().unwrap();
        assert_eq!(plan.get("a").unwrap().dosage, 10);
        plan.redo().unwrap();
        assert_eq!(plan.get("a").unwrap().x, 52.0);
        assert_eq!(plan.redo(), Err(PlanError::NothingToRedo));
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut plan = TreatmentPlan::new();
        plan.add(procerus("a")).unwrap();
        plan.set_dosage("a", 6).unwrap();
        plan.undo().unwrap();
        assert!(plan.can_redo());

        plan.set_dosage("a", 8).unwrap();
        assert!(!plan.can_redo());
    }

    #[test]
    fn unchanged_values_do_not_record() {
        let mut plan = TreatmentPlan::new();
        plan.add(procerus("a")).unwrap();
        plan.set_dosage("a", 4).unwrap();
        plan.set_depth("a", Depth::Superficial).unwrap();
        plan.move_point("a", 50.0, 30.0).unwrap();
        plan.undo().unwrap();
        assert!(!plan.can_undo());
    }

    #[test]
    fn move_clamps_and_rejects_non_finite() {
        let mut plan = TreatmentPlan::new();
        plan.add(procerus("a")).unwrap();
        plan.move_point("a", -5.0, 140.0).unwrap();
        let point = plan.get("a").unwrap();
        assert_eq!((point.x, point.y), (0.0, 100.0));

        // Clamps onto the current position: nothing to record.
        plan.move_point("a", -20.0, 180.0).unwrap();
        plan.undo().unwrap();
        assert_eq!(plan.get("a").unwrap().x, 50.0);

        assert_eq!(
            plan.move_point("a", f64::NAN, 10.0),
            Err(PlanError::NonFiniteCoordinates("a".to_owned()))
        );
    }

    #[test]
    fn reset_and_load_are_undoable() {
        let mut plan = TreatmentPlan::new();
        plan.load(vec![procerus("a"), procerus("b")]).unwrap();
        plan.reset();
        assert!(plan.points().is_empty());
        plan.undo().unwrap();
        assert_eq!(plan.points().len(), 2);

        assert_eq!(
            plan.load(vec![procerus("c"), procerus("c")]),
            Err(PlanError::DuplicatePoint("c".to_owned()))
        );
        assert_eq!(plan.points().len(), 2);
    }

    #[test]
    fn history_is_bounded() {
        let mut plan = TreatmentPlan::new();
        plan.add(procerus("a")).unwrap();
        for dosage in 0..(HISTORY_LIMIT as u32 + 20) {
            plan.set_dosage("a", dosage + 5).unwrap();
        }
        let mut undone = 0;
        while plan.undo().is_ok() {
            undone += 1;
        }
        assert_eq!(undone, HISTORY_LIMIT);
    }
}
