//! Point-containment oracle over a persisted grid.

use geo::{LineString, Point, Polygon, Rect, coord};
use schematizer_grid_models::CellId;

use crate::GridError;

/// Cell lookups the schematizers need from the grid collaborator.
///
/// Whether a [`GridError::NoCellFound`] is fatal is the caller's decision:
/// the first vertex of a structure without a cell is, a sample past the
/// domain edge is not.
pub trait CellLocator {
    /// Side length of every cell.
    fn cell_size(&self) -> f64;

    /// Returns the id of the cell containing `point`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NoCellFound`] if no cell contains the point.
    fn cell_id_at(&self, point: Point<f64>) -> Result<CellId, GridError>;

    /// Returns the centroid of a cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownCell`] if the id is not part of the grid.
    fn centroid_of(&self, id: CellId) -> Result<Point<f64>, GridError>;

    /// Returns the ids of all cells a line passes through, in ascending id
    /// order.
    fn cells_intersecting(&self, line: &LineString<f64>) -> Vec<CellId>;

    /// Returns the ids of all cells sharing area or boundary with a polygon,
    /// in ascending id order.
    fn cells_overlapping(&self, polygon: &Polygon<f64>) -> Vec<CellId>;

    /// Returns the square outline of a cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownCell`] if the id is not part of the grid.
    fn cell_polygon(&self, id: CellId) -> Result<Polygon<f64>, GridError> {
        let centroid = self.centroid_of(id)?;
        let half = self.cell_size() * 0.5;
        Ok(Rect::new(
            coord! { x: centroid.x() - half, y: centroid.y() - half },
            coord! { x: centroid.x() + half, y: centroid.y() + half },
        )
        .to_polygon())
    }
}
