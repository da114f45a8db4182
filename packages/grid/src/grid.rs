//! In-memory grid backed by an R-tree of cell envelopes.

use std::collections::BTreeMap;

use geo::{BoundingRect, Contains, Intersects, LineString, Point, Polygon, Rect};
use rstar::{AABB, RTree, RTreeObject};
use schematizer_grid_models::{Calibration, CellId, GridCell};

use crate::{CellLocator, GridError, calibrate};

/// A grid cell stored in the R-tree.
struct CellEntry {
    id: CellId,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for CellEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Square grid with fast point and line lookups.
pub struct Grid {
    cell_size: f64,
    /// Cells in id order; the first one is the calibration reference.
    centroids: BTreeMap<CellId, Point<f64>>,
    tree: RTree<CellEntry>,
}

impl Grid {
    /// Builds a grid from an already generated list of cells.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Calibration`] if the cell size is not a positive
    /// finite number.
    pub fn from_cells(cell_size: f64, cells: Vec<GridCell>) -> Result<Self, GridError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::Calibration {
                message: format!("cell size must be positive, got {cell_size}"),
            });
        }

        let half = cell_size * 0.5;
        let mut entries = Vec::with_capacity(cells.len());
        let mut centroids = BTreeMap::new();

        for cell in cells {
            let (x, y) = (cell.centroid.x(), cell.centroid.y());
            entries.push(CellEntry {
                id: cell.id,
                envelope: AABB::from_corners([x - half, y - half], [x + half, y + half]),
            });
            centroids.insert(cell.id, cell.centroid);
        }

        log::debug!("Indexed {} grid cells", centroids.len());

        Ok(Self {
            cell_size,
            centroids,
            tree: RTree::bulk_load(entries),
        })
    }

    /// Generates the cells covering a boundary polygon.
    ///
    /// Cells are laid out over the floored/ceiled bounding box of the
    /// boundary, column by column from the west and row by row from the
    /// north. A cell is kept when its centroid lies inside the boundary.
    /// Ids are assigned from 1 in generation order.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Calibration`] if the cell size is not a positive
    /// finite number or the boundary is empty.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn build(boundary: &Polygon<f64>, cell_size: f64) -> Result<Self, GridError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::Calibration {
                message: format!("cell size must be positive, got {cell_size}"),
            });
        }
        let Some(bbox) = boundary.bounding_rect() else {
            return Err(GridError::Calibration {
                message: "boundary polygon is empty".to_string(),
            });
        };

        let half = cell_size * 0.5;
        let x_min = bbox.min().x.floor();
        let x_max = bbox.max().x.ceil();
        let y_min = bbox.min().y.floor();
        let y_max = bbox.max().y.ceil();
        let cols = ((x_max - x_min).abs() / cell_size).ceil() as u64;
        let rows = ((y_max - y_min).abs() / cell_size).ceil() as u64;

        let mut cells = Vec::new();
        let mut next_id = 1_u32;
        for col in 0..cols {
            let x = (col as f64).mul_add(cell_size, x_min + half);
            for row in 0..rows {
                let y = (row as f64).mul_add(-cell_size, y_max - half);
                let centroid = Point::new(x, y);
                if boundary.contains(&centroid) {
                    cells.push(GridCell {
                        id: CellId(next_id),
                        centroid,
                    });
                    next_id += 1;
                }
            }
        }

        log::info!(
            "Built grid of {} cells ({cols} x {rows}, cell size {cell_size})",
            cells.len()
        );

        Self::from_cells(cell_size, cells)
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    /// Whether the grid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    /// All cells in id order.
    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.centroids.iter().map(|(&id, &centroid)| GridCell { id, centroid })
    }

    /// Calibrates from the centroid of the lowest-id cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Calibration`] if the grid has no cells.
    pub fn calibration(&self) -> Result<Calibration, GridError> {
        let Some(reference) = self.centroids.values().next() else {
            return Err(GridError::Calibration {
                message: "grid has no cells".to_string(),
            });
        };
        calibrate(*reference, self.cell_size)
    }
}

impl CellLocator for Grid {
    fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Cells sharing an edge both contain points on it; the lowest id wins.
    fn cell_id_at(&self, point: Point<f64>) -> Result<CellId, GridError> {
        let query = AABB::from_point([point.x(), point.y()]);
        self.tree
            .locate_in_envelope_intersecting(&query)
            .map(|entry| entry.id)
            .min()
            .ok_or(GridError::NoCellFound {
                x: point.x(),
                y: point.y(),
            })
    }

    fn centroid_of(&self, id: CellId) -> Result<Point<f64>, GridError> {
        self.centroids
            .get(&id)
            .copied()
            .ok_or(GridError::UnknownCell(id))
    }

    fn cells_intersecting(&self, line: &LineString<f64>) -> Vec<CellId> {
        line.bounding_rect()
            .map(|rect| self.cells_in(rect, |polygon| polygon.intersects(line)))
            .unwrap_or_default()
    }

    fn cells_overlapping(&self, polygon: &Polygon<f64>) -> Vec<CellId> {
        polygon
            .bounding_rect()
            .map(|rect| self.cells_in(rect, |cell| cell.intersects(polygon)))
            .unwrap_or_default()
    }
}

impl Grid {
    /// Cells whose envelope meets `rect` and whose square passes `filter`.
    fn cells_in(&self, rect: Rect<f64>, filter: impl Fn(&Polygon<f64>) -> bool) -> Vec<CellId> {
        let query = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);

        let mut ids: Vec<CellId> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .filter(|entry| self.cell_polygon(entry.id).is_ok_and(|polygon| filter(&polygon)))
            .map(|entry| entry.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}
