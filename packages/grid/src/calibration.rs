//! Grid calibration.

use geo::Point;
use schematizer_grid_models::Calibration;

use crate::GridError;

/// Computes the calibration offset from one known cell centroid.
///
/// The offset moves the reference centroid onto the nearest multiple of the
/// cell size, so that every centroid of the same grid scales to an exact
/// integer.
///
/// # Errors
///
/// Returns [`GridError::Calibration`] if the cell size is not a positive
/// finite number or the reference point is not finite.
pub fn calibrate(reference: Point<f64>, cell_size: f64) -> Result<Calibration, GridError> {
    if !cell_size.is_finite() || cell_size <= 0.0 {
        return Err(GridError::Calibration {
            message: format!("cell size must be positive, got {cell_size}"),
        });
    }
    if !reference.x().is_finite() || !reference.y().is_finite() {
        return Err(GridError::Calibration {
            message: format!(
                "reference point ({}, {}) is not finite",
                reference.x(),
                reference.y()
            ),
        });
    }

    let offset_x = (reference.x() / cell_size).round_ties_even() * cell_size - reference.x();
    let offset_y = (reference.y() / cell_size).round_ties_even() * cell_size - reference.y();

    log::debug!("Calibrated grid: cell size {cell_size}, offset ({offset_x}, {offset_y})");

    Ok(Calibration {
        cell_size,
        offset_x,
        offset_y,
    })
}
