//! GeoJSON layers to schematizer inputs.
//!
//! Feature ids come from the GeoJSON `id` member, then a `fid` property,
//! then the feature's 1-based position. A feature whose geometry has the
//! wrong type is logged and left out.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr as _;

use geo::{Geometry, LineString, Point, Polygon};
use geojson::{Feature, GeoJson, feature::Id};
use schematizer_channel_models::{BankLine, CrossSectionKind, UserCrossSection};
use schematizer_levee_models::{BlockedArea, CrestPoint, ElevationPolygon, LeveeLine};
use schematizer_street_models::{FloodplainLine, StreetLine};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Cannot read layer {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Expected a feature collection, found a bare geometry")]
    NotFeatures,
}

/// Reads every feature of the GeoJSON file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds no features.
pub fn read_layer(path: &Path) -> Result<Vec<Feature>, FeatureError> {
    let contents = std::fs::read_to_string(path).map_err(|source| FeatureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let features = parse_layer(&contents)?;
    log::info!("Read {} feature(s) from {}", features.len(), path.display());
    Ok(features)
}

/// Parses a feature collection, or a single feature, from a string.
///
/// # Errors
///
/// Returns an error if the string is not GeoJSON or is a bare geometry.
pub fn parse_layer(geojson_str: &str) -> Result<Vec<Feature>, FeatureError> {
    match geojson_str.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection.features),
        GeoJson::Feature(feature) => Ok(vec![feature]),
        GeoJson::Geometry(_) => Err(FeatureError::NotFeatures),
    }
}

/// First polygon of a boundary layer.
#[must_use]
pub fn boundary(features: &[Feature]) -> Option<Polygon<f64>> {
    features.iter().find_map(polygon)
}

#[must_use]
pub fn bank_lines(features: &[Feature], right_banks: &[Feature]) -> Vec<BankLine> {
    let right: HashMap<i64, LineString<f64>> = right_banks
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| Some((fid(feature, index), line(feature)?)))
        .collect();

    convert(features, "bank line", |fid, feature| {
        Some(BankLine {
            fid,
            geometry: line(feature)?,
            rank: integer(feature, "rank").and_then(|rank| u32::try_from(rank).ok()),
            right_bank: right.get(&fid).cloned(),
            name: text(feature, "name"),
        })
    })
}

/// Cross-sections default to natural when the `type` property is absent.
#[must_use]
pub fn cross_sections(features: &[Feature]) -> Vec<UserCrossSection> {
    convert(features, "cross-section", |fid, feature| {
        let kind = match text(feature, "type") {
            Some(tag) => CrossSectionKind::from_str(&tag).ok()?,
            None => CrossSectionKind::Natural,
        };
        Some(UserCrossSection {
            fid,
            kind,
            geometry: line(feature)?,
        })
    })
}

#[must_use]
pub fn levee_lines(features: &[Feature]) -> Vec<LeveeLine> {
    convert(features, "levee line", |fid, feature| {
        Some(LeveeLine {
            fid,
            geometry: line(feature)?,
            elevation: number(feature, "elev"),
            name: text(feature, "name"),
        })
    })
}

/// Crest points without an elevation are left out.
#[must_use]
pub fn crest_points(features: &[Feature]) -> Vec<CrestPoint> {
    convert(features, "crest point", |fid, feature| {
        Some(CrestPoint {
            fid,
            geometry: point(feature)?,
            elevation: number(feature, "elev")?,
        })
    })
}

#[must_use]
pub fn elevation_polygons(features: &[Feature]) -> Vec<ElevationPolygon> {
    convert(features, "elevation polygon", |fid, feature| {
        Some(ElevationPolygon {
            fid,
            geometry: polygon(feature)?,
            elevation: number(feature, "elev"),
            correction: number(feature, "correction"),
        })
    })
}

#[must_use]
pub fn blocked_areas(features: &[Feature]) -> Vec<BlockedArea> {
    convert(features, "blocked area", |fid, feature| {
        Some(BlockedArea {
            fid,
            geometry: polygon(feature)?,
        })
    })
}

#[must_use]
pub fn streets(features: &[Feature]) -> Vec<StreetLine> {
    convert(features, "street", |fid, feature| {
        Some(StreetLine {
            fid,
            geometry: line(feature)?,
            name: text(feature, "name"),
            notes: text(feature, "notes"),
            curb_height: number(feature, "curb_height"),
            roughness: number(feature, "n_value"),
            elevation: number(feature, "elevation"),
            width: number(feature, "street_width"),
        })
    })
}

#[must_use]
pub fn floodplain_lines(features: &[Feature]) -> Vec<FloodplainLine> {
    convert(features, "floodplain cross-section", |fid, feature| {
        Some(FloodplainLine {
            fid,
            geometry: line(feature)?,
            iflo: integer(feature, "iflo").and_then(|iflo| u8::try_from(iflo).ok()),
        })
    })
}

fn convert<T>(features: &[Feature], kind: &str, parse: impl Fn(i64, &Feature) -> Option<T>) -> Vec<T> {
    features
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| {
            let fid = fid(feature, index);
            let parsed = parse(fid, feature);
            if parsed.is_none() {
                log::warn!("Skipping {kind} feature {fid}: missing geometry or required property");
            }
            parsed
        })
        .collect()
}

fn fid(feature: &Feature, index: usize) -> i64 {
    let explicit = match &feature.id {
        Some(Id::Number(number)) => number.as_i64(),
        Some(Id::String(id)) => id.parse().ok(),
        None => None,
    };
    explicit
        .or_else(|| integer(feature, "fid"))
        .unwrap_or_else(|| i64::try_from(index + 1).unwrap_or(i64::MAX))
}

fn geometry(feature: &Feature) -> Option<Geometry<f64>> {
    feature.geometry.clone()?.try_into().ok()
}

fn line(feature: &Feature) -> Option<LineString<f64>> {
    match geometry(feature)? {
        Geometry::LineString(line) => Some(line),
        Geometry::MultiLineString(lines) => lines.0.into_iter().next(),
        Geometry::Line(line) => Some(line.into()),
        _ => None,
    }
}

fn polygon(feature: &Feature) -> Option<Polygon<f64>> {
    match geometry(feature)? {
        Geometry::Polygon(polygon) => Some(polygon),
        Geometry::MultiPolygon(polygons) => polygons.0.into_iter().next(),
        Geometry::Rect(rect) => Some(rect.to_polygon()),
        _ => None,
    }
}

fn point(feature: &Feature) -> Option<Point<f64>> {
    match geometry(feature)? {
        Geometry::Point(point) => Some(point),
        Geometry::MultiPoint(points) => points.0.into_iter().next(),
        _ => None,
    }
}

fn number(feature: &Feature, key: &str) -> Option<f64> {
    feature.property(key).and_then(serde_json::Value::as_f64)
}

fn integer(feature: &Feature, key: &str) -> Option<i64> {
    feature.property(key).and_then(serde_json::Value::as_i64)
}

fn text(feature: &Feature, key: &str) -> Option<String> {
    feature
        .property(key)
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
}
