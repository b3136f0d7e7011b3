//! Geometry Builder: planar UTM coordinates to GeoSPARQL WKT literals.
//!
//! Inverse Transverse Mercator on the WGS84 ellipsoid (Snyder, USGS PP 1395,
//! eqs. 8-18 to 8-25). Output axis order is longitude then latitude, which is
//! the GeoSPARQL default (CRS84).

use crate::namespaces::geo;
use clap::ValueEnum;
use oxigraph::model::Literal;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use thiserror::Error;

const K0: f64 = 0.9996;
const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
const FLATTENING: f64 = 1.0 / 298.257_223_563;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;
const COORDINATE_DECIMALS: i32 = 8;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{reason}")]
pub struct ProjectionError {
    pub reason: String,
}

impl ProjectionError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    North,
    South,
}

/// A WGS84 UTM zone, the fixed source projection of a workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmZone {
    pub zone: u8,
    pub hemisphere: Hemisphere,
}

impl Default for UtmZone {
    /// GDA/WGS84 UTM zone 55 south (EPSG:32755), covering most of Queensland.
    fn default() -> Self {
        Self {
            zone: 55,
            hemisphere: Hemisphere::South,
        }
    }
}

impl UtmZone {
    pub fn new(zone: u8, hemisphere: Hemisphere) -> Self {
        Self { zone, hemisphere }
    }

    pub fn epsg(&self) -> u32 {
        match self.hemisphere {
            Hemisphere::North => 32600 + u32::from(self.zone),
            Hemisphere::South => 32700 + u32::from(self.zone),
        }
    }

    fn central_meridian(&self) -> f64 {
        f64::from(self.zone) * 6.0 - 183.0
    }

    /// Returns `(longitude, latitude)` in decimal degrees.
    pub fn to_geographic(&self, easting: f64, northing: f64) -> Result<(f64, f64), ProjectionError> {
        if !(1..=60).contains(&self.zone) {
            return Err(ProjectionError::new(format!(
                "UTM zone {} is outside 1-60",
                self.zone
            )));
        }
        if !easting.is_finite() || !northing.is_finite() {
            return Err(ProjectionError::new("coordinates must be finite numbers"));
        }

        let e2 = FLATTENING * (2.0 - FLATTENING);
        let ep2 = e2 / (1.0 - e2);
        let x = easting - FALSE_EASTING;
        let y = match self.hemisphere {
            Hemisphere::North => northing,
            Hemisphere::South => northing - FALSE_NORTHING_SOUTH,
        };

        let m = y / K0;
        let mu = m / (SEMI_MAJOR_AXIS * (1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0));
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        // footpoint latitude at a pole: tan/cos blow up below
        if !phi1.is_finite() || FRAC_PI_2 - phi1.abs() < 1e-10 {
            return Err(ProjectionError::new(format!(
                "northing {northing} projects onto a pole of EPSG:{}",
                self.epsg()
            )));
        }

        let sin_phi1 = phi1.sin();
        let cos_phi1 = phi1.cos();
        let tan_phi1 = phi1.tan();
        let c1 = ep2 * cos_phi1.powi(2);
        let t1 = tan_phi1.powi(2);
        let n1 = SEMI_MAJOR_AXIS / (1.0 - e2 * sin_phi1.powi(2)).sqrt();
        let r1 = SEMI_MAJOR_AXIS * (1.0 - e2) / (1.0 - e2 * sin_phi1.powi(2)).powf(1.5);
        let d = x / (n1 * K0);

        let latitude = phi1
            - (n1 * tan_phi1 / r1)
                * (d.powi(2) / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1.powi(2) - 9.0 * ep2) * d.powi(4)
                        / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1.powi(2)
                        - 252.0 * ep2
                        - 3.0 * c1.powi(2))
                        * d.powi(6)
                        / 720.0);
        let longitude = self.central_meridian().to_radians()
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1.powi(2) + 8.0 * ep2 + 24.0 * t1.powi(2))
                    * d.powi(5)
                    / 120.0)
                / cos_phi1;

        let (lon, lat) = (longitude.to_degrees(), latitude.to_degrees());
        // the series is only meaningful within a quarter turn of the meridian
        let offset = lon - self.central_meridian();
        if !lon.is_finite() || !lat.is_finite() || lat.abs() > 90.0 || offset.abs() >= 90.0 {
            return Err(ProjectionError::new(format!(
                "({easting}, {northing}) has no geographic position in EPSG:{}",
                self.epsg()
            )));
        }
        Ok((wrap_longitude(lon), lat))
    }
}

/// Zones 1 and 60 straddle the antimeridian.
fn wrap_longitude(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

/// Builds a `geo:wktLiteral` point, 3D when an elevation is given.
pub fn build_point(
    easting: f64,
    northing: f64,
    elevation: Option<f64>,
    source_crs: &UtmZone,
) -> Result<Literal, ProjectionError> {
    let (lon, lat) = source_crs.to_geographic(easting, northing)?;
    let wkt = match elevation {
        Some(z) if !z.is_finite() => {
            return Err(ProjectionError::new("elevation must be a finite number"));
        }
        Some(z) => format!(
            "POINT Z ({} {} {})",
            format_coordinate(lon),
            format_coordinate(lat),
            format_coordinate(z)
        ),
        None => format!("POINT ({} {})", format_coordinate(lon), format_coordinate(lat)),
    };
    Ok(Literal::new_typed_literal(wkt, geo::WKT_LITERAL))
}

fn format_coordinate(value: f64) -> String {
    let scale = 10f64.powi(COORDINATE_DECIMALS);
    let rounded = (value * scale).round() / scale;
    let text = format!("{rounded:.8}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
