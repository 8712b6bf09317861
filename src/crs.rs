//! Coordinate reference systems the index builder can bring into lon/lat.
//!
//! Only inverse projections are needed: boundary vertices arrive in their
//! source CRS and every one of them is converted to WGS 84 degrees before a
//! centroid is taken.

use geo::MapCoords;
use geo_types::{Coord, Geometry};

use crate::error::IndexError;

/// WGS 84 / spherical Mercator radius
const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

/// GRS 80 semi-major axis and flattening (NAD83)
const GRS80_A: f64 = 6_378_137.0;
const GRS80_F: f64 = 1.0 / 298.257_222_101;

/// EPSG:5070 parameters, degrees
const CONUS_LAT_1: f64 = 29.5;
const CONUS_LAT_2: f64 = 45.5;
const CONUS_LAT_0: f64 = 23.0;
const CONUS_LON_0: f64 = -96.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    /// Coordinates already in degrees (x = lon, y = lat)
    Geographic { epsg: u32 },
    /// EPSG:3857 and its legacy aliases
    WebMercator { epsg: u32 },
    /// EPSG:5070, NAD83 / Conus Albers
    ConusAlbers,
}

impl Crs {
    pub const WGS84: Crs = Crs::Geographic { epsg: 4326 };

    pub fn from_epsg(code: u32) -> Result<Self, IndexError> {
        match code {
            4326 | 4269 | 4267 => Ok(Crs::Geographic { epsg: code }),
            3857 | 900913 | 102100 | 102113 => Ok(Crs::WebMercator { epsg: code }),
            5070 => Ok(Crs::ConusAlbers),
            _ => Err(IndexError::UnsupportedCrs(format!("EPSG:{}", code))),
        }
    }

    /// Parse a CRS name such as `EPSG:3857`, `urn:ogc:def:crs:EPSG::4269`
    /// or `urn:ogc:def:crs:OGC:1.3:CRS84`.
    pub fn from_name(name: &str) -> Result<Self, IndexError> {
        let trimmed = name.trim();
        if trimmed.to_ascii_uppercase().ends_with("CRS84") {
            return Ok(Crs::WGS84);
        }
        let code = trimmed
            .rsplit(':')
            .next()
            .and_then(|c| c.trim().parse::<u32>().ok())
            .ok_or_else(|| IndexError::UnsupportedCrs(trimmed.to_string()))?;
        Self::from_epsg(code)
    }

    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Geographic { epsg } | Crs::WebMercator { epsg } => *epsg,
            Crs::ConusAlbers => 5070,
        }
    }

    /// Convert one coordinate to lon/lat degrees.
    ///
    /// Returns `None` for non-finite input or a result outside
    /// lon [-180, 180] / lat [-90, 90]. Results that overshoot a limit by
    /// floating-point rounding only (the Web Mercator world edge) are
    /// clamped onto it.
    pub fn to_lon_lat(&self, c: Coord<f64>) -> Option<Coord<f64>> {
        if !c.x.is_finite() || !c.y.is_finite() {
            return None;
        }
        let out = match self {
            Crs::Geographic { .. } => c,
            Crs::WebMercator { .. } => web_mercator_inverse(c),
            Crs::ConusAlbers => CONUS_ALBERS.inverse(c)?,
        };
        Some(Coord {
            x: clamp_degrees(out.x, 180.0)?,
            y: clamp_degrees(out.y, 90.0)?,
        })
    }

    /// Reproject every vertex of a geometry into lon/lat degrees.
    ///
    /// On failure the offending source coordinate is returned.
    pub fn reproject(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>, Coord<f64>> {
        geometry.try_map_coords(|c| self.to_lon_lat(c).ok_or(c))
    }
}

/// Rounding slack allowed past a degree limit
const LIMIT_EPSILON: f64 = 1e-9;

fn clamp_degrees(value: f64, limit: f64) -> Option<f64> {
    if !value.is_finite() || value.abs() > limit + LIMIT_EPSILON {
        return None;
    }
    Some(value.clamp(-limit, limit))
}

fn web_mercator_inverse(c: Coord<f64>) -> Coord<f64> {
    let lon = (c.x / WEB_MERCATOR_RADIUS).to_degrees();
    let lat = (2.0 * (c.y / WEB_MERCATOR_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2)
        .to_degrees();
    Coord { x: lon, y: lat }
}

static CONUS_ALBERS: std::sync::LazyLock<AlbersEqualArea> = std::sync::LazyLock::new(|| {
    AlbersEqualArea::new(
        GRS80_A,
        GRS80_F,
        CONUS_LAT_1,
        CONUS_LAT_2,
        CONUS_LAT_0,
        CONUS_LON_0,
    )
});

/// Ellipsoidal Albers equal-area conic (Snyder, Map Projections, ch. 14).
#[derive(Debug, Clone, Copy)]
struct AlbersEqualArea {
    a: f64,
    e: f64,
    es: f64,
    n: f64,
    c: f64,
    rho0: f64,
    lon0: f64,
}

impl AlbersEqualArea {
    fn new(a: f64, f: f64, lat1: f64, lat2: f64, lat0: f64, lon0: f64) -> Self {
        let es = 2.0 * f - f * f;
        let e = es.sqrt();
        let (phi1, phi2, phi0) = (lat1.to_radians(), lat2.to_radians(), lat0.to_radians());

        let m1 = msfn(phi1, es);
        let m2 = msfn(phi2, es);
        let q0 = qsfn(phi0, e, es);
        let q1 = qsfn(phi1, e, es);
        let q2 = qsfn(phi2, e, es);

        let n = (m1 * m1 - m2 * m2) / (q2 - q1);
        let c = m1 * m1 + n * q1;
        let rho0 = a * (c - n * q0).sqrt() / n;

        Self {
            a,
            e,
            es,
            n,
            c,
            rho0,
            lon0: lon0.to_radians(),
        }
    }

    #[cfg(test)]
    fn forward(&self, lon_lat: Coord<f64>) -> Coord<f64> {
        let q = qsfn(lon_lat.y.to_radians(), self.e, self.es);
        let rho = self.a * (self.c - self.n * q).sqrt() / self.n;
        let theta = self.n * (lon_lat.x.to_radians() - self.lon0);
        Coord {
            x: rho * theta.sin(),
            y: self.rho0 - rho * theta.cos(),
        }
    }

    fn inverse(&self, c: Coord<f64>) -> Option<Coord<f64>> {
        let dy = self.rho0 - c.y;
        let rho = (c.x * c.x + dy * dy).sqrt();
        let theta = c.x.atan2(dy);
        let q = (self.c - rho * rho * self.n * self.n / (self.a * self.a)) / self.n;

        let lon = self.lon0 + theta / self.n;

        let mut phi = (q / 2.0).clamp(-1.0, 1.0).asin();
        for _ in 0..16 {
            let sin_phi = phi.sin();
            let con = 1.0 - self.es * sin_phi * sin_phi;
            let delta = con * con / (2.0 * phi.cos())
                * (q / (1.0 - self.es) - sin_phi / con
                    + 1.0 / (2.0 * self.e) * ((1.0 - self.e * sin_phi) / (1.0 + self.e * sin_phi)).ln());
            phi += delta;
            if delta.abs() < 1e-12 {
                return Some(Coord {
                    x: lon.to_degrees(),
                    y: phi.to_degrees(),
                });
            }
        }
        None
    }
}

fn msfn(phi: f64, es: f64) -> f64 {
    let s = phi.sin();
    phi.cos() / (1.0 - es * s * s).sqrt()
}

fn qsfn(phi: f64, e: f64, es: f64) -> f64 {
    let s = phi.sin();
    (1.0 - es) * (s / (1.0 - es * s * s) - (1.0 / (2.0 * e)) * ((1.0 - e * s) / (1.0 + e * s)).ln())
}
