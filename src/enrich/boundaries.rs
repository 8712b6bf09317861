//! Boundary file readers: GeoJSON and ArcGIS REST JSON, optionally gzipped.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use geo::Winding;
use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use serde_json::{json, Map, Value};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use cairn::{BoundaryFeature, Crs, FeatureCollection, IndexError};

/// Attribute names tried, in order, when no name field is configured
const NAME_FIELDS: &[&str] = &["ADMU_NAME", "FORESTNAME", "NAME", "name"];

/// Read a file, decompressing `.gz`
fn read_text(path: &Path) -> Result<String> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(content)
}

/// Load a boundary collection.
///
/// `srid` overrides whatever CRS the file declares.
pub fn load(path: &Path, name_field: Option<&str>, srid: Option<u32>) -> Result<FeatureCollection> {
    info!("Loading boundaries from {}", path.display());
    let content = read_text(path)?;
    let doc: Value = serde_json::from_str(&content).context("Boundary file is not valid JSON")?;
    let collection = parse(&doc, name_field, srid)?;
    info!(
        "Loaded {} boundary features (EPSG:{})",
        collection.features.len(),
        collection.srid
    );
    Ok(collection)
}

/// Load canonical names: a `.csv` column, or the feature names of a boundary file.
///
/// Only names are read, so the file's CRS is never consulted.
pub fn load_names(path: &Path, name_field: Option<&str>) -> Result<Vec<String>> {
    let is_csv = path
        .to_str()
        .map_or(false, |p| p.ends_with(".csv") || p.ends_with(".csv.gz"));
    if !is_csv {
        let doc: Value = serde_json::from_str(&read_text(path)?)
            .context("Boundary file is not valid JSON")?;
        return parse_names(&doc, name_field);
    }

    let content = read_text(path)?;
    let mut reader = csv::ReaderBuilder::new().from_reader(content.as_bytes());
    let headers = reader.headers()?.clone();
    let column = match name_field {
        Some(field) => headers.iter().position(|h| h.trim_start_matches('\u{feff}') == field),
        None => NAME_FIELDS
            .iter()
            .find_map(|field| headers.iter().position(|h| h.trim_start_matches('\u{feff}') == *field)),
    }
    .context("Name column not found in canonical name file")?;

    let mut names = Vec::new();
    for result in reader.records() {
        let record = result?;
        if let Some(name) = record.get(column) {
            names.push(name.trim().to_string());
        }
    }
    Ok(names)
}

fn features_of(doc: &Value) -> Result<&Vec<Value>> {
    doc.get("features")
        .and_then(Value::as_array)
        .context("Boundary file has no \"features\" array")
}

fn is_arcgis(doc: &Value, features: &[Value]) -> bool {
    doc.get("spatialReference").is_some() || features.iter().any(|f| f.get("attributes").is_some())
}

fn feature_attributes(feature: &Value, arcgis: bool) -> Map<String, Value> {
    let key = if arcgis { "attributes" } else { "properties" };
    feature
        .get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Feature names of a GeoJSON or ArcGIS document, in file order
pub fn parse_names(doc: &Value, name_field: Option<&str>) -> Result<Vec<String>> {
    let features = features_of(doc)?;
    let arcgis = is_arcgis(doc, features);
    Ok(features
        .iter()
        .filter_map(|f| feature_name(&feature_attributes(f, arcgis), name_field))
        .collect())
}

/// Parse a GeoJSON FeatureCollection or an ArcGIS query response.
///
/// `srid` overrides whatever CRS the document declares.
pub fn parse(doc: &Value, name_field: Option<&str>, srid: Option<u32>) -> Result<FeatureCollection> {
    let features = features_of(doc)?;
    let arcgis = is_arcgis(doc, features);

    let srid = match srid {
        Some(srid) => srid,
        None if arcgis => arcgis_srid(doc)?,
        None => geojson_srid(doc)?,
    };

    let mut out = Vec::with_capacity(features.len());
    for (i, feature) in features.iter().enumerate() {
        let geometry = if arcgis {
            feature.get("geometry").and_then(arcgis_geometry)
        } else {
            feature.get("geometry").and_then(geojson_geometry)
        };
        let attributes = feature_attributes(feature, arcgis);

        let name = feature_name(&attributes, name_field).unwrap_or_else(|| {
            warn!("Feature {} has no name attribute", i);
            String::new()
        });

        out.push(BoundaryFeature {
            name,
            geometry,
            attributes,
        });
    }

    Ok(FeatureCollection::new(srid, out))
}

fn feature_name(attributes: &Map<String, Value>, name_field: Option<&str>) -> Option<String> {
    let value = match name_field {
        Some(field) => attributes.get(field),
        None => NAME_FIELDS.iter().find_map(|f| attributes.get(*f)),
    }?;
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Legacy `crs` member; RFC 7946 files have none and are WGS 84.
fn geojson_srid(doc: &Value) -> Result<u32> {
    match doc.pointer("/crs/properties/name").and_then(Value::as_str) {
        Some(name) => Ok(Crs::from_name(name)?.epsg()),
        None => Ok(4326),
    }
}

/// ArcGIS responses must name their CRS by `latestWkid` or `wkid`; a
/// `wkt`-only or missing spatial reference needs an explicit `--srid`.
fn arcgis_srid(doc: &Value) -> Result<u32> {
    let sr = doc.get("spatialReference");
    let wkid = sr
        .and_then(|s| s.get("latestWkid"))
        .and_then(Value::as_u64)
        .or_else(|| sr.and_then(|s| s.get("wkid")).and_then(Value::as_u64));
    match wkid {
        Some(wkid) => Ok(Crs::from_epsg(wkid as u32)?.epsg()),
        None => {
            let described = sr.map_or_else(|| "missing spatialReference".to_string(), Value::to_string);
            Err(IndexError::UnsupportedCrs(described).into())
        }
    }
}

fn coord(value: &Value) -> Option<Coord<f64>> {
    let pair = value.as_array()?;
    Some(Coord {
        x: pair.first()?.as_f64()?,
        y: pair.get(1)?.as_f64()?,
    })
}

fn path(value: &Value) -> Option<LineString<f64>> {
    value
        .as_array()?
        .iter()
        .map(coord)
        .collect::<Option<Vec<_>>>()
        .map(LineString::new)
}

fn paths(value: &Value) -> Option<Vec<LineString<f64>>> {
    value.as_array()?.iter().map(path).collect()
}

fn polygon(value: &Value) -> Option<Polygon<f64>> {
    let mut rings = paths(value)?.into_iter();
    let exterior = rings.next().unwrap_or_else(|| LineString::new(vec![]));
    Some(Polygon::new(exterior, rings.collect()))
}

/// GeoJSON geometry object; `None` for null, unknown or malformed
fn geojson_geometry(value: &Value) -> Option<Geometry<f64>> {
    let kind = value.get("type")?.as_str()?;
    if kind == "GeometryCollection" {
        let parts = value
            .get("geometries")?
            .as_array()?
            .iter()
            .map(geojson_geometry)
            .collect::<Option<Vec<_>>>()?;
        return Some(Geometry::GeometryCollection(GeometryCollection::new_from(parts)));
    }

    let coords = value.get("coordinates")?;
    let geometry: Option<Geometry<f64>> = match kind {
        "Point" => coord(coords).map(|c| Point::from(c).into()),
        "MultiPoint" => path(coords).map(|ls| MultiPoint::from(ls.0).into()),
        "LineString" => path(coords).map(Geometry::from),
        "MultiLineString" => paths(coords).map(|ls| MultiLineString::new(ls).into()),
        "Polygon" => polygon(coords).map(Geometry::from),
        "MultiPolygon" => coords
            .as_array()
            .and_then(|polys| polys.iter().map(polygon).collect::<Option<Vec<_>>>())
            .map(|polys| MultiPolygon::new(polys).into()),
        _ => None,
    };
    if geometry.is_none() {
        warn!("Unreadable {} geometry", kind);
    }
    geometry
}

/// ArcGIS geometry: `rings`, `paths` or `x`/`y`.
///
/// Clockwise rings start a new polygon, counter-clockwise rings are holes
/// of the polygon before them.
fn arcgis_geometry(value: &Value) -> Option<Geometry<f64>> {
    if let Some(rings) = value.get("rings") {
        let mut polygons: Vec<Polygon<f64>> = Vec::new();
        for ring in paths(rings)? {
            match polygons.last_mut() {
                Some(last) if !ring.is_cw() => last.interiors_push(ring),
                _ => polygons.push(Polygon::new(ring, vec![])),
            }
        }
        return Some(match polygons.len() {
            1 => polygons.remove(0).into(),
            _ => MultiPolygon::new(polygons).into(),
        });
    }
    if let Some(lines) = value.get("paths") {
        return paths(lines).map(|ls| MultiLineString::new(ls).into());
    }
    let x = value.get("x")?.as_f64()?;
    let y = value.get("y")?.as_f64()?;
    Some(Point::new(x, y).into())
}

/// Write features back out as a GeoJSON FeatureCollection.
pub fn write_geojson(path: &Path, collection: &FeatureCollection) -> Result<()> {
    let features: Vec<Value> = collection
        .features
        .iter()
        .map(|f| {
            json!({
                "type": "Feature",
                "geometry": f.geometry.as_ref().map(geometry_to_json).unwrap_or(Value::Null),
                "properties": Value::Object(f.attributes.clone()),
            })
        })
        .collect();

    let mut doc = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    if collection.srid != 4326 {
        doc["crs"] = json!({
            "type": "name",
            "properties": { "name": format!("urn:ogc:def:crs:EPSG::{}", collection.srid) },
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer(std::io::BufWriter::new(file), &doc)?;
    info!("Wrote {} features to {}", features_len(&doc), path.display());
    Ok(())
}

fn features_len(doc: &Value) -> usize {
    doc["features"].as_array().map_or(0, Vec::len)
}

fn ring_json(ls: &LineString<f64>) -> Value {
    Value::Array(ls.coords().map(|c| json!([c.x, c.y])).collect())
}

fn polygon_json(p: &Polygon<f64>) -> Value {
    let mut rings = vec![ring_json(p.exterior())];
    rings.extend(p.interiors().iter().map(ring_json));
    Value::Array(rings)
}

fn geometry_to_json(geometry: &Geometry<f64>) -> Value {
    match geometry {
        Geometry::Point(p) => json!({"type": "Point", "coordinates": [p.x(), p.y()]}),
        Geometry::Line(l) => json!({
            "type": "LineString",
            "coordinates": [[l.start.x, l.start.y], [l.end.x, l.end.y]],
        }),
        Geometry::LineString(ls) => json!({"type": "LineString", "coordinates": ring_json(ls)}),
        Geometry::Polygon(p) => json!({"type": "Polygon", "coordinates": polygon_json(p)}),
        Geometry::MultiPoint(mp) => json!({
            "type": "MultiPoint",
            "coordinates": mp.iter().map(|p| json!([p.x(), p.y()])).collect::<Vec<_>>(),
        }),
        Geometry::MultiLineString(mls) => json!({
            "type": "MultiLineString",
            "coordinates": mls.iter().map(ring_json).collect::<Vec<_>>(),
        }),
        Geometry::MultiPolygon(mp) => json!({
            "type": "MultiPolygon",
            "coordinates": mp.iter().map(polygon_json).collect::<Vec<_>>(),
        }),
        Geometry::GeometryCollection(gc) => json!({
            "type": "GeometryCollection",
            "geometries": gc.iter().map(geometry_to_json).collect::<Vec<_>>(),
        }),
        Geometry::Rect(r) => json!({"type": "Polygon", "coordinates": polygon_json(&r.to_polygon())}),
        Geometry::Triangle(t) => json!({"type": "Polygon", "coordinates": polygon_json(&t.to_polygon())}),
    }
}
