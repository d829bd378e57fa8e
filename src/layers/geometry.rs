//! Static reference geometry: land, lakes, borders and labels.
//!
//! Features are projected into the normalized Mercator square once at load
//! time and polygons are triangulated there. Since the camera transform is
//! a uniform scale plus translation, the same triangles stay valid on
//! screen for every camera and every wrap copy.

use crate::{
    core::{
        bounds::Bounds,
        config::{LayerThreshold, LayerVisibilityConfig, PlaceRankConfig},
        geo::{LatLng, Point},
        projection,
        viewport::{Camera, ViewportSize},
    },
    layers::base::{LayerKind, LayerProperties, LayerView, MapLayer},
    rendering::context::{LineRenderStyle, RenderContext, Rgba, TextAnchor, TextRenderStyle},
    MapError, Result,
};
use geo::{BoundingRect, Centroid, TriangulateEarcut};
use geo_types::{Coord, LineString, Polygon};
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

// --- GeoJSON input -----------------------------------------------------------------------------

/// Positions may carry an altitude; only the first two values are used
type Position = Vec<f64>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
enum GeoJsonGeometry {
    Point {
        coordinates: Position,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJsonGeometry>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct GeoJsonFeature {
    geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    properties: Option<serde_json::Map<String, Value>>,
}

impl GeoJsonFeature {
    fn name(&self) -> Option<String> {
        let props = self.properties.as_ref()?;
        ["name_en", "NAME_EN", "name", "NAME", "label"]
            .iter()
            .find_map(|key| props.get(*key)?.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn population(&self) -> f64 {
        let Some(props) = self.properties.as_ref() else {
            return 0.0;
        };
        ["pop_max", "POP_MAX", "population", "pop_est", "POP_EST"]
            .iter()
            .find_map(|key| props.get(*key)?.as_f64())
            .unwrap_or(0.0)
    }
}

/// Decodes a FeatureCollection (or a bare Feature / geometry) feature by
/// feature. Returns the features and how many were unreadable.
fn parse_features(json: &str) -> Result<(Vec<GeoJsonFeature>, usize)> {
    let mut root: Value = serde_json::from_str(json)
        .map_err(|e| MapError::ParseError(format!("invalid GeoJSON: {e}")))?;

    let kind = root
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let raw_features = match kind.as_str() {
        "FeatureCollection" => match root.get_mut("features").map(Value::take) {
            Some(Value::Array(features)) => features,
            _ => return Err(MapError::ParseError("FeatureCollection without features".into())),
        },
        "Feature" => vec![root],
        "" => return Err(MapError::ParseError("GeoJSON object without type".into())),
        _ => vec![serde_json::json!({ "type": "Feature", "geometry": root })],
    };

    let mut skipped = 0;
    let features = raw_features
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<GeoJsonFeature>(raw) {
            Ok(feature) => Some(feature),
            Err(err) => {
                log::debug!("skipping unreadable feature: {err}");
                skipped += 1;
                None
            }
        })
        .collect();
    Ok((features, skipped))
}

// --- Projected geometry ------------------------------------------------------------------------

/// Normalized-square coordinate of a position, latitude clamped
fn project(position: &[f64]) -> Option<Coord<f64>> {
    let (&lng, &lat) = (position.first()?, position.get(1)?);
    if !(lng.is_finite() && lat.is_finite()) {
        return None;
    }
    let (u, v) = projection::forward(lng, LatLng::clamp_lat(lat));
    Some(Coord { x: u, y: v })
}

fn project_ring(ring: &[Position]) -> LineString<f64> {
    LineString::new(ring.iter().filter_map(|p| project(p)).collect())
}

fn project_polygon(rings: &[Vec<Position>]) -> Option<Polygon<f64>> {
    let (exterior, holes) = rings.split_first()?;
    let exterior = project_ring(exterior);
    if exterior.0.len() < 3 {
        return None;
    }
    let holes = holes
        .iter()
        .map(|ring| project_ring(ring))
        .filter(|ring| ring.0.len() >= 3)
        .collect();
    Some(Polygon::new(exterior, holes))
}

/// Triangulated polygon in the normalized square
#[derive(Debug, Clone, PartialEq)]
pub struct FillMesh {
    vertices: Vec<Coord<f64>>,
    indices: Vec<u32>,
    min: Coord<f64>,
    max: Coord<f64>,
}

impl FillMesh {
    /// Ear-cuts the polygon; holes are respected
    fn from_polygon(polygon: &Polygon<f64>) -> Option<Self> {
        let rect = polygon.bounding_rect()?;
        let raw = polygon.earcut_triangles_raw();
        if raw.triangle_indices.is_empty() {
            return None;
        }
        let vertices = raw
            .vertices
            .chunks_exact(2)
            .map(|xy| Coord { x: xy[0], y: xy[1] })
            .collect();
        let indices = raw.triangle_indices.iter().map(|&i| i as u32).collect();
        Some(Self {
            vertices,
            indices,
            min: rect.min(),
            max: rect.max(),
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Polyline in the normalized square
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<Coord<f64>>,
    min: Coord<f64>,
    max: Coord<f64>,
}

impl Polyline {
    fn from_line(line: LineString<f64>) -> Option<Self> {
        if line.0.len() < 2 {
            return None;
        }
        let rect = line.bounding_rect()?;
        Some(Self {
            points: line.0,
            min: rect.min(),
            max: rect.max(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    position: Coord<f64>,
    pub population: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeometryData {
    Fill(Vec<FillMesh>),
    Lines(Vec<Polyline>),
    Labels(Vec<Label>),
}

impl GeometryData {
    pub fn len(&self) -> usize {
        match self {
            GeometryData::Fill(items) => items.len(),
            GeometryData::Lines(items) => items.len(),
            GeometryData::Labels(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn collect_polygons(geometry: &GeoJsonGeometry, out: &mut Vec<Polygon<f64>>) {
    match geometry {
        GeoJsonGeometry::Polygon { coordinates } => out.extend(project_polygon(coordinates)),
        GeoJsonGeometry::MultiPolygon { coordinates } => {
            out.extend(coordinates.iter().filter_map(|rings| project_polygon(rings)))
        }
        GeoJsonGeometry::GeometryCollection { geometries } => {
            geometries.iter().for_each(|g| collect_polygons(g, out))
        }
        _ => {}
    }
}

/// Lines and polygon rings (country outlines are drawn as borders)
fn collect_lines(geometry: &GeoJsonGeometry, out: &mut Vec<LineString<f64>>) {
    match geometry {
        GeoJsonGeometry::LineString { coordinates } => out.push(project_ring(coordinates)),
        GeoJsonGeometry::MultiLineString { coordinates } | GeoJsonGeometry::Polygon { coordinates } => {
            out.extend(coordinates.iter().map(|line| project_ring(line)))
        }
        GeoJsonGeometry::MultiPolygon { coordinates } => out.extend(
            coordinates
                .iter()
                .flat_map(|rings| rings.iter().map(|ring| project_ring(ring))),
        ),
        GeoJsonGeometry::GeometryCollection { geometries } => {
            geometries.iter().for_each(|g| collect_lines(g, out))
        }
        _ => {}
    }
}

/// Anchor for a label: the point itself, or the centroid of an area
fn label_anchor(geometry: &GeoJsonGeometry) -> Option<Coord<f64>> {
    match geometry {
        GeoJsonGeometry::Point { coordinates } => project(coordinates),
        GeoJsonGeometry::MultiPoint { coordinates } => coordinates.first().and_then(|p| project(p)),
        other => {
            let mut polygons = Vec::new();
            collect_polygons(other, &mut polygons);
            // Largest part keeps labels off small islands
            let largest = polygons.into_iter().max_by(|a, b| {
                let area = |p: &Polygon<f64>| {
                    p.bounding_rect()
                        .map(|r| r.width() * r.height())
                        .unwrap_or(0.0)
                };
                area(a).total_cmp(&area(b))
            })?;
            largest.centroid().map(|c| c.0)
        }
    }
}

fn build_data(kind: LayerKind, features: &[GeoJsonFeature]) -> GeometryData {
    match kind {
        LayerKind::Land | LayerKind::Lakes => {
            let mut polygons = Vec::new();
            for geometry in features.iter().filter_map(|f| f.geometry.as_ref()) {
                collect_polygons(geometry, &mut polygons);
            }
            GeometryData::Fill(polygons.iter().filter_map(FillMesh::from_polygon).collect())
        }
        LayerKind::CountryBorders | LayerKind::SubdivisionBorders => {
            let mut lines = Vec::new();
            for geometry in features.iter().filter_map(|f| f.geometry.as_ref()) {
                collect_lines(geometry, &mut lines);
            }
            GeometryData::Lines(lines.into_iter().filter_map(Polyline::from_line).collect())
        }
        LayerKind::CountryLabels | LayerKind::SubdivisionLabels | LayerKind::PlaceLabels => {
            let mut labels: Vec<Label> = features
                .iter()
                .filter_map(|feature| {
                    Some(Label {
                        text: feature.name()?,
                        position: label_anchor(feature.geometry.as_ref()?)?,
                        population: feature.population(),
                    })
                })
                .collect();
            // Biggest places paint last so they end up on top
            labels.sort_by(|a, b| a.population.total_cmp(&b.population));
            GeometryData::Labels(labels)
        }
    }
}

// --- Styles ------------------------------------------------------------------------------------

pub const OCEAN_COLOR: Rgba = Rgba::rgb(9, 13, 24);

#[derive(Debug, Clone, PartialEq)]
pub enum GeometryStyle {
    Fill { color: Rgba },
    /// Filled with the canvas background
    Carve,
    Line(LineRenderStyle),
    Text(TextRenderStyle),
}

impl GeometryStyle {
    pub fn for_kind(kind: LayerKind) -> Self {
        match kind {
            LayerKind::Land => GeometryStyle::Fill {
                color: Rgba::rgb(27, 36, 54),
            },
            LayerKind::Lakes => GeometryStyle::Carve,
            LayerKind::CountryBorders => GeometryStyle::Line(LineRenderStyle {
                color: Rgba::rgb(78, 94, 124),
                width: 0.8,
            }),
            LayerKind::SubdivisionBorders => GeometryStyle::Line(LineRenderStyle {
                color: Rgba::rgb(58, 70, 94),
                width: 0.5,
            }),
            LayerKind::CountryLabels => GeometryStyle::Text(TextRenderStyle {
                color: Rgba::rgb(170, 180, 200),
                size: 13.0,
                anchor: TextAnchor::Center,
            }),
            LayerKind::SubdivisionLabels => GeometryStyle::Text(TextRenderStyle {
                color: Rgba::rgb(140, 150, 172),
                size: 11.0,
                anchor: TextAnchor::Center,
            }),
            LayerKind::PlaceLabels => GeometryStyle::Text(TextRenderStyle {
                color: Rgba::rgb(200, 206, 220),
                size: 10.0,
                anchor: TextAnchor::LeftCenter,
            }),
        }
    }
}

// --- Layer -------------------------------------------------------------------------------------

/// Population a place needs to be labeled at `zoom`. Halves every
/// `halving_zoom` past the layer threshold; zero from `show_all_zoom` on.
pub fn place_population_cutoff(zoom: f64, threshold: &LayerThreshold, rank: &PlaceRankConfig) -> f64 {
    if zoom >= rank.show_all_zoom {
        return 0.0;
    }
    let steps = ((zoom - threshold.min_zoom) / rank.halving_zoom.max(1e-6)).max(0.0);
    rank.start_population * 0.5f64.powf(steps)
}

pub struct GeometryLayer {
    properties: LayerProperties,
    threshold: LayerThreshold,
    place_rank: Option<PlaceRankConfig>,
    style: GeometryStyle,
    data: GeometryData,
}

impl GeometryLayer {
    /// Creates a new layer from already-projected data
    pub fn new(kind: LayerKind, data: GeometryData, visibility: &LayerVisibilityConfig) -> Self {
        let threshold = match kind {
            LayerKind::Land => visibility.land,
            LayerKind::Lakes => visibility.lakes,
            LayerKind::CountryBorders => visibility.country_borders,
            LayerKind::SubdivisionBorders => visibility.subdivision_borders,
            LayerKind::CountryLabels => visibility.country_labels,
            LayerKind::SubdivisionLabels => visibility.subdivision_labels,
            LayerKind::PlaceLabels => visibility.place_labels,
        };
        Self {
            properties: LayerProperties::new(kind),
            threshold,
            place_rank: (kind == LayerKind::PlaceLabels).then_some(visibility.place_rank),
            style: GeometryStyle::for_kind(kind),
            data,
        }
    }

    /// Parses GeoJSON text into a layer of the given kind
    pub fn from_geojson_str(kind: LayerKind, json: &str, visibility: &LayerVisibilityConfig) -> Result<Self> {
        let (features, skipped) = parse_features(json)?;
        if skipped > 0 {
            log::warn!("{kind}: skipped {skipped} unreadable features");
        }
        let data = build_data(kind, &features);
        if data.is_empty() {
            return Err(MapError::Layer(format!("{kind}: no usable features")));
        }
        Ok(Self::new(kind, data, visibility))
    }

    /// Built-in coarse continents, used when no land file loads
    pub fn fallback_land(visibility: &LayerVisibilityConfig) -> Self {
        Self::new(LayerKind::Land, FALLBACK_LAND.clone(), visibility)
    }

    pub fn data(&self) -> &GeometryData {
        &self.data
    }

    pub fn threshold(&self) -> &LayerThreshold {
        &self.threshold
    }

    fn render_copy(
        &self,
        context: &mut RenderContext,
        view: &LayerView<'_>,
        transform: &ScreenTransform,
        alpha: f64,
    ) -> Result<()> {
        let screen = Bounds::from_viewport(view.size);
        match (&self.data, &self.style) {
            (GeometryData::Fill(meshes), GeometryStyle::Fill { .. } | GeometryStyle::Carve) => {
                let color = match &self.style {
                    GeometryStyle::Fill { color } => *color,
                    _ => view.background,
                }
                .with_opacity(alpha);
                for mesh in meshes {
                    if !screen.intersects(&transform.bounds(mesh.min, mesh.max)) {
                        continue;
                    }
                    let vertices = mesh.vertices.iter().map(|c| transform.apply(*c)).collect();
                    context.render_mesh(vertices, mesh.indices.clone(), color)?;
                }
            }
            (GeometryData::Lines(lines), GeometryStyle::Line(style)) => {
                let style = LineRenderStyle {
                    color: style.color.with_opacity(alpha),
                    width: style.width,
                };
                for line in lines {
                    if !screen.intersects(&transform.bounds(line.min, line.max)) {
                        continue;
                    }
                    let points: Vec<Point> = line.points.iter().map(|c| transform.apply(*c)).collect();
                    context.render_line(&points, &style)?;
                }
            }
            (GeometryData::Labels(labels), GeometryStyle::Text(style)) => {
                let style = TextRenderStyle {
                    color: style.color.with_opacity(alpha),
                    ..style.clone()
                };
                let cutoff = self
                    .place_rank
                    .map(|rank| place_population_cutoff(view.camera.zoom, &self.threshold, &rank))
                    .unwrap_or(0.0);
                for label in labels.iter().filter(|l| l.population >= cutoff) {
                    let position = transform.apply(label.position);
                    if screen.intersects(&Bounds::new(position, position)) {
                        context.render_text(&position, &label.text, &style)?;
                    }
                }
            }
            _ => {
                return Err(MapError::Layer(format!(
                    "{}: style does not match geometry",
                    self.properties.kind
                )))
            }
        }
        Ok(())
    }
}

impl MapLayer for GeometryLayer {
    fn properties(&self) -> &LayerProperties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut LayerProperties {
        &mut self.properties
    }

    fn render(&self, context: &mut RenderContext, view: &LayerView<'_>) -> Result<()> {
        let Some(alpha) = self.threshold.alpha_at(view.camera.zoom) else {
            return Ok(());
        };
        let alpha = alpha * self.properties.opacity as f64;
        if alpha <= 0.0 {
            return Ok(());
        }
        for &wrap in view.wrap_offsets {
            let transform = ScreenTransform::new(view.camera, view.size, wrap);
            self.render_copy(context, view, &transform, alpha)?;
        }
        Ok(())
    }
}

/// Normalized square to screen pixels for one wrap copy
struct ScreenTransform {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl ScreenTransform {
    fn new(camera: &Camera, size: &ViewportSize, wrap: i32) -> Self {
        // sx = w/2 + ((u - 0.5 + wrap) * w - cam.x) * zoom
        let scale = size.width * camera.zoom;
        Self {
            scale,
            offset_x: size.width / 2.0 + ((wrap as f64 - 0.5) * size.width - camera.x) * camera.zoom,
            offset_y: size.height / 2.0 + (-0.5 * size.width - camera.y) * camera.zoom,
        }
    }

    fn apply(&self, c: Coord<f64>) -> Point {
        Point::new(self.offset_x + c.x * self.scale, self.offset_y + c.y * self.scale)
    }

    fn bounds(&self, min: Coord<f64>, max: Coord<f64>) -> Bounds {
        Bounds::new(self.apply(min), self.apply(max))
    }
}

// --- Loading -----------------------------------------------------------------------------------

/// Outcome of loading the geometry directory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerLoadReport {
    pub loaded: Vec<LayerKind>,
    pub failed: Vec<(LayerKind, String)>,
    pub used_fallback_land: bool,
}

/// File expected for each layer inside the geometry directory
pub fn file_name(kind: LayerKind) -> &'static str {
    match kind {
        LayerKind::Land => "land.geojson",
        LayerKind::Lakes => "lakes.geojson",
        LayerKind::CountryBorders => "countries.geojson",
        LayerKind::SubdivisionBorders => "subdivisions.geojson",
        LayerKind::CountryLabels => "country_labels.geojson",
        LayerKind::SubdivisionLabels => "subdivision_labels.geojson",
        LayerKind::PlaceLabels => "places.geojson",
    }
}

pub fn load_layer_file(kind: LayerKind, path: &Path, visibility: &LayerVisibilityConfig) -> Result<GeometryLayer> {
    let json = std::fs::read_to_string(path)?;
    GeometryLayer::from_geojson_str(kind, &json, visibility)
}

/// Loads every layer it can from `dir`. Failures are logged and reported,
/// never fatal; land falls back to the built-in outline.
pub fn load_geometry_dir(dir: Option<&Path>, visibility: &LayerVisibilityConfig) -> (Vec<GeometryLayer>, LayerLoadReport) {
    let mut layers = Vec::new();
    let mut report = LayerLoadReport::default();

    for kind in LayerKind::ALL {
        let result = match dir {
            Some(dir) => load_layer_file(kind, &dir.join(file_name(kind)), visibility),
            None => Err(MapError::Layer("no geometry directory configured".to_string())),
        };
        match result {
            Ok(layer) => {
                log::info!("loaded {kind} layer ({} items)", layer.data().len());
                report.loaded.push(kind);
                layers.push(layer);
            }
            Err(err) => {
                log::warn!("{kind} layer unavailable: {err}");
                report.failed.push((kind, err.to_string()));
                if kind == LayerKind::Land {
                    layers.push(GeometryLayer::fallback_land(visibility));
                    report.used_fallback_land = true;
                }
            }
        }
    }
    (layers, report)
}

/// Very coarse continent outlines as (lng, lat)
const FALLBACK_OUTLINES: &[&[(f64, f64)]] = &[
    // North America
    &[
        (-168.0, 66.0), (-156.0, 71.0), (-128.0, 70.0), (-95.0, 72.0), (-80.0, 73.0),
        (-62.0, 66.0), (-55.0, 52.0), (-66.0, 45.0), (-76.0, 35.0), (-81.0, 25.0),
        (-83.0, 30.0), (-90.0, 29.0), (-97.0, 26.0), (-97.0, 22.0), (-87.0, 21.0),
        (-83.0, 10.0), (-78.0, 8.0), (-86.0, 12.0), (-95.0, 16.0), (-105.0, 20.0),
        (-112.0, 30.0), (-117.0, 33.0), (-124.0, 40.0), (-125.0, 49.0), (-135.0, 58.0),
        (-150.0, 60.0), (-165.0, 60.0), (-168.0, 66.0),
    ],
    // South America
    &[
        (-78.0, 8.0), (-72.0, 12.0), (-60.0, 10.0), (-50.0, 0.0), (-35.0, -6.0),
        (-39.0, -15.0), (-48.0, -26.0), (-58.0, -35.0), (-65.0, -42.0), (-68.0, -52.0),
        (-72.0, -54.0), (-75.0, -45.0), (-73.0, -35.0), (-71.0, -18.0), (-76.0, -14.0),
        (-81.0, -5.0), (-80.0, 1.0), (-78.0, 8.0),
    ],
    // Eurasia
    &[
        (-10.0, 36.0), (-9.0, 43.0), (-2.0, 44.0), (-5.0, 48.0), (2.0, 51.0),
        (8.0, 54.0), (10.0, 58.0), (5.0, 62.0), (15.0, 69.0), (28.0, 71.0),
        (40.0, 67.0), (60.0, 69.0), (80.0, 73.0), (105.0, 78.0), (140.0, 72.0),
        (179.0, 69.0), (179.0, 65.0), (160.0, 60.0), (142.0, 59.0), (135.0, 54.0),
        (140.0, 47.0), (130.0, 42.0), (122.0, 40.0), (121.0, 31.0), (117.0, 24.0),
        (108.0, 21.0), (106.0, 10.0), (100.0, 13.0), (101.0, 3.0), (98.0, 8.0),
        (92.0, 21.0), (80.0, 15.0), (77.0, 8.0), (72.0, 20.0), (67.0, 25.0),
        (58.0, 23.0), (52.0, 17.0), (44.0, 12.0), (43.0, 17.0), (35.0, 28.0),
        (34.0, 31.0), (36.0, 36.0), (27.0, 37.0), (26.0, 40.0), (22.0, 40.0),
        (19.0, 42.0), (13.0, 45.0), (18.0, 40.0), (16.0, 38.0), (12.0, 42.0),
        (8.0, 44.0), (3.0, 43.0), (-1.0, 37.0), (-5.0, 36.0), (-10.0, 36.0),
    ],
    // Africa
    &[
        (-17.0, 21.0), (-6.0, 35.0), (10.0, 37.0), (20.0, 31.0), (32.0, 31.0),
        (43.0, 12.0), (51.0, 12.0), (40.0, -2.0), (40.0, -15.0), (35.0, -24.0),
        (27.0, -34.0), (18.0, -34.0), (12.0, -18.0), (9.0, -1.0), (6.0, 4.0),
        (-8.0, 4.0), (-17.0, 15.0), (-17.0, 21.0),
    ],
    // Australia
    &[
        (114.0, -22.0), (122.0, -18.0), (130.0, -12.0), (137.0, -12.0), (142.0, -11.0),
        (146.0, -19.0), (153.0, -25.0), (150.0, -37.0), (141.0, -38.0), (131.0, -31.0),
        (116.0, -35.0), (114.0, -22.0),
    ],
    // Greenland
    &[
        (-73.0, 78.0), (-60.0, 82.0), (-30.0, 83.0), (-20.0, 75.0), (-22.0, 70.0),
        (-42.0, 60.0), (-52.0, 64.0), (-58.0, 75.0), (-73.0, 78.0),
    ],
    // Great Britain
    &[
        (-5.0, 50.0), (1.0, 51.0), (1.0, 53.0), (-2.0, 56.0), (-3.0, 58.5),
        (-6.0, 58.0), (-5.0, 55.0), (-3.0, 54.0), (-5.0, 52.0), (-5.0, 50.0),
    ],
    // Antarctica
    &[
        (-180.0, -85.0), (180.0, -85.0), (180.0, -72.0), (90.0, -66.0), (0.0, -70.0),
        (-60.0, -64.0), (-90.0, -72.0), (-180.0, -78.0), (-180.0, -85.0),
    ],
];

static FALLBACK_LAND: Lazy<GeometryData> = Lazy::new(|| {
    let meshes = FALLBACK_OUTLINES
        .iter()
        .filter_map(|outline| {
            let ring: Vec<Position> = outline.iter().map(|&(lng, lat)| vec![lng, lat]).collect();
            project_polygon(&[ring])
        })
        .filter_map(|polygon| FillMesh::from_polygon(&polygon))
        .collect();
    GeometryData::Fill(meshes)
});
