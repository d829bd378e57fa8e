use crate::{
    core::viewport::{Camera, ViewportSize},
    rendering::context::{RenderContext, Rgba},
    Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Land,
    Lakes,
    CountryBorders,
    SubdivisionBorders,
    CountryLabels,
    SubdivisionLabels,
    PlaceLabels,
}

impl LayerKind {
    pub const ALL: [LayerKind; 7] = [
        LayerKind::Land,
        LayerKind::Lakes,
        LayerKind::CountryBorders,
        LayerKind::SubdivisionBorders,
        LayerKind::CountryLabels,
        LayerKind::SubdivisionLabels,
        LayerKind::PlaceLabels,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            LayerKind::Land => "land",
            LayerKind::Lakes => "lakes",
            LayerKind::CountryBorders => "country-borders",
            LayerKind::SubdivisionBorders => "subdivision-borders",
            LayerKind::CountryLabels => "country-labels",
            LayerKind::SubdivisionLabels => "subdivision-labels",
            LayerKind::PlaceLabels => "place-labels",
        }
    }

    /// Paint order; higher draws later
    pub fn default_z_index(&self) -> i32 {
        match self {
            LayerKind::Land => 0,
            LayerKind::Lakes => 10,
            LayerKind::SubdivisionBorders => 20,
            LayerKind::CountryBorders => 30,
            LayerKind::SubdivisionLabels => 40,
            LayerKind::PlaceLabels => 50,
            LayerKind::CountryLabels => 60,
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(
            self,
            LayerKind::CountryLabels | LayerKind::SubdivisionLabels | LayerKind::PlaceLabels
        )
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerProperties {
    pub id: String,
    pub kind: LayerKind,
    pub z_index: i32,
    pub opacity: f32,
    pub visible: bool,
}

impl LayerProperties {
    pub fn new(kind: LayerKind) -> Self {
        Self {
            id: kind.id().to_string(),
            kind,
            z_index: kind.default_z_index(),
            opacity: 1.0,
            visible: true,
        }
    }
}

/// Per-frame view a layer renders against
#[derive(Debug, Clone, Copy)]
pub struct LayerView<'a> {
    pub camera: &'a Camera,
    pub size: &'a ViewportSize,
    pub wrap_offsets: &'a [i32],
    /// Canvas clear color, used to carve lakes out of land
    pub background: Rgba,
}

pub trait MapLayer: Send {
    fn properties(&self) -> &LayerProperties;

    fn properties_mut(&mut self) -> &mut LayerProperties;

    /// Draws one copy per wrap offset in `view`
    fn render(&self, context: &mut RenderContext, view: &LayerView<'_>) -> Result<()>;

    fn id(&self) -> &str {
        &self.properties().id
    }

    fn kind(&self) -> LayerKind {
        self.properties().kind
    }

    fn z_index(&self) -> i32 {
        self.properties().z_index
    }

    fn opacity(&self) -> f32 {
        self.properties().opacity
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.properties_mut().opacity = opacity.clamp(0.0, 1.0);
    }

    fn is_visible(&self) -> bool {
        self.properties().visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.properties_mut().visible = visible;
    }
}
