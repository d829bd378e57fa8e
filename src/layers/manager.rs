use crate::{
    layers::base::{LayerView, MapLayer},
    prelude::HashMap,
    rendering::context::RenderContext,
};

/// Manages layers for the map, handling ordering and rendering
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<String, Box<dyn MapLayer>>,
    /// Ordered list of layer IDs for rendering (sorted by z-index)
    render_order: Vec<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
        }
    }

    /// Adds a layer, replacing any layer with the same id
    pub fn add_layer(&mut self, layer: Box<dyn MapLayer>) {
        let layer_id = layer.id().to_string();
        let z_index = layer.z_index();

        self.render_order.retain(|id| *id != layer_id);
        self.layers.insert(layer_id.clone(), layer);

        // Insert in sorted order by z-index
        let insert_pos = self
            .render_order
            .iter()
            .position(|id| {
                self.layers
                    .get(id)
                    .map(|l| l.z_index() > z_index)
                    .unwrap_or(false)
            })
            .unwrap_or(self.render_order.len());

        self.render_order.insert(insert_pos, layer_id);
    }

    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn MapLayer>> {
        self.render_order.retain(|id| id != layer_id);
        self.layers.remove(layer_id)
    }

    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn MapLayer> {
        self.layers.get(layer_id).map(|l| l.as_ref())
    }

    /// Applies a function to a specific layer mutably
    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn MapLayer) -> R,
    {
        self.layers.get_mut(layer_id).map(|layer| f(layer.as_mut()))
    }

    /// Layer ids in render order
    pub fn render_order(&self) -> &[String] {
        &self.render_order
    }

    /// Renders visible layers in order. A failing layer is logged and
    /// skipped; returns how many layers rendered.
    pub fn render(&self, context: &mut RenderContext, view: &LayerView<'_>) -> usize {
        let mut rendered = 0;
        for layer_id in &self.render_order {
            let Some(layer) = self.layers.get(layer_id) else {
                continue;
            };
            if !layer.is_visible() {
                continue;
            }
            match layer.render(context, view) {
                Ok(()) => rendered += 1,
                Err(err) => log::warn!("layer {layer_id} failed to render: {err}"),
            }
        }
        rendered
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}
