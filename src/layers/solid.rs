use crate::config::model::SolidLayer;
use crate::foundation::error::LiveryResult;
use crate::layers::LayerContext;
use crate::raster::layer::Layer;

pub fn build(cfg: &SolidLayer, ctx: &LayerContext<'_>) -> LiveryResult<Layer> {
    Ok(Layer::from_color(
        ctx.size,
        cfg.color,
        cfg.spec.map(|s| s.0),
    ))
}
