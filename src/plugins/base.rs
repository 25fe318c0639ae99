use crate::{traits::MapHost, Result};

/// Something that owns sources and layers on the map style.
///
/// The style can reload at any time, dropping everything that was added to it,
/// so plugins install on every style load and again on idle in case the first
/// attempt raced the style.
pub trait PluginTrait {
    fn name(&self) -> &str;

    /// Adds the plugin's sources and layers. Must be safe to call repeatedly.
    fn on_style_loaded(&mut self, _map: &mut dyn MapHost) -> Result<()> {
        Ok(())
    }

    fn on_idle(&mut self, map: &mut dyn MapHost) -> Result<()> {
        self.on_style_loaded(map)
    }

    /// Removes the plugin's transient visuals
    fn on_remove(&mut self, _map: &mut dyn MapHost) -> Result<()> {
        Ok(())
    }
}
