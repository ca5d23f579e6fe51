//! Inline image stage
//!
//! Replaces `![alt](path){.inline ...}` markers with embedded image data. Relative paths
//! resolve against [`ImageSettings::base_dir`].

use crate::recipe::images::embed_images;
use crate::recipe::settings::ImageSettings;
use crate::recipe::transforms::{Lines, Runnable, TransformError};

pub struct EmbedImages {
    settings: ImageSettings,
}

impl EmbedImages {
    pub const NAME: &'static str = "inline-images";

    pub fn new() -> Self {
        Self::with_settings(ImageSettings::default())
    }

    pub fn with_settings(settings: ImageSettings) -> Self {
        EmbedImages { settings }
    }
}

impl Default for EmbedImages {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<Lines, Lines> for EmbedImages {
    fn run(&self, input: Lines) -> Result<Lines, TransformError> {
        embed_images(&input, &self.settings).map_err(TransformError::stage(Self::NAME))
    }
}
