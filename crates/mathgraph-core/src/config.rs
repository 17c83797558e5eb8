use crate::project::ProjectOptions;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Renderer options. Keys are camelCase and unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// Pixels per `ex` when sizing a node from its image.
    pub ex_scaling_factor: f64,
    /// Lower bound (and default) for node width and height, in pixels.
    pub min_node_size: f64,
    /// Put every eligible apply node into its first-child form up front.
    pub apply_form: bool,
    /// No drawing surface: layout and tooltips are skipped.
    pub headless: bool,
    pub image_template: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ex_scaling_factor: 12.0,
            min_node_size: 30.0,
            apply_form: false,
            headless: false,
            image_template: None,
        }
    }
}

impl RenderConfig {
    pub fn headless() -> Self {
        Self {
            headless: true,
            ..Self::default()
        }
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let cfg: Self = serde_json::from_value(value)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.ex_scaling_factor.is_finite() && self.ex_scaling_factor > 0.0) {
            return Err(Error::InvalidConfig {
                message: format!(
                    "exScalingFactor must be a positive number, got {}",
                    self.ex_scaling_factor
                ),
            });
        }
        if !(self.min_node_size.is_finite() && self.min_node_size >= 0.0) {
            return Err(Error::InvalidConfig {
                message: format!(
                    "minNodeSize must be a non-negative number, got {}",
                    self.min_node_size
                ),
            });
        }
        Ok(())
    }

    pub fn project_options(&self) -> ProjectOptions {
        ProjectOptions {
            image_template: self.image_template.clone(),
        }
    }
}
