//! Node sizing from rendered formula images.
//!
//! Formula SVGs state their size in `ex`; a node takes `max(value × exScalingFactor,
//! minNodeSize)` per dimension. Unit-less and `px` values are already pixels and only get the
//! floor.

use crate::{Error, Result};
use mathgraph_core::RenderConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Ex,
    Px,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Length {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (number, unit) = if let Some(v) = raw.strip_suffix("ex") {
            (v, LengthUnit::Ex)
        } else if let Some(v) = raw.strip_suffix("px") {
            (v, LengthUnit::Px)
        } else {
            (raw, LengthUnit::Px)
        };
        let value: f64 = number.trim().parse().ok()?;
        value.is_finite().then_some(Self { value, unit })
    }

    /// Effective node dimension in pixels.
    pub fn to_node_px(self, config: &RenderConfig) -> f64 {
        let px = match self.unit {
            LengthUnit::Ex => self.value * config.ex_scaling_factor,
            LengthUnit::Px => self.value,
        };
        px.max(config.min_node_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgSize {
    pub width: Length,
    pub height: Length,
}

/// Reads `width`/`height` from the root `<svg>` element.
pub fn parse_svg_size(svg: &str) -> Result<SvgSize> {
    let doc = roxmltree::Document::parse(svg)?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(Error::InvalidSvg {
            message: format!("expected <svg> root, found <{}>", root.tag_name().name()),
        });
    }
    let dim = |name: &str| -> Result<Length> {
        let raw = root.attribute(name).ok_or_else(|| Error::InvalidSvg {
            message: format!("missing {name} attribute"),
        })?;
        Length::parse(raw).ok_or_else(|| Error::InvalidSvg {
            message: format!("unsupported {name}: {raw}"),
        })
    };
    Ok(SvgSize {
        width: dim("width")?,
        height: dim("height")?,
    })
}
