mod controls;
mod minimap;
mod overlay;

pub(in crate::app) use overlay::OverlayAnchor;
