use eframe::egui::Color32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Cosmos,
    Nebula,
    Ember,
}

impl Theme {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cosmos" => Some(Self::Cosmos),
            "nebula" => Some(Self::Nebula),
            "ember" => Some(Self::Ember),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Cosmos => "Cosmos",
            Self::Nebula => "Nebula",
            Self::Ember => "Ember",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Cosmos => Self::Nebula,
            Self::Nebula => Self::Ember,
            Self::Ember => Self::Cosmos,
        }
    }

    pub fn background(self) -> Color32 {
        match self {
            Self::Cosmos => Color32::from_rgb(8, 10, 22),
            Self::Nebula => Color32::from_rgb(16, 8, 26),
            Self::Ember => Color32::from_rgb(20, 10, 8),
        }
    }

    pub fn star_color(self) -> Color32 {
        match self {
            Self::Cosmos => Color32::from_rgb(198, 208, 255),
            Self::Nebula => Color32::from_rgb(228, 198, 255),
            Self::Ember => Color32::from_rgb(255, 214, 186),
        }
    }

    pub fn accent(self) -> Color32 {
        match self {
            Self::Cosmos => Color32::from_rgb(245, 206, 93),
            Self::Nebula => Color32::from_rgb(136, 255, 214),
            Self::Ember => Color32::from_rgb(255, 236, 140),
        }
    }

    pub fn search_highlight(self) -> Color32 {
        match self {
            Self::Cosmos => Color32::from_rgb(103, 196, 255),
            Self::Nebula => Color32::from_rgb(255, 150, 220),
            Self::Ember => Color32::from_rgb(140, 220, 255),
        }
    }

    pub fn connection_color(self) -> Color32 {
        match self {
            Self::Cosmos => Color32::from_rgb(94, 110, 160),
            Self::Nebula => Color32::from_rgb(130, 96, 168),
            Self::Ember => Color32::from_rgb(160, 104, 80),
        }
    }

    /// Node fill keyed by depth; rings deeper than the palette cycle.
    pub fn depth_color(self, depth: u32) -> Color32 {
        let palette: [Color32; 6] = match self {
            Self::Cosmos => [
                Color32::from_rgb(255, 211, 110),
                Color32::from_rgb(122, 162, 255),
                Color32::from_rgb(97, 214, 183),
                Color32::from_rgb(214, 134, 255),
                Color32::from_rgb(255, 138, 128),
                Color32::from_rgb(158, 206, 255),
            ],
            Self::Nebula => [
                Color32::from_rgb(255, 171, 222),
                Color32::from_rgb(171, 146, 255),
                Color32::from_rgb(120, 220, 232),
                Color32::from_rgb(255, 206, 120),
                Color32::from_rgb(146, 255, 172),
                Color32::from_rgb(222, 160, 255),
            ],
            Self::Ember => [
                Color32::from_rgb(255, 196, 96),
                Color32::from_rgb(255, 136, 84),
                Color32::from_rgb(240, 98, 96),
                Color32::from_rgb(255, 222, 148),
                Color32::from_rgb(214, 120, 158),
                Color32::from_rgb(255, 168, 120),
            ],
        };

        palette[(depth as usize) % palette.len()]
    }
}
