use anyhow::{Result, bail};
use plotters::style::RGBColor;

/// Named colour scale sampled by linear interpolation between anchors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Colormap {
    name: &'static str,
    anchors: &'static [(u8, u8, u8)],
}

const COOLWARM: &[(u8, u8, u8)] = &[
    (59, 76, 192),
    (124, 159, 249),
    (192, 212, 245),
    (242, 203, 183),
    (238, 132, 104),
    (180, 4, 38),
];

const VIRIDIS: &[(u8, u8, u8)] = &[
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

const PLASMA: &[(u8, u8, u8)] = &[
    (13, 8, 135),
    (126, 3, 168),
    (204, 71, 120),
    (248, 149, 64),
    (240, 249, 33),
];

const MAGMA: &[(u8, u8, u8)] = &[
    (0, 0, 4),
    (81, 18, 124),
    (183, 55, 121),
    (252, 137, 97),
    (252, 253, 191),
];

const JET: &[(u8, u8, u8)] = &[
    (0, 0, 128),
    (0, 0, 255),
    (0, 255, 255),
    (255, 255, 0),
    (255, 0, 0),
    (128, 0, 0),
];

const GREYS: &[(u8, u8, u8)] = &[(255, 255, 255), (0, 0, 0)];

const BLUES: &[(u8, u8, u8)] = &[(247, 251, 255), (107, 174, 214), (8, 48, 107)];

const COLORMAPS: [Colormap; 7] = [
    Colormap::new("coolwarm", COOLWARM),
    Colormap::new("viridis", VIRIDIS),
    Colormap::new("plasma", PLASMA),
    Colormap::new("magma", MAGMA),
    Colormap::new("jet", JET),
    Colormap::new("greys", GREYS),
    Colormap::new("blues", BLUES),
];

impl Colormap {
    const fn new(name: &'static str, anchors: &'static [(u8, u8, u8)]) -> Self {
        Self { name, anchors }
    }

    /// Resolve a colour scale by name, ignoring case.
    pub fn from_name(name: &str) -> Result<Self> {
        match COLORMAPS
            .iter()
            .find(|cmap| cmap.name.eq_ignore_ascii_case(name))
        {
            Some(cmap) => Ok(*cmap),
            None => bail!("unknown colormap {name:?} (known colormaps: {:?})", names()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Colour at `t`, clamped to `[0, 1]`.
    pub fn sample(&self, t: f64) -> RGBColor {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let n_segs = self.anchors.len() - 1;
        let pos = t * n_segs as f64;
        let i_seg = (pos as usize).min(n_segs - 1);
        let frac = pos - i_seg as f64;

        let (r0, g0, b0) = self.anchors[i_seg];
        let (r1, g1, b1) = self.anchors[i_seg + 1];
        RGBColor(lerp(r0, r1, frac), lerp(g0, g1, frac), lerp(b0, b1, frac))
    }

    /// `n` colours evenly spread over the whole scale.
    pub fn colors(&self, n: usize) -> Vec<RGBColor> {
        match n {
            0 => Vec::new(),
            1 => vec![self.sample(0.0)],
            _ => (0..n)
                .map(|i| self.sample(i as f64 / (n - 1) as f64))
                .collect(),
        }
    }
}

pub fn names() -> Vec<&'static str> {
    COLORMAPS.iter().map(|cmap| cmap.name).collect()
}

fn lerp(a: u8, b: u8, frac: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * frac).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let cmap = Colormap::from_name("CoolWarm").unwrap();
        assert_eq!(cmap.name(), "coolwarm");
    }

    #[test]
    fn unknown_name_is_an_error() {
        let error = Colormap::from_name("rainbow-sparkles").unwrap_err();
        let msg = error.to_string();
        assert!(msg.contains("rainbow-sparkles"), "{msg}");
        assert!(msg.contains("viridis"), "{msg}");
    }

    #[test]
    fn endpoints_match_anchors() {
        let cmap = Colormap::from_name("greys").unwrap();
        assert_eq!(cmap.sample(0.0), RGBColor(255, 255, 255));
        assert_eq!(cmap.sample(1.0), RGBColor(0, 0, 0));
        assert_eq!(cmap.sample(0.5), RGBColor(128, 128, 128));
        assert_eq!(cmap.sample(7.0), RGBColor(0, 0, 0));
    }

    #[test]
    fn colors_spread_over_scale() {
        let cmap = Colormap::from_name("coolwarm").unwrap();
        let colors = cmap.colors(8);
        assert_eq!(colors.len(), 8);
        assert_eq!(colors[0], RGBColor(59, 76, 192));
        assert_eq!(colors[7], RGBColor(180, 4, 38));
        assert!(cmap.colors(0).is_empty());
    }
}
