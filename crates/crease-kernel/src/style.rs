//! Stroke colors and dash patterns.

use crease_kernel_topo::{Edge, EdgeKind, FoldDirection};
use serde::{Deserialize, Serialize};

/// RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Opacity.
    pub a: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    /// Color from components.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Where a drawing ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Medium {
    /// Interactive display.
    Screen,
    /// Laser cutter or printer output: grayscale, fine dashes.
    Laser,
}

/// How to stroke one edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// Stroke color.
    pub color: Color,
    /// Dash and gap lengths, or `None` for a solid line.
    pub dash: Option<[f64; 2]>,
}

/// Edge colors by kind and fold direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Mountain folds.
    pub hill: Color,
    /// Valley folds.
    pub valley: Color,
    /// Folds with no direction yet.
    pub fold: Color,
    /// Cuts.
    pub cut: Color,
    /// Glue tabs.
    pub tab: Color,
    /// Every stroke on the laser medium.
    pub laser: Color,
    /// Fold dashes on screen.
    pub screen_dash: [f64; 2],
    /// Fold dashes on the laser medium.
    pub laser_dash: [f64; 2],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            hill: Color::rgba(0.0, 0.0, 1.0, 0.5),
            valley: Color::rgba(0.0, 1.0, 0.0, 0.5),
            fold: Color::rgba(1.0, 0.0, 0.0, 0.5),
            cut: Color::rgba(0.0, 0.0, 0.0, 0.5),
            tab: Color::rgba(0.0, 1.0, 1.0, 0.5),
            laser: Color::BLACK,
            screen_dash: [10.0, 5.0],
            laser_dash: [1.0, 10.0],
        }
    }
}

impl Palette {
    /// Color for an edge kind and fold direction.
    pub fn color(&self, kind: EdgeKind, direction: FoldDirection, medium: Medium) -> Color {
        if medium == Medium::Laser {
            return self.laser;
        }
        match (kind, direction) {
            (EdgeKind::Fold, FoldDirection::Hill) => self.hill,
            (EdgeKind::Fold, FoldDirection::Valley) => self.valley,
            (EdgeKind::Fold, FoldDirection::Unknown) => self.fold,
            (EdgeKind::Tab, _) => self.tab,
            (EdgeKind::Cut, _) => self.cut,
        }
    }

    /// Full stroke style; folds are dashed.
    pub fn stroke(&self, kind: EdgeKind, direction: FoldDirection, medium: Medium) -> StrokeStyle {
        let dash = (kind == EdgeKind::Fold).then_some(match medium {
            Medium::Screen => self.screen_dash,
            Medium::Laser => self.laser_dash,
        });
        StrokeStyle {
            color: self.color(kind, direction, medium),
            dash,
        }
    }

    /// Stroke style for an edge.
    pub fn edge_stroke(&self, edge: &Edge, medium: Medium) -> StrokeStyle {
        self.stroke(edge.kind, edge.fold_direction, medium)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_colors_follow_direction() {
        let palette = Palette::default();
        let hill = palette.stroke(EdgeKind::Fold, FoldDirection::Hill, Medium::Screen);
        assert_eq!(hill.color, palette.hill);
        assert_eq!(hill.dash, Some([10.0, 5.0]));
        assert_eq!(
            palette.color(EdgeKind::Fold, FoldDirection::Valley, Medium::Screen),
            palette.valley
        );
        let cut = palette.stroke(EdgeKind::Cut, FoldDirection::Hill, Medium::Screen);
        assert_eq!(cut.color, palette.cut);
        assert_eq!(cut.dash, None);
    }

    #[test]
    fn test_laser_is_black_with_fine_dashes() {
        let palette = Palette::default();
        for kind in [EdgeKind::Fold, EdgeKind::Cut, EdgeKind::Tab] {
            let s = palette.stroke(kind, FoldDirection::Unknown, Medium::Laser);
            assert_eq!(s.color, Color::BLACK);
        }
        let fold = palette.stroke(EdgeKind::Fold, FoldDirection::Unknown, Medium::Laser);
        assert_eq!(fold.dash, Some([1.0, 10.0]));
    }
}
