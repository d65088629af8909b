//! Grid geometry: world-pixel ↔ cell conversion for square and hex layouts.
//!
//! A [`GridConfig`] describes where the grid sits on the map and how each
//! cell is shaped. Cells are identified by offset coordinates ([`CellKey`]).
//! Hex layouts go through axial/cube coordinates so that points on a cell
//! boundary resolve to a single, deterministic cell.
//!
//! The aspect ratio only ever stretches the x axis. Every function here reads
//! the same `ratio` field so that revealed holes and grid lines line up.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::camera::{Point, clamp_finite};
use crate::consts::{
    DEFAULT_CELL_SIZE, DEFAULT_GRID_OPACITY, MAX_ASPECT_RATIO, MAX_CELL_SIZE, MIN_ASPECT_RATIO, MIN_CELL_SIZE,
    SQRT_3,
};

/// Cell layout of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridKind {
    /// Axis-aligned squares.
    Square,
    /// Hexes with a vertex pointing up; odd rows are shifted right.
    #[default]
    Pointy,
    /// Hexes with a flat top edge; odd columns are shifted down.
    Flat,
}

impl GridKind {
    #[must_use]
    pub fn is_hex(self) -> bool {
        matches!(self, Self::Pointy | Self::Flat)
    }
}

/// Identity of one grid cell in offset coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CellKey {
    pub col: i64,
    pub row: i64,
}

impl CellKey {
    #[must_use]
    pub fn new(col: i64, row: i64) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.col, self.row)
    }
}

/// Error returned when a string is not of the form `"col,row"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cell key {0:?}: expected \"col,row\"")]
pub struct CellKeyParseError(pub String);

impl FromStr for CellKey {
    type Err = CellKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CellKeyParseError(s.to_owned());
        let (col, row) = s.split_once(',').ok_or_else(err)?;
        let col = col.trim().parse::<i64>().map_err(|_| err())?;
        let row = row.trim().parse::<i64>().map_err(|_| err())?;
        Ok(Self { col, row })
    }
}

impl From<CellKey> for String {
    fn from(key: CellKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for CellKey {
    type Error = CellKeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Closed outline of one cell in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellOutline {
    /// Axis-aligned rectangle; `x`/`y` is the top-left corner.
    Rect { x: f64, y: f64, width: f64, height: f64 },
    /// Hexagon vertices in drawing order.
    Hex([Point; 6]),
}

/// Grid geometry and appearance.
///
/// Field names match the persisted project format (`type`, `size`, `ratio`,
/// `x`, `y`, `opacity`).
///
/// Decoding never fails on a field's value: an unknown `type` becomes the
/// default layout and a non-numeric number becomes NaN, which
/// [`GridConfig::sanitized`] replaces with the default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Cell layout.
    #[serde(rename = "type", deserialize_with = "lenient_kind")]
    pub kind: GridKind,
    /// Cell radius in world pixels (half the square side, hex circumradius).
    #[serde(deserialize_with = "lenient_f64")]
    pub size: f64,
    /// Horizontal stretch applied to every cell.
    #[serde(deserialize_with = "lenient_f64")]
    pub ratio: f64,
    /// World x of the center of cell `(0, 0)`.
    #[serde(deserialize_with = "lenient_f64")]
    pub x: f64,
    /// World y of the center of cell `(0, 0)`.
    #[serde(deserialize_with = "lenient_f64")]
    pub y: f64,
    /// Grid line opacity in play mode.
    #[serde(deserialize_with = "lenient_f64")]
    pub opacity: f64,
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    if let Some(v) = value.as_f64() {
        return Ok(v);
    }
    tracing::warn!(%value, "non-numeric grid field; using default");
    Ok(f64::NAN)
}

fn lenient_kind<'de, D: Deserializer<'de>>(deserializer: D) -> Result<GridKind, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    match serde_json::from_value(value.clone()) {
        Ok(kind) => Ok(kind),
        Err(_) => {
            tracing::warn!(%value, "unknown grid type; using default");
            Ok(GridKind::default())
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            kind: GridKind::Pointy,
            size: DEFAULT_CELL_SIZE,
            ratio: 1.0,
            x: 0.0,
            y: 0.0,
            opacity: DEFAULT_GRID_OPACITY,
        }
    }
}

impl GridConfig {
    // --- Clamped setters ---

    /// Set the cell size, clamped to [10, 300]. Non-finite input is ignored.
    pub fn set_size(&mut self, size: f64) {
        self.size = clamp_finite(size, self.size, MIN_CELL_SIZE, MAX_CELL_SIZE);
    }

    /// Set the aspect ratio, clamped to [0.1, 5.0]. Non-finite input is ignored.
    pub fn set_ratio(&mut self, ratio: f64) {
        self.ratio = clamp_finite(ratio, self.ratio, MIN_ASPECT_RATIO, MAX_ASPECT_RATIO);
    }

    /// Set the play-mode line opacity, clamped to [0, 1]. Non-finite input is ignored.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = clamp_finite(opacity, self.opacity, 0.0, 1.0);
    }

    /// Move the grid origin. Returns `false` if either value is not finite.
    pub fn set_origin(&mut self, x: f64, y: f64) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        self.x = x;
        self.y = y;
        true
    }

    /// Copy with every field forced into range; non-finite fields take their defaults.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            kind: self.kind,
            size: clamp_finite(self.size, defaults.size, MIN_CELL_SIZE, MAX_CELL_SIZE),
            ratio: clamp_finite(self.ratio, defaults.ratio, MIN_ASPECT_RATIO, MAX_ASPECT_RATIO),
            x: if self.x.is_finite() { self.x } else { defaults.x },
            y: if self.y.is_finite() { self.y } else { defaults.y },
            opacity: clamp_finite(self.opacity, defaults.opacity, 0.0, 1.0),
        }
    }

    // --- Indexing ---

    /// The cell containing world point `p`.
    #[must_use]
    pub fn world_to_cell(&self, p: Point) -> CellKey {
        let s = self.size;
        let px = (p.x - self.x) / self.ratio;
        let py = p.y - self.y;

        match self.kind {
            GridKind::Square => CellKey::new(round_to_i64(px / (2.0 * s)), round_to_i64(py / (2.0 * s))),
            GridKind::Pointy => {
                let q = (SQRT_3 / 3.0 * px - py / 3.0) / s;
                let r = (2.0 / 3.0 * py) / s;
                let (q, r) = cube_round(q, r);
                // Odd-r offset.
                CellKey::new(q + (r - (r & 1)) / 2, r)
            }
            GridKind::Flat => {
                let q = (2.0 / 3.0 * px) / s;
                let r = (-px / 3.0 + SQRT_3 / 3.0 * py) / s;
                let (q, r) = cube_round(q, r);
                // Odd-q offset.
                CellKey::new(q, r + (q - (q & 1)) / 2)
            }
        }
    }

    /// World position of the center of `key`. Exact inverse of [`Self::world_to_cell`].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_center(&self, key: CellKey) -> Point {
        let s = self.size;
        let (col, row) = (key.col as f64, key.row as f64);
        let (cx, cy) = match self.kind {
            GridKind::Square => (col * 2.0 * s, row * 2.0 * s),
            GridKind::Pointy => {
                let w = SQRT_3 * s;
                let h = 2.0 * s;
                let shift = if key.row & 1 == 1 { w / 2.0 } else { 0.0 };
                (col * w + shift, row * h * 0.75)
            }
            GridKind::Flat => {
                let w = 2.0 * s;
                let h = SQRT_3 * s;
                let shift = if key.col & 1 == 1 { h / 2.0 } else { 0.0 };
                (col * w * 0.75, row * h + shift)
            }
        };
        Point::new(cx * self.ratio + self.x, cy + self.y)
    }

    /// Outline of `key` with radius `size` (usually the grid size, inflated or inset).
    #[must_use]
    pub fn cell_outline(&self, key: CellKey, size: f64) -> CellOutline {
        let center = self.cell_center(key);
        self.outline_at(center, size)
    }

    /// Outline of a cell-shaped path centered on an arbitrary world point.
    #[must_use]
    pub fn outline_at(&self, center: Point, size: f64) -> CellOutline {
        let ratio = self.ratio;
        match self.kind {
            GridKind::Square => CellOutline::Rect {
                x: center.x - size * ratio,
                y: center.y - size,
                width: size * 2.0 * ratio,
                height: size * 2.0,
            },
            GridKind::Pointy | GridKind::Flat => {
                let start_deg = if self.kind == GridKind::Pointy { 30.0 } else { 0.0 };
                let mut vertices = [Point::default(); 6];
                for (i, v) in (0_u8..).zip(vertices.iter_mut()) {
                    let angle = (60.0 * f64::from(i) + start_deg) * PI / 180.0;
                    *v = Point::new(center.x + size * angle.cos() * ratio, center.y + size * angle.sin());
                }
                CellOutline::Hex(vertices)
            }
        }
    }

    /// Horizontal and vertical distance between neighbouring cell centers.
    #[must_use]
    pub fn spacing(&self) -> (f64, f64) {
        let s = self.size;
        match self.kind {
            GridKind::Square => (2.0 * s * self.ratio, 2.0 * s),
            GridKind::Pointy => (SQRT_3 * s * self.ratio, 1.5 * s),
            GridKind::Flat => (1.5 * s * self.ratio, SQRT_3 * s),
        }
    }

    /// Every cell that can touch `[0, width] x [0, height]`, plus `margin`
    /// cells beyond each edge.
    pub fn cells_covering(&self, width: f64, height: f64, margin: i64) -> impl Iterator<Item = CellKey> + use<> {
        let (dx, dy) = self.spacing();
        let col_lo = floor_to_i64((0.0 - self.x) / dx) - margin;
        let col_hi = ceil_to_i64((width - self.x) / dx) + margin;
        let row_lo = floor_to_i64((0.0 - self.y) / dy) - margin;
        let row_hi = ceil_to_i64((height - self.y) / dy) + margin;
        (row_lo..=row_hi).flat_map(move |row| (col_lo..=col_hi).map(move |col| CellKey::new(col, row)))
    }
}

/// Round fractional axial coordinates to the nearest hex.
///
/// All three cube components are rounded; the one with the largest rounding
/// error is rebuilt from the other two so that `q + r + s == 0`. Ties go to
/// the x component, then y, then z.
#[must_use]
pub fn cube_round(q: f64, r: f64) -> (i64, i64) {
    let s = -q - r;
    let mut rx = round_half_up(q);
    let mut ry = round_half_up(r);
    let rz = round_half_up(s);

    let x_diff = (rx - q).abs();
    let y_diff = (ry - r).abs();
    let z_diff = (rz - s).abs();

    if x_diff > y_diff && x_diff > z_diff {
        rx = -ry - rz;
    } else if y_diff > z_diff {
        ry = -rx - rz;
    }
    (to_i64(rx), to_i64(ry))
}

/// Round to nearest, halves toward positive infinity.
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

fn round_to_i64(v: f64) -> i64 {
    to_i64(round_half_up(v))
}

fn floor_to_i64(v: f64) -> i64 {
    to_i64(v.floor())
}

fn ceil_to_i64(v: f64) -> i64 {
    to_i64(v.ceil())
}

/// Saturating float-to-int conversion; NaN maps to 0.
#[allow(clippy::cast_possible_truncation)]
fn to_i64(v: f64) -> i64 {
    v as i64
}
