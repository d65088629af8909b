//! Shared numeric constants for the hexfog crate.

// ── Math ────────────────────────────────────────────────────────

/// √3, the width-to-radius ratio of a pointy hex (height for flat hexes).
pub const SQRT_3: f64 = 1.732_050_807_568_877_2;

// ── Camera ──────────────────────────────────────────────────────

/// Smallest allowed camera scale.
pub const MIN_SCALE: f64 = 0.05;

/// Largest allowed camera scale.
pub const MAX_SCALE: f64 = 20.0;

/// Fit-to-window leaves this fraction of the viewport filled by the map.
pub const FIT_MARGIN: f64 = 0.9;

/// Scale change per discrete wheel notch (10%).
pub const WHEEL_ZOOM_STEP: f64 = 0.1;

// ── Grid ────────────────────────────────────────────────────────

/// Smallest cell radius in world pixels.
pub const MIN_CELL_SIZE: f64 = 10.0;

/// Largest cell radius in world pixels.
pub const MAX_CELL_SIZE: f64 = 300.0;

/// Cell radius used when no valid size is available.
pub const DEFAULT_CELL_SIZE: f64 = 30.0;

/// Smallest horizontal stretch applied to grid cells.
pub const MIN_ASPECT_RATIO: f64 = 0.1;

/// Largest horizontal stretch applied to grid cells.
pub const MAX_ASPECT_RATIO: f64 = 5.0;

/// Default grid line opacity in play mode.
pub const DEFAULT_GRID_OPACITY: f64 = 0.5;

/// Extra cells drawn past each edge of the world bounds.
pub const GRID_MARGIN_CELLS: i64 = 2;

// ── Rendering ───────────────────────────────────────────────────

/// Revealed holes are punched this many world units larger than the cell
/// so adjacent holes leave no hairline seam.
pub const HOLE_INFLATE: f64 = 1.0;

/// Grid outlines are stroked this much inside the cell radius.
pub const GRID_LINE_INSET: f64 = 0.5;

/// Grid opacity forced while aligning.
pub const ALIGN_GRID_OPACITY: f64 = 0.9;

/// Fog fill used when no fog texture is loaded.
pub const FALLBACK_FOG_FILL: &str = "rgba(20, 20, 20, 0.7)";

/// Export background used when no base map is loaded.
pub const FALLBACK_BACKGROUND: &str = "#111";

/// Default world width until a base map is loaded.
pub const DEFAULT_WORLD_WIDTH: f64 = 1920.0;

/// Default world height until a base map is loaded.
pub const DEFAULT_WORLD_HEIGHT: f64 = 1080.0;

// ── Drawing ─────────────────────────────────────────────────────

/// Smallest pen or eraser diameter in world pixels.
pub const MIN_BRUSH_SIZE: f64 = 1.0;

/// Largest pen or eraser diameter in world pixels.
pub const MAX_BRUSH_SIZE: f64 = 200.0;
