//! Subplot placement.
//!
//! A cell is described twice: as an [`NdcRect`] in the `[-1, 1]` square, which
//! becomes the subplot's box, and as a [`ScreenRect`] in `[0, 1]` screen
//! fractions, which turns into a pixel viewport once the framebuffer size is
//! known. Pixel viewports are recomputed every frame and never cached.
use crate::error::{PlotError, PlotResult, reject};

/// Default gap between subplot cells and around the grid, in NDC units.
pub const DEFAULT_SUBPLOT_MARGIN: f32 = 0.1;

/// Rectangle in normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NdcRect {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl NdcRect {
    /// The whole `[-1, 1]` square.
    pub const FULL: Self = Self {
        left: -1.0,
        right: 1.0,
        bottom: -1.0,
        top: 1.0,
    };

    /// The full square shrunk by `margin` on every side, i.e. `±(1 - margin)`.
    pub fn inset(margin: f32) -> Self {
        let e = 1.0 - margin;
        Self {
            left: -e,
            right: e,
            bottom: -e,
            top: e,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Corners in counter-clockwise order starting at the bottom-left.
    pub fn corners(&self) -> [[f32; 2]; 4] {
        [
            [self.left, self.bottom],
            [self.right, self.bottom],
            [self.right, self.top],
            [self.left, self.top],
        ]
    }

    pub fn to_screen(&self) -> ScreenRect {
        let f = |v: f32| (v + 1.0) * 0.5;
        ScreenRect {
            left: f(self.left),
            right: f(self.right),
            bottom: f(self.bottom),
            top: f(self.top),
        }
    }
}

/// Rectangle in screen fractions, origin at the bottom-left of the framebuffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl ScreenRect {
    pub const FULL: Self = Self {
        left: 0.0,
        right: 1.0,
        bottom: 0.0,
        top: 1.0,
    };

    /// Scales to pixels for a framebuffer of `fb_width x fb_height`.
    pub fn to_pixels(&self, fb_width: u32, fb_height: u32) -> PixelViewport {
        let w = fb_width as f32;
        let h = fb_height as f32;
        PixelViewport {
            x: self.left * w,
            y: self.bottom * h,
            width: (self.right - self.left) * w,
            height: (self.top - self.bottom) * h,
        }
    }
}

/// Pixel rectangle with a bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelViewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelViewport {
    pub fn full(fb_width: u32, fb_height: u32) -> Self {
        ScreenRect::FULL.to_pixels(fb_width, fb_height)
    }

    /// Less than one pixel in either direction.
    pub fn is_empty(&self) -> bool {
        !(self.width >= 1.0 && self.height >= 1.0)
    }

    /// The same rectangle measured from the top edge, as wgpu expects.
    pub fn top_left_origin(&self, fb_height: u32) -> (f32, f32) {
        (self.x, fb_height as f32 - self.y - self.height)
    }
}

/// Where a plot sits inside a subplot grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubplotLayout {
    pub rows: usize,
    pub cols: usize,
    /// Row-major cell index.
    pub index: usize,
    pub margin: f32,
    /// The cell, which is also the plot's box.
    pub ndc: NdcRect,
    pub screen: ScreenRect,
}

impl SubplotLayout {
    /// Resolves cell `index` of a `rows x cols` grid.
    pub fn new(rows: usize, cols: usize, index: usize, margin: f32) -> PlotResult<Self> {
        let cells = layout_grid(rows, cols, margin)?;
        let Some(&ndc) = cells.get(index) else {
            return reject(
                "subplot_layout",
                PlotError::SubplotIndexOutOfRange {
                    index,
                    len: cells.len(),
                },
            );
        };
        Ok(Self::from_cell(rows, cols, index, margin, ndc))
    }

    pub(crate) fn from_cell(
        rows: usize,
        cols: usize,
        index: usize,
        margin: f32,
        ndc: NdcRect,
    ) -> Self {
        Self {
            rows,
            cols,
            index,
            margin,
            ndc,
            screen: ndc.to_screen(),
        }
    }

    pub fn row(&self) -> usize {
        self.index / self.cols
    }

    pub fn col(&self) -> usize {
        self.index % self.cols
    }
}

/// Splits the NDC square into a `rows x cols` grid of cells separated and
/// surrounded by `margin`. Cells are returned row-major with row 0 at the top.
///
/// Zero rows or columns, and margins that would leave a cell with no area,
/// are rejected.
pub fn layout_grid(rows: usize, cols: usize, margin: f32) -> PlotResult<Vec<NdcRect>> {
    let Some(count) = rows.checked_mul(cols).filter(|&n| n > 0) else {
        return reject("layout_grid", PlotError::InvalidGrid { rows, cols });
    };

    let cell_width = (2.0 - margin * (cols as f32 + 1.0)) / cols as f32;
    let cell_height = (2.0 - margin * (rows as f32 + 1.0)) / rows as f32;
    if !margin.is_finite() || margin < 0.0 || !(cell_width > 0.0) || !(cell_height > 0.0) {
        return reject(
            "layout_grid",
            PlotError::InvalidMargin { margin, rows, cols },
        );
    }

    let mut cells = Vec::new();
    if cells.try_reserve_exact(count).is_err() {
        return reject("layout_grid", PlotError::Allocation("subplot cell"));
    }

    for index in 0..count {
        let (row, col) = (index / cols, index % cols);
        let left = -1.0 + margin + col as f32 * (cell_width + margin);
        let top = 1.0 - margin - row as f32 * (cell_height + margin);
        cells.push(NdcRect {
            left,
            right: left + cell_width,
            bottom: top - cell_height,
            top,
        });
    }

    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cell_is_inset_square() {
        let cells = layout_grid(1, 1, 0.1).expect("1x1 grid");
        assert_eq!(cells.len(), 1);
        let c = cells[0];
        assert!((c.left + 0.9).abs() < 1e-6);
        assert!((c.right - 0.9).abs() < 1e-6);
        assert!((c.bottom + 0.9).abs() < 1e-6);
        assert!((c.top - 0.9).abs() < 1e-6);
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert!(matches!(
            layout_grid(0, 3, 0.1),
            Err(PlotError::InvalidGrid { rows: 0, cols: 3 })
        ));
        assert!(matches!(
            layout_grid(2, 0, 0.1),
            Err(PlotError::InvalidGrid { .. })
        ));
    }

    #[test]
    fn oversized_margin_rejected() {
        assert!(matches!(
            layout_grid(3, 3, 0.5),
            Err(PlotError::InvalidMargin { .. })
        ));
        assert!(matches!(
            layout_grid(1, 1, -0.1),
            Err(PlotError::InvalidMargin { .. })
        ));
        assert!(layout_grid(1, 1, f32::NAN).is_err());
    }

    #[test]
    fn screen_and_pixel_conversion() {
        let rect = NdcRect {
            left: -1.0,
            right: 0.0,
            bottom: 0.0,
            top: 1.0,
        };
        let screen = rect.to_screen();
        assert_eq!(screen.left, 0.0);
        assert_eq!(screen.right, 0.5);
        assert_eq!(screen.bottom, 0.5);
        assert_eq!(screen.top, 1.0);

        let px = screen.to_pixels(800, 600);
        assert_eq!(px.x, 0.0);
        assert_eq!(px.y, 300.0);
        assert_eq!(px.width, 400.0);
        assert_eq!(px.height, 300.0);
        assert_eq!(px.top_left_origin(600), (0.0, 0.0));
    }

    #[test]
    fn layout_out_of_range_index() {
        assert!(matches!(
            SubplotLayout::new(2, 2, 4, 0.1),
            Err(PlotError::SubplotIndexOutOfRange { index: 4, len: 4 })
        ));
        let l = SubplotLayout::new(2, 3, 4, 0.1).expect("valid cell");
        assert_eq!((l.row(), l.col()), (1, 1));
    }
}
