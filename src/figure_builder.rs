use crate::{
    Color,
    color::WHITE,
    error::{PlotError, PlotResult, reject},
    figure::Figure,
    layout::DEFAULT_SUBPLOT_MARGIN,
};

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;
pub const DEFAULT_TITLE: &str = "iced_figure";

/// Builder for configuring and constructing a [`Figure`].
///
/// All settings have defaults: an 800x600 white window titled "iced_figure"
/// with a 0.1 subplot margin.
///
/// # Example
///
/// ```no_run
/// use iced_figure::{FigureBuilder, color};
///
/// let mut figure = FigureBuilder::new()
///     .with_size(1024, 768)
///     .with_title("signals")
///     .with_background(color::WHITE)
///     .with_subplot_margin(0.05)
///     .build()?;
/// let plots = figure.add_subplots(2, 1)?;
/// # Ok::<(), iced_figure::PlotError>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct FigureBuilder {
    size: Option<(u32, u32)>,
    title: Option<String>,
    background: Option<Color>,
    subplot_margin: Option<f32>,
}

impl FigureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Window size in logical pixels. The window cannot be resized.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    /// Window title. Empty titles are ignored.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let t = title.into();
        if !t.is_empty() {
            self.title = Some(t);
        }
        self
    }

    /// Color the window is cleared to every frame.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Margin used by [`Figure::add_subplots`].
    pub fn with_subplot_margin(mut self, margin: f32) -> Self {
        self.subplot_margin = Some(margin);
        self
    }

    /// Build the figure; rejects zero sizes and negative or non-finite margins.
    pub fn build(self) -> PlotResult<Figure> {
        let (width, height) = self.size.unwrap_or((DEFAULT_WIDTH, DEFAULT_HEIGHT));
        if width == 0 || height == 0 {
            return reject("figure", PlotError::InvalidFigureSize { width, height });
        }

        let margin = self.subplot_margin.unwrap_or(DEFAULT_SUBPLOT_MARGIN);
        if !margin.is_finite() || margin < 0.0 {
            return reject(
                "figure",
                PlotError::InvalidMargin {
                    margin,
                    rows: 0,
                    cols: 0,
                },
            );
        }

        Ok(Figure::from_parts(
            width,
            height,
            self.title.unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
            self.background.unwrap_or(WHITE),
            margin,
        ))
    }
}
