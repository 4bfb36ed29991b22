//! A Lissajous curve colored by its parameter.
use std::f64::consts::TAU;

use iced_figure::{ColorSource, Figure, PlotResult, color};

fn main() -> PlotResult<()> {
    let mut figure = Figure::new(700, 700)?;
    figure.set_background_color(color::DARK_GRAY);
    let id = figure.add_plot()?;
    let plot = figure.plot_mut(id).expect("plot was just added");

    plot.set_title("lissajous 3:2");
    plot.set_background_color(color::LIGHT_GRAY);
    plot.set_x_range(-1.1, 1.1)?;
    plot.set_y_range(-1.1, 1.1)?;
    plot.show_ticks(false);

    let ts: Vec<f64> = (0..1000).map(|i| i as f64 * TAU / 999.0).collect();
    let xs: Vec<f64> = ts.iter().map(|t| (3.0 * t).sin()).collect();
    let ys: Vec<f64> = ts.iter().map(|t| (2.0 * t).sin()).collect();
    plot.plot_parametric(
        &ts,
        &xs,
        &ys,
        ColorSource::function(|t| color::Hsv::new(t.to_degrees() as f32, 1.0, 1.0).to_rgb()),
    )?;

    plot.plot_parametric(
        &ts,
        &ts.iter().map(|t| 0.3 * t.cos()).collect::<Vec<_>>(),
        &ts.iter().map(|t| 0.3 * t.sin()).collect::<Vec<_>>(),
        ColorSource::gradient(color::CYAN, color::MAGENTA),
    )?;

    figure.show()
}
