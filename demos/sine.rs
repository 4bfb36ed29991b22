//! One plot, one sine wave. Press Escape to close.
use std::f64::consts::TAU;

use iced_figure::{Figure, PlotResult, color};

fn main() -> PlotResult<()> {
    let mut figure = Figure::new(800, 600)?;
    let id = figure.add_plot()?;
    let plot = figure.plot_mut(id).expect("plot was just added");

    plot.set_title("sin(x)");
    plot.set_x_label("x");
    plot.set_y_label("y");
    plot.set_x_range(0.0, TAU)?;
    plot.set_y_range(-1.0, 1.0)?;

    let xs: Vec<f64> = (0..200).map(|i| i as f64 * TAU / 199.0).collect();
    let ys: Vec<f64> = xs.iter().map(|x| x.sin()).collect();
    plot.plot(&xs, &ys, color::RED)?;

    figure.show()
}
