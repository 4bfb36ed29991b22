//! A 2x2 grid of subplots with different styling in each cell.
use std::f64::consts::TAU;

use iced_figure::{ColorSource, FigureBuilder, GridSpacing, PlotResult, color};

fn main() -> PlotResult<()> {
    let mut figure = FigureBuilder::new()
        .with_size(1024, 768)
        .with_title("subplots")
        .with_background(color::WHITE)
        .build()?;
    figure.add_subplots(2, 2)?;

    let xs: Vec<f64> = (0..300).map(|i| i as f64 * TAU / 299.0).collect();
    let waves: [(&str, fn(f64) -> f64); 4] = [
        ("sin", f64::sin),
        ("cos", f64::cos),
        ("sin 2x", |x| (2.0 * x).sin()),
        ("damped", |x| (-0.4 * x).exp() * (3.0 * x).sin()),
    ];

    for (index, (name, f)) in waves.into_iter().enumerate() {
        let plot = figure.subplot_mut(index)?;
        plot.set_title(name);
        plot.set_x_range(0.0, TAU)?;
        plot.set_y_range(-1.0, 1.0)?;

        let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();
        let source = match index {
            0 => ColorSource::from(color::RED),
            1 => ColorSource::from(color::BLUE),
            2 => ColorSource::gradient(color::ORANGE, color::PURPLE),
            _ => ColorSource::function(|x| color::Hsv::new((x * 57.3) as f32, 0.8, 0.9).to_rgb()),
        };
        plot.plot(&xs, &ys, source)?;
    }

    let damped = figure.subplot_at(1, 1)?;
    damped.set_grid_spacing(GridSpacing::Auto)?;
    damped.set_line_width(3.0)?;

    figure.show()
}
