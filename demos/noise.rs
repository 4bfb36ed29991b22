//! Gaussian noise around a trend, one plot per noise level.
//!
//! Run with `RUST_LOG=iced_figure=debug` to watch the figure lifecycle.
use iced_figure::{FigureBuilder, PlotResult, color, telemetry};
use rand_distr::{Distribution, Normal};

fn main() -> PlotResult<()> {
    let _ = telemetry::init_default_tracing();

    let mut figure = FigureBuilder::new()
        .with_size(900, 900)
        .with_title("noise")
        .with_subplot_margin(0.06)
        .build()?;
    let ids = figure.add_subplots(3, 1)?;

    let mut rng = rand::rng();
    let xs: Vec<f64> = (0..500).map(|i| i as f64 / 50.0).collect();
    let trend: Vec<f64> = xs.iter().map(|x| 0.2 * x).collect();

    for (id, sigma) in ids.into_iter().zip([0.05, 0.25, 0.75]) {
        let normal = Normal::new(0.0, sigma).expect("sigma is positive");
        let ys: Vec<f64> = trend.iter().map(|t| t + normal.sample(&mut rng)).collect();

        let plot = figure.plot_mut(id).expect("subplot exists");
        plot.set_x_range(0.0, 10.0)?;
        plot.set_y_range(-2.0, 4.0)?;
        plot.plot(&xs, &ys, color::BLUE)?;
        plot.plot(&xs, &trend, color::RED)?;
    }

    // Saving is not supported; the error is reported and the figure still shows.
    if let Err(err) = figure.save("noise.png") {
        eprintln!("{err}");
    }

    figure.show()
}
