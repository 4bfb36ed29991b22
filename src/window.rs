//! Window session that hosts a figure until it is closed.
use std::sync::Arc;

use iced::{
    Element, Length, Rectangle, Size, Task, keyboard, mouse,
    wgpu::TextureFormat,
    widget::{
        self,
        shader::{self, Pipeline, Viewport},
    },
    window,
};

use crate::{error::PlotResult, figure::Figure, render::wgpu_backend::FigureRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureMessage {
    /// Escape was pressed.
    CloseRequested,
}

/// Runs the event loop for `figure`, blocking until the window closes.
pub(crate) fn run(mut figure: Figure) -> PlotResult<()> {
    figure.prepare_geometry();
    let size = Size::new(figure.width() as f32, figure.height() as f32);
    tracing::info!(figure = %figure.id(), plots = figure.len(), "showing figure");

    let figure = Arc::new(figure);
    iced::application(
        move || FigureWindow {
            view: FigureView {
                figure: Arc::clone(&figure),
            },
        },
        FigureWindow::update,
        FigureWindow::view,
    )
    .title(|app: &FigureWindow| app.view.figure.title().to_owned())
    .window(window::Settings {
        size,
        resizable: false,
        ..window::Settings::default()
    })
    .run()?;

    tracing::debug!("figure window closed");
    Ok(())
}

struct FigureWindow {
    view: FigureView,
}

impl FigureWindow {
    fn update(&mut self, message: FigureMessage) -> Task<FigureMessage> {
        match message {
            FigureMessage::CloseRequested => {
                tracing::debug!(figure = %self.view.figure.id(), "close requested");
                iced::exit()
            }
        }
    }

    fn view(&self) -> Element<'_, FigureMessage> {
        widget::shader(&self.view)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

/// Shader program drawing the whole figure in one primitive.
struct FigureView {
    figure: Arc<Figure>,
}

impl shader::Program<FigureMessage> for FigureView {
    type State = ();
    type Primitive = FramePrimitive;

    fn draw(
        &self,
        _state: &Self::State,
        _cursor: mouse::Cursor,
        _bounds: Rectangle,
    ) -> Self::Primitive {
        FramePrimitive {
            figure: Arc::clone(&self.figure),
        }
    }

    fn update(
        &self,
        _state: &mut Self::State,
        event: &iced::Event,
        _bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Option<shader::Action<FigureMessage>> {
        if let iced::Event::Keyboard(keyboard::Event::KeyPressed {
            key: keyboard::Key::Named(keyboard::key::Named::Escape),
            ..
        }) = event
        {
            return Some(shader::Action::publish(FigureMessage::CloseRequested));
        }
        None
    }
}

#[doc(hidden)]
pub struct FramePrimitive {
    figure: Arc<Figure>,
}

impl std::fmt::Debug for FramePrimitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramePrimitive")
            .field("figure", &self.figure.id())
            .finish_non_exhaustive()
    }
}

impl shader::Primitive for FramePrimitive {
    type Pipeline = FigurePipeline;

    fn prepare(
        &self,
        pipeline: &mut Self::Pipeline,
        device: &iced::wgpu::Device,
        queue: &iced::wgpu::Queue,
        _bounds: &Rectangle,
        viewport: &Viewport,
    ) {
        // Re-read every frame; DPI changes move the framebuffer under a fixed window.
        let fb = viewport.physical_size();
        pipeline
            .renderer
            .prepare(device, queue, &self.figure, (fb.width, fb.height));
    }

    fn render(
        &self,
        pipeline: &Self::Pipeline,
        encoder: &mut iced::wgpu::CommandEncoder,
        target: &iced::wgpu::TextureView,
        clip_bounds: &Rectangle<u32>,
    ) {
        pipeline.renderer.render(encoder, target, clip_bounds);
    }
}

#[doc(hidden)]
pub struct FigurePipeline {
    renderer: FigureRenderer,
}

impl Pipeline for FigurePipeline {
    fn new(device: &iced::wgpu::Device, _queue: &iced::wgpu::Queue, format: TextureFormat) -> Self
    where
        Self: Sized,
    {
        FigurePipeline {
            renderer: FigureRenderer::new(device, format),
        }
    }
}
