use crate::{FallbackAnimator, RenderFrame, TickContext};
use airwave_core::{PortConfig, SampleBuffer};
use core::fmt;

/// Which renderer variant produced a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum RendererKind {
    Bars,
    Waveform,
    Stereo,
    Radial,
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RendererKind::Bars => "bars",
            RendererKind::Waveform => "waveform",
            RendererKind::Stereo => "stereo",
            RendererKind::Radial => "radial",
        };
        f.write_str(name)
    }
}

/// Produces a frame per tick from a sample buffer, or from synthetic motion.
///
/// Implementations keep their previous frame for one-step smoothing and
/// peak hold. They must accept any buffer, including empty buffers and
/// buffers of the other domain, without panicking.
pub trait SignalRenderer {
    fn kind(&self) -> RendererKind;

    /// The port this renderer wants to read from.
    fn port_config(&self) -> PortConfig;

    /// Smooth toward `samples` and return the new frame.
    fn produce_frame(&mut self, samples: &SampleBuffer, cx: &TickContext) -> RenderFrame<'_>;

    /// Smooth toward the animator's synthetic targets and return the new frame.
    fn produce_fallback(
        &mut self,
        animator: &mut FallbackAnimator,
        cx: &TickContext,
    ) -> RenderFrame<'_>;

    /// The most recently produced frame.
    fn frame(&self) -> RenderFrame<'_>;

    /// Return to the resting frame.
    fn reset(&mut self);
}

impl<R: SignalRenderer + ?Sized> SignalRenderer for Box<R> {
    fn kind(&self) -> RendererKind {
        (**self).kind()
    }

    fn port_config(&self) -> PortConfig {
        (**self).port_config()
    }

    fn produce_frame(&mut self, samples: &SampleBuffer, cx: &TickContext) -> RenderFrame<'_> {
        (**self).produce_frame(samples, cx)
    }

    fn produce_fallback(
        &mut self,
        animator: &mut FallbackAnimator,
        cx: &TickContext,
    ) -> RenderFrame<'_> {
        (**self).produce_fallback(animator, cx)
    }

    fn frame(&self) -> RenderFrame<'_> {
        (**self).frame()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
