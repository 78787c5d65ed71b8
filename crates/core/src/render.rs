//! Frame buffers handed to the render sink.

use crate::color::trail_alpha;
use crate::core_types::ZoneType;
use crate::element::FlowElement;

/// Contiguous run of samples belonging to one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSegment {
    /// Index of the first sample in [`FlowFrame::positions`]
    pub offset: usize,
    pub len: usize,
    pub is_vortex: bool,
    pub zone: ZoneType,
}

/// Positions and colors for one fully advanced population.
///
/// Buffers are reused between frames; rebuilding never shrinks capacity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowFrame {
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 4]>,
    segments: Vec<LineSegment>,
}

impl FlowFrame {
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// RGBA per position, trail fade applied.
    pub fn colors(&self) -> &[[f32; 4]] {
        &self.colors
    }

    pub fn segments(&self) -> &[LineSegment] {
        &self.segments
    }

    pub fn point_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub(crate) fn rebuild<'a>(&mut self, elements: impl IntoIterator<Item = &'a FlowElement>) {
        self.positions.clear();
        self.colors.clear();
        self.segments.clear();

        for element in elements {
            let len = element.len();
            let offset = self.positions.len();
            let last = len.saturating_sub(1).max(1) as f32;

            for (i, (point, color)) in element.points().zip(element.colors()).enumerate() {
                self.positions.push([point.x, point.y, point.z]);
                let faded = color.with_alpha(trail_alpha(color.a, i as f32 / last));
                self.colors.push(faded.clamped().to_array());
            }

            self.segments.push(LineSegment {
                offset,
                len,
                is_vortex: element.is_vortex(),
                zone: element.zone(),
            });
        }
    }
}

/// Consumer of finished frames, such as a GPU buffer uploader.
pub trait RenderSink {
    fn submit(&mut self, frame: &FlowFrame);
}

/// Any closure taking a frame is a sink.
impl<F: FnMut(&FlowFrame)> RenderSink for F {
    fn submit(&mut self, frame: &FlowFrame) {
        self(frame);
    }
}
