//! Mapping clicks on the video preview to the dongle's absolute coordinates.
//!
//! The captured video of the target is drawn "aspect fit" inside the host
//! window: scaled as large as possible without distortion, centred, with
//! black bars filling the rest.  When the window is taller than the video's
//! aspect ratio the bars are above and below; when it is wider they sit left
//! and right.
//!
//! ```text
//!  viewport (vw × vh)                    viewport (vw × vh)
//! ┌────────────────────┐                ┌────┬──────────┬────┐
//! │      margin        │                │    │          │    │
//! ├────────────────────┤                │ m  │  video   │ m  │
//! │   video (vw×h_fit) │                │    │(w_fit×vh)│    │
//! ├────────────────────┤                │    │          │    │
//! │      margin        │                └────┴──────────┴────┘
//! └────────────────────┘
//! ```
//!
//! A click inside the video maps to a [`NormalizedPoint`] in `[0,1]×[0,1]`
//! relative to the visible picture only.  A click on a bar maps to nothing:
//! that is a normal outcome, not an error.

use thiserror::Error;
use tracing::trace;

/// Errors for malformed geometry or coordinates.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    /// A viewport or video dimension was zero.
    #[error("{0} must be greater than zero")]
    ZeroDimension(&'static str),

    /// A normalized coordinate was outside `[0, 1]` or not finite.
    #[error("normalized coordinate ({x}, {y}) is outside [0, 1]")]
    OutOfRange { x: f64, y: f64 },
}

/// A position inside the target's screen, each axis in `[0, 1]`.
///
/// Constructing one is the only validation point: once a value exists, the
/// packet codec can scale it without further checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedPoint {
    x: f64,
    y: f64,
}

impl NormalizedPoint {
    /// Top-left corner of the target screen.
    pub const ORIGIN: NormalizedPoint = NormalizedPoint { x: 0.0, y: 0.0 };

    /// Creates a point, rejecting values outside `[0, 1]` and NaN.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OutOfRange`].
    pub fn new(x: f64, y: f64) -> Result<Self, GeometryError> {
        if (0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y) {
            Ok(Self { x, y })
        } else {
            Err(GeometryError::OutOfRange { x, y })
        }
    }

    /// Clamps both axes into `[0, 1]`.  NaN becomes 0.
    fn clamped(x: f64, y: f64) -> Self {
        let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self {
            x: clamp(x),
            y: clamp(y),
        }
    }

    /// Horizontal position, 0 at the left edge of the video.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Vertical position, 0 at the top edge of the video.
    pub fn y(&self) -> f64 {
        self.y
    }
}

/// Where the black bars are for a given geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Letterbox {
    /// Bars above and below; the video spans the full width at `height` pixels.
    TopBottom { margin: f64, height: u64 },
    /// Bars left and right; the video spans the full height at `width` pixels.
    LeftRight { margin: f64, width: u64 },
}

/// Viewport size and native video size, all strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportGeometry {
    viewport_width: u32,
    viewport_height: u32,
    video_width: u32,
    video_height: u32,
}

impl ViewportGeometry {
    /// Validates and stores the geometry.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroDimension`] naming the first zero field.
    pub fn new(
        viewport_width: u32,
        viewport_height: u32,
        video_width: u32,
        video_height: u32,
    ) -> Result<Self, GeometryError> {
        for (value, name) in [
            (viewport_width, "viewport width"),
            (viewport_height, "viewport height"),
            (video_width, "video width"),
            (video_height, "video height"),
        ] {
            if value == 0 {
                return Err(GeometryError::ZeroDimension(name));
            }
        }
        Ok(Self {
            viewport_width,
            viewport_height,
            video_width,
            video_height,
        })
    }

    /// Works out which axis is letterboxed and by how much.
    ///
    /// Fitted sizes use truncating integer arithmetic and are computed before
    /// any comparison; the edge-pixel behaviour depends on that order.
    pub fn letterbox(&self) -> Letterbox {
        let vw = u64::from(self.viewport_width);
        let vh = u64::from(self.viewport_height);
        let cw = u64::from(self.video_width);
        let ch = u64::from(self.video_height);

        let h_fit = vw * ch / cw;
        let w_fit = vh * cw / ch;

        if vh > h_fit {
            Letterbox::TopBottom {
                margin: (vh - h_fit) as f64 / 2.0,
                height: h_fit,
            }
        } else {
            Letterbox::LeftRight {
                margin: vw.saturating_sub(w_fit) as f64 / 2.0,
                width: w_fit,
            }
        }
    }

    /// Maps a click at pixel `(px, py)` to the video content.
    ///
    /// Returns `None` when the click lands on a letterbox bar or outside the
    /// viewport altogether.
    pub fn map_click(&self, px: f64, py: f64) -> Option<NormalizedPoint> {
        let vw = f64::from(self.viewport_width);
        let vh = f64::from(self.viewport_height);

        if !(0.0..=vw).contains(&px) || !(0.0..=vh).contains(&py) {
            trace!(px, py, "click outside viewport");
            return None;
        }

        let (x, y) = match self.letterbox() {
            Letterbox::TopBottom { margin, height } => {
                if height == 0 || py < margin || py > vh - margin {
                    trace!(py, margin, "click on top/bottom bar");
                    return None;
                }
                (px / vw, (py - margin) / height as f64)
            }
            Letterbox::LeftRight { margin, width } => {
                if width == 0 || px < margin || px > vw - margin {
                    trace!(px, margin, "click on left/right bar");
                    return None;
                }
                ((px - margin) / width as f64, py / vh)
            }
        };

        Some(NormalizedPoint::clamped(x, y))
    }
}
