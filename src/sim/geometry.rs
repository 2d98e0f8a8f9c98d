//! Lane geometry and axis-aligned collision tests
//!
//! The road is a vertical strip divided into equal-width lanes. Every entity
//! occupies one lane and is an axis-aligned box centered on that lane, so
//! collision detection reduces to AABB overlap checks.

use glam::Vec2;

use crate::consts::{LANE_COUNT, ROAD_MAX_WIDTH, ROAD_WIDTH_RATIO, SPAWN_LEAD};

/// An axis-aligned rectangle with its origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top-left corner
    pub origin: Vec2,
    /// Width and height (both non-negative)
    pub size: Vec2,
}

impl Rect {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Build a rect centered horizontally on `center_x` with its top edge at `top`
    pub fn centered_at(center_x: f32, top: f32, size: Vec2) -> Self {
        Self {
            origin: Vec2::new(center_x - size.x / 2.0, top),
            size,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.origin.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.origin.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.y
    }

    /// Open-interval AABB overlap: rects that merely touch edges do not overlap
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// The playfield: a lane-divided vertical strip
///
/// `y` grows downward: entities enter at negative `y` above the near edge and
/// despawn past `height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Road {
    /// Left edge in screen coordinates
    pub left: f32,
    /// Total width
    pub width: f32,
    /// Visible track length
    pub height: f32,
    /// Number of lanes
    pub lanes: usize,
}

impl Road {
    pub fn new(left: f32, width: f32, height: f32, lanes: usize) -> Self {
        Self {
            left,
            width,
            height,
            lanes,
        }
    }

    /// Responsive sizing: the road takes most of the screen width up to a cap,
    /// centered horizontally, and the full screen height.
    pub fn from_screen(screen_w: f32, screen_h: f32) -> Self {
        let width = (screen_w * ROAD_WIDTH_RATIO).min(ROAD_MAX_WIDTH);
        Self {
            left: (screen_w - width) / 2.0,
            width,
            height: screen_h,
            lanes: LANE_COUNT,
        }
    }

    #[inline]
    pub fn lane_width(&self) -> f32 {
        self.width / self.lanes as f32
    }

    /// Horizontal center of a lane. Pure arithmetic, defined for any index.
    #[inline]
    pub fn lane_center(&self, lane: usize) -> f32 {
        self.left + self.lane_width() * (lane as f32 + 0.5)
    }

    /// Box of the given size centered on `lane`, top edge at `y`
    pub fn entity_rect(&self, lane: usize, y: f32, size: Vec2) -> Rect {
        Rect::centered_at(self.lane_center(lane), y, size)
    }

    /// Spawn position for an entity of height `h`: just above the near edge
    #[inline]
    pub fn spawn_y(&self, h: f32) -> f32 {
        -h - SPAWN_LEAD
    }
}
