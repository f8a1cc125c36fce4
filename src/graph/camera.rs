//! View transform, fitting and eased camera moves.

use super::simulation::Point;

/// Smallest zoom reachable by wheel or fit.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest zoom reachable by wheel.
pub const MAX_ZOOM: f64 = 10.0;
/// Fitting never zooms in further than this.
pub const MAX_FIT_ZOOM: f64 = 2.0;

/// Standard ease-out curve used for every animated transition.
pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Axis-aligned box in graph space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Left edge.
	pub min_x: f64,
	/// Top edge.
	pub min_y: f64,
	/// Right edge.
	pub max_x: f64,
	/// Bottom edge.
	pub max_y: f64,
}

impl Bounds {
	/// Smallest box containing every point, `None` when there are none.
	pub fn of(points: impl IntoIterator<Item = Point>) -> Option<Self> {
		points.into_iter().fold(None, |acc: Option<Bounds>, p| {
			Some(match acc {
				None => Bounds {
					min_x: p.x,
					min_y: p.y,
					max_x: p.x,
					max_y: p.y,
				},
				Some(b) => Bounds {
					min_x: b.min_x.min(p.x),
					min_y: b.min_y.min(p.y),
					max_x: b.max_x.max(p.x),
					max_y: b.max_y.max(p.y),
				},
			})
		})
	}

	/// Horizontal extent.
	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	/// Vertical extent.
	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}

	/// Midpoint.
	pub fn center(&self) -> Point {
		Point::new(
			(self.min_x + self.max_x) / 2.0,
			(self.min_y + self.max_y) / 2.0,
		)
	}
}

/// Maps graph space to screen space: `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal translation in screen pixels.
	pub x: f64,
	/// Vertical translation in screen pixels.
	pub y: f64,
	/// Scale.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	/// Screen pixel to graph coordinates.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		Point::new((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Graph coordinates to screen pixel.
	pub fn graph_to_screen(&self, p: Point) -> (f64, f64) {
		(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	/// Puts `p` at the viewport center at zoom `k`.
	pub fn centered_on(p: Point, k: f64, width: f64, height: f64) -> Self {
		Self {
			x: width / 2.0 - p.x * k,
			y: height / 2.0 - p.y * k,
			k,
		}
	}

	/// Fits `bounds` plus `margin` screen pixels into the viewport, then
	/// scales by `zoom_out` so everything stays visible.
	pub fn fit(bounds: &Bounds, width: f64, height: f64, margin: f64, zoom_out: f64) -> Self {
		let avail_w = (width - 2.0 * margin).max(1.0);
		let avail_h = (height - 2.0 * margin).max(1.0);
		let k = (avail_w / bounds.width().max(1.0))
			.min(avail_h / bounds.height().max(1.0))
			.min(MAX_FIT_ZOOM)
			* zoom_out;
		Self::centered_on(bounds.center(), k.clamp(MIN_ZOOM, MAX_ZOOM), width, height)
	}

	/// Multiplies the zoom by `factor`, keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_at(&self, sx: f64, sy: f64, factor: f64) -> Self {
		let k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = k / self.k;
		Self {
			x: sx - (sx - self.x) * ratio,
			y: sy - (sy - self.y) * ratio,
			k,
		}
	}

	fn lerp(&self, to: &Self, t: f64) -> Self {
		Self {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

/// An in-flight camera move.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraTween {
	from: ViewTransform,
	to: ViewTransform,
	elapsed: f64,
	duration: f64,
}

impl CameraTween {
	/// Starts a move from `from` to `to` lasting `duration` seconds.
	pub fn new(from: ViewTransform, to: ViewTransform, duration: f64) -> Self {
		Self {
			from,
			to,
			elapsed: 0.0,
			duration,
		}
	}

	/// Advances by `dt` seconds and returns the transform to show.
	pub fn advance(&mut self, dt: f64) -> ViewTransform {
		self.elapsed += dt;
		if self.is_done() {
			return self.to;
		}
		self.from.lerp(&self.to, ease_out_cubic(self.elapsed / self.duration))
	}

	/// True once the destination has been reached.
	pub fn is_done(&self) -> bool {
		self.duration <= 0.0 || self.elapsed >= self.duration
	}
}
