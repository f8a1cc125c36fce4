//! Iterative force layout with type columns, hashed rows and user pins.
//!
//! Each tick accumulates every force into a velocity delta buffer before any
//! body moves, so results do not depend on node order within a tick. Overlap
//! removal runs afterwards as position corrections, and finally every free
//! body is held inside the horizontal band of its type column.

use std::f64::consts::PI;

use super::camera::Bounds;
use super::config::{GraphConfig, LayoutConfig};
use super::model::{Graph, NodeType};

/// 2-D point or vector in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal component.
	pub x: f64,
	/// Vertical component.
	pub y: f64,
}

impl Point {
	/// Shorthand constructor.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Pin state of a body.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Pin {
	/// Moved by the simulation.
	#[default]
	Free,
	/// Held at a fixed position.
	Pinned(Point),
}

/// Simulated position and velocity of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
	/// Horizontal position.
	pub x: f64,
	/// Vertical position.
	pub y: f64,
	/// Horizontal velocity.
	pub vx: f64,
	/// Vertical velocity.
	pub vy: f64,
	/// Pin state.
	pub pin: Pin,
	column: f64,
	row: f64,
}

impl Body {
	/// Current position.
	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}

	/// True while pinned.
	pub fn is_pinned(&self) -> bool {
		matches!(self.pin, Pin::Pinned(_))
	}
}

#[derive(Clone, Debug, PartialEq)]
struct Link {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
}

/// The complete mutable state of one layout run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationState {
	bodies: Vec<Body>,
	links: Vec<Link>,
	config: LayoutConfig,
	width: f64,
	height: f64,
	alpha: f64,
	ticks: u64,
	heat_ticks: u32,
}

/// Advances a copy of `state` by one tick.
pub fn step(state: &SimulationState) -> SimulationState {
	let mut next = state.clone();
	next.tick();
	next
}

impl SimulationState {
	/// Seeds bodies on a ring around the viewport center, squeezed
	/// horizontally into each body's type band, with the per-type initial
	/// horizontal velocity.
	pub fn new(graph: &Graph, config: &GraphConfig, width: f64, height: f64) -> Self {
		let layout = config.layout.clone();
		let n = graph.len();
		let radius = 100.0_f64.max(n as f64 * layout.collision_radius / PI);

		let bodies = graph
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				let angle = (i as f64) * 2.0 * PI / n as f64;
				let column = config.palette.column(node.kind);
				let (lo, hi) = band(&layout, width, column);
				Body {
					x: ((lo + hi) / 2.0 + (hi - lo) / 2.0 * angle.cos()).clamp(lo, hi),
					y: height / 2.0 + radius * angle.sin(),
					vx: config.palette.initial_vx(node.kind),
					vy: 0.0,
					pin: Pin::Free,
					column,
					row: unit_hash(&node.id),
				}
			})
			.collect();

		let degrees = graph.degrees();
		let links = graph
			.edges
			.iter()
			.filter(|e| e.source_idx != e.target_idx)
			.map(|e| {
				let (ds, dt) = (degrees[e.source_idx] as f64, degrees[e.target_idx] as f64);
				Link {
					source: e.source_idx,
					target: e.target_idx,
					strength: layout.link_strength.unwrap_or(1.0 / ds.min(dt)),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		Self {
			bodies,
			links,
			config: layout,
			width,
			height,
			alpha: 1.0,
			ticks: 0,
			heat_ticks: 0,
		}
	}

	/// Bodies in node order.
	pub fn bodies(&self) -> &[Body] {
		&self.bodies
	}

	/// Body for node `idx`.
	pub fn body(&self, idx: usize) -> Option<&Body> {
		self.bodies.get(idx)
	}

	/// Current cooling factor.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Ticks run since creation.
	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	/// Viewport size the targets are computed against.
	pub fn viewport(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	/// Updates the viewport; positions and velocities are untouched.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Column target for node `idx`.
	pub fn target_x(&self, idx: usize) -> f64 {
		column_x(&self.config, self.width, self.bodies[idx].column)
	}

	/// Horizontal range a free node `idx` is kept in.
	pub fn band(&self, idx: usize) -> (f64, f64) {
		band(&self.config, self.width, self.bodies[idx].column)
	}

	/// Hashed row target for node `idx`.
	pub fn target_y(&self, idx: usize) -> f64 {
		self.height / 2.0 + (self.bodies[idx].row - 0.5) * self.config.jitter_span * self.height
	}

	/// Pins node `idx` at `at`. Returns false for an unknown index.
	pub fn pin(&mut self, idx: usize, at: Point) -> bool {
		let Some(body) = self.bodies.get_mut(idx) else {
			return false;
		};
		body.pin = Pin::Pinned(at);
		body.x = at.x;
		body.y = at.y;
		body.vx = 0.0;
		body.vy = 0.0;
		true
	}

	/// Releases node `idx` back into the simulation from where it stands.
	pub fn unpin(&mut self, idx: usize) -> bool {
		match self.bodies.get_mut(idx) {
			Some(body) if body.is_pinned() => {
				body.pin = Pin::Free;
				true
			}
			_ => false,
		}
	}

	/// Raises alpha so the layout responds to a change.
	pub fn reheat(&mut self) {
		self.alpha = self.alpha.max(self.config.reheat_alpha);
		self.heat_ticks = 0;
	}

	/// Mean kinetic energy of the free bodies.
	pub fn kinetic_energy(&self) -> f64 {
		let (sum, count) = self
			.bodies
			.iter()
			.filter(|b| !b.is_pinned())
			.fold((0.0, 0usize), |(sum, count), b| {
				(sum + 0.5 * (b.vx * b.vx + b.vy * b.vy), count + 1)
			});
		if count == 0 { 0.0 } else { sum / count as f64 }
	}

	/// True once cooled, calm, or out of ticks since the last (re)heat.
	pub fn is_settled(&self) -> bool {
		self.heat_ticks >= self.config.max_ticks
			|| self.alpha < self.config.alpha_min
			|| (self.heat_ticks > 0 && self.kinetic_energy() < self.config.energy_threshold)
	}

	/// Bounding box of all bodies.
	pub fn bounds(&self) -> Option<Bounds> {
		Bounds::of(self.bodies.iter().map(Body::position))
	}

	/// Runs ticks until settled or `limit` ticks have run; returns the count.
	pub fn run_until_settled(&mut self, limit: u32) -> u32 {
		let mut ran = 0;
		while ran < limit && !self.is_settled() {
			self.tick();
			ran += 1;
		}
		ran
	}

	/// Advances the simulation by one step.
	pub fn tick(&mut self) {
		self.alpha -= self.alpha * self.config.alpha_decay;

		let mut dv = vec![Point::default(); self.bodies.len()];
		self.repulsion(&mut dv);
		self.attraction(&mut dv);
		self.anchoring(&mut dv);

		let keep = 1.0 - self.config.velocity_decay;
		for (body, delta) in self.bodies.iter_mut().zip(&dv) {
			match body.pin {
				Pin::Pinned(at) => {
					body.x = at.x;
					body.y = at.y;
					body.vx = 0.0;
					body.vy = 0.0;
				}
				Pin::Free => {
					body.vx = (body.vx + delta.x) * keep;
					body.vy = (body.vy + delta.y) * keep;
					body.x += body.vx;
					body.y += body.vy;
				}
			}
		}

		self.separate();
		self.stratify();
		self.ticks += 1;
		self.heat_ticks = self.heat_ticks.saturating_add(1);
	}

	fn repulsion(&self, dv: &mut [Point]) {
		let max2 = self.config.repulsion_max_distance.powi(2);
		let strength = self.config.repulsion * self.alpha;
		for i in 0..self.bodies.len() {
			for j in (i + 1)..self.bodies.len() {
				let (a, b) = (&self.bodies[i], &self.bodies[j]);
				let (mut dx, mut dy) = (a.x - b.x, a.y - b.y);
				let mut d2 = dx * dx + dy * dy;
				if d2 > max2 {
					continue;
				}
				if d2 < 1e-12 {
					(dx, dy) = jiggle(i, j);
					d2 = dx * dx + dy * dy;
				}
				let w = strength / d2.max(1.0);
				dv[i].x += dx * w;
				dv[i].y += dy * w;
				dv[j].x -= dx * w;
				dv[j].y -= dy * w;
			}
		}
	}

	fn attraction(&self, dv: &mut [Point]) {
		for link in &self.links {
			let (s, t) = (&self.bodies[link.source], &self.bodies[link.target]);
			let (mut dx, mut dy) = (t.x - s.x, t.y - s.y);
			let mut len = (dx * dx + dy * dy).sqrt();
			if len < 1e-9 {
				(dx, dy) = jiggle(link.source, link.target);
				len = (dx * dx + dy * dy).sqrt();
			}
			let k = (len - self.config.link_distance) / len * self.alpha * link.strength;
			let (fx, fy) = (dx * k, dy * k);
			dv[link.target].x -= fx * link.bias;
			dv[link.target].y -= fy * link.bias;
			dv[link.source].x += fx * (1.0 - link.bias);
			dv[link.source].y += fy * (1.0 - link.bias);
		}
	}

	/// Centering, type column and hashed row pulls.
	fn anchoring(&self, dv: &mut [Point]) {
		let (cx, cy) = (self.width / 2.0, self.height / 2.0);
		let center = self.config.centering * self.alpha;
		let column = self.config.type_strength * self.alpha;
		let row = self.config.jitter_strength * self.alpha;
		for (i, body) in self.bodies.iter().enumerate() {
			if body.is_pinned() {
				continue;
			}
			dv[i].x += (cx - body.x) * center + (self.target_x(i) - body.x) * column;
			dv[i].y += (cy - body.y) * center + (self.target_y(i) - body.y) * row;
		}
	}

	/// Pushes overlapping pairs apart; a pinned body never moves and its
	/// partner takes the whole correction.
	fn separate(&mut self) {
		let min_dist = 2.0 * self.config.collision_radius;
		let n = self.bodies.len();
		for _ in 0..self.config.collision_iterations {
			let mut shift = vec![Point::default(); n];
			let mut overlapping = false;
			for i in 0..n {
				for j in (i + 1)..n {
					let (a, b) = (&self.bodies[i], &self.bodies[j]);
					let (wa, wb) = match (a.is_pinned(), b.is_pinned()) {
						(true, true) => continue,
						(true, false) => (0.0, 1.0),
						(false, true) => (1.0, 0.0),
						(false, false) => (0.5, 0.5),
					};
					let (mut dx, mut dy) = (b.x - a.x, b.y - a.y);
					let mut dist = (dx * dx + dy * dy).sqrt();
					if dist >= min_dist {
						continue;
					}
					if dist < 1e-9 {
						(dx, dy) = jiggle(i, j);
						dist = (dx * dx + dy * dy).sqrt();
					}
					overlapping = true;
					let push = (min_dist - dist) / dist;
					shift[i].x -= dx * push * wa;
					shift[i].y -= dy * push * wa;
					shift[j].x += dx * push * wb;
					shift[j].y += dy * push * wb;
				}
			}
			if !overlapping {
				break;
			}
			for (body, s) in self.bodies.iter_mut().zip(&shift) {
				if !body.is_pinned() {
					body.x += s.x;
					body.y += s.y;
				}
			}
		}
	}

	/// Clamps free bodies into their type band. Bands of neighbouring columns
	/// are at least one collision diameter apart.
	fn stratify(&mut self) {
		for body in &mut self.bodies {
			if body.is_pinned() {
				continue;
			}
			let (lo, hi) = band(&self.config, self.width, body.column);
			if body.x < lo || body.x > hi {
				body.x = body.x.clamp(lo, hi);
				body.vx = 0.0;
			}
		}
	}
}

fn column_x(config: &LayoutConfig, width: f64, column: f64) -> f64 {
	let margin = config.column_margin;
	width * (margin + (1.0 - 2.0 * margin) * column)
}

fn band(config: &LayoutConfig, width: f64, column: f64) -> (f64, f64) {
	let spacing = width * (1.0 - 2.0 * config.column_margin) / (NodeType::ORDERED.len() - 1) as f64;
	let half = ((spacing - 2.0 * config.collision_radius) / 2.0).max(0.0);
	let x = column_x(config, width, column);
	(x - half, x + half)
}

/// Deterministic unit direction for coincident bodies.
fn jiggle(i: usize, j: usize) -> (f64, f64) {
	let angle = ((i as f64) * 0.618_034 + (j as f64) * 0.414_214) * 2.0 * PI;
	(angle.cos() * 1e-3, angle.sin() * 1e-3)
}

/// FNV-1a 64-bit of `id`, mapped into [0, 1).
fn unit_hash(id: &str) -> f64 {
	let mut h: u64 = 0xcbf29ce484222325;
	for b in id.as_bytes() {
		h ^= *b as u64;
		h = h.wrapping_mul(0x100000001b3);
	}
	(h >> 11) as f64 / (1u64 << 53) as f64
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::graph::payload::RawPayload;

	const W: f64 = 800.0;
	const H: f64 = 600.0;

	fn graph(value: serde_json::Value) -> Graph {
		Graph::from_payload(&RawPayload::detect(&value), &GraphConfig::default())
	}

	fn two_farmers() -> Graph {
		graph(json!({
			"node": [
				{"v_id": "F1", "v_type": "Farmer"},
				{"v_id": "F2", "v_type": "Farmer"}
			],
			"edges": [{"from_id": "F1", "to_id": "F2", "e_type": "Has"}]
		}))
	}

	fn sample() -> Graph {
		let payload = RawPayload::from_json_str(include_str!("../../data/sample.json")).unwrap();
		Graph::from_payload(&payload, &GraphConfig::default())
	}

	#[test]
	fn empty_graph_is_a_valid_settled_scene() {
		let mut state = SimulationState::new(&Graph::default(), &GraphConfig::default(), W, H);
		state.tick();
		assert!(state.bodies().is_empty());
		assert!(state.is_settled());
		assert_eq!(state.bounds(), None);
		assert_eq!(state.kinetic_energy(), 0.0);
	}

	#[test]
	fn initial_velocity_follows_type_table() {
		let g = graph(json!({"node": [
			{"v_id": "F", "v_type": "Farmer"},
			{"v_id": "P", "v_type": "PMB"},
			{"v_id": "U", "v_type": "Silo"}
		]}));
		let state = SimulationState::new(&g, &GraphConfig::default(), W, H);
		let vx: Vec<f64> = state.bodies().iter().map(|b| b.vx).collect();
		assert!(vx[0] < 0.0);
		assert!(vx[1] > 0.0);
		assert_eq!(vx[2], 0.0);
	}

	#[test]
	fn pinned_body_stays_exactly_put_until_released() {
		let g = two_farmers();
		let mut state = SimulationState::new(&g, &GraphConfig::default(), W, H);
		assert!(state.pin(0, Point::new(100.0, 50.0)));
		for _ in 0..50 {
			state.tick();
		}
		assert_eq!(state.bodies()[0].position(), Point::new(100.0, 50.0));

		assert!(state.unpin(0));
		state.reheat();
		for _ in 0..50 {
			state.tick();
		}
		assert_ne!(state.bodies()[0].position(), Point::new(100.0, 50.0));
	}

	#[test]
	fn identical_runs_produce_identical_positions() {
		let g = sample();
		let mut a = SimulationState::new(&g, &GraphConfig::default(), W, H);
		let mut b = SimulationState::new(&g, &GraphConfig::default(), W, H);
		for _ in 0..120 {
			a.tick();
			b.tick();
		}
		assert_eq!(a.bodies(), b.bodies());
		assert_eq!(step(&a), {
			let mut c = a.clone();
			c.tick();
			c
		});
	}

	#[test]
	fn linked_farmers_settle_in_the_farmer_band() {
		let g = two_farmers();
		let mut state = SimulationState::new(&g, &GraphConfig::default(), W, H);
		state.run_until_settled(1000);
		assert!(state.is_settled());
		let target = state.target_x(0);
		for body in state.bodies() {
			assert!(body.x < W / 2.0, "farmer drifted right: {}", body.x);
			assert!((body.x - target).abs() < W * 0.2, "{} far from {target}", body.x);
		}
	}

	#[test]
	fn process_order_runs_left_to_right() {
		let g = sample();
		let mut state = SimulationState::new(&g, &GraphConfig::default(), W, H);
		state.run_until_settled(1000);
		let x = |id: &str| state.bodies()[g.index_of(id).unwrap()].x;
		assert!(x("F-GH-123") < x("BA_AGENT_TEST"));
		assert!(x("BA_AGENT_TEST") < x("1001~10000121~batch-abc"));
	}

	#[test]
	fn overlap_is_resolved_against_a_pinned_body() {
		let g = graph(json!({"node": [
			{"v_id": "A", "v_type": "Lot"},
			{"v_id": "B", "v_type": "Lot"}
		]}));
		let mut config = GraphConfig::default();
		config.layout.repulsion = 0.0;
		let mut state = SimulationState::new(&g, &config, W, H);
		state.pin(0, Point::new(380.0, 300.0));
		state.bodies[1].x = 380.0;
		state.bodies[1].y = 310.0;
		state.bodies[1].vx = 0.0;
		state.tick();
		let (a, b) = (&state.bodies()[0], &state.bodies()[1]);
		assert_eq!(a.position(), Point::new(400.0, 300.0));
		let dist = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
		assert!(dist >= 2.0 * 18.0 - 1e-9, "still overlapping at {dist}");
	}

	#[test]
	fn every_farmer_stays_left_of_a_busy_group() {
		for farmers in [20, 40, 60] {
			let nodes: Vec<_> = std::iter::once(json!({"v_id": "FG", "v_type": "Farmer_Group"}))
				.chain((0..farmers).map(|i| json!({"v_id": format!("F{i}"), "v_type": "Farmer"})))
				.collect();
			let edges: Vec<_> = (0..farmers)
				.map(|i| json!({"from_id": format!("F{i}"), "to_id": "FG", "e_type": "Has_Farmer_Group"}))
				.collect();
			let g = graph(json!({"node": nodes, "edges": edges}));
			let mut state = SimulationState::new(&g, &GraphConfig::default(), W, H);
			state.run_until_settled(2000);

			let group = state.bodies()[0].x;
			let (lo, hi) = state.band(0);
			assert!((lo..=hi).contains(&group), "group left its band: {group}");
			for (i, body) in state.bodies().iter().enumerate().skip(1) {
				assert!(body.x < group, "{farmers} farmers: F{} at {} >= group {group}", i - 1, body.x);
			}
		}
	}

	#[test]
	fn neighbouring_bands_do_not_touch() {
		let g = sample();
		let state = SimulationState::new(&g, &GraphConfig::default(), W, H);
		let farmer = state.band(g.index_of("F-GH-123").unwrap());
		let group = state.band(g.index_of("FG-GH-123").unwrap());
		assert!(group.0 - farmer.1 >= 2.0 * 18.0 - 1e-9);
		for (i, body) in state.bodies().iter().enumerate() {
			let (lo, hi) = state.band(i);
			assert!((lo..=hi).contains(&body.x));
		}
	}

	#[test]
	fn resize_moves_targets_not_bodies() {
		let g = sample();
		let mut state = SimulationState::new(&g, &GraphConfig::default(), W, H);
		let before = state.bodies().to_vec();
		let target = state.target_x(0);
		state.resize(W * 2.0, H);
		assert_eq!(state.bodies(), &before[..]);
		assert_eq!(state.target_x(0), target * 2.0);
	}

	#[test]
	fn row_targets_are_stable_per_id() {
		assert_eq!(unit_hash("F-GH-123"), unit_hash("F-GH-123"));
		assert_ne!(unit_hash("F1"), unit_hash("F2"));
		let u = unit_hash("anything");
		assert!((0.0..1.0).contains(&u));
	}

	#[test]
	fn reheat_restarts_a_settled_run() {
		let g = two_farmers();
		let mut state = SimulationState::new(&g, &GraphConfig::default(), W, H);
		state.run_until_settled(1000);
		state.reheat();
		assert!(!state.is_settled());
		assert!(state.alpha() >= 0.3);
	}
}
