//! Pointer handling, selection and the frame loop around the simulation.

use std::collections::{HashSet, VecDeque};

use log::{debug, info};

use super::camera::{CameraTween, ViewTransform};
use super::config::GraphConfig;
use super::model::Graph;
use super::scene::{NodeDetail, Scene};
use super::simulation::{Point, SimulationState};

/// Drawn node radius in graph units.
pub const NODE_RADIUS: f64 = 8.0;

/// What the primary button is currently doing.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
	/// No button held.
	#[default]
	Idle,
	/// Button held, not yet moved past the drag threshold.
	Pressed {
		/// Node under the pointer at press time.
		node: Option<usize>,
		/// Screen position of the press.
		start: (f64, f64),
	},
	/// A node is being dragged.
	Dragging {
		/// Dragged node.
		node: usize,
		/// Screen position of the press.
		start: (f64, f64),
		/// Graph position of the node at press time.
		node_start: Point,
	},
	/// The background is being dragged.
	Panning {
		/// Screen position of the press.
		start: (f64, f64),
		/// Transform at press time.
		transform_start: ViewTransform,
	},
}

/// Hovered node, its neighbours, and the fade of the previous highlight.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<usize>,
	pub neighbors: HashSet<usize>,
	pub highlight_t: f64,
	pub prev_node: Option<usize>,
	pub prev_neighbors: HashSet<usize>,
	delay_t: f64,
}

/// Simulation mutations requested by input; applied at the start of the next tick.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Command {
	Pin { node: usize, at: Point },
	Release { node: usize },
}

/// The live graph instance together with its view and input state.
pub struct SupplyGraphState {
	pub graph: Graph,
	pub sim: SimulationState,
	pub transform: ViewTransform,
	pub gesture: Gesture,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
	config: GraphConfig,
	clicked: Option<usize>,
	camera: Option<CameraTween>,
	pending: VecDeque<Command>,
	fitted: bool,
}

impl SupplyGraphState {
	/// Starts a fresh simulation for `graph` in a `width` x `height` viewport.
	pub fn new(graph: Graph, config: GraphConfig, width: f64, height: f64) -> Self {
		let sim = SimulationState::new(&graph, &config, width, height);
		info!(
			"loaded graph with {} nodes and {} edges",
			graph.len(),
			graph.edges.len()
		);
		Self {
			graph,
			sim,
			transform: ViewTransform::default(),
			gesture: Gesture::default(),
			hover: HoverState::default(),
			width,
			height,
			flow_time: 0.0,
			config,
			clicked: None,
			camera: None,
			pending: VecDeque::new(),
			fitted: false,
		}
	}

	/// Replaces the displayed graph, discarding pins, selection and layout.
	pub fn load(&mut self, graph: Graph) {
		*self = Self::new(graph, self.config.clone(), self.width, self.height);
	}

	/// Zero means an empty dataset, not a pending one.
	pub fn node_count(&self) -> usize {
		self.graph.len()
	}

	/// True once the settle-then-fit step has happened.
	pub fn is_fitted(&self) -> bool {
		self.fitted
	}

	/// Screen pixel to graph coordinates under the current transform.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		self.transform.screen_to_graph(sx, sy)
	}

	/// Closest node within the hit radius of a screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let p = self.screen_to_graph(sx, sy);
		let hit = self.config.layout.hit_radius;
		self.sim
			.bodies()
			.iter()
			.enumerate()
			.map(|(i, b)| (i, (b.x - p.x).hypot(b.y - p.y)))
			.filter(|&(_, d)| d < hit)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(i, _)| i)
	}

	/// Primary button pressed at a screen point.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		let node = self.node_at_position(sx, sy);
		self.gesture = Gesture::Pressed {
			node,
			start: (sx, sy),
		};
	}

	/// Pointer moved: hover when idle, otherwise continue the gesture.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		match self.gesture.clone() {
			Gesture::Idle => {
				let hovered = self.node_at_position(sx, sy);
				self.set_hover(hovered);
			}
			Gesture::Pressed { node, start } => {
				let moved = (sx - start.0).hypot(sy - start.1);
				if moved < self.config.layout.drag_threshold {
					return;
				}
				self.gesture = match node {
					Some(node) => {
						let node_start = self.sim.bodies()[node].position();
						self.pending.push_back(Command::Pin {
							node,
							at: node_start,
						});
						debug!("drag start on {:?}", self.graph.nodes[node].id);
						Gesture::Dragging {
							node,
							start,
							node_start,
						}
					}
					None => {
						self.camera = None;
						Gesture::Panning {
							start,
							transform_start: self.transform,
						}
					}
				};
				self.pointer_move(sx, sy);
			}
			Gesture::Dragging {
				node,
				start,
				node_start,
			} => {
				let k = self.transform.k;
				let at = Point::new(
					node_start.x + (sx - start.0) / k,
					node_start.y + (sy - start.1) / k,
				);
				self.pending.push_back(Command::Pin { node, at });
			}
			Gesture::Panning {
				start,
				transform_start,
			} => {
				self.transform.x = transform_start.x + (sx - start.0);
				self.transform.y = transform_start.y + (sy - start.1);
			}
		}
	}

	/// Ends the current gesture. A press that never became a drag is a click.
	pub fn pointer_up(&mut self) {
		if let Gesture::Pressed {
			node: Some(node), ..
		} = self.gesture
		{
			self.click(node);
		}
		// A finished drag leaves the node pinned where it was dropped.
		self.gesture = Gesture::Idle;
	}

	/// Pointer left the canvas: abandons the gesture and the hover.
	pub fn pointer_leave(&mut self) {
		self.gesture = Gesture::Idle;
		self.set_hover(None);
	}

	/// Secondary action: releases the pin of the node under the pointer.
	pub fn release_at(&mut self, sx: f64, sy: f64) -> bool {
		match self.node_at_position(sx, sy) {
			Some(node) => self.release(node),
			None => false,
		}
	}

	/// Queues a pin of `node` at `at`.
	pub fn pin(&mut self, node: usize, at: Point) -> bool {
		if node >= self.graph.len() {
			return false;
		}
		self.pending.push_back(Command::Pin { node, at });
		true
	}

	/// Queues a release of `node`.
	pub fn release(&mut self, node: usize) -> bool {
		if node >= self.graph.len() {
			return false;
		}
		self.pending.push_back(Command::Release { node });
		true
	}

	/// Zooms around the pointer.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.camera = None;
		self.transform = self.transform.zoom_at(sx, sy, factor);
	}

	/// Selects `node` and animates the camera onto it.
	pub fn click(&mut self, node: usize) {
		let Some(body) = self.sim.body(node) else {
			return;
		};
		self.clicked = Some(node);
		let to = ViewTransform::centered_on(
			body.position(),
			self.config.layout.focus_zoom,
			self.width,
			self.height,
		);
		self.camera = Some(CameraTween::new(
			self.transform,
			to,
			self.config.layout.camera_duration,
		));
	}

	/// Forgets the clicked node.
	pub fn clear_selection(&mut self) {
		self.clicked = None;
	}

	/// Hovered node if any, otherwise the last clicked one.
	pub fn selected(&self) -> Option<usize> {
		self.hover.node.or(self.clicked)
	}

	/// Detail panel content for [`SupplyGraphState::selected`].
	pub fn selected_detail(&self) -> Option<NodeDetail> {
		self.selected().map(|i| NodeDetail::of(&self.graph.nodes[i]))
	}

	/// Moves the hover highlight to `node` and its neighbours.
	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Keep the outgoing highlight around while it fades
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			self.hover.neighbors.extend(self.graph.neighbors(idx));
		}
	}

	/// CSS cursor for the canvas: grabbing while a drag or pan is underway,
	/// a pointer over a node, otherwise grab.
	pub fn cursor(&self) -> &'static str {
		match self.gesture {
			Gesture::Dragging { .. } | Gesture::Panning { .. } => "grabbing",
			_ if self.hover.node.is_some() => "pointer",
			_ => "grab",
		}
	}

	/// Hovered node or a neighbour, including a fading previous hover.
	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: usize) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	/// Drawable snapshot of the current frame.
	pub fn scene(&self) -> Scene {
		Scene::capture(&self.graph, &self.sim)
	}

	fn apply_pending(&mut self) {
		while let Some(command) = self.pending.pop_front() {
			match command {
				Command::Pin { node, at } => {
					self.sim.pin(node, at);
				}
				Command::Release { node } => {
					if self.sim.unpin(node) {
						debug!("released {:?}", self.graph.nodes[node].id);
					}
				}
			}
			self.sim.reheat();
		}
	}

	/// One animation frame: input first, then physics, then view animation.
	pub fn tick(&mut self, dt: f64) {
		self.apply_pending();
		if !self.sim.is_settled() {
			self.sim.tick();
		} else if !self.fitted {
			self.fit_to_view();
		}

		if let Some(camera) = self.camera.as_mut() {
			self.transform = camera.advance(dt);
		}
		if self.camera.as_ref().is_some_and(CameraTween::is_done) {
			self.camera = None;
		}

		self.flow_time += dt;
		self.animate_highlight(dt);
	}

	/// Auto-fit after settling; happens once per loaded graph.
	fn fit_to_view(&mut self) {
		self.fitted = true;
		info!("layout settled after {} ticks", self.sim.ticks());
		let Some(bounds) = self.sim.bounds() else {
			return;
		};
		let layout = &self.config.layout;
		let to = ViewTransform::fit(
			&bounds,
			self.width,
			self.height,
			layout.fit_margin + NODE_RADIUS,
			layout.fit_zoom_out,
		);
		self.camera = Some(CameraTween::new(self.transform, to, layout.camera_duration));
	}

	fn animate_highlight(&mut self, dt: f64) {
		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	/// Recomputes width-relative targets; positions and velocities are kept.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.sim.resize(width, height);
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::graph::payload::RawPayload;

	const DT: f64 = 0.016;

	fn state(value: serde_json::Value) -> SupplyGraphState {
		let config = GraphConfig::default();
		let graph = Graph::from_payload(&RawPayload::detect(&value), &config);
		SupplyGraphState::new(graph, config, 800.0, 600.0)
	}

	fn farmers() -> SupplyGraphState {
		state(json!({
			"node": [
				{"v_id": "F1", "v_type": "Farmer", "attributes": {"name": "Jane", "certified": true}},
				{"v_id": "F2", "v_type": "Farmer"}
			],
			"edges": [{"from_id": "F1", "to_id": "F2", "e_type": "Has"}]
		}))
	}

	fn screen_of(s: &SupplyGraphState, node: usize) -> (f64, f64) {
		s.transform.graph_to_screen(s.sim.bodies()[node].position())
	}

	#[test]
	fn pin_holds_until_release() {
		let mut s = farmers();
		assert!(s.pin(0, Point::new(100.0, 50.0)));
		for _ in 0..50 {
			s.tick(DT);
		}
		assert_eq!(s.sim.bodies()[0].position(), Point::new(100.0, 50.0));

		assert!(s.release(0));
		for _ in 0..50 {
			s.tick(DT);
		}
		assert!(!s.sim.bodies()[0].is_pinned());
		assert_ne!(s.sim.bodies()[0].position(), Point::new(100.0, 50.0));
	}

	#[test]
	fn commands_wait_for_the_next_tick() {
		let mut s = farmers();
		let before = s.sim.bodies()[0].position();
		s.pin(0, Point::new(10.0, 10.0));
		assert_eq!(s.sim.bodies()[0].position(), before);
		s.tick(DT);
		assert_eq!(s.sim.bodies()[0].position(), Point::new(10.0, 10.0));
	}

	#[test]
	fn drag_pins_at_drop_point() {
		let mut s = farmers();
		let (x, y) = screen_of(&s, 1);
		s.pointer_down(x, y);
		s.pointer_move(x + 1.0, y);
		assert!(matches!(s.gesture, Gesture::Pressed { node: Some(1), .. }));
		s.pointer_move(x + 40.0, y + 20.0);
		s.pointer_up();
		s.tick(DT);

		let body = &s.sim.bodies()[1];
		assert!(body.is_pinned());
		let expected = s.screen_to_graph(x + 40.0, y + 20.0);
		assert!((body.x - expected.x).abs() < 1e-9 && (body.y - expected.y).abs() < 1e-9);
		for _ in 0..20 {
			s.tick(DT);
		}
		assert_eq!(s.sim.bodies()[1].position(), Point::new(expected.x, expected.y));
		assert_eq!(s.selected(), None);
	}

	#[test]
	fn secondary_action_releases_pin() {
		let mut s = farmers();
		s.pin(0, Point::new(200.0, 200.0));
		s.tick(DT);
		let (x, y) = screen_of(&s, 0);
		assert!(s.release_at(x, y));
		s.tick(DT);
		assert!(!s.sim.bodies()[0].is_pinned());
		assert!(!s.release_at(-5000.0, -5000.0));
	}

	#[test]
	fn click_selects_and_focuses() {
		let mut s = farmers();
		let (x, y) = screen_of(&s, 0);
		s.pointer_down(x, y);
		s.pointer_up();
		assert_eq!(s.selected(), Some(0));
		assert!(!s.sim.bodies()[0].is_pinned());
		let detail = s.selected_detail().unwrap();
		assert_eq!(detail.id, "F1");
		assert!(detail.rows.contains(&("certified".to_string(), "✓".to_string())));

		for _ in 0..120 {
			s.tick(DT);
		}
		assert!(s.transform.k > 1.0);
	}

	#[test]
	fn hover_selection_clears_on_leave_but_click_sticks() {
		let mut s = farmers();
		s.set_hover(Some(1));
		assert_eq!(s.selected(), Some(1));
		assert!(s.is_highlighted(0));
		s.set_hover(None);
		assert_eq!(s.selected(), None);

		s.click(0);
		s.set_hover(Some(1));
		assert_eq!(s.selected(), Some(1));
		s.pointer_leave();
		assert_eq!(s.selected(), Some(0));
		s.clear_selection();
		assert_eq!(s.selected(), None);
	}

	#[test]
	fn cursor_follows_hover_and_gestures() {
		let mut s = farmers();
		assert_eq!(s.cursor(), "grab");
		let (x, y) = screen_of(&s, 0);
		s.pointer_move(x, y);
		assert_eq!(s.cursor(), "pointer");
		s.pointer_move(-5000.0, -5000.0);
		assert_eq!(s.cursor(), "grab");

		s.pointer_down(5.0, 5.0);
		s.pointer_move(55.0, 25.0);
		assert_eq!(s.cursor(), "grabbing");
		s.pointer_up();
		assert_eq!(s.cursor(), "grab");
	}

	#[test]
	fn background_drag_pans() {
		let mut s = farmers();
		s.pointer_down(5.0, 5.0);
		s.pointer_move(55.0, 25.0);
		assert!(matches!(s.gesture, Gesture::Panning { .. }));
		assert_eq!((s.transform.x, s.transform.y), (50.0, 20.0));
		s.pointer_up();
		assert_eq!(s.gesture, Gesture::Idle);
	}

	#[test]
	fn settles_then_fits_once() {
		let mut s = farmers();
		for _ in 0..2000 {
			s.tick(DT);
			if s.is_fitted() {
				break;
			}
		}
		assert!(s.is_fitted());
		for _ in 0..200 {
			s.tick(DT);
		}
		let bounds = s.sim.bounds().unwrap();
		for p in [
			Point::new(bounds.min_x, bounds.min_y),
			Point::new(bounds.max_x, bounds.max_y),
		] {
			let (sx, sy) = s.transform.graph_to_screen(p);
			assert!((0.0..=800.0).contains(&sx) && (0.0..=600.0).contains(&sy));
		}
	}

	#[test]
	fn empty_graph_reports_zero_nodes_and_ticks_safely() {
		let mut s = state(json!([]));
		assert_eq!(s.node_count(), 0);
		for _ in 0..5 {
			s.tick(DT);
		}
		assert!(s.is_fitted());
		assert!(s.scene().nodes.is_empty());
		assert_eq!(s.node_at_position(400.0, 300.0), None);
	}

	#[test]
	fn load_resets_interaction_state() {
		let mut s = farmers();
		s.pin(0, Point::new(1.0, 1.0));
		s.click(1);
		s.tick(DT);
		s.resize(1024.0, 768.0);
		let config = GraphConfig::default();
		let value = json!({"node": [{"v_id": "L", "v_type": "Lot"}]});
		s.load(Graph::from_payload(&RawPayload::detect(&value), &config));
		assert_eq!(s.node_count(), 1);
		assert_eq!(s.selected(), None);
		assert!(!s.sim.bodies()[0].is_pinned());
		assert_eq!(s.sim.viewport(), (1024.0, 768.0));
	}
}
