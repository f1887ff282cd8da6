//! Desktop host for the starfield, built with eframe/egui.
//!
//! This module defines [`StarfieldApp`], which owns a [`Constellation`] and
//! implements [`eframe::App`] to drive one simulation tick per repaint and
//! draw it through [`EguiCanvas`].

use crate::painter::EguiCanvas;
use eframe::App;
use rand::{SeedableRng, rngs::StdRng};
use starfield_core::{Config, Constellation, Viewport, canvas::Canvas, star::SpeedTier};
use tracing::info;

const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(5, 6, 18);

/// Main application state for the starfield window.
///
/// ### Fields
/// - `sim` - The simulation, regenerated on resize and on reseed.
/// - `cfg` - Configuration every new simulation is built from.
/// - `seed` - Seed of the current simulation's RNG (shown in the UI).
/// - `running` - Whether ticks advance the simulation or only redraw it.
/// - `show_quadtree` - Overlay the last frame's quadtree node boundaries.
/// - `canvas_size` - Size the simulation was last set up for.
/// - `last_frame_time` / `last_frame_dt` - For the status bar.
pub struct StarfieldApp {
    sim: Constellation<StdRng>,
    cfg: Config,
    seed: u64,

    running: bool,
    show_quadtree: bool,

    canvas_size: egui::Vec2,
    last_frame_time: f64,
    last_frame_dt: f64,
}

impl StarfieldApp {
    /// Creates the app with a simulation sized for `initial`.
    ///
    /// The first frame resizes the simulation to the real canvas area.
    pub fn new(cfg: Config, seed: u64, initial: Viewport) -> Self {
        let rng = StdRng::seed_from_u64(seed);
        let sim = Constellation::new(initial, cfg.clone(), rng, 0.0);
        Self {
            sim,
            cfg,
            seed,
            running: true,
            show_quadtree: false,
            canvas_size: egui::vec2(initial.width, initial.height),
            last_frame_time: 0.0,
            last_frame_dt: 0.0,
        }
    }

    /// Restarts with a new random seed, keeping the current canvas size.
    fn reseed(&mut self, now_ms: f64) {
        self.seed = rand::random();
        info!(seed = self.seed, "reseeded");
        let vp = self.sim.viewport();
        let rng = StdRng::seed_from_u64(self.seed);
        self.sim = Constellation::new(vp, self.cfg.clone(), rng, now_ms);
    }

    /// Regenerates the simulation if the canvas changed size.
    ///
    /// ### Returns
    /// `true` if a resize happened.
    fn sync_viewport(&mut self, size: egui::Vec2) -> bool {
        if size == self.canvas_size && self.sim.viewport() == Viewport::new(size.x, size.y) {
            return false;
        }
        self.canvas_size = size;
        self.sim.resize(Viewport::new(size.x, size.y));
        true
    }

    fn star_label(&self) -> String {
        match self.sim.emitter().active() {
            None => "idle".to_owned(),
            Some(star) => {
                let tier = match star.tier {
                    SpeedTier::Regular => "regular",
                    SpeedTier::Fast => "fast",
                    SpeedTier::Hypervelocity => "hypervelocity",
                };
                format!("{tier} (z = {:.2})", star.z)
            }
        }
    }

    /// Builds the top panel UI (run controls, reseed, overlays).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                if ui.button("☄ Shoot").clicked() {
                    self.sim.launch_random_star();
                }

                if ui.button("Reseed").clicked() {
                    let now = ctx.input(|i| i.time) * 1000.0;
                    self.reseed(now);
                }

                ui.separator();
                ui.checkbox(&mut self.show_quadtree, "Quadtree");
                ui.label(format!("seed = {}", self.seed));
            });
        });
    }

    /// Builds the bottom status bar (counts, star state, frame time).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        let stats = self.sim.emitter().stats();
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("frame = {:.1} ms", self.last_frame_dt * 1000.0));
                ui.separator();
                ui.label(format!(
                    "stars: {} regular / {} fast / {} hyper, {} expired",
                    stats.regular, stats.fast, stats.hypervelocity, stats.expired
                ));
                ui.label(format!("star = {}", self.star_label()));
                ui.separator();
                ui.label(format!("pulsars = {}", self.sim.field().pulsar_count()));
                ui.label(format!("dots = {}", self.sim.field().len()));
            });
        });
    }

    /// Draws the quadtree node boundaries of the last tick.
    fn ui_quadtree_overlay(&self, painter: &egui::Painter, rect: egui::Rect) {
        let Some(tree) = self.sim.index() else {
            return;
        };
        let color = egui::Color32::from_rgba_unmultiplied(80, 160, 255, 60);
        let stroke = egui::Stroke::new(0.5, color);
        for node in tree.boundaries() {
            let (min, max) = (node.min(), node.max());
            let corners = [
                rect.min + egui::vec2(min.x, min.y),
                rect.min + egui::vec2(max.x, min.y),
                rect.min + egui::vec2(max.x, max.y),
                rect.min + egui::vec2(min.x, max.y),
            ];
            painter.add(egui::Shape::closed_line(corners.to_vec(), stroke));
        }
    }

    /// Builds the central panel, where the starfield is ticked and drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = ui.available_rect_before_wrap();
                self.sync_viewport(rect.size());

                let painter = ui.painter_at(rect);
                let now = ctx.input(|i| i.time);
                if self.last_frame_time > 0.0 {
                    self.last_frame_dt = now - self.last_frame_time;
                }
                self.last_frame_time = now;

                let mut canvas = EguiCanvas::new(&painter, rect.min, BACKGROUND);
                if self.running {
                    self.sim.tick(now * 1000.0, &mut canvas);
                } else {
                    let vp = self.sim.viewport();
                    canvas.clear(vp.width, vp.height);
                    self.sim.draw(&mut canvas);
                }

                if self.show_quadtree {
                    self.ui_quadtree_overlay(&painter, rect);
                }
            });

        ctx.request_repaint();
    }
}

impl App for StarfieldApp {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_central_panel(ctx);
    }
}
