//! The per-frame update/draw loop.
//!
//! [`Constellation`] owns all simulation state. The host calls
//! [`Constellation::resize`] on load and whenever the viewport changes, and
//! [`Constellation::tick`] once per animation frame. One tick is one frame:
//! motion is not scaled by elapsed time, and the wall clock only drives the
//! shooting-star spawn timer.

use crate::{
    canvas::Canvas,
    config::Config,
    dot::DotField,
    nebula::Nebula,
    phases,
    quadtree::{Point, Quadtree},
    render,
    star::{ShootingStar, StarEmitter},
    types::Viewport,
};
use rand::Rng;
use tracing::debug;

pub struct Constellation<R: Rng> {
    viewport: Viewport,
    cfg: Config,
    rng: R,
    field: DotField,
    emitter: StarEmitter,
    nebulae: Vec<Nebula>,
    index: Option<Quadtree>,
    scratch: Vec<Point>,
    ticks: u64,
}

impl<R: Rng> Constellation<R> {
    /// Sets up dots, nebulae and the star timer for `viewport`.
    pub fn new(viewport: Viewport, cfg: Config, mut rng: R, now_ms: f64) -> Self {
        let field = DotField::generate(viewport, &cfg.field, &mut rng);
        let nebulae = Nebula::spawn_all(viewport, &cfg.nebulae, &mut rng);
        let emitter = StarEmitter::new(now_ms, &cfg.stars);
        debug!(
            width = viewport.width,
            height = viewport.height,
            dots = field.len(),
            pulsars = field.pulsar_count(),
            "constellation set up"
        );

        Self {
            viewport,
            cfg,
            rng,
            field,
            emitter,
            nebulae,
            index: None,
            scratch: Vec::new(),
            ticks: 0,
        }
    }

    /// Discards every dot and nebula and regenerates them for `viewport`.
    ///
    /// The shooting star (if any) and the spawn timer carry over; a star
    /// outside the new viewport simply expires on its next advance.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.field = DotField::generate(viewport, &self.cfg.field, &mut self.rng);
        self.nebulae = Nebula::spawn_all(viewport, &self.cfg.nebulae, &mut self.rng);
        self.index = None;
        debug!(
            width = viewport.width,
            height = viewport.height,
            dots = self.field.len(),
            pulsars = self.field.pulsar_count(),
            "constellation regenerated"
        );
    }

    /// Advances the simulation one frame and draws it.
    pub fn tick(&mut self, now_ms: f64, canvas: &mut impl Canvas) {
        canvas.clear(self.viewport.width, self.viewport.height);
        self.update(now_ms);
        self.draw(canvas);
        self.spawn_if_due(now_ms);
    }

    /// [`Constellation::tick`] without drawing.
    pub fn step(&mut self, now_ms: f64) {
        self.update(now_ms);
        self.field.sort_by_depth();
        self.spawn_if_due(now_ms);
    }

    fn update(&mut self, now_ms: f64) {
        let vp = self.viewport;
        for nebula in &mut self.nebulae {
            nebula.drift(vp);
        }

        let index = phases::index_phase(&self.field, vp, &self.cfg.quadtree);
        if let Some(star) = self.emitter.active() {
            phases::star_impulse_phase(
                star,
                &mut self.field,
                &index,
                &self.cfg.stars,
                &mut self.scratch,
            );
        }
        phases::repulsion_phase(&mut self.field, &index, &self.cfg.field, &mut self.scratch);
        phases::integration_phase(&mut self.field, vp, &self.cfg.field);
        self.index = Some(index);

        self.emitter.advance(now_ms, vp, &self.cfg.stars, &mut self.rng);
        self.ticks += 1;
    }

    /// Draws back to front: nebulae, a far star, depth-sorted dots, a near
    /// star. Does not advance anything except the dot ordering.
    pub fn draw(&mut self, canvas: &mut impl Canvas) {
        for nebula in &self.nebulae {
            render::draw_nebula(canvas, nebula, &self.cfg.nebulae);
        }

        let star = self.emitter.active().copied();
        let near = star.is_some_and(|s| s.is_near(&self.cfg.stars));
        if let Some(s) = star.filter(|_| !near) {
            render::draw_star(canvas, &s, &self.cfg.stars);
        }

        self.field.sort_by_depth();
        for dot in &self.field.dots {
            render::draw_dot(canvas, dot);
        }

        if let Some(s) = star.filter(|_| near) {
            render::draw_star(canvas, &s, &self.cfg.stars);
        }
    }

    fn spawn_if_due(&mut self, now_ms: f64) {
        self.emitter
            .try_spawn(now_ms, self.viewport, &self.cfg.stars, &mut self.rng);
    }

    /// Launches a random shooting star right away, replacing any active one.
    pub fn launch_random_star(&mut self) {
        let star = ShootingStar::random(self.viewport, &self.cfg.stars, &mut self.rng);
        self.emitter.launch(star);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn field(&self) -> &DotField {
        &self.field
    }

    pub fn emitter(&self) -> &StarEmitter {
        &self.emitter
    }

    /// Gives direct access to the emitter, e.g. to launch a specific star.
    pub fn emitter_mut(&mut self) -> &mut StarEmitter {
        &mut self.emitter
    }

    pub fn nebulae(&self) -> &[Nebula] {
        &self.nebulae
    }

    /// The quadtree built during the last tick, if one ran since setup.
    ///
    /// Only the node geometry and the point count stay meaningful after the
    /// tick returns. The stored positions predate integration, and the
    /// stored ids predate the depth sort, so they no longer name the same
    /// dots in [`Constellation::field`].
    pub fn index(&self) -> Option<&Quadtree> {
        self.index.as_ref()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
