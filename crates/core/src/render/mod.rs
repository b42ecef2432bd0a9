//! Frame composition.
//!
//! Each tick the [`FrameCompositor`] turns the active fireworks into a list
//! of backend-agnostic [`DrawCommand`]s. Two layers are involved: a
//! persistent trail that is faded a little every tick, and the frame that is
//! presented. The order is fixed: clear the frame, fade the trail, lay the
//! trail over the frame, draw the fireworks, then store the frame back into
//! the trail. Together with `trail_alpha` this order produces the streaks.

mod raster;

pub use raster::{Raster, SoftwareRenderer};

use crate::{
    color::Rgb,
    config::{CanvasConfig, FireworksConfig, RenderConfig, TrailBlend},
    firework::Firework,
    particle::Particle,
    random::RandomSource,
    Result,
};

/// Target of a layer-addressed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Trail,
    Frame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// One drawing operation. Any backend that can clear, blend a translucent
/// rectangle and fill a circle on two surfaces can consume these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Clear {
        layer: Layer,
        color: Rgb,
    },
    FillRect {
        layer: Layer,
        rect: Rect,
        color: Rgb,
        alpha: u8,
    },
    /// Opaque filled circle on the frame.
    FillCircle {
        x: i32,
        y: i32,
        radius: u32,
        color: Rgb,
    },
    /// Lay the trail layer over the frame using the trail's alpha.
    CompositeTrail,
    /// Write the frame back into the trail layer.
    StoreTrail {
        blend: TrailBlend,
    },
}

/// Rendering backend seam.
pub trait Renderer {
    fn render(&mut self, commands: &[DrawCommand]) -> Result<()>;
}

/// Builds the per-tick command list from the active fireworks.
pub struct FrameCompositor {
    style: RenderConfig,
    canvas: CanvasConfig,
    max_lifetime: u32,
    commands: Vec<DrawCommand>,
    rng: Box<dyn RandomSource>,
}

impl FrameCompositor {
    pub fn new(config: &FireworksConfig, rng: Box<dyn RandomSource>) -> Self {
        Self {
            style: config.render,
            canvas: config.canvas,
            max_lifetime: config.burst.lifetime.max,
            commands: Vec::new(),
            rng,
        }
    }

    /// Produces this tick's commands. The returned slice is valid until the
    /// next call.
    pub fn compose(&mut self, fireworks: &[Firework]) -> &[DrawCommand] {
        self.commands.clear();

        let full = Rect::new(0, 0, self.canvas.width, self.canvas.height);
        self.commands.push(DrawCommand::Clear {
            layer: Layer::Frame,
            color: self.style.background,
        });
        self.commands.push(DrawCommand::FillRect {
            layer: Layer::Trail,
            rect: full,
            color: self.style.background,
            alpha: self.style.trail_alpha,
        });
        self.commands.push(DrawCommand::CompositeTrail);

        for firework in fireworks {
            self.draw_firework(firework);
        }

        self.commands.push(DrawCommand::StoreTrail {
            blend: self.style.trail_blend,
        });
        &self.commands
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    fn draw_firework(&mut self, firework: &Firework) {
        if !firework.is_exploded() {
            let position = firework.rocket_position();
            self.commands.push(DrawCommand::FillCircle {
                x: position.x as i32,
                y: position.y as i32,
                radius: self.style.rocket_radius,
                color: self.style.rocket_color,
            });
            return;
        }

        for particle in firework.particles() {
            self.draw_particle(particle);
        }
    }

    fn draw_particle(&mut self, particle: &Particle) {
        let mut brightness = particle.brightness(self.max_lifetime);
        if self.style.flicker > 0.0 {
            brightness *= 1.0 - self.style.flicker + self.style.flicker * self.rng.next_unit();
        }
        let color = particle.color.scaled(brightness);
        let x = particle.position.x as i32;
        let y = particle.position.y as i32;

        if let Some(glow) = self.style.glow {
            if self.rng.chance(glow.probability) {
                let radius = ((particle.size * glow.radius_scale) as u32).max(glow.min_radius);
                self.commands.push(DrawCommand::FillCircle {
                    x,
                    y,
                    radius,
                    color: color.scaled(glow.brightness),
                });
            }
        }

        self.commands.push(DrawCommand::FillCircle {
            x,
            y,
            radius: (particle.size as u32).max(1),
            color,
        });
    }
}

impl std::fmt::Debug for FrameCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameCompositor")
            .field("style", &self.style)
            .field("canvas", &self.canvas)
            .field("max_lifetime", &self.max_lifetime)
            .field("commands", &self.commands.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::{
        color::Palette,
        config::{BurstPattern, GlowConfig, TickRange},
        random::{RngSource, ScriptedSource},
    };

    fn exploded_firework(config: &FireworksConfig) -> Firework {
        let mut firework = Firework::new(
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, -1.0),
            2000.0,
            Palette::new([Rgb(200, 100, 50); 6]),
        );
        firework.explode(&config.burst, &mut RngSource::seeded(11));
        firework
    }

    fn small_config() -> FireworksConfig {
        let mut config = FireworksConfig::recording().with_canvas(32, 32);
        config.burst.particle_count = 4;
        config.burst.pattern = BurstPattern::Ring;
        config.burst.lifetime = TickRange::new(10, 10);
        config.burst.speed = crate::config::SampleRange::new(0.0, 0.0);
        config
    }

    #[test]
    fn commands_follow_trail_order() {
        let config = small_config();
        let mut compositor = FrameCompositor::new(&config, Box::new(ScriptedSource::constant(0.5)));
        let commands = compositor.compose(&[]).to_vec();

        assert_eq!(commands.len(), 4);
        assert_eq!(
            commands[0],
            DrawCommand::Clear {
                layer: Layer::Frame,
                color: config.render.background
            }
        );
        assert!(matches!(
            commands[1],
            DrawCommand::FillRect {
                layer: Layer::Trail,
                alpha: 30,
                ..
            }
        ));
        assert_eq!(commands[2], DrawCommand::CompositeTrail);
        assert_eq!(
            commands[3],
            DrawCommand::StoreTrail {
                blend: TrailBlend::Replace
            }
        );
    }

    #[test]
    fn rocket_draws_as_a_single_dot() {
        let config = small_config();
        let mut compositor = FrameCompositor::new(&config, Box::new(ScriptedSource::constant(0.5)));
        let rocket = Firework::new(
            Vec2::new(5.7, 20.2),
            Vec2::new(0.0, -3.0),
            0.0,
            Palette::new([Rgb(1, 2, 3); 6]),
        );
        let commands = compositor.compose(std::slice::from_ref(&rocket)).to_vec();

        assert_eq!(
            commands[3],
            DrawCommand::FillCircle {
                x: 5,
                y: 20,
                radius: 3,
                color: Rgb(255, 240, 200)
            }
        );
    }

    #[test]
    fn particle_brightness_scales_with_lifetime() {
        let mut config = small_config();
        config.burst.lifetime = TickRange::new(5, 10);
        let mut firework = Firework::new(
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, -1.0),
            2000.0,
            Palette::new([Rgb(200, 100, 50); 6]),
        );
        // Lifetime draws land on 5 ticks.
        firework.explode(&config.burst, &mut ScriptedSource::constant(0.0));
        let mut compositor = FrameCompositor::new(&config, Box::new(ScriptedSource::constant(0.5)));
        let commands = compositor.compose(std::slice::from_ref(&firework)).to_vec();

        let circles: Vec<_> = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillCircle { .. }))
            .collect();
        assert_eq!(circles.len(), 4);
        for circle in circles {
            assert!(matches!(
                circle,
                DrawCommand::FillCircle {
                    color: Rgb(100, 50, 25),
                    radius: 1,
                    ..
                }
            ));
        }
    }

    #[test]
    fn glow_is_drawn_under_the_core() {
        let mut config = small_config();
        config.render.glow = Some(GlowConfig {
            probability: 1.0,
            brightness: 0.5,
            radius_scale: 2.0,
            min_radius: 2,
        });
        let firework = exploded_firework(&config);
        let mut compositor = FrameCompositor::new(&config, Box::new(ScriptedSource::constant(0.5)));
        let commands = compositor.compose(std::slice::from_ref(&firework)).to_vec();

        // clear, fade, composite, (glow, core) x 4, store
        assert_eq!(commands.len(), 3 + 8 + 1);
        for pair in commands[3..11].chunks(2) {
            match (pair[0], pair[1]) {
                (
                    DrawCommand::FillCircle {
                        radius: glow_radius,
                        color: glow_color,
                        ..
                    },
                    DrawCommand::FillCircle { radius, color, .. },
                ) => {
                    assert!(glow_radius > radius);
                    assert_eq!(glow_color, color.scaled(0.5));
                }
                other => panic!("unexpected commands {other:?}"),
            }
        }
    }

    #[test]
    fn flicker_only_dims() {
        let mut config = small_config();
        config.render.flicker = 0.15;
        let firework = exploded_firework(&config);
        let mut compositor = FrameCompositor::new(&config, Box::new(ScriptedSource::constant(0.0)));
        let commands = compositor.compose(std::slice::from_ref(&firework)).to_vec();

        for command in &commands[3..7] {
            match command {
                DrawCommand::FillCircle { color, .. } => {
                    // 0.85 of full brightness, give or take truncation.
                    assert!((169..=170).contains(&color.0), "{color:?}");
                    assert!((84..=85).contains(&color.1), "{color:?}");
                    assert!((42..=43).contains(&color.2), "{color:?}");
                }
                other => panic!("unexpected command {other:?}"),
            }
        }
    }

    #[test]
    fn static_frame_fades_out_of_the_trail() {
        let config = small_config();
        let mut compositor = FrameCompositor::new(&config, Box::new(ScriptedSource::constant(0.5)));
        let mut renderer = SoftwareRenderer::new(32, 32);

        let firework = exploded_firework(&config);
        renderer
            .render(compositor.compose(std::slice::from_ref(&firework)))
            .unwrap();
        let lit = renderer.frame().rgb(10, 10).unwrap();
        assert_eq!(lit, Rgb(200, 100, 50));

        let mut previous = lit;
        for _ in 0..300 {
            renderer.render(compositor.compose(&[])).unwrap();
            let current = renderer.frame().rgb(10, 10).unwrap();
            for (now, before) in current.channels().into_iter().zip(previous.channels()) {
                assert!(now <= before, "{current:?} brightened from {previous:?}");
            }
            previous = current;
        }
        assert_eq!(previous, config.render.background);
        assert_eq!(renderer.trail().rgb(10, 10), Some(config.render.background));
    }
}
