//! Orthographic PNG previews of generated yarns.
use std::path::Path;

use glam::{Vec2, Vec3};
use image::{Rgb, RgbImage};
use tracing::info;
use tracing_subscriber::EnvFilter;
use yarn_spin::prelude::{GeneratedYarn, MaterialSpec, StrandGraph};

/// Install a `fmt` subscriber; `RUST_LOG` overrides the default `yarn_spin=info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("yarn_spin=info,yarn_spin_examples=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Projection plane of the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Yarn axis horizontal, x vertical.
    Side,
    /// Looking down the yarn axis.
    Front,
}

impl View {
    fn project(self, v: Vec3) -> Vec2 {
        match self {
            View::Side => Vec2::new(v.z, v.x),
            View::Front => Vec2::new(v.x, v.y),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    pub background: [u8; 3],
    pub view: View,
    /// Empty border around the geometry, in pixels.
    pub margin: u32,
    /// Brightness added to flyaways so they stand out.
    pub flyaway_highlight: f32,
}

impl RenderConfig {
    pub fn new(image_size: (u32, u32)) -> Self {
        Self {
            image_size,
            background: [18, 18, 22],
            view: View::Side,
            margin: 16,
            flyaway_highlight: 0.25,
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn with_view(mut self, view: View) -> Self {
        self.view = view;
        self
    }
}

/// Render fibres and flyaways with the material's viewport color.
pub fn render_yarn_to_png(
    yarn: &GeneratedYarn,
    material: &MaterialSpec,
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let (w, h) = config.image_size;
    let mut img = RgbImage::from_pixel(w, h, Rgb(config.background));

    let flyaways = yarn.flyaways.to_graph();
    let Some((min, max)) = bounds([&yarn.yarn, &flyaways], config.view) else {
        img.save(path.as_ref())?;
        return Ok(());
    };

    let inner = Vec2::new(
        w.saturating_sub(2 * config.margin).max(1) as f32,
        h.saturating_sub(2 * config.margin).max(1) as f32,
    );
    let extent = (max - min).max(Vec2::splat(1e-6));
    let scale = (inner.x / extent.x).min(inner.y / extent.y);
    let offset = (Vec2::new(w as f32, h as f32) - extent * scale) * 0.5;
    let to_px = |p: Vec2| {
        let q = (p - min) * scale + offset;
        Vec2::new(q.x, h as f32 - q.y)
    };

    let base = to_srgb(material.viewport_color());
    let highlight = base.map(|c| (c + config.flyaway_highlight).min(1.0));
    draw_graph(&mut img, &yarn.yarn, config.view, &to_px, rgb(base));
    draw_graph(&mut img, &flyaways, config.view, &to_px, rgb(highlight));

    img.save(path.as_ref())?;
    info!("Wrote {}.", path.as_ref().display());
    Ok(())
}

fn bounds<'a>(
    graphs: impl IntoIterator<Item = &'a StrandGraph>,
    view: View,
) -> Option<(Vec2, Vec2)> {
    graphs
        .into_iter()
        .flat_map(|g| g.vertices.iter())
        .map(|&v| view.project(v))
        .fold(None, |acc, p| match acc {
            None => Some((p, p)),
            Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
        })
}

fn draw_graph(
    img: &mut RgbImage,
    graph: &StrandGraph,
    view: View,
    to_px: &impl Fn(Vec2) -> Vec2,
    color: Rgb<u8>,
) {
    for e in &graph.edges {
        let a = to_px(view.project(graph.vertices[e[0] as usize]));
        let b = to_px(view.project(graph.vertices[e[1] as usize]));
        draw_line(img, a, b, color);
    }
}

fn draw_line(img: &mut RgbImage, a: Vec2, b: Vec2, color: Rgb<u8>) {
    let steps = (b - a).abs().max_element().ceil().max(1.0) as u32;
    for i in 0..=steps {
        let p = a.lerp(b, i as f32 / steps as f32);
        let (x, y) = (p.x.round(), p.y.round());
        if x >= 0.0 && y >= 0.0 && (x as u32) < img.width() && (y as u32) < img.height() {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}

fn to_srgb(linear: [f32; 4]) -> [f32; 3] {
    [linear[0], linear[1], linear[2]].map(|c| c.clamp(0.0, 1.0).powf(1.0 / 2.2))
}

fn rgb(c: [f32; 3]) -> Rgb<u8> {
    Rgb(c.map(|v| (v * 255.0).round() as u8))
}
