//! Turning a traced scene into an image
use std::path::Path;
use std::time::Instant;

use image::RgbImage;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rayon::prelude::*;

use crate::{cameras::Camera, error::Result, tracer::RayTracer, utils, Color};

/// Trace one ray through the center of every pixel
///
/// Pixels are traced in parallel. Colors are clamped to `[0, 1]` per channel
/// with no gamma applied.
pub fn render(
    camera: &Camera,
    tracer: &RayTracer<'_>,
    width: u32,
    height: u32,
) -> Result<RgbImage> {
    info!(
        "Rendering {}x{} on {} threads",
        width,
        height,
        rayon::current_num_threads()
    );
    let start = Instant::now();

    let bar = ProgressBar::new(u64::from(width) * u64::from(height));
    if let Ok(style) = ProgressStyle::default_bar().template("{bar:40} {pos}/{len} ETA: {eta}") {
        bar.set_style(style);
    }

    let mut img = RgbImage::new(width, height);
    img.enumerate_pixels_mut()
        .par_bridge()
        .try_for_each(|(j, i, pixel)| -> Result<()> {
            let ray = camera.construct_ray(width, height, j, i)?;
            *pixel = utils::get_pixel(&tracer.trace_ray(&ray));
            bar.inc(1);
            Ok(())
        })?;
    bar.finish_and_clear();

    info!("Rendered in {:.2?}", start.elapsed());
    Ok(img)
}

/// Paint every `interval`-th row and column, for lining up a view
pub fn draw_grid(img: &mut RgbImage, interval: u32, color: &Color) {
    if interval == 0 {
        return;
    }
    let pixel = utils::get_pixel(color);
    for (j, i, p) in img.enumerate_pixels_mut() {
        if j % interval == 0 || i % interval == 0 {
            *p = pixel;
        }
    }
}

/// Save the image, the format follows the file extension
pub fn write_image(img: &RgbImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    img.save(path)?;
    info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lights::AmbientLight, objects::Sphere, scene::Scene, Point, Vec3};
    use image::Rgb;

    #[test]
    fn sphere_in_the_middle() {
        let mut scene = Scene::new("dot")
            .with_background(Color::new(0.0, 0.0, 1.0))
            .with_ambient(AmbientLight::new(Color::repeat(1.0), Vec3::new(0.5, 0.0, 0.0)));
        scene.add_geometry(Box::new(Sphere::new(Point::new(0.0, 0.0, -10.0), 1.0).unwrap()));
        let camera = Camera::new(
            Point::zeros(),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 1.0, 0.0),
        )
        .unwrap()
        .with_vp_size(3.0, 3.0)
        .unwrap()
        .with_vp_distance(1.0)
        .unwrap();

        let img = render(&camera, &RayTracer::new(&scene), 3, 3).unwrap();
        assert_eq!(img.dimensions(), (3, 3));
        assert_eq!(*img.get_pixel(1, 1), Rgb([128, 0, 0]));
        assert_eq!(*img.get_pixel(0, 0), Rgb([0, 0, 255]));
        assert_eq!(*img.get_pixel(2, 1), Rgb([0, 0, 255]));
    }

    #[test]
    fn grid_lines_every_interval() {
        let mut img = RgbImage::new(5, 5);
        draw_grid(&mut img, 2, &Color::new(1.0, 1.0, 0.0));
        let line = Rgb([255, 255, 0]);
        assert_eq!(*img.get_pixel(0, 3), line);
        assert_eq!(*img.get_pixel(3, 2), line);
        assert_eq!(*img.get_pixel(4, 4), line);
        assert_eq!(*img.get_pixel(1, 1), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(3, 3), Rgb([0, 0, 0]));

        let mut blank = RgbImage::new(3, 3);
        draw_grid(&mut blank, 0, &Color::repeat(1.0));
        assert!(blank.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }
}
