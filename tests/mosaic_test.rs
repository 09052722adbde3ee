//! Integration tests: composite synthetic images onto the spherical canvas and
//! check the blending properties (weighted averaging, idempotence, order
//! independence) end to end, plus the align → chain → blend pipeline.

use nalgebra::Rotation3;
use panostitch::{
    align_image_pair, build_mosaic, positions_from_chain, AlignConfig, BlendConfig, Feature,
    FeatureMatch, ImagePosition, PixelImage, Projector, Shape, SkipReason, Transform, Vector3,
};

/// Textured test image: smooth color ramps so bilinear sampling is exact-ish.
fn ramp_image(w: u32, h: u32, tint: f32) -> PixelImage {
    let mut img = PixelImage::new(Shape::new(w, h, 4));
    for y in 0..h {
        for x in 0..w {
            img.pixel_mut(x, y).copy_from_slice(&[
                tint + 2.0 * x as f32,
                100.0 + y as f32,
                255.0 - tint - x as f32 - y as f32,
                255.0,
            ]);
        }
    }
    img
}

/// Pose of a camera yawed by `deg` in the mosaic frame.
fn camera_yaw(deg: f64) -> Transform {
    Transform::from_rotation(&Rotation3::from_axis_angle(
        &Vector3::y_axis(),
        -deg.to_radians(),
    ))
}

fn assert_images_close(a: &PixelImage, b: &PixelImage, tol: f32) {
    assert_eq!(a.shape(), b.shape());
    let worst = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0f32, f32::max);
    assert!(worst <= tol, "images differ by up to {}", worst);
}

#[test]
fn test_identical_copies_reproduce_single_image() {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let config = BlendConfig::new(40.0, 30.0);
    let img = ramp_image(48, 40, 20.0);
    let single = build_mosaic(
        &[ImagePosition::new(img.clone(), camera_yaw(15.0))],
        &config,
    )
    .unwrap();
    assert_eq!(
        (single.image.width(), single.image.height()),
        (251, 126)
    );
    assert!(single.coverage > 0.0);

    for k in [2, 3, 7] {
        let copies: Vec<_> = (0..k)
            .map(|_| ImagePosition::new(img.clone(), camera_yaw(15.0)))
            .collect();
        let result = build_mosaic(&copies, &config).unwrap();
        assert_eq!(result.included.len(), k);
        assert_eq!(result.coverage, single.coverage);
        assert_images_close(&result.image, &single.image, 1e-3);
    }
}

#[test]
fn test_single_image_colors_survive_blending() {
    // One image: normalization divides out the mask, leaving the sampled colors
    let f = 50.0;
    let img = ramp_image(60, 60, 0.0);
    let result = build_mosaic(
        &[ImagePosition::new(img.clone(), Transform::identity())],
        &BlendConfig::new(f, 40.0),
    )
    .unwrap();

    // Canvas center looks straight down the optical axis
    let (cx, cy) = (result.image.width() / 2, result.image.height() / 2);
    let proj = Projector::new(f, 60, 60);
    let theta = (cx as f64 - 0.5 * result.image.width() as f64) / f;
    let phi = (cy as f64 - 0.5 * result.image.height() as f64) / f;
    let d = Vector3::new(theta.sin() * phi.cos(), phi.sin(), theta.cos() * phi.cos());
    let (u, v) = proj.to_pixel(&d).unwrap();

    let p = result.image.pixel(cx, cy);
    let expected_r = 2.0 * u as f32;
    let expected_g = 100.0 + v as f32;
    assert!((p[0] - expected_r).abs() < 1e-2, "red {} vs {}", p[0], expected_r);
    assert!((p[1] - expected_g).abs() < 1e-2, "green {} vs {}", p[1], expected_g);
    assert_eq!(p[3], 255.0);
}

#[test]
fn test_blend_is_order_independent() {
    let config = BlendConfig::new(30.0, 25.0);
    let positions = vec![
        ImagePosition::new(ramp_image(40, 40, 0.0), camera_yaw(-20.0)),
        ImagePosition::new(ramp_image(40, 40, 60.0), camera_yaw(0.0)),
        ImagePosition::new(ramp_image(40, 40, 120.0), camera_yaw(18.0)),
        ImagePosition::new(ramp_image(40, 40, 30.0), camera_yaw(35.0)),
    ];
    let reference = build_mosaic(&positions, &config).unwrap();

    let orders = [[3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]];
    for order in orders {
        let permuted: Vec<_> = order.iter().map(|&i| positions[i].clone()).collect();
        let result = build_mosaic(&permuted, &config).unwrap();
        assert_images_close(&result.image, &reference.image, 1e-3);
        assert_eq!(result.coverage, reference.coverage);
    }
}

#[test]
fn test_overlap_is_weighted_average() {
    // Two flat images with the same pose: the result is the weight-averaged color
    let config = BlendConfig::new(30.0, 20.0);
    let dark = PixelImage::filled(32, 32, &[40.0, 40.0, 40.0], 255.0);
    let bright = PixelImage::filled(32, 32, &[200.0, 100.0, 0.0], 255.0);
    let result = build_mosaic(
        &[
            ImagePosition::new(dark, Transform::identity()),
            ImagePosition::new(bright, Transform::identity()),
        ],
        &config,
    )
    .unwrap();
    let (w, h) = (result.image.width(), result.image.height());
    let p = result.image.pixel(w / 2, h / 2);
    assert!((p[0] - 120.0).abs() < 1e-3, "{:?}", p);
    assert!((p[1] - 70.0).abs() < 1e-3, "{:?}", p);
    assert!((p[2] - 20.0).abs() < 1e-3, "{:?}", p);
}

#[test]
fn test_skips_image_with_other_channel_count() {
    let config = BlendConfig::new(30.0, 20.0);
    let rgb = ramp_image(40, 40, 0.0);
    let gray = PixelImage::filled(40, 40, &[77.0], 255.0);
    let result = build_mosaic(
        &[
            ImagePosition::new(rgb.clone(), Transform::identity()),
            ImagePosition::new(gray, Transform::identity()),
        ],
        &config,
    )
    .unwrap();
    assert_eq!(result.included, vec![0]);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(
        result.skipped[0].reason,
        SkipReason::ShapeMismatch {
            expected: rgb.shape(),
            found: Shape::new(40, 40, 2),
        }
    );

    let alone = build_mosaic(&[ImagePosition::new(rgb, Transform::identity())], &config).unwrap();
    assert_images_close(&result.image, &alone.image, 0.0);
}

/// Features seen by two cameras yawed apart, expressed in each camera's pixels.
fn features_for_pair(proj: &Projector, pose1: &Transform, pose2: &Transform) -> (Vec<Feature>, Vec<Feature>) {
    let mut f1 = Vec::new();
    let mut f2 = Vec::new();
    for gy in 0..6 {
        for gx in 0..8 {
            let x = 6.0 + 5.0 * gx as f64;
            let y = 8.0 + 5.0 * gy as f64;
            // Camera 1 ray → mosaic frame → camera 2
            let mosaic_dir = pose1.inverse().apply(&proj.ray(x, y));
            let Some((u, v)) = proj.to_pixel(&pose2.apply(&mosaic_dir)) else {
                continue;
            };
            if (0.0..proj.width as f64).contains(&u) && (0.0..proj.height as f64).contains(&v) {
                f1.push(Feature::new(x, y));
                f2.push(Feature::new(u, v));
            }
        }
    }
    (f1, f2)
}

#[test]
fn test_align_chain_and_blend() {
    let f = 40.0;
    let proj = Projector::new(f, 48, 40);
    let poses = [camera_yaw(0.0), camera_yaw(12.0), camera_yaw(24.0)];
    let config = AlignConfig {
        num_iterations: 100,
        ..AlignConfig::new(f, 48, 40)
    };

    let links: Vec<_> = poses
        .windows(2)
        .map(|p| {
            let (f1, f2) = features_for_pair(&proj, &p[0], &p[1]);
            let matches: Vec<_> = (0..f1.len()).map(FeatureMatch::to).collect();
            align_image_pair(&f1, &f2, &matches, &config)
        })
        .collect();
    assert!(links.iter().all(|l| l.is_aligned()));

    let images = vec![
        ramp_image(48, 40, 0.0),
        ramp_image(48, 40, 50.0),
        ramp_image(48, 40, 100.0),
    ];
    let chain = positions_from_chain(images, &links).unwrap();
    assert_eq!(chain.indices, vec![0, 1, 2]);
    for (placed, truth) in chain.positions.iter().zip(&poses) {
        let err = placed.transform.angle_to(truth).to_degrees();
        assert!(err < 1e-3, "pose error {}°", err);
    }

    let blend = BlendConfig::new(f, 30.0);
    let mosaic = build_mosaic(&chain.positions, &blend).unwrap();
    let first_only = build_mosaic(&chain.positions[..1], &blend).unwrap();
    assert_eq!(mosaic.included, vec![0, 1, 2]);
    assert!(mosaic.coverage > first_only.coverage);
}
