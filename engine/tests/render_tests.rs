//! Render Tests - GPU Round Trips
//!
//! Renders small scenes through a real (possibly software) adapter and checks
//! the returned pixels and the environment's reuse counters. Every test skips
//! when no adapter is available.

use glam::{Mat4, Vec3};
use mcmod_icon_engine::mesh::{CuboidSpec, FaceSet, ModelSpec};
use mcmod_icon_engine::render::{
    GpuContextConfig, IconEnvironment, RenderBatchBuilder, RenderError, TextureData,
};

const SIZE: u32 = 16;

/// Hardware adapter first, then the fallback rasterizer. Skips only when
/// neither is available.
fn try_environment() -> Option<IconEnvironment> {
    let _ = env_logger::builder().is_test(true).try_init();
    let hardware = GpuContextConfig::default();
    let software = GpuContextConfig {
        force_fallback_adapter: true,
        ..hardware.clone()
    };
    let env = IconEnvironment::new(&hardware).or_else(|e| {
        eprintln!("no hardware adapter ({e}), trying fallback");
        IconEnvironment::new(&software)
    });
    match env {
        Ok(env) => Some(env),
        Err(e) => {
            eprintln!("skipping GPU test, no environment: {e}");
            None
        }
    }
}

/// Camera at z = -5 looking down +Z, 2x2 orthographic window.
/// Screen right is world -X.
fn front_view(env: &mut IconEnvironment, model: ModelSpec) -> RenderBatchBuilder<'_> {
    RenderBatchBuilder::new(env)
        .with_model(model)
        .with_output_size(SIZE, SIZE)
        .with_view_transform(Mat4::look_to_rh(
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::Z,
            Vec3::Y,
        ))
        .with_orthographic_projection(2.0, 2.0, 0.1, 10.0)
        .with_light_color(Vec3::ZERO)
        .with_ambient_light_color(Vec3::ONE)
}

fn pixel(bytes: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * SIZE + x) * 4) as usize;
    [bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]
}

fn assert_color_near(actual: [u8; 4], expected: [u8; 4]) {
    for (a, e) in actual.iter().zip(expected) {
        assert!(
            (*a as i32 - e as i32).abs() <= 1,
            "pixel {actual:?} differs from {expected:?}"
        );
    }
}

fn unit_cube() -> ModelSpec {
    ModelSpec::new(vec![CuboidSpec::from_size(Vec3::ONE)])
}

// ============================================================================
// Pixel Output
// ============================================================================

#[test]
fn test_single_cube_round_trip() {
    let Some(mut env) = try_environment() else {
        return;
    };
    let color = [200, 100, 50, 255];
    let mut batch = front_view(&mut env, unit_cube()).build().unwrap();

    let bytes = batch.render(&[TextureData::solid(2, 2, color)]).unwrap();

    assert_eq!(bytes.len(), (SIZE * SIZE * 4) as usize);
    assert_color_near(pixel(bytes, SIZE / 2, SIZE / 2), color);
    assert_eq!(pixel(bytes, 0, 0)[3], 0, "background must stay transparent");
    assert_eq!(pixel(bytes, SIZE - 1, SIZE - 1)[3], 0);
}

#[test]
fn test_back_to_back_renders_read_back_fresh_pixels() {
    let Some(mut env) = try_environment() else {
        return;
    };
    let mut batch = front_view(&mut env, unit_cube()).build().unwrap();

    // The staging buffer is mapped and unmapped on every render
    for color in [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]] {
        let bytes = batch.render(&[TextureData::solid(2, 2, color)]).unwrap();
        assert_color_near(pixel(bytes, SIZE / 2, SIZE / 2), color);
    }
}

#[test]
fn test_cubes_use_their_own_vertices_and_slots() {
    let Some(mut env) = try_environment() else {
        return;
    };
    let red = [255, 0, 0, 255];
    let blue = [0, 0, 255, 255];

    let west = CuboidSpec::from_size(Vec3::splat(0.8))
        .with_transform(Mat4::from_translation(Vec3::new(-0.5, 0.0, 0.0)));
    let east = CuboidSpec::from_size(Vec3::splat(0.8))
        .with_transform(Mat4::from_translation(Vec3::new(0.5, 0.0, 0.0)))
        .with_texture_slots(FaceSet::splat(1));
    let model = ModelSpec::new(vec![west, east]);

    let mut batch = front_view(&mut env, model).build().unwrap();
    let bytes = batch
        .render(&[TextureData::solid(2, 2, red), TextureData::solid(2, 2, blue)])
        .unwrap();

    // Viewed from -Z the east cube is on the left of the image
    assert_color_near(pixel(bytes, 4, SIZE / 2), blue);
    assert_color_near(pixel(bytes, 12, SIZE / 2), red);
    assert_eq!(pixel(bytes, SIZE / 2, SIZE / 2)[3], 0, "gap between cubes");
}

#[test]
fn test_directional_light_darkens_unlit_face() {
    let Some(mut env) = try_environment() else {
        return;
    };
    let white = [255, 255, 255, 255];

    // Light travelling toward +Z hits the -Z face head on, then toward -Z misses it
    let mut lit = front_view(&mut env, unit_cube())
        .with_ambient_light_color(Vec3::splat(0.2))
        .with_light_color(Vec3::ONE)
        .with_light_direction(Vec3::Z)
        .build()
        .unwrap();
    let lit_pixel = pixel(lit.render(&[TextureData::solid(2, 2, white)]).unwrap(), 8, 8);
    lit.dispose();

    let mut unlit = front_view(&mut env, unit_cube())
        .with_ambient_light_color(Vec3::splat(0.2))
        .with_light_color(Vec3::ONE)
        .with_light_direction(Vec3::NEG_Z)
        .build()
        .unwrap();
    let unlit_pixel = pixel(unlit.render(&[TextureData::solid(2, 2, white)]).unwrap(), 8, 8);

    assert_color_near(lit_pixel, white);
    assert_color_near(unlit_pixel, [51, 51, 51, 255]);
}

// ============================================================================
// Resource Reuse
// ============================================================================

#[test]
fn test_repeated_render_reuses_everything() {
    let Some(mut env) = try_environment() else {
        return;
    };
    let texture = TextureData::solid(2, 2, [10, 20, 30, 255]);

    {
        let mut batch = front_view(&mut env, unit_cube()).build().unwrap();
        batch.render(std::slice::from_ref(&texture)).unwrap();
        batch.render(std::slice::from_ref(&texture)).unwrap();
        batch.dispose();
    }

    let stats = env.stats();
    assert_eq!(stats.renders, 2);
    assert_eq!(stats.textures_allocated, 1);
    assert_eq!(stats.targets_created, 1);
    assert_eq!(stats.geometry_uploads, 1);
    assert_eq!(stats.uniform_uploads, 1);
    assert_eq!(stats.bind_groups_built, 1);
    assert_eq!(stats.bind_groups_reused, 1);
}

#[test]
fn test_new_batch_shares_target_and_textures() {
    let Some(mut env) = try_environment() else {
        return;
    };
    let model = unit_cube();
    let texture = TextureData::solid(4, 4, [1, 2, 3, 255]);

    for ambient in [0.5, 1.0] {
        let mut batch = front_view(&mut env, model.clone())
            .with_ambient_light_color(Vec3::splat(ambient))
            .build()
            .unwrap();
        batch.render(std::slice::from_ref(&texture)).unwrap();
        batch.dispose();
    }

    let stats = env.stats();
    assert_eq!(stats.targets_created, 1);
    assert_eq!(stats.textures_allocated, 1);
    assert_eq!(stats.geometry_uploads, 1, "clones share geometry");
    assert_eq!(stats.uniform_uploads, 2, "ambient changed");

    let mut larger = front_view(&mut env, model)
        .with_output_size(32, 32)
        .build()
        .unwrap();
    let bytes = larger.render(std::slice::from_ref(&texture)).unwrap();
    assert_eq!(bytes.len(), 32 * 32 * 4);
    larger.dispose();
    assert_eq!(env.stats().targets_created, 2);
}

#[test]
fn test_multi_texture_bind_groups_are_not_cached() {
    let Some(mut env) = try_environment() else {
        return;
    };
    let textures = [
        TextureData::solid(2, 2, [255, 0, 0, 255]),
        TextureData::solid(2, 2, [0, 255, 0, 255]),
    ];
    let mut batch = front_view(&mut env, unit_cube()).build().unwrap();
    batch.render(&textures).unwrap();
    batch.render(&textures).unwrap();
    batch.dispose();

    let stats = env.stats();
    assert_eq!(stats.bind_groups_built, 2);
    assert_eq!(stats.bind_groups_reused, 0);
    assert_eq!(stats.textures_allocated, 2);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_bad_texture_input_is_rejected() {
    let Some(mut env) = try_environment() else {
        return;
    };
    let mut batch = front_view(&mut env, unit_cube()).build().unwrap();

    assert!(matches!(batch.render(&[]), Err(RenderError::TextureCount { .. })));
    let short = TextureData::new(2, 2, vec![0; 8]);
    assert!(matches!(
        batch.render(&[short]),
        Err(RenderError::TextureSize { .. })
    ));

    // The batch is still usable afterwards
    assert!(batch.render(&[TextureData::solid(2, 2, [9, 9, 9, 255])]).is_ok());
}

#[test]
fn test_builder_requires_model() {
    let Some(mut env) = try_environment() else {
        return;
    };
    let result = RenderBatchBuilder::new(&mut env).build();
    assert!(matches!(result, Err(RenderError::MissingModel)));
}

#[test]
fn test_disposed_environment_rejects_work() {
    let Some(mut env) = try_environment() else {
        return;
    };
    env.dispose();
    assert!(env.is_disposed());

    let result = RenderBatchBuilder::new(&mut env).with_model(unit_cube()).build();
    assert!(matches!(result, Err(RenderError::Disposed)));
    assert!(matches!(env.output_target(16, 16), Err(RenderError::Disposed)));

    // Disposing twice is harmless
    env.dispose();
}
