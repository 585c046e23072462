//! Shader Binding Validator
//!
//! Validates that the icon pipeline's bind group layouts match the bindings
//! declared in `icon.wgsl` when the environment is created. Catches
//! mismatches between Rust-side layouts and WGSL declarations before they
//! cause GPU validation errors at draw time.

use std::fmt;

/// Describes a single expected binding in a bind group layout.
#[derive(Debug, Clone)]
struct ExpectedBinding {
    binding: u32,
    binding_type: ExpectedBindingType,
    label: &'static str,
}

/// The type of a binding, matching the wgpu::BindingType variants the icon pipeline uses.
#[derive(Debug, Clone, PartialEq)]
enum ExpectedBindingType {
    UniformBuffer,
    StorageBuffer,
    Texture2d,
    OtherTexture,
    Sampler,
    Other,
}

impl fmt::Display for ExpectedBindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UniformBuffer => write!(f, "uniform buffer"),
            Self::StorageBuffer => write!(f, "storage buffer"),
            Self::Texture2d => write!(f, "texture 2d"),
            Self::OtherTexture => write!(f, "texture (non-2d)"),
            Self::Sampler => write!(f, "sampler"),
            Self::Other => write!(f, "other binding"),
        }
    }
}

/// Describes the expected layout for one bind group of a pipeline.
struct ExpectedBindGroup {
    pipeline_name: &'static str,
    group_index: u32,
    bindings: Vec<ExpectedBinding>,
}

/// Classifies a wgpu::BindGroupLayoutEntry into our ExpectedBindingType.
fn classify_entry(entry: &wgpu::BindGroupLayoutEntry) -> ExpectedBindingType {
    match &entry.ty {
        wgpu::BindingType::Buffer { ty, .. } => match ty {
            wgpu::BufferBindingType::Uniform => ExpectedBindingType::UniformBuffer,
            wgpu::BufferBindingType::Storage { .. } => ExpectedBindingType::StorageBuffer,
        },
        wgpu::BindingType::Texture {
            view_dimension: wgpu::TextureViewDimension::D2,
            ..
        } => ExpectedBindingType::Texture2d,
        wgpu::BindingType::Texture { .. } => ExpectedBindingType::OtherTexture,
        wgpu::BindingType::Sampler(_) => ExpectedBindingType::Sampler,
        _ => ExpectedBindingType::Other,
    }
}

/// Validates actual bind group layout entries against expected bindings.
/// Returns the number of mismatches found.
fn validate_bind_group(
    expected: &ExpectedBindGroup,
    actual_entries: &[wgpu::BindGroupLayoutEntry],
) -> u32 {
    let mut mismatches = 0u32;

    for exp in &expected.bindings {
        match actual_entries.iter().find(|e| e.binding == exp.binding) {
            None => {
                log::error!(
                    "[BindingValidator] MISMATCH in '{}' group {} binding {}: expected {} ({}), actual: MISSING",
                    expected.pipeline_name,
                    expected.group_index,
                    exp.binding,
                    exp.binding_type,
                    exp.label
                );
                mismatches += 1;
            }
            Some(actual) => {
                let actual_type = classify_entry(actual);
                if actual_type != exp.binding_type {
                    log::error!(
                        "[BindingValidator] MISMATCH in '{}' group {} binding {}: expected {} ({}), actual: {}",
                        expected.pipeline_name,
                        expected.group_index,
                        exp.binding,
                        exp.binding_type,
                        exp.label,
                        actual_type
                    );
                    mismatches += 1;
                }
            }
        }
    }

    for actual in actual_entries {
        if !expected.bindings.iter().any(|e| e.binding == actual.binding) {
            log::error!(
                "[BindingValidator] EXTRA binding in '{}' group {} binding {}: type {} not in shader expectations",
                expected.pipeline_name,
                expected.group_index,
                actual.binding,
                classify_entry(actual)
            );
            mismatches += 1;
        }
    }

    mismatches
}

/// Validate the icon pipeline bind groups (group 0 uniforms, group 1 textures).
///
/// Pass the same entry slices used for layout creation. Logs the outcome and
/// returns the number of mismatches.
pub fn validate_icon_bindings(
    space_entries: &[wgpu::BindGroupLayoutEntry],
    texture_entries: &[wgpu::BindGroupLayoutEntry],
) -> u32 {
    let space = ExpectedBindGroup {
        pipeline_name: "Icon",
        group_index: 0,
        bindings: vec![ExpectedBinding {
            binding: 0,
            binding_type: ExpectedBindingType::UniformBuffer,
            label: "SpaceUniforms",
        }],
    };

    const TEXTURE_LABELS: [&str; 6] = [
        "texture0", "texture1", "texture2", "texture3", "texture4", "texture5",
    ];
    let mut texture_bindings: Vec<ExpectedBinding> = TEXTURE_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| ExpectedBinding {
            binding: i as u32,
            binding_type: ExpectedBindingType::Texture2d,
            label,
        })
        .collect();
    texture_bindings.push(ExpectedBinding {
        binding: 6,
        binding_type: ExpectedBindingType::Sampler,
        label: "shared_sampler",
    });
    let textures = ExpectedBindGroup {
        pipeline_name: "Icon",
        group_index: 1,
        bindings: texture_bindings,
    };

    let total = validate_bind_group(&space, space_entries)
        + validate_bind_group(&textures, texture_entries);

    if total == 0 {
        log::debug!("[BindingValidator] Icon pipeline bindings validated OK (2 bind groups)");
    } else {
        log::warn!(
            "[BindingValidator] {} binding mismatch(es) found, GPU validation errors may occur",
            total
        );
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::pipeline::{space_layout_entries, texture_layout_entries};

    #[test]
    fn test_icon_layouts_validate() {
        assert_eq!(
            validate_icon_bindings(&space_layout_entries(), &texture_layout_entries()),
            0
        );
    }

    #[test]
    fn test_missing_sampler_is_reported() {
        let entries = texture_layout_entries();
        assert_eq!(validate_icon_bindings(&space_layout_entries(), &entries[..6]), 1);
    }

    #[test]
    fn test_swapped_groups_are_reported() {
        let mismatches = validate_icon_bindings(&texture_layout_entries(), &space_layout_entries());
        // group 0: binding 0 wrong type + 6 extras; group 1: binding 0 wrong type + 6 missing
        assert_eq!(mismatches, 14);
    }
}
