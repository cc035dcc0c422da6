use std::borrow::Cow;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor,
    ShaderLanguage, ShaderType,
};

use crate::error::HoverPickError;

/// Every shader the renderer builds a pipeline from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shader {
    /// Unlit ID pass: writes each object's encoded pick color.
    Pick,
    /// Lit, textured, tinted scene meshes.
    Scene,
    /// Reference grid lines.
    Grid,
}

impl Shader {
    /// All shaders, in pipeline creation order.
    pub const ALL: [Self; 3] = [Self::Pick, Self::Scene, Self::Grid];

    fn source(self) -> &'static str {
        match self {
            Self::Pick => include_str!("../../assets/shaders/pick.wgsl"),
            Self::Scene => include_str!("../../assets/shaders/scene.wgsl"),
            Self::Grid => include_str!("../../assets/shaders/grid.wgsl"),
        }
    }

    fn file_path(self) -> &'static str {
        match self {
            Self::Pick => "pick.wgsl",
            Self::Scene => "scene.wgsl",
            Self::Grid => "grid.wgsl",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pick => "Pick Shader",
            Self::Scene => "Scene Shader",
            Self::Grid => "Grid Shader",
        }
    }
}

/// Shared module definition: (source, file_path)
struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

const SHARED_MODULES: &[ModuleDef] = &[
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/camera.wgsl"),
        file_path: "modules/camera.wgsl",
    },
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/object.wgsl"),
        file_path: "modules/object.wgsl",
    },
];

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Shared WGSL modules are registered once at construction. Consuming
/// shaders use `#import hoverpick::module::Item` to pull in shared types,
/// and composition produces `naga::Module` IR directly.
pub struct ShaderComposer {
    composer: Composer,
}

impl ShaderComposer {
    /// Register the shared modules.
    ///
    /// # Errors
    ///
    /// Returns [`HoverPickError::Shader`] if a shared module fails to parse.
    pub fn new() -> Result<Self, HoverPickError> {
        let mut composer = Composer::default();

        for m in SHARED_MODULES {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| {
                    HoverPickError::Shader(format!(
                        "failed to register module '{}': {e}",
                        m.file_path
                    ))
                })?;
        }

        Ok(Self { composer })
    }

    /// Compose `shader` into a `wgpu::ShaderModule` ready for pipeline
    /// creation.
    ///
    /// # Errors
    ///
    /// Returns [`HoverPickError::Shader`] if composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        shader: Shader,
    ) -> Result<wgpu::ShaderModule, HoverPickError> {
        let naga_module = self.compose_naga(shader)?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shader.label()),
            source: wgpu::ShaderSource::Naga(Cow::Owned(naga_module)),
        }))
    }

    /// Compose a shader into a `naga::Module` without a GPU device.
    ///
    /// # Errors
    ///
    /// Returns [`HoverPickError::Shader`] if composition fails.
    pub fn compose_naga(
        &mut self,
        shader: Shader,
    ) -> Result<naga::Module, HoverPickError> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source: shader.source(),
                file_path: shader.file_path(),
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(|e| {
                HoverPickError::Shader(format!(
                    "failed to compose '{}': {e}",
                    shader.file_path()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in Shader::ALL {
            let _ = composer
                .compose_naga(shader)
                .unwrap_or_else(|e| panic!("{shader:?}: {e}"));
        }
    }

    #[test]
    fn composed_shaders_validate() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in Shader::ALL {
            let module = composer.compose_naga(shader).unwrap();
            let mut validator = naga::valid::Validator::new(
                naga::valid::ValidationFlags::all(),
                naga::valid::Capabilities::default(),
            );
            let _ = validator
                .validate(&module)
                .unwrap_or_else(|e| panic!("{shader:?}: {e:?}"));
        }
    }

    #[test]
    fn shaders_expose_vs_and_fs_entry_points() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in Shader::ALL {
            let module = composer.compose_naga(shader).unwrap();
            let names: Vec<&str> =
                module.entry_points.iter().map(|e| e.name.as_str()).collect();
            assert!(names.contains(&"vs_main"), "{shader:?}: {names:?}");
            assert!(names.contains(&"fs_main"), "{shader:?}: {names:?}");
        }
    }
}
