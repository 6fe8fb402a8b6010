//! Hand-off of generated geometry to a host geometry kernel.
//!
//! The generator itself never touches a host scene. [`assemble`] takes a finished
//! [`GeneratedYarn`] and drives a [`GeometryKernel`]: it creates the fibre and
//! flyaway polyline objects, bevels them with named cross-section profiles and
//! attaches the record's material. Vertices cross the boundary as [`mint`] types.
use tracing::debug;

use crate::build::runner::GeneratedYarn;
use crate::error::{Error, Result};
use crate::geometry::StrandGraph;
use crate::spec::{MaterialSpec, YarnRecord};

/// Bevel profile used for fibres.
pub const FIBER_PROFILE: &str = "Fiber_Curve";
/// Bevel profile used for flyaways.
pub const FLYAWAY_PROFILE: &str = "Flyaway_Curve";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProfileHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u32);

/// Capabilities the assembly step needs from a host.
pub trait GeometryKernel {
    /// Create an object from a vertex list and edges between vertex indices.
    fn create_polyline_object(
        &mut self,
        name: &str,
        vertices: &[mint::Vector3<f32>],
        edges: &[[u32; 2]],
    ) -> Result<ObjectHandle>;

    /// Look up a cross-section profile by name.
    fn bevel_profile(&self, name: &str) -> Option<ProfileHandle>;

    /// Sweep `profile` along `object`, scaled by `scale` in the profile plane.
    fn set_bevel(
        &mut self,
        object: ObjectHandle,
        profile: ProfileHandle,
        scale: mint::Vector2<f32>,
    ) -> Result<()>;

    fn create_material(&mut self, name: &str, spec: &MaterialSpec) -> Result<MaterialHandle>;

    fn assign_material(&mut self, object: ObjectHandle, material: MaterialHandle) -> Result<()>;
}

/// Handles created by [`assemble`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembledYarn {
    pub yarn: ObjectHandle,
    /// `None` when no flyaways were generated.
    pub flyaways: Option<ObjectHandle>,
    pub material: MaterialHandle,
}

/// Create the host objects for `generated`, styled by `record`.
///
/// Both profiles are resolved before anything is created, so a missing profile
/// fails with [`Error::ResourceNotFound`] and leaves the kernel untouched.
pub fn assemble<K>(
    kernel: &mut K,
    generated: &GeneratedYarn,
    record: &YarnRecord,
) -> Result<AssembledYarn>
where
    K: GeometryKernel + ?Sized,
{
    let has_flyaways = !generated.flyaways.is_empty();
    let fiber_profile = require_profile(kernel, FIBER_PROFILE)?;
    let flyaway_profile = if has_flyaways {
        Some(require_profile(kernel, FLYAWAY_PROFILE)?)
    } else {
        None
    };

    let thickness = &record.thickness;
    let material = kernel.create_material("yarn", &record.material)?;

    let yarn = create_object(kernel, "yarn", &generated.yarn)?;
    kernel.set_bevel(
        yarn,
        fiber_profile,
        mint::Vector2 {
            x: thickness.fiber_thickness_x,
            y: thickness.fiber_thickness_y,
        },
    )?;
    kernel.assign_material(yarn, material)?;

    let flyaways = match flyaway_profile {
        Some(profile) => {
            let graph = generated.flyaways.to_graph();
            let object = create_object(kernel, "flyaways", &graph)?;
            kernel.set_bevel(
                object,
                profile,
                mint::Vector2 {
                    x: thickness.flyaway_thickness_x,
                    y: thickness.flyaway_thickness_y,
                },
            )?;
            kernel.assign_material(object, material)?;
            Some(object)
        }
        None => None,
    };

    debug!(
        yarn_vertices = generated.yarn.vertex_count(),
        flyaways = generated.flyaways.len(),
        material = record.material.type_name(),
        "assembled yarn"
    );
    Ok(AssembledYarn {
        yarn,
        flyaways,
        material,
    })
}

fn require_profile<K>(kernel: &K, name: &str) -> Result<ProfileHandle>
where
    K: GeometryKernel + ?Sized,
{
    kernel
        .bevel_profile(name)
        .ok_or_else(|| Error::ResourceNotFound { id: name.into() })
}

fn create_object<K>(kernel: &mut K, name: &str, graph: &StrandGraph) -> Result<ObjectHandle>
where
    K: GeometryKernel + ?Sized,
{
    let vertices: Vec<mint::Vector3<f32>> = graph.vertices.iter().map(|&v| v.into()).collect();
    kernel.create_polyline_object(name, &vertices, &graph.edges)
}

/// An object held by [`InMemoryKernel`].
#[derive(Debug, Clone, PartialEq)]
pub struct KernelObject {
    pub name: String,
    pub vertices: Vec<mint::Vector3<f32>>,
    pub edges: Vec<[u32; 2]>,
    pub bevel: Option<(ProfileHandle, mint::Vector2<f32>)>,
    pub material: Option<MaterialHandle>,
}

/// A kernel that only records what it is asked to do.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKernel {
    profiles: Vec<String>,
    objects: Vec<KernelObject>,
    materials: Vec<(String, MaterialSpec)>,
}

impl InMemoryKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A kernel that already knows the fibre and flyaway profiles.
    pub fn with_default_profiles() -> Self {
        let mut kernel = Self::new();
        kernel.register_profile(FIBER_PROFILE);
        kernel.register_profile(FLYAWAY_PROFILE);
        kernel
    }

    pub fn register_profile(&mut self, name: impl Into<String>) -> ProfileHandle {
        let name = name.into();
        if let Some(handle) = self.bevel_profile(&name) {
            return handle;
        }
        self.profiles.push(name);
        ProfileHandle(self.profiles.len() as u32 - 1)
    }

    pub fn objects(&self) -> &[KernelObject] {
        &self.objects
    }

    pub fn object(&self, handle: ObjectHandle) -> Option<&KernelObject> {
        self.objects.get(handle.0 as usize)
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&(String, MaterialSpec)> {
        self.materials.get(handle.0 as usize)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    fn object_mut(&mut self, handle: ObjectHandle) -> Result<&mut KernelObject> {
        self.objects
            .get_mut(handle.0 as usize)
            .ok_or_else(|| Error::ResourceNotFound {
                id: format!("object #{}", handle.0),
            })
    }
}

impl GeometryKernel for InMemoryKernel {
    fn create_polyline_object(
        &mut self,
        name: &str,
        vertices: &[mint::Vector3<f32>],
        edges: &[[u32; 2]],
    ) -> Result<ObjectHandle> {
        let n = vertices.len() as u32;
        if let Some(bad) = edges.iter().find(|e| e[0] >= n || e[1] >= n) {
            return Err(Error::Other(format!(
                "object '{name}': edge {bad:?} references a missing vertex"
            )));
        }
        self.objects.push(KernelObject {
            name: name.to_owned(),
            vertices: vertices.to_vec(),
            edges: edges.to_vec(),
            bevel: None,
            material: None,
        });
        Ok(ObjectHandle(self.objects.len() as u32 - 1))
    }

    fn bevel_profile(&self, name: &str) -> Option<ProfileHandle> {
        self.profiles
            .iter()
            .position(|p| p == name)
            .map(|i| ProfileHandle(i as u32))
    }

    fn set_bevel(
        &mut self,
        object: ObjectHandle,
        profile: ProfileHandle,
        scale: mint::Vector2<f32>,
    ) -> Result<()> {
        if profile.0 as usize >= self.profiles.len() {
            return Err(Error::ResourceNotFound {
                id: format!("profile #{}", profile.0),
            });
        }
        self.object_mut(object)?.bevel = Some((profile, scale));
        Ok(())
    }

    fn create_material(&mut self, name: &str, spec: &MaterialSpec) -> Result<MaterialHandle> {
        spec.validate()?;
        self.materials.push((name.to_owned(), spec.clone()));
        Ok(MaterialHandle(self.materials.len() as u32 - 1))
    }

    fn assign_material(&mut self, object: ObjectHandle, material: MaterialHandle) -> Result<()> {
        if material.0 as usize >= self.materials.len() {
            return Err(Error::ResourceNotFound {
                id: format!("material #{}", material.0),
            });
        }
        self.object_mut(object)?.material = Some(material);
        Ok(())
    }
}
