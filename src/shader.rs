use std::collections::BTreeMap;
use std::fmt;

use naga::valid::{Capabilities, ModuleInfo, ValidationFlags, Validator};

use crate::assets::ResourceStore;
use crate::error::{Error, Result};

/// Pipeline stage a shader source is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn to_naga(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// A validated single-stage shader module.
///
/// Produced by [`compile`]; consumed by [`ShaderProgram::link`]. Dropping
/// the value releases everything it owns.
pub struct CompiledShader {
    stage: ShaderStage,
    entry_point: String,
    module: naga::Module,
    info: ModuleInfo,
}

impl fmt::Debug for CompiledShader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledShader")
            .field("stage", &self.stage)
            .field("entry_point", &self.entry_point)
            .finish()
    }
}

impl CompiledShader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Name of the stage's entry-point function.
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Re-emits the validated module as WGSL for GPU module creation.
    pub fn to_wgsl(&self) -> Result<String> {
        naga::back::wgsl::write_string(
            &self.module,
            &self.info,
            naga::back::wgsl::WriterFlags::empty(),
        )
        .map_err(|err| Error::Compile {
            stage: self.stage,
            log: format!("failed to render WGSL for validated module: {err}"),
        })
    }
}

/// Parses and validates WGSL source for the requested stage.
///
/// The source must define exactly one entry point of that stage. Parse and
/// validation failures surface as [`Error::Compile`] with the compiler's
/// diagnostic attached.
pub fn compile(stage: ShaderStage, source: &str) -> Result<CompiledShader> {
    let module = naga::front::wgsl::parse_str(source).map_err(|err| Error::Compile {
        stage,
        log: err.emit_to_string(source),
    })?;

    let info = Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|err| Error::Compile {
            stage,
            log: error_chain(&err.into_inner()),
        })?;

    let mut candidates = module
        .entry_points
        .iter()
        .filter(|entry| entry.stage == stage.to_naga());
    let entry_point = match (candidates.next(), candidates.next()) {
        (Some(entry), None) => entry.name.clone(),
        (None, _) => {
            return Err(Error::Compile {
                stage,
                log: format!("source defines no {stage} entry point"),
            })
        }
        (Some(_), Some(_)) => {
            return Err(Error::Compile {
                stage,
                log: format!("source defines more than one {stage} entry point"),
            })
        }
    };

    Ok(CompiledShader {
        stage,
        entry_point,
        module,
        info,
    })
}

/// A linked vertex/fragment pair.
///
/// Linking consumes both stage handles; once a program exists the stages
/// live inside it and are released together when it is dropped.
#[derive(Debug)]
pub struct ShaderProgram {
    vertex: CompiledShader,
    fragment: CompiledShader,
}

impl ShaderProgram {
    /// Links a compiled vertex and fragment stage into a program.
    ///
    /// Every fragment input must be fed by a vertex output at the same
    /// location with the same type; vertex outputs the fragment ignores are
    /// fine. Mismatches are collected into a single [`Error::Link`].
    pub fn link(vertex: CompiledShader, fragment: CompiledShader) -> Result<Self> {
        if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
            return Err(Error::Link {
                log: format!(
                    "expected a vertex and a fragment stage, got {} and {}",
                    vertex.stage, fragment.stage
                ),
            });
        }

        let outputs = stage_outputs(&vertex)?;
        let inputs = stage_inputs(&fragment)?;

        let mut problems = Vec::new();
        for (location, input) in &inputs {
            match outputs.get(location) {
                None => problems.push(format!(
                    "fragment input {input} at location {location} has no matching vertex output"
                )),
                Some(output) if output != input => problems.push(format!(
                    "location {location}: vertex outputs {output} but fragment expects {input}"
                )),
                Some(_) => {}
            }
        }

        if !problems.is_empty() {
            return Err(Error::Link {
                log: problems.join("\n"),
            });
        }

        Ok(Self { vertex, fragment })
    }

    /// Loads, compiles, and links the named vertex/fragment pair from a
    /// resource store.
    pub fn load(store: &ResourceStore, vertex_name: &str, fragment_name: &str) -> Result<Self> {
        let vertex_source = store.load_text(vertex_name)?;
        let fragment_source = store.load_text(fragment_name)?;
        let vertex = compile(ShaderStage::Vertex, &vertex_source)?;
        let fragment = compile(ShaderStage::Fragment, &fragment_source)?;
        Self::link(vertex, fragment)
    }

    pub fn vertex(&self) -> &CompiledShader {
        &self.vertex
    }

    pub fn fragment(&self) -> &CompiledShader {
        &self.fragment
    }

    pub fn vertex_wgsl(&self) -> Result<String> {
        self.vertex.to_wgsl()
    }

    pub fn fragment_wgsl(&self) -> Result<String> {
        self.fragment.to_wgsl()
    }
}

/// Inter-stage value type, compared structurally across the two modules.
#[derive(Debug, Clone, Copy, PartialEq)]
enum VaryingType {
    Scalar {
        kind: naga::ScalarKind,
        width: u8,
    },
    Vector {
        size: naga::VectorSize,
        kind: naga::ScalarKind,
        width: u8,
    },
    Matrix {
        columns: naga::VectorSize,
        rows: naga::VectorSize,
        width: u8,
    },
}

impl fmt::Display for VaryingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Scalar { kind, width } => f.write_str(&scalar_name(kind, width)),
            Self::Vector { size, kind, width } => {
                write!(f, "vec{}<{}>", size as u8, scalar_name(kind, width))
            }
            Self::Matrix {
                columns,
                rows,
                width,
            } => write!(f, "mat{}x{}<f{}>", columns as u8, rows as u8, width as u32 * 8),
        }
    }
}

fn scalar_name(kind: naga::ScalarKind, width: u8) -> String {
    let bits = width as u32 * 8;
    match kind {
        naga::ScalarKind::Float => format!("f{bits}"),
        naga::ScalarKind::Sint => format!("i{bits}"),
        naga::ScalarKind::Uint => format!("u{bits}"),
        naga::ScalarKind::Bool => "bool".to_string(),
    }
}

fn stage_inputs(shader: &CompiledShader) -> Result<BTreeMap<u32, VaryingType>> {
    let entry = entry_function(shader)?;
    let mut map = BTreeMap::new();
    for argument in &entry.function.arguments {
        collect_varyings(
            &shader.module,
            argument.ty,
            argument.binding.as_ref(),
            &mut map,
        )?;
    }
    Ok(map)
}

fn stage_outputs(shader: &CompiledShader) -> Result<BTreeMap<u32, VaryingType>> {
    let entry = entry_function(shader)?;
    let mut map = BTreeMap::new();
    if let Some(result) = &entry.function.result {
        collect_varyings(&shader.module, result.ty, result.binding.as_ref(), &mut map)?;
    }
    Ok(map)
}

fn entry_function<'a>(shader: &'a CompiledShader) -> Result<&'a naga::EntryPoint> {
    shader
        .module
        .entry_points
        .iter()
        .find(|entry| entry.name == shader.entry_point)
        .ok_or_else(|| Error::Link {
            log: format!("entry point {} disappeared from module", shader.entry_point),
        })
}

fn collect_varyings(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    map: &mut BTreeMap<u32, VaryingType>,
) -> Result<()> {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            map.insert(*location, varying_type(module, ty)?);
        }
        // The position builtin and friends do not participate in location
        // matching.
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_varyings(module, member.ty, member.binding.as_ref(), map)?;
                }
            }
        }
    }
    Ok(())
}

fn varying_type(module: &naga::Module, ty: naga::Handle<naga::Type>) -> Result<VaryingType> {
    match module.types[ty].inner {
        naga::TypeInner::Scalar { kind, width } => Ok(VaryingType::Scalar { kind, width }),
        naga::TypeInner::Vector { size, kind, width } => {
            Ok(VaryingType::Vector { size, kind, width })
        }
        naga::TypeInner::Matrix {
            columns,
            rows,
            width,
        } => Ok(VaryingType::Matrix {
            columns,
            rows,
            width,
        }),
        _ => Err(Error::Link {
            log: "unsupported inter-stage value type".to_string(),
        }),
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut log = error.to_string();
    let mut cause = error.source();
    while let Some(err) = cause {
        log.push_str("\n  caused by: ");
        log.push_str(&err.to_string());
        cause = err.source();
    }
    log
}
