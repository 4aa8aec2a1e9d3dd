use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

/// Demo settings parsed from the XML settings document.
///
/// Every field carries a default so an empty `<demo/>` document is valid;
/// units in the document are degrees and 0-255 color components, converted
/// at the accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SceneSettings {
    pub cube: CubeSettings,
    pub camera: CameraSettings,
    pub shaders: ShaderNames,
}

impl SceneSettings {
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid settings XML")?;
        let root = document.root_element();
        if !root.has_tag_name("demo") {
            return Err(anyhow!("settings document must be rooted at <demo>"));
        }

        let mut settings = Self::default();
        if let Some(node) = child(&root, "cube") {
            settings.cube.scale = parse_f32(optional_text(&node, "scale"), settings.cube.scale)?;
            settings.cube.color = parse_color(optional_text(&node, "color"), settings.cube.color)?;
            settings.cube.rotation =
                parse_vec3(optional_text(&node, "rotation"), settings.cube.rotation)?;
            settings.cube.spin = parse_f32(optional_text(&node, "spin"), settings.cube.spin)?;
        }
        if let Some(node) = child(&root, "camera") {
            settings.camera.depth =
                parse_f32(optional_text(&node, "depth"), settings.camera.depth)?;
            settings.camera.fov = parse_f32(optional_text(&node, "fov"), settings.camera.fov)?;
        }
        if let Some(node) = child(&root, "shaders") {
            if let Some(vertex) = optional_text(&node, "vertex") {
                settings.shaders.vertex = vertex;
            }
            if let Some(fragment) = optional_text(&node, "fragment") {
                settings.shaders.fragment = fragment;
            }
        }
        Ok(settings)
    }
}

/// Cube appearance and motion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeSettings {
    pub scale: f32,
    /// Normalized RGB.
    pub color: Vec3,
    /// Initial per-axis rotation, degrees.
    pub rotation: Vec3,
    /// Spin speed about the vertical axis, degrees per second.
    pub spin: f32,
}

impl CubeSettings {
    pub fn rotation_radians(&self) -> Vec3 {
        self.rotation * std::f32::consts::PI / 180.0
    }

    pub fn spin_radians(&self) -> f32 {
        self.spin.to_radians()
    }
}

impl Default for CubeSettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            color: Vec3::ONE,
            rotation: Vec3::new(30.0, 30.0, 0.0),
            spin: 45.0,
        }
    }
}

/// Camera placement settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Distance the object is pushed back along the view axis.
    pub depth: f32,
    /// Vertical field of view, degrees.
    pub fov: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            depth: 5.0,
            fov: 60.0,
        }
    }
}

/// Resource names of the shader pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderNames {
    pub vertex: String,
    pub fragment: String,
}

impl Default for ShaderNames {
    fn default() -> Self {
        Self {
            vertex: crate::assets::BUILTIN_VERTEX_NAME.to_string(),
            fragment: crate::assets::BUILTIN_FRAGMENT_NAME.to_string(),
        }
    }
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|candidate| candidate.has_tag_name(tag))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let mut numbers = value
        .split_whitespace()
        .filter_map(|component| component.parse::<f32>().ok());
    let x = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    let y = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    let z = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    Ok(Vec3::new(x, y, z))
}

fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let rgb = parse_vec3(value, default * 255.0)?;
    Ok(rgb / 255.0)
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    <demo>
        <cube>
            <scale>2.5</scale>
            <color>255 128 0</color>
            <rotation>10 20 30</rotation>
            <spin>90</spin>
        </cube>
        <camera>
            <depth>8</depth>
            <fov>45</fov>
        </camera>
        <shaders>
            <vertex>custom.vert.wgsl</vertex>
            <fragment>custom.frag.wgsl</fragment>
        </shaders>
    </demo>
    "#;

    #[test]
    fn parses_full_document() {
        let settings = SceneSettings::from_xml(SAMPLE).unwrap();
        assert_eq!(settings.cube.scale, 2.5);
        assert_eq!(settings.cube.color, Vec3::new(1.0, 128.0 / 255.0, 0.0));
        assert_eq!(settings.cube.rotation, Vec3::new(10.0, 20.0, 30.0));
        assert_eq!(settings.cube.spin, 90.0);
        assert_eq!(settings.camera.depth, 8.0);
        assert_eq!(settings.camera.fov, 45.0);
        assert_eq!(settings.shaders.vertex, "custom.vert.wgsl");
        assert_eq!(settings.shaders.fragment, "custom.frag.wgsl");
    }

    #[test]
    fn empty_document_uses_defaults() {
        let settings = SceneSettings::from_xml("<demo/>").unwrap();
        assert_eq!(settings, SceneSettings::default());
        assert_eq!(settings.cube.scale, 1.0);
        assert_eq!(settings.shaders.vertex, "cube.vert.wgsl");
    }

    #[test]
    fn wrong_root_is_an_error() {
        assert!(SceneSettings::from_xml("<scene/>").is_err());
    }

    #[test]
    fn malformed_vector_is_an_error() {
        let xml = "<demo><cube><rotation>1 2</rotation></cube></demo>";
        assert!(SceneSettings::from_xml(xml).is_err());
    }

    #[test]
    fn angle_conversions() {
        let settings = SceneSettings::from_xml(SAMPLE).unwrap();
        assert!((settings.cube.spin_radians() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        let rotation = settings.cube.rotation_radians();
        assert!((rotation.x - 10f32.to_radians()).abs() < 1e-6);
    }
}
