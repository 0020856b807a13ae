//! The two concrete profile schemas.

use super::schema::{validate, Schema, ValidationError};
use serde_json::{json, Value};

/// Context label used in performance profile errors.
pub const PERFORMANCE_CONTEXT: &str = "Performance profile";
/// Context label used in scene profile errors.
pub const SCENE_CONTEXT: &str = "Scene profile";

/// Allowed shadow map type names.
pub const SHADOW_MAP_TYPES: [&str; 4] =
    ["BasicShadowMap", "PCFShadowMap", "PCFSoftShadowMap", "VSMShadowMap"];

/// Tone mapping names accepted by validation.
pub const TONE_MAPPINGS: [&str; 5] = [
    "NoToneMapping",
    "LinearToneMapping",
    "ReinhardToneMapping",
    "CineonToneMapping",
    "ACESFilmicToneMapping",
];

fn build(description: Value) -> Schema {
    Schema::from_json(&description).unwrap_or_else(|e| {
        log::error!("Built-in schema is malformed: {}", e);
        Schema::Object(Vec::new())
    })
}

/// Schema for performance profiles: one flat `renderer` block.
pub fn performance_profile_schema() -> Schema {
    build(json!({
        "renderer": {
            "antialias": "boolean",
            "precision": ["highp", "mediump", "lowp"],
            "powerPreference": ["default", "high-performance", "low-power"],
            "failIfMajorPerformanceCaveat": "boolean",
            "depth": "boolean",
            "stencil": "boolean",
            "premultipliedAlpha": "boolean",
            "preserveDrawingBuffer": "boolean",
            "xrCompatible": "boolean",
            "autoClear": "boolean",
            "shadowMap": {
                "enabled": "boolean",
                "type": SHADOW_MAP_TYPES,
                "mapSize": {
                    "width": "number",
                    "height": "number",
                },
                "blurSamples": "number",
                "bias": "number",
                "radius": "number",
            },
            "physicallyCorrectLights": "boolean",
            "logarithmicDepthBuffer": "boolean",
            "pixelRatio": "number",
            "toneMapping": TONE_MAPPINGS,
            "toneMappingExposure": "number",
            "outputEncoding": "string",
            "alpha": "boolean",
        }
    }))
}

/// Schema for scene profiles.
pub fn scene_profile_schema() -> Schema {
    let vector = json!({ "x": "number", "y": "number", "z": "number" });
    build(json!({
        "lighting": {
            "enabled": "boolean",
            "visible": "boolean",
            "ambient": {
                "enabled": "boolean",
                "color": "string",
                "intensity": "number",
            },
            "hemisphere": {
                "enabled": "boolean",
                "skyColor": "string",
                "groundColor": "string",
                "intensity": "number",
            },
        },
        "lights": "array",
        "postprocessing": {
            "enabled": "boolean",
            "effects": {
                "EffectComposer": { "enabled": "boolean" },
                "RenderPass": { "enabled": "boolean" },
                "UnrealBloomPass": {
                    "enabled": "boolean",
                    "strength": "number",
                    "radius": "number",
                    "threshold": "number",
                },
                "SSAOPass": {
                    "enabled": "boolean",
                    "radius": "number",
                    "intensity": "number",
                    "bias": "number",
                },
                "FXAAPass": { "enabled": "boolean" },
                "BokehPass": {
                    "enabled": "boolean",
                    "focus": "number",
                    "aperture": "number",
                    "maxblur": "number",
                },
            },
        },
        "cameras": {
            "default": {
                "fov": "number",
                "near": "number",
                "far": "number",
                "position": vector.clone(),
                "target": vector,
            },
        },
        "controls": {
            "enableDamping": "boolean",
            "dampingFactor": "number",
            "rotateSpeed": "number",
            "panSpeed": "number",
            "zoomSpeed": "number",
            "minDistance": "number",
            "maxDistance": "number",
            "minPolarAngle": "number",
            "maxPolarAngle": "number",
            "enablePan": "boolean",
            "enableRotate": "boolean",
            "enableZoom": "boolean",
        },
        "background": {
            "color": "number",
        },
    }))
}

/// Validate a performance profile document.
pub fn validate_performance_profile(document: &Value) -> Vec<ValidationError> {
    validate(document, &performance_profile_schema(), PERFORMANCE_CONTEXT, None)
}

/// Validate a scene profile document.
pub fn validate_scene_profile(document: &Value) -> Vec<ValidationError> {
    validate(document, &scene_profile_schema(), SCENE_CONTEXT, None)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    pub fn performance(id: &str) -> Value {
        json!({
            "id": id,
            "name": format!("Performance {}", id),
            "renderer": {
                "antialias": true,
                "precision": "highp",
                "powerPreference": "high-performance",
                "failIfMajorPerformanceCaveat": false,
                "depth": true,
                "stencil": false,
                "premultipliedAlpha": true,
                "preserveDrawingBuffer": false,
                "xrCompatible": false,
                "autoClear": true,
                "shadowMap": {
                    "enabled": true,
                    "type": "PCFSoftShadowMap",
                    "mapSize": { "width": 2048, "height": 2048 },
                    "blurSamples": 8,
                    "bias": -0.0005,
                    "radius": 2
                },
                "physicallyCorrectLights": true,
                "logarithmicDepthBuffer": false,
                "pixelRatio": 1,
                "toneMapping": "ACESFilmicToneMapping",
                "toneMappingExposure": 1.2,
                "outputEncoding": "sRGBEncoding",
                "alpha": false
            }
        })
    }

    pub fn scene(id: &str) -> Value {
        json!({
            "id": id,
            "name": format!("Scene {}", id),
            "background": { "color": 0x202020 },
            "environment": {
                "enabled": true,
                "path": "textures/studio/",
                "files": ["px.jpg", "nx.jpg", "py.jpg", "ny.jpg", "pz.jpg", "nz.jpg"],
                "colorSpace": "srgb"
            },
            "lighting": {
                "enabled": true,
                "visible": true,
                "ambient": { "enabled": true, "color": "#ffffff", "intensity": 0.4 },
                "hemisphere": {
                    "enabled": true,
                    "skyColor": "#ddeeff",
                    "groundColor": "#0f0e0d",
                    "intensity": 0.6
                }
            },
            "lights": [
                {
                    "type": "DirectionalLight",
                    "name": "sun",
                    "enabled": true,
                    "color": "#ffffff",
                    "intensity": 1.5,
                    "castShadow": true,
                    "position": { "x": 5, "y": 10, "z": 7.5 },
                    "target": { "x": 0, "y": 0, "z": 0 },
                    "helper": { "visible": true, "size": 2 }
                },
                {
                    "type": "PointLight",
                    "name": "fill",
                    "enabled": true,
                    "color": 0xffaa00,
                    "intensity": 0.8,
                    "position": { "x": -3, "y": 2, "z": 0 }
                },
                {
                    "type": "SpotLight",
                    "name": "disabled-spot",
                    "enabled": false,
                    "color": "#ffffff",
                    "intensity": 1
                }
            ],
            "postprocessing": {
                "enabled": true,
                "effects": {
                    "EffectComposer": { "enabled": true },
                    "RenderPass": { "enabled": true },
                    "UnrealBloomPass": { "enabled": true, "strength": 0.5, "radius": 0.4, "threshold": 0.85 },
                    "SSAOPass": { "enabled": false, "radius": 4, "intensity": 1, "bias": 0.025 },
                    "FXAAPass": { "enabled": true },
                    "BokehPass": { "enabled": false, "focus": 1, "aperture": 0.025, "maxblur": 0.01 }
                }
            },
            "cameras": {
                "default": {
                    "fov": 45,
                    "near": 0.1,
                    "far": 1000,
                    "position": { "x": 50, "y": 5, "z": 0 },
                    "target": { "x": 0, "y": 5, "z": 0 }
                }
            },
            "controls": {
                "enableDamping": true,
                "dampingFactor": 0.05,
                "rotateSpeed": 0.8,
                "panSpeed": 0.8,
                "zoomSpeed": 1.2,
                "minDistance": 2,
                "maxDistance": 200,
                "minPolarAngle": 0,
                "maxPolarAngle": 1.5,
                "enablePan": true,
                "enableRotate": true,
                "enableZoom": true
            },
            "floor": { "visible": true, "size": 80, "color": "#303030" },
            "grid": { "visible": false, "size": 125, "divisions": 25 }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_built_in_schemas_are_not_empty() {
        assert!(matches!(performance_profile_schema(), Schema::Object(f) if f.len() == 1));
        assert!(matches!(scene_profile_schema(), Schema::Object(f) if f.len() == 6));
    }

    #[test]
    fn test_fixture_performance_profile_is_valid() {
        let errors = validate_performance_profile(&fixtures::performance("medium"));
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_fixture_scene_profile_is_valid() {
        let errors = validate_scene_profile(&fixtures::scene("studio"));
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_unknown_tone_mapping_is_reported() {
        let mut doc = fixtures::performance("p");
        doc["renderer"]["toneMapping"] = json!("NotARealMode");
        let errors = validate_performance_profile(&doc);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field(), "toneMapping");
    }

    #[test]
    fn test_lights_must_be_array() {
        let mut doc = fixtures::scene("s");
        doc["lights"] = json!({});
        let errors = validate_scene_profile(&doc);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "[s] Scene profile.lights: expected array, got object"
        );
    }

    #[test]
    fn test_missing_controls_field() {
        let mut doc = fixtures::scene("s");
        doc["controls"].as_object_mut().unwrap().remove("zoomSpeed");
        doc["cameras"]["default"]["position"]
            .as_object_mut()
            .unwrap()
            .remove("z");
        let errors = validate_scene_profile(&doc);
        assert_eq!(errors.len(), 2);
    }
}
