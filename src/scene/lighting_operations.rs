//! Lighting operations - Pure DOP functions
//!
//! Converts scene entities into lights and scores how strongly each light
//! affects a surface. The scores drive light-group assignment.

use super::light_group_data::{LightKind, Material, SceneLight};
use super::scene_data::{EntityDesc, LightEntityKind, MaterialDesc, SurfaceDesc};
use cgmath::{InnerSpace, Point3, Vector3};

/// Light entities become scene lights; ambient lights are skipped
pub fn process_entities(entities: &[EntityDesc]) -> Vec<SceneLight> {
    let lights: Vec<SceneLight> = entities
        .iter()
        .filter_map(|entity| match entity {
            EntityDesc::Light(light) => {
                let kind = match light.kind {
                    LightEntityKind::Ambient => return None,
                    LightEntityKind::Point => LightKind::Point,
                    LightEntityKind::Spot => LightKind::Spot,
                    LightEntityKind::Directional => LightKind::Directional,
                };
                Some(SceneLight {
                    kind,
                    diffuse: light.diffuse,
                    ambient: light.ambient,
                    specular: light.specular,
                    position: Point3::from(light.position),
                    direction: Vector3::from(light.direction),
                    range: light.range,
                    attenuation: light.attenuation,
                    falloff: light.falloff,
                    theta: light.theta,
                    phi: light.phi,
                })
            }
            EntityDesc::Other => None,
        })
        .collect();

    log::debug!(
        "[lighting_operations::process_entities] {} lights from {} entities",
        lights.len(),
        entities.len()
    );
    lights
}

pub fn process_materials(materials: &[MaterialDesc]) -> Vec<Material> {
    materials
        .iter()
        .map(|desc| Material {
            diffuse: desc.diffuse,
            ambient: desc.ambient,
            emissive: desc.emissive,
            specular: desc.specular,
            power: desc.power,
        })
        .collect()
}

fn spot_factor(light: &SceneLight, to_vertex: Vector3<f32>) -> f32 {
    let rho = (-light.direction).dot(to_vertex).abs();
    let cos_theta = (light.theta / 2.0).cos();
    let cos_phi = (light.phi / 2.0).cos();

    if rho > cos_theta {
        1.0
    } else if rho <= cos_phi {
        0.0
    } else {
        ((rho - cos_phi) / (cos_theta - cos_phi)) * light.falloff
    }
}

/// Strongest colour response of any vertex of the surface to this light
///
/// 0 when the surface has no material.
pub fn light_contribution(surface: &SurfaceDesc, light: &SceneLight, materials: &[Material]) -> f32 {
    let Some(material) = surface.material.and_then(|index| materials.get(index)) else {
        return 0.0;
    };

    let mut best = 0.0f32;
    for vertex in &surface.vertices {
        let offset = Point3::from(vertex.position) - light.position;
        let distance = offset.magnitude();
        if light.kind != LightKind::Directional && distance > light.range {
            continue;
        }
        let to_vertex = if distance > 0.0 { offset / distance } else { offset };

        let mut attenuation = 1.0;
        if light.kind != LightKind::Directional {
            let [a0, a1, a2] = light.attenuation;
            attenuation = a0 + a1 * distance + a2 * distance * distance;
            if attenuation > 0.0 {
                attenuation = 1.0 / attenuation;
            }
        }

        let spot = if light.kind == LightKind::Spot {
            spot_factor(light, to_vertex)
        } else {
            1.0
        };

        let lambert = Vector3::from(vertex.normal).dot(to_vertex);
        let score = (0..3)
            .map(|c| {
                let diffuse = material.diffuse[c] * light.diffuse[c] * lambert * attenuation * spot;
                let ambient = material.ambient[c] * light.ambient[c] * attenuation * spot;
                (diffuse + ambient).abs()
            })
            .fold(0.0f32, f32::max);

        best = best.max(score);
    }

    best
}

/// Greedy top-k: repeatedly take the first light with the strictly highest
/// positive score, up to `budget` lights
pub fn select_lights(contributions: &[f32], budget: usize) -> Vec<usize> {
    let mut remaining = contributions.to_vec();
    let mut selected = Vec::with_capacity(budget.min(remaining.len()));

    for _ in 0..budget {
        let mut best_score = 0.0f32;
        let mut best_light = None;
        for (index, &score) in remaining.iter().enumerate() {
            if score > best_score {
                best_score = score;
                best_light = Some(index);
            }
        }

        let Some(light) = best_light else {
            break;
        };
        selected.push(light);
        remaining[light] = 0.0;
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::scene_data::{LightEntity, SurfaceVertex};

    fn point_light(position: [f32; 3], range: f32) -> SceneLight {
        SceneLight {
            kind: LightKind::Point,
            diffuse: [1.0; 4],
            ambient: [0.0; 4],
            specular: [0.0; 4],
            position: Point3::from(position),
            direction: Vector3::new(0.0, -1.0, 0.0),
            range,
            attenuation: [1.0, 0.0, 0.0],
            falloff: 1.0,
            theta: 0.0,
            phi: 0.0,
        }
    }

    fn floor_surface(material: Option<usize>) -> SurfaceDesc {
        SurfaceDesc {
            vertices: vec![
                SurfaceVertex {
                    position: [0.0, 0.0, 0.0],
                    normal: [0.0, -1.0, 0.0],
                    tex_coords: None,
                },
                SurfaceVertex {
                    position: [1.0, 0.0, 0.0],
                    normal: [0.0, -1.0, 0.0],
                    tex_coords: None,
                },
                SurfaceVertex {
                    position: [0.0, 0.0, 1.0],
                    normal: [0.0, -1.0, 0.0],
                    tex_coords: None,
                },
            ],
            material,
            ..Default::default()
        }
    }

    #[test]
    fn test_ambient_entities_skipped() {
        let light = |kind| {
            EntityDesc::Light(LightEntity {
                kind,
                diffuse: [1.0; 4],
                ambient: [0.0; 4],
                specular: [0.0; 4],
                position: [0.0; 3],
                direction: [0.0, -1.0, 0.0],
                range: 10.0,
                attenuation: [1.0, 0.0, 0.0],
                falloff: 1.0,
                theta: 0.0,
                phi: 0.0,
            })
        };
        let lights = process_entities(&[
            light(LightEntityKind::Ambient),
            EntityDesc::Other,
            light(LightEntityKind::Spot),
        ]);
        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].kind, LightKind::Spot);
    }

    #[test]
    fn test_no_material_means_no_contribution() {
        let light = point_light([0.0, -5.0, 0.0], 100.0);
        assert_eq!(light_contribution(&floor_surface(None), &light, &[Material::default()]), 0.0);
    }

    #[test]
    fn test_out_of_range_light_ignored() {
        let light = point_light([0.0, -50.0, 0.0], 10.0);
        assert_eq!(
            light_contribution(&floor_surface(Some(0)), &light, &[Material::default()]),
            0.0
        );
    }

    #[test]
    fn test_contribution_uses_strongest_vertex() {
        // Normal points down at the light; the vertex right above it scores |dot| = 1
        let light = point_light([0.0, -5.0, 0.0], 100.0);
        let materials = [Material::default()];
        let score = light_contribution(&floor_surface(Some(0)), &light, &materials);
        assert!((score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_attenuation_scales_score() {
        let mut light = point_light([0.0, -5.0, 0.0], 100.0);
        light.attenuation = [0.0, 0.0, 1.0];
        let score = light_contribution(&floor_surface(Some(0)), &light, &[Material::default()]);
        assert!((score - 1.0 / 25.0).abs() < 1e-5);
    }

    fn vertex_below_origin(x: f32) -> SurfaceDesc {
        SurfaceDesc {
            vertices: vec![SurfaceVertex {
                position: [x, -1.0, 0.0],
                normal: [0.0, -1.0, 0.0],
                tex_coords: None,
            }],
            material: Some(0),
            ..Default::default()
        }
    }

    fn downward_spot() -> SceneLight {
        SceneLight {
            kind: LightKind::Spot,
            theta: 60.0_f32.to_radians(),
            phi: 120.0_f32.to_radians(),
            falloff: 0.5,
            ..point_light([0.0, 0.0, 0.0], 100.0)
        }
    }

    #[test]
    fn test_spot_light_inner_cone_full_strength() {
        let score = light_contribution(&vertex_below_origin(0.0), &downward_spot(), &[Material::default()]);
        assert!((score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_spot_light_penumbra_scaled_by_falloff() {
        // 45 degrees off axis: outside the 30 degree inner half-angle, inside the 60 degree outer one
        let light = downward_spot();
        let score = light_contribution(&vertex_below_origin(1.0), &light, &[Material::default()]);

        let rho = std::f32::consts::FRAC_1_SQRT_2;
        let cos_theta = 30.0_f32.to_radians().cos();
        let cos_phi = 60.0_f32.to_radians().cos();
        let spot = (rho - cos_phi) / (cos_theta - cos_phi) * light.falloff;
        // Lambert term is also rho for a downward normal
        assert!((score - rho * spot).abs() < 1e-5);
        assert!(score > 0.0 && score < rho);
    }

    #[test]
    fn test_spot_light_outside_outer_cone_ignored() {
        // atan(2) is about 63 degrees off axis
        let score = light_contribution(&vertex_below_origin(2.0), &downward_spot(), &[Material::default()]);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_directional_light_ignores_range() {
        let mut light = point_light([0.0, -1000.0, 0.0], 10.0);
        assert_eq!(light_contribution(&floor_surface(Some(0)), &light, &[Material::default()]), 0.0);

        light.kind = LightKind::Directional;
        // No range cutoff and no attenuation
        light.attenuation = [0.0, 0.0, 1.0];
        let score = light_contribution(&floor_surface(Some(0)), &light, &[Material::default()]);
        assert!((score - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_select_lights_greedy_first_found_tie_break() {
        assert_eq!(select_lights(&[0.5, 0.9, 0.9, 0.1], 2), vec![1, 2]);
        assert_eq!(select_lights(&[0.5, 0.9, 0.9, 0.1], 3), vec![1, 2, 0]);
    }

    #[test]
    fn test_select_lights_stops_at_zero_scores() {
        assert_eq!(select_lights(&[0.0, 0.3, 0.0], 3), vec![1]);
        assert!(select_lights(&[0.2, 0.3], 0).is_empty());
        assert!(select_lights(&[], 4).is_empty());
    }
}
