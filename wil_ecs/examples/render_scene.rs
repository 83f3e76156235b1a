//! Render-style scene demo
//!
//! Builds a small scene of models and point lights, registers a movement
//! system and a render system that each keep views, and runs a few frames.
//!
//! Run with: RUST_LOG=debug cargo run --example render_scene

use env_logger::Env;
use log::info;
use wil_ecs::{Component, Registry, Result, System, SystemExecutionOrder, ViewHandle};

#[derive(Component, Debug, Clone, Copy)]
struct Transform {
    position: [f32; 3],
    scale: f32,
}

impl Transform {
    fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
            scale: 1.0,
        }
    }
}

#[derive(Component, Debug)]
struct Model {
    mesh: String,
}

#[derive(Component, Debug)]
struct PointLight {
    color: [f32; 3],
    intensity: f32,
}

#[derive(Component, Debug)]
struct Velocity([f32; 3]);

// Moves everything that has both a transform and a velocity.
struct MovementSystem {
    moving: ViewHandle,
}

impl System for MovementSystem {
    fn init(registry: &mut Registry) -> Result<Self> {
        let moving = registry.register_view::<(Transform, Velocity)>()?;
        Ok(Self { moving })
    }

    fn update(&mut self, registry: &mut Registry, delta_time: f32) {
        let entities: Vec<_> = match registry.view(self.moving) {
            Ok(view) => view.entities().collect(),
            Err(_) => return,
        };

        for entity in entities {
            let velocity = match registry.get_component::<Velocity>(entity) {
                Ok(velocity) => velocity.0,
                Err(_) => continue,
            };
            if let Ok(transform) = registry.get_component_mut::<Transform>(entity) {
                for (p, v) in transform.position.iter_mut().zip(velocity) {
                    *p += v * delta_time;
                }
            }
        }
    }

    fn shutdown(&mut self, registry: &mut Registry) {
        let _ = registry.unregister_view(self.moving);
    }

    fn name(&self) -> &str {
        "MovementSystem"
    }
}

// Collects what a renderer would submit each frame.
struct RenderSystem {
    objects: ViewHandle,
    lights: ViewHandle,
    frames: u32,
}

impl System for RenderSystem {
    fn init(registry: &mut Registry) -> Result<Self> {
        let objects = registry.register_view::<(Transform, Model)>()?;
        let lights = registry.register_view::<(Transform, PointLight)>()?;
        Ok(Self {
            objects,
            lights,
            frames: 0,
        })
    }

    fn update(&mut self, registry: &mut Registry, _delta_time: f32) {
        self.frames += 1;

        if let Ok(lights) = registry.view(self.lights) {
            for entity in lights.entities() {
                if let Ok((transform, light)) =
                    registry.get_components::<(Transform, PointLight)>(entity)
                {
                    info!(
                        "frame {}: light {} at {:?} color {:?} x{}",
                        self.frames, entity, transform.position, light.color, light.intensity
                    );
                }
            }
        }

        if let Ok(objects) = registry.view(self.objects) {
            for entity in objects.entities() {
                if let Ok((transform, model)) =
                    registry.get_components::<(Transform, Model)>(entity)
                {
                    info!(
                        "frame {}: draw `{}` for {} at {:?} scale {}",
                        self.frames, model.mesh, entity, transform.position, transform.scale
                    );
                }
            }
        }
    }

    fn shutdown(&mut self, registry: &mut Registry) {
        let _ = registry.unregister_view(self.objects);
        let _ = registry.unregister_view(self.lights);
        info!("RenderSystem rendered {} frames", self.frames);
    }

    fn name(&self) -> &str {
        "RenderSystem"
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut registry = Registry::new();
    registry.register_system_with_order::<MovementSystem>(SystemExecutionOrder::EARLY)?;
    registry.register_system::<RenderSystem>()?;

    let cube = registry.create_entity();
    registry.add_components(
        cube,
        (
            Transform::at(0.0, 0.0, -5.0),
            Model {
                mesh: "cube.gltf".to_string(),
            },
            Velocity([0.5, 0.0, 0.0]),
        ),
    )?;

    let helmet = registry.create_entity();
    registry.add_components(
        helmet,
        (
            Transform::at(2.0, 1.0, -4.0),
            Model {
                mesh: "damaged_helmet.gltf".to_string(),
            },
        ),
    )?;

    let light = registry.create_entity();
    registry.add_components(
        light,
        (
            Transform::at(0.0, 4.0, 0.0),
            PointLight {
                color: [1.0, 0.9, 0.8],
                intensity: 3.0,
            },
        ),
    )?;

    for _ in 0..3 {
        registry.update(1.0 / 60.0);
    }

    // The cube stops moving and the helmet leaves the scene.
    registry.remove_component::<Velocity>(cube)?;
    registry.destroy_entity(helmet)?;
    registry.update(1.0 / 60.0);

    info!(
        "{} entities, {} component types, {} views",
        registry.entity_count(),
        registry.component_count(),
        registry.view_count()
    );

    Ok(())
}
