//! Loads given models and prints a summary of the merged scene.
//!
//! ```sh
//! RUST_LOG=debug cargo run --example inspect --features metrics -- crate floor
//! ```

use std::env;
use std::process::ExitCode;

use raypack::{LoaderConfig, Scene, SceneBuffer, TextureCache};

fn main() -> ExitCode {
    env_logger::init();

    let names: Vec<_> = env::args().skip(1).collect();

    if names.is_empty() {
        eprintln!("usage: inspect <model>...");
        return ExitCode::FAILURE;
    }

    let config = LoaderConfig::default();
    let mut textures = TextureCache::new();

    let scene = match Scene::load(&config, &mut textures, &names) {
        Ok(scene) => scene,

        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    for model in scene.models() {
        let bvh = model.bvh();

        println!(
            "{}: {} triangle(s), {} material(s), {} node(s), {} leaves, depth {}",
            model.name(),
            model.triangles().len(),
            model.materials().len(),
            bvh.len(),
            bvh.leaf_count(),
            bvh.depth(),
        );
    }

    println!("{} texture(s)", textures.len());

    for buffer in SceneBuffer::ALL {
        println!(
            "{} (binding {}): {} bytes",
            buffer.label(),
            buffer.binding(),
            scene.buffers().bytes(buffer).len()
        );
    }

    ExitCode::SUCCESS
}
